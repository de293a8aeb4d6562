// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Column-major 4×4 transforms and the decomposed rotation types that feed
//! node modelview composition.
//!
//! This covers what the scene graph needs (compose, invert, reduce to 2-D,
//! build from Euler angles) without pulling in a full linear-algebra crate.

use core::ops::Mul;

use kurbo::{Affine, Point};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Determinants with a magnitude below this are treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// A three-component vector used for scale and translation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// All zeros.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    /// All ones.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// Creates a vector from its components.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Rotation expressed as Euler angles in **degrees** around the X, Y and Z
/// axes, applied in that order about fixed axes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Euler {
    /// Rotation around the X axis, in degrees.
    pub x: f64,
    /// Rotation around the Y axis, in degrees.
    pub y: f64,
    /// Rotation around the Z axis, in degrees.
    pub z: f64,
}

impl Euler {
    /// No rotation.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a rotation from angles in degrees.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns whether all three angles are zero.
    #[inline]
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Converts to a unit quaternion equivalent to rotating about X, then Y,
    /// then Z.
    #[must_use]
    pub fn to_quaternion(self) -> Quaternion {
        const HALF_RAD: f64 = core::f64::consts::PI / 360.0;
        let qx = Quaternion::from_axis_half_angle(Axis::X, self.x * HALF_RAD);
        let qy = Quaternion::from_axis_half_angle(Axis::Y, self.y * HALF_RAD);
        let qz = Quaternion::from_axis_half_angle(Axis::Z, self.z * HALF_RAD);
        qz * qy * qx
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
    Z,
}

/// A rotation quaternion `(x, y, z, w)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    /// Vector part, X.
    pub x: f64,
    /// Vector part, Y.
    pub y: f64,
    /// Vector part, Z.
    pub z: f64,
    /// Scalar part.
    pub w: f64,
}

impl Quaternion {
    /// The identity rotation.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    fn from_axis_half_angle(axis: Axis, half: f64) -> Self {
        let (s, c) = (half.sin(), half.cos());
        match axis {
            Axis::X => Self { x: s, y: 0.0, z: 0.0, w: c },
            Axis::Y => Self { x: 0.0, y: s, z: 0.0, w: c },
            Axis::Z => Self { x: 0.0, y: 0.0, z: s, w: c },
        }
    }

    /// Returns the rotation matrix for this quaternion.
    ///
    /// The quaternion is assumed to be normalized.
    #[must_use]
    pub fn to_transform(self) -> Transform3d {
        let Self { x, y, z, w } = self;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        Transform3d::from_cols(
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy), 0.0],
            [2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx), 0.0],
            [2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy), 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product: `self * rhs` applies `rhs` first.
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = self;
        let b = rhs;
        Self {
            w: a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
            x: a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
            y: a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
            z: a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        }
    }
}

/// A column-major 4×4 transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *column* of the matrix. Points are column vectors,
/// so in `a * b` the transform `b` is applied first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four columns, each a 4-element array `[x, y, z, w]`.
    pub cols: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four column arrays.
    #[inline]
    #[must_use]
    pub const fn from_cols(col0: [f64; 4], col1: [f64; 4], col2: [f64; 4], col3: [f64; 4]) -> Self {
        Self {
            cols: [col0, col1, col2, col3],
        }
    }

    /// Returns column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col(self, i: usize) -> [f64; 4] {
        self.cols[i]
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_z(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [c, s, 0.0, 0.0],
                [-s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the X axis (radians).
    #[inline]
    #[must_use]
    pub fn from_rotation_x(radians: f64) -> Self {
        let (s, c) = (radians.sin(), radians.cos());
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, s, 0.0],
                [0.0, -s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Embeds a 2-D affine transform in the XY plane.
    #[must_use]
    pub fn from_affine(affine: Affine) -> Self {
        let [a, b, c, d, e, f] = affine.as_coeffs();
        Self {
            cols: [
                [a, b, 0.0, 0.0],
                [c, d, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [e, f, 0.0, 1.0],
            ],
        }
    }

    /// Returns `self` followed by a translation in local space
    /// (`self * T(x, y, z)`).
    #[inline]
    #[must_use]
    pub fn pre_translate(self, x: f64, y: f64, z: f64) -> Self {
        self * Self::from_translation(x, y, z)
    }

    /// Returns `self * S(x, y, z)`.
    #[inline]
    #[must_use]
    pub fn pre_scale(self, x: f64, y: f64, z: f64) -> Self {
        self * Self::from_scale(x, y, z)
    }

    /// Returns whether this is exactly the identity matrix.
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns whether this transform only acts in the XY plane, i.e. whether
    /// [`to_2d`](Self::to_2d) would succeed.
    #[inline]
    #[must_use]
    pub fn is_2d(&self) -> bool {
        let c = &self.cols;
        c[0][2] == 0.0
            && c[0][3] == 0.0
            && c[1][2] == 0.0
            && c[1][3] == 0.0
            && c[2] == [0.0, 0.0, 1.0, 0.0]
            && c[3][2] == 0.0
            && c[3][3] == 1.0
    }

    /// Reduces this transform to a 2-D affine, or `None` if it has any
    /// depth or perspective component.
    #[must_use]
    pub fn to_2d(&self) -> Option<Affine> {
        if !self.is_2d() {
            return None;
        }
        let c = &self.cols;
        Some(Affine::new([c[0][0], c[0][1], c[1][0], c[1][1], c[3][0], c[3][1]]))
    }

    /// Transforms a point in the XY plane (z = 0), applying the perspective
    /// divide.
    #[must_use]
    pub fn transform_point(&self, p: Point) -> Point {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
        if w == 0.0 || w == 1.0 {
            Point::new(x, y)
        } else {
            Point::new(x / w, y / w)
        }
    }

    /// Returns the determinant.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.adjugate().1
    }

    /// Returns the inverse, or `None` if the matrix is singular or not
    /// finite.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        if !self.is_finite() {
            return None;
        }
        let (adj, det) = self.adjugate();
        if det.abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let mut cols = [[0.0_f64; 4]; 4];
        for (i, v) in adj.iter().enumerate() {
            cols[i / 4][i % 4] = v * inv_det;
        }
        Some(Self { cols })
    }

    /// Cofactor expansion over the flattened column-major array.
    ///
    /// Returns the transposed cofactor matrix (flattened the same way) and the
    /// determinant.
    fn adjugate(&self) -> ([f64; 16], f64) {
        let mut m = [0.0_f64; 16];
        for (c, col) in self.cols.iter().enumerate() {
            m[c * 4..c * 4 + 4].copy_from_slice(col);
        }
        let mut inv = [0.0_f64; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        (inv, det)
    }

    /// Is this transform [finite]?
    ///
    /// [finite]: f64::is_finite
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.cols.iter().flatten().all(|v| v.is_finite())
    }

    /// Is this transform [NaN]?
    ///
    /// [NaN]: f64::is_nan
    #[inline]
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.cols.iter().flatten().any(|v| v.is_nan())
    }

    /// Returns whether every element is within `eps` of `other`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.cols
            .iter()
            .flatten()
            .zip(other.cols.iter().flatten())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        let a = &self.cols;
        let b = &rhs.cols;
        let mut out = [[0.0_f64; 4]; 4];
        for (j, col) in out.iter_mut().enumerate() {
            for (i, v) in col.iter_mut().enumerate() {
                *v = a[0][i] * b[j][0] + a[1][i] * b[j][1] + a[2][i] * b[j][2] + a[3][i] * b[j][3];
            }
        }
        Self { cols: out }
    }
}
