// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node geometry, transform and render state.
//!
//! Most nodes never touch most properties, so each group lives in its own
//! lazily allocated box. Reads of an unallocated group see a shared immutable
//! default; the first write allocates a private copy.

use alloc::boxed::Box;

use kurbo::{Point, Rect, Size};

use crate::paint::Rgba;
use crate::transform::{Euler, Transform3d, Vec3};

/// Where a node sits inside its parent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryInfo {
    /// The node's own coordinate space, relative to the node.
    pub bounds: Rect,
    /// Pivot in normalized bounds coordinates; `(0.5, 0.5)` is the center.
    pub pivot_point: Point,
    /// Position of the pivot in parent coordinates.
    pub position: Point,
}

impl GeometryInfo {
    /// Empty bounds, centered pivot, at the parent's origin.
    pub const DEFAULT: Self = Self {
        bounds: Rect::ZERO,
        pivot_point: Point::new(0.5, 0.5),
        position: Point::ORIGIN,
    };

    /// The pivot in bounds units: `pivot_point · (bounds.origin + bounds.size)`.
    #[must_use]
    pub fn pivot_offset(&self) -> kurbo::Vec2 {
        let b = self.bounds;
        kurbo::Vec2::new(
            self.pivot_point.x * (b.x0 + b.width()),
            self.pivot_point.y * (b.y0 + b.height()),
        )
    }

    /// The node's rectangle in parent coordinates, unrounded.
    ///
    /// `origin = position − pivot_offset`, `size = bounds.size`.
    #[must_use]
    pub fn frame(&self) -> Rect {
        Rect::from_origin_size(self.position - self.pivot_offset(), self.bounds.size())
    }
}

impl Default for GeometryInfo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Decomposed transform, optional explicit matrix, and cached modelview.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformInfo {
    /// Euler rotation in degrees.
    pub rotation: Euler,
    /// Scale factors.
    pub scale: Vec3,
    /// Translation.
    pub translation: Vec3,
    /// Explicit matrix; when not the identity it replaces the decomposed
    /// components.
    pub transform: Transform3d,
    /// Applied on top of every child's modelview.
    pub child_transform: Transform3d,
    pub(crate) modelview: Transform3d,
    pub(crate) inverse: Transform3d,
    pub(crate) needs_modelview_update: bool,
    pub(crate) needs_inverse_update: bool,
}

impl TransformInfo {
    /// No rotation, unit scale, no translation, identity matrices, caches
    /// dirty.
    pub const DEFAULT: Self = Self {
        rotation: Euler::ZERO,
        scale: Vec3::ONE,
        translation: Vec3::ZERO,
        transform: Transform3d::IDENTITY,
        child_transform: Transform3d::IDENTITY,
        modelview: Transform3d::IDENTITY,
        inverse: Transform3d::IDENTITY,
        needs_modelview_update: true,
        needs_inverse_update: true,
    };

    /// Marks the cached modelview (and therefore its inverse) stale.
    #[inline]
    pub(crate) fn invalidate_modelview(&mut self) {
        self.needs_modelview_update = true;
        self.needs_inverse_update = true;
    }

    /// Composes the local modelview on top of `seed`.
    ///
    /// Returns whether the explicit matrix was used.
    pub(crate) fn compose(&self, seed: Transform3d) -> (Transform3d, bool) {
        if self.transform.is_identity() {
            let t = self.translation;
            let s = self.scale;
            let m = seed.pre_translate(t.x, t.y, t.z).pre_scale(s.x, s.y, s.z);
            let m = if self.rotation.is_zero() {
                m
            } else {
                m * self.rotation.to_quaternion().to_transform()
            };
            (m, false)
        } else {
            (seed * self.transform, true)
        }
    }
}

impl Default for TransformInfo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How a node's own content is painted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderInfo {
    /// Fill for the default content.
    pub background_color: Rgba,
    /// Group opacity in `0.0..=1.0`.
    pub opacity: f64,
    /// Clip in node coordinates; `None` means "clip to bounds".
    pub clip: Option<Rect>,
}

impl RenderInfo {
    /// Opaque black background, fully opaque, no explicit clip.
    pub const DEFAULT: Self = Self {
        background_color: Rgba::BLACK,
        opacity: 1.0,
        clip: None,
    };
}

impl Default for RenderInfo {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static DEFAULT_GEOMETRY: GeometryInfo = GeometryInfo::DEFAULT;
static DEFAULT_TRANSFORM: TransformInfo = TransformInfo::DEFAULT;
static DEFAULT_RENDER: RenderInfo = RenderInfo::DEFAULT;

/// The lazily allocated property groups of one node.
#[derive(Clone, Debug, Default)]
pub(crate) struct NodeState {
    geometry: Option<Box<GeometryInfo>>,
    transform: Option<Box<TransformInfo>>,
    render: Option<Box<RenderInfo>>,
}

impl NodeState {
    #[inline]
    pub(crate) fn geometry(&self) -> &GeometryInfo {
        self.geometry.as_deref().unwrap_or(&DEFAULT_GEOMETRY)
    }

    #[inline]
    pub(crate) fn geometry_mut(&mut self) -> &mut GeometryInfo {
        self.geometry.get_or_insert_with(Box::default)
    }

    #[inline]
    pub(crate) fn transform(&self) -> &TransformInfo {
        self.transform.as_deref().unwrap_or(&DEFAULT_TRANSFORM)
    }

    #[inline]
    pub(crate) fn transform_mut(&mut self) -> &mut TransformInfo {
        self.transform.get_or_insert_with(Box::default)
    }

    /// Returns the transform group only if it was ever written.
    #[inline]
    pub(crate) fn transform_if_allocated(&mut self) -> Option<&mut TransformInfo> {
        self.transform.as_deref_mut()
    }

    #[inline]
    pub(crate) fn render(&self) -> &RenderInfo {
        self.render.as_deref().unwrap_or(&DEFAULT_RENDER)
    }

    #[inline]
    pub(crate) fn render_mut(&mut self) -> &mut RenderInfo {
        self.render.get_or_insert_with(Box::default)
    }

    /// Which groups are allocated, as `(geometry, transform, render)`.
    #[cfg(test)]
    pub(crate) fn allocated(&self) -> (bool, bool, bool) {
        (
            self.geometry.is_some(),
            self.transform.is_some(),
            self.render.is_some(),
        )
    }
}

/// Rounds a frame outward to whole pixels: origin floored, size ceiled.
#[must_use]
pub fn round_frame(frame: Rect) -> Rect {
    #[cfg(not(feature = "std"))]
    use kurbo::common::FloatFuncs as _;

    let origin = Point::new(frame.x0.floor(), frame.y0.floor());
    let size = Size::new(frame.width().ceil(), frame.height().ceil());
    Rect::from_origin_size(origin, size)
}
