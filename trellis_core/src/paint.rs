// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Painter contract for drawing backends.
//!
//! The scene graph never rasterizes anything itself. The renderer walk and
//! node [`draw`](crate::delegate::NodeDelegate::draw) hooks issue calls on a
//! [`Painter`], which a drawing backend implements (a vector canvas, a
//! display-list recorder, a test double). Coordinates passed to draw calls are
//! in the current node's local space; the walk establishes that space with
//! [`transform`](Painter::transform) inside a [`save`](Painter::save) /
//! [`restore`](Painter::restore) pair.

use kurbo::{Affine, Rect};

use crate::transform::Transform3d;

/// A straight-alpha RGBA color with `f32` components in `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Rgba {
    /// Opaque black, the default node background.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from components.
    #[inline]
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns this color with alpha replaced.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Returns whether the color contributes nothing when drawn.
    #[inline]
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Receives draw calls from the renderer walk and node draw hooks.
///
/// Calls nest: every [`save`](Self::save) is matched by a
/// [`restore`](Self::restore), every [`push_group`](Self::push_group) by a
/// [`pop_group`](Self::pop_group), and every
/// [`push_projected_group`](Self::push_projected_group) by a
/// [`pop_projected_group`](Self::pop_projected_group).
pub trait Painter {
    /// Saves the current transform and clip.
    fn save(&mut self);

    /// Restores the transform and clip saved by the matching `save`.
    fn restore(&mut self);

    /// Post-multiplies the current transform by `affine`.
    fn transform(&mut self, affine: Affine);

    /// Intersects the current clip with `rect` (local coordinates).
    fn clip_rect(&mut self, rect: Rect);

    /// Fills `rect` (local coordinates) with `color`.
    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Strokes the outline of `rect`. Used by geometry overlays.
    ///
    /// The default implementation draws nothing.
    fn stroke_rect(&mut self, rect: Rect, color: Rgba, width: f64) {
        _ = (rect, color, width);
    }

    /// Redirects drawing into an off-screen group.
    fn push_group(&mut self);

    /// Ends the current group and composites it at `opacity`.
    fn pop_group(&mut self, opacity: f64);

    /// Redirects drawing into an off-screen group that will be composited
    /// through a full 3-D `modelview` (one that has no 2-D affine reduction).
    ///
    /// The default implementation opens a plain group.
    fn push_projected_group(&mut self, modelview: &Transform3d) {
        _ = modelview;
        self.push_group();
    }

    /// Ends a projected group, compositing it through `modelview`.
    ///
    /// The default implementation composites the plain group opaquely.
    fn pop_projected_group(&mut self, modelview: &Transform3d) {
        _ = modelview;
        self.pop_group(1.0);
    }
}
