// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render plan: an ordered record of paint calls for one frame.

use alloc::vec::Vec;

use kurbo::{Affine, Rect};
use trellis_core::paint::{Painter, Rgba};
use trellis_core::transform::Transform3d;

/// A single recorded paint call.
///
/// Ops are stored in call order, so nesting (`Save`/`Restore`, group
/// push/pop) is preserved.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderOp {
    /// The current state was saved.
    Save,
    /// The last saved state was restored.
    Restore,
    /// The current transform was post-multiplied by the affine.
    Transform(Affine),
    /// The clip was intersected with a rectangle in local coordinates.
    ClipRect(Rect),
    /// A rectangle was filled.
    FillRect {
        /// Rectangle in local coordinates.
        rect: Rect,
        /// Fill color.
        color: Rgba,
        /// Local-to-surface transform at the time of the call.
        world: Affine,
    },
    /// A rectangle outline was stroked.
    StrokeRect {
        /// Rectangle in local coordinates.
        rect: Rect,
        /// Stroke color.
        color: Rgba,
        /// Line width.
        width: f64,
        /// Local-to-surface transform at the time of the call.
        world: Affine,
    },
    /// An off-screen group was opened.
    PushGroup,
    /// The innermost group was composited at the opacity.
    PopGroup(f64),
    /// A projected group was opened for a non-affine modelview.
    PushProjectedGroup(Transform3d),
    /// The innermost projected group was composited.
    PopProjectedGroup(Transform3d),
}

/// An ordered list of paint calls for a single frame.
#[derive(Clone, Debug, Default)]
pub struct RenderPlan {
    /// Recorded ops in call order.
    pub ops: Vec<RenderOp>,
}

impl RenderPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Returns whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns the fills in back-to-front order as `(rect, color, world)`.
    pub fn fills(&self) -> impl Iterator<Item = (Rect, Rgba, Affine)> + '_ {
        self.ops.iter().filter_map(|op| match *op {
            RenderOp::FillRect { rect, color, world } => Some((rect, color, world)),
            _ => None,
        })
    }

    /// Returns the surface-space bounding box of every fill.
    pub fn fill_bounds(&self) -> impl Iterator<Item = Rect> + '_ {
        self.fills()
            .map(|(rect, _, world)| world.transform_rect_bbox(rect))
    }
}

/// A [`Painter`] that records every call into a [`RenderPlan`].
///
/// It also tracks the current transform so recorded fills carry their
/// surface-space placement.
#[derive(Clone, Debug, Default)]
pub struct RecordingPainter {
    plan: RenderPlan,
    ctm: Affine,
    saved: Vec<Affine>,
}

impl RecordingPainter {
    /// Creates a painter with an empty plan and an identity transform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the plan recorded so far.
    #[must_use]
    pub fn plan(&self) -> &RenderPlan {
        &self.plan
    }

    /// Returns the recorded plan and resets the painter.
    pub fn take_plan(&mut self) -> RenderPlan {
        self.ctm = Affine::IDENTITY;
        self.saved.clear();
        core::mem::take(&mut self.plan)
    }

    /// Returns the current local-to-surface transform.
    #[must_use]
    pub fn current_transform(&self) -> Affine {
        self.ctm
    }

    /// Returns the number of unmatched `save` calls.
    #[must_use]
    pub fn save_depth(&self) -> usize {
        self.saved.len()
    }
}

impl Painter for RecordingPainter {
    fn save(&mut self) {
        self.saved.push(self.ctm);
        self.plan.ops.push(RenderOp::Save);
    }

    fn restore(&mut self) {
        debug_assert!(!self.saved.is_empty(), "restore without save");
        if let Some(ctm) = self.saved.pop() {
            self.ctm = ctm;
        }
        self.plan.ops.push(RenderOp::Restore);
    }

    fn transform(&mut self, affine: Affine) {
        self.ctm *= affine;
        self.plan.ops.push(RenderOp::Transform(affine));
    }

    fn clip_rect(&mut self, rect: Rect) {
        self.plan.ops.push(RenderOp::ClipRect(rect));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.plan.ops.push(RenderOp::FillRect {
            rect,
            color,
            world: self.ctm,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, width: f64) {
        self.plan.ops.push(RenderOp::StrokeRect {
            rect,
            color,
            width,
            world: self.ctm,
        });
    }

    fn push_group(&mut self) {
        self.plan.ops.push(RenderOp::PushGroup);
    }

    fn pop_group(&mut self, opacity: f64) {
        self.plan.ops.push(RenderOp::PopGroup(opacity));
    }

    fn push_projected_group(&mut self, modelview: &Transform3d) {
        self.plan.ops.push(RenderOp::PushProjectedGroup(*modelview));
    }

    fn pop_projected_group(&mut self, modelview: &Transform3d) {
        self.plan.ops.push(RenderOp::PopProjectedGroup(*modelview));
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::*;

    #[test]
    fn fills_carry_the_current_transform() {
        let mut p = RecordingPainter::new();
        p.save();
        p.transform(Affine::translate(Vec2::new(10.0, 5.0)));
        p.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Rgba::WHITE);
        p.restore();
        p.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba::BLACK);

        let bounds: Vec<Rect> = p.plan().fill_bounds().collect();
        assert_eq!(
            bounds,
            [Rect::new(10.0, 5.0, 12.0, 7.0), Rect::new(0.0, 0.0, 1.0, 1.0)]
        );
        assert_eq!(p.save_depth(), 0);
    }

    #[test]
    fn take_plan_resets_state() {
        let mut p = RecordingPainter::new();
        p.save();
        p.transform(Affine::scale(2.0));
        let plan = p.take_plan();
        assert_eq!(plan.ops.len(), 2);
        assert!(p.plan().is_empty());
        assert_eq!(p.current_transform(), Affine::IDENTITY);
        assert_eq!(p.save_depth(), 0);
    }
}
