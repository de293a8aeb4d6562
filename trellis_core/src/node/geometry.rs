// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry, transform and render properties, and modelview composition.
//!
//! Geometry setters (bounds, pivot, position, frame) request relayout through
//! [`queue_relayout_if_needed`](NodeStore::queue_relayout_if_needed).
//! Transform setters mark the cached modelview stale and request a redraw.
//! Render setters request a redraw.

use kurbo::{Point, Rect, Size};

use crate::paint::Rgba;
use crate::state::{GeometryInfo, RenderInfo, TransformInfo, round_frame};
use crate::trace::{ModelviewSource, ModelviewUpdateEvent, SingularMatrixEvent};
use crate::transform::{Euler, Transform3d, Vec3};

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

impl NodeStore {
    // -- Geometry --

    /// Returns the node's bounds in its own coordinate space.
    #[must_use]
    pub fn bounds(&self, id: NodeId) -> Rect {
        self.validate(id);
        self.state[id.idx as usize].geometry().bounds
    }

    /// Sets the node's bounds.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) {
        self.update_geometry(id, |g| g.bounds = bounds);
    }

    /// Returns the pivot in normalized bounds coordinates.
    #[must_use]
    pub fn pivot_point(&self, id: NodeId) -> Point {
        self.validate(id);
        self.state[id.idx as usize].geometry().pivot_point
    }

    /// Sets the pivot in normalized bounds coordinates.
    pub fn set_pivot_point(&mut self, id: NodeId, pivot: Point) {
        self.update_geometry(id, |g| g.pivot_point = pivot);
    }

    /// Returns the position of the pivot in the parent's space.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Point {
        self.validate(id);
        self.state[id.idx as usize].geometry().position
    }

    /// Moves the node so its pivot sits at `position` in the parent's space.
    pub fn set_position(&mut self, id: NodeId, position: Point) {
        self.update_geometry(id, |g| g.position = position);
    }

    /// Returns the node's rectangle in the parent's space, rounded outward
    /// to whole pixels.
    ///
    /// A root has no parent space, so its frame always starts at the origin.
    #[must_use]
    pub fn frame(&self, id: NodeId) -> Rect {
        self.validate(id);
        let i = id.idx as usize;
        let frame = self.state[i].geometry().frame();
        let frame = if self.parent[i] == INVALID {
            Rect::from_origin_size(Point::ORIGIN, frame.size())
        } else {
            frame
        };
        round_frame(frame)
    }

    /// Places the node so that its frame equals `frame`.
    ///
    /// Bounds become `(0, 0, w, h)` and the position is chosen for the
    /// current pivot.
    pub fn set_frame(&mut self, id: NodeId, frame: Rect) {
        self.update_geometry(id, |g| {
            let size = frame.size();
            g.bounds = Rect::from_origin_size(Point::ORIGIN, size);
            g.position = Point::new(
                frame.x0 + size.width * g.pivot_point.x,
                frame.y0 + size.height * g.pivot_point.y,
            );
        });
    }

    /// Asks the node's delegate for its preferred size (by default, the
    /// bounds size).
    pub fn preferred_size(&mut self, id: NodeId) -> Size {
        self.validate(id);
        self.with_delegate(id, |delegate, store| delegate.preferred_size(store, id))
    }

    fn update_geometry(&mut self, id: NodeId, f: impl FnOnce(&mut GeometryInfo)) {
        self.validate(id);
        let state = &mut self.state[id.idx as usize];
        let before = *state.geometry();
        let mut after = before;
        f(&mut after);
        if after == before {
            return;
        }
        *state.geometry_mut() = after;
        self.queue_relayout_if_needed(id);
    }

    // -- Transform --

    /// Returns the Euler rotation in degrees.
    #[must_use]
    pub fn rotation(&self, id: NodeId) -> Euler {
        self.validate(id);
        self.state[id.idx as usize].transform().rotation
    }

    /// Sets the Euler rotation in degrees.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Euler) {
        self.update_transform(id, |t| t.rotation = rotation);
    }

    /// Returns the scale factors.
    #[must_use]
    pub fn scale(&self, id: NodeId) -> Vec3 {
        self.validate(id);
        self.state[id.idx as usize].transform().scale
    }

    /// Sets the X and Y scale, keeping Z.
    pub fn set_scale(&mut self, id: NodeId, x: f64, y: f64) {
        self.update_transform(id, |t| {
            t.scale.x = x;
            t.scale.y = y;
        });
    }

    /// Sets all three scale factors.
    pub fn set_scale3(&mut self, id: NodeId, scale: Vec3) {
        self.update_transform(id, |t| t.scale = scale);
    }

    /// Returns the translation.
    #[must_use]
    pub fn translation(&self, id: NodeId) -> Vec3 {
        self.validate(id);
        self.state[id.idx as usize].transform().translation
    }

    /// Sets the translation.
    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) {
        self.update_transform(id, |t| t.translation = translation);
    }

    /// Returns the explicit transform matrix (identity when unset).
    #[must_use]
    pub fn transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.state[id.idx as usize].transform().transform
    }

    /// Sets the explicit transform matrix. Any non-identity matrix takes
    /// precedence over rotation, scale and translation.
    pub fn set_transform(&mut self, id: NodeId, transform: Transform3d) {
        self.update_transform(id, |t| t.transform = transform);
    }

    /// Returns the transform applied to every child's modelview.
    #[must_use]
    pub fn child_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.state[id.idx as usize].transform().child_transform
    }

    /// Sets the transform applied to every child's modelview.
    pub fn set_child_transform(&mut self, id: NodeId, transform: Transform3d) {
        self.update_transform(id, |t| t.child_transform = transform);
        let mut c = self.first_child[id.idx as usize];
        while c != INVALID {
            self.invalidate_modelview_at(c);
            c = self.next_sibling[c as usize];
        }
    }

    fn update_transform(&mut self, id: NodeId, f: impl FnOnce(&mut TransformInfo)) {
        self.validate(id);
        let info = self.state[id.idx as usize].transform_mut();
        f(info);
        info.invalidate_modelview();
        self.queue_redraw(id);
    }

    /// Returns the node's modelview matrix, recomputing it if stale.
    ///
    /// The modelview starts from the parent's
    /// [`child_transform`](Self::child_transform) (identity for roots). With
    /// no explicit matrix it then applies translation, scale and rotation,
    /// in that order from the outside in; otherwise it multiplies in the
    /// explicit matrix.
    pub fn modelview(&mut self, id: NodeId) -> Transform3d {
        self.validate(id);
        let i = id.idx as usize;
        if !self.state[i].transform().needs_modelview_update {
            return self.state[i].transform().modelview;
        }
        let p = self.parent[i];
        let seed = if p == INVALID {
            Transform3d::IDENTITY
        } else {
            self.state[p as usize].transform().child_transform
        };
        let info = self.state[i].transform_mut();
        let (modelview, explicit) = info.compose(seed);
        info.modelview = modelview;
        info.needs_modelview_update = false;
        info.needs_inverse_update = true;

        let source = if explicit {
            ModelviewSource::Explicit
        } else {
            ModelviewSource::Decomposed
        };
        self.tracer()
            .modelview_update(&ModelviewUpdateEvent { node: id, source });
        modelview
    }

    /// Returns the inverse of the node's modelview, recomputing it if stale.
    ///
    /// A singular modelview yields the identity and reports a
    /// [`SingularMatrixEvent`].
    pub fn inverse_modelview(&mut self, id: NodeId) -> Transform3d {
        let modelview = self.modelview(id);
        let info = self.state[id.idx as usize].transform_mut();
        if !info.needs_inverse_update {
            return info.inverse;
        }
        let (inverse, singular) = match modelview.inverse() {
            Some(inverse) => (inverse, false),
            None => (Transform3d::IDENTITY, true),
        };
        info.inverse = inverse;
        info.needs_inverse_update = false;
        if singular {
            self.tracer()
                .singular_matrix(&SingularMatrixEvent { node: id });
        }
        inverse
    }

    // -- Render --

    /// Returns the background color.
    #[must_use]
    pub fn background_color(&self, id: NodeId) -> Rgba {
        self.validate(id);
        self.state[id.idx as usize].render().background_color
    }

    /// Sets the background color.
    pub fn set_background_color(&mut self, id: NodeId, color: Rgba) {
        self.update_render(id, |r| r.background_color = color);
    }

    /// Returns the opacity in `0.0..=1.0`.
    #[must_use]
    pub fn opacity(&self, id: NodeId) -> f64 {
        self.validate(id);
        self.state[id.idx as usize].render().opacity
    }

    /// Sets the opacity, clamped to `0.0..=1.0`.
    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) {
        self.update_render(id, |r| r.opacity = opacity.clamp(0.0, 1.0));
    }

    /// Returns the clip in node coordinates, falling back to the bounds when
    /// no clip was set.
    #[must_use]
    pub fn clip(&self, id: NodeId) -> Rect {
        self.validate(id);
        let state = &self.state[id.idx as usize];
        state.render().clip.unwrap_or(state.geometry().bounds)
    }

    /// Returns whether an explicit clip is set.
    #[must_use]
    pub fn has_clip(&self, id: NodeId) -> bool {
        self.validate(id);
        self.state[id.idx as usize].render().clip.is_some()
    }

    /// Sets or clears the explicit clip.
    pub fn set_clip(&mut self, id: NodeId, clip: Option<Rect>) {
        self.update_render(id, |r| r.clip = clip);
    }

    fn update_render(&mut self, id: NodeId, f: impl FnOnce(&mut RenderInfo)) {
        self.validate(id);
        let state = &mut self.state[id.idx as usize];
        let before = *state.render();
        let mut after = before;
        f(&mut after);
        if after == before {
            return;
        }
        *state.render_mut() = after;
        self.queue_redraw(id);
    }
}
