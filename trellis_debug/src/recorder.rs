// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory event recording.
//!
//! [`RecorderSink`] implements [`TraceSink`] and appends every event to a
//! log shared between clones. Install one clone in a
//! [`NodeStore`](trellis_core::node::NodeStore) and keep another to read the
//! log back as [`RecordedEvent`]s.

use std::cell::RefCell;
use std::rc::Rc;

use trellis_core::trace::{
    LayoutPassEvent, ModelviewUpdateEvent, NonAffineFallbackEvent, OpacityGroupEvent,
    RedrawRequestEvent, RelayoutRequestEvent, RenderNodeEvent, SingularMatrixEvent, TraceSink,
};

/// A decoded event, in the order it was received.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// A layout pass started.
    LayoutBegin(LayoutPassEvent),
    /// A layout pass finished.
    LayoutEnd(LayoutPassEvent),
    /// A relayout request resolved.
    RelayoutRequest(RelayoutRequestEvent),
    /// A redraw request finished climbing.
    RedrawRequest(RedrawRequestEvent),
    /// A modelview was recomputed.
    ModelviewUpdate(ModelviewUpdateEvent),
    /// A modelview could not be inverted.
    SingularMatrix(SingularMatrixEvent),
    /// The renderer visited a node.
    RenderNode(RenderNodeEvent),
    /// The renderer opened an opacity group.
    OpacityGroup(OpacityGroupEvent),
    /// The renderer fell back to a projected group.
    NonAffineFallback(NonAffineFallbackEvent),
}

impl RecordedEvent {
    /// Returns a short, stable name for the event kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LayoutBegin(_) => "LayoutBegin",
            Self::LayoutEnd(_) => "LayoutEnd",
            Self::RelayoutRequest(_) => "RelayoutRequest",
            Self::RedrawRequest(_) => "RedrawRequest",
            Self::ModelviewUpdate(_) => "ModelviewUpdate",
            Self::SingularMatrix(_) => "SingularMatrix",
            Self::RenderNode(_) => "RenderNode",
            Self::OpacityGroup(_) => "OpacityGroup",
            Self::NonAffineFallback(_) => "NonAffineFallback",
        }
    }
}

/// A [`TraceSink`] that records events into a shared in-memory log.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    log: Rc<RefCell<Vec<RecordedEvent>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.log.borrow().clone()
    }

    /// Returns the number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    /// Returns whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Drains the log.
    pub fn take(&self) -> Vec<RecordedEvent> {
        core::mem::take(&mut *self.log.borrow_mut())
    }

    fn push(&mut self, event: RecordedEvent) {
        self.log.borrow_mut().push(event);
    }
}

impl TraceSink for RecorderSink {
    fn on_layout_begin(&mut self, e: &LayoutPassEvent) {
        self.push(RecordedEvent::LayoutBegin(*e));
    }

    fn on_layout_end(&mut self, e: &LayoutPassEvent) {
        self.push(RecordedEvent::LayoutEnd(*e));
    }

    fn on_relayout_request(&mut self, e: &RelayoutRequestEvent) {
        self.push(RecordedEvent::RelayoutRequest(*e));
    }

    fn on_redraw_request(&mut self, e: &RedrawRequestEvent) {
        self.push(RecordedEvent::RedrawRequest(*e));
    }

    fn on_modelview_update(&mut self, e: &ModelviewUpdateEvent) {
        self.push(RecordedEvent::ModelviewUpdate(*e));
    }

    fn on_singular_matrix(&mut self, e: &SingularMatrixEvent) {
        self.push(RecordedEvent::SingularMatrix(*e));
    }

    fn on_render_node(&mut self, e: &RenderNodeEvent) {
        self.push(RecordedEvent::RenderNode(*e));
    }

    fn on_opacity_group(&mut self, e: &OpacityGroupEvent) {
        self.push(RecordedEvent::OpacityGroup(*e));
    }

    fn on_non_affine_fallback(&mut self, e: &NonAffineFallbackEvent) {
        self.push(RecordedEvent::NonAffineFallback(*e));
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;
    use trellis_core::debug::DebugFlags;
    use trellis_core::node::NodeStore;
    use trellis_core::trace::RelayoutReason;

    use super::*;

    #[test]
    fn recorder_sees_store_events() {
        let rec = RecorderSink::new();
        let mut store = NodeStore::new();
        store.set_trace_sink(Some(Box::new(rec.clone())));
        store.set_debug_flags(DebugFlags::ALL);

        let root = store.create_node();
        let child = store.create_node();
        store.add_child(root, child);
        store.revalidate_layout(root);

        let names: Vec<_> = rec.events().iter().map(RecordedEvent::name).collect();
        assert_eq!(
            names,
            [
                "RelayoutRequest",
                "LayoutBegin",
                "LayoutEnd",
                "LayoutBegin",
                "LayoutEnd"
            ]
        );
        match rec.events()[0] {
            RecordedEvent::RelayoutRequest(e) => {
                assert_eq!(e.node, child);
                assert_eq!(e.reason, RelayoutReason::ReachedRoot);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn flags_filter_categories() {
        let rec = RecorderSink::new();
        let mut store = NodeStore::new();
        store.set_trace_sink(Some(Box::new(rec.clone())));
        store.set_debug_flags(DebugFlags::parse("render"));

        let root = store.create_node();
        store.set_bounds(root, Rect::new(0.0, 0.0, 1.0, 1.0));
        store.queue_redraw(root);

        let names: Vec<_> = rec.take().iter().map(RecordedEvent::name).collect();
        assert_eq!(names, ["RedrawRequest"]);
        assert!(rec.is_empty());
    }
}
