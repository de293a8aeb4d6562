// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for invalidation, layout and rendering.
//!
//! This module provides a [`TraceSink`] trait with one method per event. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink` plus the enabled
//! [`DebugFlags`]. When the `trace` feature is **off**, every `Tracer` method
//! compiles to nothing. When **on**, each method checks the sink and the
//! event's category before dispatching. Numeric fallbacks
//! ([`SingularMatrixEvent`], [`NonAffineFallbackEvent`]) are delivered
//! whatever the flags say.
//!
//! A [`NodeStore`](crate::node::NodeStore) owns its sink (see
//! [`set_trace_sink`](crate::node::NodeStore::set_trace_sink)); the renderer
//! walk takes a `Tracer` argument.

use crate::debug::DebugFlags;
use crate::node::NodeId;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a relayout request was emitted, suppressed, or cut short.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelayoutReason {
    /// The upward walk marked every ancestor and ran off the top.
    ReachedRoot,
    /// A geometry change on an unmarked root requested layout directly.
    DirectRoot,
    /// The walk stopped at a node whose delegate vetoed propagation.
    Vetoed,
    /// The parent is inside its layout pass; the request was dropped.
    SuppressedDuringParentLayout,
}

/// How a modelview matrix was composed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelviewSource {
    /// Translation, scale and rotation were composed.
    Decomposed,
    /// An explicit transform matrix was multiplied in.
    Explicit,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the start or end of a node's layout pass.
#[derive(Clone, Copy, Debug)]
pub struct LayoutPassEvent {
    /// The node being laid out.
    pub node: NodeId,
    /// Number of children at the time of the event.
    pub n_children: u32,
}

/// Emitted when a relayout request is resolved.
#[derive(Clone, Copy, Debug)]
pub struct RelayoutRequestEvent {
    /// The node the request started from.
    pub node: NodeId,
    /// The outcome.
    pub reason: RelayoutReason,
}

/// Emitted after a redraw request finished climbing.
#[derive(Clone, Copy, Debug)]
pub struct RedrawRequestEvent {
    /// The node the request started from.
    pub node: NodeId,
    /// The top-level ancestor of `node`.
    pub top_level: NodeId,
    /// Whether the top level has a frame clock attached (and was notified).
    pub scheduled: bool,
}

/// Emitted when a cached modelview is recomputed.
#[derive(Clone, Copy, Debug)]
pub struct ModelviewUpdateEvent {
    /// The node whose modelview changed.
    pub node: NodeId,
    /// How the matrix was composed.
    pub source: ModelviewSource,
}

/// Emitted when a modelview cannot be inverted; the identity is used instead.
#[derive(Clone, Copy, Debug)]
pub struct SingularMatrixEvent {
    /// The node whose modelview is singular.
    pub node: NodeId,
}

/// Emitted for each node visited by the renderer walk.
#[derive(Clone, Copy, Debug)]
pub struct RenderNodeEvent {
    /// The node being drawn.
    pub node: NodeId,
    /// Depth below the walk's root (the root is 0).
    pub depth: u32,
}

/// Emitted when a node is drawn through an off-screen opacity group.
#[derive(Clone, Copy, Debug)]
pub struct OpacityGroupEvent {
    /// The node being drawn.
    pub node: NodeId,
    /// The blend opacity.
    pub opacity: f64,
}

/// Emitted when a modelview is not reducible to 2-D and the node is drawn
/// through a projected group.
#[derive(Clone, Copy, Debug)]
pub struct NonAffineFallbackEvent {
    /// The node being drawn.
    pub node: NodeId,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives diagnostic events from the scene graph.
///
/// All methods have default no-op implementations.
pub trait TraceSink {
    /// Called when a node's layout pass begins.
    fn on_layout_begin(&mut self, e: &LayoutPassEvent) {
        _ = e;
    }

    /// Called when a node's layout pass ends.
    fn on_layout_end(&mut self, e: &LayoutPassEvent) {
        _ = e;
    }

    /// Called when a relayout request resolves.
    fn on_relayout_request(&mut self, e: &RelayoutRequestEvent) {
        _ = e;
    }

    /// Called when a redraw request finishes climbing.
    fn on_redraw_request(&mut self, e: &RedrawRequestEvent) {
        _ = e;
    }

    /// Called when a modelview is recomputed.
    fn on_modelview_update(&mut self, e: &ModelviewUpdateEvent) {
        _ = e;
    }

    /// Called when a modelview inversion fails.
    fn on_singular_matrix(&mut self, e: &SingularMatrixEvent) {
        _ = e;
    }

    /// Called for each node the renderer visits.
    fn on_render_node(&mut self, e: &RenderNodeEvent) {
        _ = e;
    }

    /// Called when the renderer opens an opacity group.
    fn on_opacity_group(&mut self, e: &OpacityGroupEvent) {
        _ = e;
    }

    /// Called when the renderer falls back to a projected group.
    fn on_non_affine_fallback(&mut self, e: &NonAffineFallbackEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`] and its category filter.
///
/// When the `trace` feature is **off**, every method compiles to nothing.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(feature = "trace")]
    flags: DebugFlags,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

/// Dispatches to the sink when present and `$enabled` holds.
macro_rules! dispatch {
    ($self:ident, $enabled:expr, $method:ident, $e:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(s) = &mut $self.sink {
            if $enabled {
                s.$method($e);
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $e;
        }
    }};
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that forwards every category to `sink`.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        Self::filtered(sink, DebugFlags::ALL)
    }

    /// Creates a tracer that forwards only the categories in `flags`.
    #[inline]
    #[must_use]
    pub fn filtered(sink: &'a mut dyn TraceSink, flags: DebugFlags) -> Self {
        #[cfg(feature = "trace")]
        {
            Self {
                sink: Some(sink),
                flags,
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = (sink, flags);
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self {
                sink: None,
                flags: DebugFlags::NONE,
            }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns whether the `geometry` category is forwarded.
    ///
    /// Always `false` without the `trace` feature.
    #[inline]
    #[must_use]
    pub fn geometry_enabled(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some() && self.flags.geometry
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`LayoutPassEvent`] at the start of a pass (`layout`).
    #[inline]
    pub fn layout_begin(&mut self, e: &LayoutPassEvent) {
        dispatch!(self, self.flags.layout, on_layout_begin, e);
    }

    /// Emits a [`LayoutPassEvent`] at the end of a pass (`layout`).
    #[inline]
    pub fn layout_end(&mut self, e: &LayoutPassEvent) {
        dispatch!(self, self.flags.layout, on_layout_end, e);
    }

    /// Emits a [`RelayoutRequestEvent`] (`layout`).
    #[inline]
    pub fn relayout_request(&mut self, e: &RelayoutRequestEvent) {
        dispatch!(self, self.flags.layout, on_relayout_request, e);
    }

    /// Emits a [`RedrawRequestEvent`] (`render`).
    #[inline]
    pub fn redraw_request(&mut self, e: &RedrawRequestEvent) {
        dispatch!(self, self.flags.render, on_redraw_request, e);
    }

    /// Emits a [`ModelviewUpdateEvent`] (`geometry`).
    #[inline]
    pub fn modelview_update(&mut self, e: &ModelviewUpdateEvent) {
        dispatch!(self, self.flags.geometry, on_modelview_update, e);
    }

    /// Emits a [`SingularMatrixEvent`] (always).
    #[inline]
    pub fn singular_matrix(&mut self, e: &SingularMatrixEvent) {
        dispatch!(self, true, on_singular_matrix, e);
    }

    /// Emits a [`RenderNodeEvent`] (`render`).
    #[inline]
    pub fn render_node(&mut self, e: &RenderNodeEvent) {
        dispatch!(self, self.flags.render, on_render_node, e);
    }

    /// Emits an [`OpacityGroupEvent`] (`render`).
    #[inline]
    pub fn opacity_group(&mut self, e: &OpacityGroupEvent) {
        dispatch!(self, self.flags.render, on_opacity_group, e);
    }

    /// Emits a [`NonAffineFallbackEvent`] (always).
    #[inline]
    pub fn non_affine_fallback(&mut self, e: &NonAffineFallbackEvent) {
        dispatch!(self, true, on_non_affine_fallback, e);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStore;

    #[test]
    fn noop_sink_compiles() {
        let mut store = NodeStore::new();
        let node = store.create_node();
        let mut sink = NoopSink;
        sink.on_layout_begin(&LayoutPassEvent {
            node,
            n_children: 0,
        });
        sink.on_singular_matrix(&SingularMatrixEvent { node });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let mut store = NodeStore::new();
        let node = store.create_node();
        let mut tracer = Tracer::none();
        tracer.render_node(&RenderNodeEvent { node, depth: 0 });
        tracer.singular_matrix(&SingularMatrixEvent { node });
        assert!(!tracer.geometry_enabled());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_filters_by_category() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct RecordingSink {
            layout: Vec<NodeId>,
            render: Vec<NodeId>,
            singular: Vec<NodeId>,
        }
        impl TraceSink for RecordingSink {
            fn on_layout_begin(&mut self, e: &LayoutPassEvent) {
                self.layout.push(e.node);
            }
            fn on_render_node(&mut self, e: &RenderNodeEvent) {
                self.render.push(e.node);
            }
            fn on_singular_matrix(&mut self, e: &SingularMatrixEvent) {
                self.singular.push(e.node);
            }
        }

        let mut store = NodeStore::new();
        let node = store.create_node();
        let mut sink = RecordingSink::default();
        let mut tracer = Tracer::filtered(&mut sink, DebugFlags::parse("layout"));
        tracer.layout_begin(&LayoutPassEvent {
            node,
            n_children: 0,
        });
        tracer.render_node(&RenderNodeEvent { node, depth: 0 });
        tracer.singular_matrix(&SingularMatrixEvent { node });
        drop(tracer);

        assert_eq!(sink.layout, &[node]);
        assert!(sink.render.is_empty(), "render category is disabled");
        assert_eq!(sink.singular, &[node], "fallbacks are always delivered");
    }
}
