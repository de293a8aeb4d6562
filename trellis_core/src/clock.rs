// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-clock contract.
//!
//! The scene graph does not own a frame loop. When invalidation reaches a top
//! level with a clock attached (see
//! [`NodeStore::attach_frame_clock`](crate::node::NodeStore::attach_frame_clock)),
//! the store queues a [`FrameRequest`]. The embedder forwards queued requests
//! to its [`FrameClock`] with
//! [`flush_frame_requests`](crate::node::NodeStore::flush_frame_requests) and,
//! when the clock fires, runs
//! [`revalidate_layout`](crate::node::NodeStore::revalidate_layout) for the
//! layout phase and a renderer walk for the paint phase.

use alloc::vec::Vec;

use crate::node::NodeId;

/// A phase of the frame that can be requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FramePhase {
    /// Run `revalidate_layout` on the root.
    Layout,
    /// Draw the root's tree.
    Paint,
}

/// A coalesced request to schedule `phase` for the tree rooted at `root`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest {
    /// The top-level node the request is for.
    pub root: NodeId,
    /// The requested phase.
    pub phase: FramePhase,
}

/// Accepts phase requests from the scene graph.
///
/// Requests are idempotent; implementations should coalesce repeated
/// requests for the same root and phase into one scheduled pass.
pub trait FrameClock {
    /// Asks the clock to run `phase` for `root` in an upcoming frame.
    fn request_phase(&mut self, root: NodeId, phase: FramePhase);
}

/// A [`FrameClock`] that records which roots need which phases until the
/// embedder drains them.
#[derive(Clone, Debug, Default)]
pub struct PendingPhases {
    layout: Vec<NodeId>,
    paint: Vec<NodeId>,
}

impl PendingPhases {
    /// Creates an idle clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether no phase is pending.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.layout.is_empty() && self.paint.is_empty()
    }

    /// Returns whether a layout phase is pending for `root`.
    #[must_use]
    pub fn wants_layout(&self, root: NodeId) -> bool {
        self.layout.contains(&root)
    }

    /// Returns whether a paint phase is pending for `root`.
    #[must_use]
    pub fn wants_paint(&self, root: NodeId) -> bool {
        self.paint.contains(&root)
    }

    /// Drains the roots waiting for a layout phase, in request order.
    pub fn take_layout(&mut self) -> Vec<NodeId> {
        core::mem::take(&mut self.layout)
    }

    /// Drains the roots waiting for a paint phase, in request order.
    pub fn take_paint(&mut self) -> Vec<NodeId> {
        core::mem::take(&mut self.paint)
    }
}

impl FrameClock for PendingPhases {
    fn request_phase(&mut self, root: NodeId, phase: FramePhase) {
        let queue = match phase {
            FramePhase::Layout => &mut self.layout,
            FramePhase::Paint => &mut self.paint,
        };
        if !queue.contains(&root) {
            queue.push(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStore;

    #[test]
    fn requests_coalesce_per_root_and_phase() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();

        let mut clock = PendingPhases::new();
        assert!(clock.is_idle());
        clock.request_phase(a, FramePhase::Paint);
        clock.request_phase(a, FramePhase::Paint);
        clock.request_phase(b, FramePhase::Paint);
        clock.request_phase(a, FramePhase::Layout);

        assert!(clock.wants_layout(a));
        assert!(!clock.wants_layout(b));
        assert_eq!(clock.take_paint(), &[a, b]);
        assert_eq!(clock.take_layout(), &[a]);
        assert!(clock.is_idle());
    }
}
