// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Redraw and relayout propagation, the layout pass, and visibility.
//!
//! Both signals climb from the node toward its root, marking each node on
//! the way. A climb stops at the first node that is already marked or whose
//! delegate vetoes propagation. Nodes inside a hidden subtree never get
//! marked. Requests for the frame clock are queued in the store's outbox and
//! only for roots that have a clock attached.

use alloc::vec::Vec;

use crate::clock::FramePhase;
use crate::node::{INVALID, NodeId, NodeStore};
use crate::node::store::Invalidation;
use crate::trace::{LayoutPassEvent, RedrawRequestEvent, RelayoutReason, RelayoutRequestEvent};

impl NodeStore {
    // -- Requests --

    /// Marks `id` and its ancestors as needing a redraw.
    ///
    /// No-op when the node or any ancestor is hidden. If the node's root has
    /// a frame clock attached, a [`FramePhase::Paint`] request is queued.
    pub fn queue_redraw(&mut self, id: NodeId) {
        self.validate(id);
        if self.defer(id, Invalidation::Redraw) || self.hidden_in_chain(id.idx) {
            return;
        }

        let mut iter = id.idx;
        while iter != INVALID {
            let i = iter as usize;
            if self.flags[i].needs_redraw {
                break;
            }
            let node = self.id_at(iter);
            if !self.should_propagate_redraw(node) {
                break;
            }
            self.flags[i].needs_redraw = true;
            iter = self.parent[i];
        }

        let top = self.top_level_idx(id.idx);
        let scheduled = self.flags[top as usize].clock_attached;
        if scheduled {
            self.request_frame(top, FramePhase::Paint);
        }
        let top_level = self.id_at(top);
        self.tracer().redraw_request(&RedrawRequestEvent {
            node: id,
            top_level,
            scheduled,
        });
    }

    /// Marks `id` and its ancestors as needing a relayout.
    ///
    /// No-op when the node or any ancestor is hidden. A
    /// [`FramePhase::Layout`] request is queued only when the climb marked
    /// every ancestor up to a root that has a frame clock attached.
    pub fn queue_relayout(&mut self, id: NodeId) {
        self.validate(id);
        if self.defer(id, Invalidation::Relayout) || self.hidden_in_chain(id.idx) {
            return;
        }

        let mut iter = id.idx;
        let mut vetoed = false;
        while iter != INVALID {
            let i = iter as usize;
            if self.flags[i].needs_relayout {
                break;
            }
            let node = self.id_at(iter);
            if !self.should_propagate_relayout(node) {
                vetoed = true;
                break;
            }
            self.flags[i].needs_relayout = true;
            iter = self.parent[i];
        }

        if iter == INVALID {
            let top = self.top_level_idx(id.idx);
            if self.flags[top as usize].clock_attached {
                self.request_frame(top, FramePhase::Layout);
            }
            self.trace_relayout(id, RelayoutReason::ReachedRoot);
        } else if vetoed {
            self.trace_relayout(id, RelayoutReason::Vetoed);
        }
    }

    /// Requests relayout after a geometry change.
    ///
    /// A root that is not yet marked is marked and asks its frame clock for
    /// a layout phase directly. A node whose parent is running its layout
    /// pass has its own flag cleared and the request dropped, since the
    /// parent is placing it right now. Anything else goes through
    /// [`queue_relayout`](Self::queue_relayout).
    pub fn queue_relayout_if_needed(&mut self, id: NodeId) {
        self.validate(id);
        if self.defer(id, Invalidation::RelayoutIfNeeded) || self.hidden_in_chain(id.idx) {
            return;
        }
        let i = id.idx as usize;
        let p = self.parent[i];
        if p == INVALID {
            if !self.flags[i].needs_relayout {
                self.flags[i].needs_relayout = true;
                if self.flags[i].clock_attached {
                    self.request_frame(id.idx, FramePhase::Layout);
                }
                self.trace_relayout(id, RelayoutReason::DirectRoot);
            }
            return;
        }
        if self.flags[p as usize].in_layout {
            self.flags[i].needs_relayout = false;
            self.trace_relayout(id, RelayoutReason::SuppressedDuringParentLayout);
            return;
        }
        self.queue_relayout(id);
    }

    fn trace_relayout(&mut self, node: NodeId, reason: RelayoutReason) {
        self.tracer()
            .relayout_request(&RelayoutRequestEvent { node, reason });
    }

    // -- Layout pass --

    /// Runs the layout pass for `root` and every marked descendant.
    ///
    /// Skips nodes that are not marked or are already inside their own pass.
    /// A node's delegate lays out its children only when it has any. After
    /// that, children that are still marked are laid out in sibling order.
    pub fn revalidate_layout(&mut self, root: NodeId) {
        self.validate(root);
        let mut work = alloc::vec![root];
        while let Some(id) = work.pop() {
            if !self.is_alive(id) {
                continue;
            }
            let i = id.idx as usize;
            if !self.flags[i].needs_relayout || self.flags[i].in_layout {
                continue;
            }

            self.flags[i].in_layout = true;
            self.flags[i].needs_relayout = false;
            let n_children = self.n_children[i];
            self.tracer()
                .layout_begin(&LayoutPassEvent { node: id, n_children });
            if n_children != 0 {
                self.with_delegate(id, |d, s| d.layout_children(s, id));
            }
            if !self.is_alive(id) {
                continue;
            }
            self.flags[i].in_layout = false;
            let n_children = self.n_children[i];
            self.tracer()
                .layout_end(&LayoutPassEvent { node: id, n_children });

            let marked: Vec<NodeId> = self
                .children(id)
                .filter(|&c| self.flags[c.idx as usize].needs_relayout)
                .collect();
            // Reversed so the stack pops them in sibling order.
            work.extend(marked.into_iter().rev());
        }
    }

    // -- Visibility --

    /// Hides or shows a node and its subtree.
    ///
    /// Setting the current value is a no-op. Either way the parent is asked
    /// to redraw; showing a node also requests relayout for it, because
    /// geometry changes made while hidden were not propagated.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        self.validate(id);
        let i = id.idx as usize;
        if self.flags[i].hidden == hidden {
            return;
        }
        self.flags[i].hidden = hidden;
        if let Some(parent) = self.opt_id(self.parent[i]) {
            self.queue_redraw(parent);
        }
        if !hidden {
            self.queue_relayout(id);
        }
    }

    // -- Frame clock --

    /// Marks `root` as driven by a frame clock.
    ///
    /// From now on invalidation reaching `root` queues
    /// [`FrameRequest`](crate::clock::FrameRequest)s for it. A first layout
    /// phase is requested immediately.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has a parent.
    pub fn attach_frame_clock(&mut self, root: NodeId) {
        self.validate(root);
        let i = root.idx as usize;
        assert!(
            self.parent[i] == INVALID,
            "frame clock can only be attached to a root node, {} has a parent",
            self.debug_name(root)
        );
        self.flags[i].clock_attached = true;
        if self.flags[i].needs_relayout {
            self.request_frame(root.idx, FramePhase::Layout);
        } else {
            self.queue_relayout(root);
        }
    }

    /// Stops queueing frame requests for `root` and drops pending ones.
    pub fn detach_frame_clock(&mut self, root: NodeId) {
        self.validate(root);
        self.flags[root.idx as usize].clock_attached = false;
        self.frame_requests.retain(|r| r.root != root);
    }

    /// Returns whether a frame clock is attached to the node.
    #[must_use]
    pub fn has_frame_clock(&self, id: NodeId) -> bool {
        self.validate(id);
        self.flags[id.idx as usize].clock_attached
    }
}
