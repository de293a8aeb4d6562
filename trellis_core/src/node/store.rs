// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, ownership, and topology
//! queries.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::clock::{FrameClock, FramePhase, FrameRequest};
use crate::debug::DebugFlags;
use crate::delegate::{DefaultDelegate, NodeDelegate};
use crate::state::NodeState;
use crate::trace::{TraceSink, Tracer};

use super::id::{INVALID, NodeId};
use super::traverse::Children;

/// Per-node boolean state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct NodeFlags {
    pub(crate) alive: bool,
    pub(crate) hidden: bool,
    pub(crate) needs_redraw: bool,
    pub(crate) needs_relayout: bool,
    pub(crate) in_layout: bool,
    /// Created but never owned by a parent or an external holder.
    pub(crate) floating: bool,
    pub(crate) clock_attached: bool,
}

/// A structural change, queued for observers.
///
/// Drain with [`NodeStore::take_events`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeEvent {
    /// `child` was inserted under `parent`.
    ChildAdded {
        /// The new parent.
        parent: NodeId,
        /// The inserted node.
        child: NodeId,
    },
    /// `child` was detached from `parent`.
    ChildRemoved {
        /// The former parent.
        parent: NodeId,
        /// The detached node.
        child: NodeId,
    },
    /// `child` changed position among its siblings without leaving `parent`.
    ChildMoved {
        /// The parent.
        parent: NodeId,
        /// The moved node.
        child: NodeId,
    },
    /// `node` was destroyed; its handle is now stale.
    Destroyed {
        /// The destroyed node's last valid handle.
        node: NodeId,
    },
}

/// Deferred invalidation kinds, replayed when an update scope closes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Invalidation {
    Redraw,
    Relayout,
    RelayoutIfNeeded,
}

/// Propagation answers of a delegate that is out of its slot for a hook.
///
/// Climbs that reach the node while its hook runs use these answers.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CheckedOut {
    pub(crate) node: NodeId,
    pub(crate) redraw: bool,
    pub(crate) relayout: bool,
}

/// Struct-of-arrays storage for a forest of scene nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Each node occupies a slot in
/// parallel arrays; destroyed nodes are recycled through a free list and a
/// per-slot generation makes old handles fail validation.
///
/// # Ownership
///
/// A new node is *floating*: it stays alive on its own until it is either
/// destroyed with [`destroy_node`](Self::destroy_node) or adopted. Adding it
/// to a parent sinks the floating state; the parent then owns it. Holders
/// outside the tree can [`retain`](Self::retain) a node so it survives being
/// removed from its parent, and [`release`](Self::release) it later. Removing
/// a node that nobody retains destroys it and its whole subtree, except for
/// descendants that are themselves retained, which become detached roots.
pub struct NodeStore {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) n_children: Vec<u32>,
    /// Bumped exactly once per structural change of the child list.
    pub(crate) age: Vec<u64>,

    // -- Per-node state --
    pub(crate) flags: Vec<NodeFlags>,
    pub(crate) refs: Vec<u32>,
    pub(crate) state: Vec<NodeState>,
    pub(crate) names: Vec<Option<String>>,
    pub(crate) delegates: Vec<Option<Box<dyn NodeDelegate>>>,
    pub(crate) checked_out: Vec<CheckedOut>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Outbox --
    pub(crate) events: Vec<TreeEvent>,
    pub(crate) frame_requests: Vec<FrameRequest>,

    // -- Update batching --
    pub(crate) update_depth: u32,
    pub(crate) deferred: Vec<(NodeId, Invalidation)>,

    // -- Diagnostics --
    pub(crate) debug_flags: DebugFlags,
    pub(crate) sink: Option<Box<dyn TraceSink>>,
}

impl fmt::Debug for NodeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeStore")
            .field("len", &self.len)
            .field("free", &self.free_list.len())
            .field("pending_events", &self.events.len())
            .field("frame_requests", &self.frame_requests)
            .field("update_depth", &self.update_depth)
            .field("debug_flags", &self.debug_flags)
            .field("has_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            first_child: Vec::new(),
            last_child: Vec::new(),
            prev_sibling: Vec::new(),
            next_sibling: Vec::new(),
            n_children: Vec::new(),
            age: Vec::new(),
            flags: Vec::new(),
            refs: Vec::new(),
            state: Vec::new(),
            names: Vec::new(),
            delegates: Vec::new(),
            checked_out: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            events: Vec::new(),
            frame_requests: Vec::new(),
            update_depth: 0,
            deferred: Vec::new(),
            debug_flags: DebugFlags::NONE,
            sink: None,
        }
    }

    // -- Allocation API --

    /// Creates a detached, floating node and returns its handle.
    ///
    /// The node starts with empty bounds, a centered pivot, no transform, an
    /// opaque black background, full opacity and no delegate.
    pub fn create_node(&mut self) -> NodeId {
        let fresh = NodeFlags {
            alive: true,
            floating: true,
            ..NodeFlags::default()
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            let i = idx as usize;
            self.parent[i] = INVALID;
            self.first_child[i] = INVALID;
            self.last_child[i] = INVALID;
            self.prev_sibling[i] = INVALID;
            self.next_sibling[i] = INVALID;
            self.n_children[i] = 0;
            self.age[i] = 0;
            self.flags[i] = fresh;
            self.refs[i] = 0;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.parent.push(INVALID);
            self.first_child.push(INVALID);
            self.last_child.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.next_sibling.push(INVALID);
            self.n_children.push(0);
            self.age.push(0);
            self.flags.push(fresh);
            self.refs.push(0);
            self.state.push(NodeState::default());
            self.names.push(None);
            self.delegates.push(None);
            self.generation.push(0);
            idx
        };
        self.id_at(idx)
    }

    /// Creates a node driven by `delegate`.
    pub fn create_node_with(&mut self, delegate: Box<dyn NodeDelegate>) -> NodeId {
        let id = self.create_node();
        self.delegates[id.idx as usize] = Some(delegate);
        id
    }

    /// Destroys a node and every descendant nobody else retains.
    ///
    /// If the node is attached it is first removed from its parent. Retained
    /// descendants are detached and survive as roots. Outstanding references
    /// to `id` itself are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        if p != INVALID {
            self.splice_out(id.idx);
            self.bump_age(p);
            self.events.push(TreeEvent::ChildRemoved {
                parent: self.id_at(p),
                child: id,
            });
        }
        self.destroy_subtree(id.idx);
    }

    /// Returns whether the handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.flags[id.idx as usize].alive
    }

    /// Adds an external reference that keeps the node alive after it is
    /// removed from its parent.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn retain(&mut self, id: NodeId) {
        self.validate(id);
        self.refs[id.idx as usize] += 1;
    }

    /// Drops an external reference.
    ///
    /// When the last reference goes away and the node has no parent and is
    /// not floating, the node and its unretained descendants are destroyed.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node holds no external reference.
    pub fn release(&mut self, id: NodeId) {
        self.validate(id);
        let i = id.idx as usize;
        assert!(
            self.refs[i] > 0,
            "release of {} without a matching retain",
            self.debug_name(id)
        );
        self.refs[i] -= 1;
        if self.refs[i] == 0 && self.parent[i] == INVALID && !self.flags[i].floating {
            self.destroy_subtree(id.idx);
        }
    }

    /// Returns the number of external references held on a node.
    #[must_use]
    pub fn ref_count(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.refs[id.idx as usize]
    }

    /// Returns whether the node has never been owned.
    #[must_use]
    pub fn is_floating(&self, id: NodeId) -> bool {
        self.validate(id);
        self.flags[id.idx as usize].floating
    }

    // -- Topology queries --

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.opt_id(self.parent[id.idx as usize])
    }

    /// Returns the first child of a node, if any.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.opt_id(self.first_child[id.idx as usize])
    }

    /// Returns the last child of a node, if any.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.opt_id(self.last_child[id.idx as usize])
    }

    /// Returns the next sibling of a node, if any.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.opt_id(self.next_sibling[id.idx as usize])
    }

    /// Returns the previous sibling of a node, if any.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        self.opt_id(self.prev_sibling[id.idx as usize])
    }

    /// Returns the number of direct children.
    #[must_use]
    pub fn n_children(&self, id: NodeId) -> u32 {
        self.validate(id);
        self.n_children[id.idx as usize]
    }

    /// Returns the structural age of a node's child list.
    ///
    /// The age starts at zero and grows by exactly one for every insertion,
    /// removal, reorder or replacement step applied to the node's children.
    #[must_use]
    pub fn age(&self, id: NodeId) -> u64 {
        self.validate(id);
        self.age[id.idx as usize]
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        let i = id.idx as usize;
        Children::new(
            self,
            self.first_child[i],
            self.last_child[i],
            self.n_children[i],
        )
    }

    /// Returns all live nodes without a parent, in slot order.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| {
                let i = idx as usize;
                self.flags[i].alive && self.parent[i] == INVALID
            })
            .map(|idx| self.id_at(idx))
            .collect()
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    // -- Flags --

    /// Returns whether the node is hidden (its own flag only).
    #[must_use]
    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.validate(id);
        self.flags[id.idx as usize].hidden
    }

    /// Returns whether the node or any ancestor is hidden.
    #[must_use]
    pub fn is_effectively_hidden(&self, id: NodeId) -> bool {
        self.validate(id);
        self.hidden_in_chain(id.idx)
    }

    /// Returns whether the node is marked for redraw.
    #[must_use]
    pub fn needs_redraw(&self, id: NodeId) -> bool {
        self.validate(id);
        self.flags[id.idx as usize].needs_redraw
    }

    /// Returns whether the node is marked for relayout.
    #[must_use]
    pub fn needs_relayout(&self, id: NodeId) -> bool {
        self.validate(id);
        self.flags[id.idx as usize].needs_relayout
    }

    /// Returns whether the node is currently running its layout pass.
    #[must_use]
    pub fn in_layout(&self, id: NodeId) -> bool {
        self.validate(id);
        self.flags[id.idx as usize].in_layout
    }

    // -- Names --

    /// Sets or clears a node's debug name.
    pub fn set_name(&mut self, id: NodeId, name: Option<&str>) {
        self.validate(id);
        self.names[id.idx as usize] = name.map(String::from);
    }

    /// Returns the name set with [`set_name`](Self::set_name).
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.validate(id);
        self.names[id.idx as usize].as_deref()
    }

    /// Returns a label for diagnostics: the node's name, or a description
    /// built from its handle on demand.
    ///
    /// Stale handles are described rather than rejected.
    #[must_use]
    pub fn debug_name(&self, id: NodeId) -> Cow<'_, str> {
        if self.is_alive(id) {
            if let Some(name) = &self.names[id.idx as usize] {
                return Cow::Borrowed(name);
            }
        }
        Cow::Owned(alloc::format!("{id}"))
    }

    // -- Delegates --

    /// Installs or removes the delegate that customizes a node's hooks.
    pub fn set_delegate(&mut self, id: NodeId, delegate: Option<Box<dyn NodeDelegate>>) {
        self.validate(id);
        self.delegates[id.idx as usize] = delegate;
    }

    /// Returns whether the node has a delegate installed.
    #[must_use]
    pub fn has_delegate(&self, id: NodeId) -> bool {
        self.validate(id);
        self.delegates[id.idx as usize].is_some()
    }

    /// Runs `f` with the node's delegate (or the default hooks) and the
    /// store.
    ///
    /// The delegate is moved out of its slot for the duration of the call and
    /// put back afterwards, unless the hook destroyed the node or installed a
    /// replacement. Its propagation answers are taken before the call, so
    /// climbs that reach the node from inside the hook still honor them.
    pub(crate) fn with_delegate<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut dyn NodeDelegate, &mut Self) -> R,
    ) -> R {
        let i = id.idx as usize;
        match self.delegates[i].take() {
            None => f(&mut DefaultDelegate, self),
            Some(mut delegate) => {
                let redraw = delegate.should_propagate_redraw(self, id);
                let relayout = delegate.should_propagate_relayout(self, id);
                self.checked_out.push(CheckedOut {
                    node: id,
                    redraw,
                    relayout,
                });
                let out = f(delegate.as_mut(), self);
                self.checked_out.pop();
                if self.is_alive(id) && self.delegates[i].is_none() {
                    self.delegates[i] = Some(delegate);
                }
                out
            }
        }
    }

    /// Asks the node's delegate whether a redraw climb may pass it.
    pub(crate) fn should_propagate_redraw(&mut self, id: NodeId) -> bool {
        let i = id.idx as usize;
        match self.delegates[i].take() {
            Some(mut delegate) => {
                let pass = delegate.should_propagate_redraw(self, id);
                self.delegates[i] = Some(delegate);
                pass
            }
            None => self.checked_out_answer(id).is_none_or(|c| c.redraw),
        }
    }

    /// Asks the node's delegate whether a relayout climb may pass it.
    pub(crate) fn should_propagate_relayout(&mut self, id: NodeId) -> bool {
        let i = id.idx as usize;
        match self.delegates[i].take() {
            Some(mut delegate) => {
                let pass = delegate.should_propagate_relayout(self, id);
                self.delegates[i] = Some(delegate);
                pass
            }
            None => self.checked_out_answer(id).is_none_or(|c| c.relayout),
        }
    }

    fn checked_out_answer(&self, id: NodeId) -> Option<CheckedOut> {
        self.checked_out.iter().rev().find(|c| c.node == id).copied()
    }

    // -- Outbox --

    /// Drains queued structural events in the order they happened.
    pub fn take_events(&mut self) -> Vec<TreeEvent> {
        core::mem::take(&mut self.events)
    }

    /// Drains queued frame-clock requests.
    pub fn take_frame_requests(&mut self) -> Vec<FrameRequest> {
        core::mem::take(&mut self.frame_requests)
    }

    /// Forwards queued frame-clock requests to `clock`.
    pub fn flush_frame_requests(&mut self, clock: &mut dyn FrameClock) {
        for request in self.frame_requests.drain(..) {
            clock.request_phase(request.root, request.phase);
        }
    }

    /// Returns whether any frame-clock request is queued.
    #[must_use]
    pub fn has_frame_requests(&self) -> bool {
        !self.frame_requests.is_empty()
    }

    pub(crate) fn request_frame(&mut self, root: u32, phase: FramePhase) {
        let request = FrameRequest {
            root: self.id_at(root),
            phase,
        };
        if !self.frame_requests.contains(&request) {
            self.frame_requests.push(request);
        }
    }

    // -- Update batching --

    /// Opens an update scope. Redraw and relayout requests issued while any
    /// scope is open are recorded and only propagated when the outermost
    /// scope closes.
    pub fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    /// Closes an update scope, replaying deferred invalidation when it was
    /// the outermost one.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn end_update(&mut self) {
        assert!(self.update_depth > 0, "end_update without begin_update");
        self.update_depth -= 1;
        if self.update_depth > 0 {
            return;
        }
        for (id, kind) in core::mem::take(&mut self.deferred) {
            if !self.is_alive(id) {
                continue;
            }
            match kind {
                Invalidation::Redraw => self.queue_redraw(id),
                Invalidation::Relayout => self.queue_relayout(id),
                Invalidation::RelayoutIfNeeded => self.queue_relayout_if_needed(id),
            }
        }
    }

    /// Runs `f` inside an update scope.
    pub fn batch_update<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_update();
        let out = f(self);
        self.end_update();
        out
    }

    /// Records `kind` for replay if an update scope is open.
    ///
    /// Returns whether the request was deferred.
    pub(crate) fn defer(&mut self, id: NodeId, kind: Invalidation) -> bool {
        if self.update_depth == 0 {
            return false;
        }
        if !self.deferred.contains(&(id, kind)) {
            self.deferred.push((id, kind));
        }
        true
    }

    // -- Diagnostics --

    /// Installs the sink that receives trace events (requires the `trace`
    /// feature to have any effect).
    pub fn set_trace_sink(&mut self, sink: Option<Box<dyn TraceSink>>) {
        self.sink = sink;
    }

    /// Removes and returns the installed sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.sink.take()
    }

    /// Sets which diagnostic categories reach the sink.
    pub fn set_debug_flags(&mut self, flags: DebugFlags) {
        self.debug_flags = flags;
    }

    /// Returns the enabled diagnostic categories.
    #[must_use]
    pub fn debug_flags(&self) -> DebugFlags {
        self.debug_flags
    }

    pub(crate) fn tracer(&mut self) -> Tracer<'_> {
        let flags = self.debug_flags;
        match self.sink.as_deref_mut() {
            Some(sink) => Tracer::filtered(sink, flags),
            None => Tracer::none(),
        }
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    #[inline]
    pub(crate) fn opt_id(&self, idx: u32) -> Option<NodeId> {
        (idx != INVALID).then(|| self.id_at(idx))
    }

    pub(crate) fn hidden_in_chain(&self, mut idx: u32) -> bool {
        while idx != INVALID {
            if self.flags[idx as usize].hidden {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    pub(crate) fn top_level_idx(&self, mut idx: u32) -> u32 {
        while self.parent[idx as usize] != INVALID {
            idx = self.parent[idx as usize];
        }
        idx
    }

    #[inline]
    pub(crate) fn bump_age(&mut self, idx: u32) {
        self.age[idx as usize] += 1;
    }

    /// Threads `c` into `p`'s child list between `prev` and `next`.
    ///
    /// `prev` and `next` must be adjacent children of `p` (or `INVALID` at
    /// the ends). Does not touch the age.
    pub(crate) fn splice_in(&mut self, p: u32, c: u32, prev: u32, next: u32) {
        let ci = c as usize;
        self.parent[ci] = p;
        self.prev_sibling[ci] = prev;
        self.next_sibling[ci] = next;
        if prev == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[prev as usize] = c;
        }
        if next == INVALID {
            self.last_child[p as usize] = c;
        } else {
            self.prev_sibling[next as usize] = c;
        }
        self.n_children[p as usize] += 1;
        self.invalidate_modelview_at(c);
    }

    /// Removes `c` from its parent's child list. Does not touch the age.
    pub(crate) fn splice_out(&mut self, c: u32) {
        let ci = c as usize;
        let p = self.parent[ci];
        let prev = self.prev_sibling[ci];
        let next = self.next_sibling[ci];

        if prev == INVALID {
            self.first_child[p as usize] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next == INVALID {
            self.last_child[p as usize] = prev;
        } else {
            self.prev_sibling[next as usize] = prev;
        }
        self.n_children[p as usize] -= 1;

        self.parent[ci] = INVALID;
        self.prev_sibling[ci] = INVALID;
        self.next_sibling[ci] = INVALID;
        self.invalidate_modelview_at(c);
    }

    /// Marks a node's cached modelview stale if it has one.
    pub(crate) fn invalidate_modelview_at(&mut self, idx: u32) {
        if let Some(info) = self.state[idx as usize].transform_if_allocated() {
            info.invalidate_modelview();
        }
    }

    /// Destroys the detached node at `idx` and every unretained descendant.
    ///
    /// Uses an explicit worklist so arbitrarily deep trees do not recurse.
    pub(crate) fn destroy_subtree(&mut self, idx: u32) {
        debug_assert!(
            self.parent[idx as usize] == INVALID,
            "destroy_subtree on an attached node"
        );
        let mut work = vec![idx];
        while let Some(n) = work.pop() {
            while self.first_child[n as usize] != INVALID {
                let c = self.first_child[n as usize];
                self.splice_out(c);
                self.bump_age(n);
                self.events.push(TreeEvent::ChildRemoved {
                    parent: self.id_at(n),
                    child: self.id_at(c),
                });
                if self.refs[c as usize] == 0 {
                    work.push(c);
                } else {
                    self.flags[c as usize].floating = false;
                }
            }
            self.free_slot(n);
        }
    }

    fn free_slot(&mut self, idx: u32) {
        let i = idx as usize;
        let old = self.id_at(idx);
        self.generation[i] = self.generation[i].wrapping_add(1);
        self.flags[i] = NodeFlags::default();
        self.refs[i] = 0;
        self.state[i] = NodeState::default();
        self.names[i] = None;
        self.delegates[i] = None;
        self.frame_requests.retain(|r| r.root != old);
        self.free_list.push(idx);
        self.events.push(TreeEvent::Destroyed { node: old });
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        assert!(store.is_alive(id));
        assert!(store.is_floating(id));
        store.destroy_node(id);
        assert!(!store.is_alive(id));
        assert_eq!(store.take_events(), vec![TreeEvent::Destroyed { node: id }]);
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut store = NodeStore::new();
        let id1 = store.create_node();
        store.destroy_node(id1);
        let id2 = store.create_node();
        assert!(!store.is_alive(id1));
        assert!(store.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
    }

    #[test]
    fn reused_slot_starts_clean() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        store.set_name(parent, Some("old"));
        store.destroy_node(parent);

        let fresh = store.create_node();
        assert_eq!(store.n_children(fresh), 0);
        assert_eq!(store.age(fresh), 0);
        assert_eq!(store.name(fresh), None);
        assert!(!store.needs_relayout(fresh));
    }

    #[test]
    fn destroy_cascades_to_unretained_children() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let a = store.create_node();
        let b = store.create_node();
        let a1 = store.create_node();
        store.add_child(root, a);
        store.add_child(root, b);
        store.add_child(a, a1);
        store.retain(b);

        store.destroy_node(root);

        assert!(!store.is_alive(root));
        assert!(!store.is_alive(a));
        assert!(!store.is_alive(a1));
        assert!(store.is_alive(b), "retained child survives");
        assert_eq!(store.parent(b), None);
        assert!(!store.is_floating(b));

        store.release(b);
        assert!(!store.is_alive(b));
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn deep_chain_destroys_without_recursion() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let mut tip = root;
        for _ in 0..2_000 {
            let next = store.create_node();
            store.add_child(tip, next);
            tip = next;
        }
        store.destroy_node(root);
        assert_eq!(store.live_count(), 0);
        assert!(!store.is_alive(tip));
    }

    #[test]
    fn retained_node_survives_removal() {
        let mut store = NodeStore::new();
        let parent = store.create_node();
        let child = store.create_node();
        store.add_child(parent, child);
        assert!(!store.is_floating(child));

        store.retain(child);
        store.remove_child(parent, child);
        assert!(store.is_alive(child));
        assert_eq!(store.ref_count(child), 1);

        // Re-adding transfers ownership back to a parent.
        store.add_child(parent, child);
        store.release(child);
        assert!(store.is_alive(child));
        assert_eq!(store.parent(child), Some(parent));
    }

    #[test]
    fn floating_node_survives_release() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        store.retain(id);
        store.release(id);
        assert!(store.is_alive(id), "floating nodes are owned by nobody yet");
    }

    #[test]
    fn roots_returns_parentless_nodes() {
        let mut store = NodeStore::new();
        let a = store.create_node();
        let b = store.create_node();
        let c = store.create_node();
        let d = store.create_node();
        store.add_child(a, c);
        store.destroy_node(d);

        assert_eq!(store.roots(), vec![a, b]);
    }

    #[test]
    fn debug_name_prefers_explicit_name() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        assert_eq!(store.debug_name(id), alloc::format!("<node>[{}@0]", id.index()));
        store.set_name(id, Some("toolbar"));
        assert_eq!(store.debug_name(id), "toolbar");
        store.destroy_node(id);
        assert!(store.debug_name(id).starts_with("<node>"));
    }

    #[test]
    fn update_scope_defers_propagation() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let child = store.create_node();
        store.add_child(root, child);
        store.attach_frame_clock(root);
        let _ = store.take_frame_requests();

        store.begin_update();
        store.queue_redraw(child);
        store.queue_redraw(child);
        assert!(!store.needs_redraw(child));
        assert!(!store.has_frame_requests());
        store.end_update();

        assert!(store.needs_redraw(child));
        assert!(store.needs_redraw(root));
        assert_eq!(
            store.take_frame_requests(),
            vec![FrameRequest {
                root,
                phase: FramePhase::Paint,
            }]
        );
    }

    #[test]
    fn nested_update_scopes_replay_once() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        store.batch_update(|s| {
            s.batch_update(|s| s.queue_relayout(root));
            assert!(!s.needs_relayout(root));
        });
        assert!(store.needs_relayout(root));
    }

    #[test]
    #[should_panic(expected = "end_update without begin_update")]
    fn unbalanced_end_update_panics() {
        let mut store = NodeStore::new();
        store.end_update();
    }

    #[test]
    #[should_panic(expected = "without a matching retain")]
    fn release_without_retain_panics() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        store.release(id);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_parent() {
        let mut store = NodeStore::new();
        let id = store.create_node();
        store.destroy_node(id);
        let _ = store.parent(id);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_add_child() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let id = store.create_node();
        store.destroy_node(id);
        store.add_child(root, id);
    }
}
