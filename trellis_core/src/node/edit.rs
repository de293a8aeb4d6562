// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree editing: insertion, removal, reordering and replacement of children.
//!
//! Every operation keeps the child list consistent (`n_children` matches the
//! sibling chains, both ends are set iff the list is non-empty, every child
//! points back at its parent) and bumps the parent's age by exactly one per
//! structural step. Misuse (inserting a node that already has a parent,
//! naming a sibling that belongs elsewhere) panics.

use super::id::{INVALID, NodeId};
use super::store::{NodeStore, TreeEvent};
use super::traverse::ChildCursor;

/// Where to insert a child among its new siblings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Placement {
    /// After the current last child.
    #[default]
    Append,
    /// Before the current first child.
    Prepend,
    /// Immediately after the given sibling; `None` appends.
    After(Option<NodeId>),
    /// Immediately before the given sibling; `None` prepends.
    Before(Option<NodeId>),
    /// At the given index. `0` prepends; negative or out-of-range indices
    /// append.
    AtIndex(isize),
    /// Into the gap between two adjacent siblings. `None` stands for the
    /// corresponding end of the list.
    Between(Option<NodeId>, Option<NodeId>),
}

impl NodeStore {
    // -- Insertion --

    /// Appends `child` to `parent`'s children.
    ///
    /// # Panics
    ///
    /// See [`insert_child`](Self::insert_child).
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, child, Placement::Append);
    }

    /// Inserts `child` at `index` among `parent`'s children.
    ///
    /// # Panics
    ///
    /// See [`insert_child`](Self::insert_child).
    pub fn insert_child_at_index(&mut self, parent: NodeId, child: NodeId, index: isize) {
        self.insert_child(parent, child, Placement::AtIndex(index));
    }

    /// Inserts `child` right after `sibling`, or last when `sibling` is
    /// `None`.
    ///
    /// # Panics
    ///
    /// See [`insert_child`](Self::insert_child).
    pub fn insert_child_after(&mut self, parent: NodeId, child: NodeId, sibling: Option<NodeId>) {
        self.insert_child(parent, child, Placement::After(sibling));
    }

    /// Inserts `child` right before `sibling`, or first when `sibling` is
    /// `None`.
    ///
    /// # Panics
    ///
    /// See [`insert_child`](Self::insert_child).
    pub fn insert_child_before(&mut self, parent: NodeId, child: NodeId, sibling: Option<NodeId>) {
        self.insert_child(parent, child, Placement::Before(sibling));
    }

    /// Inserts a detached `child` under `parent` at `placement`.
    ///
    /// The parent takes ownership (a floating child stops floating), the
    /// parent's age grows by one, a [`TreeEvent::ChildAdded`] is queued, and
    /// the child is queued for relayout.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, if `child` already has a parent, if
    /// `child` is `parent` or one of its ancestors, or if a sibling named by
    /// `placement` is not a child of `parent`.
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, placement: Placement) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == INVALID,
            "{} already has a parent",
            self.debug_name(child)
        );
        assert!(
            !self.contains(child, parent),
            "adding {} under {} would create a cycle",
            self.debug_name(child),
            self.debug_name(parent)
        );

        let (prev, next) = self.resolve_placement(p, placement);
        self.splice_in(p, c, prev, next);
        self.bump_age(p);
        self.flags[c as usize].floating = false;
        self.events.push(TreeEvent::ChildAdded { parent, child });

        self.queue_relayout(child);
    }

    // -- Removal --

    /// Detaches `child` from `parent` and releases the parent's ownership.
    ///
    /// If nothing [retains](Self::retain) the child it is destroyed along
    /// with its unretained descendants. The parent is queued for relayout,
    /// since its remaining children may need to be placed again.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == p,
            "{} is not a child of {}",
            self.debug_name(child),
            self.debug_name(parent)
        );

        self.splice_out(c);
        self.bump_age(p);
        self.events.push(TreeEvent::ChildRemoved { parent, child });

        self.queue_relayout(parent);

        if self.refs[c as usize] == 0 {
            self.destroy_subtree(c);
        }
    }

    /// Removes every child of `parent`, front to back.
    ///
    /// Invalidation is batched so ancestors are visited once. Calling this on
    /// a node without children does nothing.
    pub fn remove_all_children(&mut self, parent: NodeId) {
        self.validate(parent);
        if self.n_children[parent.idx as usize] == 0 {
            return;
        }
        self.batch_update(|store| {
            let mut cursor = ChildCursor::new(store, parent);
            while cursor.next(store).is_some() {
                cursor.remove_current(store);
            }
        });
        let p = parent.idx as usize;
        assert!(
            self.n_children[p] == 0
                && self.first_child[p] == INVALID
                && self.last_child[p] == INVALID,
            "children remain after remove_all_children"
        );
    }

    /// Replaces `old_child` with the detached `new_child` at the same
    /// position.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, `old_child` is not a child of `parent`,
    /// `new_child` already has a parent, or `new_child` is `parent` or one
    /// of its ancestors. The tree is left untouched when it panics.
    pub fn replace_child(&mut self, parent: NodeId, old_child: NodeId, new_child: NodeId) {
        self.validate(parent);
        self.validate(old_child);
        self.validate(new_child);
        assert!(
            self.parent[old_child.idx as usize] == parent.idx,
            "{} is not a child of {}",
            self.debug_name(old_child),
            self.debug_name(parent)
        );
        assert!(
            self.parent[new_child.idx as usize] == INVALID,
            "{} already has a parent",
            self.debug_name(new_child)
        );
        assert!(
            !self.contains(new_child, parent),
            "adding {} under {} would create a cycle",
            self.debug_name(new_child),
            self.debug_name(parent)
        );

        let prev = self.opt_id(self.prev_sibling[old_child.idx as usize]);
        let next = self.opt_id(self.next_sibling[old_child.idx as usize]);
        self.batch_update(|store| {
            store.remove_child(parent, old_child);
            store.insert_child(parent, new_child, Placement::Between(prev, next));
        });
    }

    // -- Reordering --

    /// Moves `child` to `index` among its siblings.
    ///
    /// The index is interpreted after `child` is taken out of the list, so
    /// afterwards [`child_at_index`](Self::child_at_index) returns `child` for
    /// any in-range `index`. Counts as one structural change and queues a
    /// [`TreeEvent::ChildMoved`]; the child never appears detached.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale or `child` is not a child of `parent`.
    pub fn set_child_at_index(&mut self, parent: NodeId, child: NodeId, index: isize) {
        self.move_child(parent, child, Placement::AtIndex(index));
    }

    /// Moves `child` right before `sibling`, or first when `sibling` is
    /// `None`.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, `child` or `sibling` is not a child of
    /// `parent`, or `sibling` is `child`.
    pub fn set_child_before(&mut self, parent: NodeId, child: NodeId, sibling: Option<NodeId>) {
        self.move_child(parent, child, Placement::Before(sibling));
    }

    /// Moves `child` right after `sibling`, or last when `sibling` is `None`.
    ///
    /// # Panics
    ///
    /// Panics if a handle is stale, `child` or `sibling` is not a child of
    /// `parent`, or `sibling` is `child`.
    pub fn set_child_after(&mut self, parent: NodeId, child: NodeId, sibling: Option<NodeId>) {
        self.move_child(parent, child, Placement::After(sibling));
    }

    fn move_child(&mut self, parent: NodeId, child: NodeId, placement: Placement) {
        self.validate(parent);
        self.validate(child);
        let p = parent.idx;
        let c = child.idx;
        assert!(
            self.parent[c as usize] == p,
            "{} is not a child of {}",
            self.debug_name(child),
            self.debug_name(parent)
        );
        if let Placement::After(Some(s)) | Placement::Before(Some(s)) = placement {
            assert!(
                s != child,
                "cannot position {} relative to itself",
                self.debug_name(child)
            );
            self.assert_child_of(p, s);
        }

        self.splice_out(c);
        let (prev, next) = self.resolve_placement(p, placement);
        self.splice_in(p, c, prev, next);
        self.bump_age(p);
        self.events.push(TreeEvent::ChildMoved { parent, child });

        self.queue_relayout(child);
    }

    // -- Queries --

    /// Returns the child at `index`, or `None` when out of range.
    #[must_use]
    pub fn child_at_index(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.children(parent).nth(index)
    }

    /// Returns whether `descendant` is `ancestor` or lies in its subtree.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        self.validate(ancestor);
        self.validate(descendant);
        let mut idx = descendant.idx;
        while idx != INVALID {
            if idx == ancestor.idx {
                return true;
            }
            idx = self.parent[idx as usize];
        }
        false
    }

    /// Returns the root of the tree containing `id`.
    #[must_use]
    pub fn top_level(&self, id: NodeId) -> NodeId {
        self.validate(id);
        self.id_at(self.top_level_idx(id.idx))
    }

    // -- Internal helpers --

    /// Resolves a placement into the `(prev, next)` neighbors of the gap the
    /// child will occupy.
    fn resolve_placement(&self, p: u32, placement: Placement) -> (u32, u32) {
        let pi = p as usize;
        match placement {
            Placement::Append | Placement::After(None) => (self.last_child[pi], INVALID),
            Placement::Prepend | Placement::Before(None) => (INVALID, self.first_child[pi]),
            Placement::After(Some(s)) => {
                self.assert_child_of(p, s);
                (s.idx, self.next_sibling[s.idx as usize])
            }
            Placement::Before(Some(s)) => {
                self.assert_child_of(p, s);
                (self.prev_sibling[s.idx as usize], s.idx)
            }
            Placement::AtIndex(index) => {
                let n = self.n_children[pi] as usize;
                match usize::try_from(index) {
                    Ok(0) => (INVALID, self.first_child[pi]),
                    Ok(i) if i < n => {
                        let mut nth = self.first_child[pi];
                        for _ in 0..i {
                            nth = self.next_sibling[nth as usize];
                        }
                        (self.prev_sibling[nth as usize], nth)
                    }
                    _ => (self.last_child[pi], INVALID),
                }
            }
            Placement::Between(prev, next) => {
                let prev = prev.map_or(INVALID, |s| {
                    self.assert_child_of(p, s);
                    s.idx
                });
                let next = next.map_or(INVALID, |s| {
                    self.assert_child_of(p, s);
                    s.idx
                });
                let after_prev = if prev == INVALID {
                    self.first_child[pi]
                } else {
                    self.next_sibling[prev as usize]
                };
                assert!(after_prev == next, "siblings are not adjacent");
                (prev, next)
            }
        }
    }

    fn assert_child_of(&self, p: u32, sibling: NodeId) {
        self.validate(sibling);
        assert!(
            self.parent[sibling.idx as usize] == p,
            "sibling {} is not a child of {}",
            self.debug_name(sibling),
            self.debug_name(self.id_at(p))
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn kids(store: &NodeStore, parent: NodeId) -> Vec<NodeId> {
        store.children(parent).collect()
    }

    /// Walks both sibling chains and checks them against the count.
    fn assert_chain_consistent(store: &NodeStore, parent: NodeId) {
        let forward: Vec<_> = store.children(parent).collect();
        let mut backward: Vec<_> = store.children(parent).rev().collect();
        backward.reverse();
        assert_eq!(forward.len(), store.n_children(parent) as usize);
        assert_eq!(forward, backward);
        assert_eq!(store.first_child(parent), forward.first().copied());
        assert_eq!(store.last_child(parent), forward.last().copied());
        for child in &forward {
            assert_eq!(store.parent(*child), Some(parent));
        }
    }

    fn abc(store: &mut NodeStore) -> (NodeId, NodeId, NodeId, NodeId) {
        let root = store.create_node();
        let a = store.create_node();
        let b = store.create_node();
        let c = store.create_node();
        store.add_child(root, a);
        store.add_child(root, b);
        store.add_child(root, c);
        (root, a, b, c)
    }

    #[test]
    fn insert_after_then_remove() {
        let mut store = NodeStore::new();
        let (root, a, b, c) = abc(&mut store);
        let d = store.create_node();

        let age = store.age(root);
        store.insert_child_after(root, d, Some(a));
        assert_eq!(kids(&store, root), vec![a, d, b, c]);
        assert_eq!(store.age(root), age + 1);

        store.remove_child(root, b);
        assert_eq!(kids(&store, root), vec![a, d, c]);
        assert_eq!(store.age(root), age + 2);
        assert!(!store.is_alive(b), "unretained child is destroyed");
        assert_chain_consistent(&store, root);
    }

    #[test]
    fn every_placement_keeps_chains_consistent() {
        let mut store = NodeStore::new();
        let (root, a, b, c) = abc(&mut store);
        let n: Vec<_> = (0..6).map(|_| store.create_node()).collect();

        store.insert_child(root, n[0], Placement::Prepend);
        store.insert_child(root, n[1], Placement::Before(Some(c)));
        store.insert_child(root, n[2], Placement::Before(None));
        store.insert_child(root, n[3], Placement::After(None));
        store.insert_child(root, n[4], Placement::Between(Some(a), Some(b)));
        store.insert_child(root, n[5], Placement::Between(Some(n[3]), None));

        assert_eq!(
            kids(&store, root),
            vec![n[2], n[0], a, n[4], b, n[1], c, n[3], n[5]]
        );
        assert_chain_consistent(&store, root);
    }

    #[test]
    fn insert_at_index_clamps() {
        let mut store = NodeStore::new();
        let (root, a, b, c) = abc(&mut store);
        let first = store.create_node();
        let middle = store.create_node();
        let past_end = store.create_node();
        let negative = store.create_node();

        store.insert_child_at_index(root, first, 0);
        store.insert_child_at_index(root, middle, 2);
        store.insert_child_at_index(root, past_end, 99);
        store.insert_child_at_index(root, negative, -1);

        assert_eq!(
            kids(&store, root),
            vec![first, a, middle, b, c, past_end, negative]
        );
        assert_chain_consistent(&store, root);
    }

    #[test]
    fn insert_into_empty_parent_sets_both_ends() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let only = store.create_node();
        store.insert_child_at_index(root, only, 5);
        assert_eq!(store.first_child(root), Some(only));
        assert_eq!(store.last_child(root), Some(only));
        assert_eq!(store.n_children(root), 1);
    }

    #[test]
    fn ages_only_move_on_structure() {
        let mut store = NodeStore::new();
        let (root, a, _, _) = abc(&mut store);
        assert_eq!(store.age(root), 3);
        let age = store.age(root);

        store.set_hidden(a, true);
        store.queue_redraw(a);
        store.set_opacity(a, 0.5);
        assert_eq!(store.age(root), age);

        store.set_child_at_index(root, a, 2);
        assert_eq!(store.age(root), age + 1, "a reorder is one change");
    }

    #[test]
    fn set_child_at_index_round_trips() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let nodes: Vec<_> = (0..5).map(|_| store.create_node()).collect();
        for n in &nodes {
            store.add_child(root, *n);
        }
        for child in &nodes {
            for i in 0..nodes.len() {
                store.set_child_at_index(root, *child, i as isize);
                assert_eq!(store.child_at_index(root, i), Some(*child));
                assert_chain_consistent(&store, root);
            }
        }
    }

    #[test]
    fn reorder_emits_only_moved() {
        let mut store = NodeStore::new();
        let (root, a, b, c) = abc(&mut store);
        let _ = store.take_events();

        store.set_child_before(root, c, Some(a));
        store.set_child_after(root, a, None);
        assert_eq!(kids(&store, root), vec![c, b, a]);
        assert_eq!(
            store.take_events(),
            vec![
                TreeEvent::ChildMoved {
                    parent: root,
                    child: c,
                },
                TreeEvent::ChildMoved {
                    parent: root,
                    child: a,
                },
            ]
        );
        assert!(store.is_alive(a) && store.is_alive(c));
    }

    #[test]
    fn replace_child_fills_the_same_gap() {
        let mut store = NodeStore::new();
        let (root, a, b, c) = abc(&mut store);
        let d = store.create_node();
        store.replace_child(root, b, d);
        assert_eq!(kids(&store, root), vec![a, d, c]);
        assert!(!store.is_alive(b));

        let e = store.create_node();
        store.replace_child(root, a, e);
        let f = store.create_node();
        store.replace_child(root, c, f);
        assert_eq!(kids(&store, root), vec![e, d, f]);
        assert_chain_consistent(&store, root);
    }

    #[test]
    fn replace_with_ancestor_leaves_tree_untouched() {
        let mut store = NodeStore::new();
        let (root, a, _, _) = abc(&mut store);
        let before = kids(&store, root);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.replace_child(root, a, root);
        }));
        assert!(result.is_err());
        assert!(store.is_alive(a));
        assert_eq!(kids(&store, root), before);
        assert_chain_consistent(&store, root);
    }

    #[test]
    fn removal_relayouts_parent() {
        let mut store = NodeStore::new();
        let (root, a, _, _) = abc(&mut store);
        store.revalidate_layout(root);
        assert!(!store.needs_relayout(root));

        store.remove_child(root, a);
        assert!(store.needs_relayout(root));
    }

    #[test]
    fn remove_all_children_empties_and_is_idempotent() {
        let mut store = NodeStore::new();
        let (root, a, b, c) = abc(&mut store);
        store.retain(b);

        store.remove_all_children(root);
        assert_eq!(store.n_children(root), 0);
        assert_eq!(store.first_child(root), None);
        assert_eq!(store.last_child(root), None);
        assert!(!store.is_alive(a));
        assert!(store.is_alive(b));
        assert!(!store.is_alive(c));

        let age = store.age(root);
        store.remove_all_children(root);
        assert_eq!(store.age(root), age);
    }

    #[test]
    fn single_ownership_is_enforced() {
        let mut store = NodeStore::new();
        let (root, a, _, _) = abc(&mut store);
        let other = store.create_node();
        let before = kids(&store, root);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            store.add_child(other, a);
        }));
        assert!(result.is_err());
        assert_eq!(kids(&store, root), before);
        assert_eq!(store.parent(a), Some(root));
        assert_eq!(store.n_children(other), 0);
    }

    #[test]
    fn contains_and_top_level() {
        let mut store = NodeStore::new();
        let (root, a, b, _) = abc(&mut store);
        let a1 = store.create_node();
        store.add_child(a, a1);

        assert!(store.contains(root, a1));
        assert!(store.contains(a, a1));
        assert!(store.contains(a1, a1));
        assert!(!store.contains(b, a1));
        assert!(!store.contains(a1, root));
        assert_eq!(store.top_level(a1), root);
        assert_eq!(store.top_level(root), root);
    }

    #[test]
    fn child_at_index_out_of_range_is_none() {
        let mut store = NodeStore::new();
        let (root, a, _, c) = abc(&mut store);
        assert_eq!(store.child_at_index(root, 0), Some(a));
        assert_eq!(store.child_at_index(root, 2), Some(c));
        assert_eq!(store.child_at_index(root, 3), None);
    }

    #[test]
    fn add_and_remove_queue_events() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let child = store.create_node();
        store.add_child(root, child);
        store.remove_child(root, child);
        assert_eq!(
            store.take_events(),
            vec![
                TreeEvent::ChildAdded {
                    parent: root,
                    child,
                },
                TreeEvent::ChildRemoved {
                    parent: root,
                    child,
                },
                TreeEvent::Destroyed { node: child },
            ]
        );
    }

    #[test]
    #[should_panic(expected = "already has a parent")]
    fn add_parented_child_panics() {
        let mut store = NodeStore::new();
        let (_, a, _, _) = abc(&mut store);
        let other = store.create_node();
        store.add_child(other, a);
    }

    #[test]
    #[should_panic(expected = "is not a child of")]
    fn remove_from_wrong_parent_panics() {
        let mut store = NodeStore::new();
        let (_, a, _, _) = abc(&mut store);
        let other = store.create_node();
        store.remove_child(other, a);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn adding_an_ancestor_panics() {
        let mut store = NodeStore::new();
        let (root, a, _, _) = abc(&mut store);
        store.retain(root);
        let detached = store.create_node();
        store.add_child(detached, root);
        store.remove_child(detached, root);
        store.add_child(a, root);
    }

    #[test]
    #[should_panic(expected = "would create a cycle")]
    fn replacing_with_ancestor_panics() {
        let mut store = NodeStore::new();
        let (root, a, _, _) = abc(&mut store);
        let a1 = store.create_node();
        store.add_child(a, a1);
        store.replace_child(a, a1, root);
    }

    #[test]
    #[should_panic(expected = "sibling")]
    fn foreign_sibling_panics() {
        let mut store = NodeStore::new();
        let (root, _, _, _) = abc(&mut store);
        let (_, stranger, _, _) = abc(&mut store);
        let child = store.create_node();
        store.insert_child_after(root, child, Some(stranger));
    }

    #[test]
    #[should_panic(expected = "relative to itself")]
    fn move_relative_to_self_panics() {
        let mut store = NodeStore::new();
        let (root, a, _, _) = abc(&mut store);
        store.set_child_before(root, a, Some(a));
    }
}
