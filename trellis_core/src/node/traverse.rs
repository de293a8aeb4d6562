// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.
//!
//! [`Children`] borrows the store and cannot observe mutation. [`ChildCursor`]
//! holds no borrow, so the tree may be edited between steps; it captures the
//! parent's age and refuses to move once any edit other than its own
//! [`remove_current`](ChildCursor::remove_current) has touched the child
//! list.

use super::id::{INVALID, NodeId};
use super::store::NodeStore;

/// An iterator over the direct children of a node, in sibling order.
///
/// Created by [`NodeStore::children`]. Also iterates back to front.
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    front: u32,
    back: u32,
    remaining: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, first: u32, last: u32, len: u32) -> Self {
        Self {
            store,
            front: first,
            back: last,
            remaining: len,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.front;
        self.remaining -= 1;
        self.front = self.store.next_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        if self.remaining == 0 {
            return None;
        }
        let idx = self.back;
        self.remaining -= 1;
        self.back = self.store.prev_sibling[idx as usize];
        Some(self.store.id_at(idx))
    }
}

impl ExactSizeIterator for Children<'_> {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
    /// Freshly created: `next` starts at the front, `prev` at the back.
    Unstarted,
    At(u32),
    BeforeFirst,
    AfterLast,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// A cursor over a node's children that tolerates removal of the current
/// child.
///
/// The cursor records the parent's age when created. Any structural change
/// made through another path makes it invalid, and stepping an invalid cursor
/// panics. [`remove_current`](Self::remove_current) removes the child last
/// returned and re-captures the age, so the walk continues with the next
/// child in the same direction.
///
/// ```
/// use trellis_core::node::{ChildCursor, NodeStore};
///
/// let mut store = NodeStore::new();
/// let root = store.create_node();
/// for _ in 0..4 {
///     let child = store.create_node();
///     store.add_child(root, child);
/// }
///
/// // Remove every other child.
/// let mut cursor = ChildCursor::new(&store, root);
/// let mut keep = true;
/// while cursor.next(&store).is_some() {
///     if !keep {
///         cursor.remove_current(&mut store);
///     }
///     keep = !keep;
/// }
/// assert_eq!(store.n_children(root), 2);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ChildCursor {
    root: NodeId,
    position: Position,
    direction: Direction,
    age: u64,
    can_remove: bool,
}

impl ChildCursor {
    /// Creates a cursor positioned before the children of `root`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn new(store: &NodeStore, root: NodeId) -> Self {
        Self {
            root,
            position: Position::Unstarted,
            direction: Direction::Forward,
            age: store.age(root),
            can_remove: false,
        }
    }

    /// Returns the node whose children are visited.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns whether the child list is unchanged since the cursor last
    /// synchronized with it.
    #[must_use]
    pub fn is_valid(&self, store: &NodeStore) -> bool {
        store.is_alive(self.root) && store.age[self.root.idx as usize] == self.age
    }

    /// Returns the child last returned by [`next`](Self::next) or
    /// [`prev`](Self::prev), if any.
    #[must_use]
    pub fn current(&self, store: &NodeStore) -> Option<NodeId> {
        match self.position {
            Position::At(idx) => Some(store.id_at(idx)),
            _ => None,
        }
    }

    /// Advances toward the last child and returns the new current child.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn next(&mut self, store: &NodeStore) -> Option<NodeId> {
        self.check(store);
        let r = self.root.idx as usize;
        let next = match self.position {
            Position::Unstarted | Position::BeforeFirst => store.first_child[r],
            Position::At(idx) => store.next_sibling[idx as usize],
            Position::AfterLast => INVALID,
        };
        self.direction = Direction::Forward;
        self.settle(store, next, Position::AfterLast)
    }

    /// Steps toward the first child and returns the new current child.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid.
    pub fn prev(&mut self, store: &NodeStore) -> Option<NodeId> {
        self.check(store);
        let r = self.root.idx as usize;
        let prev = match self.position {
            Position::Unstarted | Position::AfterLast => store.last_child[r],
            Position::At(idx) => store.prev_sibling[idx as usize],
            Position::BeforeFirst => INVALID,
        };
        self.direction = Direction::Backward;
        self.settle(store, prev, Position::BeforeFirst)
    }

    /// Removes the current child from the root (see
    /// [`NodeStore::remove_child`]) and keeps the cursor valid.
    ///
    /// The cursor moves back to the current child's neighbor against the
    /// direction of travel, so the following step in the same direction
    /// yields the child after the removed one.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is invalid, or if there is no current child
    /// (including a second call without stepping in between).
    pub fn remove_current(&mut self, store: &mut NodeStore) {
        self.check(store);
        let idx = match self.position {
            Position::At(idx) if self.can_remove => idx,
            _ => panic!("ChildCursor::remove_current without a current child"),
        };
        let i = idx as usize;
        self.position = match self.direction {
            Direction::Forward => match store.prev_sibling[i] {
                INVALID => Position::BeforeFirst,
                p => Position::At(p),
            },
            Direction::Backward => match store.next_sibling[i] {
                INVALID => Position::AfterLast,
                n => Position::At(n),
            },
        };
        let child = store.id_at(idx);
        store.remove_child(self.root, child);
        self.age = store.age[self.root.idx as usize];
        self.can_remove = false;
    }

    fn settle(&mut self, store: &NodeStore, idx: u32, end: Position) -> Option<NodeId> {
        if idx == INVALID {
            self.position = end;
            self.can_remove = false;
            None
        } else {
            self.position = Position::At(idx);
            self.can_remove = true;
            Some(store.id_at(idx))
        }
    }

    fn check(&self, store: &NodeStore) {
        assert!(
            self.is_valid(store),
            "ChildCursor used after {} changed its children",
            store.debug_name(self.root)
        );
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn tree(n: usize) -> (NodeStore, NodeId, Vec<NodeId>) {
        let mut store = NodeStore::new();
        let root = store.create_node();
        let kids: Vec<_> = (0..n)
            .map(|_| {
                let c = store.create_node();
                store.add_child(root, c);
                c
            })
            .collect();
        (store, root, kids)
    }

    #[test]
    fn children_is_double_ended_and_exact() {
        let (store, root, kids) = tree(4);
        let mut it = store.children(root);
        assert_eq!(it.len(), 4);
        assert_eq!(it.next(), Some(kids[0]));
        assert_eq!(it.next_back(), Some(kids[3]));
        assert_eq!(it.next(), Some(kids[1]));
        assert_eq!(it.next_back(), Some(kids[2]));
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn cursor_walks_both_ways() {
        let (store, root, kids) = tree(3);
        let mut cursor = ChildCursor::new(&store, root);
        assert_eq!(cursor.current(&store), None);
        assert_eq!(cursor.next(&store), Some(kids[0]));
        assert_eq!(cursor.next(&store), Some(kids[1]));
        assert_eq!(cursor.prev(&store), Some(kids[0]));
        assert_eq!(cursor.prev(&store), None);
        assert_eq!(cursor.next(&store), Some(kids[0]));

        let mut back = ChildCursor::new(&store, root);
        assert_eq!(back.prev(&store), Some(kids[2]));
        assert_eq!(back.current(&store), Some(kids[2]));
    }

    #[test]
    fn exhausted_cursor_stays_exhausted() {
        let (store, root, kids) = tree(1);
        let mut cursor = ChildCursor::new(&store, root);
        assert_eq!(cursor.next(&store), Some(kids[0]));
        assert_eq!(cursor.next(&store), None);
        assert_eq!(cursor.next(&store), None);
        assert_eq!(cursor.prev(&store), Some(kids[0]));
    }

    #[test]
    fn remove_during_forward_iteration() {
        let (mut store, root, kids) = tree(3);
        let mut cursor = ChildCursor::new(&store, root);
        assert_eq!(cursor.next(&store), Some(kids[0]));
        assert_eq!(cursor.next(&store), Some(kids[1]));
        cursor.remove_current(&mut store);
        assert!(cursor.is_valid(&store));
        assert_eq!(cursor.next(&store), Some(kids[2]));
        assert_eq!(store.children(root).collect::<Vec<_>>(), vec![kids[0], kids[2]]);
    }

    #[test]
    fn remove_first_then_continue() {
        let (mut store, root, kids) = tree(2);
        let mut cursor = ChildCursor::new(&store, root);
        cursor.next(&store);
        cursor.remove_current(&mut store);
        assert_eq!(cursor.next(&store), Some(kids[1]));
        cursor.remove_current(&mut store);
        assert_eq!(cursor.next(&store), None);
        assert_eq!(store.n_children(root), 0);
    }

    #[test]
    fn remove_during_backward_iteration() {
        let (mut store, root, kids) = tree(3);
        let mut cursor = ChildCursor::new(&store, root);
        assert_eq!(cursor.prev(&store), Some(kids[2]));
        cursor.remove_current(&mut store);
        assert_eq!(cursor.prev(&store), Some(kids[1]));
        cursor.remove_current(&mut store);
        assert_eq!(cursor.prev(&store), Some(kids[0]));
        assert_eq!(cursor.prev(&store), None);
        assert_eq!(store.children(root).collect::<Vec<_>>(), vec![kids[0]]);
    }

    #[test]
    fn external_edit_invalidates() {
        let (mut store, root, _) = tree(2);
        let cursor = ChildCursor::new(&store, root);
        assert!(cursor.is_valid(&store));
        let extra = store.create_node();
        store.add_child(root, extra);
        assert!(!cursor.is_valid(&store));
    }

    #[test]
    fn property_changes_keep_cursor_valid() {
        let (mut store, root, kids) = tree(2);
        let cursor = ChildCursor::new(&store, root);
        store.set_opacity(kids[0], 0.25);
        store.set_hidden(kids[1], true);
        let grandchild = store.create_node();
        store.add_child(kids[0], grandchild);
        assert!(cursor.is_valid(&store), "only the root's own list counts");
    }

    #[test]
    #[should_panic(expected = "ChildCursor used after")]
    fn stepping_invalid_cursor_panics() {
        let (mut store, root, kids) = tree(2);
        let mut cursor = ChildCursor::new(&store, root);
        cursor.next(&store);
        store.remove_child(root, kids[1]);
        cursor.next(&store);
    }

    #[test]
    #[should_panic(expected = "without a current child")]
    fn double_remove_panics() {
        let (mut store, root, _) = tree(3);
        let mut cursor = ChildCursor::new(&store, root);
        cursor.next(&store);
        cursor.remove_current(&mut store);
        cursor.remove_current(&mut store);
    }

    #[test]
    #[should_panic(expected = "without a current child")]
    fn remove_before_stepping_panics() {
        let (mut store, root, _) = tree(1);
        let mut cursor = ChildCursor::new(&store, root);
        cursor.remove_current(&mut store);
    }
}
