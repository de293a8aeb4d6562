// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node tree.
//!
//! [`NodeStore`] keeps every node in struct-of-arrays storage addressed by
//! generational [`NodeId`] handles. Children form a doubly linked sibling
//! list under their parent, so insertion and removal next to a known sibling
//! are O(1). Each parent carries an *age* that grows by one per structural
//! change; [`ChildCursor`] uses it to detect edits it did not make.
//!
//! The store methods are split by concern:
//!
//! - allocation, ownership and topology queries in `store`,
//! - insertion, removal and reordering in `edit` (see [`Placement`]),
//! - geometry, transforms and render properties in `geometry`,
//! - iteration in [`traverse`].

mod edit;
mod geometry;
mod id;
pub(crate) mod store;
pub mod traverse;

pub use edit::Placement;
pub use id::{INVALID, NodeId};
pub use store::{NodeStore, TreeEvent};
pub use traverse::{ChildCursor, Children};
