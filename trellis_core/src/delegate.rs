// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node behavior hooks.
//!
//! A node's behavior beyond plain data lives in an optional
//! [`NodeDelegate`]. Every hook has a default, so a delegate overrides only
//! what it customizes, and nodes without a delegate behave as if they had
//! one that overrides nothing.
//!
//! Hooks receive the store and the node they are running for. While a hook
//! runs, the node's delegate is moved out of the store, so the hook may edit
//! the tree (including its own node) freely. Climbs that reach the node from
//! inside its own hook use the propagation answers the delegate gave just
//! before the hook started.

use core::fmt;

use kurbo::Size;

use crate::node::{NodeId, NodeStore};
use crate::paint::Painter;

/// Customizes invalidation, sizing, layout and drawing of one node.
pub trait NodeDelegate {
    /// Decides whether a redraw request that reached this node keeps
    /// climbing. Returning `false` stops it here, leaving this node
    /// unmarked.
    fn should_propagate_redraw(&mut self, store: &NodeStore, node: NodeId) -> bool {
        _ = (store, node);
        true
    }

    /// Decides whether a relayout request that reached this node keeps
    /// climbing. Returning `false` stops it here, leaving this node
    /// unmarked.
    fn should_propagate_relayout(&mut self, store: &NodeStore, node: NodeId) -> bool {
        _ = (store, node);
        true
    }

    /// The size the node would like to have. Defaults to its bounds size.
    fn preferred_size(&mut self, store: &NodeStore, node: NodeId) -> Size {
        store.bounds(node).size()
    }

    /// Positions the node's children. Called from
    /// [`NodeStore::revalidate_layout`] only when the node has children.
    fn layout_children(&mut self, store: &mut NodeStore, node: NodeId) {
        _ = (store, node);
    }

    /// Draws the node's own content in its local coordinate space.
    ///
    /// Returns `true` when the hook also drew the node's children, in which
    /// case the renderer does not descend into them. The default fills the
    /// bounds with the background color and returns `false`.
    fn draw(&mut self, store: &NodeStore, node: NodeId, painter: &mut dyn Painter) -> bool {
        draw_background(store, node, painter);
        false
    }
}

/// The hooks used by nodes that have no delegate.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultDelegate;

impl NodeDelegate for DefaultDelegate {}

/// Fills the node's bounds with its background color.
pub fn draw_background(store: &NodeStore, node: NodeId, painter: &mut dyn Painter) {
    let color = store.background_color(node);
    let bounds = store.bounds(node);
    if !color.is_transparent() && bounds.area() > 0.0 {
        painter.fill_rect(bounds, color);
    }
}

impl NodeStore {
    /// Runs the node's draw hook in its local coordinate space and clears its
    /// redraw flag.
    ///
    /// Returns `true` when the hook also drew the node's children.
    pub fn draw_content(&mut self, id: NodeId, painter: &mut dyn Painter) -> bool {
        self.validate(id);
        let drew_children = self.with_delegate(id, |d, s| d.draw(s, id, painter));
        self.flags[id.idx as usize].needs_redraw = false;
        drew_children
    }
}

/// A delegate whose only customization is a layout closure.
///
/// ```
/// use kurbo::Point;
/// use trellis_core::delegate::LayoutFn;
/// use trellis_core::node::NodeStore;
///
/// let mut store = NodeStore::new();
/// let row = store.create_node_with(Box::new(LayoutFn::new(|store: &mut NodeStore, node| {
///     let kids: Vec<_> = store.children(node).collect();
///     for (i, child) in kids.into_iter().enumerate() {
///         store.set_position(child, Point::new(i as f64 * 10.0, 0.0));
///     }
/// })));
/// ```
pub struct LayoutFn<F> {
    layout: F,
}

impl<F> LayoutFn<F>
where
    F: FnMut(&mut NodeStore, NodeId),
{
    /// Wraps `layout` as a delegate.
    pub fn new(layout: F) -> Self {
        Self { layout }
    }
}

impl<F> fmt::Debug for LayoutFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutFn").finish_non_exhaustive()
    }
}

impl<F> NodeDelegate for LayoutFn<F>
where
    F: FnMut(&mut NodeStore, NodeId),
{
    fn layout_children(&mut self, store: &mut NodeStore, node: NodeId) {
        (self.layout)(store, node);
    }
}
