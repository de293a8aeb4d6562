// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree snapshots for logs and test assertions.

use std::fmt::Write as _;

use serde_json::{Value, json};
use trellis_core::node::{NodeId, NodeStore};

/// Renders the subtree at `root` as nested brackets of debug names.
///
/// A node with children prints as `name [ child child ]`, a leaf as just
/// its name. Hidden nodes are prefixed with `!`.
///
/// ```
/// use trellis_core::node::NodeStore;
/// use trellis_debug::dump::tree_string;
///
/// let mut store = NodeStore::new();
/// let root = store.create_node();
/// let a = store.create_node();
/// let b = store.create_node();
/// store.add_child(root, a);
/// store.add_child(a, b);
/// store.set_name(root, Some("root"));
/// store.set_name(a, Some("a"));
/// store.set_name(b, Some("b"));
/// assert_eq!(tree_string(&store, root), "root [ a [ b ] ]");
/// ```
#[must_use]
pub fn tree_string(store: &NodeStore, root: NodeId) -> String {
    enum Item {
        Node(NodeId),
        Text(&'static str),
    }

    let mut out = String::new();
    let mut stack = vec![Item::Node(root)];
    while let Some(item) = stack.pop() {
        let node = match item {
            Item::Text(text) => {
                out.push_str(text);
                continue;
            }
            Item::Node(node) => node,
        };
        if store.is_hidden(node) {
            out.push('!');
        }
        out.push_str(&store.debug_name(node));
        if store.n_children(node) == 0 {
            continue;
        }
        out.push_str(" [");
        stack.push(Item::Text(" ]"));
        for child in store.children(node).rev() {
            stack.push(Item::Node(child));
            stack.push(Item::Text(" "));
        }
    }
    out
}

/// Captures the subtree at `root` as JSON.
///
/// Each node is an object with its debug name, slot, frame
/// (`[x, y, width, height]`), opacity, visibility, pending invalidation
/// flags and children.
#[must_use]
pub fn json_snapshot(store: &NodeStore, root: NodeId) -> Value {
    // Breadth-first, so each node is listed after its parent and siblings
    // are adjacent.
    let mut order = vec![(root, None)];
    let mut next = 0;
    while let Some(&(node, _)) = order.get(next) {
        order.extend(store.children(node).map(|child| (child, Some(next))));
        next += 1;
    }

    let mut children: Vec<Vec<Value>> = vec![Vec::new(); order.len()];
    let mut snapshot = Value::Null;
    for (i, &(node, parent)) in order.iter().enumerate().rev() {
        let mut kids = core::mem::take(&mut children[i]);
        kids.reverse();
        let value = node_json(store, node, kids);
        match parent {
            Some(p) => children[p].push(value),
            None => snapshot = value,
        }
    }
    snapshot
}

fn node_json(store: &NodeStore, node: NodeId, children: Vec<Value>) -> Value {
    let frame = store.frame(node);
    let mut value = json!({
        "name": store.debug_name(node),
        "id": format!("{}@{}", node.index(), node.generation()),
        "frame": [frame.x0, frame.y0, frame.width(), frame.height()],
        "opacity": store.opacity(node),
        "hidden": store.is_hidden(node),
        "needs_redraw": store.needs_redraw(node),
        "needs_relayout": store.needs_relayout(node),
    });
    // Moved in rather than passed to `json!`, which would copy the subtree.
    value["children"] = Value::Array(children);
    value
}

/// Renders every root in `store` with [`tree_string`], one line per root.
#[must_use]
pub fn forest_summary(store: &NodeStore) -> String {
    let mut out = String::new();
    for root in store.roots() {
        let _ = writeln!(out, "{}", tree_string(store, root));
    }
    out
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};

    use super::*;

    fn named(store: &mut NodeStore, name: &str) -> NodeId {
        let id = store.create_node();
        store.set_name(id, Some(name));
        id
    }

    #[test]
    fn tree_string_nests_and_marks_hidden() {
        let mut store = NodeStore::new();
        let root = named(&mut store, "root");
        let a = named(&mut store, "a");
        let b = named(&mut store, "b");
        let a1 = named(&mut store, "a1");
        store.add_child(root, a);
        store.add_child(root, b);
        store.add_child(a, a1);
        store.set_hidden(b, true);
        assert_eq!(tree_string(&store, root), "root [ a [ a1 ] !b ]");
    }

    #[test]
    fn json_snapshot_captures_geometry() {
        let mut store = NodeStore::new();
        let root = named(&mut store, "root");
        let child = named(&mut store, "child");
        store.add_child(root, child);
        store.set_bounds(child, Rect::new(0.0, 0.0, 60.0, 40.0));
        store.set_position(child, Point::new(100.0, 60.0));
        store.set_opacity(child, 0.5);

        let snap = json_snapshot(&store, root);
        assert_eq!(snap["name"], "root");
        let c = &snap["children"][0];
        assert_eq!(c["name"], "child");
        assert_eq!(c["frame"], json!([70.0, 40.0, 60.0, 40.0]));
        assert_eq!(c["opacity"], 0.5);
        assert_eq!(c["hidden"], false);
        assert_eq!(c["children"], json!([]));
    }

    #[test]
    fn json_snapshot_keeps_sibling_order() {
        let mut store = NodeStore::new();
        let root = named(&mut store, "root");
        let a = named(&mut store, "a");
        let b = named(&mut store, "b");
        let a1 = named(&mut store, "a1");
        store.add_child(root, a);
        store.add_child(root, b);
        store.add_child(a, a1);

        let snap = json_snapshot(&store, root);
        assert_eq!(snap["children"][0]["name"], "a");
        assert_eq!(snap["children"][0]["children"][0]["name"], "a1");
        assert_eq!(snap["children"][1]["name"], "b");
        assert_eq!(snap["children"][1]["children"], json!([]));
    }

    #[test]
    fn deep_chain_tree_string_without_recursion() {
        let mut store = NodeStore::new();
        let mut root = named(&mut store, "n");
        for _ in 0..20_000 {
            let parent = named(&mut store, "n");
            store.add_child(parent, root);
            root = parent;
        }

        let text = tree_string(&store, root);
        assert!(text.starts_with("n [ n [ n"));
        assert!(text.ends_with("n ] ]"));
        assert_eq!(text.matches(" ]").count(), 20_000);
    }

    #[test]
    fn chain_snapshot_nests_every_level() {
        let mut store = NodeStore::new();
        let root = named(&mut store, "n0");
        let mut tip = root;
        for i in 1..=500 {
            let next = named(&mut store, &format!("n{i}"));
            store.add_child(tip, next);
            tip = next;
        }

        let snap = json_snapshot(&store, root);
        let mut depth = 0;
        let mut node = &snap;
        while let Some(child) = node["children"].get(0) {
            node = child;
            depth += 1;
        }
        assert_eq!(depth, 500);
        assert_eq!(node["name"], "n500");
    }

    #[test]
    fn forest_summary_lists_roots() {
        let mut store = NodeStore::new();
        let a = named(&mut store, "a");
        named(&mut store, "b");
        let c = named(&mut store, "c");
        store.add_child(a, c);
        assert_eq!(forest_summary(&store), "a [ c ]\nb\n");
    }
}
