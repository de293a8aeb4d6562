// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The depth-first renderer walk.

use alloc::vec;

use kurbo::{Affine, Point, Rect, Vec2};
use trellis_core::debug::DebugFlags;
use trellis_core::node::{ChildCursor, NodeId, NodeStore};
use trellis_core::paint::{Painter, Rgba};
use trellis_core::trace::{NonAffineFallbackEvent, OpacityGroupEvent, RenderNodeEvent, Tracer};
use trellis_core::transform::Transform3d;

/// Frame outline color for the geometry overlay.
const FRAME_OUTLINE: Rgba = Rgba::new(1.0, 0.0, 0.0, 0.25);
/// Pivot marker color for the geometry overlay.
const PIVOT_MARKER: Rgba = Rgba::new(0.0, 0.0, 1.0, 0.25);
const PIVOT_MARKER_RADIUS: f64 = 3.0;

/// Options for [`Renderer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RendererConfig {
    /// Outline every node's frame and mark its pivot after drawing it.
    pub show_geometry: bool,
}

impl RendererConfig {
    /// Derives the options from diagnostic flags.
    #[must_use]
    pub fn from_debug_flags(flags: DebugFlags) -> Self {
        Self {
            show_geometry: flags.geometry,
        }
    }
}

/// Draws a node tree through a [`Painter`].
///
/// For each visible node, in pre-order and sibling order:
///
/// 1. an off-screen group is opened if the node is translucent,
/// 2. the painter is moved into the node's local space: the frame origin
///    plus pivot, then the 2-D modelview, then back by the pivot,
/// 3. an explicit clip is applied,
/// 4. the node's draw hook runs,
/// 5. children are drawn unless the hook drew them itself,
/// 6. the group is composited at the node's opacity.
///
/// A modelview with no 2-D reduction is drawn through
/// [`Painter::push_projected_group`] instead of skipping the node.
/// Hidden nodes and their subtrees are not visited.
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Creates a renderer with the given options.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Returns the options.
    #[must_use]
    pub fn config(&self) -> RendererConfig {
        self.config
    }

    /// Replaces the options.
    pub fn set_config(&mut self, config: RendererConfig) {
        self.config = config;
    }

    /// Draws `root` and its visible descendants.
    ///
    /// Every visited node's redraw flag is cleared. The walk keeps its own
    /// stack, so tree depth is not limited by the call stack.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn render(
        &mut self,
        store: &mut NodeStore,
        root: NodeId,
        painter: &mut dyn Painter,
        tracer: &mut Tracer<'_>,
    ) {
        let mut stack = vec![Step::Enter {
            node: root,
            depth: 0,
        }];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter { node, depth } => {
                    let Some(exit) = self.enter_node(store, node, depth, painter, tracer) else {
                        continue;
                    };
                    let drew_children = exit.drew_children;
                    stack.push(Step::Exit(exit));
                    if !drew_children {
                        stack.push(Step::Children {
                            cursor: ChildCursor::new(store, node),
                            depth: depth + 1,
                        });
                    }
                }
                Step::Children { mut cursor, depth } => {
                    if let Some(child) = cursor.next(store) {
                        stack.push(Step::Children { cursor, depth });
                        stack.push(Step::Enter { node: child, depth });
                    }
                }
                Step::Exit(exit) => self.exit_node(exit, painter),
            }
        }
    }

    /// Opens the node's painter state and draws its content.
    ///
    /// Returns `None` for hidden nodes, which are skipped with their subtree.
    fn enter_node(
        &self,
        store: &mut NodeStore,
        node: NodeId,
        depth: u32,
        painter: &mut dyn Painter,
        tracer: &mut Tracer<'_>,
    ) -> Option<ExitNode> {
        if store.is_hidden(node) {
            return None;
        }
        tracer.render_node(&RenderNodeEvent { node, depth });

        painter.save();

        let opacity = store.opacity(node);
        let group = opacity < 1.0;
        if group {
            tracer.opacity_group(&OpacityGroupEvent { node, opacity });
            painter.push_group();
        }

        let frame = store.frame(node);
        let pivot_point = store.pivot_point(node);
        let pivot = Vec2::new(
            pivot_point.x * frame.width(),
            pivot_point.y * frame.height(),
        );
        let anchor = frame.origin().to_vec2() + pivot;

        let modelview = store.modelview(node);
        let projected = match modelview.to_2d() {
            Some(affine) => {
                painter.transform(
                    Affine::translate(anchor) * affine * Affine::translate(-pivot),
                );
                None
            }
            None => {
                tracer.non_affine_fallback(&NonAffineFallbackEvent { node });
                painter.transform(Affine::translate(anchor));
                painter.push_projected_group(&modelview);
                painter.transform(Affine::translate(-pivot));
                Some(modelview)
            }
        };

        if store.has_clip(node) {
            painter.clip_rect(store.clip(node));
        }

        let drew_children = store.draw_content(node, painter);
        Some(ExitNode {
            drew_children,
            projected,
            group_opacity: group.then_some(opacity),
            overlay: self
                .config
                .show_geometry
                .then_some((frame, Point::ORIGIN + anchor)),
        })
    }

    /// Closes what [`enter_node`](Self::enter_node) opened, after the
    /// node's children were drawn.
    fn exit_node(&self, exit: ExitNode, painter: &mut dyn Painter) {
        if let Some(modelview) = exit.projected {
            painter.pop_projected_group(&modelview);
        }
        if let Some(opacity) = exit.group_opacity {
            painter.pop_group(opacity);
        }
        painter.restore();

        if let Some((frame, pivot)) = exit.overlay {
            draw_geometry_overlay(painter, frame, pivot);
        }
    }
}

/// One pending step of the renderer walk.
enum Step {
    /// Draw a node's own content.
    Enter { node: NodeId, depth: u32 },
    /// Continue with the next child of a node.
    Children { cursor: ChildCursor, depth: u32 },
    /// Close a node after its children.
    Exit(ExitNode),
}

/// Painter state a node opened, to be closed in reverse order.
struct ExitNode {
    drew_children: bool,
    projected: Option<Transform3d>,
    group_opacity: Option<f64>,
    overlay: Option<(Rect, Point)>,
}

/// Outlines `frame` and marks `pivot`, both in the parent's space.
fn draw_geometry_overlay(painter: &mut dyn Painter, frame: Rect, pivot: Point) {
    painter.stroke_rect(frame, FRAME_OUTLINE, 1.0);
    let r = PIVOT_MARKER_RADIUS;
    painter.fill_rect(
        Rect::new(pivot.x - r, pivot.y - r, pivot.x + r, pivot.y + r),
        PIVOT_MARKER,
    );
}
