// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame driver: runs the layout and paint phases roots asked for.

use alloc::vec::Vec;

use trellis_core::clock::PendingPhases;
use trellis_core::node::{NodeId, NodeStore};
use trellis_core::paint::Painter;
use trellis_core::trace::Tracer;

use crate::renderer::{Renderer, RendererConfig};

/// What one [`FrameDriver::tick`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Roots whose layout phase ran, in request order.
    pub laid_out: Vec<NodeId>,
    /// Roots that were painted, in request order.
    pub painted: Vec<NodeId>,
}

impl FrameReport {
    /// Returns whether the tick did nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.laid_out.is_empty() && self.painted.is_empty()
    }
}

/// Drives frames for every root with an attached frame clock.
///
/// The store queues [`FrameRequest`](trellis_core::clock::FrameRequest)s as
/// invalidation reaches clocked roots. Each [`tick`](Self::tick) collects
/// them, runs [`NodeStore::revalidate_layout`] for roots that asked for
/// layout, then paints every root that asked for paint or was just laid out.
#[derive(Debug, Default)]
pub struct FrameDriver {
    pending: PendingPhases,
    renderer: Renderer,
    frame_index: u64,
}

impl FrameDriver {
    /// Creates a driver whose renderer uses `config`.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self {
            pending: PendingPhases::new(),
            renderer: Renderer::new(config),
            frame_index: 0,
        }
    }

    /// Returns the renderer.
    #[must_use]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Returns the renderer for reconfiguration.
    pub fn renderer_mut(&mut self) -> &mut Renderer {
        &mut self.renderer
    }

    /// Returns the number of ticks that did any work.
    #[must_use]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Returns whether neither the driver nor `store` has pending work.
    #[must_use]
    pub fn is_idle(&self, store: &NodeStore) -> bool {
        self.pending.is_idle() && !store.has_frame_requests()
    }

    /// Runs one frame.
    pub fn tick(
        &mut self,
        store: &mut NodeStore,
        painter: &mut dyn Painter,
        tracer: &mut Tracer<'_>,
    ) -> FrameReport {
        store.flush_frame_requests(&mut self.pending);

        let mut report = FrameReport::default();
        for root in self.pending.take_layout() {
            if !store.is_alive(root) {
                continue;
            }
            store.revalidate_layout(root);
            report.laid_out.push(root);
        }

        // Layout may have queued paint for the same roots.
        store.flush_frame_requests(&mut self.pending);
        let mut paint = report.laid_out.clone();
        for root in self.pending.take_paint() {
            if !paint.contains(&root) {
                paint.push(root);
            }
        }

        for root in paint {
            if !store.is_alive(root) || store.parent(root).is_some() {
                continue;
            }
            self.renderer.render(store, root, painter, tracer);
            report.painted.push(root);
        }

        if !report.is_empty() {
            self.frame_index += 1;
        }
        report
    }
}
