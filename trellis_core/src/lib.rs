// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained scene-graph core: node tree, invalidation and transforms.
//!
//! `trellis_core` keeps a forest of renderable nodes and tracks which parts
//! need new layout or new pixels. It is `no_std` compatible (with `alloc`)
//! and stores nodes in struct-of-arrays form behind generational handles.
//!
//! # Architecture
//!
//! Property changes climb toward the root and turn into at most one frame
//! request per root and phase:
//!
//! ```text
//!   set_position / set_opacity / add_child ...
//!       │
//!       ▼
//!   queue_relayout / queue_redraw ──► flags marked up to the root
//!                                           │
//!                 ┌─────────────────────────┘
//!                 ▼
//!   FrameRequest outbox ──► FrameClock::request_phase()
//!                                           │
//!                 ┌─────────────────────────┘
//!                 ▼
//!   Layout phase: revalidate_layout(root)
//!   Paint phase:  renderer walk (trellis_render)
//! ```
//!
//! **[`node`]**: The node tree: allocation, ownership, child-list editing,
//! iteration with modification detection, and per-node properties.
//!
//! **[`delegate`]**: The [`NodeDelegate`](delegate::NodeDelegate) hooks for
//! propagation vetoes, preferred size, child layout and drawing.
//!
//! **[`state`]**: Lazily allocated geometry, transform and render groups.
//!
//! **[`transform`]**: 4×4 matrices, Euler angles and quaternions used to
//! compose each node's modelview.
//!
//! **[`clock`]**: The [`FrameClock`](clock::FrameClock) collaborator and a
//! simple pending-phase queue.
//!
//! **[`paint`]**: The [`Painter`](paint::Painter) collaborator that draws
//! into a node's local coordinate space.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types,
//! with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! **[`debug`]**: Diagnostic categories and their parser.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod clock;
pub mod debug;
pub mod delegate;
mod invalidate;
pub mod node;
pub mod paint;
pub mod state;
pub mod trace;
pub mod transform;
