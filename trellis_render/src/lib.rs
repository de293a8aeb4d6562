// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer walk, paint recording and a frame driver for trellis.
//!
//! This crate sits between [`trellis_core`]'s node tree and whatever draws
//! pixels. It defines:
//!
//! - [`Renderer`]: the depth-first walk that composes each node's matrix,
//!   opens opacity groups and calls the node draw hooks
//! - [`RecordingPainter`] and [`RenderPlan`]: a [`Painter`] that records
//!   draw calls as [`RenderOp`]s for backends and tests
//! - [`FrameDriver`]: runs queued layout and paint phases for every root
//!   that asked for one
//!
//! [`Painter`]: trellis_core::paint::Painter

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

mod driver;
mod plan;
mod renderer;

pub use driver::{FrameDriver, FrameReport};
pub use plan::{RecordingPainter, RenderOp, RenderPlan};
pub use renderer::{Renderer, RendererConfig};
