// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, tree dumps and JSON export for trellis
//! diagnostics.
//!
//! This crate provides [`TraceSink`](trellis_core::trace::TraceSink)
//! implementations and inspection helpers for development:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: in-memory event log with a shared handle,
//!   so the log stays readable while a store owns the sink.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from a
//!   recorded log.
//! - [`dump`]: bracketed text and JSON snapshots of a node tree.
//! - [`env`]: reads the enabled debug categories from `TRELLIS_DEBUG`.

pub mod chrome;
pub mod dump;
pub mod env;
pub mod pretty;
pub mod recorder;
