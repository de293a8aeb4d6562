// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.

use std::io::{self, Stderr, Write};

use trellis_core::trace::{
    LayoutPassEvent, ModelviewUpdateEvent, NonAffineFallbackEvent, OpacityGroupEvent,
    RedrawRequestEvent, RelayoutRequestEvent, RenderNodeEvent, SingularMatrixEvent, TraceSink,
};

/// A [`TraceSink`] that writes one line per event.
///
/// Write errors are ignored; tracing never interrupts the scene graph.
#[derive(Debug)]
pub struct PrettyPrintSink<W = Stderr> {
    out: W,
}

impl PrettyPrintSink<Stderr> {
    /// Creates a sink that writes to standard error.
    #[must_use]
    pub fn new() -> Self {
        Self { out: io::stderr() }
    }
}

impl Default for PrettyPrintSink<Stderr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to `out`.
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{args}");
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_layout_begin(&mut self, e: &LayoutPassEvent) {
        self.line(format_args!(
            "[layout] begin {} children={}",
            e.node, e.n_children
        ));
    }

    fn on_layout_end(&mut self, e: &LayoutPassEvent) {
        self.line(format_args!("[layout] end {} children={}", e.node, e.n_children));
    }

    fn on_relayout_request(&mut self, e: &RelayoutRequestEvent) {
        self.line(format_args!("[layout] relayout {} {:?}", e.node, e.reason));
    }

    fn on_redraw_request(&mut self, e: &RedrawRequestEvent) {
        self.line(format_args!(
            "[render] redraw {} top={} scheduled={}",
            e.node, e.top_level, e.scheduled
        ));
    }

    fn on_modelview_update(&mut self, e: &ModelviewUpdateEvent) {
        self.line(format_args!("[geometry] modelview {} {:?}", e.node, e.source));
    }

    fn on_singular_matrix(&mut self, e: &SingularMatrixEvent) {
        self.line(format_args!(
            "[geometry] singular modelview on {}, using identity",
            e.node
        ));
    }

    fn on_render_node(&mut self, e: &RenderNodeEvent) {
        self.line(format_args!(
            "[render] {:indent$}{}",
            "",
            e.node,
            indent = e.depth as usize * 2
        ));
    }

    fn on_opacity_group(&mut self, e: &OpacityGroupEvent) {
        self.line(format_args!(
            "[render] group {} opacity={:.2}",
            e.node, e.opacity
        ));
    }

    fn on_non_affine_fallback(&mut self, e: &NonAffineFallbackEvent) {
        self.line(format_args!(
            "[render] {} is not a 2-D transformation, drawing through a projected group",
            e.node
        ));
    }
}

#[cfg(test)]
mod tests {
    use trellis_core::node::NodeStore;
    use trellis_core::trace::RelayoutReason;

    use super::*;

    #[test]
    fn writes_one_line_per_event() {
        let mut store = NodeStore::new();
        let node = store.create_node();
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_relayout_request(&RelayoutRequestEvent {
            node,
            reason: RelayoutReason::DirectRoot,
        });
        sink.on_render_node(&RenderNodeEvent { node, depth: 2 });
        sink.on_opacity_group(&OpacityGroupEvent { node, opacity: 0.5 });

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                format!("[layout] relayout {node} DirectRoot"),
                format!("[render]     {node}"),
                format!("[render] group {node} opacity=0.50"),
            ]
        );
    }
}
