// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] turns a log recorded by a
//! [`RecorderSink`](super::recorder::RecorderSink) into [Chrome Trace Event
//! Format][format] JSON. Events carry no wall-clock time, so each event's
//! position in the log is used as its timestamp in microseconds.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};
use trellis_core::node::NodeId;

use crate::recorder::RecordedEvent;

/// Exports recorded events as a Chrome Trace Event Format JSON array.
///
/// Layout passes become begin/end pairs, everything else an instant event.
/// The output loads into `chrome://tracing` or
/// [Perfetto](https://ui.perfetto.dev/).
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let out: Vec<Value> = events
        .iter()
        .enumerate()
        .map(|(ts, event)| to_trace_event(ts as u64, event))
        .collect();
    serde_json::to_writer_pretty(writer, &out)?;
    Ok(())
}

fn to_trace_event(ts: u64, event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::LayoutBegin(e) => json!({
            "ph": "B",
            "name": "Layout",
            "cat": "layout",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "args": { "node": node_json(e.node), "n_children": e.n_children },
        }),
        RecordedEvent::LayoutEnd(e) => json!({
            "ph": "E",
            "name": "Layout",
            "cat": "layout",
            "ts": ts,
            "pid": 0,
            "tid": 0,
            "args": { "node": node_json(e.node), "n_children": e.n_children },
        }),
        RecordedEvent::RelayoutRequest(e) => instant(
            ts,
            event,
            "layout",
            json!({ "node": node_json(e.node), "reason": format!("{:?}", e.reason) }),
        ),
        RecordedEvent::RedrawRequest(e) => instant(
            ts,
            event,
            "render",
            json!({
                "node": node_json(e.node),
                "top_level": node_json(e.top_level),
                "scheduled": e.scheduled,
            }),
        ),
        RecordedEvent::ModelviewUpdate(e) => instant(
            ts,
            event,
            "geometry",
            json!({ "node": node_json(e.node), "source": format!("{:?}", e.source) }),
        ),
        RecordedEvent::SingularMatrix(e) => {
            instant(ts, event, "geometry", json!({ "node": node_json(e.node) }))
        }
        RecordedEvent::RenderNode(e) => instant(
            ts,
            event,
            "render",
            json!({ "node": node_json(e.node), "depth": e.depth }),
        ),
        RecordedEvent::OpacityGroup(e) => instant(
            ts,
            event,
            "render",
            json!({ "node": node_json(e.node), "opacity": e.opacity }),
        ),
        RecordedEvent::NonAffineFallback(e) => {
            instant(ts, event, "render", json!({ "node": node_json(e.node) }))
        }
    }
}

fn instant(ts: u64, event: &RecordedEvent, cat: &str, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": event.name(),
        "cat": cat,
        "ts": ts,
        "pid": 0,
        "tid": 0,
        "s": "t",
        "args": args,
    })
}

fn node_json(node: NodeId) -> Value {
    json!(format!("{}@{}", node.index(), node.generation()))
}

#[cfg(test)]
mod tests {
    use trellis_core::debug::DebugFlags;
    use trellis_core::node::NodeStore;

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let rec = RecorderSink::new();
        let mut store = NodeStore::new();
        store.set_trace_sink(Some(Box::new(rec.clone())));
        store.set_debug_flags(DebugFlags::ALL);
        let root = store.create_node();
        let child = store.create_node();
        store.add_child(root, child);
        store.revalidate_layout(root);

        let mut out = Vec::new();
        export(&rec.events(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), rec.len());

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "RelayoutRequest");
        assert_eq!(parsed[0]["args"]["reason"], "ReachedRoot");

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Layout");
        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["ts"], 2);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
