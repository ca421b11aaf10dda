// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON export of reconstructed traces.
//!
//! [`export`] writes one document per trace:
//!
//! ```text
//! { "source": ..., "kind": "layers" | "windows",
//!   "entries": [ { "timestamp": ..., "nodes": [ ... ] } ] }
//! ```
//!
//! Nodes are listed in flatten order and refer to their parent by capture id,
//! so the hierarchy can be rebuilt by other tools.

use std::io::{self, Write};

use serde_json::{Value, json};

use flicker_core::node::{Node, NodeIdx, RecordData, Visibility, WindowKind, WindowRole};
use flicker_core::region::RectRegion;
use flicker_core::{Snapshot, Trace};

fn rect(r: RectRegion) -> Value {
    json!([r.left, r.top, r.right, r.bottom])
}

fn visibility(snapshot: &Snapshot, idx: NodeIdx) -> Value {
    match snapshot.visibility(idx) {
        Visibility::Visible => json!("visible"),
        Visibility::HiddenByParent { ancestor } => json!({
            "hidden_by": snapshot.node(ancestor).id(),
        }),
        Visibility::Invisible(reason) => json!({ "invisible": reason.as_str() }),
    }
}

fn role_name(role: WindowRole) -> &'static str {
    match role {
        WindowRole::Container => "container",
        WindowRole::Task => "task",
        WindowRole::Activity => "activity",
        WindowRole::Token => "token",
        WindowRole::Window => "window",
    }
}

fn kind_name(kind: WindowKind) -> &'static str {
    match kind {
        WindowKind::AboveApp => "above_app",
        WindowKind::App => "app",
        WindowKind::BelowApp => "below_app",
        WindowKind::Ime => "ime",
        WindowKind::Other => "other",
    }
}

fn node(snapshot: &Snapshot, idx: NodeIdx, n: &Node) -> Value {
    let mut value = json!({
        "id": n.id(),
        "parent": n.parent.map(|p| snapshot.node(p).id()),
        "name": n.name(),
        "depth": n.depth,
        "visibility": visibility(snapshot, idx),
    });
    let extra = match &n.record.data {
        RecordData::Layer(layer) => json!({
            "hidden": layer.hidden,
            "color_fill": layer.color_fill,
            "has_buffer": layer.has_buffer,
            "alpha": layer.alpha,
            "z": layer.z,
            "bounds": [layer.bounds.x0, layer.bounds.y0, layer.bounds.x1, layer.bounds.y1],
            "visible_region": layer.visible_region.rects().iter().copied().map(rect).collect::<Vec<_>>(),
        }),
        RecordData::Window(window) => json!({
            "role": role_name(window.role),
            "kind": kind_name(window.kind),
            "visible": window.visible,
            "frame": rect(window.frame),
        }),
    };
    if let (Value::Object(map), Value::Object(extra)) = (&mut value, extra) {
        map.extend(extra);
    }
    value
}

/// Exports `trace` as a pretty-printed JSON document.
pub fn export(trace: &Trace, writer: &mut dyn Write) -> io::Result<()> {
    let entries: Vec<Value> = trace
        .entries()
        .iter()
        .map(|snapshot| {
            let nodes: Vec<Value> = snapshot
                .indices()
                .zip(snapshot.flatten())
                .map(|(idx, n)| node(snapshot, idx, n))
                .collect();
            json!({
                "timestamp": snapshot.timestamp(),
                "nodes": nodes,
            })
        })
        .collect();

    let document = json!({
        "source": trace.source(),
        "kind": trace.kind().as_str(),
        "entries": entries,
    });
    serde_json::to_writer_pretty(&mut *writer, &document)?;
    writeln!(writer)
}
