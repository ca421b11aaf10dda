// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable load diagnostics and snapshot dumps.
//!
//! [`PrettyPrintSink`] implements [`DiagnosticSink`] and writes one line per
//! event to a [`Write`](std::io::Write) destination (default: stderr).
//! [`dump_snapshot`] prints a reconstructed hierarchy as an indented tree
//! annotated with each node's visibility verdict.

use std::io::{self, Write};

use flicker_core::Snapshot;
use flicker_core::diag::{
    DiagnosticSink, EntryDecodedEvent, OrphansDroppedEvent, SnapshotBuiltEvent,
};
use flicker_core::node::{NodeIdx, RecordData, Visibility};

/// Writes human-readable diagnostic lines to a [`Write`](std::io::Write)
/// destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(io::stderr()),
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticSink for PrettyPrintSink<W> {
    fn on_entry_decoded(&mut self, e: &EntryDecodedEvent) {
        let _ = writeln!(
            self.writer,
            "[decode] ts={} records={}",
            e.timestamp, e.record_count,
        );
    }

    fn on_snapshot_built(&mut self, e: &SnapshotBuiltEvent) {
        let _ = writeln!(
            self.writer,
            "[build] ts={} nodes={} roots={} dropped_orphans={}",
            e.timestamp, e.node_count, e.root_count, e.dropped_orphans,
        );
    }

    fn on_orphans_dropped(&mut self, e: &OrphansDroppedEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[orphan] ts={} parent={} children={:?}",
            e.timestamp, e.parent_id, e.child_ids,
        );
    }

    fn on_lookup_miss(&mut self, timestamp: i64) {
        let _ = writeln!(self.writer, "[lookup] no entry at ts={timestamp}");
    }
}

fn verdict(snapshot: &Snapshot, idx: NodeIdx) -> String {
    match snapshot.visibility(idx) {
        Visibility::Visible => "visible".into(),
        Visibility::HiddenByParent { ancestor } => {
            format!("hidden by {}", snapshot.node(ancestor).name())
        }
        Visibility::Invisible(reason) => reason.as_str().into(),
    }
}

/// Writes `snapshot` as an indented tree, one node per line.
pub fn dump_snapshot(snapshot: &Snapshot, writer: &mut dyn Write) -> io::Result<()> {
    writeln!(
        writer,
        "snapshot ts={} nodes={}",
        snapshot.timestamp(),
        snapshot.len()
    )?;
    // Depth-first so children print under their parent.
    let mut stack: Vec<NodeIdx> = snapshot.roots().iter().rev().copied().collect();
    while let Some(idx) = stack.pop() {
        let node = snapshot.node(idx);
        let indent = node.depth as usize * 2 + 2;
        let geometry = match &node.record.data {
            RecordData::Layer(layer) => format!("{}", layer.visible_region.bounds()),
            RecordData::Window(window) => format!("{}", window.frame),
        };
        writeln!(
            writer,
            "{:indent$}{} #{} {geometry} [{}]",
            "",
            node.name(),
            node.id(),
            verdict(snapshot, idx),
        )?;
        stack.extend(snapshot.children(idx).iter().rev().copied());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flicker_core::node::{LayerRecord, Record};
    use flicker_core::region::RectRegion;

    #[test]
    fn sink_writes_one_line_per_event() {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        sink.on_entry_decoded(&EntryDecodedEvent {
            timestamp: 5,
            record_count: 3,
        });
        sink.on_orphans_dropped(&OrphansDroppedEvent {
            timestamp: 5,
            parent_id: 99,
            child_ids: &[7],
        });
        sink.on_lookup_miss(6);
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "[decode] ts=5 records=3",
                "[orphan] ts=5 parent=99 children=[7]",
                "[lookup] no entry at ts=6",
            ]
        );
    }

    #[test]
    fn dump_nests_children_under_parents() {
        let mut hidden = LayerRecord::with_region(RectRegion::new(0, 0, 10, 10));
        hidden.hidden = true;
        let snapshot = Snapshot::from_records(
            42,
            vec![
                Record::layer(1, -1, "DisplayRoot", LayerRecord::default()),
                Record::layer(2, 1, "Task", hidden),
                Record::layer(
                    3,
                    2,
                    "Surface",
                    LayerRecord::with_region(RectRegion::new(0, 0, 10, 10)),
                ),
                Record::layer(4, 1, "Empty", LayerRecord::default()),
            ],
        )
        .unwrap();

        let mut out = Vec::new();
        dump_snapshot(&snapshot, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "snapshot ts=42 nodes=3",
                "  Task #2 (0, 0) - (10, 10) [is hidden]",
                "    Surface #3 (0, 0) - (10, 10) [hidden by Task]",
                "  Empty #4 (0, 0) - (0, 0) [has an empty visible region]",
            ]
        );
    }
}
