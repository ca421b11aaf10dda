// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics for trace loading.
//!
//! This module provides a [`DiagnosticSink`] trait with per-event methods
//! that the decoder, snapshot builder, and trace lookups call at each stage.
//! All method bodies default to no-ops, so implementing only the events you
//! care about is fine.
//!
//! [`Diagnostics`] wraps an optional `&mut dyn DiagnosticSink`. When the
//! `diagnostics` feature is **off**, every `Diagnostics` method compiles to
//! nothing. When **on**, each method performs a single `Option` branch before
//! dispatching.

/// Emitted after one container entry has been decoded.
#[derive(Clone, Copy, Debug)]
pub struct EntryDecodedEvent {
    /// Entry timestamp.
    pub timestamp: i64,
    /// Number of flattened records in the entry.
    pub record_count: usize,
}

/// Emitted after a snapshot hierarchy has been rebuilt.
#[derive(Clone, Copy, Debug)]
pub struct SnapshotBuiltEvent {
    /// Snapshot timestamp.
    pub timestamp: i64,
    /// Nodes reachable from the roots.
    pub node_count: usize,
    /// Top-level roots.
    pub root_count: usize,
    /// Orphaned subtrees accepted and excluded by the orphan policy.
    pub dropped_orphans: usize,
}

/// Emitted when the orphan policy accepts and drops a subtree.
#[derive(Clone, Copy, Debug)]
pub struct OrphansDroppedEvent<'a> {
    /// Snapshot timestamp.
    pub timestamp: i64,
    /// The parent id that never resolved.
    pub parent_id: i32,
    /// Ids that declared it as parent.
    pub child_ids: &'a [i32],
}

/// Receives diagnostic events while traces are loaded and queried.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait DiagnosticSink {
    /// Called when a container entry is decoded.
    fn on_entry_decoded(&mut self, e: &EntryDecodedEvent) {
        _ = e;
    }

    /// Called when a snapshot is built.
    fn on_snapshot_built(&mut self, e: &SnapshotBuiltEvent) {
        _ = e;
    }

    /// Called when an orphaned subtree is dropped.
    fn on_orphans_dropped(&mut self, e: &OrphansDroppedEvent<'_>) {
        _ = e;
    }

    /// Called when a timestamp lookup finds no entry.
    fn on_lookup_miss(&mut self, timestamp: i64) {
        _ = timestamp;
    }
}

/// A [`DiagnosticSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {}

/// Thin wrapper around an optional [`DiagnosticSink`].
pub struct Diagnostics<'a> {
    #[cfg(feature = "diagnostics")]
    sink: Option<&'a mut dyn DiagnosticSink>,
    #[cfg(not(feature = "diagnostics"))]
    _marker: core::marker::PhantomData<&'a mut dyn DiagnosticSink>,
}

impl core::fmt::Debug for Diagnostics<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

impl<'a> Diagnostics<'a> {
    /// Creates a wrapper that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn DiagnosticSink) -> Self {
        #[cfg(feature = "diagnostics")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a wrapper that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "diagnostics")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits an [`EntryDecodedEvent`].
    #[inline]
    pub fn entry_decoded(&mut self, e: &EntryDecodedEvent) {
        #[cfg(feature = "diagnostics")]
        if let Some(s) = &mut self.sink {
            s.on_entry_decoded(e);
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SnapshotBuiltEvent`].
    #[inline]
    pub fn snapshot_built(&mut self, e: &SnapshotBuiltEvent) {
        #[cfg(feature = "diagnostics")]
        if let Some(s) = &mut self.sink {
            s.on_snapshot_built(e);
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            _ = e;
        }
    }

    /// Emits an [`OrphansDroppedEvent`].
    #[inline]
    pub fn orphans_dropped(&mut self, e: &OrphansDroppedEvent<'_>) {
        #[cfg(feature = "diagnostics")]
        if let Some(s) = &mut self.sink {
            s.on_orphans_dropped(e);
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            _ = e;
        }
    }

    /// Reports a failed timestamp lookup.
    #[inline]
    pub fn lookup_miss(&mut self, timestamp: i64) {
        #[cfg(feature = "diagnostics")]
        if let Some(s) = &mut self.sink {
            s.on_lookup_miss(timestamp);
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            _ = timestamp;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_entry_decoded(&EntryDecodedEvent {
            timestamp: 1,
            record_count: 3,
        });
        sink.on_orphans_dropped(&OrphansDroppedEvent {
            timestamp: 1,
            parent_id: 9,
            child_ids: &[10, 11],
        });
        sink.on_lookup_miss(5);
    }

    #[test]
    fn diagnostics_none_does_nothing() {
        let mut diag = Diagnostics::none();
        diag.snapshot_built(&SnapshotBuiltEvent {
            timestamp: 0,
            node_count: 0,
            root_count: 0,
            dropped_orphans: 0,
        });
        diag.lookup_miss(3);
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn diagnostics_dispatches_to_sink() {
        use alloc::vec::Vec;

        struct RecordingSink {
            built: Vec<i64>,
        }
        impl DiagnosticSink for RecordingSink {
            fn on_snapshot_built(&mut self, e: &SnapshotBuiltEvent) {
                self.built.push(e.timestamp);
            }
        }

        let mut sink = RecordingSink { built: Vec::new() };
        Diagnostics::new(&mut sink).snapshot_built(&SnapshotBuiltEvent {
            timestamp: 42,
            node_count: 2,
            root_count: 1,
            dropped_orphans: 0,
        });
        assert_eq!(sink.built, &[42]);
    }
}
