// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time-ordered sequences of snapshots.

use alloc::string::String;
use alloc::vec::Vec;

use crate::builder::{BuildOptions, SnapshotBuilder};
use crate::diag::Diagnostics;
use crate::error::TraceError;
use crate::snapshot::Snapshot;
use crate::wire::{self, TraceKind};

/// A parsed capture: one [`Snapshot`] per container entry.
///
/// Loading is all-or-nothing; the first decode, structural, or rejected
/// orphan error aborts the whole parse.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    kind: TraceKind,
    entries: Vec<Snapshot>,
    sorted: bool,
    source: Option<String>,
}

impl Trace {
    /// Parses container bytes with default [`BuildOptions`].
    pub fn parse(bytes: &[u8]) -> Result<Self, TraceError> {
        Self::parse_with(bytes, &mut BuildOptions::default(), &mut Diagnostics::none())
    }

    /// Parses container bytes with explicit options and diagnostics.
    pub fn parse_with(
        bytes: &[u8],
        options: &mut BuildOptions<'_>,
        diag: &mut Diagnostics<'_>,
    ) -> Result<Self, TraceError> {
        let decoded = wire::decode_with(bytes, diag)?;
        let mut entries = Vec::with_capacity(decoded.entries.len());
        for entry in decoded.entries {
            let mut builder = SnapshotBuilder::with_capacity(entry.timestamp, entry.records.len());
            builder.extend(entry.records)?;
            entries.push(builder.build(options, diag)?);
        }
        Ok(Self::from_snapshots(decoded.kind, entries))
    }

    /// Wraps already built snapshots.
    #[must_use]
    pub fn from_snapshots(kind: TraceKind, entries: Vec<Snapshot>) -> Self {
        let sorted = entries
            .windows(2)
            .all(|w| w[0].timestamp() <= w[1].timestamp());
        Self {
            kind,
            entries,
            sorted,
            source: None,
        }
    }

    /// Attaches a human-readable origin (usually a file path) for reports.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Origin attached with [`with_source`](Self::with_source).
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Trace kind.
    #[must_use]
    pub fn kind(&self) -> TraceKind {
        self.kind
    }

    /// Snapshots in capture order.
    #[must_use]
    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    /// Number of snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the trace has no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First snapshot.
    #[must_use]
    pub fn first(&self) -> Option<&Snapshot> {
        self.entries.first()
    }

    /// Last snapshot.
    #[must_use]
    pub fn last(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    /// The snapshot captured at exactly `timestamp`.
    pub fn entry(&self, timestamp: i64) -> Result<&Snapshot, TraceError> {
        self.entry_with(timestamp, &mut Diagnostics::none())
    }

    /// Like [`entry`](Self::entry), reporting misses to `diag`.
    pub fn entry_with(
        &self,
        timestamp: i64,
        diag: &mut Diagnostics<'_>,
    ) -> Result<&Snapshot, TraceError> {
        let found = if self.sorted {
            self.entries
                .binary_search_by_key(&timestamp, Snapshot::timestamp)
                .ok()
                .map(|i| &self.entries[i])
        } else {
            self.entries.iter().find(|s| s.timestamp() == timestamp)
        };
        found.ok_or_else(|| {
            diag.lookup_miss(timestamp);
            TraceError::EntryNotFound { timestamp }
        })
    }

    /// Snapshots whose timestamps fall in `from..=to`, in capture order.
    pub fn range(&self, from: i64, to: i64) -> impl Iterator<Item = &Snapshot> + '_ {
        self.entries
            .iter()
            .filter(move |s| (from..=to).contains(&s.timestamp()))
    }
}
