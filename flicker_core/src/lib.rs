// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer and window trace reconstruction and queries.
//!
//! `flicker_core` ingests captures of a display stack recorded over time,
//! rebuilds each entry's parent/child hierarchy from flattened records,
//! derives per-node visibility, and answers the spatial and named queries
//! that UI correctness assertions are built on. It is `no_std` compatible
//! (with `alloc`) and stores each snapshot as a compact index arena.
//!
//! # Architecture
//!
//! ```text
//!   bytes ──► wire::decode() ──► DecodedEntry (flat records)
//!                                    │
//!                 ┌──────────────────┘
//!                 ▼
//!   SnapshotBuilder::build() ──► Snapshot ──► Trace
//!                                    │
//!                                    ▼
//!                     queries ──► QueryResult
//! ```
//!
//! **[`region`]**: Integer rectangles and rectangle unions used for visible
//! regions and coverage checks.
//!
//! **[`node`]**: Capture records, reconstructed nodes, and visibility
//! verdicts.
//!
//! **[`builder`]**: Order-independent hierarchy reconstruction with
//! configurable display-root detection and orphan handling.
//!
//! **[`snapshot`]** and **[`query`]**: The immutable per-entry tree and the
//! named predicates evaluated on it.
//!
//! **[`wire`]**: The binary container decoder and a matching writer.
//!
//! **[`trace`]**: Time-ordered snapshot sequences with timestamp lookups.
//!
//! **[`diag`]**: [`DiagnosticSink`](diag::DiagnosticSink) trait and event
//! types for load instrumentation, with the zero-overhead
//! [`Diagnostics`](diag::Diagnostics) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `diagnostics` (disabled by default): Enables `Diagnostics` method bodies
//!   (one branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod builder;
pub mod diag;
pub mod error;
pub mod node;
pub mod query;
pub mod region;
pub mod snapshot;
pub mod trace;
pub mod wire;

pub use builder::{BuildOptions, OrphanPolicy};
pub use error::{DecodeError, OrphanError, ParseError, TraceError};
pub use query::QueryResult;
pub use snapshot::Snapshot;
pub use trace::Trace;
pub use wire::TraceKind;
