// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing and JSON export for flicker traces.
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event load
//!   diagnostics, plus [`pretty::dump_snapshot`] for tree dumps.
//! - [`json::export`]: writes a reconstructed trace as JSON for other tools.

pub mod json;
pub mod pretty;
