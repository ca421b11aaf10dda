// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fluent per-snapshot assertions over flicker traces.
//!
//! [`AssertionChecker`] is the rule engine: named predicates grouped into
//! phases, a snapshot selection, and an evaluation that reports every
//! failing result. [`TraceSubject`] wraps it in a chainable API with the
//! common layer and window rules built in.

#![no_std]

extern crate alloc;

pub mod checker;
pub mod subject;

pub use checker::{Assertion, AssertionChecker};
pub use subject::{AssertionFailure, TraceSubject};
