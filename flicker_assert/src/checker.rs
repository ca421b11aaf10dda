// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule groups evaluated over a trace.
//!
//! An [`AssertionChecker`] collects named rules into groups separated by
//! [`then`](AssertionChecker::then) checkpoints, optionally narrows which
//! snapshots are looked at, and finally runs [`test`](AssertionChecker::test).
//!
//! With a single group, every selected snapshot is checked against every rule
//! and every failing (rule, snapshot) pair is reported.
//!
//! With several groups, the groups describe consecutive phases. Snapshots are
//! checked against the active group. Once the active group has held on at
//! least one snapshot, a snapshot that fails it moves the checker on if the
//! next group holds there; otherwise the active group's failures for that
//! snapshot are reported and checking continues with the next snapshot.
//! Finishing the trace before the last group became active is itself a
//! failure.
//!
//! Reported failures carry the name of the rule that produced them.

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use flicker_core::{QueryResult, Snapshot, Trace};

/// A named predicate over one snapshot.
pub struct Assertion<'a> {
    name: String,
    predicate: Box<dyn Fn(&Snapshot) -> QueryResult + 'a>,
}

impl<'a> Assertion<'a> {
    /// Creates a named rule.
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&Snapshot) -> QueryResult + 'a,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Display name of the rule.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluates the rule on `snapshot`.
    #[must_use]
    pub fn evaluate(&self, snapshot: &Snapshot) -> QueryResult {
        (self.predicate)(snapshot)
    }
}

impl fmt::Debug for Assertion<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Selection {
    #[default]
    All,
    Range {
        from: i64,
        to: i64,
    },
    First,
    Last,
}

/// Groups of rules plus a snapshot selection.
#[derive(Debug, Default)]
pub struct AssertionChecker<'a> {
    groups: Vec<Vec<Assertion<'a>>>,
    selection: Selection,
    skip_until_first_assertion: bool,
}

impl<'a> AssertionChecker<'a> {
    /// Creates a checker with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the current group.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Snapshot) -> QueryResult + 'a,
    ) -> &mut Self {
        let assertion = Assertion::new(name, predicate);
        match self.groups.last_mut() {
            Some(group) => group.push(assertion),
            None => self.groups.push(alloc::vec![assertion]),
        }
        self
    }

    /// Starts a new group; later rules must hold after the current ones.
    ///
    /// Calling this before any rule, or twice in a row, is a no-op.
    pub fn then(&mut self) -> &mut Self {
        if self.groups.last().is_some_and(|g| !g.is_empty()) {
            self.groups.push(Vec::new());
        }
        self
    }

    /// Only checks snapshots with timestamps in `from..=to`.
    pub fn filter_by_range(&mut self, from: i64, to: i64) -> &mut Self {
        self.selection = Selection::Range { from, to };
        self
    }

    /// Only checks the first snapshot.
    pub fn check_first(&mut self) -> &mut Self {
        self.selection = Selection::First;
        self
    }

    /// Only checks the last snapshot.
    pub fn check_last(&mut self) -> &mut Self {
        self.selection = Selection::Last;
        self
    }

    /// Ignores leading snapshots until the first group holds.
    pub fn skip_until_first_assertion(&mut self) -> &mut Self {
        self.skip_until_first_assertion = true;
        self
    }

    /// Number of rules across all groups.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    fn select<'t>(&self, trace: &'t Trace) -> Vec<&'t Snapshot> {
        match self.selection {
            Selection::All => trace.entries().iter().collect(),
            Selection::Range { from, to } => trace.range(from, to).collect(),
            Selection::First => trace.first().into_iter().collect(),
            Selection::Last => trace.last().into_iter().collect(),
        }
    }

    /// Runs every rule and returns the failures.
    ///
    /// An empty return value means the trace satisfies the checker.
    #[must_use]
    pub fn test(self, trace: &Trace) -> Vec<QueryResult> {
        let groups: Vec<&[Assertion<'a>]> = self
            .groups
            .iter()
            .filter(|g| !g.is_empty())
            .map(Vec::as_slice)
            .collect();
        let Some(&first_group) = groups.first() else {
            return Vec::new();
        };

        let mut snapshots = self.select(trace);
        let last_timestamp = snapshots.last().map_or(0, |s| s.timestamp());
        if snapshots.is_empty() {
            return alloc::vec![QueryResult::failed(
                0,
                group_name(first_group),
                "no snapshots selected",
            )];
        }

        if self.skip_until_first_assertion {
            let start = snapshots
                .iter()
                .position(|s| failures_of(first_group, s).is_empty());
            match start {
                Some(start) => {
                    snapshots.drain(..start);
                }
                None => return alloc::vec![never_became_true(last_timestamp, first_group)],
            }
        }

        let mut failures = Vec::new();
        if groups.len() == 1 {
            for snapshot in snapshots {
                failures.extend(failures_of(first_group, snapshot));
            }
            return failures;
        }

        let mut active = 0;
        // A phase can only end after it has held at least once.
        let mut active_held = false;
        for snapshot in snapshots {
            let current = failures_of(groups[active], snapshot);
            if current.is_empty() {
                active_held = true;
                continue;
            }
            if active_held
                && let Some(&next) = groups.get(active + 1)
                && failures_of(next, snapshot).is_empty()
            {
                active += 1;
                continue;
            }
            failures.extend(current);
        }

        if let Some(&next) = groups.get(active + 1) {
            failures.push(never_became_true(last_timestamp, next));
        }
        failures
    }
}

fn failures_of(group: &[Assertion<'_>], snapshot: &Snapshot) -> Vec<QueryResult> {
    group
        .iter()
        .filter_map(|a| {
            let mut result = a.evaluate(snapshot);
            if result.success {
                return None;
            }
            result.assertion_name = String::from(a.name());
            Some(result)
        })
        .collect()
}

fn group_name(group: &[Assertion<'_>]) -> String {
    let names: Vec<&str> = group.iter().map(Assertion::name).collect();
    names.join(" and ")
}

fn never_became_true(timestamp: i64, group: &[Assertion<'_>]) -> QueryResult {
    let name = group_name(group);
    let reason = format!("Assertion never became true: {name}");
    QueryResult::failed(timestamp, name, reason)
}
