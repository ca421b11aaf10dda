// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fluent assertions bound to one trace.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use flicker_core::region::RectRegion;
use flicker_core::{QueryResult, Snapshot, Trace};

use crate::checker::AssertionChecker;

/// Every failing result of a [`TraceSubject::check`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionFailure {
    /// Origin of the trace, if one was attached.
    pub source: Option<String>,
    /// Failing results in evaluation order.
    pub failures: Vec<QueryResult>,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.source.as_deref().unwrap_or("<unnamed trace>");
        write!(
            f,
            "{} assertion(s) failed in {source}",
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n\n{failure}")?;
        }
        Ok(())
    }
}

impl core::error::Error for AssertionFailure {}

/// Fluent assertion builder over a [`Trace`].
///
/// ```
/// # use flicker_assert::TraceSubject;
/// # use flicker_core::Trace;
/// # fn check(trace: &Trace) -> Result<(), flicker_assert::AssertionFailure> {
/// TraceSubject::new(trace)
///     .shows_layer("Launcher")
///     .then()
///     .shows_layer("Settings")
///     .hides_layer("Launcher")
///     .check()
/// # }
/// ```
#[derive(Debug)]
pub struct TraceSubject<'t> {
    trace: &'t Trace,
    checker: AssertionChecker<'t>,
}

impl<'t> TraceSubject<'t> {
    /// Starts an empty assertion chain on `trace`.
    #[must_use]
    pub fn new(trace: &'t Trace) -> Self {
        Self {
            trace,
            checker: AssertionChecker::new(),
        }
    }

    /// Adds a custom rule.
    #[must_use]
    pub fn add(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&Snapshot) -> QueryResult + 't,
    ) -> Self {
        self.checker.add(name, predicate);
        self
    }

    fn rule(
        self,
        kind: &str,
        name: &str,
        predicate: impl Fn(&Snapshot, &str) -> QueryResult + 't,
    ) -> Self {
        let owned = String::from(name);
        self.add(format!("{kind}({name})"), move |s| predicate(s, &owned))
    }

    /// A layer named `name` is visible.
    #[must_use]
    pub fn shows_layer(self, name: &str) -> Self {
        self.rule("shows_layer", name, Snapshot::is_visible)
    }

    /// No layer named `name` is visible.
    #[must_use]
    pub fn hides_layer(self, name: &str) -> Self {
        self.rule("hides_layer", name, |s, n| s.is_visible(n).negate())
    }

    /// Visible layers cover every pixel of `rect`.
    #[must_use]
    pub fn covers_region(self, rect: RectRegion) -> Self {
        self.add(format!("covers_region({rect})"), move |s| s.covers_region(rect))
    }

    /// The first visible layer named `name` has exactly `expected` bounds.
    #[must_use]
    pub fn has_visible_region(self, name: &str, expected: RectRegion) -> Self {
        self.rule("has_visible_region", name, move |s, n| {
            s.has_visible_region(n, expected)
        })
    }

    /// An application window named `name` is visible.
    #[must_use]
    pub fn shows_app_window(self, name: &str) -> Self {
        self.rule("shows_app_window", name, Snapshot::is_app_window_visible)
    }

    /// No application window named `name` is visible.
    #[must_use]
    pub fn hides_app_window(self, name: &str) -> Self {
        self.rule("hides_app_window", name, |s, n| {
            s.is_app_window_visible(n).negate()
        })
    }

    /// A window above the application band named `name` is visible.
    #[must_use]
    pub fn shows_above_app_window(self, name: &str) -> Self {
        self.rule(
            "shows_above_app_window",
            name,
            Snapshot::is_above_app_window_visible,
        )
    }

    /// No window above the application band named `name` is visible.
    #[must_use]
    pub fn hides_above_app_window(self, name: &str) -> Self {
        self.rule("hides_above_app_window", name, |s, n| {
            s.is_above_app_window_visible(n).negate()
        })
    }

    /// A window below the application band named `name` is visible.
    #[must_use]
    pub fn shows_below_app_window(self, name: &str) -> Self {
        self.rule(
            "shows_below_app_window",
            name,
            Snapshot::is_below_app_window_visible,
        )
    }

    /// An input method window is visible.
    #[must_use]
    pub fn shows_ime_window(self) -> Self {
        self.add("shows_ime_window", Snapshot::is_ime_window_visible)
    }

    /// No input method window is visible.
    #[must_use]
    pub fn hides_ime_window(self) -> Self {
        self.add("hides_ime_window", |s| s.is_ime_window_visible().negate())
    }

    /// The topmost visible application window is named `name`.
    #[must_use]
    pub fn shows_app_window_on_top(self, name: &str) -> Self {
        self.rule(
            "shows_app_window_on_top",
            name,
            Snapshot::is_visible_app_window_on_top,
        )
    }

    /// Following rules must hold once the preceding ones stop holding.
    #[must_use]
    pub fn then(mut self) -> Self {
        self.checker.then();
        self
    }

    /// Only checks snapshots with timestamps in `from..=to`.
    #[must_use]
    pub fn in_range(mut self, from: i64, to: i64) -> Self {
        self.checker.filter_by_range(from, to);
        self
    }

    /// Only checks the first snapshot.
    #[must_use]
    pub fn at_start(mut self) -> Self {
        self.checker.check_first();
        self
    }

    /// Only checks the last snapshot.
    #[must_use]
    pub fn at_end(mut self) -> Self {
        self.checker.check_last();
        self
    }

    /// Ignores leading snapshots until the first rules hold.
    #[must_use]
    pub fn skip_until_first_assertion(mut self) -> Self {
        self.checker.skip_until_first_assertion();
        self
    }

    /// Runs the rules, failing with every violation found.
    pub fn check(self) -> Result<(), AssertionFailure> {
        let failures = self.checker.test(self.trace);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(AssertionFailure {
                source: self.trace.source().map(String::from),
                failures,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;
    use flicker_core::TraceKind;
    use flicker_core::node::{LayerRecord, Record, WindowKind, WindowRecord, WindowRole};

    fn layers(steps: &[&[(&str, RectRegion)]]) -> Trace {
        let snapshots = steps
            .iter()
            .zip(0_i64..)
            .map(|(layers, ts)| {
                let mut records = vec![Record::layer(1, -1, "DisplayRoot", LayerRecord::default())];
                for (&(name, rect), id) in layers.iter().zip(2..) {
                    records.push(Record::layer(id, 1, name, LayerRecord::with_region(rect)));
                }
                Snapshot::from_records(ts * 100, records).unwrap()
            })
            .collect();
        Trace::from_snapshots(TraceKind::Layers, snapshots).with_source("launch.flkr")
    }

    const SCREEN: RectRegion = RectRegion::new(0, 0, 100, 200);
    const BAR: RectRegion = RectRegion::new(0, 0, 100, 20);
    const BODY: RectRegion = RectRegion::new(0, 20, 100, 200);

    #[test]
    fn launch_transition_passes() {
        let trace = layers(&[
            &[("StatusBar", BAR), ("Launcher", BODY)],
            &[("StatusBar", BAR), ("Launcher", BODY)],
            &[("StatusBar", BAR), ("Settings", BODY)],
        ]);
        TraceSubject::new(&trace)
            .shows_layer("StatusBar")
            .covers_region(SCREEN)
            .shows_layer("Launcher")
            .then()
            .shows_layer("Settings")
            .hides_layer("Launcher")
            .check()
            .unwrap();

        TraceSubject::new(&trace)
            .has_visible_region("StatusBar", BAR)
            .check()
            .unwrap();
    }

    #[test]
    fn flicker_is_reported_with_source() {
        let trace = layers(&[
            &[("StatusBar", BAR), ("Launcher", BODY)],
            &[("Launcher", BODY)],
            &[("StatusBar", BAR), ("Launcher", BODY)],
        ]);
        let err = TraceSubject::new(&trace)
            .shows_layer("StatusBar")
            .covers_region(SCREEN)
            .check()
            .unwrap_err();
        assert_eq!(err.source.as_deref(), Some("launch.flkr"));
        assert_eq!(err.failures.len(), 2);
        assert!(err.failures.iter().all(|f| f.timestamp == 100));
        let text = err.to_string();
        assert!(text.starts_with("2 assertion(s) failed in launch.flkr"));
        assert!(text.contains("Assertion: shows_layer(StatusBar)"));
        assert!(text.contains("Reason: StatusBar cannot be found"));
        assert!(text.contains("not covered at (0, 0)"));
    }

    #[test]
    fn hides_layer_is_a_negation() {
        let trace = layers(&[&[("Launcher", BODY)]]);
        let err = TraceSubject::new(&trace)
            .hides_layer("Launcher")
            .check()
            .unwrap_err();
        assert_eq!(err.failures[0].assertion_name, "hides_layer(Launcher)");
        assert_eq!(err.failures[0].reason, "Launcher is visible");
    }

    #[test]
    fn start_and_end_selection() {
        let trace = layers(&[&[("Launcher", BODY)], &[("Settings", BODY)]]);
        let subject = || TraceSubject::new(&trace);
        subject().shows_layer("Launcher").at_start().check().unwrap();
        subject().shows_layer("Settings").at_end().check().unwrap();
        subject()
            .shows_layer("Settings")
            .in_range(100, 100)
            .check()
            .unwrap();
        subject()
            .shows_layer("Settings")
            .skip_until_first_assertion()
            .check()
            .unwrap();
        assert!(subject().shows_layer("Settings").check().is_err());
    }

    #[test]
    fn custom_rule() {
        let trace = layers(&[&[("Launcher", BODY)], &[("Launcher", BODY)]]);
        TraceSubject::new(&trace)
            .add("single layer", |s| {
                if s.len() == 1 {
                    QueryResult::passed(s.timestamp(), "single layer", "one layer")
                } else {
                    QueryResult::failed(s.timestamp(), "single layer", "extra layers")
                }
            })
            .check()
            .unwrap();
    }

    fn windows(ime_visible: bool) -> Trace {
        let frame = RectRegion::new(0, 0, 100, 200);
        let window = |id, name: &str, kind, visible| {
            Record::window(id, 1, name, WindowRecord::window(kind, visible, frame))
        };
        let records = vec![
            Record::window(
                1,
                -1,
                "RootWindowContainer",
                WindowRecord::container(WindowRole::Container, true),
            ),
            window(2, "StatusBar", WindowKind::AboveApp, true),
            window(3, "com.example/.Main", WindowKind::App, true),
            window(4, "com.example/.Launcher", WindowKind::App, false),
            window(5, "Wallpaper", WindowKind::BelowApp, true),
            window(6, "InputMethod", WindowKind::Ime, ime_visible),
        ];
        let snapshot = Snapshot::from_records(0, records).unwrap();
        Trace::from_snapshots(TraceKind::Windows, vec![snapshot])
    }

    #[test]
    fn window_rules() {
        let trace = windows(false);
        TraceSubject::new(&trace)
            .shows_app_window("Main")
            .hides_app_window("Launcher")
            .shows_app_window_on_top("Main")
            .shows_above_app_window("StatusBar")
            .shows_below_app_window("Wallpaper")
            .hides_ime_window()
            .check()
            .unwrap();

        let trace = windows(true);
        TraceSubject::new(&trace).shows_ime_window().check().unwrap();
        let err = TraceSubject::new(&trace)
            .hides_above_app_window("StatusBar")
            .check()
            .unwrap_err();
        assert_eq!(
            err.failures[0].assertion_name,
            "hides_above_app_window(StatusBar)"
        );
        assert!(err.source.is_none());
    }
}
