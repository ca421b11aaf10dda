// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named predicates over one snapshot.
//!
//! Every query returns a [`QueryResult`] rather than an error: a predicate
//! that does not hold is an expected outcome, and its `reason` is meant to be
//! shown verbatim in assertion reports.
//!
//! Named lookups share one scan. Candidates are nodes whose name contains the
//! search string, visited in flatten order. The first visible candidate
//! decides the query; invisible ones are skipped, and if nothing succeeds the
//! explanation for the *last* skipped candidate becomes the failure reason.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use core::fmt::Write as _;

use crate::node::{Node, NodeIdx, RecordData, Visibility, WindowKind, WindowRole};
use crate::region::RectRegion;
use crate::snapshot::Snapshot;

/// Outcome of one named predicate on one snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryResult {
    /// Whether the predicate held.
    pub success: bool,
    /// Timestamp of the snapshot it was evaluated on.
    pub timestamp: i64,
    /// Name of the predicate.
    pub assertion_name: String,
    /// Human-readable explanation.
    pub reason: String,
}

impl QueryResult {
    /// A successful result.
    #[must_use]
    pub fn passed(
        timestamp: i64,
        assertion_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            timestamp,
            assertion_name: assertion_name.into(),
            reason: reason.into(),
        }
    }

    /// A failed result.
    #[must_use]
    pub fn failed(
        timestamp: i64,
        assertion_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            ..Self::passed(timestamp, assertion_name, reason)
        }
    }

    /// Returns `true` if the predicate did not hold.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Inverts the result and prefixes the name with `!`.
    #[must_use]
    pub fn negate(mut self) -> Self {
        self.success = !self.success;
        self.assertion_name.insert(0, '!');
        self
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timestamp: {}\nAssertion: {}\nReason: {}",
            self.timestamp, self.assertion_name, self.reason
        )
    }
}

/// Rectangles a node contributes to screen coverage.
fn node_rects(node: &Node) -> &[RectRegion] {
    match &node.record.data {
        RecordData::Layer(layer) => layer.visible_region.rects(),
        RecordData::Window(window) => core::slice::from_ref(&window.frame),
    }
}

fn node_bounds(node: &Node) -> RectRegion {
    match &node.record.data {
        RecordData::Layer(layer) => layer.visible_region.bounds(),
        RecordData::Window(window) => window.frame,
    }
}

fn is_window_of(node: &Node, kind: WindowKind) -> bool {
    node.window()
        .is_some_and(|w| w.role == WindowRole::Window && w.kind == kind)
}

impl Snapshot {
    /// Explains why `idx` is not visible, or `None` if it is.
    #[must_use]
    pub fn explain_invisible(&self, idx: NodeIdx) -> Option<String> {
        let name = self.node(idx).name();
        match self.visibility(idx) {
            Visibility::Visible => None,
            Visibility::HiddenByParent { ancestor } => Some(format!(
                "{name} is hidden by parent {}",
                self.node(ancestor).name()
            )),
            Visibility::Invisible(reason) => Some(format!("{name} {reason}")),
        }
    }

    /// Shared substring scan behind every named visibility query.
    fn scan_visible(
        &self,
        assertion: &str,
        label: &str,
        needle: &str,
        accept: impl Fn(&Node) -> bool,
    ) -> QueryResult {
        let mut last_reason = None;
        for idx in self.matching(needle) {
            if !accept(self.node(idx)) {
                continue;
            }
            match self.explain_invisible(idx) {
                None => {
                    return QueryResult::passed(
                        self.timestamp(),
                        assertion,
                        format!("{label} is visible"),
                    );
                }
                Some(reason) => last_reason = Some(reason),
            }
        }
        let reason = last_reason.unwrap_or_else(|| format!("{label} cannot be found"));
        QueryResult::failed(self.timestamp(), assertion, reason)
    }

    /// Checks that every pixel of `rect` lies in some visible node's region.
    ///
    /// Columns are scanned top to bottom; after a hit the scan jumps to the
    /// bottom edge of the rectangle that covered the pixel. An empty `rect`
    /// is trivially covered.
    #[must_use]
    pub fn covers_region(&self, rect: RectRegion) -> QueryResult {
        const NAME: &str = "covers_region";
        if rect.is_empty() {
            return QueryResult::passed(self.timestamp(), NAME, format!("{rect} is empty"));
        }

        let visible: Vec<&Node> = self.visible_nodes().map(|idx| self.node(idx)).collect();

        for x in rect.left..rect.right {
            let mut y = rect.top;
            while y < rect.bottom {
                let hit = visible
                    .iter()
                    .flat_map(|node| node_rects(node))
                    .find(|r| r.contains_point(x, y));
                match hit {
                    Some(r) => y = r.bottom,
                    None => {
                        let mut reason =
                            format!("Region {rect} not covered at ({x}, {y}). Visible regions:");
                        for node in &visible {
                            for r in node_rects(node) {
                                _ = write!(reason, "\n  {}: {r}", node.name());
                            }
                        }
                        return QueryResult::failed(self.timestamp(), NAME, reason);
                    }
                }
            }
        }
        QueryResult::passed(
            self.timestamp(),
            NAME,
            format!("{rect} is covered by visible regions"),
        )
    }

    /// Checks that the first visible node named `name` has exactly `expected`
    /// as its visible bounds.
    #[must_use]
    pub fn has_visible_region(&self, name: &str, expected: RectRegion) -> QueryResult {
        const NAME: &str = "has_visible_region";
        let mut last_reason = None;
        for idx in self.matching(name) {
            let node = self.node(idx);
            if let Some(reason) = self.explain_invisible(idx) {
                last_reason = Some(reason);
                continue;
            }
            let bounds = node_bounds(node);
            if bounds == expected {
                return QueryResult::passed(
                    self.timestamp(),
                    NAME,
                    format!("{} has visible region {expected}", node.name()),
                );
            }
            last_reason = Some(format!(
                "{} has visible region {bounds}, expected {expected}",
                node.name()
            ));
        }
        let reason = last_reason.unwrap_or_else(|| format!("{name} cannot be found"));
        QueryResult::failed(self.timestamp(), NAME, reason)
    }

    /// Succeeds as soon as one node named `name` is visible.
    #[must_use]
    pub fn is_visible(&self, name: &str) -> QueryResult {
        self.scan_visible("is_visible", name, name, |_| true)
    }

    /// Bounds of the first visible node named `name`, or
    /// [`RectRegion::EMPTY`].
    #[must_use]
    pub fn visible_bounds(&self, name: &str) -> RectRegion {
        self.matching(name)
            .find(|&idx| self.is_node_visible(idx))
            .map_or(RectRegion::EMPTY, |idx| node_bounds(self.node(idx)))
    }

    /// Succeeds if an application window named `name` is visible.
    #[must_use]
    pub fn is_app_window_visible(&self, name: &str) -> QueryResult {
        self.scan_visible("is_app_window_visible", name, name, |n| {
            is_window_of(n, WindowKind::App)
        })
    }

    /// Succeeds if a window above the application band named `name` is
    /// visible.
    #[must_use]
    pub fn is_above_app_window_visible(&self, name: &str) -> QueryResult {
        self.scan_visible("is_above_app_window_visible", name, name, |n| {
            is_window_of(n, WindowKind::AboveApp)
        })
    }

    /// Succeeds if a window below the application band named `name` is
    /// visible.
    #[must_use]
    pub fn is_below_app_window_visible(&self, name: &str) -> QueryResult {
        self.scan_visible("is_below_app_window_visible", name, name, |n| {
            is_window_of(n, WindowKind::BelowApp)
        })
    }

    /// Succeeds if any input method window is visible.
    #[must_use]
    pub fn is_ime_window_visible(&self) -> QueryResult {
        self.scan_visible("is_ime_window_visible", "IME window", "", |n| {
            is_window_of(n, WindowKind::Ime)
        })
    }

    /// Succeeds if the topmost visible application window is named `name`.
    ///
    /// Window-manager captures list siblings top-most first, so the first
    /// visible application window in flatten order is the one on top.
    #[must_use]
    pub fn is_visible_app_window_on_top(&self, name: &str) -> QueryResult {
        const NAME: &str = "is_visible_app_window_on_top";
        let top = self
            .visible_nodes()
            .map(|idx| self.node(idx))
            .find(|n| is_window_of(n, WindowKind::App));
        match top {
            Some(node) if node.name().contains(name) => QueryResult::passed(
                self.timestamp(),
                NAME,
                format!("{} is on top", node.name()),
            ),
            Some(node) => QueryResult::failed(
                self.timestamp(),
                NAME,
                format!("{} is on top, expected {name}", node.name()),
            ),
            None => QueryResult::failed(self.timestamp(), NAME, "no visible app window found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LayerRecord, Record, WindowRecord};
    use alloc::string::ToString;
    use alloc::vec;

    fn layer(id: i32, parent: i32, name: &str, rect: RectRegion) -> Record {
        Record::layer(id, parent, name, LayerRecord::with_region(rect))
    }

    fn display_root() -> Record {
        layer(1, -1, "DisplayRoot", RectRegion::EMPTY)
    }

    fn tiled(tiles: &[RectRegion]) -> Snapshot {
        let mut records = vec![display_root()];
        for (i, &rect) in tiles.iter().enumerate() {
            let id = i32::try_from(i).unwrap() + 10;
            records.push(layer(id, 1, "Tile", rect));
        }
        Snapshot::from_records(0, records).unwrap()
    }

    #[test]
    fn end_to_end_scenario() {
        let records = vec![
            display_root(),
            layer(2, 1, "StatusBar", RectRegion::new(0, 0, 100, 20)),
            layer(3, 1, "AppWindow", RectRegion::new(0, 20, 100, 200)),
        ];
        let s = Snapshot::from_records(0, records).unwrap();
        assert_eq!(s.flatten().len(), 2);
        assert!(s.covers_region(RectRegion::new(0, 0, 100, 200)).success);
        let result = s.is_visible("StatusBar");
        assert!(result.success);
        assert_eq!(result.reason, "StatusBar is visible");
    }

    #[test]
    fn exact_tiling_covers_and_gap_is_reported() {
        let tiles = [
            RectRegion::new(0, 0, 30, 100),
            RectRegion::new(30, 0, 60, 100),
            RectRegion::new(60, 0, 100, 100),
        ];
        let target = RectRegion::new(0, 0, 100, 100);
        assert!(tiled(&tiles).covers_region(target).success);

        let gap = tiled(&[tiles[0], tiles[2]]).covers_region(target);
        assert!(gap.is_failure());
        assert!(gap.reason.contains("not covered at (30, 0)"), "{}", gap.reason);
        assert!(gap.reason.contains("Tile: (60, 0) - (100, 100)"));
    }

    #[test]
    fn empty_rect_is_covered() {
        let s = tiled(&[]);
        assert!(s.covers_region(RectRegion::EMPTY).success);
        assert!(s.covers_region(RectRegion::new(0, 0, 1, 1)).is_failure());
    }

    #[test]
    fn hidden_layers_do_not_cover() {
        let mut hidden = LayerRecord::with_region(RectRegion::new(0, 0, 10, 10));
        hidden.hidden = true;
        let s = Snapshot::from_records(
            0,
            vec![display_root(), Record::layer(2, 1, "Hidden", hidden)],
        )
        .unwrap();
        assert!(s.covers_region(RectRegion::new(0, 0, 10, 10)).is_failure());
    }

    #[test]
    fn named_lookup_skips_invisible_match() {
        let mut transparent = LayerRecord::with_region(RectRegion::new(0, 0, 10, 10));
        transparent.alpha = 0.0;
        let s = Snapshot::from_records(
            0,
            vec![
                display_root(),
                Record::layer(2, 1, "Dialog#1", transparent.clone()),
                layer(3, 1, "Dialog#2", RectRegion::new(0, 0, 10, 10)),
            ],
        )
        .unwrap();
        assert!(s.is_visible("Dialog").success);
        assert_eq!(s.visible_bounds("Dialog"), RectRegion::new(0, 0, 10, 10));

        let mut no_content = LayerRecord::with_region(RectRegion::new(0, 0, 10, 10));
        no_content.has_buffer = false;
        let s = Snapshot::from_records(
            0,
            vec![
                display_root(),
                Record::layer(2, 1, "Dialog#1", transparent),
                Record::layer(3, 1, "Dialog#2", no_content),
            ],
        )
        .unwrap();
        let result = s.is_visible("Dialog");
        assert!(result.is_failure());
        assert_eq!(result.reason, "Dialog#2 has no content");
        assert_eq!(s.visible_bounds("Dialog"), RectRegion::EMPTY);
    }

    #[test]
    fn nan_alpha_is_transparent() {
        let mut ghost = LayerRecord::with_region(RectRegion::new(0, 0, 10, 10));
        ghost.alpha = f32::NAN;
        let s = Snapshot::from_records(
            0,
            vec![display_root(), Record::layer(2, 1, "Ghost", ghost)],
        )
        .unwrap();
        let result = s.is_visible("Ghost");
        assert!(result.is_failure());
        assert_eq!(result.reason, "Ghost is fully transparent");
        assert!(s.covers_region(RectRegion::new(0, 0, 10, 10)).is_failure());
    }

    #[test]
    fn hidden_by_parent_reason() {
        let mut parent = LayerRecord::with_region(RectRegion::new(0, 0, 10, 10));
        parent.hidden = true;
        let s = Snapshot::from_records(
            0,
            vec![
                display_root(),
                Record::layer(2, 1, "Container", parent),
                layer(3, 2, "Child", RectRegion::new(0, 0, 10, 10)),
            ],
        )
        .unwrap();
        assert_eq!(
            s.is_visible("Child").reason,
            "Child is hidden by parent Container"
        );
        assert_eq!(s.is_visible("Nope").reason, "Nope cannot be found");
    }

    #[test]
    fn visible_region_must_match_bounds() {
        let s = tiled(&[RectRegion::new(0, 0, 50, 50)]);
        assert!(
            s.has_visible_region("Tile", RectRegion::new(0, 0, 50, 50))
                .success
        );
        let wrong = s.has_visible_region("Tile", RectRegion::new(0, 0, 40, 50));
        assert!(wrong.is_failure());
        assert_eq!(
            wrong.reason,
            "Tile has visible region (0, 0) - (50, 50), expected (0, 0) - (40, 50)"
        );
    }

    #[test]
    fn negate_flips_and_renames() {
        let r = QueryResult::passed(5, "is_visible", "ok").negate();
        assert!(r.is_failure());
        assert_eq!(r.assertion_name, "!is_visible");
        assert_eq!(
            r.to_string(),
            "Timestamp: 5\nAssertion: !is_visible\nReason: ok"
        );
    }

    fn windows() -> Snapshot {
        let frame = RectRegion::new(0, 0, 100, 200);
        let mut records = vec![Record::window(
            1,
            -1,
            "RootWindowContainer",
            WindowRecord::container(WindowRole::Container, true),
        )];
        let entries = [
            (2, "StatusBar", WindowKind::AboveApp, true),
            (3, "com.example/.Hidden", WindowKind::App, false),
            (4, "com.example/.Main", WindowKind::App, true),
            (5, "com.example/.Settings", WindowKind::App, true),
            (6, "Wallpaper", WindowKind::BelowApp, true),
            (7, "InputMethod", WindowKind::Ime, false),
        ];
        for (id, name, kind, visible) in entries {
            records.push(Record::window(
                id,
                1,
                name,
                WindowRecord::window(kind, visible, frame),
            ));
        }
        Snapshot::from_records(0, records).unwrap()
    }

    #[test]
    fn window_band_queries() {
        let s = windows();
        assert!(s.is_app_window_visible("Main").success);
        assert!(s.is_app_window_visible("StatusBar").is_failure());
        assert!(s.is_above_app_window_visible("StatusBar").success);
        assert!(s.is_below_app_window_visible("Wallpaper").success);
        assert_eq!(
            s.is_app_window_visible("Hidden").reason,
            "com.example/.Hidden is not visible"
        );
        let ime = s.is_ime_window_visible();
        assert!(ime.is_failure());
        assert_eq!(ime.reason, "InputMethod is not visible");
    }

    #[test]
    fn app_window_on_top_skips_invisible() {
        let s = windows();
        assert!(s.is_visible_app_window_on_top("Main").success);
        let wrong = s.is_visible_app_window_on_top("Settings");
        assert!(wrong.is_failure());
        assert_eq!(
            wrong.reason,
            "com.example/.Main is on top, expected Settings"
        );
    }
}
