// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hierarchy reconstruction from flattened records.
//!
//! [`SnapshotBuilder`] links records in input order. A record whose parent
//! has not been seen yet is attached to a placeholder slot; the placeholder is
//! filled in when the real parent record arrives, so input order does not
//! matter. After all records are linked:
//!
//! 1. The display root is located with [`BuildOptions::display_root`]; its
//!    parent slot is the forest root. This handles both the current
//!    convention (top-level parent id `-1`) and the legacy one (`0`) without
//!    hard-coding either.
//! 2. Every other placeholder is an orphan and is handed to the
//!    [`OrphanPolicy`].
//! 3. Resolved records that are neither reachable from the forest root nor
//!    under an accepted orphan must sit on a parent cycle, which is fatal.
//! 4. Reachable nodes are copied into a compact arena in breadth-first order,
//!    with the forest root and display root spliced out.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;

use crate::diag::{Diagnostics, OrphansDroppedEvent, SnapshotBuiltEvent};
use crate::error::{OrphanError, ParseError, TraceError};
use crate::node::{Node, NodeIdx, Record};
use crate::snapshot::Snapshot;

/// Predicate identifying the well-known display root record.
pub type DisplayRootMatcher = fn(&Record) -> bool;

/// Default [`DisplayRootMatcher`].
///
/// Matches the compositor's display root (`"DisplayRoot"` or any name
/// starting with `"Display Root"`) and the window manager's
/// `"RootWindowContainer"`.
#[must_use]
pub fn is_well_known_display_root(record: &Record) -> bool {
    let name = record.name.as_str();
    name == "DisplayRoot" || name.starts_with("Display Root") || name == "RootWindowContainer"
}

/// What to do with parent ids that never resolve.
#[derive(Default)]
pub enum OrphanPolicy<'a> {
    /// Fail the build on the first orphan.
    #[default]
    Reject,
    /// Ask the callback; `true` accepts the orphan and excludes its subtree,
    /// `false` fails the build.
    Callback(&'a mut dyn FnMut(&OrphanError) -> bool),
}

impl fmt::Debug for OrphanPolicy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("Reject"),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Options applied to every snapshot built from a capture.
#[derive(Debug)]
pub struct BuildOptions<'a> {
    /// Identifies the display root record.
    pub display_root: DisplayRootMatcher,
    /// Orphan handling.
    pub orphan_policy: OrphanPolicy<'a>,
}

impl Default for BuildOptions<'_> {
    fn default() -> Self {
        Self {
            display_root: is_well_known_display_root,
            orphan_policy: OrphanPolicy::Reject,
        }
    }
}

impl<'a> BuildOptions<'a> {
    /// Options that consult `callback` for each orphan instead of failing.
    #[must_use]
    pub fn with_orphan_callback(callback: &'a mut dyn FnMut(&OrphanError) -> bool) -> Self {
        Self {
            orphan_policy: OrphanPolicy::Callback(callback),
            ..Self::default()
        }
    }

    /// Replaces the display root predicate.
    #[must_use]
    pub fn display_root(mut self, matcher: DisplayRootMatcher) -> Self {
        self.display_root = matcher;
        self
    }
}

#[derive(Debug)]
struct Slot {
    id: i32,
    /// `None` while this slot is only a placeholder for a parent reference.
    record: Option<Record>,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Slot {
    fn placeholder(id: i32) -> Self {
        Self {
            id,
            record: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Rebuilds one snapshot's hierarchy from flattened records.
#[derive(Debug)]
pub struct SnapshotBuilder {
    timestamp: i64,
    slots: Vec<Slot>,
    by_id: HashMap<i32, usize>,
}

impl SnapshotBuilder {
    /// Creates an empty builder for the entry at `timestamp`.
    #[must_use]
    pub fn new(timestamp: i64) -> Self {
        Self::with_capacity(timestamp, 0)
    }

    /// Creates an empty builder with room for `records` records.
    #[must_use]
    pub fn with_capacity(timestamp: i64, records: usize) -> Self {
        Self {
            timestamp,
            slots: Vec::with_capacity(records + 1),
            by_id: HashMap::with_capacity(records + 1),
        }
    }

    /// Timestamp of the entry being built.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Links one record into the hierarchy.
    ///
    /// Re-submitting an identical record is a no-op; a different record with
    /// an already resolved id is a [`ParseError::DuplicateId`].
    pub fn push(&mut self, record: Record) -> Result<(), ParseError> {
        if record.id == record.parent_id {
            return Err(ParseError::SelfParent {
                timestamp: self.timestamp,
                id: record.id,
            });
        }

        let idx = match self.by_id.get(&record.id) {
            Some(&idx) => match &self.slots[idx].record {
                Some(existing) if *existing == record => return Ok(()),
                Some(_) => {
                    return Err(ParseError::DuplicateId {
                        timestamp: self.timestamp,
                        id: record.id,
                    });
                }
                None => idx,
            },
            None => self.alloc(record.id),
        };
        let parent = match self.by_id.get(&record.parent_id) {
            Some(&p) => p,
            None => self.alloc(record.parent_id),
        };

        self.slots[idx].record = Some(record);
        self.slots[idx].parent = Some(parent);
        self.slots[parent].children.push(idx);
        Ok(())
    }

    /// Links every record in order, stopping at the first error.
    pub fn extend(&mut self, records: impl IntoIterator<Item = Record>) -> Result<(), ParseError> {
        for record in records {
            self.push(record)?;
        }
        Ok(())
    }

    fn alloc(&mut self, id: i32) -> usize {
        let idx = self.slots.len();
        self.slots.push(Slot::placeholder(id));
        self.by_id.insert(id, idx);
        idx
    }

    /// Finishes the hierarchy and produces the snapshot.
    pub fn build(
        mut self,
        options: &mut BuildOptions<'_>,
        diag: &mut Diagnostics<'_>,
    ) -> Result<Snapshot, TraceError> {
        let timestamp = self.timestamp;
        if self.slots.is_empty() {
            diag.snapshot_built(&SnapshotBuiltEvent {
                timestamp,
                node_count: 0,
                root_count: 0,
                dropped_orphans: 0,
            });
            return Ok(Snapshot::from_parts(timestamp, Vec::new(), Vec::new()));
        }

        let is_display_root = options.display_root;
        let matches_root =
            |slot: &Slot| slot.record.as_ref().is_some_and(|r| is_display_root(r));

        let forest_root = self
            .slots
            .iter()
            .find(|s| matches_root(s))
            .and_then(|s| s.parent)
            .ok_or(ParseError::MissingDisplayRoot { timestamp })?;

        let mut visited = vec![false; self.slots.len()];
        visited[forest_root] = true;

        // Orphans, in placeholder creation order.
        let mut dropped_orphans = 0;
        for (idx, slot) in self.slots.iter().enumerate() {
            if idx == forest_root || slot.record.is_some() {
                continue;
            }
            let orphan = OrphanError {
                timestamp,
                parent_id: slot.id,
                child_ids: slot.children.iter().map(|&c| self.slots[c].id).collect(),
            };
            let accepted = match &mut options.orphan_policy {
                OrphanPolicy::Reject => false,
                OrphanPolicy::Callback(accept) => accept(&orphan),
            };
            if !accepted {
                return Err(orphan.into());
            }
            diag.orphans_dropped(&OrphansDroppedEvent {
                timestamp,
                parent_id: orphan.parent_id,
                child_ids: &orphan.child_ids,
            });
            dropped_orphans += 1;
            self.mark_subtree(idx, &mut visited);
        }

        // Top-level roots: forest root children, with display roots spliced out.
        let mut root_slots = Vec::new();
        for &child in &self.slots[forest_root].children {
            if matches_root(&self.slots[child]) {
                visited[child] = true;
                root_slots.extend_from_slice(&self.slots[child].children);
            } else {
                root_slots.push(child);
            }
        }

        let mut nodes: Vec<Node> = Vec::with_capacity(self.slots.len());
        let mut roots = Vec::with_capacity(root_slots.len());
        let mut queue = VecDeque::new();
        for slot in root_slots {
            if let Some(idx) = self.take_node(slot, None, 0, &mut nodes, &mut visited) {
                roots.push(NodeIdx::from_slot(idx));
                queue.push_back((slot, idx));
            }
        }
        while let Some((slot, idx)) = queue.pop_front() {
            let depth = nodes[idx].depth + 1;
            let parent = NodeIdx::from_slot(idx);
            for child in core::mem::take(&mut self.slots[slot].children) {
                if let Some(child_idx) =
                    self.take_node(child, Some(parent), depth, &mut nodes, &mut visited)
                {
                    nodes[idx].children.push(NodeIdx::from_slot(child_idx));
                    queue.push_back((child, child_idx));
                }
            }
        }

        let mut cycle: Vec<i32> = self
            .slots
            .iter()
            .zip(&visited)
            .filter(|(slot, seen)| slot.record.is_some() && !**seen)
            .map(|(slot, _)| slot.id)
            .collect();
        if !cycle.is_empty() {
            cycle.sort_unstable();
            return Err(ParseError::Cycle {
                timestamp,
                ids: cycle,
            }
            .into());
        }

        diag.snapshot_built(&SnapshotBuiltEvent {
            timestamp,
            node_count: nodes.len(),
            root_count: roots.len(),
            dropped_orphans,
        });
        Ok(Snapshot::from_parts(timestamp, nodes, roots))
    }

    /// Moves a slot's record into the output arena.
    ///
    /// Taken records leave `None` behind, so they also stop counting as
    /// unreachable in the cycle check.
    fn take_node(
        &mut self,
        slot: usize,
        parent: Option<NodeIdx>,
        depth: u32,
        nodes: &mut Vec<Node>,
        visited: &mut [bool],
    ) -> Option<usize> {
        if visited[slot] {
            return None;
        }
        visited[slot] = true;
        let record = self.slots[slot].record.take()?;
        nodes.push(Node {
            record,
            parent,
            children: Vec::new(),
            depth,
        });
        Some(nodes.len() - 1)
    }

    fn mark_subtree(&self, root: usize, visited: &mut [bool]) {
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            stack.extend_from_slice(&self.slots[idx].children);
        }
    }
}

impl Snapshot {
    /// Builds a snapshot from flattened records with default options.
    pub fn from_records(
        timestamp: i64,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self, TraceError> {
        let mut builder = SnapshotBuilder::new(timestamp);
        builder.extend(records)?;
        builder.build(&mut BuildOptions::default(), &mut Diagnostics::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LayerRecord;
    use crate::region::RectRegion;
    use alloc::collections::BTreeMap;
    use alloc::string::String;

    fn layer(id: i32, parent: i32, name: &str) -> Record {
        Record::layer(
            id,
            parent,
            name,
            LayerRecord::with_region(RectRegion::new(0, 0, 10, 10)),
        )
    }

    fn sample() -> Vec<Record> {
        vec![
            layer(1, -1, "DisplayRoot"),
            layer(2, 1, "StatusBar"),
            layer(3, 1, "AppWindow"),
            layer(4, 3, "AppSurface"),
            layer(5, 4, "AppChild"),
        ]
    }

    fn parent_map(snapshot: &Snapshot) -> BTreeMap<i32, Option<i32>> {
        snapshot
            .flatten()
            .iter()
            .map(|n| (n.id(), n.parent.map(|p| snapshot.node(p).id())))
            .collect()
    }

    fn build_with(
        records: Vec<Record>,
        options: &mut BuildOptions<'_>,
    ) -> Result<Snapshot, TraceError> {
        let mut builder = SnapshotBuilder::new(7);
        builder.extend(records)?;
        builder.build(options, &mut Diagnostics::none())
    }

    #[test]
    fn display_root_is_spliced_out() {
        let snapshot = Snapshot::from_records(0, sample()).unwrap();
        assert_eq!(snapshot.flatten().len(), 4);
        let roots: Vec<&str> = snapshot
            .roots()
            .iter()
            .map(|&r| snapshot.node(r).name())
            .collect();
        assert_eq!(roots, ["StatusBar", "AppWindow"]);
        let child = snapshot.find("AppChild").unwrap();
        assert_eq!(snapshot.node(child).depth, 2);
    }

    #[test]
    fn flatten_is_breadth_first() {
        let snapshot = Snapshot::from_records(0, sample()).unwrap();
        let names: Vec<&str> = snapshot.flatten().iter().map(Node::name).collect();
        assert_eq!(names, ["StatusBar", "AppWindow", "AppSurface", "AppChild"]);
    }

    #[test]
    fn reconstruction_ignores_input_order() {
        let forward = Snapshot::from_records(0, sample()).unwrap();
        let mut reversed = sample();
        reversed.reverse();
        let backward = Snapshot::from_records(0, reversed).unwrap();
        let mut shuffled = sample();
        shuffled.rotate_left(2);
        let rotated = Snapshot::from_records(0, shuffled).unwrap();

        assert_eq!(parent_map(&forward), parent_map(&backward));
        assert_eq!(parent_map(&forward), parent_map(&rotated));
    }

    #[test]
    fn legacy_zero_parent_convention() {
        let records = vec![
            layer(5, 0, "Display Root#0"),
            layer(6, 5, "Wallpaper"),
            layer(7, 5, "Launcher"),
        ];
        let snapshot = Snapshot::from_records(0, records).unwrap();
        assert_eq!(snapshot.flatten().len(), 2);
        assert_eq!(snapshot.roots().len(), 2);
    }

    #[test]
    fn other_top_level_nodes_are_kept() {
        let mut records = sample();
        records.push(layer(9, -1, "OffscreenRoot"));
        let snapshot = Snapshot::from_records(0, records).unwrap();
        assert!(snapshot.find("OffscreenRoot").is_some());
        assert_eq!(snapshot.roots().len(), 3);
    }

    #[test]
    fn identical_duplicate_collapses() {
        let mut records = sample();
        records.push(layer(2, 1, "StatusBar"));
        let snapshot = Snapshot::from_records(0, records).unwrap();
        assert_eq!(snapshot.flatten().len(), 4);
    }

    #[test]
    fn identical_duplicate_with_nan_alpha_collapses() {
        let mut data = LayerRecord::with_region(RectRegion::new(0, 0, 10, 10));
        data.alpha = f32::NAN;
        let ghost = Record::layer(2, 1, "Ghost", data);
        let records = vec![layer(1, -1, "DisplayRoot"), ghost.clone(), ghost];
        let snapshot = Snapshot::from_records(0, records).unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn differing_duplicate_is_rejected() {
        let mut records = sample();
        records.push(layer(2, 1, "NotStatusBar"));
        let err = Snapshot::from_records(3, records).unwrap_err();
        assert_eq!(
            err,
            TraceError::Parse(ParseError::DuplicateId {
                timestamp: 3,
                id: 2
            })
        );
    }

    #[test]
    fn self_parent_is_rejected() {
        let err = Snapshot::from_records(0, vec![layer(4, 4, "Loop")]).unwrap_err();
        assert!(matches!(
            err,
            TraceError::Parse(ParseError::SelfParent { id: 4, .. })
        ));
    }

    #[test]
    fn orphan_rejected_by_default() {
        let mut records = sample();
        records.push(layer(20, 99, "Lost"));
        records.push(layer(21, 99, "AlsoLost"));
        let err = Snapshot::from_records(5, records).unwrap_err();
        assert_eq!(
            err,
            TraceError::Orphan(OrphanError {
                timestamp: 5,
                parent_id: 99,
                child_ids: vec![20, 21],
            })
        );
    }

    #[test]
    fn orphan_callback_drops_subtree() {
        let mut records = sample();
        records.push(layer(20, 99, "Lost"));
        records.push(layer(22, 20, "LostChild"));

        let mut seen: Vec<i32> = Vec::new();
        let mut accept = |o: &OrphanError| {
            seen.push(o.parent_id);
            true
        };
        let mut options = BuildOptions::with_orphan_callback(&mut accept);
        let snapshot = build_with(records, &mut options).unwrap();

        assert_eq!(seen, [99]);
        assert_eq!(snapshot.flatten().len(), 4);
        assert!(snapshot.find("Lost").is_none());
        assert!(snapshot.find("LostChild").is_none());
    }

    #[test]
    fn orphan_callback_can_refuse() {
        let mut records = sample();
        records.push(layer(20, 99, "Lost"));
        let mut refuse = |_: &OrphanError| false;
        let mut options = BuildOptions::with_orphan_callback(&mut refuse);
        let err = build_with(records, &mut options).unwrap_err();
        assert!(matches!(err, TraceError::Orphan(OrphanError { parent_id: 99, .. })));
    }

    #[test]
    fn parent_cycle_is_rejected() {
        let mut records = sample();
        records.push(layer(30, 31, "A"));
        records.push(layer(31, 30, "B"));
        records.push(layer(32, 30, "UnderA"));
        let err = Snapshot::from_records(1, records).unwrap_err();
        assert_eq!(
            err,
            TraceError::Parse(ParseError::Cycle {
                timestamp: 1,
                ids: vec![30, 31, 32],
            })
        );
    }

    #[test]
    fn missing_display_root() {
        let err = Snapshot::from_records(2, vec![layer(1, -1, "JustALayer")]).unwrap_err();
        assert_eq!(
            err,
            TraceError::Parse(ParseError::MissingDisplayRoot { timestamp: 2 })
        );
    }

    #[test]
    fn empty_entry_builds_empty_snapshot() {
        let snapshot = Snapshot::from_records(0, Vec::new()).unwrap();
        assert!(snapshot.flatten().is_empty());
        assert!(snapshot.roots().is_empty());
    }

    #[test]
    fn custom_display_root_matcher() {
        let records = vec![layer(1, -1, "Screen"), layer(2, 1, "Content")];
        let mut options = BuildOptions::default().display_root(|r| r.name == "Screen");
        let snapshot = build_with(records, &mut options).unwrap();
        let names: Vec<String> = snapshot
            .flatten()
            .iter()
            .map(|n| String::from(n.name()))
            .collect();
        assert_eq!(names, ["Content"]);
    }
}
