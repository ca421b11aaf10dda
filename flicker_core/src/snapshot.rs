// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One reconstructed point-in-time capture.

use alloc::vec::Vec;

use crate::node::{Node, NodeIdx};

/// An immutable, reconstructed snapshot of one capture entry.
///
/// Nodes live in a compact arena laid out in breadth-first order from the
/// top-level roots, so [`flatten`](Self::flatten) is just the arena. A built
/// snapshot is never mutated and can be shared across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    timestamp: i64,
    nodes: Vec<Node>,
    roots: Vec<NodeIdx>,
}

impl Snapshot {
    pub(crate) fn from_parts(timestamp: i64, nodes: Vec<Node>, roots: Vec<NodeIdx>) -> Self {
        Self {
            timestamp,
            nodes,
            roots,
        }
    }

    /// Capture timestamp of this entry.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Every node reachable from the roots, breadth-first.
    #[inline]
    #[must_use]
    pub fn flatten(&self) -> &[Node] {
        &self.nodes
    }

    /// Top-level roots in capture order.
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeIdx] {
        &self.roots
    }

    /// Number of nodes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the snapshot has no nodes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` did not come from this snapshot.
    #[inline]
    #[must_use]
    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.slot()]
    }

    /// Returns the node at `idx`, or `None` if it is out of range.
    #[inline]
    #[must_use]
    pub fn get(&self, idx: NodeIdx) -> Option<&Node> {
        self.nodes.get(idx.slot())
    }

    /// Parent of `idx`, or `None` for a top-level root.
    #[inline]
    #[must_use]
    pub fn parent(&self, idx: NodeIdx) -> Option<NodeIdx> {
        self.node(idx).parent
    }

    /// Children of `idx` in capture order.
    #[inline]
    #[must_use]
    pub fn children(&self, idx: NodeIdx) -> &[NodeIdx] {
        &self.node(idx).children
    }

    /// Handles of every node in flatten order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        (0..self.nodes.len()).map(NodeIdx::from_slot)
    }

    /// First node, in flatten order, whose name contains `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeIdx> {
        self.matching(name).next()
    }

    /// Every node whose name contains `name`, in flatten order.
    pub fn matching<'a>(&'a self, name: &'a str) -> impl Iterator<Item = NodeIdx> + 'a {
        self.indices()
            .filter(move |&idx| self.node(idx).name().contains(name))
    }

    /// Every node with a visible verdict, in flatten order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.indices().filter(|&idx| self.is_node_visible(idx))
    }
}
