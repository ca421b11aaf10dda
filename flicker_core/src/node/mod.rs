// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Snapshot node data model.
//!
//! A *node* is one reconstructed element of a snapshot hierarchy. Each node
//! has:
//!
//! - An arena handle ([`NodeIdx`]) valid for the snapshot that owns it.
//! - The capture [`Record`] it was built from (a layer or a window).
//! - Topology: an owning `children` list and a non-owning `parent` index used
//!   only for upward walks. Both are indices into the same arena, so the
//!   structure can never form a reference cycle.
//!
//! Visibility is not stored on the node; see
//! [`Snapshot::visibility`](crate::Snapshot::visibility).

mod id;
mod record;
mod visibility;

use alloc::vec::Vec;

pub use id::NodeIdx;
pub use record::{LayerRecord, Record, RecordData, WindowKind, WindowRecord, WindowRole};
pub use visibility::{InvisibleReason, Visibility};

/// A reconstructed node.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// The record this node was built from.
    pub record: Record,
    /// Parent node, or `None` for a top-level root.
    pub parent: Option<NodeIdx>,
    /// Children in capture order.
    pub children: Vec<NodeIdx>,
    /// Distance from the top-level roots (roots are depth `0`).
    pub depth: u32,
}

impl Node {
    /// Capture identity.
    #[inline]
    #[must_use]
    pub fn id(&self) -> i32 {
        self.record.id
    }

    /// Node name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Layer payload, if any.
    #[inline]
    #[must_use]
    pub fn layer(&self) -> Option<&LayerRecord> {
        self.record.as_layer()
    }

    /// Window payload, if any.
    #[inline]
    #[must_use]
    pub fn window(&self) -> Option<&WindowRecord> {
        self.record.as_window()
    }
}
