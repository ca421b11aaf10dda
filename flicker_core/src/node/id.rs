// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node identity types.

use core::fmt;

/// Index of a node inside its owning [`Snapshot`](crate::Snapshot).
///
/// Handles are only meaningful for the snapshot that produced them. Snapshots
/// are immutable, so a handle never goes stale while its snapshot is alive.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIdx(pub(crate) u32);

impl NodeIdx {
    /// Returns the raw arena index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_slot(slot: usize) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "snapshot arenas are bounded by the u32 record count of one entry"
        )]
        let idx = slot as u32;
        Self(idx)
    }
}

impl fmt::Debug for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeIdx({})", self.0)
    }
}
