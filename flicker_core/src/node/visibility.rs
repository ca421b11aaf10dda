// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-query visibility derivation.
//!
//! Verdicts are computed on demand from a node's own fields and its ancestor
//! chain; nothing is written back into the snapshot.

use core::fmt;

use super::id::NodeIdx;
use super::record::RecordData;
use crate::snapshot::Snapshot;

/// Why a node draws nothing by itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InvisibleReason {
    /// Neither a buffer nor a color fill.
    NoContent,
    /// The node is individually hidden.
    Hidden,
    /// Paint alpha is zero.
    Transparent,
    /// The visible region has no area.
    EmptyRegion,
    /// The window manager reports the window as not visible.
    WindowNotVisible,
}

impl InvisibleReason {
    /// Short label used in query reasons.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoContent => "has no content",
            Self::Hidden => "is hidden",
            Self::Transparent => "is fully transparent",
            Self::EmptyRegion => "has an empty visible region",
            Self::WindowNotVisible => "is not visible",
        }
    }
}

impl fmt::Display for InvisibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility verdict for a single node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// The node is on screen.
    Visible,
    /// The node would be visible, but `ancestor` is individually hidden.
    HiddenByParent {
        /// Nearest hidden ancestor.
        ancestor: NodeIdx,
    },
    /// The node itself draws nothing.
    Invisible(InvisibleReason),
}

impl Visibility {
    /// Returns `true` for [`Visibility::Visible`].
    #[inline]
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

impl Snapshot {
    /// Derives the visibility verdict of `idx`.
    ///
    /// Layers need content, no hidden flag, alpha above zero (NaN counts as
    /// transparent), and a non-empty
    /// visible region; an otherwise visible layer under a hidden ancestor is
    /// reported as [`Visibility::HiddenByParent`]. Windows follow their own
    /// `visible` flag only.
    #[must_use]
    pub fn visibility(&self, idx: NodeIdx) -> Visibility {
        match &self.node(idx).record.data {
            RecordData::Window(w) => {
                if w.visible {
                    Visibility::Visible
                } else {
                    Visibility::Invisible(InvisibleReason::WindowNotVisible)
                }
            }
            RecordData::Layer(layer) => {
                if layer.hidden {
                    return Visibility::Invisible(InvisibleReason::Hidden);
                }
                if !layer.has_content() {
                    return Visibility::Invisible(InvisibleReason::NoContent);
                }
                if layer.alpha.is_nan() || layer.alpha <= 0.0 {
                    return Visibility::Invisible(InvisibleReason::Transparent);
                }
                if layer.visible_region.is_empty() {
                    return Visibility::Invisible(InvisibleReason::EmptyRegion);
                }
                match self.hidden_ancestor(idx) {
                    Some(ancestor) => Visibility::HiddenByParent { ancestor },
                    None => Visibility::Visible,
                }
            }
        }
    }

    /// Nearest ancestor of `idx` whose layer is individually hidden.
    #[must_use]
    pub fn hidden_ancestor(&self, idx: NodeIdx) -> Option<NodeIdx> {
        let mut cur = self.node(idx).parent;
        while let Some(p) = cur {
            let node = self.node(p);
            if node.record.as_layer().is_some_and(|l| l.hidden) {
                return Some(p);
            }
            cur = node.parent;
        }
        None
    }

    /// Returns `true` if `idx` is visible.
    #[inline]
    #[must_use]
    pub fn is_node_visible(&self, idx: NodeIdx) -> bool {
        self.visibility(idx).is_visible()
    }
}
