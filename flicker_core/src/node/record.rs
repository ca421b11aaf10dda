// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattened capture records.
//!
//! A [`Record`] is one element of a per-timestamp capture as produced by the
//! container decoder: a node identity, a declared parent identity, a name,
//! and a kind-specific payload.

use alloc::string::String;

use kurbo::Rect;

use crate::region::{RectRegion, Region};

/// One flattened node record of a capture entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Capture identity, unique within one entry.
    pub id: i32,
    /// Identity of the logical parent.
    ///
    /// Top-level nodes point at a sentinel id that never appears as a record
    /// (`-1` in current captures, `0` in legacy ones).
    pub parent_id: i32,
    /// Human-readable name, matched by substring in queries.
    pub name: String,
    /// Kind-specific payload.
    pub data: RecordData,
}

impl Record {
    /// Creates a layer record.
    #[must_use]
    pub fn layer(id: i32, parent_id: i32, name: impl Into<String>, layer: LayerRecord) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            data: RecordData::Layer(layer),
        }
    }

    /// Creates a window record.
    #[must_use]
    pub fn window(
        id: i32,
        parent_id: i32,
        name: impl Into<String>,
        window: WindowRecord,
    ) -> Self {
        Self {
            id,
            parent_id,
            name: name.into(),
            data: RecordData::Window(window),
        }
    }

    /// Returns the layer payload, if this is a layer record.
    #[must_use]
    pub fn as_layer(&self) -> Option<&LayerRecord> {
        match &self.data {
            RecordData::Layer(l) => Some(l),
            RecordData::Window(_) => None,
        }
    }

    /// Returns the window payload, if this is a window record.
    #[must_use]
    pub fn as_window(&self) -> Option<&WindowRecord> {
        match &self.data {
            RecordData::Window(w) => Some(w),
            RecordData::Layer(_) => None,
        }
    }
}

/// Kind-specific record payload.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordData {
    /// A compositor layer.
    Layer(LayerRecord),
    /// A window-manager container or window.
    Window(WindowRecord),
}

/// Compositor layer state captured for one frame.
///
/// The default is a buffered, fully opaque, unhidden layer that has no
/// visible region yet.
///
/// Equality compares `alpha` by bit pattern, so a record decoded twice from
/// the same bytes is always equal to itself, NaN alpha included.
#[derive(Clone, Debug)]
pub struct LayerRecord {
    /// Whether the layer is individually hidden.
    pub hidden: bool,
    /// Whether the layer is a solid-fill color layer.
    pub color_fill: bool,
    /// Whether the layer has a drawable buffer attached.
    pub has_buffer: bool,
    /// Paint alpha in `0.0..=1.0`.
    pub alpha: f32,
    /// Z-order relative to siblings.
    pub z: i32,
    /// Screen-space region the compositor considers visible.
    pub visible_region: Region,
    /// Layer bounds in parent space.
    pub bounds: Rect,
}

impl Default for LayerRecord {
    fn default() -> Self {
        Self {
            hidden: false,
            color_fill: false,
            has_buffer: true,
            alpha: 1.0,
            z: 0,
            visible_region: Region::new(),
            bounds: Rect::ZERO,
        }
    }
}

impl PartialEq for LayerRecord {
    fn eq(&self, other: &Self) -> bool {
        self.hidden == other.hidden
            && self.color_fill == other.color_fill
            && self.has_buffer == other.has_buffer
            && self.alpha.to_bits() == other.alpha.to_bits()
            && self.z == other.z
            && self.visible_region == other.visible_region
            && self.bounds == other.bounds
    }
}

impl LayerRecord {
    /// A default layer whose visible region is `rect`.
    #[must_use]
    pub fn with_region(rect: RectRegion) -> Self {
        Self {
            visible_region: Region::from_rect(rect),
            bounds: rect.into(),
            ..Self::default()
        }
    }

    /// Returns `true` if the layer draws anything by itself.
    #[inline]
    #[must_use]
    pub const fn has_content(&self) -> bool {
        self.has_buffer || self.color_fill
    }
}

/// Position of a window-manager node in the container hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowRole {
    /// A display area or other grouping container.
    #[default]
    Container,
    /// A task stack.
    Task,
    /// An activity record inside a task.
    Activity,
    /// A window token grouping windows of one client.
    Token,
    /// An actual window.
    Window,
}

/// Which stacking band a window belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WindowKind {
    /// Windows stacked above applications (status bar, navigation bar).
    AboveApp,
    /// Application windows.
    App,
    /// Windows stacked below applications (wallpaper).
    BelowApp,
    /// Input method windows.
    Ime,
    /// Anything else.
    #[default]
    Other,
}

/// Window-manager state captured for one frame.
///
/// Window-manager dumps already reflect effective visibility, so the
/// `visible` flag is authoritative and is never combined with ancestors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowRecord {
    /// Container role.
    pub role: WindowRole,
    /// Stacking band.
    pub kind: WindowKind,
    /// Effective visibility reported by the window manager.
    pub visible: bool,
    /// Window frame in screen space.
    pub frame: RectRegion,
}

impl WindowRecord {
    /// A window of the given band.
    #[must_use]
    pub fn window(kind: WindowKind, visible: bool, frame: RectRegion) -> Self {
        Self {
            role: WindowRole::Window,
            kind,
            visible,
            frame,
        }
    }

    /// A non-window container of the given role.
    #[must_use]
    pub fn container(role: WindowRole, visible: bool) -> Self {
        Self {
            role,
            visible,
            ..Self::default()
        }
    }
}
