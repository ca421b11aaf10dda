// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned integer rectangles and unions of them.
//!
//! Coordinates match the capture's pixel space. A [`RectRegion`] is half-open:
//! the left and top edges are inside, the right and bottom edges are not.
//! Inverted rectangles (`right < left` or `bottom < top`) are never
//! normalized; they simply have zero area.

use alloc::vec::Vec;
use core::fmt;

use kurbo::Rect;

/// An axis-aligned rectangle in integer capture coordinates.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RectRegion {
    /// Left edge (inclusive).
    pub left: i32,
    /// Top edge (inclusive).
    pub top: i32,
    /// Right edge (exclusive).
    pub right: i32,
    /// Bottom edge (exclusive).
    pub bottom: i32,
}

impl RectRegion {
    /// The zero rectangle.
    pub const EMPTY: Self = Self::new(0, 0, 0, 0);

    /// Creates a rectangle from its edges.
    #[inline]
    #[must_use]
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates a rectangle anchored at the origin.
    #[inline]
    #[must_use]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Smallest integer rectangle that encloses a float rectangle.
    #[must_use]
    pub fn from_rect_outer(rect: Rect) -> Self {
        let r = rect.abs().expand();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "capture coordinates fit in i32; `as` saturates out-of-range values"
        )]
        let edges = (r.x0 as i32, r.y0 as i32, r.x1 as i32, r.y1 as i32);
        Self::new(edges.0, edges.1, edges.2, edges.3)
    }

    /// Width, or zero when the rectangle is inverted.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        if self.right > self.left {
            self.right.saturating_sub(self.left)
        } else {
            0
        }
    }

    /// Height, or zero when the rectangle is inverted.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        if self.bottom > self.top {
            self.bottom.saturating_sub(self.top)
        } else {
            0
        }
    }

    /// Returns `true` if the rectangle covers no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Returns `true` if the pixel at `(x, y)` lies inside.
    #[inline]
    #[must_use]
    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    ///
    /// An empty `other` is contained by every rectangle.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        if other.is_empty() {
            return true;
        }
        !self.is_empty()
            && other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Smallest rectangle covering both `self` and `other`.
    ///
    /// Empty rectangles do not contribute.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Self::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Overlap of `self` and `other`, or [`EMPTY`](Self::EMPTY).
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        let r = Self::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if r.is_empty() { Self::EMPTY } else { r }
    }
}

impl fmt::Debug for RectRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RectRegion{self}")
    }
}

impl fmt::Display for RectRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) - ({}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

impl From<RectRegion> for Rect {
    fn from(r: RectRegion) -> Self {
        Self::new(
            f64::from(r.left),
            f64::from(r.top),
            f64::from(r.right),
            f64::from(r.bottom),
        )
    }
}

/// A union of rectangles.
///
/// Only pointwise coverage and the enclosing bounds are ever needed, so the
/// rectangles may overlap and are kept in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<RectRegion>,
}

impl Region {
    /// An empty region.
    #[must_use]
    pub const fn new() -> Self {
        Self { rects: Vec::new() }
    }

    /// A region made of a single rectangle.
    #[must_use]
    pub fn from_rect(rect: RectRegion) -> Self {
        let mut region = Self::new();
        region.push(rect);
        region
    }

    /// A region accumulated from several rectangles.
    #[must_use]
    pub fn from_rects(rects: impl IntoIterator<Item = RectRegion>) -> Self {
        let mut region = Self::new();
        for r in rects {
            region.push(r);
        }
        region
    }

    /// Adds a rectangle; empty rectangles are dropped.
    pub fn push(&mut self, rect: RectRegion) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    /// The rectangles making up this region.
    #[must_use]
    pub fn rects(&self) -> &[RectRegion] {
        &self.rects
    }

    /// Returns `true` if the region covers no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Minimal enclosing rectangle, or [`RectRegion::EMPTY`].
    #[must_use]
    pub fn bounds(&self) -> RectRegion {
        self.rects
            .iter()
            .fold(RectRegion::EMPTY, |acc, r| acc.union(r))
    }

    /// Returns `true` if any rectangle contains the pixel at `(x, y)`.
    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.rect_containing(x, y).is_some()
    }

    /// First rectangle containing the pixel at `(x, y)`.
    #[must_use]
    pub fn rect_containing(&self, x: i32, y: i32) -> Option<&RectRegion> {
        self.rects.iter().find(|r| r.contains_point(x, y))
    }
}

impl From<RectRegion> for Region {
    fn from(rect: RectRegion) -> Self {
        Self::from_rect(rect)
    }
}
