// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use fuse_fixed::{Fix, Fix2};

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - For any non-empty box, `min` components are less than or equal to `max`
///   components.
/// - [`Aabb::EMPTY`] (min at `Fix::MAX`, max at `Fix::MIN`) marks unused slots;
///   it is the identity of [`Aabb::conjugate`] and overlaps nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Aabb {
    min: Fix2,
    max: Fix2,
}

impl Aabb {
    /// The empty sentinel box.
    pub const EMPTY: Self = Self {
        min: Fix2::MAX,
        max: Fix2::MIN,
    };

    /// Constructs an AABB from its minimum and maximum corners.
    ///
    /// Callers must pass `min <= max` componentwise; this is checked in debug
    /// builds only.
    #[must_use]
    pub fn new(min: Fix2, max: Fix2) -> Self {
        debug_assert!(min.x <= max.x && min.y <= max.y, "invalid AABB: min > max");
        Self { min, max }
    }

    /// Convenience constructor from integer corners.
    #[must_use]
    pub fn from_ints(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self::new(Fix2::from_ints(min_x, min_y), Fix2::from_ints(max_x, max_y))
    }

    /// Builds an AABB centered at `center` with non-negative `half_extents`.
    #[must_use]
    pub fn from_center_half_extents(center: Fix2, half_extents: Fix2) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Builds the minimal AABB that contains all `points`.
    ///
    /// Returns [`Aabb::EMPTY`] for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Fix2]) -> Self {
        points.iter().fold(Self::EMPTY, |acc, p| Self {
            min: acc.min.min(*p),
            max: acc.max.max(*p),
        })
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min(&self) -> Fix2 {
        self.min
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max(&self) -> Fix2 {
        self.max
    }

    /// `true` when the box contains no points (the sentinel or any inverted box).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Extent along x.
    pub fn width(&self) -> Fix {
        self.max.x - self.min.x
    }

    /// Extent along y.
    pub fn height(&self) -> Fix {
        self.max.y - self.min.y
    }

    /// Center point.
    pub fn center(&self) -> Fix2 {
        Fix2::new(
            self.min.x + (self.max.x - self.min.x) * Fix::HALF,
            self.min.y + (self.max.y - self.min.y) * Fix::HALF,
        )
    }

    /// Half of the extent on each axis.
    pub fn half_extents(&self) -> Fix2 {
        Fix2::new(self.width() * Fix::HALF, self.height() * Fix::HALF)
    }

    /// Area of the box; zero for degenerate and empty boxes.
    pub fn area(&self) -> Fix {
        if self.is_empty() {
            return Fix::ZERO;
        }
        self.width() * self.height()
    }

    /// Returns the union of two boxes ("conjugate").
    ///
    /// Commutative and associative; `EMPTY` is the identity.
    #[must_use]
    pub fn conjugate(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns `true` if this box overlaps another (inclusive on faces).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        // Inclusive so touching tiles count as neighbours.
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }

    /// Returns `true` if `other` lies entirely inside this box.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    /// Returns `true` if `p` lies inside or on the boundary.
    #[must_use]
    pub fn contains_point(&self, p: Fix2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Clamps `p` into the box (closest point on or inside the box).
    #[must_use]
    pub fn clamp_point(&self, p: Fix2) -> Fix2 {
        p.clamp(self.min, self.max)
    }

    /// Grows the box by `margin` in all directions.
    #[must_use]
    pub fn inflate(&self, margin: Fix) -> Self {
        let delta = Fix2::new(margin, margin);
        Self {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Area added when `other` is absorbed into this box.
    pub(crate) fn enlargement(&self, other: &Self) -> Fix {
        self.conjugate(other).area() - self.area()
    }

    /// Largest per-axis growth when `other` is absorbed into this box.
    pub(crate) fn size_growth(&self, other: &Self) -> Fix {
        if self.is_empty() {
            return other.width().max(other.height());
        }
        let joined = self.conjugate(other);
        (joined.width() - self.width()).max(joined.height() - self.height())
    }
}
