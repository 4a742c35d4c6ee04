// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::ops::{BitAnd, BitOr};

use fuse_fixed::{Fix, Fix2};

use super::aabb::Aabb;

/// Cohen–Sutherland region code of a point relative to a box.
///
/// Bits: `LEFT = 1`, `RIGHT = 2`, `BOTTOM = 4`, `TOP = 8`; `INSIDE` is zero.
/// Comparisons are strict, so points on an edge are inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Outcode(u8);

impl Outcode {
    /// Inside the box (or on its boundary).
    pub const INSIDE: Self = Self(0);
    /// `x < min.x`.
    pub const LEFT: Self = Self(1);
    /// `x > max.x`.
    pub const RIGHT: Self = Self(2);
    /// `y < min.y`.
    pub const BOTTOM: Self = Self(4);
    /// `y > max.y`.
    pub const TOP: Self = Self(8);

    /// Classifies `p` against `aabb`.
    pub fn of(p: Fix2, aabb: &Aabb) -> Self {
        let min = aabb.min();
        let max = aabb.max();
        let mut code = Self::INSIDE;
        if p.x < min.x {
            code = code | Self::LEFT;
        } else if p.x > max.x {
            code = code | Self::RIGHT;
        }
        if p.y < min.y {
            code = code | Self::BOTTOM;
        } else if p.y > max.y {
            code = code | Self::TOP;
        }
        code
    }

    /// Raw bit pattern.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// `true` when no region bit is set.
    pub const fn is_inside(self) -> bool {
        self.0 == 0
    }

    /// `true` when every bit of `flag` is set in `self`.
    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }
}

impl BitOr for Outcode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for Outcode {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

const MAX_CLIP_MOVES: u32 = 4;

/// Clips the segment `p0 → p1` to `aabb` in place (Cohen–Sutherland).
///
/// Returns `true` if any part of the segment lies inside or on the box; the
/// endpoints then hold the clipped segment. On `false` the endpoints hold an
/// unspecified partially clipped segment and must not be used.
///
/// Intersections are computed from the segment's original endpoints with a
/// single rounding each, and a slope term is only evaluated when the
/// matching direction component is non-zero, so horizontal and vertical
/// segments never divide by zero.
pub fn clip_line_to_box(aabb: &Aabb, p0: &mut Fix2, p1: &mut Fix2) -> bool {
    if aabb.is_empty() {
        return false;
    }
    let origin = *p0;
    let delta = *p1 - *p0;
    let min = aabb.min();
    let max = aabb.max();

    // x on the line at height `y`.
    let x_at = |y: Fix| -> Fix {
        if delta.y.is_zero() {
            origin.x
        } else {
            delta
                .x
                .mul_div(y - origin.y, delta.y)
                .map_or(origin.x, |dx| origin.x + dx)
        }
    };
    // y on the line at abscissa `x`.
    let y_at = |x: Fix| -> Fix {
        if delta.x.is_zero() {
            origin.y
        } else {
            delta
                .y
                .mul_div(x - origin.x, delta.x)
                .map_or(origin.y, |dy| origin.y + dy)
        }
    };

    let mut code0 = Outcode::of(*p0, aabb);
    let mut code1 = Outcode::of(*p1, aabb);
    let mut moves = 0;
    loop {
        if (code0 | code1).is_inside() {
            return true;
        }
        if !(code0 & code1).is_inside() {
            return false;
        }
        // Exact arithmetic settles in at most two moves per endpoint. Past
        // that, rounding is bouncing a grazing point between two edges.
        if moves == MAX_CLIP_MOVES {
            return false;
        }
        moves += 1;

        let out = if code0.is_inside() { code1 } else { code0 };
        let moved = if out.contains(Outcode::TOP) {
            Fix2::new(x_at(max.y), max.y)
        } else if out.contains(Outcode::BOTTOM) {
            Fix2::new(x_at(min.y), min.y)
        } else if out.contains(Outcode::RIGHT) {
            Fix2::new(max.x, y_at(max.x))
        } else {
            Fix2::new(min.x, y_at(min.x))
        };

        if out == code0 {
            *p0 = moved;
            code0 = Outcode::of(moved, aabb);
        } else {
            *p1 = moved;
            code1 = Outcode::of(moved, aabb);
        }
    }
}

/// Non-mutating form of [`clip_line_to_box`].
pub fn segment_hits_box(aabb: &Aabb, p0: Fix2, p1: Fix2) -> bool {
    let (mut a, mut b) = (p0, p1);
    clip_line_to_box(aabb, &mut a, &mut b)
}
