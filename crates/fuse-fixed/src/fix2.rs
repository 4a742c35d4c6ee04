// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::error::FixError;
use crate::fix::Fix;
use crate::q32;

/// 2D point or vector with [`Fix`] components.
///
/// Every operation is composed of integer-domain `Fix` arithmetic, so the
/// same inputs produce the same bits on every platform.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fix2 {
    /// Horizontal component.
    pub x: Fix,
    /// Vertical component.
    pub y: Fix,
}

impl Fix2 {
    /// `(0, 0)`.
    pub const ZERO: Self = Self::new(Fix::ZERO, Fix::ZERO);
    /// `(1, 1)`.
    pub const ONE: Self = Self::new(Fix::ONE, Fix::ONE);
    /// `(1, 0)`.
    pub const UNIT_X: Self = Self::new(Fix::ONE, Fix::ZERO);
    /// `(0, 1)`.
    pub const UNIT_Y: Self = Self::new(Fix::ZERO, Fix::ONE);
    /// Both components at [`Fix::MAX`].
    pub const MAX: Self = Self::new(Fix::MAX, Fix::MAX);
    /// Both components at [`Fix::MIN`].
    pub const MIN: Self = Self::new(Fix::MIN, Fix::MIN);

    /// Creates a vector from components.
    pub const fn new(x: Fix, y: Fix) -> Self {
        Self { x, y }
    }

    /// Creates a vector from integer components.
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fix::from(x), Fix::from(y))
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> Fix {
        self.x * other.x + self.y * other.y
    }

    /// Perp-dot product (`self.x * other.y - self.y * other.x`).
    pub fn cross(self, other: Self) -> Fix {
        self.x * other.y - self.y * other.x
    }

    /// Squared length (saturating for very long vectors).
    pub fn length_squared(self) -> Fix {
        self.dot(self)
    }

    /// Euclidean length.
    ///
    /// Computed on the raw integers with a 128-bit accumulator, so it does not
    /// saturate where [`Self::length_squared`] would.
    pub fn length(self) -> Fix {
        Fix::from_raw(q32::hypot(self.x.raw(), self.y.raw()))
    }

    /// Distance between two points.
    pub fn distance(self, other: Self) -> Fix {
        (self - other).length()
    }

    /// Squared distance between two points.
    pub fn distance_squared(self, other: Self) -> Fix {
        (self - other).length_squared()
    }

    /// Returns the unit vector pointing in the same direction.
    ///
    /// Fails with [`FixError::DivideByZero`] for the zero vector.
    pub fn normalize(self) -> Result<Self, FixError> {
        let len = self.length();
        Ok(Self::new(self.x.try_div(len)?, self.y.try_div(len)?))
    }

    /// Componentwise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Componentwise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Componentwise clamp into `[lo, hi]`; requires `lo <= hi` on both axes.
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Self::new(self.x.clamp(lo.x, hi.x), self.y.clamp(lo.y, hi.y))
    }

    /// Componentwise absolute value.
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }

    /// Returns `[x, y]`.
    pub const fn to_array(self) -> [Fix; 2] {
        [self.x, self.y]
    }
}

impl Add for Fix2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Fix2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Fix2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<Fix> for Fix2 {
    type Output = Self;

    fn mul(self, rhs: Fix) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl AddAssign for Fix2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fix2 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
