// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::FixError;
use crate::q32;

/// Deterministic fixed-point scalar with Q32.32 encoding stored in an `i64`.
///
/// The underlying integer stores the value scaled by `2^32`:
///
/// ```text
/// real_value = raw / 2^32
/// ```
///
/// # Determinism contract
///
/// - All arithmetic is performed in integer space with saturating overflow.
/// - Equality and ordering compare the raw integer.
/// - Float conversions decode the IEEE-754 bit pattern; no float arithmetic
///   ever feeds back into a `Fix`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Fix {
    raw: i64,
}

impl Fix {
    /// Number of fractional bits.
    pub const FRAC_BITS: u32 = q32::FRAC_BITS;

    /// The fixed-point zero value.
    pub const ZERO: Self = Self { raw: 0 };

    /// The fixed-point one value.
    pub const ONE: Self = Self { raw: q32::ONE_RAW };

    /// `-1.0`.
    pub const NEG_ONE: Self = Self { raw: -q32::ONE_RAW };

    /// `0.5`.
    pub const HALF: Self = Self {
        raw: q32::ONE_RAW >> 1,
    };

    /// `2.0`.
    pub const TWO: Self = Self {
        raw: q32::ONE_RAW << 1,
    };

    /// Largest representable value (saturation ceiling).
    pub const MAX: Self = Self { raw: i64::MAX };

    /// Smallest representable value (saturation floor).
    pub const MIN: Self = Self { raw: i64::MIN };

    /// One unit of least precision (`2^-32`).
    pub const EPSILON: Self = Self { raw: 1 };

    /// Constructs a value from a raw Q32.32 integer (exact, no scaling).
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self { raw }
    }

    /// Returns the underlying Q32.32 raw storage value.
    pub const fn raw(self) -> i64 {
        self.raw
    }

    /// Constructs from an integer, saturating outside `i32` range.
    pub fn from_int(value: i64) -> Self {
        Self::from_raw(q32::from_int(value))
    }

    /// Constructs from an `f32` (round-to-nearest-even, saturating, NaN → 0).
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(f64::from(value))
    }

    /// Constructs from an `f64` (round-to-nearest-even, saturating, NaN → 0).
    pub fn from_f64(value: f64) -> Self {
        Self::from_raw(q32::from_f64(value))
    }

    /// Constructs `num / den` exactly rounded.
    pub fn from_ratio(num: i64, den: i64) -> Result<Self, FixError> {
        Self::from_int(num).try_div(Self::from_int(den))
    }

    /// Lossy conversion to `f64` for diagnostics and rendering.
    pub fn to_f64(self) -> f64 {
        q32::to_f64(self.raw)
    }

    /// Lossy conversion to `f32` for diagnostics and rendering.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /// Integer part rounded toward negative infinity.
    pub fn to_int_floor(self) -> i32 {
        // An i64 shifted right by 32 always fits in an i32.
        i32::try_from(self.raw >> Self::FRAC_BITS).unwrap_or(if self.raw < 0 {
            i32::MIN
        } else {
            i32::MAX
        })
    }

    /// Divides by `rhs`.
    ///
    /// Uses bit-by-bit restoring division with one extra quotient bit that is
    /// rounded away; the result sign is the XOR of the operand signs.
    pub fn try_div(self, rhs: Self) -> Result<Self, FixError> {
        q32::div(self.raw, rhs.raw)
            .map(Self::from_raw)
            .ok_or(FixError::DivideByZero)
    }

    /// Computes `self * num / den` with a single rounding step.
    pub fn mul_div(self, num: Self, den: Self) -> Result<Self, FixError> {
        q32::mul_div(self.raw, num.raw, den.raw)
            .map(Self::from_raw)
            .ok_or(FixError::DivideByZero)
    }

    /// Square root, rounded to nearest. Negative inputs yield zero.
    pub fn sqrt(self) -> Self {
        Self::from_raw(q32::sqrt(self.raw))
    }

    /// Largest integer value not greater than `self`.
    pub fn floor(self) -> Self {
        Self::from_raw(self.raw & !q32::FRAC_MASK)
    }

    /// Smallest integer value not less than `self` (saturating).
    pub fn ceil(self) -> Self {
        if self.raw & q32::FRAC_MASK == 0 {
            self
        } else {
            self.floor() + Self::ONE
        }
    }

    /// Rounds to the nearest integer, ties to even.
    pub fn round(self) -> Self {
        let frac = self.raw & q32::FRAC_MASK;
        let floor = self.floor();
        let half = Self::HALF.raw;
        if frac < half {
            floor
        } else if frac > half {
            floor + Self::ONE
        } else if (floor.raw >> Self::FRAC_BITS) & 1 == 0 {
            floor
        } else {
            floor + Self::ONE
        }
    }

    /// Fractional part (`self - floor(self)`), always non-negative.
    pub fn frac(self) -> Self {
        Self::from_raw(self.raw & q32::FRAC_MASK)
    }

    /// Absolute value; `MIN` saturates to `MAX`.
    pub fn abs(self) -> Self {
        Self::from_raw(self.raw.saturating_abs())
    }

    /// `-1`, `0` or `1`.
    pub fn signum(self) -> Self {
        match self.raw.signum() {
            0 => Self::ZERO,
            s if s > 0 => Self::ONE,
            _ => Self::NEG_ONE,
        }
    }

    /// `true` for the zero value.
    pub const fn is_zero(self) -> bool {
        self.raw == 0
    }

    /// `true` for values strictly below zero.
    pub const fn is_negative(self) -> bool {
        self.raw < 0
    }

    /// `true` for values strictly above zero.
    pub const fn is_positive(self) -> bool {
        self.raw > 0
    }
}

impl From<i32> for Fix {
    fn from(value: i32) -> Self {
        Self::from_raw(i64::from(value) << Self::FRAC_BITS)
    }
}

impl fmt::Display for Fix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl Add for Fix {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_raw(self.raw.saturating_add(rhs.raw))
    }
}

impl Sub for Fix {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(self.raw.saturating_sub(rhs.raw))
    }
}

impl Mul for Fix {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_raw(q32::mul(self.raw, rhs.raw))
    }
}

impl Neg for Fix {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_raw(self.raw.saturating_neg())
    }
}

impl AddAssign for Fix {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fix {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fix {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_is_half_to_even() {
        let two_and_half = Fix::from_raw(Fix::TWO.raw() + Fix::HALF.raw());
        assert_eq!(two_and_half.round(), Fix::from(2));
        let three_and_half = Fix::from(3) + Fix::HALF;
        assert_eq!(three_and_half.round(), Fix::from(4));
        assert_eq!((-Fix::HALF).round(), Fix::ZERO);
        assert_eq!((Fix::from(-1) - Fix::HALF).round(), Fix::from(-2));
    }

    #[test]
    fn floor_and_ceil_on_negatives() {
        let v = Fix::from(-3) + Fix::HALF; // -2.5
        assert_eq!(v.floor(), Fix::from(-3));
        assert_eq!(v.ceil(), Fix::from(-2));
        assert_eq!(Fix::MAX.ceil(), Fix::MAX);
    }
}
