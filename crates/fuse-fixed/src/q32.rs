// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Raw-integer kernels for the Q32.32 encoding used by [`crate::Fix`].
//!
//! The representation is an `i64` storing an integer scaled by `2^32`:
//! `real_value = raw / 2^32`. Every routine here works purely on integers so
//! that results are bit-identical on every platform.

/// Number of fractional bits in the Q32.32 fixed-point encoding.
pub(crate) const FRAC_BITS: u32 = 32;

/// The raw integer value corresponding to `1.0` in Q32.32.
pub(crate) const ONE_RAW: i64 = 1_i64 << FRAC_BITS;

/// Mask selecting the fractional bits of a raw value.
pub(crate) const FRAC_MASK: i64 = ONE_RAW - 1;

fn round_shift_right_u64(value: u64, shift: u32) -> u64 {
    if shift == 0 {
        return value;
    }
    if shift >= 64 {
        return 0;
    }

    let q = value >> shift;
    let mask = (1_u64 << shift) - 1;
    let r = value & mask;
    let half = 1_u64 << (shift - 1);

    if r > half || (r == half && (q & 1) == 1) {
        q + 1
    } else {
        q
    }
}

pub(crate) fn saturate_i128_to_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value.is_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Applies a sign to an unsigned magnitude, saturating to the `i64` range.
fn signed_magnitude(magnitude: u128, negative: bool) -> i64 {
    let m = i128::try_from(magnitude).unwrap_or(i128::MAX);
    saturate_i128_to_i64(if negative { -m } else { m })
}

/// Converts an integer to raw Q32.32, saturating outside the 32 integer bits.
pub(crate) fn from_int(value: i64) -> i64 {
    if value > i64::from(i32::MAX) {
        i64::MAX
    } else if value < i64::from(i32::MIN) {
        i64::MIN
    } else {
        value << FRAC_BITS
    }
}

/// Deterministically converts an `f64` to a Q32.32 raw `i64`.
///
/// Semantics:
/// - `NaN` maps to `0` (fixed-point has no NaN representation).
/// - `+∞`/`-∞` and out-of-range finite values saturate to `i64::MAX`/`i64::MIN`.
/// - Values are rounded to nearest with ties-to-even at the Q32.32 boundary.
///
/// The conversion decodes the IEEE-754 bit pattern directly; no float
/// arithmetic takes part.
pub(crate) fn from_f64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    if value.is_infinite() {
        return if value.is_sign_positive() {
            i64::MAX
        } else {
            i64::MIN
        };
    }

    let bits = value.to_bits();
    let sign = (bits >> 63) != 0;
    // Masking yields a value in 0..=2047.
    #[allow(clippy::cast_possible_truncation)]
    let exp_u16 = ((bits >> 52) & 0x7ff) as u16;
    let exp = i32::from(exp_u16);
    let mant = bits & 0x000f_ffff_ffff_ffff;

    if exp == 0 && mant == 0 {
        return 0;
    }

    let mantissa: u64 = if exp == 0 {
        // subnormal: exponent is fixed at -1022, no implicit 1.
        mant
    } else {
        (1_u64 << 52) | mant
    };

    // value = mantissa * 2^(unbiased - 52); raw = value * 2^FRAC_BITS.
    let unbiased = if exp == 0 { -1022 } else { exp - 1023 };
    #[allow(clippy::cast_possible_wrap)]
    let frac_i32 = FRAC_BITS as i32;
    let shift = unbiased + (frac_i32 - 52);

    let abs_raw: i128 = if shift >= 0 {
        let shift_u = shift.unsigned_abs();
        // mantissa has at most 53 bits; anything past 73 cannot fit an i128.
        if shift_u > 73 {
            i128::MAX
        } else {
            i128::from(mantissa) << shift_u
        }
    } else {
        i128::from(round_shift_right_u64(mantissa, shift.unsigned_abs()))
    };

    saturate_i128_to_i64(if sign { -abs_raw } else { abs_raw })
}

/// Converts a raw Q32.32 value to `f64` for diagnostics and interop.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn to_f64(raw: i64) -> f64 {
    // Scaling by a power of two is exact; only the integer conversion rounds.
    (raw as f64) * (1.0 / 4_294_967_296.0)
}

/// Widening multiply: `floor(a * b / 2^32)`, saturating.
pub(crate) fn mul(a: i64, b: i64) -> i64 {
    let prod = i128::from(a) * i128::from(b);
    saturate_i128_to_i64(prod >> FRAC_BITS)
}

/// Bit-by-bit restoring division of unsigned 128-bit integers.
///
/// `den` must be non-zero and no wider than 64 bits so the partial remainder
/// never overflows.
fn restoring_div(num: u128, den: u128) -> u128 {
    debug_assert!(den != 0 && den <= u128::from(u64::MAX) + 1);
    let mut quotient = 0_u128;
    let mut rem = 0_u128;
    let top = 128 - num.leading_zeros();
    for bit in (0..top).rev() {
        rem = (rem << 1) | ((num >> bit) & 1);
        if rem >= den {
            rem -= den;
            quotient |= 1_u128 << bit;
        }
    }
    quotient
}

/// Divides `num` by `den`, computing one extra quotient bit and rounding it
/// away. Returns the rounded magnitude.
fn rounded_quotient(num: u128, den: u128) -> u128 {
    let doubled = restoring_div(num << 1, den);
    (doubled + 1) >> 1
}

/// Raw Q32.32 division. Returns `None` when `b == 0`.
pub(crate) fn div(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let num = u128::from(a.unsigned_abs()) << FRAC_BITS;
    let den = u128::from(b.unsigned_abs());
    let magnitude = rounded_quotient(num, den);
    Some(signed_magnitude(magnitude, (a < 0) ^ (b < 0)))
}

/// Raw `a * b / c` with a single rounding step. Returns `None` when `c == 0`.
pub(crate) fn mul_div(a: i64, b: i64, c: i64) -> Option<i64> {
    if c == 0 {
        return None;
    }
    // |a| * |b| <= 2^126, so the doubled numerator still fits in a u128.
    let num = u128::from(a.unsigned_abs()) * u128::from(b.unsigned_abs());
    let den = u128::from(c.unsigned_abs());
    let magnitude = rounded_quotient(num, den);
    Some(signed_magnitude(magnitude, (a < 0) ^ (b < 0) ^ (c < 0)))
}

/// Digit-by-digit integer square root, rounded to nearest.
fn isqrt_round(n: u128) -> u128 {
    let mut op = n;
    let mut res = 0_u128;
    let mut one = 1_u128 << 126;
    while one > op {
        one >>= 2;
    }
    while one != 0 {
        if op >= res + one {
            op -= res + one;
            res = (res >> 1) + one;
        } else {
            res >>= 1;
        }
        one >>= 2;
    }
    if op > res {
        res + 1
    } else {
        res
    }
}

/// Raw Q32.32 square root. Non-positive inputs yield zero.
pub(crate) fn sqrt(raw: i64) -> i64 {
    if raw <= 0 {
        return 0;
    }
    let scaled = u128::from(raw.unsigned_abs()) << FRAC_BITS;
    signed_magnitude(isqrt_round(scaled), false)
}

/// `sqrt(x^2 + y^2)` on raw values without intermediate saturation.
pub(crate) fn hypot(x: i64, y: i64) -> i64 {
    let xx = u128::from(x.unsigned_abs()).pow(2);
    let yy = u128::from(y.unsigned_abs()).pow(2);
    signed_magnitude(isqrt_round(xx + yy), false)
}
