use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Amount of a flow held, moved, consumed or produced.
pub type FlowAmount = Fixed64;

/// Timestamps are integer ticks.
pub type Ticks = i64;

/// Convert an f64 to Fixed64. Use only at the boundary (config, tests).
///
/// Out-of-range values saturate and NaN maps to zero. Loaders use
/// [`checked_f64_to_fixed64`] to reject non-finite input instead.
#[inline]
pub fn f64_to_fixed64(v: f64) -> Fixed64 {
    if v.is_nan() {
        return Fixed64::ZERO;
    }
    Fixed64::saturating_from_num(v)
}

/// Convert a finite f64 to Fixed64, saturating at the representable range.
/// Returns `None` for NaN and infinities.
#[inline]
pub fn checked_f64_to_fixed64(v: f64) -> Option<Fixed64> {
    v.is_finite().then(|| Fixed64::saturating_from_num(v))
}

/// Convert Fixed64 to f64. Use only for display and export.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}

/// Convert a tick count to Fixed64, saturating at the representable range.
#[inline]
pub fn ticks_to_fixed64(t: Ticks) -> Fixed64 {
    Fixed64::saturating_from_num(t)
}

/// Guarded ratio `num / den`.
///
/// A zero or negative denominator, or a negative numerator, yields zero.
/// A quotient too large to represent saturates to `Fixed64::MAX`.
#[inline]
pub fn guarded_ratio(num: Fixed64, den: Fixed64) -> Fixed64 {
    if den <= Fixed64::ZERO || num <= Fixed64::ZERO {
        return Fixed64::ZERO;
    }
    num.checked_div(den).unwrap_or(Fixed64::MAX)
}

/// Checked multiplication for Fixed64 that returns None on overflow.
#[inline]
pub fn checked_mul_64(a: Fixed64, b: Fixed64) -> Option<Fixed64> {
    a.checked_mul(b)
}
