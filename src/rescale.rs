//! # Score Rescaler
//! Maps the unbounded combination onto an absolute 0–10 grade.
//!
//! The window `[-3, +3]` (±3 standard deviations) is fixed and not fitted to the
//! data: the same raw value always gets the same grade.

pub const Z_MIN: f64 = -3.0;
pub const Z_MAX: f64 = 3.0;
pub const Z_RANGE: f64 = Z_MAX - Z_MIN;
pub const GRADE_MAX: f64 = 10.0;

/// Used when no item carries a non-zero error.
pub const DEFAULT_DECIMALS: u32 = 2;
/// Beyond this, f64 cannot represent the requested precision anyway.
pub const MAX_DECIMALS: u32 = 15;

/// Linear map of `[-3, 3]` onto `[0, 10]`, clamped outside the window.
pub fn grade_for(raw: f64) -> f64 {
    if raw <= Z_MIN {
        0.0
    } else if raw >= Z_MAX {
        GRADE_MAX
    } else {
        (raw - Z_MIN) / Z_RANGE * GRADE_MAX
    }
}

/// Same ratio as the grade window, unclamped.
pub fn grade_error_for(propagated: f64) -> f64 {
    propagated / Z_RANGE * GRADE_MAX
}

/// Decimal places for a single positive error: 2 at or above 1, otherwise the
/// magnitude of the leading digit's exponent (0.03 → 2, 0.003 → 3).
pub fn decimals_for(value: f64) -> u32 {
    if value == 0.0 || !value.is_finite() {
        return DEFAULT_DECIMALS;
    }
    let exp = value.abs().log10().floor();
    if exp < 0.0 {
        (-exp as u32).min(MAX_DECIMALS)
    } else {
        DEFAULT_DECIMALS
    }
}

/// Shared display precision: derived from the smallest non-zero propagated error.
pub fn shared_decimals<I>(errors: I) -> u32
where
    I: IntoIterator<Item = f64>,
{
    errors
        .into_iter()
        .filter(|e| *e > 0.0)
        .min_by(f64::total_cmp)
        .map(decimals_for)
        .unwrap_or(DEFAULT_DECIMALS)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(x: f64, decimals: u32) -> f64 {
    let m = 10f64.powi(decimals as i32);
    (x * m).round() / m
}
