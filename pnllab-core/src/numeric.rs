//! Rounding helpers shared by every stage.

/// Round to 2 decimal places (half away from zero).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum then round, so per-period totals don't carry float noise.
pub fn sum2<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    round2(values.into_iter().sum())
}
