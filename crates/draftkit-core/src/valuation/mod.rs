// Valuation engine: scoring, season totals, multi-year blends, VORP, tiers.

pub mod blend;
pub mod scoring;
pub mod season;
pub mod tiers;
pub mod vor;

/// Round to two decimal places, halves away from zero.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
