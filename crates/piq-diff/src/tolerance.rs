//! Tolerant score comparison.

/// Absolute difference below which two scores are considered equal.
pub const SCORE_TOLERANCE: f64 = 1e-6;

/// Compare two optional scores: equal when both are absent, or both present
/// and within [`SCORE_TOLERANCE`].
pub fn approx_eq(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => (a - b).abs() <= SCORE_TOLERANCE,
        _ => false,
    }
}
