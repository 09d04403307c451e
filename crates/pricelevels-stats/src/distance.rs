//! Scalar distance used as the clustering metric.

/// Distance between two price observations: `|p - q|`.
///
/// The Euclidean distance `sqrt((p - q)^2)` collapses to this for scalars.
#[inline]
#[must_use]
pub fn distance(p: f64, q: f64) -> f64 {
    (p - q).abs()
}

/// Magnitude at which squared differences start to risk overflowing `f64`.
const SQUARE_SAFE_LIMIT: f64 = 3.121_748_550_315_992_2e144; // 2^480

/// Exact power-of-two factor that keeps squared differences of `values` finite.
///
/// Returns `1.0` for ordinary prices, so callers see no rounding change.
/// Once the largest magnitude reaches 2^480 it returns 2^-600: multiplying by
/// it only shifts exponents, and differences of the scaled values square to
/// at most 2^850.
#[must_use]
pub fn square_safe_scale(values: impl IntoIterator<Item = f64>) -> f64 {
    let max_abs = values.into_iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if max_abs >= SQUARE_SAFE_LIMIT {
        2.0_f64.powi(-600)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::{distance, square_safe_scale};

    #[test]
    fn symmetric() {
        assert_eq!(distance(3.0, 10.5), distance(10.5, 3.0));
    }

    #[test]
    fn absolute_difference() {
        assert_eq!(distance(100.0, 98.0), 2.0);
        assert_eq!(distance(-1.0, 1.0), 2.0);
    }

    #[test]
    fn zero_for_identical() {
        assert_eq!(distance(42.0, 42.0), 0.0);
    }

    #[test]
    fn scale_is_identity_for_prices() {
        assert_eq!(square_safe_scale([0.5, 62_000.0, -3.0]), 1.0);
    }

    #[test]
    fn scale_keeps_squared_gap_finite() {
        let window = [-1.7e308, 1.7e308];
        let f = square_safe_scale(window);
        assert!(f < 1.0);
        let gap = distance(window[0] * f, window[1] * f);
        assert!(gap.powi(2).is_finite());
        // Power-of-two scaling round-trips exactly.
        assert_eq!(window[1] * f / f, window[1]);
    }
}
