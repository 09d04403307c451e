//! Center and spread estimators, selected by [`EstimatorKind`].
//!
//! Both estimators share one quadratic deviation formula; they differ in the
//! point the deviations are measured from:
//!
//! | Kind | Center | Spread |
//! |---|---|---|
//! | [`EstimatorKind::MeanStd`] | arithmetic mean | `sqrt(Σ(x - mean)² / (n - ddof))` |
//! | [`EstimatorKind::MedianMad`] | median | `sqrt(Σ(x - mu)² / (n - ddof))` around the supplied `mu` |
//!
//! The `MedianMad` spread is a root-mean-square deviation around the median,
//! not the conventional median absolute deviation.

use std::fmt;
use std::str::FromStr;

use crate::distance::square_safe_scale;
use crate::error::StatsError;

/// Which center/spread pair to use for every cluster in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EstimatorKind {
    /// Mean center, standard deviation spread (K-means).
    #[default]
    MeanStd,
    /// Median center, quadratic deviation around the median (K-median).
    MedianMad,
}

impl EstimatorKind {
    /// Short lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MeanStd => "mean",
            Self::MedianMad => "median",
        }
    }
}

impl fmt::Display for EstimatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimatorKind {
    type Err = StatsError;

    /// Parse an estimator name. Case, spaces, `-` and `_` are ignored, so
    /// `"mean"`, `"k-means"` and `"K means"` all select [`EstimatorKind::MeanStd`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "mean" | "kmeans" | "meanstd" => Ok(Self::MeanStd),
            "median" | "kmedian" | "kmedians" | "medianmad" => Ok(Self::MedianMad),
            _ => Err(StatsError::UnknownEstimator { name: s.to_string() }),
        }
    }
}

/// Central tendency of `values` under `kind`.
///
/// Mean for [`EstimatorKind::MeanStd`]; median for [`EstimatorKind::MedianMad`],
/// averaging the two middle elements when the length is even.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`StatsError::EmptyInput`] | `values` is empty |
pub fn center(values: &[f64], kind: EstimatorKind) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptyInput);
    }
    Ok(match kind {
        EstimatorKind::MeanStd => mean(values),
        EstimatorKind::MedianMad => median(values),
    })
}

/// Dispersion of `values` under `kind`, with divisor `len - ddof`.
///
/// For [`EstimatorKind::MeanStd`] deviations are taken from the mean of
/// `values` and `mu` is ignored. For [`EstimatorKind::MedianMad`] they are
/// taken from `mu`. Values near the `f64` limit are rescaled by an exact power
/// of two before squaring.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`StatsError::DegenerateInput`] | `values.len() <= ddof` |
/// | [`StatsError::Overflow`] | The spread itself is larger than `f64::MAX` |
pub fn spread(values: &[f64], mu: f64, kind: EstimatorKind, ddof: usize) -> Result<f64, StatsError> {
    let len = values.len();
    if len <= ddof {
        return Err(StatsError::DegenerateInput { len, ddof });
    }

    let origin = match kind {
        EstimatorKind::MeanStd => mean(values),
        EstimatorKind::MedianMad => mu,
    };
    let f = square_safe_scale(values.iter().copied().chain([origin]));
    let scaled_origin = origin * f;
    let sum_sq: f64 = values.iter().map(|&x| (x * f - scaled_origin).powi(2)).sum();

    let s = (sum_sq / (len - ddof) as f64).sqrt() / f;
    if !s.is_finite() {
        return Err(StatsError::Overflow { len });
    }
    Ok(s)
}

fn mean(values: &[f64]) -> f64 {
    let f = square_safe_scale(values.iter().copied());
    values.iter().map(|&x| x * f).sum::<f64>() / values.len() as f64 / f
}

/// Median via quickselect on a scratch copy. Caller guarantees non-empty input.
fn median(values: &[f64]) -> f64 {
    let mut buf = values.to_vec();
    let n = buf.len();
    let mid = n / 2;

    let (lower_half, &mut upper, _) = buf.select_nth_unstable_by(mid, f64::total_cmp);
    if n % 2 == 1 {
        return upper;
    }

    // Everything left of `mid` is <= upper, so its max is the lower middle.
    let lower = lower_half.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    lower / 2.0 + upper / 2.0
}
