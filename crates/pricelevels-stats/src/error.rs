//! Error types for estimator evaluation and series validation.

/// Errors from center/spread estimation and price series validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StatsError {
    /// Returned when an estimator is given an empty slice.
    #[error("cannot estimate a center from an empty slice")]
    EmptyInput,

    /// Returned when the effective sample size `len - ddof` is not positive.
    #[error("spread is undefined for {len} values with ddof={ddof}")]
    DegenerateInput {
        /// Number of values supplied.
        len: usize,
        /// Delta degrees of freedom requested.
        ddof: usize,
    },

    /// Returned when a finite input produces a spread too large for `f64`.
    #[error("spread of {len} values exceeds the f64 range")]
    Overflow {
        /// Number of values supplied.
        len: usize,
    },

    /// Returned when a price series contains NaN, infinity, or negative infinity.
    #[error("price series contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first non-finite value found.
        index: usize,
    },

    /// Returned when a training window is zero-length or longer than the series.
    #[error("training window of {train_n} observations is invalid for a series of {len}")]
    InvalidWindow {
        /// Requested window length.
        train_n: usize,
        /// Length of the series.
        len: usize,
    },

    /// Returned when an estimator name cannot be parsed.
    #[error("unknown estimator \"{name}\" (expected mean or median)")]
    UnknownEstimator {
        /// The name that failed to parse.
        name: String,
    },
}
