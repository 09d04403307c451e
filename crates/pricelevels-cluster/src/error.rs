use pricelevels_stats::StatsError;

/// Errors from price-level clustering.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClusterError {
    /// Returned when k is zero.
    #[error("k must be at least 1, got {k}")]
    InvalidK {
        /// The invalid k value provided.
        k: usize,
    },

    /// Returned when the window holds fewer observations than the requested k.
    #[error("need at least {k} observations to form {k} clusters, got {n_observations}")]
    InsufficientData {
        /// Number of observations in the window.
        n_observations: usize,
        /// Requested number of clusters.
        k: usize,
    },

    /// Returned when the iteration cap is zero.
    #[error("max_iter must be at least 1")]
    InvalidMaxIter,

    /// Returned when `n_init` is zero for a randomly seeded run.
    #[error("n_init must be at least 1")]
    InvalidNInit,

    /// Wraps an estimator or window error.
    #[error("estimator error: {0}")]
    Stats(#[from] StatsError),
}
