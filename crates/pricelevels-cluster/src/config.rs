//! Configuration builder for price-level clustering.

use pricelevels_stats::{EstimatorKind, PriceSeries, StatsError};

use crate::error::ClusterError;
use crate::result::LevelFit;

/// How the initial cluster centers are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitStrategy {
    /// Evenly spaced quantiles of the sorted window. Deterministic; runs once.
    #[default]
    Quantile,
    /// K-means++ D²-weighted sampling from a seeded `ChaCha8Rng`, repeated
    /// `n_init` times with the lowest-inertia run kept.
    KMeansPlusPlus,
}

/// Configuration for fitting `k` price levels.
///
/// Construct via [`LevelConfig::new`], then chain `with_*` methods to override defaults.
///
/// # Defaults
///
/// | Parameter       | Default                   |
/// |-----------------|---------------------------|
/// | `max_iter`      | 100                       |
/// | `seed`          | 42                        |
/// | `init_strategy` | `InitStrategy::Quantile`  |
/// | `n_init`        | 10                        |
/// | `ddof`          | 0                         |
///
/// Empty clusters keep their previous center and are never reseeded, so a
/// run is fully determined by the window, the config, and the seed.
#[derive(Debug, Clone)]
pub struct LevelConfig {
    pub(crate) k: usize,
    pub(crate) estimator: EstimatorKind,
    pub(crate) max_iter: usize,
    pub(crate) seed: u64,
    pub(crate) init_strategy: InitStrategy,
    pub(crate) n_init: usize,
    pub(crate) ddof: usize,
}

impl LevelConfig {
    /// Create a configuration for `k` clusters using `estimator` for every cluster.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::InvalidK`] | `k` is zero |
    pub fn new(k: usize, estimator: EstimatorKind) -> Result<Self, ClusterError> {
        if k == 0 {
            return Err(ClusterError::InvalidK { k });
        }
        Ok(Self {
            k,
            estimator,
            max_iter: 100,
            seed: 42,
            init_strategy: InitStrategy::Quantile,
            n_init: 10,
            ddof: 0,
        })
    }

    /// Set the maximum number of assign/update iterations.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the seed for K-means++ sampling and restart sub-seeds.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the center initialization strategy.
    #[must_use]
    pub fn with_init_strategy(mut self, init_strategy: InitStrategy) -> Self {
        self.init_strategy = init_strategy;
        self
    }

    /// Set the number of K-means++ restarts. Ignored by [`InitStrategy::Quantile`].
    #[must_use]
    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Set the delta degrees of freedom for the spread divisor (`len - ddof`).
    #[must_use]
    pub fn with_ddof(mut self, ddof: usize) -> Self {
        self.ddof = ddof;
        self
    }

    /// Return the number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Return the estimator used for every cluster.
    #[must_use]
    pub fn estimator(&self) -> EstimatorKind {
        self.estimator
    }

    /// Return the iteration cap.
    #[must_use]
    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the initialization strategy.
    #[must_use]
    pub fn init_strategy(&self) -> InitStrategy {
        self.init_strategy
    }

    /// Return the number of K-means++ restarts.
    #[must_use]
    pub fn n_init(&self) -> usize {
        self.n_init
    }

    /// Return the spread's delta degrees of freedom.
    #[must_use]
    pub fn ddof(&self) -> usize {
        self.ddof
    }

    /// Cluster `window` into `k` price levels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ClusterError::InsufficientData`] | `window.len() < k` |
    /// | [`ClusterError::InvalidMaxIter`] | `max_iter` is zero |
    /// | [`ClusterError::InvalidNInit`] | `n_init` is zero with K-means++ seeding |
    /// | [`ClusterError::Stats`] | A value is non-finite, or a non-empty cluster has `member_count <= ddof` |
    pub fn fit(&self, window: &[f64]) -> Result<LevelFit, ClusterError> {
        let n = window.len();
        if n < self.k {
            return Err(ClusterError::InsufficientData { n_observations: n, k: self.k });
        }
        if self.max_iter == 0 {
            return Err(ClusterError::InvalidMaxIter);
        }
        if self.init_strategy == InitStrategy::KMeansPlusPlus && self.n_init == 0 {
            return Err(ClusterError::InvalidNInit);
        }
        if let Some(index) = window.iter().position(|v| !v.is_finite()) {
            return Err(StatsError::NonFiniteValue { index }.into());
        }

        match self.init_strategy {
            InitStrategy::Quantile => crate::kmeans::fit_quantile(window, self),
            InitStrategy::KMeansPlusPlus => crate::kmeans::multi_restart(window, self),
        }
    }

    /// Cluster the most recent `train_n` observations of `series`.
    ///
    /// # Errors
    ///
    /// [`ClusterError::Stats`] wrapping [`StatsError::InvalidWindow`]
    /// when `train_n` is zero or longer than the series, plus everything [`LevelConfig::fit`] returns.
    pub fn fit_trailing(&self, series: &PriceSeries, train_n: usize) -> Result<LevelFit, ClusterError> {
        let window = series.trailing(train_n)?;
        self.fit(window)
    }
}

#[cfg(test)]
mod tests {
    use pricelevels_stats::{EstimatorKind, PriceSeries, StatsError};

    use super::{InitStrategy, LevelConfig};
    use crate::error::ClusterError;

    #[test]
    fn new_valid_k() {
        let cfg = LevelConfig::new(3, EstimatorKind::MeanStd).unwrap();
        assert_eq!(cfg.k(), 3);
        assert_eq!(cfg.estimator(), EstimatorKind::MeanStd);
    }

    #[test]
    fn new_k_zero() {
        let result = LevelConfig::new(0, EstimatorKind::MeanStd);
        assert!(matches!(result, Err(ClusterError::InvalidK { k: 0 })));
    }

    #[test]
    fn defaults_are_correct() {
        let cfg = LevelConfig::new(1, EstimatorKind::MedianMad).unwrap();
        assert_eq!(cfg.max_iter(), 100);
        assert_eq!(cfg.seed(), 42);
        assert_eq!(cfg.init_strategy(), InitStrategy::Quantile);
        assert_eq!(cfg.n_init(), 10);
        assert_eq!(cfg.ddof(), 0);
    }

    #[test]
    fn builder_chaining() {
        let cfg = LevelConfig::new(4, EstimatorKind::MeanStd)
            .unwrap()
            .with_max_iter(7)
            .with_seed(99)
            .with_init_strategy(InitStrategy::KMeansPlusPlus)
            .with_n_init(3)
            .with_ddof(1);
        assert_eq!(cfg.max_iter(), 7);
        assert_eq!(cfg.seed(), 99);
        assert_eq!(cfg.init_strategy(), InitStrategy::KMeansPlusPlus);
        assert_eq!(cfg.n_init(), 3);
        assert_eq!(cfg.ddof(), 1);
    }

    #[test]
    fn fit_rejects_too_few_observations() {
        let cfg = LevelConfig::new(4, EstimatorKind::MeanStd).unwrap();
        let result = cfg.fit(&[1.0, 2.0, 3.0]);
        assert_eq!(
            result.unwrap_err(),
            ClusterError::InsufficientData { n_observations: 3, k: 4 }
        );
    }

    #[test]
    fn fit_rejects_zero_max_iter() {
        let cfg = LevelConfig::new(1, EstimatorKind::MeanStd).unwrap().with_max_iter(0);
        assert_eq!(cfg.fit(&[1.0]).unwrap_err(), ClusterError::InvalidMaxIter);
    }

    #[test]
    fn fit_rejects_zero_restarts() {
        let cfg = LevelConfig::new(1, EstimatorKind::MeanStd)
            .unwrap()
            .with_init_strategy(InitStrategy::KMeansPlusPlus)
            .with_n_init(0);
        assert_eq!(cfg.fit(&[1.0]).unwrap_err(), ClusterError::InvalidNInit);
    }

    #[test]
    fn fit_rejects_non_finite() {
        let cfg = LevelConfig::new(1, EstimatorKind::MeanStd).unwrap();
        assert_eq!(
            cfg.fit(&[1.0, f64::NAN]).unwrap_err(),
            ClusterError::Stats(StatsError::NonFiniteValue { index: 1 })
        );
    }

    #[test]
    fn fit_trailing_uses_suffix() {
        let series = PriceSeries::new(vec![1.0, 2.0, 3.0, 50.0, 51.0, 52.0]).unwrap();
        let cfg = LevelConfig::new(1, EstimatorKind::MeanStd).unwrap();
        let fit = cfg.fit_trailing(&series, 3).unwrap();
        assert_eq!(fit.records[0].center, 51.0);
        assert_eq!(fit.records[0].member_count, 3);
    }

    #[test]
    fn fit_trailing_rejects_long_window() {
        let series = PriceSeries::new(vec![1.0, 2.0]).unwrap();
        let cfg = LevelConfig::new(1, EstimatorKind::MeanStd).unwrap();
        assert_eq!(
            cfg.fit_trailing(&series, 5).unwrap_err(),
            ClusterError::Stats(StatsError::InvalidWindow { train_n: 5, len: 2 })
        );
    }
}
