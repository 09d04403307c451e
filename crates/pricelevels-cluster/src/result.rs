//! Result types for price-level clustering.

use pricelevels_stats::{EstimatorKind, distance};

use crate::inertia::Inertia;
use crate::label::ClusterLabel;

/// Summary statistics for one cluster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterRecord {
    /// Representative price level (mean or median of the members).
    pub center: f64,
    /// Dispersion of the members around `center`. Zero for an empty cluster.
    pub spread: f64,
    /// Number of window observations assigned to this cluster.
    pub member_count: usize,
}

impl ClusterRecord {
    /// Horizontal band `center ± spread` for this cluster.
    #[must_use]
    pub fn band(&self) -> Band {
        Band {
            lower: self.center - self.spread,
            center: self.center,
            upper: self.center + self.spread,
        }
    }

    /// Return true if no observation was assigned to this cluster.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.member_count == 0
    }
}

/// A price band drawn as three horizontal lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// `center - spread`.
    pub lower: f64,
    /// Cluster center.
    pub center: f64,
    /// `center + spread`.
    pub upper: f64,
}

impl Band {
    /// Return true if `price` lies within `[lower, upper]`.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        (self.lower..=self.upper).contains(&price)
    }
}

/// Result of fitting price levels to a training window.
#[derive(Debug, Clone)]
pub struct LevelFit {
    /// One record per cluster, ordered by ascending center.
    pub records: Vec<ClusterRecord>,
    /// Cluster of each window observation, labelled in `records` order.
    pub assignments: Vec<ClusterLabel>,
    /// Estimator used for every cluster in this run.
    pub estimator: EstimatorKind,
    /// Sum of squared distances from observations to their centers.
    pub inertia: Inertia,
    /// Whether a fixed point was reached within `max_iter`.
    pub converged: bool,
    /// Iterations performed in the selected run.
    pub iterations: usize,
    /// Number of restarts actually executed.
    pub n_init_used: usize,
}

impl LevelFit {
    /// Return the number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.records.len()
    }

    /// Return the member count of each cluster, in `records` order.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.member_count).collect()
    }

    /// Return the cluster centers in ascending order.
    #[must_use]
    pub fn centers(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.center).collect()
    }

    /// Return the band of every cluster, lowest first.
    #[must_use]
    pub fn bands(&self) -> Vec<Band> {
        self.records.iter().map(ClusterRecord::band).collect()
    }

    /// Return the window indices assigned to `label`.
    #[must_use]
    pub fn members(&self, label: ClusterLabel) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter_map(|(i, &l)| if l == label { Some(i) } else { None })
            .collect()
    }

    /// Return the cluster whose center is closest to `price`.
    ///
    /// Ties go to the lower level.
    #[must_use]
    pub fn nearest(&self, price: f64) -> ClusterLabel {
        let mut best = 0usize;
        let mut best_dist = f64::INFINITY;
        for (i, record) in self.records.iter().enumerate() {
            let d = distance(price, record.center);
            if d < best_dist {
                best_dist = d;
                best = i;
            }
        }
        ClusterLabel::new(best)
    }
}

#[cfg(test)]
mod tests {
    use pricelevels_stats::EstimatorKind;

    use super::{Band, ClusterRecord, LevelFit};
    use crate::inertia::Inertia;
    use crate::label::ClusterLabel;

    fn record(center: f64, spread: f64, member_count: usize) -> ClusterRecord {
        ClusterRecord { center, spread, member_count }
    }

    fn make_fit(assignments: Vec<usize>, records: Vec<ClusterRecord>) -> LevelFit {
        LevelFit {
            records,
            assignments: assignments.into_iter().map(ClusterLabel::new).collect(),
            estimator: EstimatorKind::MeanStd,
            inertia: Inertia::new(0.0),
            converged: true,
            iterations: 1,
            n_init_used: 1,
        }
    }

    #[test]
    fn band_from_record() {
        let band = record(100.0, 2.5, 4).band();
        assert_eq!(band, Band { lower: 97.5, center: 100.0, upper: 102.5 });
        assert!(band.contains(101.0));
        assert!(!band.contains(103.0));
    }

    #[test]
    fn empty_record() {
        assert!(record(5.0, 0.0, 0).is_empty());
        assert!(!record(5.0, 0.0, 1).is_empty());
    }

    #[test]
    fn sizes_and_members() {
        let fit = make_fit(
            vec![0, 1, 0, 0, 1],
            vec![record(10.0, 1.0, 3), record(100.0, 2.0, 2)],
        );
        assert_eq!(fit.k(), 2);
        assert_eq!(fit.cluster_sizes(), vec![3, 2]);
        assert_eq!(fit.members(ClusterLabel::new(0)), vec![0, 2, 3]);
        assert_eq!(fit.members(ClusterLabel::new(1)), vec![1, 4]);
        assert_eq!(fit.centers(), vec![10.0, 100.0]);
    }

    #[test]
    fn nearest_level() {
        let fit = make_fit(
            vec![0, 1, 2],
            vec![record(1.0, 0.0, 1), record(100.0, 0.0, 1), record(10_000.0, 0.0, 1)],
        );
        assert_eq!(fit.nearest(120.0).index(), 1);
        assert_eq!(fit.nearest(-5.0).index(), 0);
        assert_eq!(fit.nearest(9_000.0).index(), 2);
    }

    #[test]
    fn nearest_tie_goes_low() {
        let fit = make_fit(vec![0, 1], vec![record(0.0, 0.0, 1), record(10.0, 0.0, 1)]);
        assert_eq!(fit.nearest(5.0).index(), 0);
    }
}
