use std::cmp::Ordering;
use std::fmt;

/// Within-level price dispersion of a fit: `Σ (price - level)²` over the
/// training window, each price measured against the level it was assigned to.
///
/// K-means++ restarts are ranked by it, lowest first. Reported in price
/// units squared, so it grows with the instrument's price scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Inertia(f64);

impl Inertia {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw inertia value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Inertia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}
