//! Center and spread estimators for price-level clustering.
//!
//! Pure math library, zero I/O. Provides the estimator switch
//! (mean/standard deviation versus median/quadratic deviation around the
//! median), the one-dimensional distance used by the clustering engine, and
//! a validated price series with training-window extraction.

mod distance;
mod error;
mod estimator;
mod series;

pub use distance::{distance, square_safe_scale};
pub use error::StatsError;
pub use estimator::{EstimatorKind, center, spread};
pub use series::PriceSeries;
