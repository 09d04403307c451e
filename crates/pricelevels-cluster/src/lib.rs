//! One-dimensional K-means/K-median clustering of price observations.
//!
//! Partitions a training window of prices into `k` levels with a Lloyd-style
//! assign/update loop, then summarizes each level's own members with the
//! configured estimator. Levels are returned lowest first, ready to be drawn
//! as `center ± spread` bands.

mod config;
mod error;
mod inertia;
mod init;
mod kmeans;
mod label;
mod result;

pub use config::{InitStrategy, LevelConfig};
pub use error::ClusterError;
pub use inertia::Inertia;
pub use label::ClusterLabel;
pub use result::{Band, ClusterRecord, LevelFit};
