//! Core one-dimensional clustering loop.
//!
//! Provides the assign/update iteration, finalization into ordered cluster
//! records, and the multi-restart orchestration used by K-means++ seeding.

use std::cmp::Ordering;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use pricelevels_stats::{EstimatorKind, center, distance, spread};

use crate::config::LevelConfig;
use crate::error::ClusterError;
use crate::inertia::Inertia;
use crate::init::{kmeans_plus_plus, quantile_centers};
use crate::label::ClusterLabel;
use crate::result::{ClusterRecord, LevelFit};

// ── Internal run result ───────────────────────────────────────────────────────

/// Result of a single run, before relabelling into ascending center order.
struct SingleRun {
    assignments: Vec<ClusterLabel>,
    centers: Vec<f64>,
    inertia: Inertia,
    converged: bool,
    iterations: usize,
}

// ── assign ────────────────────────────────────────────────────────────────────

/// Assign each observation to its nearest center.
///
/// Centers are scanned in index order with a strict `<`, so an observation
/// equidistant from two centers goes to the lower-indexed one.
pub(crate) fn assign(window: &[f64], centers: &[f64]) -> Vec<ClusterLabel> {
    window
        .iter()
        .map(|&x| {
            let mut best_label = 0usize;
            let mut best_dist = f64::INFINITY;
            for (c_idx, &c) in centers.iter().enumerate() {
                let d = distance(x, c);
                if d < best_dist {
                    best_dist = d;
                    best_label = c_idx;
                }
            }
            ClusterLabel::new(best_label)
        })
        .collect()
}

/// Sum of squared distances from each observation to its assigned center.
pub(crate) fn compute_inertia(window: &[f64], assignments: &[ClusterLabel], centers: &[f64]) -> Inertia {
    let value = window
        .iter()
        .zip(assignments)
        .map(|(&x, label)| distance(x, centers[label.index()]).powi(2))
        .sum();
    Inertia::new(value)
}

/// Group window values by cluster label.
fn group_members(window: &[f64], assignments: &[ClusterLabel], k: usize) -> Vec<Vec<f64>> {
    let mut groups: Vec<Vec<f64>> = vec![Vec::new(); k];
    for (&x, label) in window.iter().zip(assignments) {
        groups[label.index()].push(x);
    }
    groups
}

// ── update ────────────────────────────────────────────────────────────────────

/// Recompute each non-empty cluster's center with the configured estimator.
///
/// An empty cluster keeps its previous center.
///
/// # Errors
///
/// Propagates [`ClusterError::Stats`] from the estimator.
pub(crate) fn update(
    window: &[f64],
    assignments: &[ClusterLabel],
    prev_centers: &[f64],
    estimator: EstimatorKind,
) -> Result<Vec<f64>, ClusterError> {
    let groups = group_members(window, assignments, prev_centers.len());

    groups
        .iter()
        .zip(prev_centers)
        .enumerate()
        .map(|(label, (members, &prev))| {
            if members.is_empty() {
                debug!(cluster = label, center = prev, "empty cluster keeps previous center");
                Ok(prev)
            } else {
                center(members, estimator).map_err(ClusterError::from)
            }
        })
        .collect()
}

// ── run_once ──────────────────────────────────────────────────────────────────

/// Iterate assign/update from `initial` until the assignment stops changing
/// or `config.max_iter` iterations have run.
///
/// On return the centers are always the estimator applied to the returned
/// assignment (or the held value for empty clusters).
#[instrument(skip(window, initial, config), fields(n = window.len(), k = initial.len()))]
fn run_once(
    window: &[f64],
    initial: Vec<f64>,
    config: &LevelConfig,
) -> Result<SingleRun, ClusterError> {
    let mut centers = initial;
    let mut assignments = assign(window, &centers);
    let mut converged = false;
    let mut iterations = 0usize;

    while iterations < config.max_iter {
        iterations += 1;

        centers = update(window, &assignments, &centers, config.estimator)?;
        let next = assign(window, &centers);

        if next == assignments {
            converged = true;
            debug!(iteration = iterations, "fixed point reached");
            break;
        }

        assignments = next;
        debug!(iteration = iterations, "iteration complete");
    }

    if !converged {
        // Bring the centers in line with the last assignment.
        centers = update(window, &assignments, &centers, config.estimator)?;
        warn!(
            max_iter = config.max_iter,
            "no fixed point within max_iter; returning last assignment"
        );
    }

    let inertia = compute_inertia(window, &assignments, &centers);

    Ok(SingleRun {
        assignments,
        centers,
        inertia,
        converged,
        iterations,
    })
}

// ── finalize ──────────────────────────────────────────────────────────────────

/// Compute per-cluster records from each cluster's own members, then order
/// clusters by ascending center and relabel the assignment to match.
///
/// # Errors
///
/// Propagates [`ClusterError::Stats`] when a non-empty cluster has
/// `member_count <= ddof`.
fn finalize(
    window: &[f64],
    run: SingleRun,
    config: &LevelConfig,
    n_init_used: usize,
) -> Result<LevelFit, ClusterError> {
    let k = run.centers.len();
    let groups = group_members(window, &run.assignments, k);

    let unordered: Vec<ClusterRecord> = groups
        .iter()
        .zip(&run.centers)
        .map(|(members, &c)| -> Result<ClusterRecord, ClusterError> {
            let s = if members.is_empty() {
                0.0
            } else {
                spread(members, c, config.estimator, config.ddof)?
            };
            Ok(ClusterRecord {
                center: c,
                spread: s,
                member_count: members.len(),
            })
        })
        .collect::<Result<_, _>>()?;

    // Stable sort: clusters with equal centers keep internal order.
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| run.centers[a].total_cmp(&run.centers[b]));

    let mut rank = vec![0usize; k];
    for (new_label, &old_label) in order.iter().enumerate() {
        rank[old_label] = new_label;
    }

    let records: Vec<ClusterRecord> = order.iter().map(|&i| unordered[i]).collect();
    let assignments: Vec<ClusterLabel> = run
        .assignments
        .iter()
        .map(|l| ClusterLabel::new(rank[l.index()]))
        .collect();

    Ok(LevelFit {
        records,
        assignments,
        estimator: config.estimator,
        inertia: run.inertia,
        converged: run.converged,
        iterations: run.iterations,
        n_init_used,
    })
}

// ── entry points ──────────────────────────────────────────────────────────────

/// Run once from evenly spaced quantile seeds.
///
/// # Errors
///
/// Propagates [`ClusterError`] from the iteration and finalization.
#[instrument(skip(window, config), fields(k = config.k, estimator = %config.estimator))]
pub(crate) fn fit_quantile(window: &[f64], config: &LevelConfig) -> Result<LevelFit, ClusterError> {
    let initial = quantile_centers(window, config.k);
    let run = run_once(window, initial, config)?;

    info!(
        iterations = run.iterations,
        inertia = run.inertia.value(),
        converged = run.converged,
        "quantile-seeded fit complete"
    );

    finalize(window, run, config, 1)
}

/// Run `config.n_init` K-means++ restarts in parallel and keep the best.
///
/// Sub-seeds are derived from `config.seed`, and the lowest-inertia run wins
/// with ties going to the earliest restart, so the result does not depend on
/// thread scheduling.
///
/// # Errors
///
/// Propagates the first [`ClusterError`] in restart order.
#[instrument(skip(window, config), fields(k = config.k, n_init = config.n_init))]
pub(crate) fn multi_restart(window: &[f64], config: &LevelConfig) -> Result<LevelFit, ClusterError> {
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let seeds: Vec<u64> = (0..config.n_init).map(|_| master_rng.r#gen()).collect();

    let results: Vec<Result<SingleRun, ClusterError>> = seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let initial = kmeans_plus_plus(window, config.k, &mut rng);
            run_once(window, initial, config)
        })
        .collect();

    let mut best: Option<SingleRun> = None;
    let mut n_ok = 0usize;

    for result in results {
        let run = result?;
        n_ok += 1;
        best = Some(match best {
            None => run,
            Some(prev) => {
                if run.inertia.total_cmp(&prev.inertia) == Ordering::Less {
                    run
                } else {
                    prev
                }
            }
        });
    }

    // n_init >= 1 is checked by LevelConfig::fit.
    let Some(best) = best else {
        return Err(ClusterError::InvalidNInit);
    };

    info!(
        n_init = n_ok,
        best_inertia = best.inertia.value(),
        converged = best.converged,
        "multi-restart complete"
    );

    finalize(window, best, config, n_ok)
}

// ── tests ─────────────────────────────────────────────────────────────────────
