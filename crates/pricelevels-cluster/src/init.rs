//! Initial center selection (private module).
//!
//! Two strategies: evenly spaced quantiles of the sorted window, which is
//! deterministic, and K-means++ D²-weighted sampling driven by a seeded
//! `ChaCha8Rng`.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use pricelevels_stats::{distance, square_safe_scale};

/// Pick `k` initial centers at evenly spaced quantiles of `window`.
///
/// Center `i` is the sorted window's element at position
/// `floor((i + 0.5) * n / k)`, i.e. the midpoint of the `i`-th of `k` equal
/// slices. With `k == n` every observation seeds its own center.
///
/// When repeated prices make two quantiles land on the same value and the
/// window holds at least `k` distinct prices, the later seed moves up to the
/// next distinct price, so no cluster starts as a duplicate that would stay
/// empty. With fewer than `k` distinct prices duplicates are unavoidable and
/// the plain quantiles are returned.
#[must_use]
pub(crate) fn quantile_centers(window: &[f64], k: usize) -> Vec<f64> {
    let n = window.len();
    debug_assert!(k > 0, "k must be at least 1");
    debug_assert!(k <= n, "k must not exceed the number of observations");

    let mut sorted = window.to_vec();
    sorted.sort_by(f64::total_cmp);
    let quantiles: Vec<f64> = (0..k).map(|i| sorted[(2 * i + 1) * n / (2 * k)]).collect();

    let mut distinct = sorted;
    distinct.dedup();
    let d = distinct.len();
    if d < k {
        return quantiles;
    }

    // Strictly increasing indices into `distinct`, leaving room for the seeds still to place.
    let mut centers = Vec::with_capacity(k);
    let mut next_free = 0usize;
    for (i, q) in quantiles.into_iter().enumerate() {
        let at = distinct.partition_point(|&v| v < q);
        let idx = at.max(next_free).min(d - k + i);
        centers.push(distinct[idx]);
        next_free = idx + 1;
    }
    centers
}

/// Select `k` initial centers from `window` using K-means++ seeding.
///
/// The first center is drawn uniformly; each subsequent one with probability
/// proportional to the squared distance to the nearest chosen center.
/// Observations already chosen get weight 0 and are never picked twice.
/// Weights are computed on prices rescaled by [`square_safe_scale`], so the
/// total stays finite even for values near `f64::MAX`.
#[must_use]
pub(crate) fn kmeans_plus_plus(window: &[f64], k: usize, rng: &mut ChaCha8Rng) -> Vec<f64> {
    let n = window.len();
    debug_assert!(k > 0, "k must be at least 1");
    debug_assert!(k <= n, "k must not exceed the number of observations");

    let f = square_safe_scale(window.iter().copied());
    let scaled: Vec<f64> = window.iter().map(|&x| x * f).collect();

    let mut chosen: Vec<usize> = Vec::with_capacity(k);
    chosen.push(rng.gen_range(0..n));

    for _ in 1..k {
        let weights: Vec<f64> = (0..n)
            .map(|i| {
                if chosen.contains(&i) {
                    return 0.0;
                }
                chosen
                    .iter()
                    .map(|&j| distance(scaled[i], scaled[j]))
                    .fold(f64::INFINITY, f64::min)
                    .powi(2)
            })
            .collect();

        let total_weight: f64 = weights.iter().sum();

        if total_weight == 0.0 {
            // Every remaining observation duplicates a chosen center.
            // k <= n guarantees an unchosen index exists.
            if let Some(fallback) = (0..n).find(|i| !chosen.contains(i)) {
                chosen.push(fallback);
            }
            continue;
        }

        let threshold: f64 = rng.gen_range(0.0..total_weight);

        let mut cumsum = 0.0;
        let mut selected = n - 1;
        for (i, &w) in weights.iter().enumerate() {
            cumsum += w;
            if cumsum > threshold {
                selected = i;
                break;
            }
        }

        chosen.push(selected);
    }

    chosen.into_iter().map(|i| window[i]).collect()
}
