// Draft tiers: per-position grouping of players by VORP.
//
// Small positions are cut at fixed quantiles; larger ones are clustered with
// one-dimensional k-means. Either way tier 1 is the best group.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::player::{RankedPlayer, TieredPlayer};
use crate::position::Position;

/// Positions with fewer players than this use quantile cuts.
pub const SMALL_SAMPLE_THRESHOLD: usize = 8;

/// Default upper bound on k-means clusters per position.
pub const DEFAULT_K_MAX: usize = 6;

/// Maps a position's VORP values to tier ordinals (1 = best), one per input
/// value in input order. Returns `None` when the values cannot be tiered.
pub trait VorpClusterer: std::fmt::Debug {
    fn tiers(&self, vorps: &[f64]) -> Option<Vec<u32>>;

    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Quantile cuts
// ---------------------------------------------------------------------------

/// Three bins cut at the 33rd and 66th percentiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantileClusterer;

/// Percentile with linear interpolation between order statistics.
/// `sorted` must be ascending and non-empty.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64)
}

impl VorpClusterer for QuantileClusterer {
    fn tiers(&self, vorps: &[f64]) -> Option<Vec<u32>> {
        if vorps.iter().any(|v| !v.is_finite()) {
            return None;
        }
        if vorps.len() <= 1 {
            return Some(vec![1; vorps.len()]);
        }

        let mut sorted = vorps.to_vec();
        sorted.sort_by(f64::total_cmp);
        let q33 = percentile(&sorted, 0.33);
        let q66 = percentile(&sorted, 0.66);

        Some(
            vorps
                .iter()
                .map(|&v| 1 + u32::from(v < q66) + u32::from(v < q33))
                .collect(),
        )
    }

    fn name(&self) -> &'static str {
        "quantile"
    }
}

// ---------------------------------------------------------------------------
// One-dimensional k-means
// ---------------------------------------------------------------------------

/// Lloyd's algorithm on a single dimension with deterministic seeding.
#[derive(Debug, Clone, Copy)]
pub struct KMeansClusterer {
    pub k: usize,
    pub max_iterations: usize,
}

impl KMeansClusterer {
    pub fn new(k: usize) -> Self {
        KMeansClusterer {
            k,
            max_iterations: 100,
        }
    }

    /// `min(k_max, max(2, n / 5))`, never below 1.
    pub fn k_for(n: usize, k_max: usize) -> usize {
        k_max.min((n / 5).max(2)).max(1)
    }

    /// Index of the nearest center. Centers are ascending; a value exactly
    /// between two centers goes to the higher one.
    fn nearest(centers: &[f64], v: f64) -> usize {
        let mut best = 0;
        for (i, c) in centers.iter().enumerate() {
            if (v - c).abs() <= (v - centers[best]).abs() {
                best = i;
            }
        }
        best
    }
}

impl VorpClusterer for KMeansClusterer {
    fn tiers(&self, vorps: &[f64]) -> Option<Vec<u32>> {
        if vorps.iter().any(|v| !v.is_finite()) {
            return None;
        }
        if vorps.is_empty() {
            return Some(Vec::new());
        }

        let mut distinct = vorps.to_vec();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();

        let k = self.k.clamp(1, distinct.len());
        if k == 1 {
            return Some(vec![1; vorps.len()]);
        }

        // Seed at evenly spaced order statistics of the distinct values.
        let last = distinct.len() - 1;
        let mut centers: Vec<f64> = (0..k)
            .map(|i| distinct[(i * last + (k - 1) / 2) / (k - 1)])
            .collect();

        let mut assignment: Vec<usize> = vorps
            .iter()
            .map(|&v| Self::nearest(&centers, v))
            .collect();

        for iteration in 0..self.max_iterations {
            let mut sums = vec![0.0; k];
            let mut counts = vec![0usize; k];
            for (&v, &c) in vorps.iter().zip(&assignment) {
                sums[c] += v;
                counts[c] += 1;
            }
            for c in 0..k {
                if counts[c] > 0 {
                    centers[c] = sums[c] / counts[c] as f64;
                }
            }

            let next: Vec<usize> = vorps
                .iter()
                .map(|&v| Self::nearest(&centers, v))
                .collect();
            if next == assignment {
                debug!("k-means converged after {} iterations", iteration + 1);
                break;
            }
            assignment = next;
        }

        // Relabel non-empty clusters by descending mean.
        let mut members: BTreeMap<usize, (f64, usize)> = BTreeMap::new();
        for (&v, &c) in vorps.iter().zip(&assignment) {
            let e = members.entry(c).or_insert((0.0, 0));
            e.0 += v;
            e.1 += 1;
        }
        let mut order: Vec<(usize, f64)> = members
            .into_iter()
            .map(|(c, (sum, n))| (c, sum / n as f64))
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut label = vec![0u32; k];
        for (rank, (c, _)) in order.iter().enumerate() {
            label[*c] = rank as u32 + 1;
        }

        Some(assignment.iter().map(|&c| label[c]).collect())
    }

    fn name(&self) -> &'static str {
        "k-means"
    }
}

// ---------------------------------------------------------------------------
// Pipeline entry point
// ---------------------------------------------------------------------------

/// Pick the tiering strategy for a position with `n` players.
pub fn clusterer_for(n: usize, k_max: usize) -> Box<dyn VorpClusterer> {
    if n < SMALL_SAMPLE_THRESHOLD {
        Box::new(QuantileClusterer)
    } else {
        Box::new(KMeansClusterer::new(KMeansClusterer::k_for(n, k_max)))
    }
}

/// Attach a tier to every player, computed per position. Input order is kept.
///
/// A position whose clusterer cannot produce tiers gets `tier = None` for all
/// of its players; the rest of the build is unaffected.
pub fn assign_tiers(players: Vec<RankedPlayer>, k_max: usize) -> Vec<TieredPlayer> {
    let mut by_position: BTreeMap<Position, Vec<usize>> = BTreeMap::new();
    for (i, p) in players.iter().enumerate() {
        by_position.entry(p.player.position).or_default().push(i);
    }

    let mut tiers: Vec<Option<u32>> = vec![None; players.len()];
    for (pos, indices) in &by_position {
        let vorps: Vec<f64> = indices.iter().map(|&i| players[i].vorp).collect();
        let clusterer = clusterer_for(vorps.len(), k_max);

        match clusterer.tiers(&vorps) {
            Some(assigned) => {
                for (&i, t) in indices.iter().zip(assigned) {
                    tiers[i] = Some(t);
                }
                debug!(
                    "{pos}: {} players tiered by {}",
                    indices.len(),
                    clusterer.name()
                );
            }
            None => warn!(
                "{pos}: could not tier {} players with {}, leaving tiers empty",
                indices.len(),
                clusterer.name()
            ),
        }
    }

    players
        .into_iter()
        .zip(tiers)
        .map(|(ranked, tier)| TieredPlayer { ranked, tier })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
