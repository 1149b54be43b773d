//! # Cluster Engine
//! Groups 1-D grades into tiers with an automatically chosen tier count.
//!
//! For each candidate `k` the centroids are seeded at equal widths between the
//! lowest and highest grade and every grade is assigned once to its nearest
//! centroid. There is no Lloyd refinement and no restart: the BIC comparison is
//! calibrated against exactly this single-pass assignment. The `k` with the lowest
//! BIC wins (first one on ties), and tiers are numbered by descending cluster mean.
//!
//! Fully deterministic for a given input and `max_components`.

use serde::Serialize;
use std::f64::consts::PI;
use tracing::debug;

pub const DEFAULT_MAX_COMPONENTS: usize = 8;
/// Lower bound for a cluster variance; keeps single-valued clusters finite.
pub const VARIANCE_FLOOR: f64 = 0.001;
/// Below this many points every item is its own tier (or the only one).
pub const MIN_POINTS_FOR_SELECTION: usize = 4;

/// BIC per candidate (`bic[k - 1]`) and the winner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSelection {
    pub chosen_k: usize,
    pub bic: Vec<f64>,
}

/// Tier per input position plus bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tiering {
    /// 1 = best. Aligned with the grades passed in.
    pub tiers: Vec<u32>,
    /// Components picked by model selection (equal to the item count for 2–3 items).
    pub chosen_k: usize,
    /// Distinct tiers actually used; tiers are `1..=tier_count`.
    pub tier_count: usize,
}

/// `min + (max - min)·(i + 0.5)/k` for `i` in `0..k`.
pub fn seed_centroids(data: &[f64], k: usize) -> Vec<f64> {
    let (min, max) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    if k == 0 || data.is_empty() {
        return Vec::new();
    }
    (0..k)
        .map(|i| min + (max - min) * (i as f64 + 0.5) / k as f64)
        .collect()
}

/// Nearest centroid per point; the lower index wins on equal distance.
pub fn assign_nearest(data: &[f64], centroids: &[f64]) -> Vec<usize> {
    data.iter()
        .map(|&x| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (i, &c) in centroids.iter().enumerate() {
                let d = (x - c).abs();
                if d < best_dist {
                    best_dist = d;
                    best = i;
                }
            }
            best
        })
        .collect()
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Gaussian log-likelihood of one cluster under its own mean and (floored) variance.
fn cluster_log_likelihood(points: &[f64]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let m = points.len() as f64;
    let mu = mean(points);
    let ss: f64 = points.iter().map(|x| (x - mu).powi(2)).sum();
    let var = (ss / m).max(VARIANCE_FLOOR);
    -m * 0.5 * (2.0 * PI * var).ln() - ss / (2.0 * var)
}

fn group(data: &[f64], labels: &[usize], k: usize) -> Vec<Vec<f64>> {
    let mut clusters = vec![Vec::new(); k];
    for (&x, &l) in data.iter().zip(labels) {
        if let Some(c) = clusters.get_mut(l) {
            c.push(x);
        }
    }
    clusters
}

/// `-2·LL + k·ln(n)`; empty clusters add nothing to the likelihood but still count in `k`.
pub fn bic(data: &[f64], labels: &[usize], k: usize) -> f64 {
    let n = data.len() as f64;
    let ll: f64 = group(data, labels, k)
        .iter()
        .map(|c| cluster_log_likelihood(c))
        .sum();
    -2.0 * ll + k as f64 * n.ln()
}

/// 1-based position of the smallest BIC; the lowest `k` wins ties.
fn lowest_bic_k(bic: &[f64]) -> usize {
    let mut chosen_k = 1;
    let mut best = f64::INFINITY;
    for (i, &b) in bic.iter().enumerate() {
        if b < best {
            best = b;
            chosen_k = i + 1;
        }
    }
    chosen_k
}

/// Evaluate `k = 1..=min(max_components, n - 1)` and keep the lowest BIC.
pub fn select_components(grades: &[f64], max_components: usize) -> ModelSelection {
    let mut sorted = grades.to_vec();
    sorted.sort_by(f64::total_cmp);

    let k_max = max_components.max(1).min(sorted.len().saturating_sub(1)).max(1);
    let bic: Vec<f64> = (1..=k_max)
        .map(|k| {
            let centroids = seed_centroids(&sorted, k);
            let labels = assign_nearest(&sorted, &centroids);
            self::bic(&sorted, &labels, k)
        })
        .collect();

    let chosen_k = lowest_bic_k(&bic);

    debug!(n = grades.len(), chosen_k, ?bic, "tier count selected");
    ModelSelection { chosen_k, bic }
}

/// Tier grades already sorted best-first.
pub fn tier_sorted(grades_desc: &[f64], max_components: usize) -> Tiering {
    debug_assert!(
        grades_desc.windows(2).all(|w| w[0] >= w[1]),
        "grades must be sorted descending"
    );
    let n = grades_desc.len();

    if n <= 1 {
        return Tiering {
            tiers: vec![1; n],
            chosen_k: 1,
            tier_count: 1,
        };
    }
    if n < MIN_POINTS_FOR_SELECTION {
        return Tiering {
            tiers: (1..=n as u32).collect(),
            chosen_k: n,
            tier_count: n,
        };
    }

    let selection = select_components(grades_desc, max_components);
    let centroids = seed_centroids(grades_desc, selection.chosen_k);
    let labels = assign_nearest(grades_desc, &centroids);

    let mut used: Vec<(usize, f64)> = group(grades_desc, &labels, selection.chosen_k)
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_empty())
        .map(|(label, c)| (label, mean(c)))
        .collect();
    used.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut rank_of = vec![0u32; selection.chosen_k];
    for (rank, (label, _)) in used.iter().enumerate() {
        rank_of[*label] = rank as u32 + 1;
    }

    Tiering {
        tiers: labels.iter().map(|&l| rank_of[l]).collect(),
        chosen_k: selection.chosen_k,
        tier_count: used.len(),
    }
}

/// Tier grades in any order; the result stays aligned with the input.
pub fn tier_grades(grades: &[f64], max_components: usize) -> Tiering {
    let mut order: Vec<usize> = (0..grades.len()).collect();
    order.sort_by(|&a, &b| grades[b].total_cmp(&grades[a]));
    let sorted: Vec<f64> = order.iter().map(|&i| grades[i]).collect();

    let t = tier_sorted(&sorted, max_components);
    let mut tiers = vec![0u32; grades.len()];
    for (pos, &i) in order.iter().enumerate() {
        tiers[i] = t.tiers[pos];
    }
    Tiering { tiers, ..t }
}

/// Mean grade per tier, index 0 = tier 1.
pub fn tier_means(grades: &[f64], tiers: &[u32]) -> Vec<f64> {
    let count = tiers.iter().copied().max().unwrap_or(0) as usize;
    let mut sums = vec![(0.0, 0usize); count];
    for (&g, &t) in grades.iter().zip(tiers) {
        if let Some(slot) = (t as usize).checked_sub(1).and_then(|i| sums.get_mut(i)) {
            slot.0 += g;
            slot.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(s, c)| if c == 0 { f64::NAN } else { s / c as f64 })
        .collect()
}
