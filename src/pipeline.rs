//! # Ranking Pipeline
//! Pure, synchronous run: canonical rows + weights → `Ranking`.
//! No I/O and no shared state; each call builds a fresh result.
//!
//! Order:
//! 1) resolve columns once and coerce cells (`ingest`)
//! 2) weighted combination + propagated error (`scoring`)
//! 3) shared precision, 0–10 grades, rounding (`rescale`)
//! 4) sort best-first, BIC tiering (`cluster`)

use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::cluster::{self, DEFAULT_MAX_COMPONENTS};
use crate::error::Result;
use crate::ingest::{canonicalize, CanonicalRow, FieldAliases, RowTable};
use crate::ranking::{PodiumEntry, Ranking, ScoredItem, SolutionView, TierSummary};
use crate::rescale::{grade_error_for, grade_for, round_to, shared_decimals};
use crate::scoring::{score_rows, Weights, DEFAULT_ERROR_WARN_THRESHOLD};
use crate::taxonomy::SolutionLabel;
use crate::tiers::TierNames;

/// Podium shows this many tiers.
pub const PODIUM_PLACES: usize = 3;

/// Knobs of one run (usually taken from `RankerConfig`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankOptions {
    pub max_components: usize,
    pub error_warn_threshold: f64,
    pub aliases: FieldAliases,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            max_components: DEFAULT_MAX_COMPONENTS,
            error_warn_threshold: DEFAULT_ERROR_WARN_THRESHOLD,
            aliases: FieldAliases::default(),
        }
    }
}

/// Resolve columns and rank. Fails only when a Z-score column is missing.
pub fn rank_table(table: &RowTable, weights: &Weights, opts: &RankOptions) -> Result<Ranking> {
    let (_columns, rows) = canonicalize(table, &opts.aliases)?;
    Ok(rank_rows(&rows, weights, opts))
}

/// Best first: grade, then raw combination, then source order.
fn best_first(a: &ScoredItem, b: &ScoredItem) -> Ordering {
    b.grade
        .total_cmp(&a.grade)
        .then_with(|| b.raw_combination.total_cmp(&a.raw_combination))
        .then_with(|| a.index.cmp(&b.index))
}

pub fn rank_rows(rows: &[CanonicalRow], weights: &Weights, opts: &RankOptions) -> Ranking {
    let raw = score_rows(rows, weights, opts.error_warn_threshold);
    let decimals = shared_decimals(raw.iter().map(|r| r.propagated_error));

    let mut items: Vec<ScoredItem> = raw
        .iter()
        .map(|r| ScoredItem {
            index: r.index,
            raw_combination: r.raw_combination,
            propagated_error: r.propagated_error,
            grade: round_to(grade_for(r.raw_combination), decimals),
            grade_error: round_to(grade_error_for(r.propagated_error), decimals),
            tier: 0,
        })
        .collect();
    items.sort_by(best_first);

    let grades: Vec<f64> = items.iter().map(|it| it.grade).collect();
    let tiering = cluster::tier_sorted(&grades, opts.max_components);
    for (it, tier) in items.iter_mut().zip(&tiering.tiers) {
        it.tier = *tier;
    }

    let flagged_rows: Vec<usize> = raw.iter().filter(|r| r.flagged).map(|r| r.index).collect();

    counter!("ranking_runs_total").increment(1);
    counter!("ranking_items_total").increment(items.len() as u64);
    counter!("ranking_flagged_rows_total").increment(flagged_rows.len() as u64);
    gauge!("ranking_tier_count").set(tiering.tier_count as f64);

    Ranking {
        items,
        decimals,
        tier_count: tiering.tier_count,
        chosen_components: tiering.chosen_k,
        flagged_rows,
        weights: *weights,
    }
}

/// Size and grade spread per tier, tier 1 first.
pub fn tier_summaries(ranking: &Ranking, names: &TierNames) -> Vec<TierSummary> {
    let mut out: Vec<TierSummary> = Vec::new();
    // items are best-first, so each tier's first item is its best
    for it in &ranking.items {
        match out.iter_mut().find(|s| s.tier == it.tier) {
            Some(s) => {
                s.mean_grade += it.grade;
                s.size += 1;
                s.worst_grade = s.worst_grade.min(it.grade);
            }
            None => out.push(TierSummary {
                tier: it.tier,
                name: names.name_for(it.tier),
                size: 1,
                mean_grade: it.grade,
                best_grade: it.grade,
                worst_grade: it.grade,
            }),
        }
    }
    for s in &mut out {
        s.mean_grade /= s.size as f64;
    }
    out.sort_by_key(|s| s.tier);
    out
}

/// Join labels (by source-row index) and tier names onto the ranked items.
pub fn solution_views(ranking: &Ranking, labels: &[SolutionLabel], names: &TierNames) -> Vec<SolutionView> {
    ranking
        .items
        .iter()
        .map(|it| {
            let label = labels
                .get(it.index)
                .cloned()
                .unwrap_or_else(|| SolutionLabel::fallback(it.index));
            SolutionView {
                item: *it,
                tier_name: names.name_for(it.tier),
                name: label.name,
                coord: label.coord,
            }
        })
        .collect()
}

/// Tiers ordered by their best grade, first `places`, each with its best member.
pub fn podium(views: &[SolutionView], places: usize) -> Vec<PodiumEntry> {
    let mut groups: Vec<(u32, &SolutionView, usize)> = Vec::new();
    for v in views {
        match groups.iter_mut().find(|(t, _, _)| *t == v.item.tier) {
            Some((_, best, count)) => {
                *count += 1;
                if v.item.grade > best.item.grade {
                    *best = v;
                }
            }
            None => groups.push((v.item.tier, v, 1)),
        }
    }
    groups.sort_by(|a, b| b.1.item.grade.total_cmp(&a.1.item.grade).then(a.0.cmp(&b.0)));

    groups
        .into_iter()
        .take(places)
        .enumerate()
        .map(|(i, (tier, best, members))| PodiumEntry {
            place: i + 1,
            tier,
            tier_name: best.tier_name.clone(),
            best: best.clone(),
            members,
        })
        .collect()
}
