//! Result shapes handed to every consumer (table, podium, plot, tree).
//!
//! A `Ranking` is an immutable value: re-running with new weights builds a new one.
//! Field names serialize in camelCase, which is the contract the UI reads.

use serde::{Deserialize, Serialize};

use crate::scoring::Weights;

/// One ranked alternative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredItem {
    /// Zero-based source-row position.
    pub index: usize,
    /// `-r·zc + g·zq - b·zp`
    pub raw_combination: f64,
    /// Standard error of the combination; 0 without error columns.
    pub propagated_error: f64,
    /// 0–10, rounded to the ranking's `decimals`.
    pub grade: f64,
    /// Error on the grade scale, rounded to the ranking's `decimals`.
    pub grade_error: f64,
    /// 1 = best.
    pub tier: u32,
}

/// Complete output of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    /// Sorted by grade, best first.
    pub items: Vec<ScoredItem>,
    /// Shared display precision for grade and grade error.
    pub decimals: u32,
    /// Distinct tiers in use.
    pub tier_count: usize,
    /// Components picked by model selection.
    pub chosen_components: usize,
    /// Source rows whose standard errors exceeded the warn threshold.
    pub flagged_rows: Vec<usize>,
    pub weights: Weights,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Item by source-row index.
    pub fn by_index(&self, index: usize) -> Option<&ScoredItem> {
        self.items.iter().find(|it| it.index == index)
    }

    /// Value formatted with the shared precision.
    pub fn format(&self, value: f64) -> String {
        format!("{:.*}", self.decimals as usize, value)
    }
}

/// Aggregate per tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSummary {
    pub tier: u32,
    pub name: String,
    pub size: usize,
    pub mean_grade: f64,
    pub best_grade: f64,
    pub worst_grade: f64,
}

/// Scored item joined with its display label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionView {
    #[serde(flatten)]
    pub item: ScoredItem,
    pub tier_name: String,
    pub name: String,
    /// Normalized coordinate text (`III.1.a`), empty when the row had none.
    pub coord: String,
}

/// One podium step: a tier and its best member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodiumEntry {
    pub place: usize,
    pub tier: u32,
    pub tier_name: String,
    pub best: SolutionView,
    pub members: usize,
}
