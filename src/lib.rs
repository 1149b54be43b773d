// src/lib.rs
// Public library surface for the service, the CLI and integration tests.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;

// Ranking pipeline (ingest, scoring, rescale, cluster, tiers, presentation data)
pub mod cluster;
pub mod ingest;
pub mod pipeline;
pub mod ranking;
pub mod rescale;
pub mod scoring;
pub mod taxonomy;
pub mod tiers;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::error::{RankingError, Result};
pub use crate::pipeline::{rank_rows, rank_table, RankOptions};
pub use crate::ranking::{Ranking, ScoredItem};
pub use crate::scoring::{ScoreInputs, Weights};

use std::path::Path;

/// Load a Z-score file and rank it with the given config.
///
/// ```ignore
/// let cfg = tradeoff_ranker::config::RankerConfig::load_default()?;
/// let r = tradeoff_ranker::rank_file("data/zscores.csv", &Weights::equal(), &cfg)?;
/// println!("{} items in {} tiers", r.len(), r.tier_count);
/// ```
pub fn rank_file(
    path: impl AsRef<Path>,
    weights: &Weights,
    cfg: &config::RankerConfig,
) -> anyhow::Result<Ranking> {
    let table = ingest::load_table_from(path.as_ref())?;
    Ok(rank_table(&table, weights, &cfg.rank_options())?)
}
