use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::config::RankerConfig;
use crate::error::RankingError;
use crate::ingest::{load_table_from, RowTable};
use crate::pipeline::{podium, rank_table, solution_views, tier_summaries, PODIUM_PLACES};
use crate::ranking::{PodiumEntry, Ranking, SolutionView, TierSummary};
use crate::scoring::Weights;
use crate::taxonomy::{build_tree, label_rows, SolutionLabel, TaxonomyTree};

/// Tables loaded once at boot and served read-only.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub zscores: RowTable,
    pub names: RowTable,
}

impl Dataset {
    /// Z-score table is required; a missing names table only costs the labels.
    pub fn load(cfg: &RankerConfig) -> anyhow::Result<Self> {
        let zscores = load_table_from(&cfg.zscores_path)?;
        let names = match load_table_from(&cfg.names_path) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "names table unavailable; using fallback labels");
                RowTable::default()
            }
        };
        info!(rows = zscores.len(), names = names.len(), "dataset loaded");
        Ok(Self { zscores, names })
    }
}

#[derive(Clone)]
pub struct AppState {
    config: Arc<RankerConfig>,
    dataset: Arc<Dataset>,
}

impl AppState {
    pub fn new(config: RankerConfig, dataset: Dataset) -> Self {
        Self {
            config: Arc::new(config),
            dataset: Arc::new(dataset),
        }
    }

    pub fn config(&self) -> &RankerConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/rank", post(rank_dataset))
        .route("/rank/table", post(rank_adhoc))
        .route("/tree", post(tree))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Library error mapped onto an HTTP status with a `{error}` body.
pub struct ApiError(RankingError);

impl From<RankingError> for ApiError {
    fn from(e: RankingError) -> Self {
        Self(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            RankingError::MissingColumns { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            RankingError::InvalidWeights(_) => StatusCode::BAD_REQUEST,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankResponse {
    pub computed_at: DateTime<Utc>,
    pub ranking: Ranking,
    pub tiers: Vec<TierSummary>,
    pub solutions: Vec<SolutionView>,
    pub podium: Vec<PodiumEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RankTableReq {
    pub weights: Weights,
    pub table: RowTable,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeResponse {
    pub computed_at: DateTime<Utc>,
    pub tree: TaxonomyTree,
}

/// Ranking plus its derived views, as served by `/rank`.
pub fn rank_response(cfg: &RankerConfig, ranking: Ranking, labels: &[SolutionLabel]) -> RankResponse {
    let solutions = solution_views(&ranking, labels, &cfg.tier_names);
    RankResponse {
        computed_at: Utc::now(),
        tiers: tier_summaries(&ranking, &cfg.tier_names),
        podium: podium(&solutions, PODIUM_PLACES),
        solutions,
        ranking,
    }
}

fn rank_loaded(state: &AppState, weights: &Weights) -> Result<(Ranking, Vec<SolutionLabel>), ApiError> {
    let weights = weights.normalized()?;
    let cfg = state.config();
    let data = state.dataset();
    let ranking = rank_table(&data.zscores, &weights, &cfg.rank_options())?;
    let labels = label_rows(&data.names, data.zscores.len(), &cfg.labels);
    Ok((ranking, labels))
}

async fn rank_dataset(
    State(state): State<AppState>,
    Json(weights): Json<Weights>,
) -> Result<Json<RankResponse>, ApiError> {
    let (ranking, labels) = rank_loaded(&state, &weights)?;
    Ok(Json(rank_response(state.config(), ranking, &labels)))
}

async fn rank_adhoc(
    State(state): State<AppState>,
    Json(req): Json<RankTableReq>,
) -> Result<Json<RankResponse>, ApiError> {
    let weights = req.weights.normalized()?;
    let cfg = state.config();
    let ranking = rank_table(&req.table, &weights, &cfg.rank_options())?;
    Ok(Json(rank_response(cfg, ranking, &[])))
}

async fn tree(
    State(state): State<AppState>,
    Json(weights): Json<Weights>,
) -> Result<Json<TreeResponse>, ApiError> {
    let (ranking, labels) = rank_loaded(&state, &weights)?;
    let views = solution_views(&ranking, &labels, &state.config().tier_names);
    Ok(Json(TreeResponse {
        computed_at: Utc::now(),
        tree: build_tree(&views, ranking.decimals),
    }))
}
