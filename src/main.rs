//! Tradeoff Ranker Service: binary entrypoint
//! Boots the Axum HTTP server: config, dataset, metrics and routes.
//!
//! See `README.md` for quickstart.

use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tradeoff_ranker::api::{self, AppState, Dataset};
use tradeoff_ranker::config::RankerConfig;
use tradeoff_ranker::metrics::Metrics;

/// Compact logs by default, JSON lines with `RANKER_LOG_JSON=1`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tradeoff_ranker=info,warn"));

    let json = std::env::var("RANKER_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    // try_init: the runtime may already have installed a subscriber
    let _ = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = RankerConfig::load_default()?;
    info!(
        max_components = config.max_components,
        tiers = config.tier_names.len(),
        "ranker config loaded"
    );

    let dataset = Dataset::load(&config).unwrap_or_else(|e| {
        warn!(error = %e, "no dataset loaded; /rank and /tree will answer 422");
        Dataset::default()
    });

    let metrics = Metrics::init()?;
    let router = api::create_router(AppState::new(config, dataset)).merge(metrics.router());

    Ok(router.into())
}
