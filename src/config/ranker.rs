// src/config/ranker.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

use crate::cluster::DEFAULT_MAX_COMPONENTS;
use crate::ingest::FieldAliases;
use crate::pipeline::RankOptions;
use crate::scoring::DEFAULT_ERROR_WARN_THRESHOLD;
use crate::taxonomy::LabelAliases;
use crate::tiers::TierNames;

pub const ENV_CONFIG_PATH: &str = "RANKER_CONFIG_PATH";
pub const ENV_MAX_TIERS: &str = "RANKER_MAX_TIERS";
pub const ENV_ERROR_WARN_THRESHOLD: &str = "RANKER_ERROR_WARN_THRESHOLD";

pub const DEFAULT_CONFIG_TOML: &str = "config/ranker.toml";
pub const DEFAULT_CONFIG_JSON: &str = "config/ranker.json";

fn default_zscores_path() -> PathBuf {
    PathBuf::from("data/zscores.csv")
}
fn default_names_path() -> PathBuf {
    PathBuf::from("data/names.csv")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Upper bound for the number of tiers tried by model selection.
    pub max_components: usize,
    /// Standard errors above this are logged and flagged.
    pub error_warn_threshold: f64,
    /// Tier labels, best first.
    pub tier_names: TierNames,
    /// Header aliases of the Z-score table.
    pub columns: FieldAliases,
    /// Header aliases of the names table.
    pub labels: LabelAliases,
    /// Z-score table served by the HTTP API.
    pub zscores_path: PathBuf,
    /// Names/coordinates table joined by row position.
    pub names_path: PathBuf,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            max_components: DEFAULT_MAX_COMPONENTS,
            error_warn_threshold: DEFAULT_ERROR_WARN_THRESHOLD,
            tier_names: TierNames::default(),
            columns: FieldAliases::default(),
            labels: LabelAliases::default(),
            zscores_path: default_zscores_path(),
            names_path: default_names_path(),
        }
    }
}

impl RankerConfig {
    /// Load from an explicit path. Supports TOML or JSON formats.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading ranker config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing ranker config {}", path.display()))?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $RANKER_CONFIG_PATH
    /// 2) config/ranker.toml
    /// 3) config/ranker.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_CONFIG_TOML).exists() {
            Self::load_from(Path::new(DEFAULT_CONFIG_TOML))?
        } else if Path::new(DEFAULT_CONFIG_JSON).exists() {
            Self::load_from(Path::new(DEFAULT_CONFIG_JSON))?
        } else {
            Self::default()
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// `RANKER_MAX_TIERS` / `RANKER_ERROR_WARN_THRESHOLD`; unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(k) = parse_env::<usize>(std::env::var(ENV_MAX_TIERS).ok()) {
            self.max_components = k;
        }
        if let Some(t) = parse_env::<f64>(std::env::var(ENV_ERROR_WARN_THRESHOLD).ok()) {
            self.error_warn_threshold = t;
        }
        self.sanitize();
    }

    fn sanitize(&mut self) {
        if self.max_components == 0 {
            warn!("max_components must be >= 1; using {DEFAULT_MAX_COMPONENTS}");
            self.max_components = DEFAULT_MAX_COMPONENTS;
        }
        if !(self.error_warn_threshold.is_finite() && self.error_warn_threshold > 0.0) {
            self.error_warn_threshold = DEFAULT_ERROR_WARN_THRESHOLD;
        }
        if self.tier_names.is_empty() {
            self.tier_names = TierNames::default();
        }
    }

    pub fn rank_options(&self) -> RankOptions {
        RankOptions {
            max_components: self.max_components,
            error_warn_threshold: self.error_warn_threshold,
            aliases: self.columns.clone(),
        }
    }
}

fn parse_env<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|s| s.trim().parse::<T>().ok())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<RankerConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if let Ok(cfg) = toml::from_str::<RankerConfig>(s) {
                return Ok(cfg);
            }
            serde_json::from_str(s).map_err(|e| anyhow!("unsupported ranker config format: {e}"))
        }
    }
}
