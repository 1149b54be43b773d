// src/config/mod.rs
pub mod ranker;

pub use ranker::{
    RankerConfig, DEFAULT_CONFIG_JSON, DEFAULT_CONFIG_TOML, ENV_CONFIG_PATH,
    ENV_ERROR_WARN_THRESHOLD, ENV_MAX_TIERS,
};
