// src/error.rs
//! Library error type. Application edges (config loading, binaries) use `anyhow`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RankingError {
    /// One or more of the cost/quality/deadline Z-score columns could not be resolved.
    #[error("z-score table must have cost, quality and deadline columns (missing: {})", .missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },

    #[error("invalid weights: {0}")]
    InvalidWeights(String),
}

pub type Result<T> = std::result::Result<T, RankingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_lists_fields() {
        let e = RankingError::MissingColumns {
            missing: vec!["cost", "deadline"],
        };
        assert_eq!(
            e.to_string(),
            "z-score table must have cost, quality and deadline columns (missing: cost, deadline)"
        );
    }
}
