//! # Weighted Score Engine
//!
//! Per row, a fixed-sign linear combination of three standardized inputs:
//!
//! `Z = -r·zc + g·zq - b·zp`
//!
//! Cost and deadline are penalized, quality is rewarded. When standard errors are
//! supplied the error of `Z` is propagated either under independence or with the
//! full covariance correction. Inputs are taken as already standardized; no
//! standardization happens here.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{RankingError, Result};
use crate::ingest::CanonicalRow;

/// Standard errors above this are reported as suspicious (likely a parsing slip).
pub const DEFAULT_ERROR_WARN_THRESHOLD: f64 = 100.0;

/// Relative importance of cost (`r`), quality (`g`) and deadline (`b`).
///
/// Callers should pass weights that sum to 1; the engine itself does not enforce it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub cost: f64,
    pub quality: f64,
    pub deadline: f64,
}

impl Weights {
    pub fn new(cost: f64, quality: f64, deadline: f64) -> Self {
        Self {
            cost,
            quality,
            deadline,
        }
    }

    /// One third each.
    pub fn equal() -> Self {
        let w = 1.0 / 3.0;
        Self::new(w, w, w)
    }

    pub fn sum(&self) -> f64 {
        self.cost + self.quality + self.deadline
    }

    /// Reject negative or non-finite components.
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("cost", self.cost),
            ("quality", self.quality),
            ("deadline", self.deadline),
        ] {
            if !v.is_finite() {
                return Err(RankingError::InvalidWeights(format!("{name} is not finite")));
            }
            if v < 0.0 {
                return Err(RankingError::InvalidWeights(format!(
                    "{name} must be >= 0 (got {v})"
                )));
            }
        }
        Ok(())
    }

    /// Validate, then rescale so the components sum to 1.
    pub fn normalized(&self) -> Result<Self> {
        self.validate()?;
        let s = self.sum();
        if s <= 0.0 {
            return Err(RankingError::InvalidWeights(
                "weights sum to zero".to_string(),
            ));
        }
        Ok(Self::new(self.cost / s, self.quality / s, self.deadline / s))
    }
}

/// Standard errors of the three standardized inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StdErrors {
    pub cost: f64,
    pub quality: f64,
    pub deadline: f64,
}

impl StdErrors {
    fn max(&self) -> f64 {
        self.cost.max(self.quality).max(self.deadline)
    }
}

/// Pairwise covariances: Cov(C,Q), Cov(C,P), Cov(Q,P).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Covariances {
    pub cost_quality: f64,
    pub cost_deadline: f64,
    pub quality_deadline: f64,
}

/// Canonical numeric inputs of one row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub z_cost: f64,
    pub z_quality: f64,
    pub z_deadline: f64,
    #[serde(default)]
    pub errors: Option<StdErrors>,
    #[serde(default)]
    pub covariances: Option<Covariances>,
}

impl ScoreInputs {
    pub fn new(z_cost: f64, z_quality: f64, z_deadline: f64) -> Self {
        Self {
            z_cost,
            z_quality,
            z_deadline,
            errors: None,
            covariances: None,
        }
    }

    pub fn with_errors(mut self, cost: f64, quality: f64, deadline: f64) -> Self {
        self.errors = Some(StdErrors {
            cost,
            quality,
            deadline,
        });
        self
    }

    pub fn with_covariances(mut self, cq: f64, cp: f64, qp: f64) -> Self {
        self.covariances = Some(Covariances {
            cost_quality: cq,
            cost_deadline: cp,
            quality_deadline: qp,
        });
        self
    }
}

/// `-r·zc + g·zq - b·zp`
pub fn raw_combination(inputs: &ScoreInputs, w: &Weights) -> f64 {
    -w.cost * inputs.z_cost + w.quality * inputs.z_quality - w.deadline * inputs.z_deadline
}

/// Standard error of the combination; 0 without standard errors.
///
/// With covariances the variance gains `2·(-r·g·Cov(C,Q) + r·b·Cov(C,P) - g·b·Cov(Q,P))`
/// and a negative radicand is floored at 0.
pub fn propagated_error(inputs: &ScoreInputs, w: &Weights) -> f64 {
    let Some(s) = inputs.errors else {
        return 0.0;
    };

    let independent = (w.cost * s.cost).powi(2)
        + (w.quality * s.quality).powi(2)
        + (w.deadline * s.deadline).powi(2);

    let variance = match inputs.covariances {
        None => independent,
        Some(c) => {
            let correction = 2.0
                * (-w.cost * w.quality * c.cost_quality + w.cost * w.deadline * c.cost_deadline
                    - w.quality * w.deadline * c.quality_deadline);
            (independent + correction).max(0.0)
        }
    };
    variance.sqrt()
}

/// Unrescaled result for one row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawScore {
    pub index: usize,
    pub raw_combination: f64,
    pub propagated_error: f64,
    /// A standard error exceeded the warn threshold.
    pub flagged: bool,
}

/// Score every canonical row. Suspicious standard errors are logged and flagged,
/// never rejected.
pub fn score_rows(rows: &[CanonicalRow], w: &Weights, warn_threshold: f64) -> Vec<RawScore> {
    rows.iter()
        .map(|row| {
            let inputs = &row.inputs;
            let suspicious = inputs.errors.filter(|s| s.max() > warn_threshold);
            if let Some(s) = suspicious {
                warn!(
                    row = row.index + 1,
                    s_cost = s.cost,
                    s_quality = s.quality,
                    s_deadline = s.deadline,
                    r = w.cost,
                    g = w.quality,
                    b = w.deadline,
                    threshold = warn_threshold,
                    "standard errors look too large; check the source table"
                );
            }
            RawScore {
                index: row.index,
                raw_combination: raw_combination(inputs, w),
                propagated_error: propagated_error(inputs, w),
                flagged: suspicious.is_some(),
            }
        })
        .collect()
}
