// src/ingest/columns.rs
//! Header resolution: ordered alias lists per semantic field, resolved once into
//! a `ColumnMap`, then applied to every row to build canonical inputs.
//!
//! Matching is case-insensitive, ignores whitespace, and accepts substrings
//! ("ZCusto (padronizado)" matches `zcusto`). Error and covariance columns are
//! claimed first so a value alias never lands on them (`s_zcusto` contains `zcusto`).

use serde::{Deserialize, Serialize};

use super::{coerce_cell, RowTable};
use crate::error::{RankingError, Result};
use crate::scoring::{Covariances, ScoreInputs, StdErrors};

/// Accepted header aliases per field, in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldAliases {
    pub cost: Vec<String>,
    pub quality: Vec<String>,
    pub deadline: Vec<String>,
    pub cost_error: Vec<String>,
    pub quality_error: Vec<String>,
    pub deadline_error: Vec<String>,
    /// Marker looked for in the trailing three columns.
    pub covariance_marker: String,
}

impl Default for FieldAliases {
    fn default() -> Self {
        fn list(xs: &[&str]) -> Vec<String> {
            xs.iter().map(|s| s.to_string()).collect()
        }
        Self {
            cost: list(&["zcusto", "zcost"]),
            quality: list(&["zqual"]),
            deadline: list(&["zprazo", "zdeadline"]),
            cost_error: list(&["s_zcusto", "szcusto", "s_zcost"]),
            quality_error: list(&["s_zqual", "szqual"]),
            deadline_error: list(&["s_zprazo", "szprazo", "s_zdeadline"]),
            covariance_marker: "cov".to_string(),
        }
    }
}

/// Header names resolved for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    pub cost: String,
    pub quality: String,
    pub deadline: String,
    /// `[cost, quality, deadline]`; present only when all three resolve.
    pub errors: Option<[String; 3]>,
    /// `[cov(C,Q), cov(C,P), cov(Q,P)]`: the last three header columns.
    pub covariances: Option<[String; 3]>,
}

/// One input row after alias resolution and numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalRow {
    pub index: usize,
    pub inputs: ScoreInputs,
}

fn norm(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// First header containing `key` (after lowercasing and dropping whitespace).
pub fn header_like<'a>(header: &'a [String], key: &str) -> Option<&'a String> {
    let k = norm(key);
    header.iter().find(|h| norm(h).contains(&k))
}

fn resolve_field<'a>(header: &'a [String], aliases: &[String], taken: &[&str]) -> Option<&'a String> {
    aliases.iter().find_map(|alias| {
        let k = norm(alias);
        header
            .iter()
            .find(|h| !taken.contains(&h.as_str()) && norm(h).contains(&k))
    })
}

impl ColumnMap {
    pub fn resolve(header: &[String], aliases: &FieldAliases) -> Result<Self> {
        // Only trailing columns that carry the marker themselves are kept away
        // from error/value matching.
        let mut taken: Vec<&str> = trailing(header)
            .into_iter()
            .flatten()
            .filter(|h| marked(h, &aliases.covariance_marker))
            .map(String::as_str)
            .collect();

        let sc = resolve_field(header, &aliases.cost_error, &taken);
        let sq = resolve_field(header, &aliases.quality_error, &taken);
        let sp = resolve_field(header, &aliases.deadline_error, &taken);
        let errors = match (sc, sq, sp) {
            (Some(c), Some(q), Some(p)) => Some([c.clone(), q.clone(), p.clone()]),
            _ => None,
        };
        // Partially present error columns are still kept away from value aliases.
        taken.extend([sc, sq, sp].into_iter().flatten().map(String::as_str));

        let cost = resolve_field(header, &aliases.cost, &taken);
        let quality = resolve_field(header, &aliases.quality, &taken);
        let deadline = resolve_field(header, &aliases.deadline, &taken);

        match (cost, quality, deadline) {
            (Some(c), Some(q), Some(p)) => Ok(Self {
                covariances: errors
                    .as_ref()
                    .and_then(|_| trailing_covariances(header, &aliases.covariance_marker, &taken))
                    .filter(|cov| ![c, q, p].iter().any(|v| cov.contains(*v))),
                cost: c.clone(),
                quality: q.clone(),
                deadline: p.clone(),
                errors,
            }),
            (c, q, p) => {
                let missing = [("cost", c), ("quality", q), ("deadline", p)]
                    .into_iter()
                    .filter(|(_, col)| col.is_none())
                    .map(|(name, _)| name)
                    .collect();
                Err(RankingError::MissingColumns { missing })
            }
        }
    }

    fn inputs_for(&self, table: &RowTable, row: usize) -> ScoreInputs {
        let num = |col: &str| coerce_cell(table.cell(row, col));

        let mut inputs = ScoreInputs::new(num(&self.cost), num(&self.quality), num(&self.deadline));
        if let Some([c, q, p]) = &self.errors {
            inputs.errors = Some(StdErrors {
                cost: num(c),
                quality: num(q),
                deadline: num(p),
            });
        }
        if let Some([cq, cp, qp]) = &self.covariances {
            inputs.covariances = Some(Covariances {
                cost_quality: num(cq),
                cost_deadline: num(cp),
                quality_deadline: num(qp),
            });
        }
        inputs
    }
}

fn trailing(header: &[String]) -> Option<[&String; 3]> {
    match header {
        [.., a, b, c] => Some([a, b, c]),
        _ => None,
    }
}

fn marked(h: &str, marker: &str) -> bool {
    norm(h).contains(&norm(marker))
}

/// The last three columns, in `(cq, cp, qp)` order, when one of them carries the
/// marker and none of them is an error column.
fn trailing_covariances(header: &[String], marker: &str, taken: &[&str]) -> Option<[String; 3]> {
    let cols = trailing(header)?;
    if !cols.iter().any(|h| marked(h, marker)) {
        return None;
    }
    let claimed_elsewhere = cols
        .iter()
        .any(|h| taken.contains(&h.as_str()) && !marked(h, marker));
    (!claimed_elsewhere).then(|| cols.map(|h| h.clone()))
}

/// Resolve columns once, then coerce every row into canonical inputs.
pub fn canonicalize(table: &RowTable, aliases: &FieldAliases) -> Result<(ColumnMap, Vec<CanonicalRow>)> {
    let map = ColumnMap::resolve(&table.header, aliases)?;
    let rows = (0..table.len())
        .map(|index| CanonicalRow {
            index,
            inputs: map.inputs_for(table, index),
        })
        .collect();
    Ok((map, rows))
}
