// src/ingest/mod.rs
//! Input adaptation: delimited text → `RowTable`, textual cells → numbers,
//! header aliases → canonical rows.

pub mod columns;
pub mod csv;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub use columns::{canonicalize, header_like, CanonicalRow, ColumnMap, FieldAliases};
pub use csv::parse_csv;

/// Parsed tabular input: header order plus one `column → cell` map per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowTable {
    pub header: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl RowTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Cell lookup by row position and exact column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }
}

/// Read and parse a delimited file. An unreadable file is an error; an empty one is not.
pub fn load_table_from(path: &Path) -> Result<RowTable> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading table from {}", path.display()))?;
    Ok(parse_csv(&content))
}

/// Lenient numeric coercion. Never fails: anything without a leading number is 0.
///
/// Quotes are stripped and every `,` becomes `.` (decimal-comma exports), then the
/// longest leading decimal literal is parsed. Non-finite results also map to 0.
pub fn coerce_num(raw: &str) -> f64 {
    static RE_NUM: OnceCell<Regex> = OnceCell::new();
    let re = RE_NUM.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("numeric prefix regex")
    });

    let cleaned = raw.replace('"', "").replace(',', ".");
    let cleaned = cleaned.trim_start();
    if cleaned.is_empty() {
        return 0.0;
    }
    re.find(cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// `coerce_num` over an optional cell.
pub fn coerce_cell(cell: Option<&str>) -> f64 {
    cell.map(coerce_num).unwrap_or(0.0)
}
