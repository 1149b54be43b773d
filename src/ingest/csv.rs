// src/ingest/csv.rs
//! Minimal delimited-text reader for spreadsheet exports.
//!
//! Separator: `;` when the text has semicolons and no commas, `,` otherwise.
//! Double quotes toggle quoting; `""` inside quotes is a literal quote.

use std::collections::BTreeMap;

use super::RowTable;

pub fn parse_csv(text: &str) -> RowTable {
    let sep = if text.contains(';') && !text.contains(',') {
        ';'
    } else {
        ','
    };

    let normalized = text.replace('\r', "");
    let mut lines = normalized.split('\n').filter(|l| !l.trim().is_empty());

    let Some(first) = lines.next() else {
        return RowTable::default();
    };
    let header = parse_line(first, sep);

    let rows = lines
        .map(|line| {
            let cols = parse_line(line, sep);
            header
                .iter()
                .enumerate()
                .map(|(j, h)| (h.clone(), cols.get(j).cloned().unwrap_or_default()))
                .collect::<BTreeMap<_, _>>()
        })
        .collect();

    RowTable { header, rows }
}

fn parse_line(line: &str, sep: char) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == sep && !in_quotes {
            out.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    out.push(current.trim().to_string());
    out
}
