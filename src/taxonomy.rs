//! # Taxonomy
//!
//! Solutions carry a hierarchical coordinate like `III.2.b`: a Roman-numeral
//! primary class, a numeric secondary class and an optional letter. This module
//! joins display names and coordinates onto ranked rows and groups them into a
//! primary → secondary → leaf tree.
//!
//! Coordinates arrive in loose spellings (`iii-2`, `III.1a`); they are normalized
//! before parsing and rows without a parseable coordinate are left out of the tree.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::ingest::{header_like, RowTable};
use crate::ranking::SolutionView;

/// Parsed coordinate. `tertiary` is empty for two-level coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub primary: String,
    pub secondary: u32,
    pub tertiary: String,
}

impl Coord {
    pub fn primary_value(&self) -> u32 {
        roman_to_int(&self.primary)
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.primary_value()
            .cmp(&other.primary_value())
            .then_with(|| self.secondary.cmp(&other.secondary))
            .then_with(|| self.tertiary.cmp(&other.tertiary))
            .then_with(|| self.primary.cmp(&other.primary))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.tertiary.is_empty() {
            write!(f, "{}.{}", self.primary, self.secondary)
        } else {
            write!(f, "{}.{}.{}", self.primary, self.secondary, self.tertiary)
        }
    }
}

/// Subtractive Roman numerals; unknown characters count as 0.
pub fn roman_to_int(s: &str) -> u32 {
    let mut total: i64 = 0;
    let mut prev: i64 = 0;
    for ch in s.chars().rev() {
        let v = match ch.to_ascii_uppercase() {
            'I' => 1,
            'V' => 5,
            'X' => 10,
            'L' => 50,
            'C' => 100,
            'D' => 500,
            'M' => 1000,
            _ => 0,
        };
        if v < prev {
            total -= v;
        } else {
            total += v;
            prev = v;
        }
    }
    total.max(0) as u32
}

/// `III.1a` → `III.1.a` (first occurrence only).
pub fn normalize_coord(s: &str) -> String {
    static RE_SPLIT: OnceCell<Regex> = OnceCell::new();
    let re = RE_SPLIT.get_or_init(|| Regex::new(r"(?i)(\d+)([a-z])").expect("coord split regex"));
    re.replacen(s, 1, "${1}.${2}").into_owned()
}

pub fn parse_coord(s: &str) -> Option<Coord> {
    static RE_COORD: OnceCell<Regex> = OnceCell::new();
    let re = RE_COORD.get_or_init(|| {
        Regex::new(r"(?i)^([IVXLCDM]+)\s*[.\-]\s*(\d+)\s*(?:[.\-]\s*([a-z]))?$")
            .expect("coord regex")
    });

    let caps = re.captures(s.trim())?;
    Some(Coord {
        primary: caps.get(1)?.as_str().to_ascii_uppercase(),
        secondary: caps.get(2)?.as_str().parse().ok()?,
        tertiary: caps
            .get(3)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default(),
    })
}

/// Header aliases for the names table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelAliases {
    pub name: Vec<String>,
    pub coord: Vec<String>,
}

impl Default for LabelAliases {
    fn default() -> Self {
        Self {
            name: vec!["nome".into(), "name".into()],
            coord: vec!["coordenadas".into(), "coordinates".into(), "coord".into()],
        }
    }
}

/// Display label for one source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionLabel {
    pub name: String,
    /// Coordinate as written in the names table.
    pub coord_raw: String,
    /// Normalized coordinate text; `build_tree` parses this form.
    pub coord: String,
}

impl SolutionLabel {
    /// Label used when the names table has no row for this index.
    pub fn fallback(index: usize) -> Self {
        Self {
            name: format!("Sol {}", index + 1),
            coord_raw: String::new(),
            coord: String::new(),
        }
    }
}

/// Labels for source rows `0..count`, matched by row position.
pub fn label_rows(names: &RowTable, count: usize, aliases: &LabelAliases) -> Vec<SolutionLabel> {
    let pick = |keys: &[String]| keys.iter().find_map(|k| header_like(&names.header, k));
    let name_col = pick(&aliases.name).or_else(|| names.header.first());
    let coord_col = pick(&aliases.coord);

    (0..count)
        .map(|i| {
            let Some(row) = names.rows.get(i) else {
                return SolutionLabel::fallback(i);
            };
            let name = name_col
                .and_then(|c| row.get(c))
                .cloned()
                .unwrap_or_else(|| format!("Sol {}", i + 1));
            let coord_raw = coord_col
                .and_then(|c| row.get(c))
                .cloned()
                .unwrap_or_default();
            let coord = normalize_coord(&coord_raw);
            SolutionLabel {
                name,
                coord_raw,
                coord,
            }
        })
        .collect()
}

/// Leaf of the taxonomy tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeLeaf {
    pub index: usize,
    pub name: String,
    pub coord: String,
    pub grade: f64,
    pub grade_error: f64,
    pub tier: u32,
    pub tier_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSection {
    pub secondary: u32,
    /// `III.2`
    pub label: String,
    pub leaves: Vec<TreeLeaf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeBranch {
    pub primary: String,
    pub sections: Vec<TreeSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyTree {
    pub branches: Vec<TreeBranch>,
    pub decimals: u32,
}

impl TaxonomyTree {
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.branches
            .iter()
            .flat_map(|b| &b.sections)
            .map(|s| s.leaves.len())
            .sum()
    }
}

/// Group views by coordinate. Branches follow Roman order, sections numeric order,
/// leaves coordinate order and then grade (best first).
pub fn build_tree(views: &[SolutionView], decimals: u32) -> TaxonomyTree {
    type Sections<'a> = BTreeMap<u32, Vec<(Coord, &'a SolutionView)>>;
    let mut by_primary: BTreeMap<(u32, String), Sections<'_>> = BTreeMap::new();

    for v in views {
        let Some(coord) = parse_coord(&v.coord) else {
            continue;
        };
        by_primary
            .entry((coord.primary_value(), coord.primary.clone()))
            .or_default()
            .entry(coord.secondary)
            .or_default()
            .push((coord, v));
    }

    let branches = by_primary
        .into_iter()
        .map(|((_, primary), sections)| {
            let sections = sections
                .into_iter()
                .map(|(secondary, mut leaves)| {
                    leaves.sort_by(|(ca, a), (cb, b)| {
                        ca.cmp(cb).then_with(|| b.item.grade.total_cmp(&a.item.grade))
                    });
                    TreeSection {
                        secondary,
                        label: format!("{primary}.{secondary}"),
                        leaves: leaves
                            .into_iter()
                            .map(|(_, v)| TreeLeaf {
                                index: v.item.index,
                                name: v.name.clone(),
                                coord: v.coord.clone(),
                                grade: v.item.grade,
                                grade_error: v.item.grade_error,
                                tier: v.item.tier,
                                tier_name: v.tier_name.clone(),
                            })
                            .collect(),
                    }
                })
                .collect();
            TreeBranch { primary, sections }
        })
        .collect();

    TaxonomyTree { branches, decimals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::parse_csv;
    use crate::ranking::ScoredItem;

    fn view(index: usize, coord: &str, grade: f64) -> SolutionView {
        SolutionView {
            item: ScoredItem {
                index,
                raw_combination: 0.0,
                propagated_error: 0.0,
                grade,
                grade_error: 0.0,
                tier: 1,
            },
            tier_name: "Gold".into(),
            name: format!("S{index}"),
            coord: coord.into(),
        }
    }

    #[test]
    fn roman_values() {
        assert_eq!(roman_to_int("I"), 1);
        assert_eq!(roman_to_int("IV"), 4);
        assert_eq!(roman_to_int("IX"), 9);
        assert_eq!(roman_to_int("XIV"), 14);
        assert_eq!(roman_to_int("MCMXC"), 1990);
        assert_eq!(roman_to_int("iii"), 3);
    }

    #[test]
    fn coord_parsing_variants() {
        assert_eq!(
            parse_coord("III.1.a"),
            Some(Coord {
                primary: "III".into(),
                secondary: 1,
                tertiary: "a".into()
            })
        );
        let c = parse_coord(" ii - 3 ").unwrap();
        assert_eq!((c.primary.as_str(), c.secondary, c.tertiary.as_str()), ("II", 3, ""));
        assert!(parse_coord("III.1a").is_none());
        assert!(parse_coord("4.2").is_none());
        assert!(parse_coord("").is_none());
    }

    #[test]
    fn normalization_splits_letter_suffix() {
        assert_eq!(normalize_coord("III.1a"), "III.1.a");
        assert_eq!(normalize_coord("II.2"), "II.2");
        assert_eq!(parse_coord(&normalize_coord("III.1a")).map(|c| c.to_string()), Some("III.1.a".into()));
    }

    #[test]
    fn coord_order_uses_roman_value() {
        let iv = parse_coord("IV.1").unwrap();
        let v = parse_coord("V.1").unwrap();
        let ix = parse_coord("IX.1").unwrap();
        assert!(iv < v && v < ix);
        assert!(parse_coord("II.2.a").unwrap() < parse_coord("II.2.b").unwrap());
        assert!(parse_coord("II.2").unwrap() < parse_coord("II.10").unwrap());
    }

    #[test]
    fn labels_join_by_row_position() {
        let names = parse_csv("Nome,Coordenadas\nAlpha,III.1a\nBeta,\n");
        let labels = label_rows(&names, 3, &LabelAliases::default());
        assert_eq!(labels[0].name, "Alpha");
        assert_eq!(labels[0].coord, "III.1.a");
        assert_eq!(labels[0].coord_raw, "III.1a");
        assert!(parse_coord(&labels[0].coord).is_some());
        assert!(parse_coord(&labels[0].coord_raw).is_none());
        assert_eq!(labels[1].name, "Beta");
        assert_eq!(labels[1].coord, "");
        assert_eq!(labels[2], SolutionLabel::fallback(2));
        assert_eq!(labels[2].name, "Sol 3");
    }

    #[test]
    fn name_column_falls_back_to_first_header() {
        let names = parse_csv("Solution,Where\nAlpha,I.1\n");
        let labels = label_rows(&names, 1, &LabelAliases::default());
        assert_eq!(labels[0].name, "Alpha");
        assert_eq!(labels[0].coord, "");
    }

    #[test]
    fn tree_groups_and_orders() {
        let views = vec![
            view(0, "II.2.b", 4.0),
            view(1, "I.1", 9.0),
            view(2, "II.2.a", 3.0),
            view(3, "", 7.0),
            view(4, "II.1", 5.0),
            view(5, "II.2.a", 8.0),
        ];
        let tree = build_tree(&views, 2);
        assert_eq!(tree.leaf_count(), 5);
        let primaries: Vec<_> = tree.branches.iter().map(|b| b.primary.as_str()).collect();
        assert_eq!(primaries, vec!["I", "II"]);

        let ii = &tree.branches[1];
        assert_eq!(ii.sections.iter().map(|s| s.secondary).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(ii.sections[1].label, "II.2");
        let order: Vec<_> = ii.sections[1].leaves.iter().map(|l| l.index).collect();
        // same coordinate: better grade first
        assert_eq!(order, vec![5, 2, 0]);
    }
}
