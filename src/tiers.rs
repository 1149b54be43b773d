//! Tier naming: ordered vocabulary, best tier first.

use serde::{Deserialize, Serialize};

/// Labels used when no vocabulary is configured.
pub const DEFAULT_TIER_NAMES: [&str; 8] = [
    "Gold",
    "Silver",
    "Bronze",
    "Iron",
    "Clay",
    "Mud",
    "Don't Look",
    "Look Less",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierNames(Vec<String>);

impl Default for TierNames {
    fn default() -> Self {
        Self(DEFAULT_TIER_NAMES.iter().map(|s| s.to_string()).collect())
    }
}

impl TierNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Label for a 1-based tier; `Tier N` past the vocabulary, `N/A` for 0.
    pub fn name_for(&self, tier: u32) -> String {
        if tier == 0 {
            return "N/A".to_string();
        }
        self.0
            .get(tier as usize - 1)
            .cloned()
            .unwrap_or_else(|| format!("Tier {tier}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vocabulary() {
        let names = TierNames::default();
        assert_eq!(names.len(), 8);
        assert_eq!(names.name_for(1), "Gold");
        assert_eq!(names.name_for(3), "Bronze");
        assert_eq!(names.name_for(8), "Look Less");
    }

    #[test]
    fn fallback_past_vocabulary() {
        let names = TierNames::new(["A", "B"]);
        assert_eq!(names.name_for(2), "B");
        assert_eq!(names.name_for(3), "Tier 3");
        assert_eq!(names.name_for(0), "N/A");
    }

    #[test]
    fn deserializes_from_plain_list() {
        let names: TierNames = serde_json::from_str(r#"["Top","Rest"]"#).unwrap();
        assert_eq!(names.name_for(1), "Top");
    }
}
