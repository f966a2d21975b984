use serde::{Deserialize, Serialize};
use std::fmt;

/// Which cascade rule produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactCode,
    ExactDescription,
    FuzzyDescription,
    FuzzyCode,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::ExactCode => "exact_code",
            MatchType::ExactDescription => "exact_description",
            MatchType::FuzzyDescription => "fuzzy_description",
            MatchType::FuzzyCode => "fuzzy_code",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proposed correspondence between one ITT item and one response item.
/// Ephemeral engine output; persisted downstream as a `suggested` match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub itt_item_id: i64,
    pub response_item_id: i64,
    pub contractor_id: i64,
    pub confidence: f64,                // [0,1], rounded to 3 decimals
    pub match_type: MatchType,
    pub reason: String,
}
