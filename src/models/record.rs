use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::MatchCandidate;

/// Review lifecycle of a persisted match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Suggested,
    Accepted,
    Rejected,
    Manual,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Suggested => "suggested",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
            MatchStatus::Manual => "manual",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted match record (t_tender_match)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: String,               // deterministic: "{response_item_id}:{itt_item_id}"
    pub project_id: i64,
    pub itt_item_id: i64,
    pub contractor_id: i64,
    pub response_item_id: i64,
    pub status: MatchStatus,
    pub confidence: f64,
    pub match_type: String,
    pub reason: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchRecord {
    /// Build a `suggested` record from an engine candidate
    pub fn suggested(project_id: i64, candidate: &MatchCandidate) -> Self {
        let now = Utc::now();
        Self {
            match_id: format!("{}:{}", candidate.response_item_id, candidate.itt_item_id),
            project_id,
            itt_item_id: candidate.itt_item_id,
            contractor_id: candidate.contractor_id,
            response_item_id: candidate.response_item_id,
            status: MatchStatus::Suggested,
            confidence: candidate.confidence,
            match_type: candidate.match_type.as_str().to_string(),
            reason: candidate.reason.clone(),
            comment: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lightweight row for existing-pair lookups
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchPairRow {
    pub response_item_id: i64,
    pub itt_item_id: i64,
    pub status: String,
}

/// Per-run matching statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRunStats {
    pub project_id: i64,
    pub contractor_id: Option<i64>,
    pub itt_items: usize,
    pub response_items_considered: usize,
    pub candidates_produced: usize,
    pub high_confidence_candidates: usize,  // confidence >= fuzzy_threshold
    pub suggested_created: usize,
    pub skipped_existing: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchType;

    #[test]
    fn suggested_record_gets_deterministic_id() {
        let candidate = MatchCandidate {
            itt_item_id: 42,
            response_item_id: 9,
            contractor_id: 3,
            confidence: 0.9,
            match_type: MatchType::ExactCode,
            reason: "Exact item code match (1.2.3)".to_string(),
        };
        let record = MatchRecord::suggested(5, &candidate);
        assert_eq!(record.match_id, "9:42");
        assert_eq!(record.project_id, 5);
        assert_eq!(record.status, MatchStatus::Suggested);
        assert_eq!(record.match_type, "exact_code");
        assert!(record.comment.is_none());
    }
}
