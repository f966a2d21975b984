use indexmap::IndexSet;
use sqlx::PgPool;

use crate::db::queries;
use crate::models::{MatchRecord, MatchRunStats};
use crate::service::matcher::{MatchEngine, MatchOptions};

/// Auto-match workflow: loads a project's items, runs the pure engine, and
/// persists the surviving candidates as `suggested` matches.
///
/// The workflow (not the engine) owns the persistence invariants: response
/// items already bound to an accepted/manual match are excluded before the
/// engine runs, and pairs already on file are never re-suggested.
pub struct AutoMatchService {
    pool: PgPool,
    defaults: MatchOptions,
}

impl AutoMatchService {
    pub fn new(pool: PgPool, defaults: MatchOptions) -> Self {
        Self { pool, defaults }
    }

    /// Configured engine options used when a request does not override them
    pub fn defaults(&self) -> &MatchOptions {
        &self.defaults
    }

    /// Run auto-matching for one project, optionally for a single contractor.
    pub async fn auto_match_project(
        &self,
        project_id: i64,
        contractor_id: Option<i64>,
        options: MatchOptions,
    ) -> Result<MatchRunStats, Box<dyn std::error::Error>> {
        let engine = MatchEngine::new(options)?;

        // 1. load the full ITT item set
        let itt_items = queries::list_itt_items(&self.pool, project_id).await?;
        if itt_items.is_empty() {
            tracing::info!("Project {} has no ITT items, skipping", project_id);
            return Ok(MatchRunStats {
                project_id,
                contractor_id,
                itt_items: 0,
                response_items_considered: 0,
                candidates_produced: 0,
                high_confidence_candidates: 0,
                suggested_created: 0,
                skipped_existing: 0,
            });
        }

        // 2. load response items not yet bound to an accepted/manual match
        let response_items =
            queries::list_unmatched_response_items(&self.pool, project_id, contractor_id).await?;
        tracing::info!(
            "Project {}: {} ITT items, {} unmatched response items",
            project_id,
            itt_items.len(),
            response_items.len()
        );

        // 3. pairs already on file, ordered dedup
        let existing = queries::list_match_pairs(&self.pool, project_id).await?;
        let existing_pairs: IndexSet<(i64, i64)> = existing
            .iter()
            .map(|m| (m.response_item_id, m.itt_item_id))
            .collect();

        // 4. run the engine
        let candidates = engine.find_matches(&itt_items, &response_items);
        let high_confidence = candidates
            .iter()
            .filter(|c| c.confidence >= engine.options().fuzzy_threshold)
            .count();

        // 5. persist new suggestions, skipping pairs already represented
        let mut skipped_existing = 0usize;
        let mut records: Vec<MatchRecord> = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            if existing_pairs.contains(&(candidate.response_item_id, candidate.itt_item_id)) {
                skipped_existing += 1;
                continue;
            }
            records.push(MatchRecord::suggested(project_id, candidate));
        }
        for chunk in records.chunks(1000) {
            queries::insert_match_records(&self.pool, chunk).await?;
        }

        let stats = MatchRunStats {
            project_id,
            contractor_id,
            itt_items: itt_items.len(),
            response_items_considered: response_items.len(),
            candidates_produced: candidates.len(),
            high_confidence_candidates: high_confidence,
            suggested_created: records.len(),
            skipped_existing,
        };
        tracing::info!(
            "Auto-match complete for project {}: {} candidates, {} suggested, {} skipped as existing",
            project_id,
            stats.candidates_produced,
            stats.suggested_created,
            stats.skipped_existing
        );
        Ok(stats)
    }
}
