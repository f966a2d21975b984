use crate::models::MatchRunStats;
use crate::service::matcher::MatchOptions;
use crate::service::AutoMatchService;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body: which project (and optionally which contractor) to match.
/// Absent option fields fall back to the engine defaults.
#[derive(Debug, Deserialize)]
pub struct AutoMatchRequest {
    pub project_id: i64,
    pub contractor_id: Option<i64>,
    pub options: Option<MatchOptions>,
}

/// Response body with per-run statistics
#[derive(Debug, Serialize)]
pub struct AutoMatchResponse {
    pub success: bool,
    pub message: String,
    pub stats: Option<MatchRunStats>,
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Trigger the auto-match workflow for a project
pub async fn auto_match(
    State(service): State<Arc<AutoMatchService>>,
    Json(req): Json<AutoMatchRequest>,
) -> Response {
    let options = req
        .options
        .unwrap_or_else(|| service.defaults().clone());
    match service
        .auto_match_project(req.project_id, req.contractor_id, options)
        .await
    {
        Ok(stats) => {
            let response = AutoMatchResponse {
                success: true,
                message: format!(
                    "Matched project {}: {} candidates, {} suggested",
                    req.project_id, stats.candidates_produced, stats.suggested_created
                ),
                stats: Some(stats),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            let response = AutoMatchResponse {
                success: false,
                message: format!("Error: {}", e),
                stats: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}
