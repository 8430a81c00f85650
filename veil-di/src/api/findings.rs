//! Step findings API handler
//!
//! GET /steps/:step_id/findings?search=&type=&severity=

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::findings::{DetectionFilter, StepFindings};
use crate::models::step::QA;
use crate::workflow::{resolve_step_view, StepView};
use crate::AppState;

/// GET /steps/:step_id/findings response
#[derive(Debug, Serialize)]
pub struct FindingsResponse {
    pub step_id: String,
    pub view: StepView,
    pub count: usize,
    pub findings: StepFindings,
}

/// GET /steps/:step_id/findings
///
/// Detection findings honour the filter parameters; other steps ignore them.
/// QA findings carry the reviewer decisions made this session.
pub async fn step_findings(
    State(state): State<AppState>,
    Path(step_id): Path<String>,
    Query(filter): Query<DetectionFilter>,
) -> ApiResult<Json<FindingsResponse>> {
    let findings = match state.findings.findings_for(&step_id) {
        Some(StepFindings::Detections(items)) => StepFindings::Detections(filter.apply(items)),
        Some(StepFindings::QaResults(_)) if step_id == QA => {
            StepFindings::QaResults(state.qa_review.results().await)
        }
        Some(other) => other,
        None => {
            return Err(ApiError::NotFound(format!(
                "No findings for step: {}",
                step_id
            )))
        }
    };

    Ok(Json(FindingsResponse {
        view: resolve_step_view(&step_id),
        count: findings.len(),
        findings,
        step_id,
    }))
}

/// Build findings routes
pub fn findings_routes() -> Router<AppState> {
    Router::new().route("/steps/:step_id/findings", get(step_findings))
}
