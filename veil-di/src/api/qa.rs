//! QA review API handlers
//!
//! GET /qa/review, POST /qa/findings/:id/approve, POST /qa/findings/:id/reject,
//! POST /qa/reprocess

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::findings::{QaResult, ReviewDecision, ReviewSummary};
use crate::AppState;

/// GET /qa/review response
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub summary: ReviewSummary,
    pub results: Vec<QaResult>,
    /// Automated reprocess in progress
    pub reprocessing: bool,
}

/// POST /qa/reprocess response
#[derive(Debug, Serialize)]
pub struct ReprocessResponse {
    pub status: String,
}

/// POST /qa/findings/:id/{approve,reject} response
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub finding: QaResult,
    pub summary: ReviewSummary,
}

/// GET /qa/review
pub async fn get_review(State(state): State<AppState>) -> Json<ReviewResponse> {
    let results = state.qa_review.results().await;
    Json(ReviewResponse {
        summary: ReviewSummary::from_results(&results),
        results,
        reprocessing: state.qa_review.is_reprocessing(),
    })
}

/// POST /qa/findings/:id/approve
pub async fn approve_finding(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DecisionResponse>> {
    decide(&state, &id, ReviewDecision::Approve).await
}

/// POST /qa/findings/:id/reject
pub async fn reject_finding(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DecisionResponse>> {
    decide(&state, &id, ReviewDecision::Reject).await
}

async fn decide(
    state: &AppState,
    id: &str,
    decision: ReviewDecision,
) -> ApiResult<Json<DecisionResponse>> {
    let finding = state
        .qa_review
        .decide(id, decision)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("QA finding not found: {}", id)))?;

    Ok(Json(DecisionResponse {
        finding,
        summary: state.qa_review.summary().await,
    }))
}

/// POST /qa/reprocess
///
/// Returns 202 at once; the re-scored findings arrive with
/// `QaReprocessCompleted` on `/workflow/events`.
pub async fn reprocess(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<ReprocessResponse>)> {
    if !state.qa_review.reprocess() {
        return Err(ApiError::Conflict("QA reprocess already running".to_string()));
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(ReprocessResponse {
            status: "reprocessing".to_string(),
        }),
    ))
}

/// Build QA review routes
pub fn qa_routes() -> Router<AppState> {
    Router::new()
        .route("/qa/review", get(get_review))
        .route("/qa/findings/:id/approve", post(approve_finding))
        .route("/qa/findings/:id/reject", post(reject_finding))
        .route("/qa/reprocess", post(reprocess))
}
