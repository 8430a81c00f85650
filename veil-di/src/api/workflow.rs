//! Workflow API handlers
//!
//! Start, inspect and navigate the processing workflow.

use axum::{
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::StepId;
use crate::workflow::{
    resolve_step_view, ProgressSummary, StepEntry, StepView, WorkflowState,
};
use crate::AppState;

/// POST /workflow/start request (body optional)
#[derive(Debug, Default, Deserialize)]
pub struct StartWorkflowRequest {
    /// Step to begin at; defaults to the first step
    pub initial_step: Option<String>,
}

/// Workflow snapshot as rendered by the dashboard
#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub state: WorkflowState,
    pub current_step: StepEntry,
    pub progress: ProgressSummary,
    pub view: StepView,
    /// "Previous" control enabled
    pub can_go_previous: bool,
    /// "Next Step" control enabled
    pub can_go_next: bool,
    /// "Complete Processing" control enabled
    pub can_complete: bool,
}

impl From<&WorkflowState> for WorkflowResponse {
    fn from(state: &WorkflowState) -> Self {
        let current_step = state.current_step().clone();
        let in_progress = !state.is_finished();
        Self {
            view: resolve_step_view(current_step.step.id.as_str()),
            progress: state.progress_summary(),
            can_go_previous: in_progress && !state.is_first_step(),
            can_go_next: in_progress && !state.is_last_step(),
            can_complete: in_progress && state.is_last_step(),
            current_step,
            state: state.clone(),
        }
    }
}

/// GET /workflow response
#[derive(Debug, Serialize)]
pub struct WorkflowStatusResponse {
    /// False while still in the upload phase
    pub started: bool,
    /// Completed documents available to the workflow
    pub completed_documents: usize,
    pub workflow: Option<WorkflowResponse>,
}

/// GET /workflow/view response
#[derive(Debug, Serialize)]
pub struct StepViewResponse {
    pub step_id: StepId,
    pub view: StepView,
}

/// POST /workflow/reset response
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub status: String,
}

impl StartWorkflowRequest {
    /// An empty body means defaults; anything else must be a valid request
    fn from_body(body: &[u8]) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid start request: {}", e)))
    }
}

/// POST /workflow/start
pub async fn start_workflow(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<WorkflowResponse>> {
    let request = StartWorkflowRequest::from_body(&body)?;
    let initial = request.initial_step.map(StepId::new);
    let completed = state.uploads.completed_count().await;

    let snapshot = state.workflow.start(initial.as_ref(), completed).await?;
    Ok(Json(WorkflowResponse::from(snapshot.as_ref())))
}

/// GET /workflow
pub async fn get_workflow(State(state): State<AppState>) -> Json<WorkflowStatusResponse> {
    let snapshot = state.workflow.snapshot().await;

    Json(WorkflowStatusResponse {
        started: snapshot.is_some(),
        completed_documents: state.uploads.completed_count().await,
        workflow: snapshot.as_deref().map(WorkflowResponse::from),
    })
}

/// POST /workflow/next
pub async fn next_step(State(state): State<AppState>) -> ApiResult<Json<WorkflowResponse>> {
    let snapshot = state.workflow.next().await?;
    Ok(Json(WorkflowResponse::from(snapshot.as_ref())))
}

/// POST /workflow/previous
pub async fn previous_step(State(state): State<AppState>) -> ApiResult<Json<WorkflowResponse>> {
    let snapshot = state.workflow.previous().await?;
    Ok(Json(WorkflowResponse::from(snapshot.as_ref())))
}

/// POST /workflow/steps/:step_id/select
pub async fn select_step(
    State(state): State<AppState>,
    Path(step_id): Path<String>,
) -> ApiResult<Json<WorkflowResponse>> {
    let snapshot = state.workflow.go_to(&StepId::new(step_id)).await?;
    Ok(Json(WorkflowResponse::from(snapshot.as_ref())))
}

/// POST /workflow/complete
pub async fn complete_workflow(
    State(state): State<AppState>,
) -> ApiResult<Json<WorkflowResponse>> {
    let snapshot = state.workflow.complete().await?;
    Ok(Json(WorkflowResponse::from(snapshot.as_ref())))
}

/// POST /workflow/reset
///
/// Fresh session: clears uploads, the workflow, the masking plan and QA
/// decisions. Refused while a batch is still uploading.
pub async fn reset_workflow(State(state): State<AppState>) -> ApiResult<Json<ResetResponse>> {
    state.uploads.reset().await?;
    state.workflow.reset().await;
    state.masking.reset().await;
    state.qa_review.reset().await;

    info!("Session reset");
    Ok(Json(ResetResponse {
        status: "reset".to_string(),
    }))
}

/// GET /workflow/view
pub async fn current_view(State(state): State<AppState>) -> ApiResult<Json<StepViewResponse>> {
    let current = state.workflow.current_step().await?;
    let view = resolve_step_view(current.step.id.as_str());

    Ok(Json(StepViewResponse {
        step_id: current.step.id,
        view,
    }))
}

/// Build workflow routes
pub fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/workflow", get(get_workflow))
        .route("/workflow/start", post(start_workflow))
        .route("/workflow/next", post(next_step))
        .route("/workflow/previous", post(previous_step))
        .route("/workflow/steps/:step_id/select", post(select_step))
        .route("/workflow/complete", post(complete_workflow))
        .route("/workflow/reset", post(reset_workflow))
        .route("/workflow/view", get(current_view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_steps;

    #[test]
    fn test_controls_follow_position() {
        let state = WorkflowState::new(default_steps()).expect("valid definition");
        let response = WorkflowResponse::from(&state);

        assert!(!response.can_go_previous);
        assert!(response.can_go_next);
        assert!(!response.can_complete);
        assert_eq!(response.view, StepView::DetectionView);
        assert_eq!(response.progress, ProgressSummary { completed: 0, total: 4 });
    }

    #[test]
    fn test_start_request_body() {
        assert!(StartWorkflowRequest::from_body(b"").expect("empty").initial_step.is_none());
        assert!(StartWorkflowRequest::from_body(b" \n").expect("blank").initial_step.is_none());

        let request = StartWorkflowRequest::from_body(br#"{"initial_step":"masking"}"#)
            .expect("valid body");
        assert_eq!(request.initial_step.as_deref(), Some("masking"));

        assert!(matches!(
            StartWorkflowRequest::from_body(br#"{"initial_step":42}"#),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            StartWorkflowRequest::from_body(b"not json"),
            Err(ApiError::BadRequest(_))
        ));
    }
}
