//! Upload API handlers
//!
//! GET /uploads, POST /uploads, DELETE /uploads/:id

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{FileDescriptor, UploadedDocumentRef};
use crate::upload::UploadBatch;
use crate::workflow::WorkflowError;
use crate::AppState;

/// POST /uploads request
#[derive(Debug, Deserialize)]
pub struct SubmitUploadRequest {
    pub files: Vec<FileDescriptor>,
}

/// GET /uploads response
#[derive(Debug, Serialize)]
pub struct UploadListResponse {
    pub documents: Vec<UploadedDocumentRef>,
    pub completed_count: usize,
    pub uploading: bool,
}

/// GET /uploads
pub async fn list_uploads(State(state): State<AppState>) -> Json<UploadListResponse> {
    let documents = state.uploads.documents().await;
    let completed_count = documents.iter().filter(|d| d.is_completed()).count();

    Json(UploadListResponse {
        documents,
        completed_count,
        uploading: state.uploads.is_uploading().await,
    })
}

/// POST /uploads
///
/// Accepts the batch and returns 202 immediately; progress arrives on
/// `/workflow/events`. When the whole batch uploads and auto-start is
/// enabled, the workflow starts at its first step.
pub async fn submit_uploads(
    State(state): State<AppState>,
    Json(request): Json<SubmitUploadRequest>,
) -> ApiResult<(StatusCode, Json<UploadBatch>)> {
    let auto_start = state.uploads.settings().auto_start_workflow;
    let callback_state = state.clone();

    let batch = state
        .uploads
        .submit(request.files, move |_batch_documents| {
            if !auto_start {
                return;
            }
            tokio::spawn(async move {
                // Earlier batches count too
                let completed = callback_state.uploads.completed_count().await;
                match callback_state.workflow.start(None, completed).await {
                    Ok(_) => info!(documents = completed, "Workflow auto-started"),
                    Err(WorkflowError::AlreadyStarted) => {
                        debug!("Workflow already running, new documents join it")
                    }
                    Err(WorkflowError::EmptyUploadBatch) => {
                        debug!("Uploads cleared before the workflow could start")
                    }
                    Err(e) => {
                        error!("Workflow auto-start failed: {}", e);
                        callback_state
                            .record_error(format!("Workflow auto-start failed: {}", e))
                            .await;
                    }
                }
            });
        })
        .await?;

    Ok((StatusCode::ACCEPTED, Json(batch)))
}

/// DELETE /uploads/:id
pub async fn remove_upload(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<UploadedDocumentRef>> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest(format!("Invalid document id: {}", id)))?;

    let removed = state.uploads.remove(id).await?;
    Ok(Json(removed))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/uploads", get(list_uploads).post(submit_uploads))
        .route("/uploads/:id", delete(remove_upload))
}
