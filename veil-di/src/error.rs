//! Error types for veil-di
//!
//! Domain errors from the workflow controller and upload gate are mapped to
//! HTTP responses here; handlers just propagate with `?`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::findings::MaskingError;
use crate::upload::UploadError;
use crate::workflow::WorkflowError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Workflow controller refused the operation
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Upload gate refused the operation
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Masking plan refused the assignment
    #[error(transparent)]
    Masking(#[from] MaskingError),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Workflow(err) => match err {
                WorkflowError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "INVALID_TRANSITION")
                }
                WorkflowError::EmptyUploadBatch => (StatusCode::BAD_REQUEST, "EMPTY_UPLOAD_BATCH"),
                WorkflowError::AlreadyStarted => (StatusCode::CONFLICT, "ALREADY_STARTED"),
                WorkflowError::NotStarted => (StatusCode::CONFLICT, "NOT_STARTED"),
                WorkflowError::UnknownStep(_) => (StatusCode::NOT_FOUND, "UNKNOWN_STEP"),
                WorkflowError::InvalidDefinition(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_DEFINITION")
                }
            },
            ApiError::Upload(err) => match err {
                UploadError::EmptyUploadBatch => (StatusCode::BAD_REQUEST, "EMPTY_UPLOAD_BATCH"),
                UploadError::UploadInProgress => (StatusCode::CONFLICT, "UPLOAD_IN_PROGRESS"),
                UploadError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                UploadError::StillUploading(_) => (StatusCode::CONFLICT, "STILL_UPLOADING"),
            },
            ApiError::Masking(err) => match err {
                MaskingError::UnknownDetection(_) => (StatusCode::NOT_FOUND, "UNKNOWN_DETECTION"),
                MaskingError::UnknownOption(_) => {
                    (StatusCode::BAD_REQUEST, "UNKNOWN_MASKING_OPTION")
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.parts();
        let message = match &self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Conflict(msg) => {
                msg.clone()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
