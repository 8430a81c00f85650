//! veil-di library interface
//!
//! Document Ingestion service: upload gate, four-stage processing workflow
//! and the HTTP API the dashboard drives them through.

pub mod api;
pub mod config;
pub mod error;
pub mod findings;
pub mod models;
pub mod upload;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use veil_common::events::EventBus;

use crate::config::{QaSettings, UploadSettings};
use crate::findings::{FindingsSource, MaskingPlan, MockFindings, QaReview};
use crate::upload::UploadGate;
use crate::workflow::WorkflowController;

/// Module name reported by `/health` and SSE logging
pub const MODULE_NAME: &str = "veil-di";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Processing workflow for the session
    pub workflow: Arc<WorkflowController>,
    /// Upload gate feeding the workflow
    pub uploads: Arc<UploadGate>,
    /// Step findings
    pub findings: Arc<dyn FindingsSource>,
    /// Masking technique assignments and batch selection
    pub masking: Arc<MaskingPlan>,
    /// QA reviewer decisions
    pub qa_review: Arc<QaReview>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    /// State backed by the mock findings dataset
    pub fn new(upload: UploadSettings, qa: QaSettings, event_bus: EventBus) -> Self {
        Self::with_findings(upload, qa, event_bus, Arc::new(MockFindings::new()))
    }

    pub fn with_findings(
        upload: UploadSettings,
        qa: QaSettings,
        event_bus: EventBus,
        findings: Arc<dyn FindingsSource>,
    ) -> Self {
        let masking = MaskingPlan::from_source(findings.as_ref(), event_bus.clone());
        let qa_review =
            QaReview::from_source(findings.as_ref(), qa.reprocess_delay(), event_bus.clone());
        Self {
            workflow: Arc::new(WorkflowController::with_default_steps(event_bus.clone())),
            uploads: Arc::new(UploadGate::new(upload, event_bus.clone())),
            findings,
            masking: Arc::new(masking),
            qa_review: Arc::new(qa_review),
            event_bus,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Remember an error for `/health`
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::upload_routes())
        .merge(api::workflow_routes())
        .merge(api::findings_routes())
        .merge(api::masking_routes())
        .merge(api::qa_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .route("/workflow/events", get(api::workflow_event_stream))
        // Dashboard is served from its own origin
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
