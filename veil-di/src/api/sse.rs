//! Server-Sent Events for workflow and upload progress

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;
use veil_common::events::VeilEvent;
use veil_common::sse::{create_event_sse_stream, create_heartbeat_sse_stream};

use crate::{AppState, MODULE_NAME};

/// GET /events - connection status heartbeat
pub async fn event_stream(
    State(_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    create_heartbeat_sse_stream(MODULE_NAME)
}

/// GET /workflow/events - workflow, upload and QA events
///
/// Streams events:
/// - WorkflowStarted / WorkflowStepChanged / WorkflowCompleted / WorkflowReset
/// - UploadBatchStarted / UploadProgress / DocumentUploaded / DocumentRejected
/// - UploadBatchCompleted / UploadBatchSettled
/// - QaFindingReviewed / QaReprocessStarted / QaReprocessCompleted
/// - MaskingSelectionChanged
pub async fn workflow_event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    create_event_sse_stream(MODULE_NAME, state.event_bus.subscribe(), is_session_event)
}

fn is_session_event(event: &VeilEvent) -> bool {
    matches!(
        event,
        VeilEvent::WorkflowStarted { .. }
            | VeilEvent::WorkflowStepChanged { .. }
            | VeilEvent::WorkflowCompleted { .. }
            | VeilEvent::WorkflowReset { .. }
            | VeilEvent::UploadBatchStarted { .. }
            | VeilEvent::UploadProgress { .. }
            | VeilEvent::DocumentUploaded { .. }
            | VeilEvent::DocumentRejected { .. }
            | VeilEvent::UploadBatchCompleted { .. }
            | VeilEvent::UploadBatchSettled { .. }
            | VeilEvent::QaFindingReviewed { .. }
            | VeilEvent::QaReprocessStarted { .. }
            | VeilEvent::QaReprocessCompleted { .. }
            | VeilEvent::MaskingSelectionChanged { .. }
    )
}
