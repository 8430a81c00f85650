//! Event types for the Veil event system
//!
//! Provides shared event definitions and EventBus for all Veil services.

mod workflow_types;

pub use workflow_types::{NavigationAction, StepProgressData, StepStatus};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Veil event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
/// Every variant carries the full data a dashboard needs to re-render, so
/// subscribers never have to query back for the state that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VeilEvent {
    /// Processing workflow started after the upload gate was satisfied
    ///
    /// Triggers:
    /// - SSE: Switch dashboard from upload phase to workflow phase
    WorkflowStarted {
        /// Step that became active
        initial_step_id: String,
        /// Status of every step after start
        steps: Vec<StepProgressData>,
        /// Completed documents that satisfied the gate
        documents: usize,
        /// When the workflow started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Active step changed through next / previous / select
    ///
    /// Triggers:
    /// - SSE: Update step navigator and mount the new step view
    WorkflowStepChanged {
        /// Navigation intent that caused the change
        action: NavigationAction,
        /// Step active before the change
        from_step_id: String,
        /// Step active after the change
        to_step_id: String,
        /// Zero-based position of the active step
        current_index: usize,
        /// Status of every step after the change
        steps: Vec<StepProgressData>,
        /// Entries in the completion history
        completed_steps: usize,
        /// Number of steps in the workflow
        total_steps: usize,
        /// When the step changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Final step completed; the workflow reached its terminal state
    WorkflowCompleted {
        /// Entries in the completion history
        completed_steps: usize,
        /// Number of steps in the workflow
        total_steps: usize,
        /// When the workflow completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session reset to the upload phase
    WorkflowReset {
        /// When the reset happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Upload batch accepted and processing started
    UploadBatchStarted {
        /// Batch identifier
        batch_id: Uuid,
        /// Number of files in the batch
        file_count: usize,
        /// When the batch started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Simulated upload progress tick for one document
    ///
    /// NOTE: Emitted every tick; subscribers should treat it as lossy.
    UploadProgress {
        /// Batch identifier
        batch_id: Uuid,
        /// Document being uploaded
        document_id: Uuid,
        /// Original file name
        file_name: String,
        /// Progress percentage (0-100)
        progress: u8,
        /// When the tick happened
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Document reached 100% and is now immutable
    DocumentUploaded {
        /// Batch identifier
        batch_id: Uuid,
        /// Uploaded document
        document_id: Uuid,
        /// Original file name
        file_name: String,
        /// File size in bytes
        size_bytes: u64,
        /// When the upload completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Document refused by intake validation
    DocumentRejected {
        /// Batch identifier
        batch_id: Uuid,
        /// Rejected document
        document_id: Uuid,
        /// Original file name
        file_name: String,
        /// Why the document was refused
        reason: String,
        /// When the document was refused
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Every document in the batch completed
    ///
    /// Triggers:
    /// - SSE: Show "Start Processing" call to action
    UploadBatchCompleted {
        /// Batch identifier
        batch_id: Uuid,
        /// Documents in submission order
        document_ids: Vec<Uuid>,
        /// When the batch completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Batch finished with at least one rejected document
    UploadBatchSettled {
        /// Batch identifier
        batch_id: Uuid,
        /// Documents that completed
        completed: usize,
        /// Documents that failed
        failed: usize,
        /// When the batch settled
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// QA reviewer approved or rejected a finding
    QaFindingReviewed {
        /// QA finding identifier
        finding_id: String,
        /// New review status ("approved" / "rejected")
        status: String,
        /// When the decision was recorded
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// QA findings sent back for automated reprocessing
    QaReprocessStarted {
        /// Findings being re-evaluated
        finding_count: usize,
        /// When reprocessing started
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// QA reprocessing finished with re-scored findings
    ///
    /// Triggers:
    /// - SSE: Re-fetch `/qa/review`
    QaReprocessCompleted {
        /// Findings approved after reprocessing
        approved: usize,
        /// Findings still awaiting review
        pending: usize,
        /// round(approved / total * 100)
        quality_score: u8,
        /// When reprocessing finished
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Masking technique assignments or the batch selection changed
    MaskingSelectionChanged {
        /// Detections with a masking technique assigned
        assigned: usize,
        /// Detections currently selected for batch apply
        selected: usize,
        /// When the selection changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl VeilEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            VeilEvent::WorkflowStarted { .. } => "WorkflowStarted",
            VeilEvent::WorkflowStepChanged { .. } => "WorkflowStepChanged",
            VeilEvent::WorkflowCompleted { .. } => "WorkflowCompleted",
            VeilEvent::WorkflowReset { .. } => "WorkflowReset",
            VeilEvent::UploadBatchStarted { .. } => "UploadBatchStarted",
            VeilEvent::UploadProgress { .. } => "UploadProgress",
            VeilEvent::DocumentUploaded { .. } => "DocumentUploaded",
            VeilEvent::DocumentRejected { .. } => "DocumentRejected",
            VeilEvent::UploadBatchCompleted { .. } => "UploadBatchCompleted",
            VeilEvent::UploadBatchSettled { .. } => "UploadBatchSettled",
            VeilEvent::QaFindingReviewed { .. } => "QaFindingReviewed",
            VeilEvent::QaReprocessStarted { .. } => "QaReprocessStarted",
            VeilEvent::QaReprocessCompleted { .. } => "QaReprocessCompleted",
            VeilEvent::MaskingSelectionChanged { .. } => "MaskingSelectionChanged",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`:
/// - Publishing never blocks on slow subscribers
/// - Any number of concurrent subscribers
/// - Subscribers that fall behind observe `RecvError::Lagged`
///
/// # Examples
///
/// ```
/// use veil_common::events::{EventBus, VeilEvent};
///
/// let event_bus = EventBus::new(100);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(VeilEvent::WorkflowReset {
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().expect("event delivered");
/// assert_eq!(event.event_type(), "WorkflowReset");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VeilEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<VeilEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: VeilEvent,
    ) -> Result<usize, broadcast::error::SendError<VeilEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// The dashboard may not be connected at all; state changes must still
    /// proceed, so most producers use this variant.
    pub fn emit_lossy(&self, event: VeilEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
