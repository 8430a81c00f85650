//! Workflow controller
//!
//! Owns the single workflow value for the session. Every mutation computes a
//! navigator transition from the held snapshot and swaps in the result under
//! one write lock, so readers only ever see complete snapshots. Each change
//! is published on the EventBus.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use veil_common::events::{EventBus, NavigationAction, VeilEvent};

use super::error::{WorkflowError, WorkflowResult};
use super::navigator;
use super::state::{validate_definition, ProgressSummary, StepEntry, WorkflowState};
use crate::models::{default_steps, Step, StepId};

/// Owner of the held workflow state
pub struct WorkflowController {
    definition: Vec<Step>,
    state: RwLock<Option<Arc<WorkflowState>>>,
    event_bus: EventBus,
}

impl WorkflowController {
    /// Create a controller for a custom step definition
    pub fn new(definition: Vec<Step>, event_bus: EventBus) -> WorkflowResult<Self> {
        validate_definition(&definition)?;
        Ok(Self {
            definition,
            state: RwLock::new(None),
            event_bus,
        })
    }

    /// Create a controller for the four-stage document workflow
    pub fn with_default_steps(event_bus: EventBus) -> Self {
        Self {
            definition: default_steps(),
            state: RwLock::new(None),
            event_bus,
        }
    }

    /// Step definitions in order
    pub fn steps(&self) -> &[Step] {
        &self.definition
    }

    /// Start the workflow once the upload gate is satisfied
    ///
    /// `initial` defaults to the first step. Refuses with `EmptyUploadBatch`
    /// when no document has completed uploading.
    pub async fn start(
        &self,
        initial: Option<&StepId>,
        completed_documents: usize,
    ) -> WorkflowResult<Arc<WorkflowState>> {
        let mut guard = self.state.write().await;

        if guard.is_some() {
            return Err(WorkflowError::AlreadyStarted);
        }
        if completed_documents == 0 {
            warn!("Workflow start refused: no completed documents");
            return Err(WorkflowError::EmptyUploadBatch);
        }

        let initial = match initial.or_else(|| self.definition.first().map(|s| &s.id)) {
            Some(id) => id.clone(),
            None => {
                return Err(WorkflowError::InvalidDefinition(
                    "workflow needs at least one step".to_string(),
                ))
            }
        };
        let state = Arc::new(WorkflowState::starting_at(self.definition.clone(), &initial)?);
        *guard = Some(Arc::clone(&state));
        drop(guard);

        info!(
            step_id = %initial,
            documents = completed_documents,
            "Document workflow started"
        );

        self.event_bus.emit_lossy(VeilEvent::WorkflowStarted {
            initial_step_id: initial.to_string(),
            steps: state.step_progress(),
            documents: completed_documents,
            timestamp: chrono::Utc::now(),
        });

        Ok(state)
    }

    /// Advance to the next step
    pub async fn next(&self) -> WorkflowResult<Arc<WorkflowState>> {
        self.navigate(NavigationAction::Next, navigator::advance).await
    }

    /// Return to the previous step
    pub async fn previous(&self) -> WorkflowResult<Arc<WorkflowState>> {
        self.navigate(NavigationAction::Previous, navigator::retreat).await
    }

    /// Jump to a completed or active step
    pub async fn go_to(&self, step_id: &StepId) -> WorkflowResult<Arc<WorkflowState>> {
        self.navigate(NavigationAction::Select, |state| {
            navigator::jump_to(state, step_id)
        })
        .await
    }

    /// Complete the final step ("Complete Processing")
    pub async fn complete(&self) -> WorkflowResult<Arc<WorkflowState>> {
        let mut guard = self.state.write().await;
        let current = guard.as_ref().ok_or(WorkflowError::NotStarted)?;

        let next = Arc::new(navigator::finish(current).map_err(|e| {
            warn!(error = %e, "Workflow completion refused");
            e
        })?);
        *guard = Some(Arc::clone(&next));
        drop(guard);

        let summary = next.progress_summary();
        info!(
            completed = summary.completed,
            total = summary.total,
            "Document workflow completed"
        );

        self.event_bus.emit_lossy(VeilEvent::WorkflowCompleted {
            completed_steps: summary.completed,
            total_steps: summary.total,
            timestamp: chrono::Utc::now(),
        });

        Ok(next)
    }

    /// Current step with its status
    pub async fn current_step(&self) -> WorkflowResult<StepEntry> {
        let snapshot = self.snapshot().await.ok_or(WorkflowError::NotStarted)?;
        Ok(snapshot.current_step().clone())
    }

    /// "N of M steps completed"
    pub async fn progress_summary(&self) -> WorkflowResult<ProgressSummary> {
        let snapshot = self.snapshot().await.ok_or(WorkflowError::NotStarted)?;
        Ok(snapshot.progress_summary())
    }

    /// Latest published snapshot, `None` while still in the upload phase
    pub async fn snapshot(&self) -> Option<Arc<WorkflowState>> {
        self.state.read().await.clone()
    }

    /// Drop the held workflow, returning to the upload phase
    pub async fn reset(&self) {
        let previous = self.state.write().await.take();
        if previous.is_some() {
            info!("Document workflow reset");
        }
        self.event_bus.emit_lossy(VeilEvent::WorkflowReset {
            timestamp: chrono::Utc::now(),
        });
    }

    async fn navigate<F>(
        &self,
        action: NavigationAction,
        transition: F,
    ) -> WorkflowResult<Arc<WorkflowState>>
    where
        F: FnOnce(&WorkflowState) -> WorkflowResult<WorkflowState>,
    {
        let mut guard = self.state.write().await;
        let current = guard.as_ref().ok_or(WorkflowError::NotStarted)?;

        let next = match transition(current) {
            Ok(next) => next,
            Err(e) => {
                warn!(action = %action, error = %e, "Workflow transition refused");
                return Err(e);
            }
        };

        // Jumping to the active step: keep the existing snapshot
        if next == **current {
            return Ok(Arc::clone(current));
        }

        debug_assert!(next.is_consistent(), "navigator produced inconsistent state");

        let from_step_id = current.current_step().step.id.to_string();
        let next = Arc::new(next);
        *guard = Some(Arc::clone(&next));
        drop(guard);

        let to_step_id = next.current_step().step.id.to_string();
        let summary = next.progress_summary();
        info!(
            action = %action,
            from = %from_step_id,
            to = %to_step_id,
            completed = summary.completed,
            total = summary.total,
            "Workflow step changed"
        );

        self.event_bus.emit_lossy(VeilEvent::WorkflowStepChanged {
            action,
            from_step_id,
            to_step_id,
            current_index: next.current_index(),
            steps: next.step_progress(),
            completed_steps: summary.completed,
            total_steps: summary.total,
            timestamp: chrono::Utc::now(),
        });

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepStatus;

    fn controller() -> (WorkflowController, EventBus) {
        let bus = EventBus::new(64);
        (WorkflowController::with_default_steps(bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_navigation_before_start_fails() {
        let (controller, _bus) = controller();

        assert_eq!(controller.next().await.unwrap_err(), WorkflowError::NotStarted);
        assert_eq!(controller.previous().await.unwrap_err(), WorkflowError::NotStarted);
        assert_eq!(controller.current_step().await.unwrap_err(), WorkflowError::NotStarted);
        assert!(controller.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_start_requires_completed_documents() {
        let (controller, _bus) = controller();

        let err = controller.start(None, 0).await.unwrap_err();
        assert_eq!(err, WorkflowError::EmptyUploadBatch);
        assert!(controller.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let (controller, _bus) = controller();
        controller.start(None, 1).await.expect("start");

        assert_eq!(controller.start(None, 1).await.unwrap_err(), WorkflowError::AlreadyStarted);
    }

    #[tokio::test]
    async fn test_start_at_unknown_step_leaves_upload_phase() {
        let (controller, _bus) = controller();

        let err = controller.start(Some(&StepId::new("export")), 2).await.unwrap_err();
        assert_eq!(err, WorkflowError::UnknownStep(StepId::new("export")));
        assert!(controller.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_snapshots_are_replaced_not_mutated() {
        let (controller, _bus) = controller();
        let before = controller.start(None, 1).await.expect("start");
        let after = controller.next().await.expect("next");

        assert_eq!(before.current_index(), 0);
        assert_eq!(before.current_step().status, StepStatus::Active);
        assert_eq!(after.current_index(), 1);
    }

    #[tokio::test]
    async fn test_events_published_for_changes() {
        let (controller, bus) = controller();
        let mut rx = bus.subscribe();

        controller.start(None, 3).await.expect("start");
        controller.next().await.expect("next");

        match rx.try_recv().expect("start event") {
            VeilEvent::WorkflowStarted { initial_step_id, documents, .. } => {
                assert_eq!(initial_step_id, "detection");
                assert_eq!(documents, 3);
            }
            other => panic!("unexpected event {:?}", other),
        }
        match rx.try_recv().expect("step event") {
            VeilEvent::WorkflowStepChanged { action, from_step_id, to_step_id, completed_steps, .. } => {
                assert_eq!(action, NavigationAction::Next);
                assert_eq!(from_step_id, "detection");
                assert_eq!(to_step_id, "policy");
                assert_eq!(completed_steps, 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_noop_jump_publishes_nothing() {
        let (controller, bus) = controller();
        controller.start(None, 1).await.expect("start");
        let mut rx = bus.subscribe();

        let before = controller.snapshot().await.expect("snapshot");
        let after = controller.go_to(&StepId::new("detection")).await.expect("jump");

        assert!(Arc::ptr_eq(&before, &after));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_complete_and_reset() {
        let (controller, _bus) = controller();
        controller.start(None, 1).await.expect("start");
        for _ in 0..3 {
            controller.next().await.expect("next");
        }

        let done = controller.complete().await.expect("complete");
        assert!(done.is_finished());
        assert_eq!(
            controller.progress_summary().await.expect("summary"),
            ProgressSummary { completed: 4, total: 4 }
        );

        controller.reset().await;
        assert!(controller.snapshot().await.is_none());
        controller.start(None, 1).await.expect("restart after reset");
    }

    #[test]
    fn test_custom_definition_validated() {
        let err = WorkflowController::new(Vec::new(), EventBus::new(4)).err();
        assert!(matches!(err, Some(WorkflowError::InvalidDefinition(_))));
    }
}
