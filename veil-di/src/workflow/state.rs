//! Workflow state aggregate
//!
//! An ordered sequence of (step, status) pairs plus the current position and
//! the completion history. Values are never edited in place by callers: the
//! navigator produces a new value for every transition.
//!
//! While in progress exactly one step is `Active`, every step before it is
//! `Completed` and every step after it is `Pending`. A finished workflow has
//! every step `Completed` and no `Active` step.

use serde::Serialize;
use std::collections::HashSet;
use veil_common::events::StepProgressData;

use super::error::{WorkflowError, WorkflowResult};
use crate::models::{Step, StepId, StepStatus};

/// A step together with its current status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepEntry {
    #[serde(flatten)]
    pub step: Step,
    pub status: StepStatus,
}

/// "N of M steps completed"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub completed: usize,
    pub total: usize,
}

/// Workflow state value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowState {
    steps: Vec<StepEntry>,
    current_index: usize,
    /// Ids in the order they were first completed; not pruned on retreat
    completed_step_ids: Vec<StepId>,
    finished: bool,
}

/// Reject empty definitions and duplicate ids
pub fn validate_definition(steps: &[Step]) -> WorkflowResult<()> {
    if steps.is_empty() {
        return Err(WorkflowError::InvalidDefinition(
            "workflow needs at least one step".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for step in steps {
        if !seen.insert(step.id.as_str()) {
            return Err(WorkflowError::InvalidDefinition(format!(
                "duplicate step id: {}",
                step.id
            )));
        }
    }
    Ok(())
}

impl WorkflowState {
    /// Fresh workflow: first step `Active`, all others `Pending`
    pub fn new(steps: Vec<Step>) -> WorkflowResult<Self> {
        let first = match steps.first() {
            Some(step) => step.id.clone(),
            None => {
                return Err(WorkflowError::InvalidDefinition(
                    "workflow needs at least one step".to_string(),
                ))
            }
        };
        Self::starting_at(steps, &first)
    }

    /// Workflow positioned at `initial`
    ///
    /// Steps before `initial` start `Completed` and are recorded in the
    /// completion history, so the ordering invariant holds from the start.
    pub fn starting_at(steps: Vec<Step>, initial: &StepId) -> WorkflowResult<Self> {
        validate_definition(&steps)?;

        let current_index = steps
            .iter()
            .position(|s| &s.id == initial)
            .ok_or_else(|| WorkflowError::UnknownStep(initial.clone()))?;

        let completed_step_ids = steps[..current_index]
            .iter()
            .map(|s| s.id.clone())
            .collect();

        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| StepEntry {
                step,
                status: match index.cmp(&current_index) {
                    std::cmp::Ordering::Less => StepStatus::Completed,
                    std::cmp::Ordering::Equal => StepStatus::Active,
                    std::cmp::Ordering::Greater => StepStatus::Pending,
                },
            })
            .collect();

        Ok(Self {
            steps,
            current_index,
            completed_step_ids,
            finished: false,
        })
    }

    pub fn steps(&self) -> &[StepEntry] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    pub fn current_step(&self) -> &StepEntry {
        &self.steps[self.current_index]
    }

    pub fn is_first_step(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current_index == self.last_index()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn completed_step_ids(&self) -> &[StepId] {
        &self.completed_step_ids
    }

    pub fn index_of(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|entry| &entry.step.id == id)
    }

    pub fn status_of(&self, id: &StepId) -> Option<StepStatus> {
        self.index_of(id).map(|index| self.steps[index].status)
    }

    /// Completion counter read by "N of M steps completed" displays
    pub fn progress_summary(&self) -> ProgressSummary {
        ProgressSummary {
            completed: self.completed_step_ids.len(),
            total: self.steps.len(),
        }
    }

    /// Per-step status for event payloads
    pub fn step_progress(&self) -> Vec<StepProgressData> {
        self.steps
            .iter()
            .map(|entry| StepProgressData {
                step_id: entry.step.id.to_string(),
                name: entry.step.name.clone(),
                status: entry.status,
            })
            .collect()
    }

    /// Check the status ordering invariant
    pub fn is_consistent(&self) -> bool {
        if self.current_index >= self.steps.len() {
            return false;
        }

        self.steps.iter().enumerate().all(|(index, entry)| {
            let expected = if self.finished || index < self.current_index {
                StepStatus::Completed
            } else if index == self.current_index {
                StepStatus::Active
            } else {
                StepStatus::Pending
            };
            entry.status == expected
        })
    }

    // ------------------------------------------------------------------
    // Mutators used by the navigator on its private copy
    // ------------------------------------------------------------------

    pub(super) fn set_status(&mut self, index: usize, status: StepStatus) {
        self.steps[index].status = status;
    }

    pub(super) fn set_current_index(&mut self, index: usize) {
        self.current_index = index;
    }

    pub(super) fn record_completed(&mut self, index: usize) {
        let id = &self.steps[index].step.id;
        if !self.completed_step_ids.contains(id) {
            self.completed_step_ids.push(id.clone());
        }
    }

    pub(super) fn mark_finished(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_steps;

    #[test]
    fn test_new_activates_first_step() {
        let state = WorkflowState::new(default_steps()).expect("valid definition");

        assert_eq!(state.current_index(), 0);
        assert_eq!(state.current_step().step.id, "detection");
        assert_eq!(state.current_step().status, StepStatus::Active);
        assert!(state.steps()[1..].iter().all(|e| e.status == StepStatus::Pending));
        assert!(state.completed_step_ids().is_empty());
        assert!(state.is_consistent());
    }

    #[test]
    fn test_empty_definition_rejected() {
        let err = WorkflowState::new(Vec::new()).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidDefinition(_)));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let steps = vec![Step::new("a", "A", ""), Step::new("a", "Again", "")];
        let err = WorkflowState::new(steps).unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidDefinition(ref msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_starting_at_later_step_completes_earlier_ones() {
        let state = WorkflowState::starting_at(default_steps(), &StepId::new("masking"))
            .expect("valid start");

        assert_eq!(state.current_index(), 2);
        assert_eq!(state.status_of(&StepId::new("detection")), Some(StepStatus::Completed));
        assert_eq!(state.status_of(&StepId::new("policy")), Some(StepStatus::Completed));
        assert_eq!(state.status_of(&StepId::new("masking")), Some(StepStatus::Active));
        assert_eq!(state.status_of(&StepId::new("qa")), Some(StepStatus::Pending));
        assert_eq!(state.progress_summary(), ProgressSummary { completed: 2, total: 4 });
        assert!(state.is_consistent());
    }

    #[test]
    fn test_starting_at_unknown_step() {
        let err = WorkflowState::starting_at(default_steps(), &StepId::new("export")).unwrap_err();
        assert_eq!(err, WorkflowError::UnknownStep(StepId::new("export")));
    }

    #[test]
    fn test_serialized_steps_are_flat() {
        let state = WorkflowState::new(default_steps()).expect("valid definition");
        let json = serde_json::to_value(&state).expect("serialize");

        assert_eq!(json["steps"][0]["id"], "detection");
        assert_eq!(json["steps"][0]["name"], "Detection");
        assert_eq!(json["steps"][0]["status"], "active");
        assert_eq!(json["current_index"], 0);
        assert_eq!(json["finished"], false);
    }
}
