//! Step navigator
//!
//! Pure transition functions over [`WorkflowState`]. Each takes the current
//! value and returns the next one; the input is never modified. Refused
//! transitions return [`WorkflowError::InvalidTransition`].

use super::error::{Transition, WorkflowError, WorkflowResult};
use super::state::WorkflowState;
use crate::models::{StepId, StepStatus};

/// Complete the active step and activate the following one
pub fn advance(state: &WorkflowState) -> WorkflowResult<WorkflowState> {
    ensure_in_progress(state, Transition::Advance)?;

    let current = state.current_index();
    if current >= state.last_index() {
        return Err(WorkflowError::invalid(
            Transition::Advance,
            "already at the last step",
        ));
    }

    let mut next = state.clone();
    next.set_status(current, StepStatus::Completed);
    next.record_completed(current);
    next.set_status(current + 1, StepStatus::Active);
    next.set_current_index(current + 1);
    Ok(next)
}

/// Reset the active step to pending and re-activate the preceding one
///
/// The completion history keeps the retreated-from step.
pub fn retreat(state: &WorkflowState) -> WorkflowResult<WorkflowState> {
    ensure_in_progress(state, Transition::Retreat)?;

    let current = state.current_index();
    if current == 0 {
        return Err(WorkflowError::invalid(
            Transition::Retreat,
            "already at the first step",
        ));
    }

    let mut next = state.clone();
    next.set_status(current, StepStatus::Pending);
    next.set_status(current - 1, StepStatus::Active);
    next.set_current_index(current - 1);
    Ok(next)
}

/// Jump to a step that is `Completed` or `Active`
///
/// Jumping to the active step returns an identical state. Otherwise the jump
/// is carried out as repeated [`advance`] (forward) or [`retreat`]
/// (backward), so the status ordering holds on arrival.
pub fn jump_to(state: &WorkflowState, target: &StepId) -> WorkflowResult<WorkflowState> {
    ensure_in_progress(state, Transition::JumpTo)?;

    let target_index = state
        .index_of(target)
        .ok_or_else(|| WorkflowError::UnknownStep(target.clone()))?;

    match state.steps()[target_index].status {
        StepStatus::Pending => {
            return Err(WorkflowError::invalid(
                Transition::JumpTo,
                format!("step {} has not been reached", target),
            ))
        }
        StepStatus::Active => return Ok(state.clone()),
        StepStatus::Completed => {}
    }

    let mut next = state.clone();
    while next.current_index() < target_index {
        next = advance(&next)?;
    }
    while next.current_index() > target_index {
        next = retreat(&next)?;
    }
    Ok(next)
}

/// Complete the last step, entering the terminal state
///
/// This is the "complete processing" action; it lives beside the navigation
/// transitions rather than being an `advance` past the end.
pub fn finish(state: &WorkflowState) -> WorkflowResult<WorkflowState> {
    ensure_in_progress(state, Transition::Finish)?;

    if !state.is_last_step() {
        return Err(WorkflowError::invalid(
            Transition::Finish,
            "only the last step can complete the workflow",
        ));
    }

    let current = state.current_index();
    let mut next = state.clone();
    next.set_status(current, StepStatus::Completed);
    next.record_completed(current);
    next.mark_finished();
    Ok(next)
}

fn ensure_in_progress(state: &WorkflowState, action: Transition) -> WorkflowResult<()> {
    if state.is_finished() {
        return Err(WorkflowError::invalid(action, "workflow already completed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_steps;

    fn id(s: &str) -> StepId {
        StepId::new(s)
    }

    fn fresh() -> WorkflowState {
        WorkflowState::new(default_steps()).expect("valid definition")
    }

    #[test]
    fn test_advance_moves_active_forward() {
        let state = fresh();
        let next = advance(&state).expect("advance");

        assert_eq!(next.current_index(), 1);
        assert_eq!(next.status_of(&id("detection")), Some(StepStatus::Completed));
        assert_eq!(next.status_of(&id("policy")), Some(StepStatus::Active));
        assert_eq!(next.completed_step_ids(), &[id("detection")]);

        // Input untouched
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.status_of(&id("detection")), Some(StepStatus::Active));
    }

    #[test]
    fn test_advance_at_last_step_is_invalid() {
        let mut state = fresh();
        for _ in 0..3 {
            state = advance(&state).expect("advance");
        }
        let err = advance(&state).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition { action: Transition::Advance, .. }
        ));
    }

    #[test]
    fn test_retreat_at_first_step_is_invalid() {
        let err = retreat(&fresh()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition { action: Transition::Retreat, .. }
        ));
    }

    #[test]
    fn test_retreat_keeps_completion_history() {
        let advanced = advance(&fresh()).expect("advance");
        let back = retreat(&advanced).expect("retreat");

        assert_eq!(back.current_index(), 0);
        assert_eq!(back.status_of(&id("detection")), Some(StepStatus::Active));
        assert_eq!(back.status_of(&id("policy")), Some(StepStatus::Pending));
        assert_eq!(back.completed_step_ids(), &[id("detection")]);
    }

    #[test]
    fn test_readvancing_does_not_duplicate_history() {
        let state = advance(&fresh()).expect("advance");
        let state = retreat(&state).expect("retreat");
        let state = advance(&state).expect("advance again");

        assert_eq!(state.completed_step_ids(), &[id("detection")]);
        assert_eq!(state.progress_summary().completed, 1);
    }

    #[test]
    fn test_jump_to_pending_is_invalid() {
        let err = jump_to(&fresh(), &id("masking")).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition { action: Transition::JumpTo, .. }
        ));
    }

    #[test]
    fn test_jump_to_unknown_step() {
        let err = jump_to(&fresh(), &id("export")).unwrap_err();
        assert_eq!(err, WorkflowError::UnknownStep(id("export")));
    }

    #[test]
    fn test_jump_to_active_is_noop() {
        let state = advance(&fresh()).expect("advance");
        let same = jump_to(&state, &id("policy")).expect("jump");
        assert_eq!(same, state);
    }

    #[test]
    fn test_jump_backward_resets_later_steps() {
        let mut state = fresh();
        for _ in 0..3 {
            state = advance(&state).expect("advance");
        }

        let back = jump_to(&state, &id("policy")).expect("jump");

        assert_eq!(back.current_index(), 1);
        assert_eq!(back.status_of(&id("detection")), Some(StepStatus::Completed));
        assert_eq!(back.status_of(&id("policy")), Some(StepStatus::Active));
        assert_eq!(back.status_of(&id("masking")), Some(StepStatus::Pending));
        assert_eq!(back.status_of(&id("qa")), Some(StepStatus::Pending));
        assert_eq!(back.progress_summary().completed, 3);
        assert!(back.is_consistent());
    }

    #[test]
    fn test_finish_only_from_last_step() {
        let err = finish(&fresh()).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition { action: Transition::Finish, .. }
        ));

        let mut state = fresh();
        for _ in 0..3 {
            state = advance(&state).expect("advance");
        }
        let done = finish(&state).expect("finish");

        assert!(done.is_finished());
        assert!(done.steps().iter().all(|e| e.status == StepStatus::Completed));
        assert_eq!(done.progress_summary().completed, 4);
        assert!(done.is_consistent());
    }

    #[test]
    fn test_finished_workflow_refuses_navigation() {
        let mut state = fresh();
        for _ in 0..3 {
            state = advance(&state).expect("advance");
        }
        let done = finish(&state).expect("finish");

        assert!(advance(&done).is_err());
        assert!(retreat(&done).is_err());
        assert!(jump_to(&done, &id("detection")).is_err());
        assert!(finish(&done).is_err());
    }
}
