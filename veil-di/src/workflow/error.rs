//! Workflow error taxonomy
//!
//! Every variant is recoverable: callers surface it as a disabled control or
//! an error response, never as a fault.

use std::fmt;
use thiserror::Error;

use crate::models::StepId;

/// Transition kinds the navigator can be asked to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advance,
    Retreat,
    JumpTo,
    Finish,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Transition::Advance => "advance",
            Transition::Retreat => "retreat",
            Transition::JumpTo => "jump",
            Transition::Finish => "finish",
        };
        f.write_str(text)
    }
}

/// Workflow error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Out-of-range advance/retreat, jump to an unreachable step, or any
    /// transition on a finished workflow
    #[error("Invalid transition ({action}): {reason}")]
    InvalidTransition { action: Transition, reason: String },

    /// Start attempted with zero completed documents
    #[error("Cannot start workflow: no completed documents")]
    EmptyUploadBatch,

    /// Start attempted while a workflow is already held
    #[error("Workflow already started")]
    AlreadyStarted,

    /// Navigation attempted before the workflow was started
    #[error("Workflow not started")]
    NotStarted,

    /// Step id not part of the workflow definition
    #[error("Unknown step: {0}")]
    UnknownStep(StepId),

    /// Step definitions are empty or contain duplicate ids
    #[error("Invalid workflow definition: {0}")]
    InvalidDefinition(String),
}

impl WorkflowError {
    pub(crate) fn invalid(action: Transition, reason: impl Into<String>) -> Self {
        WorkflowError::InvalidTransition {
            action,
            reason: reason.into(),
        }
    }
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
