//! Document processing workflow
//!
//! Four-stage linear pipeline: DETECTION → POLICY → MASKING → QA
//!
//! - `state`: the workflow value (step statuses, position, history)
//! - `navigator`: pure transitions over that value
//! - `controller`: owner that applies transitions and publishes snapshots
//! - `resolver`: step id → dashboard view

pub mod controller;
pub mod error;
pub mod navigator;
pub mod resolver;
pub mod state;

pub use controller::WorkflowController;
pub use error::{Transition, WorkflowError, WorkflowResult};
pub use resolver::{resolve_step_view, StepView};
pub use state::{ProgressSummary, StepEntry, WorkflowState};
