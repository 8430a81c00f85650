//! Document workflow type definitions
//!
//! Supporting types for veil-di workflow and upload progress tracking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single workflow step
///
/// Mutually exclusive per step at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not yet reached
    Pending,
    /// The step currently being worked on
    Active,
    /// Step has been passed
    Completed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StepStatus::Pending => "pending",
            StepStatus::Active => "active",
            StepStatus::Completed => "completed",
        };
        f.write_str(text)
    }
}

/// Per-step status carried by workflow SSE events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgressData {
    /// Stable step identifier (e.g. "detection")
    pub step_id: String,
    /// Display name (e.g. "Policy Advisor")
    pub name: String,
    /// Status at the time of the event
    pub status: StepStatus,
}

/// Navigation intent that produced a step change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationAction {
    /// Move to the following step
    Next,
    /// Move to the preceding step
    Previous,
    /// Jump to a specific reachable step
    Select,
}

impl fmt::Display for NavigationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            NavigationAction::Next => "next",
            NavigationAction::Previous => "previous",
            NavigationAction::Select => "select",
        };
        f.write_str(text)
    }
}
