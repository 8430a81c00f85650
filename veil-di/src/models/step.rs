//! Workflow step definitions
//!
//! The processing workflow is a fixed linear sequence of stages:
//! DETECTION → POLICY → MASKING → QA

use serde::{Deserialize, Serialize};
use std::fmt;

pub use veil_common::events::StepStatus;

/// Stable step identifier (e.g. "detection")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl PartialEq<str> for StepId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StepId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One stage of the document workflow
///
/// Immutable once a workflow is constructed; ordinal position is implied by
/// its place in the step sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub name: String,
    pub description: String,
}

impl Step {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: StepId::new(id),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Identifier of the detection stage
pub const DETECTION: &str = "detection";
/// Identifier of the policy advisor stage
pub const POLICY: &str = "policy";
/// Identifier of the masking stage
pub const MASKING: &str = "masking";
/// Identifier of the quality assurance stage
pub const QA: &str = "qa";

/// The four-stage document processing workflow, in order
pub fn default_steps() -> Vec<Step> {
    vec![
        Step::new(
            DETECTION,
            "Detection",
            "AI scans and identifies PII across all documents",
        ),
        Step::new(
            POLICY,
            "Policy Advisor",
            "Compliance analysis and risk assessment",
        ),
        Step::new(
            MASKING,
            "Masking",
            "Apply data protection and anonymization",
        ),
        Step::new(
            QA,
            "Quality Assurance",
            "Human review and validation of results",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_steps_order() {
        let ids: Vec<String> = default_steps().into_iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["detection", "policy", "masking", "qa"]);
    }

    #[test]
    fn test_step_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&StepId::new("masking")).expect("serialize");
        assert_eq!(json, "\"masking\"");
        assert_eq!(StepId::from("qa"), "qa");
    }
}
