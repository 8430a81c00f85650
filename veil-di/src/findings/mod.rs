//! Findings data access
//!
//! Each workflow step displays findings produced for the uploaded documents.
//! Step views fetch them through [`FindingsSource`]; [`MockFindings`] serves
//! the static demonstration dataset.

mod masking;
mod mock;
mod review;

pub use masking::{masked_value, MaskingError, MaskingPlan, MaskingPreviewRow, MaskingSnapshot};
pub use mock::MockFindings;
pub use review::{QaReview, ReviewDecision, ReviewSummary};

use serde::{Deserialize, Serialize};

/// Capability: given a step id, fetch its findings
pub trait FindingsSource: Send + Sync {
    /// `None` when the step has no findings of its own
    fn findings_for(&self, step_id: &str) -> Option<StepFindings>;
}

/// Findings shown by one step view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum StepFindings {
    Detections(Vec<PiiDetection>),
    Compliance(Vec<ComplianceFramework>),
    MaskingOptions(Vec<MaskingOption>),
    QaResults(Vec<QaResult>),
}

impl StepFindings {
    pub fn len(&self) -> usize {
        match self {
            StepFindings::Detections(items) => items.len(),
            StepFindings::Compliance(items) => items.len(),
            StepFindings::MaskingOptions(items) => items.len(),
            StepFindings::QaResults(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(format!("unknown severity: {}", other)),
        }
    }
}

/// PII occurrence found during detection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiiDetection {
    pub id: String,
    pub pii_type: String,
    pub extracted_value: String,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub location: String,
    pub severity: Severity,
}

/// Compliance status of a framework or requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    Compliant,
    AtRisk,
    NonCompliant,
    Satisfied,
    Violated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRequirement {
    pub id: String,
    pub name: String,
    pub status: ComplianceStatus,
    pub description: String,
}

/// Regulatory framework assessed by the policy advisor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceFramework {
    pub id: String,
    pub name: String,
    pub status: ComplianceStatus,
    /// 0 - 100
    pub score: u8,
    pub requirements: Vec<ComplianceRequirement>,
}

/// Masking technique offered in the masking step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskingOption {
    pub id: String,
    pub name: String,
    pub description: String,
    pub example: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QaIssueKind {
    MissedPii,
    FalsePositive,
    MaskingError,
}

/// Review status of a QA finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QaStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for QaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            QaStatus::Pending => "pending",
            QaStatus::Approved => "approved",
            QaStatus::Rejected => "rejected",
        };
        f.write_str(text)
    }
}

/// Issue raised during quality assurance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QaResult {
    pub id: String,
    pub kind: QaIssueKind,
    pub description: String,
    pub severity: Severity,
    pub status: QaStatus,
}

/// Detection list filter
///
/// `None` (or the value "all" on the query string) means no filtering.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionFilter {
    /// Case-insensitive substring of the extracted value or PII type
    pub search: Option<String>,
    /// Exact PII type
    #[serde(rename = "type")]
    pub pii_type: Option<String>,
    pub severity: Option<String>,
}

impl DetectionFilter {
    pub fn matches(&self, detection: &PiiDetection) -> bool {
        let search_ok = match active(&self.search) {
            Some(term) => {
                let term = term.to_lowercase();
                detection.extracted_value.to_lowercase().contains(&term)
                    || detection.pii_type.to_lowercase().contains(&term)
            }
            None => true,
        };

        let type_ok = match active(&self.pii_type) {
            Some(pii_type) => detection.pii_type == pii_type,
            None => true,
        };

        let severity_ok = match active(&self.severity) {
            Some(severity) => severity
                .parse::<Severity>()
                .map(|s| s == detection.severity)
                .unwrap_or(false),
            None => true,
        };

        search_ok && type_ok && severity_ok
    }

    pub fn apply(&self, detections: Vec<PiiDetection>) -> Vec<PiiDetection> {
        detections.into_iter().filter(|d| self.matches(d)).collect()
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    match value.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(v) if v.eq_ignore_ascii_case("all") => None,
        Some(v) => Some(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detections() -> Vec<PiiDetection> {
        match MockFindings::new().findings_for("detection") {
            Some(StepFindings::Detections(items)) => items,
            other => panic!("unexpected findings {:?}", other),
        }
    }

    #[test]
    fn test_default_filter_keeps_everything() {
        assert_eq!(DetectionFilter::default().apply(detections()).len(), 5);

        let all = DetectionFilter {
            search: Some(String::new()),
            pii_type: Some("all".to_string()),
            severity: Some("all".to_string()),
        };
        assert_eq!(all.apply(detections()).len(), 5);
    }

    #[test]
    fn test_search_matches_value_or_type() {
        let by_value = DetectionFilter {
            search: Some("JOHN.DOE".to_string()),
            ..Default::default()
        };
        let found = by_value.apply(detections());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pii_type, "Email Address");

        let by_type = DetectionFilter {
            search: Some("number".to_string()),
            ..Default::default()
        };
        assert_eq!(by_type.apply(detections()).len(), 3);
    }

    #[test]
    fn test_type_and_severity_filters_combine() {
        let high = DetectionFilter {
            severity: Some("high".to_string()),
            ..Default::default()
        };
        assert_eq!(high.apply(detections()).len(), 2);

        let high_card = DetectionFilter {
            pii_type: Some("Credit Card Number".to_string()),
            severity: Some("high".to_string()),
            ..Default::default()
        };
        let found = high_card.apply(detections());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "4");
    }

    #[test]
    fn test_unknown_severity_matches_nothing() {
        let filter = DetectionFilter {
            severity: Some("critical".to_string()),
            ..Default::default()
        };
        assert!(filter.apply(detections()).is_empty());
    }

    #[test]
    fn test_findings_serialize_tagged() {
        let findings = StepFindings::MaskingOptions(Vec::new());
        let json = serde_json::to_value(&findings).expect("serialize");
        assert_eq!(json["kind"], "masking_options");
        assert!(json["items"].as_array().expect("items").is_empty());
    }
}
