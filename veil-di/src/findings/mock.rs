//! Static demonstration dataset

use super::{
    ComplianceFramework, ComplianceRequirement, ComplianceStatus, FindingsSource, MaskingOption,
    PiiDetection, QaIssueKind, QaResult, QaStatus, Severity, StepFindings,
};
use crate::models::step::{DETECTION, MASKING, POLICY, QA};

/// Findings source backed by fixed mock data
#[derive(Debug, Clone)]
pub struct MockFindings {
    detections: Vec<PiiDetection>,
    frameworks: Vec<ComplianceFramework>,
    masking_options: Vec<MaskingOption>,
    qa_results: Vec<QaResult>,
}

impl Default for MockFindings {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFindings {
    pub fn new() -> Self {
        Self {
            detections: detections(),
            frameworks: frameworks(),
            masking_options: masking_options(),
            qa_results: qa_results(),
        }
    }
}

impl FindingsSource for MockFindings {
    fn findings_for(&self, step_id: &str) -> Option<StepFindings> {
        match step_id {
            DETECTION => Some(StepFindings::Detections(self.detections.clone())),
            POLICY => Some(StepFindings::Compliance(self.frameworks.clone())),
            MASKING => Some(StepFindings::MaskingOptions(self.masking_options.clone())),
            QA => Some(StepFindings::QaResults(self.qa_results.clone())),
            _ => None,
        }
    }
}

fn detection(
    id: &str,
    pii_type: &str,
    extracted_value: &str,
    confidence: f64,
    location: &str,
    severity: Severity,
) -> PiiDetection {
    PiiDetection {
        id: id.to_string(),
        pii_type: pii_type.to_string(),
        extracted_value: extracted_value.to_string(),
        confidence,
        location: location.to_string(),
        severity,
    }
}

fn detections() -> Vec<PiiDetection> {
    vec![
        detection(
            "1",
            "Social Security Number",
            "***-**-****",
            0.95,
            "Document 1, Page 2, Line 15",
            Severity::High,
        ),
        detection(
            "2",
            "Email Address",
            "john.doe@email.com",
            0.98,
            "Document 1, Page 1, Line 8",
            Severity::Medium,
        ),
        detection(
            "3",
            "Phone Number",
            "(555) 123-4567",
            0.92,
            "Document 2, Page 1, Line 3",
            Severity::Medium,
        ),
        detection(
            "4",
            "Credit Card Number",
            "****-****-****-1234",
            0.97,
            "Document 3, Page 1, Line 12",
            Severity::High,
        ),
        detection(
            "5",
            "Date of Birth",
            "01/15/1985",
            0.89,
            "Document 1, Page 1, Line 5",
            Severity::Medium,
        ),
    ]
}

fn requirement(
    id: &str,
    name: &str,
    status: ComplianceStatus,
    description: &str,
) -> ComplianceRequirement {
    ComplianceRequirement {
        id: id.to_string(),
        name: name.to_string(),
        status,
        description: description.to_string(),
    }
}

fn frameworks() -> Vec<ComplianceFramework> {
    use ComplianceStatus::*;

    vec![
        ComplianceFramework {
            id: "gdpr".to_string(),
            name: "GDPR".to_string(),
            status: AtRisk,
            score: 75,
            requirements: vec![
                requirement("1", "Data Minimization", Satisfied, "Collect only necessary data"),
                requirement("2", "Consent Management", AtRisk, "Explicit user consent required"),
                requirement("3", "Right to Erasure", Satisfied, "Ability to delete personal data"),
            ],
        },
        ComplianceFramework {
            id: "hipaa".to_string(),
            name: "HIPAA".to_string(),
            status: Compliant,
            score: 92,
            requirements: vec![
                requirement("1", "Administrative Safeguards", Satisfied, "Security officer assigned"),
                requirement("2", "Physical Safeguards", Satisfied, "Facility access controls in place"),
                requirement("3", "Technical Safeguards", Satisfied, "Access control and encryption"),
            ],
        },
        ComplianceFramework {
            id: "dpdpa".to_string(),
            name: "DPDPA".to_string(),
            status: NonCompliant,
            score: 45,
            requirements: vec![
                requirement("1", "Data Localization", Violated, "Data must be stored in India"),
                requirement("2", "Data Protection Officer", AtRisk, "DPO appointment required"),
            ],
        },
        ComplianceFramework {
            id: "glba".to_string(),
            name: "GLBA".to_string(),
            status: Compliant,
            score: 88,
            requirements: vec![
                requirement("1", "Safeguards Rule", Satisfied, "Written information security program"),
                requirement("2", "Privacy Rule", Satisfied, "Privacy notices provided"),
            ],
        },
    ]
}

fn masking_options() -> Vec<MaskingOption> {
    [
        (
            "substitution",
            "Substitution",
            "Replace with realistic fake data",
            "john.doe@email.com → jane.smith@email.com",
        ),
        (
            "redaction",
            "Complete Redaction",
            "Replace entire value with placeholder",
            "john.doe@email.com → [REDACTED]",
        ),
        (
            "partial",
            "Partial Masking",
            "Hide part of the value",
            "john.doe@email.com → j***.***@email.com",
        ),
    ]
    .iter()
    .map(|(id, name, description, example)| MaskingOption {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        example: example.to_string(),
    })
    .collect()
}

fn qa_results() -> Vec<QaResult> {
    vec![
        QaResult {
            id: "1".to_string(),
            kind: QaIssueKind::MissedPii,
            description: "Potential SSN found but not detected: XXX-XX-XXXX".to_string(),
            severity: Severity::High,
            status: QaStatus::Pending,
        },
        QaResult {
            id: "2".to_string(),
            kind: QaIssueKind::FalsePositive,
            description: "Employee ID incorrectly flagged as SSN".to_string(),
            severity: Severity::Medium,
            status: QaStatus::Approved,
        },
        QaResult {
            id: "3".to_string(),
            kind: QaIssueKind::MaskingError,
            description: "Email masking left domain visible".to_string(),
            severity: Severity::Low,
            status: QaStatus::Rejected,
        },
    ]
}
