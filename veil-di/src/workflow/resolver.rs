//! Step content resolver
//!
//! Maps a step id to the dashboard view that renders the step's content.
//! The views themselves live in the browser dashboard.

use serde::Serialize;

use crate::models::step::{DETECTION, MASKING, POLICY, QA};

/// Collaborator view mounted for a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StepView {
    DetectionView,
    PolicyView,
    MaskingView,
    #[serde(rename = "QAView")]
    QaView,
}

/// Resolve the view for a step id
///
/// Unknown ids resolve to `DetectionView`, the view of the first stage.
pub fn resolve_step_view(step_id: &str) -> StepView {
    match step_id {
        DETECTION => StepView::DetectionView,
        POLICY => StepView::PolicyView,
        MASKING => StepView::MaskingView,
        QA => StepView::QaView,
        // Default case: first-stage view
        _ => StepView::DetectionView,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_steps_resolve_to_their_views() {
        assert_eq!(resolve_step_view("detection"), StepView::DetectionView);
        assert_eq!(resolve_step_view("policy"), StepView::PolicyView);
        assert_eq!(resolve_step_view("masking"), StepView::MaskingView);
        assert_eq!(resolve_step_view("qa"), StepView::QaView);
    }

    #[test]
    fn test_unknown_step_falls_back_to_detection() {
        assert_eq!(resolve_step_view("export"), StepView::DetectionView);
        assert_eq!(resolve_step_view(""), StepView::DetectionView);
    }

    #[test]
    fn test_view_names_serialize_for_dashboard() {
        assert_eq!(serde_json::to_string(&StepView::QaView).expect("serialize"), "\"QAView\"");
        assert_eq!(
            serde_json::to_string(&StepView::PolicyView).expect("serialize"),
            "\"PolicyView\""
        );
    }
}
