//! Masking plan
//!
//! Tracks which masking technique the reviewer assigned to each detection
//! and which detections are selected for a batch apply. Previews of the
//! masked values are derived from the assignments on every snapshot.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};
use veil_common::events::{EventBus, VeilEvent};

use super::{FindingsSource, MaskingOption, PiiDetection, StepFindings};
use crate::models::step::{DETECTION, MASKING};

pub const SUBSTITUTION: &str = "substitution";
pub const REDACTION: &str = "redaction";
pub const PARTIAL: &str = "partial";

/// Masking plan errors
#[derive(Debug, Error)]
pub enum MaskingError {
    #[error("Detection not found: {0}")]
    UnknownDetection(String),

    #[error("Unknown masking option: {0}")]
    UnknownOption(String),
}

/// Preview of `detection` once `option_id` is applied
///
/// No option, or one this preview does not know, leaves the value as is.
pub fn masked_value(detection: &PiiDetection, option_id: Option<&str>) -> String {
    let pii_type = detection.pii_type.as_str();
    let value = detection.extracted_value.as_str();

    match option_id {
        Some(SUBSTITUTION) => match pii_type {
            "Email Address" => "jane.smith@email.com",
            "Phone Number" => "(555) 987-6543",
            "Social Security Number" => "***-**-5678",
            "Credit Card Number" => "****-****-****-5678",
            "Date of Birth" => "03/22/1990",
            _ => "SUBSTITUTED_VALUE",
        }
        .to_string(),
        Some(REDACTION) => "[REDACTED]".to_string(),
        Some(PARTIAL) => match pii_type {
            "Email Address" => "j***.***@email.com".to_string(),
            "Phone Number" => "(***) ***-4567".to_string(),
            "Social Security Number" => "***-**-****".to_string(),
            "Credit Card Number" => "****-****-****-1234".to_string(),
            _ => partial_mask(value),
        },
        _ => value.to_string(),
    }
}

/// Keep the first and last two characters; shorter values are fully hidden
fn partial_mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 4 {
        return "*".repeat(chars.len());
    }

    let mut masked: String = chars[..2].iter().collect();
    masked.push_str(&"*".repeat(chars.len() - 4));
    masked.extend(&chars[chars.len() - 2..]);
    masked
}

/// One row of the masking table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskingPreviewRow {
    pub detection_id: String,
    pub pii_type: String,
    pub location: String,
    pub original: String,
    /// Assigned technique; `None` shows as "Pending"
    pub option_id: Option<String>,
    pub masked: String,
    pub selected: bool,
}

/// Masking step state as rendered by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskingSnapshot {
    pub options: Vec<MaskingOption>,
    /// Detection ids selected for batch apply, in selection order
    pub selected: Vec<String>,
    /// Detections with a technique assigned
    pub assigned: usize,
    pub rows: Vec<MaskingPreviewRow>,
}

#[derive(Debug, Default)]
struct Selection {
    assignments: HashMap<String, String>,
    selected: Vec<String>,
}

/// Session masking plan
pub struct MaskingPlan {
    detections: Vec<PiiDetection>,
    options: Vec<MaskingOption>,
    selection: RwLock<Selection>,
    event_bus: EventBus,
}

impl MaskingPlan {
    pub fn new(
        detections: Vec<PiiDetection>,
        options: Vec<MaskingOption>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            detections,
            options,
            selection: RwLock::new(Selection::default()),
            event_bus,
        }
    }

    /// Plan over the detection and masking findings of `source`
    pub fn from_source(source: &dyn FindingsSource, event_bus: EventBus) -> Self {
        let detections = match source.findings_for(DETECTION) {
            Some(StepFindings::Detections(items)) => items,
            _ => Vec::new(),
        };
        let options = match source.findings_for(MASKING) {
            Some(StepFindings::MaskingOptions(items)) => items,
            _ => Vec::new(),
        };
        Self::new(detections, options, event_bus)
    }

    /// Assign `option_id` to one detection, replacing any earlier choice
    pub async fn assign(
        &self,
        detection_id: &str,
        option_id: &str,
    ) -> Result<MaskingSnapshot, MaskingError> {
        self.check_detection(detection_id)?;
        self.check_option(option_id)?;

        let snapshot = {
            let mut selection = self.selection.write().await;
            selection
                .assignments
                .insert(detection_id.to_string(), option_id.to_string());
            self.snapshot_of(&selection)
        };

        debug!(detection_id = %detection_id, option_id = %option_id, "Masking option assigned");
        self.emit_changed(&snapshot);
        Ok(snapshot)
    }

    /// Flip one detection in or out of the batch selection
    pub async fn toggle(&self, detection_id: &str) -> Result<MaskingSnapshot, MaskingError> {
        self.check_detection(detection_id)?;

        let snapshot = {
            let mut selection = self.selection.write().await;
            match selection.selected.iter().position(|id| id == detection_id) {
                Some(index) => {
                    selection.selected.remove(index);
                }
                None => selection.selected.push(detection_id.to_string()),
            }
            self.snapshot_of(&selection)
        };

        self.emit_changed(&snapshot);
        Ok(snapshot)
    }

    /// Select every detection, or clear the selection when all are selected
    pub async fn toggle_all(&self) -> MaskingSnapshot {
        let snapshot = {
            let mut selection = self.selection.write().await;
            if selection.selected.len() == self.detections.len() {
                selection.selected.clear();
            } else {
                selection.selected = self.detections.iter().map(|d| d.id.clone()).collect();
            }
            self.snapshot_of(&selection)
        };

        self.emit_changed(&snapshot);
        snapshot
    }

    /// Assign `option_id` to every selected detection
    ///
    /// The selection itself is kept; an empty selection changes nothing.
    pub async fn apply_to_selected(
        &self,
        option_id: &str,
    ) -> Result<MaskingSnapshot, MaskingError> {
        self.check_option(option_id)?;

        let (snapshot, applied) = {
            let mut selection = self.selection.write().await;
            let targets = selection.selected.clone();
            for detection_id in &targets {
                selection
                    .assignments
                    .insert(detection_id.clone(), option_id.to_string());
            }
            (self.snapshot_of(&selection), targets.len())
        };

        if applied > 0 {
            info!(option_id = %option_id, detections = applied, "Batch masking applied");
            self.emit_changed(&snapshot);
        }
        Ok(snapshot)
    }

    pub async fn snapshot(&self) -> MaskingSnapshot {
        self.snapshot_of(&*self.selection.read().await)
    }

    /// Drop every assignment and the selection
    pub async fn reset(&self) {
        *self.selection.write().await = Selection::default();
    }

    fn snapshot_of(&self, selection: &Selection) -> MaskingSnapshot {
        let rows = self
            .detections
            .iter()
            .map(|detection| {
                let option_id = selection.assignments.get(&detection.id).cloned();
                MaskingPreviewRow {
                    detection_id: detection.id.clone(),
                    pii_type: detection.pii_type.clone(),
                    location: detection.location.clone(),
                    original: detection.extracted_value.clone(),
                    masked: masked_value(detection, option_id.as_deref()),
                    selected: selection.selected.contains(&detection.id),
                    option_id,
                }
            })
            .collect();

        MaskingSnapshot {
            options: self.options.clone(),
            selected: selection.selected.clone(),
            assigned: selection.assignments.len(),
            rows,
        }
    }

    fn check_detection(&self, detection_id: &str) -> Result<(), MaskingError> {
        if self.detections.iter().any(|d| d.id == detection_id) {
            Ok(())
        } else {
            Err(MaskingError::UnknownDetection(detection_id.to_string()))
        }
    }

    fn check_option(&self, option_id: &str) -> Result<(), MaskingError> {
        if self.options.iter().any(|o| o.id == option_id) {
            Ok(())
        } else {
            Err(MaskingError::UnknownOption(option_id.to_string()))
        }
    }

    fn emit_changed(&self, snapshot: &MaskingSnapshot) {
        self.event_bus.emit_lossy(VeilEvent::MaskingSelectionChanged {
            assigned: snapshot.assigned,
            selected: snapshot.selected.len(),
            timestamp: chrono::Utc::now(),
        });
    }
}
