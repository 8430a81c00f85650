//! Uploaded document references
//!
//! A reference is created when a file is submitted, mutated only by the
//! upload progress reporter, and frozen once it reaches a terminal status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File selected or dropped by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name including extension
    pub name: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Declared media type (e.g. "application/pdf")
    #[serde(default)]
    pub media_type: String,
}

impl FileDescriptor {
    pub fn new(name: &str, size_bytes: u64, media_type: &str) -> Self {
        Self {
            name: name.to_string(),
            size_bytes,
            media_type: media_type.to_string(),
        }
    }

    /// Lowercased extension without the dot, if any
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// Upload status of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum UploadStatus {
    /// Transfer in progress (0-100)
    Uploading { progress: u8 },
    /// Transfer finished
    Completed,
    /// Document refused; siblings in the batch are unaffected
    Failed { reason: String },
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStatus::Completed | UploadStatus::Failed { .. })
    }
}

/// Document accepted by the upload gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocumentRef {
    pub id: Uuid,
    pub name: String,
    pub size_bytes: u64,
    pub media_type: String,
    pub status: UploadStatus,
    pub submitted_at: DateTime<Utc>,
}

impl UploadedDocumentRef {
    /// Create a reference for a freshly submitted file (0% uploaded)
    pub fn from_descriptor(file: &FileDescriptor) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: file.name.clone(),
            size_bytes: file.size_bytes,
            media_type: file.media_type.clone(),
            status: UploadStatus::Uploading { progress: 0 },
            submitted_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == UploadStatus::Completed
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
