//! Upload gate
//!
//! Accepts batches of files, simulates their transfer one after another, and
//! reports back once the whole batch has uploaded. The workflow can only be
//! started once at least one document has completed here.

mod gate;

pub use gate::{UploadBatch, UploadGate};

use thiserror::Error;
use uuid::Uuid;

/// Upload gate error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// Batch submitted without any files
    #[error("Upload batch is empty")]
    EmptyUploadBatch,

    /// Another batch is still being processed
    #[error("An upload batch is already in progress")]
    UploadInProgress,

    /// No document with this id
    #[error("Document not found: {0}")]
    NotFound(Uuid),

    /// Document has not reached a terminal status yet
    #[error("Document is still uploading: {0}")]
    StillUploading(Uuid),
}
