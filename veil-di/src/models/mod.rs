//! Data models for veil-di (Document Ingestion service)
//!
//! - Workflow step definitions and statuses
//! - Uploaded document references

pub mod document;
pub mod step;

pub use document::{FileDescriptor, UploadStatus, UploadedDocumentRef};
pub use step::{default_steps, Step, StepId, StepStatus};
