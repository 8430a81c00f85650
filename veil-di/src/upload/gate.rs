//! Sequential simulated upload
//!
//! One background task per batch walks the files in submission order. Each
//! accepted file steps from 0 to 100 percent, one `progress_step` per tick,
//! before the next file begins. Refused files are marked `Failed` and
//! skipped; they never abort the rest of the batch.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;
use veil_common::events::{EventBus, VeilEvent};
use veil_common::format::format_file_size;

use super::UploadError;
use crate::config::UploadSettings;
use crate::models::{FileDescriptor, UploadStatus, UploadedDocumentRef};

/// Accepted batch, returned to the submitter immediately
#[derive(Debug, Clone, serde::Serialize)]
pub struct UploadBatch {
    pub batch_id: Uuid,
    /// Refs at submission time (0% uploaded), in submission order
    pub documents: Vec<UploadedDocumentRef>,
}

/// Upload gate
pub struct UploadGate {
    settings: UploadSettings,
    documents: RwLock<Vec<UploadedDocumentRef>>,
    /// Batch currently being processed, if any
    active_batch: RwLock<Option<Uuid>>,
    event_bus: EventBus,
}

impl UploadGate {
    pub fn new(settings: UploadSettings, event_bus: EventBus) -> Self {
        Self {
            settings,
            documents: RwLock::new(Vec::new()),
            active_batch: RwLock::new(None),
            event_bus,
        }
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Submit a batch of files
    ///
    /// Returns as soon as the batch is accepted; the transfer runs on a
    /// background task. `on_all_uploaded` is called once, with this batch's
    /// refs in submission order, after the settle delay, and only when every
    /// file completed.
    pub async fn submit<F>(
        self: &Arc<Self>,
        files: Vec<FileDescriptor>,
        on_all_uploaded: F,
    ) -> Result<UploadBatch, UploadError>
    where
        F: FnOnce(Vec<UploadedDocumentRef>) + Send + 'static,
    {
        if files.is_empty() {
            return Err(UploadError::EmptyUploadBatch);
        }

        let batch_id = {
            let mut active = self.active_batch.write().await;
            if active.is_some() {
                return Err(UploadError::UploadInProgress);
            }
            let batch_id = Uuid::new_v4();
            *active = Some(batch_id);
            batch_id
        };

        let refs: Vec<UploadedDocumentRef> =
            files.iter().map(UploadedDocumentRef::from_descriptor).collect();
        self.documents.write().await.extend(refs.iter().cloned());

        info!(
            batch_id = %batch_id,
            file_count = files.len(),
            "Upload batch accepted"
        );
        self.event_bus.emit_lossy(VeilEvent::UploadBatchStarted {
            batch_id,
            file_count: files.len(),
            timestamp: chrono::Utc::now(),
        });

        let work: Vec<(Uuid, FileDescriptor)> =
            refs.iter().map(|r| r.id).zip(files.into_iter()).collect();
        let gate = Arc::clone(self);
        tokio::spawn(async move {
            gate.run_batch(batch_id, work, on_all_uploaded).await;
        });

        Ok(UploadBatch {
            batch_id,
            documents: refs,
        })
    }

    /// All documents, in submission order across batches
    pub async fn documents(&self) -> Vec<UploadedDocumentRef> {
        self.documents.read().await.clone()
    }

    /// Look up one document
    pub async fn document(&self, id: Uuid) -> Option<UploadedDocumentRef> {
        self.documents.read().await.iter().find(|d| d.id == id).cloned()
    }

    /// Documents that reached `Completed`
    pub async fn completed_count(&self) -> usize {
        self.documents
            .read()
            .await
            .iter()
            .filter(|d| d.is_completed())
            .count()
    }

    /// Whether a batch is currently being processed
    pub async fn is_uploading(&self) -> bool {
        self.active_batch.read().await.is_some()
    }

    /// Remove a completed or failed document
    pub async fn remove(&self, id: Uuid) -> Result<UploadedDocumentRef, UploadError> {
        let mut documents = self.documents.write().await;
        let index = documents
            .iter()
            .position(|d| d.id == id)
            .ok_or(UploadError::NotFound(id))?;

        if !documents[index].is_terminal() {
            return Err(UploadError::StillUploading(id));
        }

        let removed = documents.remove(index);
        info!(document_id = %id, file_name = %removed.name, "Document removed");
        Ok(removed)
    }

    /// Clear every document; refused while a batch is in flight
    pub async fn reset(&self) -> Result<(), UploadError> {
        let active = self.active_batch.read().await;
        if active.is_some() {
            return Err(UploadError::UploadInProgress);
        }
        self.documents.write().await.clear();
        Ok(())
    }

    /// Intake validation; `Some(reason)` when the file is refused
    fn rejection_reason(&self, file: &FileDescriptor) -> Option<String> {
        match file.extension() {
            Some(ext) if self.settings.accepts_extension(&ext) => {}
            Some(ext) => return Some(format!("Unsupported file type: .{}", ext)),
            None => return Some("File has no extension".to_string()),
        }

        if file.size_bytes > self.settings.max_file_size_bytes {
            return Some(format!(
                "File exceeds maximum size of {}",
                format_file_size(self.settings.max_file_size_bytes)
            ));
        }

        None
    }

    async fn run_batch<F>(
        self: Arc<Self>,
        batch_id: Uuid,
        work: Vec<(Uuid, FileDescriptor)>,
        on_all_uploaded: F,
    ) where
        F: FnOnce(Vec<UploadedDocumentRef>) + Send + 'static,
    {
        let mut settled = Vec::with_capacity(work.len());

        for (document_id, file) in &work {
            let status = match self.rejection_reason(file) {
                Some(reason) => {
                    warn!(
                        batch_id = %batch_id,
                        document_id = %document_id,
                        file_name = %file.name,
                        reason = %reason,
                        "Document rejected"
                    );
                    self.event_bus.emit_lossy(VeilEvent::DocumentRejected {
                        batch_id,
                        document_id: *document_id,
                        file_name: file.name.clone(),
                        reason: reason.clone(),
                        timestamp: chrono::Utc::now(),
                    });
                    UploadStatus::Failed { reason }
                }
                None => {
                    self.transfer(batch_id, *document_id, file).await;
                    info!(
                        batch_id = %batch_id,
                        document_id = %document_id,
                        file_name = %file.name,
                        size = %format_file_size(file.size_bytes),
                        "Document uploaded"
                    );
                    self.event_bus.emit_lossy(VeilEvent::DocumentUploaded {
                        batch_id,
                        document_id: *document_id,
                        file_name: file.name.clone(),
                        size_bytes: file.size_bytes,
                        timestamp: chrono::Utc::now(),
                    });
                    UploadStatus::Completed
                }
            };

            if let Some(document) = self.set_status(*document_id, status).await {
                settled.push(document);
            }
        }

        tokio::time::sleep(self.settings.settle_delay()).await;

        *self.active_batch.write().await = None;

        let completed = settled.iter().filter(|d| d.is_completed()).count();
        let failed = work.len() - completed;

        if failed == 0 {
            info!(batch_id = %batch_id, documents = completed, "Upload batch completed");
            self.event_bus.emit_lossy(VeilEvent::UploadBatchCompleted {
                batch_id,
                document_ids: settled.iter().map(|d| d.id).collect(),
                timestamp: chrono::Utc::now(),
            });
            on_all_uploaded(settled);
        } else {
            warn!(
                batch_id = %batch_id,
                completed,
                failed,
                "Upload batch settled with rejected documents"
            );
            self.event_bus.emit_lossy(VeilEvent::UploadBatchSettled {
                batch_id,
                completed,
                failed,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Step one file from 0 to 100 percent
    async fn transfer(&self, batch_id: Uuid, document_id: Uuid, file: &FileDescriptor) {
        let mut progress: u8 = 0;
        loop {
            tokio::time::sleep(self.settings.tick_interval()).await;
            self.set_status(document_id, UploadStatus::Uploading { progress })
                .await;

            debug!(
                document_id = %document_id,
                progress,
                "Upload progress"
            );
            self.event_bus.emit_lossy(VeilEvent::UploadProgress {
                batch_id,
                document_id,
                file_name: file.name.clone(),
                progress,
                timestamp: chrono::Utc::now(),
            });

            if progress >= 100 {
                break;
            }
            progress = progress.saturating_add(self.settings.progress_step).min(100);
        }
    }

    /// Update a document that has not settled yet; returns the updated ref
    async fn set_status(&self, id: Uuid, status: UploadStatus) -> Option<UploadedDocumentRef> {
        let mut documents = self.documents.write().await;
        let document = documents.iter_mut().find(|d| d.id == id)?;
        if document.is_terminal() {
            return None;
        }
        document.status = status;
        Some(document.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> UploadGate {
        UploadGate::new(UploadSettings::default(), EventBus::new(16))
    }

    #[test]
    fn test_rejection_reasons() {
        let gate = gate();

        assert_eq!(
            gate.rejection_reason(&FileDescriptor::new("report.pdf", 1024, "application/pdf")),
            None
        );
        assert_eq!(
            gate.rejection_reason(&FileDescriptor::new("NOTES.TXT", 10, "text/plain")),
            None
        );
        assert_eq!(
            gate.rejection_reason(&FileDescriptor::new("setup.exe", 10, "")),
            Some("Unsupported file type: .exe".to_string())
        );
        assert_eq!(
            gate.rejection_reason(&FileDescriptor::new("README", 10, "")),
            Some("File has no extension".to_string())
        );
        assert_eq!(
            gate.rejection_reason(&FileDescriptor::new("big.csv", 50 * 1024 * 1024 + 1, "text/csv")),
            Some("File exceeds maximum size of 50 MB".to_string())
        );
    }

    #[tokio::test]
    async fn test_remove_unknown_document() {
        let gate = gate();
        let id = Uuid::new_v4();
        assert_eq!(gate.remove(id).await.unwrap_err(), UploadError::NotFound(id));
    }

    #[tokio::test]
    async fn test_settled_document_is_not_updated() {
        let gate = gate();
        let file = FileDescriptor::new("a.pdf", 1, "application/pdf");
        let document = UploadedDocumentRef::from_descriptor(&file);
        let id = document.id;
        gate.documents.write().await.push(document);

        assert!(gate.set_status(id, UploadStatus::Completed).await.is_some());
        assert!(gate
            .set_status(id, UploadStatus::Uploading { progress: 10 })
            .await
            .is_none());
        assert!(gate.document(id).await.expect("present").is_completed());
    }
}
