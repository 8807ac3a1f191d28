use crate::error::AttachmentUploadError;
use crate::models::{Attachment, IdRef, UploadedPicture};
use crate::services::PictureUploadService;
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of uploading a batch, successes in selection order
#[derive(Debug, Default)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedPicture>,
    pub failed: Vec<AttachmentUploadError>,
}

impl UploadReport {
    pub fn requested(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }

    /// Something was requested and nothing made it
    pub fn all_failed(&self) -> bool {
        self.requested() > 0 && self.uploaded.is_empty()
    }

    pub fn references(&self) -> Vec<IdRef> {
        self.uploaded.iter().map(|p| IdRef { id: p.id }).collect()
    }

    fn record(mut self, outcome: Result<UploadedPicture, AttachmentUploadError>) -> Self {
        match outcome {
            Ok(picture) => self.uploaded.push(picture),
            Err(err) => self.failed.push(err),
        }
        self
    }
}

/// Turns local attachments into stored picture references
pub struct AttachmentUploader {
    service: Arc<dyn PictureUploadService>,
}

impl AttachmentUploader {
    pub fn new(service: Arc<dyn PictureUploadService>) -> Self {
        Self { service }
    }

    pub async fn upload(
        &self,
        attachment: &Attachment,
    ) -> Result<UploadedPicture, AttachmentUploadError> {
        let failure = |reason: String| AttachmentUploadError {
            file_name: attachment.file_name.clone(),
            reason,
        };

        let bytes = attachment.read().await.map_err(|e| failure(e.to_string()))?;
        let picture = self
            .service
            .upload(bytes, &attachment.file_name)
            .await
            .map_err(|e| failure(e.to_string()))?;

        debug!("Uploaded {} as picture {}", attachment.file_name, picture.id);
        Ok(picture)
    }

    /// Upload one file at a time, keeping going past failures.
    ///
    /// `on_failure` fires as soon as a file fails, before the next one starts.
    pub async fn upload_all<F>(&self, attachments: &[Attachment], mut on_failure: F) -> UploadReport
    where
        F: FnMut(&AttachmentUploadError),
    {
        let mut report = UploadReport::default();
        for attachment in attachments {
            let outcome = self.upload(attachment).await;
            if let Err(err) = &outcome {
                warn!("{}", err);
                on_failure(err);
            }
            report = report.record(outcome);
        }
        report
    }
}
