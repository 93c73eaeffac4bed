//! Attachment download and staging.

use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::RetrievalError;
use crate::intake::staging::StagingArea;
use crate::intake::store::{AttachmentSummary, Message, MessageStore};

/// The only attachment type that is downloaded.
pub const ACCEPTED_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A downloaded attachment with decoded content.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

impl Attachment {
    /// Decode transport-encoded (base64) content for `summary`.
    pub fn decode(summary: &AttachmentSummary, content_bytes: &str) -> Result<Self, RetrievalError> {
        let compact: String = content_bytes
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let content = STANDARD
            .decode(compact)
            .map_err(|e| RetrievalError::Decode {
                attachment_id: summary.id.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            id: summary.id.clone(),
            name: summary.name.clone(),
            content_type: summary.content_type.clone(),
            content,
        })
    }
}

/// An attachment written to staging, ready for validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedAttachment {
    pub message_id: String,
    pub name: String,
    pub path: PathBuf,
}

/// Downloads accepted attachments of qualifying messages into staging.
pub struct AttachmentRetriever {
    store: Arc<dyn MessageStore>,
    staging: StagingArea,
}

impl AttachmentRetriever {
    /// Create a retriever, preparing the staging directory.
    pub async fn new(
        store: Arc<dyn MessageStore>,
        staging_dir: impl Into<PathBuf>,
    ) -> Result<Self, RetrievalError> {
        let staging = StagingArea::prepare(staging_dir).await?;
        Ok(Self { store, staging })
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    /// Fetch, decode and stage every attachment of the accepted type.
    ///
    /// Fails on the first attachment that cannot be fetched, decoded or
    /// written. Files this call already staged are removed before the error
    /// is returned, so a failed entry leaves nothing behind.
    pub async fn fetch_qualifying_attachments(
        &self,
        message: &Message,
    ) -> Result<Vec<SavedAttachment>, RetrievalError> {
        let mut saved = Vec::new();
        match self.stage_all(message, &mut saved).await {
            Ok(()) => Ok(saved),
            Err(e) => {
                self.discard(&saved).await;
                Err(e)
            }
        }
    }

    async fn stage_all(
        &self,
        message: &Message,
        saved: &mut Vec<SavedAttachment>,
    ) -> Result<(), RetrievalError> {
        let summaries = self.store.list_attachments(&message.id).await?;

        for summary in summaries {
            if summary.content_type != ACCEPTED_CONTENT_TYPE {
                debug!(
                    message_id = %message.id,
                    name = %summary.name,
                    content_type = %summary.content_type,
                    "Skipping attachment of unaccepted type"
                );
                continue;
            }

            let encoded = self
                .store
                .attachment_content(&message.id, &summary.id)
                .await?;
            let attachment = Attachment::decode(&summary, &encoded)?;
            let path = self
                .staging
                .write(&attachment.name, &attachment.content)
                .await?;

            info!(
                message_id = %message.id,
                name = %attachment.name,
                bytes = attachment.content.len(),
                path = %path.display(),
                "Staged attachment"
            );
            saved.push(SavedAttachment {
                message_id: message.id.clone(),
                name: attachment.name,
                path,
            });
        }

        Ok(())
    }

    async fn discard(&self, saved: &[SavedAttachment]) {
        for file in saved {
            match tokio::fs::remove_file(&file.path).await {
                Ok(()) => debug!(
                    message_id = %file.message_id,
                    path = %file.path.display(),
                    "Removed partially staged attachment"
                ),
                Err(e) => warn!(
                    message_id = %file.message_id,
                    path = %file.path.display(),
                    error = %e,
                    "Failed to remove partially staged attachment"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> AttachmentSummary {
        AttachmentSummary {
            id: "a1".into(),
            name: "Menu.docx".into(),
            content_type: ACCEPTED_CONTENT_TYPE.into(),
        }
    }

    #[test]
    fn decodes_base64_content() {
        let att = Attachment::decode(&summary(), "aGVsbG8gbWVudQ==").unwrap();
        assert_eq!(att.content, b"hello menu");
        assert_eq!(att.name, "Menu.docx");
    }

    #[test]
    fn decode_tolerates_line_wrapping() {
        let att = Attachment::decode(&summary(), "aGVsbG8g\r\nbWVudQ==\n").unwrap();
        assert_eq!(att.content, b"hello menu");
    }

    #[test]
    fn invalid_base64_is_a_decode_error() {
        let err = Attachment::decode(&summary(), "not base64 !!").unwrap_err();
        assert!(matches!(err, RetrievalError::Decode { ref attachment_id, .. } if attachment_id == "a1"));
    }
}
