//! Hand-off of staged attachments to the review workflow.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::document::validator::{TemplateValidator, ValidationResult};
use crate::intake::retriever::SavedAttachment;

/// Receives every attachment the processor stages.
#[async_trait]
pub trait ReviewHandoff: Send + Sync {
    async fn hand_off(&self, saved: &SavedAttachment);
}

/// Validates each staged file against the template and logs the outcome.
pub struct ValidatingHandoff {
    validator: Arc<TemplateValidator>,
}

impl ValidatingHandoff {
    pub fn new(validator: Arc<TemplateValidator>) -> Self {
        Self { validator }
    }

    /// Read the staged file and validate it off the async runtime.
    pub async fn validate_file(&self, saved: &SavedAttachment) -> std::io::Result<ValidationResult> {
        let bytes = tokio::fs::read(&saved.path).await?;
        let validator = Arc::clone(&self.validator);
        tokio::task::spawn_blocking(move || validator.validate(&bytes))
            .await
            .map_err(std::io::Error::other)
    }
}

impl Default for ValidatingHandoff {
    fn default() -> Self {
        Self::new(Arc::new(TemplateValidator::default()))
    }
}

#[async_trait]
impl ReviewHandoff for ValidatingHandoff {
    async fn hand_off(&self, saved: &SavedAttachment) {
        match self.validate_file(saved).await {
            Ok(result) if result.is_valid() => {
                let details = self.validator.details(result.extracted_text());
                info!(
                    message_id = %saved.message_id,
                    name = %saved.name,
                    project_name = %details.project_details.project_name,
                    property = %details.project_details.property,
                    date_needed = %details.project_details.date_needed,
                    "Document passed template validation"
                );
            }
            Ok(result) => {
                warn!(
                    message_id = %saved.message_id,
                    name = %saved.name,
                    errors = ?result.errors(),
                    "Document failed template validation"
                );
            }
            Err(e) => {
                warn!(
                    message_id = %saved.message_id,
                    path = %saved.path.display(),
                    error = %e,
                    "Could not validate staged document"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redline::render;

    #[tokio::test]
    async fn validates_staged_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Menu.docx");
        tokio::fs::write(&path, render("Hello PROJECT DESIGN DETAILS world").unwrap())
            .await
            .unwrap();

        let saved = SavedAttachment {
            message_id: "m1".into(),
            name: "Menu.docx".into(),
            path,
        };
        let result = ValidatingHandoff::default().validate_file(&saved).await.unwrap();
        assert!(!result.is_valid());
        assert_eq!(result.extracted_text(), "Hello PROJECT DESIGN DETAILS world");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let saved = SavedAttachment {
            message_id: "m1".into(),
            name: "gone.docx".into(),
            path: "/nonexistent/gone.docx".into(),
        };
        assert!(ValidatingHandoff::default().validate_file(&saved).await.is_err());
    }
}
