//! Template compliance validation.
//!
//! Check order:
//! 1. Text extraction (failure → single error, stop)
//! 2. Variant detection (no sentinel → two errors, stop)
//! 3. Header / form-field / SOP phrase groups
//! 4. Boundary marker
//! 5. Minimum document length
//! 6. Minimum content after the boundary marker
//!
//! Steps 3–6 always all run. Every failure is returned as data.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::document::details::DocumentDetails;
use crate::document::extract::{DocxTextExtractor, TextExtractor};
use crate::document::schema::{TemplateKind, TemplateSchema};
use crate::error::ExtractionError;

/// Outcome of validating one document.
///
/// `is_valid` is derived from `errors`, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    is_valid: bool,
    errors: Vec<String>,
    #[serde(rename = "text")]
    extracted_text: String,
}

impl ValidationResult {
    fn new(errors: Vec<String>, extracted_text: String) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            extracted_text,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Violations in the order the checks ran.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Extracted document text; empty when extraction failed.
    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }
}

/// Validates document buffers against a [`TemplateSchema`].
#[derive(Clone)]
pub struct TemplateValidator {
    schema: Arc<TemplateSchema>,
    extractor: Arc<dyn TextExtractor>,
}

impl Default for TemplateValidator {
    fn default() -> Self {
        Self::new(
            Arc::new(TemplateSchema::standard()),
            Arc::new(DocxTextExtractor),
        )
    }
}

impl TemplateValidator {
    pub fn new(schema: Arc<TemplateSchema>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { schema, extractor }
    }

    pub fn schema(&self) -> &TemplateSchema {
        &self.schema
    }

    /// Validate a document buffer. Never fails; problems become `errors`.
    pub fn validate(&self, document: &[u8]) -> ValidationResult {
        match self.extractor.extract_text(document) {
            Ok(text) => self.validate_text(text),
            Err(e) => {
                debug!(error = %e, "Document text extraction failed");
                ValidationResult::new(vec![format!("Could not read document: {e}")], String::new())
            }
        }
    }

    /// Run the structural checks against already-extracted text.
    pub fn validate_text(&self, text: String) -> ValidationResult {
        let schema = &*self.schema;
        let mut errors = Vec::new();

        let Some(kind) = schema.detect_variant(&text) else {
            errors.push("Document is not a recognized menu design brief template".to_string());
            errors.push(
                "Please use the official food or beverage menu template and resubmit".to_string(),
            );
            return ValidationResult::new(errors, text);
        };
        debug!(template = kind.label(), "Detected template variant");

        for group in &schema.groups {
            for rule in &group.rules {
                if !text.contains(rule.phrase) {
                    errors.push(format!("{}: {}", group.label, rule.element));
                }
            }
        }

        let marker_found = text.contains(schema.boundary_marker);
        if !marker_found {
            errors.push(format!(
                "Missing boundary marker: \"{}\"",
                schema.boundary_marker
            ));
            errors.push(
                "Keep the boundary marker line from the template and place the menu content below it"
                    .to_string(),
            );
        }

        let text_chars = text.trim().chars().count();
        if text_chars < schema.min_text_chars {
            errors.push(format!(
                "Document content is too short ({text_chars} characters; at least {} required)",
                schema.min_text_chars
            ));
        }

        if marker_found {
            let content_chars = self
                .menu_content(&text)
                .map_or(0, |content| content.chars().count());
            if content_chars < schema.min_content_chars {
                errors.push("No menu content found after the boundary marker".to_string());
                errors.push(format!(
                    "Add at least {} characters of menu content below the boundary marker",
                    schema.min_content_chars
                ));
            }
        }

        ValidationResult::new(errors, text)
    }

    /// Template variant of `text`, if any sentinel is present.
    pub fn detect(&self, text: &str) -> Option<TemplateKind> {
        self.schema.detect_variant(text)
    }

    /// Project details and cleaned menu content of extracted text.
    pub fn details(&self, text: &str) -> DocumentDetails {
        DocumentDetails::from_text(&self.schema, text)
    }

    /// Extract a document buffer and read its details.
    pub fn extract_details(&self, document: &[u8]) -> Result<DocumentDetails, ExtractionError> {
        let text = self.extractor.extract_text(document)?;
        Ok(self.details(&text))
    }

    /// Trimmed text strictly after the first boundary marker.
    ///
    /// This is the raw span the content-length check measures; see
    /// [`TemplateValidator::details`] for the cleaned menu lines.
    pub fn menu_content<'a>(&self, text: &'a str) -> Option<&'a str> {
        let marker = self.schema.boundary_marker;
        text.find(marker)
            .map(|pos| text[pos + marker.len()..].trim())
    }
}
