//! Document text extraction and template compliance checks.

pub mod details;
pub mod extract;
pub mod schema;
pub mod validator;

pub use details::{DocumentDetails, ProjectDetails};
pub use extract::{DocxTextExtractor, TextExtractor};
pub use schema::{TemplateKind, TemplateSchema};
pub use validator::{TemplateValidator, ValidationResult};
