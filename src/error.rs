//! Error types for menu intake.

/// Top-level error type for the intake service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Inbound notification payload errors.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Malformed notification payload: {0}")]
    Malformed(String),
}

/// Message store and staging errors. Scoped to a single notification entry.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("Message store request failed for {resource}: {reason}")]
    RequestFailed { resource: String, reason: String },

    #[error("Message store returned {status} for {resource}")]
    Status { resource: String, status: u16 },

    #[error("Invalid response for {resource}: {reason}")]
    InvalidResponse { resource: String, reason: String },

    #[error("Attachment {attachment_id} content is not valid base64: {reason}")]
    Decode {
        attachment_id: String,
        reason: String,
    },

    #[error("Attachment name {name:?} cannot be used as a staging file name")]
    InvalidName { name: String },

    #[error("Staging IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document-decoding errors raised by a text extractor.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("not a readable DOCX package: {0}")]
    Package(String),

    #[error("document part {part} is missing")]
    MissingPart { part: String },

    #[error("malformed document XML: {0}")]
    Xml(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors writing a rendered document package.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to write document package: {0}")]
    Package(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the intake service.
pub type Result<T> = std::result::Result<T, Error>;
