//! Error types for Lead Assist.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Send error: {0}")]
    Send(#[from] SendError),

    #[error("Lead recording error: {0}")]
    Lead(#[from] LeadError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Outbound delivery errors (messaging provider).
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Request to messaging provider failed: {reason}")]
    Request { reason: String },

    #[error("Messaging provider rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Lead collector errors.
#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error("Request to lead collector failed: {reason}")]
    Request { reason: String },

    #[error("Lead collector rejected the record: status {status}")]
    Rejected { status: u16 },
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
