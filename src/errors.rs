use thiserror::Error;

/// Main error type for the css-module-classes crate
#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Usage: {0}")]
    UsageError(String),

    #[error("Failed to read {path}: {message}")]
    InputError { path: String, message: String },

    #[error("{path}:{line}:{column}: {message}")]
    ParseError {
        path: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{path}:{line}:{column}: Can't resolve import '{target}'")]
    ImportNotFound {
        path: String,
        line: usize,
        column: usize,
        target: String,
    },

    #[error("Import cycle detected: {}", chain.join(" -> "))]
    ImportCycle { chain: Vec<String> },

    #[error("Failed to write output to {path}: {message}")]
    OutputError { path: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Processing task failed: {0}")]
    TaskError(String),
}

impl ExtractorError {
    /// True for failures detected before any file was touched
    pub fn is_usage(&self) -> bool {
        matches!(self, ExtractorError::UsageError(_))
    }
}

pub type Result<T> = std::result::Result<T, ExtractorError>;
