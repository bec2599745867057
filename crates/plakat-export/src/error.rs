//! Export errors.

use thiserror::Error;

/// Errors from handing a rendered image to the outside world.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("File write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Upload request failed: {0}")]
    Upload(#[from] reqwest::Error),
    #[error("Backend rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Metadata serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
