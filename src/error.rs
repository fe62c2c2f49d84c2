use thiserror::Error;

/// Errors raised by one sync cycle. None of them end the host session.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not extract code from editor")]
    Extraction,

    #[error("Failed to read remote file: {0}")]
    RemoteRead(String),

    #[error("{0}")]
    RemoteWrite(String),

    #[error("Timed out waiting for a result after {0}s")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings store error: {0}")]
    Config(#[from] confy::ConfyError),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
