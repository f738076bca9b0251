use crate::config::ValidationError;
use thiserror::Error;

/// Result type alias for form-intake operations
pub type Result<T, E = IntakeError> = std::result::Result<T, E>;

/// Errors that can occur while handling a form submission
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] sheets::SheetsError),

    #[error("Failed to encode form data: {0}")]
    FormDataEncoding(#[from] serde_json::Error),

    #[error("Failed to build response: {0}")]
    ResponseBuild(#[from] http::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
