use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("invalid service account key: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    #[error("sheet {0:?} has no header row")]
    MissingHeaderRow(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
