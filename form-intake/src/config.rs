use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Apex domain cannot be empty")]
    EmptyApexDomain,

    #[error("Apex domain must be a bare host name, got: {0}")]
    InvalidApexDomain(String),

    #[error("Spreadsheet id cannot be empty")]
    EmptySpreadsheetId,

    #[error("Sheet title cannot be empty")]
    EmptySheetTitle,

    #[error("Service account email cannot be empty")]
    EmptyServiceAccountEmail,

    #[error("Service account private key cannot be empty")]
    EmptyPrivateKey,
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Listener {
            host: host.into(),
            port,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener::new("0.0.0.0", 3000)
    }
}

pub fn default_admin_listener() -> Listener {
    Listener::new("127.0.0.1", 3001)
}

/// Form intake configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for form submissions
    #[serde(default)]
    pub listener: Listener,
    /// Health and readiness endpoints
    #[serde(default = "default_admin_listener")]
    pub admin_listener: Listener,
    /// Host name of the site the forms live on, e.g. "www.example.com".
    /// Submissions are only accepted when their referer points at it.
    pub apex_domain: String,
    pub spreadsheet: sheets::config::Config,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.apex_domain.is_empty() {
            return Err(ValidationError::EmptyApexDomain);
        }
        if self.apex_domain.contains('/') {
            return Err(ValidationError::InvalidApexDomain(self.apex_domain.clone()));
        }

        let spreadsheet = &self.spreadsheet;
        if spreadsheet.spreadsheet_id.is_empty() {
            return Err(ValidationError::EmptySpreadsheetId);
        }
        if spreadsheet.sheet_title.is_empty() {
            return Err(ValidationError::EmptySheetTitle);
        }
        if spreadsheet.service_account.client_email.is_empty() {
            return Err(ValidationError::EmptyServiceAccountEmail);
        }
        if spreadsheet.service_account.private_key.is_empty() {
            return Err(ValidationError::EmptyPrivateKey);
        }

        Ok(())
    }
}
