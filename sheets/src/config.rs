use serde::Deserialize;
use std::borrow::Cow;
use std::fmt;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://sheets.googleapis.com/v4/";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Clone, Deserialize, PartialEq)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
}

impl ServiceAccount {
    pub fn new(client_email: impl Into<String>, private_key: impl Into<String>) -> Self {
        ServiceAccount {
            client_email: client_email.into(),
            private_key: private_key.into(),
        }
    }

    /// The PEM key with literal `\n` sequences turned into newlines.
    ///
    /// Keys passed through environment variables usually arrive escaped.
    pub fn private_key_pem(&self) -> Cow<'_, str> {
        if self.private_key.contains("\\n") {
            Cow::Owned(self.private_key.replace("\\n", "\n"))
        } else {
            Cow::Borrowed(&self.private_key)
        }
    }
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    pub spreadsheet_id: String,
    /// Title of the tab rows are appended to.
    pub sheet_title: String,
    pub service_account: ServiceAccount,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Url,
    #[serde(default = "default_token_uri")]
    pub token_uri: Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Config {
    pub fn new(
        spreadsheet_id: impl Into<String>,
        sheet_title: impl Into<String>,
        service_account: ServiceAccount,
    ) -> Self {
        Config {
            spreadsheet_id: spreadsheet_id.into(),
            sheet_title: sheet_title.into(),
            service_account,
            api_base_url: default_api_base_url(),
            token_uri: default_token_uri(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base_url() -> Url {
    Url::parse(DEFAULT_API_BASE_URL).expect("default API base URL is valid")
}

fn default_token_uri() -> Url {
    Url::parse(DEFAULT_TOKEN_URI).expect("default token URI is valid")
}

fn default_timeout_secs() -> u64 {
    10
}
