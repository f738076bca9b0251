use crate::config::ServiceAccount;
use crate::errors::SheetsError;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Bearer token for the spreadsheet API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchanges signed service-account assertions for access tokens.
#[derive(Clone)]
pub struct ServiceAccountAuth {
    client_email: String,
    key: EncodingKey,
    token_uri: Url,
}

impl ServiceAccountAuth {
    /// Fails when the private key is not an RSA PEM key.
    pub fn new(account: &ServiceAccount, token_uri: Url) -> Result<Self, SheetsError> {
        let key = EncodingKey::from_rsa_pem(account.private_key_pem().as_bytes())?;

        Ok(ServiceAccountAuth {
            client_email: account.client_email.clone(),
            key,
            token_uri,
        })
    }

    pub fn claims(&self, issued_at: i64) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: self.token_uri.to_string(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        }
    }

    /// RS256-signed JWT assertion issued at `issued_at` (unix seconds).
    pub fn assertion(&self, issued_at: i64) -> Result<String, SheetsError> {
        let token = encode(
            &Header::new(Algorithm::RS256),
            &self.claims(issued_at),
            &self.key,
        )?;
        Ok(token)
    }

    pub async fn fetch_token(&self, http: &reqwest::Client) -> Result<AccessToken, SheetsError> {
        let assertion = self.assertion(Utc::now().timestamp())?;

        let response = http
            .post(self.token_uri.clone())
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let response = check_status("token", response).await?;
        let token = response.json::<TokenResponse>().await?;

        tracing::debug!(client_email = %self.client_email, "Obtained spreadsheet access token");
        Ok(AccessToken(token.access_token))
    }
}

/// Turns a non-2xx response into [`SheetsError::Status`], keeping the body for diagnosis.
pub(crate) async fn check_status(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SheetsError::Status {
        endpoint,
        status: status.as_u16(),
        body,
    })
}
