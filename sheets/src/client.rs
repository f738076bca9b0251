use crate::auth::{AccessToken, ServiceAccountAuth, check_status};
use crate::config::Config;
use crate::errors::SheetsError;
use crate::spreadsheet::{Row, SheetHandle, Spreadsheet, SpreadsheetInfo};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use url::Url;

const METADATA_FIELDS: &str = "properties.title,sheets.properties";

#[derive(Deserialize, Default)]
struct SpreadsheetResource {
    #[serde(default)]
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetResource>,
}

#[derive(Deserialize, Default)]
struct SpreadsheetProperties {
    #[serde(default)]
    title: String,
}

#[derive(Deserialize)]
struct SheetResource {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    #[serde(default)]
    sheet_id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    index: i64,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl From<SpreadsheetResource> for SpreadsheetInfo {
    fn from(resource: SpreadsheetResource) -> Self {
        SpreadsheetInfo {
            title: resource.properties.title,
            sheets: resource
                .sheets
                .into_iter()
                .map(|sheet| SheetHandle {
                    sheet_id: sheet.properties.sheet_id,
                    title: sheet.properties.title,
                    index: sheet.properties.index,
                })
                .collect(),
        }
    }
}

struct ClientInner {
    http: reqwest::Client,
    auth: ServiceAccountAuth,
    spreadsheet_id: String,
    api_base_url: Url,
}

/// Long-lived, immutable handle on one spreadsheet.
///
/// Holds the connection pool and the parsed service-account key; no tokens.
/// Use [`SheetsClient::document`] to start a session.
#[derive(Clone)]
pub struct SheetsClient {
    inner: Arc<ClientInner>,
}

impl SheetsClient {
    pub fn new(config: &Config) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let auth = ServiceAccountAuth::new(&config.service_account, config.token_uri.clone())?;

        Ok(SheetsClient {
            inner: Arc::new(ClientInner {
                http,
                auth,
                spreadsheet_id: config.spreadsheet_id.clone(),
                api_base_url: config.api_base_url.clone(),
            }),
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.inner.spreadsheet_id
    }

    /// Opens a session on the spreadsheet. The session authenticates lazily.
    pub fn document(&self) -> SpreadsheetDocument {
        SpreadsheetDocument {
            client: self.clone(),
            token: OnceCell::new(),
        }
    }
}

/// A single authenticated session on the spreadsheet.
pub struct SpreadsheetDocument {
    client: SheetsClient,
    token: OnceCell<AccessToken>,
}

impl SpreadsheetDocument {
    async fn token(&self) -> Result<&AccessToken, SheetsError> {
        let inner = &self.client.inner;
        self.token
            .get_or_try_init(|| inner.auth.fetch_token(&inner.http))
            .await
    }

    /// `{api_base}spreadsheets/{id}/{segments...}` with each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let inner = &self.client.inner;
        let mut url = inner.api_base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(inner.api_base_url.to_string()))?
            .pop_if_empty()
            .push("spreadsheets")
            .push(&inner.spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    async fn header_row(&self, sheet: &SheetHandle) -> Result<Vec<String>, SheetsError> {
        let range = format!("{}!1:1", quote_sheet_title(&sheet.title));
        let url = self.url(&["values", &range])?;

        let response = self
            .client
            .inner
            .http
            .get(url)
            .bearer_auth(self.token().await?.as_str())
            .send()
            .await?;
        let response = check_status("header row", response).await?;
        let range = response.json::<ValueRange>().await?;

        let headers: Vec<String> = range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(cell_text)
            .collect();

        if headers.iter().all(|header| header.is_empty()) {
            return Err(SheetsError::MissingHeaderRow(sheet.title.clone()));
        }
        Ok(headers)
    }
}

#[async_trait]
impl Spreadsheet for SpreadsheetDocument {
    async fn load_info(&self) -> Result<SpreadsheetInfo, SheetsError> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut().append_pair("fields", METADATA_FIELDS);

        let response = self
            .client
            .inner
            .http
            .get(url)
            .bearer_auth(self.token().await?.as_str())
            .send()
            .await?;
        let response = check_status("spreadsheet metadata", response).await?;
        let info: SpreadsheetInfo = response.json::<SpreadsheetResource>().await?.into();

        tracing::debug!(
            spreadsheet = %info.title,
            sheets = info.sheets.len(),
            "Loaded spreadsheet metadata"
        );
        Ok(info)
    }

    async fn add_row(&self, sheet: &SheetHandle, row: &Row) -> Result<(), SheetsError> {
        let headers = self.header_row(sheet).await?;
        let values = values_in_header_order(&headers, row);

        let range = format!("{}!A1:append", quote_sheet_title(&sheet.title));
        let mut url = self.url(&["values", &range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let response = self
            .client
            .inner
            .http
            .post(url)
            .bearer_auth(self.token().await?.as_str())
            .json(&json!({ "values": [values] }))
            .send()
            .await?;
        check_status("append", response).await?;

        tracing::debug!(sheet = %sheet.title, columns = headers.len(), "Appended row");
        Ok(())
    }
}

/// A1 notation quoting: wrap in single quotes, double any embedded quote.
fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Unknown row keys are dropped; headers without a row value get an empty cell.
fn values_in_header_order(headers: &[String], row: &Row) -> Vec<String> {
    headers
        .iter()
        .map(|header| row.get(header).cloned().unwrap_or_default())
        .collect()
}
