//! Decoding of the submitted body and construction of the spreadsheet row.

use crate::request::IncomingRequest;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use sheets::Row;

/// Field carrying the name of the form that was submitted.
pub const FORM_NAME_FIELD: &str = "form-name";

const MAX_SUMMARY_FIELDS_CHARS: usize = 1000;

/// Decoded form fields in submission order.
pub type FormFields = IndexMap<String, String>;

/// Decodes an `application/x-www-form-urlencoded` body.
///
/// Never fails: malformed percent escapes are kept literally and pairs without
/// `=` get an empty value. On duplicate keys the last value wins and the key
/// keeps its first position.
pub fn decode_fields(body: &str) -> FormFields {
    url::form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

/// A normalized submission, ready to be appended to a sheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetRow {
    pub timestamp: String,
    pub form_name: Option<String>,
    /// JSON object of every decoded field except `form-name`.
    pub form_data: String,
    pub country: Option<String>,
    pub locale: Option<String>,
    pub user_agent: Option<String>,
}

pub fn build_row(request: &IncomingRequest, now: DateTime<Utc>) -> Result<SheetRow, serde_json::Error> {
    let mut fields = decode_fields(&request.body);
    let form_name = fields.shift_remove(FORM_NAME_FIELD);
    let form_data = serde_json::to_string(&fields)?;

    let header = |name: &str| request.header(name).map(String::from);

    Ok(SheetRow {
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        form_name,
        form_data,
        country: header("x-country"),
        locale: header("x-language"),
        user_agent: header("user-agent"),
    })
}

impl SheetRow {
    /// Column name to value; absent values are left out so their cells stay empty.
    pub fn columns(&self) -> Row {
        let mut row = Row::new();
        row.insert("timestamp".into(), self.timestamp.clone());
        if let Some(form_name) = &self.form_name {
            row.insert("formName".into(), form_name.clone());
        }
        row.insert("formData".into(), self.form_data.clone());

        let optional = [
            ("country", &self.country),
            ("locale", &self.locale),
            ("ua", &self.user_agent),
        ];
        for (column, value) in optional {
            if let Some(value) = value {
                row.insert(column.into(), value.clone());
            }
        }
        row
    }

    /// Human readable digest of the submission.
    pub fn summary(&self) -> String {
        let fields: IndexMap<String, serde_json::Value> =
            serde_json::from_str(&self.form_data).unwrap_or_default();

        let field_lines = fields
            .iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => format!("<b>{key}</b>: {s}"),
                other => format!("<b>{key}</b>: {other}"),
            })
            .collect::<Vec<_>>()
            .join("\n");
        let field_lines: String = field_lines.chars().take(MAX_SUMMARY_FIELDS_CHARS).collect();

        let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".into());

        [
            format!("Date: {}", self.timestamp),
            format!("Name: {}", or_dash(&self.form_name)),
            format!("Origin: {} / {}", or_dash(&self.country), or_dash(&self.locale)),
            field_lines,
        ]
        .join("\n")
    }
}
