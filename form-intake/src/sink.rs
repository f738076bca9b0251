//! Appends built rows to the configured sheet.

use crate::row::SheetRow;
use async_trait::async_trait;
use sheets::{SheetsError, Spreadsheet};

#[async_trait]
pub trait RowSink: Send + Sync {
    async fn append(&self, row: &SheetRow) -> Result<(), SheetsError>;
}

/// Writes to the sheet titled `sheet_title` of one spreadsheet session.
///
/// When no sheet carries that title the row is dropped and `append` still
/// succeeds. Remote failures are returned untouched.
pub struct SpreadsheetSink<S> {
    spreadsheet: S,
    sheet_title: String,
}

impl<S: Spreadsheet> SpreadsheetSink<S> {
    pub fn new(spreadsheet: S, sheet_title: impl Into<String>) -> Self {
        SpreadsheetSink {
            spreadsheet,
            sheet_title: sheet_title.into(),
        }
    }
}

#[async_trait]
impl<S: Spreadsheet> RowSink for SpreadsheetSink<S> {
    async fn append(&self, row: &SheetRow) -> Result<(), SheetsError> {
        // The sheet lookup needs the metadata, so the load always completes first.
        let info = self.spreadsheet.load_info().await?;

        match info.sheet_by_title(&self.sheet_title) {
            Some(sheet) => {
                self.spreadsheet.add_row(sheet, &row.columns()).await?;
                tracing::info!(
                    sheet = %sheet.title,
                    form_name = row.form_name.as_deref().unwrap_or("-"),
                    "Appended form submission"
                );
            }
            None => {
                tracing::warn!(
                    sheet_title = %self.sheet_title,
                    spreadsheet = %info.title,
                    "Sheet not found, submission not recorded"
                );
            }
        }

        Ok(())
    }
}
