use crate::errors::SheetsError;
use async_trait::async_trait;
use indexmap::IndexMap;

/// Column name to cell value, in the order the caller produced them.
pub type Row = IndexMap<String, String>;

/// A single tab of a spreadsheet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetHandle {
    pub sheet_id: i64,
    pub title: String,
    pub index: i64,
}

/// Spreadsheet metadata as returned by a metadata load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpreadsheetInfo {
    pub title: String,
    pub sheets: Vec<SheetHandle>,
}

impl SpreadsheetInfo {
    /// Exact, case-sensitive title match.
    pub fn sheet_by_title(&self, title: &str) -> Option<&SheetHandle> {
        self.sheets.iter().find(|sheet| sheet.title == title)
    }
}

/// The operations the form sink needs from a remote spreadsheet.
///
/// `add_row` maps the row onto the sheet's header row: values are placed under
/// the column whose header equals the row key.
#[async_trait]
pub trait Spreadsheet: Send + Sync {
    async fn load_info(&self) -> Result<SpreadsheetInfo, SheetsError>;

    async fn add_row(&self, sheet: &SheetHandle, row: &Row) -> Result<(), SheetsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(sheet_id: i64, title: &str) -> SheetHandle {
        SheetHandle {
            sheet_id,
            title: title.into(),
            index: sheet_id,
        }
    }

    #[test]
    fn test_sheet_by_title() {
        let info = SpreadsheetInfo {
            title: "Website".into(),
            sheets: vec![sheet(0, "Contact"), sheet(1, "Newsletter")],
        };

        assert_eq!(info.sheet_by_title("Newsletter"), Some(&sheet(1, "Newsletter")));
        assert_eq!(info.sheet_by_title("newsletter"), None);
        assert_eq!(info.sheet_by_title("Orders"), None);
    }
}
