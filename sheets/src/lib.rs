//! Client for the remote spreadsheet that receives form submissions.
//!
//! Authentication uses a service account: a signed JWT assertion is exchanged
//! for a short lived bearer token, scoped to spreadsheet read/write access.
//! Each [`SpreadsheetDocument`] authenticates at most once, on its first call.

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod spreadsheet;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use client::{SheetsClient, SpreadsheetDocument};
pub use errors::SheetsError;
pub use spreadsheet::{Row, SheetHandle, Spreadsheet, SpreadsheetInfo};
