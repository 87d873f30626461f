use google_sheets4::api::ValueRange;
use thiserror::Error;

use crate::domain::sheets::{a1_notation::A1Notation, spreadsheet_id::SpreadsheetId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    #[error("Invalid spreadsheet: {0}")]
    InvalidSpreadsheet(String),
    #[error("Sheets API rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Could not reach the Sheets API")]
    Transport,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("Sheets API rejected the read ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Could not reach the Sheets API")]
    Transport,
    #[error("Unexpected response from the Sheets API")]
    InvalidResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputOption {
    /// Stored as-is.
    Raw,
    /// Parsed as if typed into the UI, so numbers stay numbers.
    UserEntered,
}

/// The subset of the Sheets `spreadsheets.values` resource this tool needs.
/// Every call carries the bearer token of the current run.
pub trait SpreadsheetApi {
    fn update_values(
        &self,
        access_token: &str,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Notation,
        value_range: ValueRange,
        input_option: ValueInputOption,
    ) -> error_stack::Result<(), WriteError>;

    /// Returns the number of ranges written.
    fn batch_update_values(
        &self,
        access_token: &str,
        spreadsheet_id: &SpreadsheetId,
        data: Vec<ValueRange>,
        input_option: ValueInputOption,
    ) -> error_stack::Result<usize, WriteError>;

    fn get_values(
        &self,
        access_token: &str,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Notation,
    ) -> error_stack::Result<ValueRange, ReadError>;
}
