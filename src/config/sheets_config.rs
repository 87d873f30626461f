use crate::domain::sheets::{
    a1_notation::{A1Notation, A1NotationParseError},
    spreadsheet_id::{SpreadsheetId, SpreadsheetIdError},
};

pub const DEFAULT_SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com";

fn default_api_base_url() -> Box<str> {
    DEFAULT_SHEETS_API_BASE_URL.into()
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Spreadsheet id, or its edit link.
    pub spreadsheet: Box<str>,
    /// Cell the single-value run overwrites, e.g. `Tally!B2`.
    pub range: Box<str>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Box<str>,
    #[serde(default)]
    pub sync: SheetSyncConfig,
}

impl SpreadsheetConfig {
    pub fn spreadsheet_id(&self) -> Result<SpreadsheetId, SpreadsheetIdError> {
        SpreadsheetId::parse(&self.spreadsheet)
    }

    pub fn range(&self) -> Result<A1Notation, A1NotationParseError> {
        self.range.parse()
    }
}

fn default_table_range() -> Box<str> {
    "A:H".into()
}

fn default_title_header() -> Box<str> {
    "Title_Eng".into()
}

fn default_url_header() -> Box<str> {
    "VoteForm - Eng".into()
}

fn default_tally_header() -> Box<str> {
    "VoteTally - Eng".into()
}

fn default_delay_secs() -> f64 {
    2.0
}

/// Table layout for `--sync-sheet`.
#[derive(serde::Deserialize, Debug, Clone)]
pub struct SheetSyncConfig {
    /// Range holding the header row and the petition rows.
    #[serde(default = "default_table_range")]
    pub table_range: Box<str>,
    #[serde(default = "default_title_header")]
    pub title_header: Box<str>,
    #[serde(default = "default_url_header")]
    pub url_header: Box<str>,
    #[serde(default = "default_tally_header")]
    pub tally_header: Box<str>,
    /// Pause between two petition fetches.
    #[serde(default = "default_delay_secs")]
    pub delay_secs: f64,
}

impl Default for SheetSyncConfig {
    fn default() -> Self {
        Self {
            table_range: default_table_range(),
            title_header: default_title_header(),
            url_header: default_url_header(),
            tally_header: default_tally_header(),
            delay_secs: default_delay_secs(),
        }
    }
}
