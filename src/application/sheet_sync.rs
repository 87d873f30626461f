use std::time::Duration;

use error_stack::{report, ResultExt};
use google_sheets4::api::ValueRange;
use thiserror::Error;
use tracing::instrument;

use crate::{
    adapters::sheets::value_range_factory::{cell_text, ValueRangeFactory},
    config::sheets_config::SheetSyncConfig,
    domain::{
        sheets::{
            a1_notation::{A1Notation, A1NotationParseError},
            column::{parse_col, Column},
            spreadsheet_id::SpreadsheetId,
        },
        signature::is_petition_url,
    },
    ports::routine::{Routine, UpdaterError},
};

use super::updater::Updater;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableLayoutError {
    #[error("Table range is empty, expected a header row")]
    Empty,
    #[error("No column with header {0:?}")]
    MissingColumn(String),
    #[error("Table is wider than a sheet can be")]
    TooWide,
}

/// Where the petition table lives and how its columns are named.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub table_range: A1Notation,
    pub title_header: String,
    pub url_header: String,
    pub tally_header: String,
}

impl TableLayout {
    pub fn from_config(config: &SheetSyncConfig) -> Result<Self, A1NotationParseError> {
        Ok(Self {
            table_range: config.table_range.parse()?,
            title_header: config.title_header.to_string(),
            url_header: config.url_header.to_string(),
            tally_header: config.tally_header.to_string(),
        })
    }

    /// Sheet coordinates of the first cell of the table range.
    fn origin(&self) -> (Column, u32) {
        let start = self.table_range.parts().start;
        let split_at = start
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(start.len());
        let (letters, digits) = start.split_at(split_at);

        let col = parse_col(letters).unwrap_or(Column::FIRST);
        let row = digits.parse().unwrap_or(1);
        (col, row)
    }
}

fn find_header(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name.trim()))
}

/// One data row of the petition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetitionRow {
    pub title: String,
    /// Empty when the row has no link yet.
    pub url: String,
    /// 1-based row number in the sheet.
    pub sheet_row: u32,
}

fn petition_rows(
    data_rows: &[Vec<serde_json::Value>],
    first_sheet_row: u32,
    title_index: Option<usize>,
    url_index: usize,
) -> Vec<PetitionRow> {
    data_rows
        .iter()
        .enumerate()
        .map(|(offset, row)| PetitionRow {
            title: title_index
                .map(|i| cell_text(row, i))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            url: cell_text(row, url_index),
            sheet_row: first_sheet_row + offset as u32,
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub rows: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Updates the tally column of every petition row in one batch write.
pub struct SheetSync {
    updater: Updater,
    spreadsheet_id: SpreadsheetId,
    layout: TableLayout,
    delay: Duration,
}

impl std::fmt::Debug for SheetSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetSync")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("layout", &self.layout)
            .field("delay", &self.delay)
            .finish()
    }
}

impl SheetSync {
    pub fn new(
        updater: Updater,
        spreadsheet_id: SpreadsheetId,
        layout: TableLayout,
        delay: Duration,
    ) -> Self {
        Self {
            updater,
            spreadsheet_id,
            layout,
            delay,
        }
    }

    #[instrument]
    pub fn sync(&self) -> error_stack::Result<SyncSummary, UpdaterError> {
        let credential = self
            .updater
            .ensure_credential()
            .change_context(UpdaterError::Credential)?;

        let table = self
            .updater
            .read_values(&credential, &self.spreadsheet_id, &self.layout.table_range)
            .change_context(UpdaterError::Read)?;

        let table_rows = table.values.unwrap_or_default();
        let Some((header_row, data_rows)) = table_rows.split_first() else {
            return Err(report!(TableLayoutError::Empty)).change_context(UpdaterError::Read);
        };

        let headers: Vec<String> = (0..header_row.len())
            .map(|i| cell_text(header_row, i))
            .collect();

        let url_index = find_header(&headers, &self.layout.url_header)
            .ok_or_else(|| report!(TableLayoutError::MissingColumn(self.layout.url_header.clone())))
            .change_context(UpdaterError::Read)?;
        let title_index = find_header(&headers, &self.layout.title_header);

        let (origin_col, origin_row) = self.layout.origin();
        let sheet_title = self.layout.table_range.sheet_title();
        let sheet_title = sheet_title.as_deref();

        let (tally_index, needs_header) = match find_header(&headers, &self.layout.tally_header) {
            Some(index) => (index, false),
            None => (headers.len(), true),
        };
        let tally_col = Column::try_new(origin_col.value() + tally_index as u32)
            .map_err(|_| report!(TableLayoutError::TooWide))
            .change_context(UpdaterError::Read)?;

        tracing::info!(
            "Found {} rows, tally column {}",
            data_rows.len(),
            tally_col
        );

        let mut data: Vec<ValueRange> = Vec::new();
        if needs_header {
            tracing::info!("📝 Adding {} column", self.layout.tally_header);
            let header_cell = A1Notation::cell(tally_col, origin_row, sheet_title);
            data.push(ValueRange::from_str(&header_cell, &self.layout.tally_header));
        }

        let rows = petition_rows(data_rows, origin_row + 1, title_index, url_index);
        let mut summary = SyncSummary {
            rows: rows.len(),
            ..Default::default()
        };
        let mut scraped_any = false;

        for row in &rows {
            if row.url.is_empty() {
                tracing::debug!(row = row.sheet_row, "No petition URL, skipping");
                summary.skipped += 1;
                continue;
            }
            if !is_petition_url(&row.url) {
                tracing::info!(row = row.sheet_row, "Skipping non-Change.org URL: {}", row.url);
                summary.skipped += 1;
                continue;
            }

            if scraped_any && !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            scraped_any = true;

            tracing::info!(row = row.sheet_row, "Scraping votes for: {}", row.title);
            match self.updater.scrape_value(&row.url) {
                Ok(count) => {
                    let cell = A1Notation::cell(tally_col, row.sheet_row, sheet_title);
                    data.push(ValueRange::from_count(&cell, count));
                    summary.updated += 1;
                }
                Err(report) => {
                    tracing::warn!(row = row.sheet_row, "Could not scrape {}: {:?}", row.url, report);
                    summary.failed += 1;
                }
            }
        }

        if summary.updated == 0 {
            tracing::warn!("⚠️ No sign counts to update");
            return Ok(summary);
        }

        self.updater
            .write_batch(&credential, &self.spreadsheet_id, data)
            .change_context(UpdaterError::Write)?;

        tracing::info!(
            "Updated {} sign counts ({} skipped, {} failed)",
            summary.updated,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }
}

impl Routine for SheetSync {
    fn name(&self) -> &str {
        "sheet_sync"
    }

    fn run(&self) -> error_stack::Result<(), UpdaterError> {
        self.sync().map(|_| ())
    }
}
