use error_stack::{report, ResultExt};
use google_sheets4::api::ValueRange;
use tracing::instrument;

use crate::{
    adapters::sheets::value_range_factory::ValueRangeFactory,
    domain::{
        credential::Credential,
        sheets::{a1_notation::A1Notation, spreadsheet_id::SpreadsheetId},
        signature::{extract_signature_count, is_petition_url},
        token_status::TokenStatus,
    },
    ports::{
        credential_store::CredentialError,
        page_source::{PageSource, ScrapeError},
        routine::UpdaterError,
        spreadsheet_api::{ReadError, SpreadsheetApi, ValueInputOption, WriteError},
    },
};

use super::credential_manager::CredentialManager;

/// What a single-value run scrapes and where it writes.
#[derive(Debug, Clone)]
pub struct UpdateTarget {
    pub source_url: String,
    pub spreadsheet_id: SpreadsheetId,
    pub range: A1Notation,
}

/// Scrape one count, write it to one cell. Every dependency is injected so a
/// run never reaches for ambient paths or globals.
pub struct Updater {
    credentials: CredentialManager,
    page_source: Box<dyn PageSource>,
    spreadsheet: Box<dyn SpreadsheetApi>,
}

impl std::fmt::Debug for Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Updater")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl Updater {
    pub fn new(
        credentials: CredentialManager,
        page_source: Box<dyn PageSource>,
        spreadsheet: Box<dyn SpreadsheetApi>,
    ) -> Self {
        Self {
            credentials,
            page_source,
            spreadsheet,
        }
    }

    pub fn check_token(&self) -> TokenStatus {
        self.credentials.check_token()
    }

    pub fn ensure_credential(&self) -> error_stack::Result<Credential, CredentialError> {
        self.credentials.ensure_credential()
    }

    #[instrument(skip(self))]
    pub fn scrape_value(&self, source_url: &str) -> error_stack::Result<u64, ScrapeError> {
        if !is_petition_url(source_url) {
            tracing::warn!("Source is not a Change.org petition, page patterns may not match");
        }

        let page = self.page_source.fetch(source_url)?;

        let count = extract_signature_count(&page)
            .ok_or_else(|| report!(ScrapeError::CountNotFound))
            .attach_printable_lazy(|| format!("Source: {}", source_url))?;

        tracing::info!("Found signature count: {}", count);
        Ok(count)
    }

    #[instrument(skip(self, credential))]
    pub fn write_value(
        &self,
        credential: &Credential,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Notation,
        value: u64,
    ) -> error_stack::Result<(), WriteError> {
        self.spreadsheet.update_values(
            &credential.access_token,
            spreadsheet_id,
            range,
            ValueRange::from_count(range, value),
            ValueInputOption::UserEntered,
        )?;
        tracing::info!("Wrote {} to {}", value, range);
        Ok(())
    }

    pub fn read_values(
        &self,
        credential: &Credential,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Notation,
    ) -> error_stack::Result<ValueRange, ReadError> {
        self.spreadsheet
            .get_values(&credential.access_token, spreadsheet_id, range)
    }

    pub fn write_batch(
        &self,
        credential: &Credential,
        spreadsheet_id: &SpreadsheetId,
        data: Vec<ValueRange>,
    ) -> error_stack::Result<usize, WriteError> {
        if data.is_empty() {
            return Ok(0);
        }
        self.spreadsheet.batch_update_values(
            &credential.access_token,
            spreadsheet_id,
            data,
            ValueInputOption::Raw,
        )
    }

    /// ensure_credential → scrape_value → write_value. The first failure stops the run.
    #[instrument(skip(self))]
    pub fn run(&self, target: &UpdateTarget) -> error_stack::Result<u64, UpdaterError> {
        let credential = self
            .ensure_credential()
            .change_context(UpdaterError::Credential)?;

        let count = self
            .scrape_value(&target.source_url)
            .change_context(UpdaterError::Scrape)?;

        self.write_value(&credential, &target.spreadsheet_id, &target.range, count)
            .change_context(UpdaterError::Write)?;

        Ok(count)
    }
}
