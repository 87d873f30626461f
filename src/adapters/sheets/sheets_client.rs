use std::time::Duration;

use error_stack::{report, Context, ResultExt};
use google_sheets4::api::{BatchUpdateValuesRequest, ValueRange};
use reqwest::{
    blocking::{Client, RequestBuilder, Response},
    StatusCode, Url,
};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::{
    config::sheets_config::SpreadsheetConfig,
    domain::sheets::{a1_notation::A1Notation, spreadsheet_id::SpreadsheetId},
    ports::spreadsheet_api::{ReadError, SpreadsheetApi, ValueInputOption, WriteError},
};

/// Blocking client for the Sheets v4 REST `values` endpoints.
pub struct SheetsRestClient {
    client: Client,
    base_url: Url,
}

impl std::fmt::Debug for SheetsRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SheetsRestClient {{ base_url: {} }}", self.base_url)
    }
}

/// `{"error": {"code": 400, "message": "...", "status": "INVALID_ARGUMENT"}}`
fn describe_api_error(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            let error = json.get("error")?;
            let message = error.get("message")?.as_str()?.to_string();
            Some(match error.get("status").and_then(Value::as_str) {
                Some(code) => format!("{}: {}", code, message),
                None => message,
            })
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}

/// A range the sheet cannot resolve (e.g. a renamed tab) comes back as a 400.
fn classify_write_rejection(status: u16, message: String) -> WriteError {
    if status == 400 && message.contains("Unable to parse range") {
        WriteError::InvalidRange(message)
    } else {
        WriteError::Rejected { status, message }
    }
}

/// The generated API types serialize unset fields as `null`; the API wants them absent.
fn remove_json_null_values(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(remove_json_null_values);
        }
        Value::Array(items) => items.iter_mut().for_each(remove_json_null_values),
        _ => {}
    }
}

fn json_body<T: Serialize>(body: &T) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(body)?;
    remove_json_null_values(&mut value);
    Ok(value)
}

impl SheetsRestClient {
    pub fn new(
        config: &SpreadsheetConfig,
        timeout: Duration,
    ) -> error_stack::Result<Self, WriteError> {
        let base_url = Url::parse(&config.api_base_url)
            .change_context_lazy(|| {
                WriteError::InvalidSpreadsheet(config.api_base_url.to_string())
            })
            .attach_printable("Invalid Sheets API base URL")?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .change_context(WriteError::Transport)?;

        Ok(Self { client, base_url })
    }

    /// `{base}/v4/spreadsheets/{id}/{tail...}`, each segment percent-encoded.
    fn endpoint(&self, spreadsheet_id: &SpreadsheetId, tail: &[&str]) -> Option<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id.as_ref()])
            .extend(tail);
        Some(url)
    }

    fn send<C: Context + Clone>(
        &self,
        request: RequestBuilder,
        transport: C,
        rejected: impl FnOnce(u16, String) -> C,
    ) -> error_stack::Result<Response, C> {
        let response = request.send().change_context(transport.clone())?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = describe_api_error(status, &body);
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Access token was rejected mid-run");
        }
        Err(report!(rejected(status.as_u16(), message)))
    }
}

impl SpreadsheetApi for SheetsRestClient {
    #[instrument(skip(self, access_token, value_range))]
    fn update_values(
        &self,
        access_token: &str,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Notation,
        value_range: ValueRange,
        input_option: ValueInputOption,
    ) -> error_stack::Result<(), WriteError> {
        let mut url = self
            .endpoint(spreadsheet_id, &["values", range.as_ref()])
            .ok_or_else(|| report!(WriteError::InvalidSpreadsheet(spreadsheet_id.to_string())))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", &input_option.to_string());

        let body = json_body(&value_range).change_context(WriteError::Transport)?;
        let response = self
            .send(
                self.client.put(url).bearer_auth(access_token).json(&body),
                WriteError::Transport,
                classify_write_rejection,
            )
            .attach_printable_lazy(|| format!("Failed to write to range {}", range))?;

        let updated_cells = response
            .json::<Value>()
            .ok()
            .and_then(|json| json.get("updatedCells").and_then(Value::as_u64));
        tracing::debug!(?updated_cells, "values.update done");
        Ok(())
    }

    #[instrument(skip(self, access_token, data), fields(ranges = data.len()))]
    fn batch_update_values(
        &self,
        access_token: &str,
        spreadsheet_id: &SpreadsheetId,
        data: Vec<ValueRange>,
        input_option: ValueInputOption,
    ) -> error_stack::Result<usize, WriteError> {
        let ranges = data.len();
        let url = self
            .endpoint(spreadsheet_id, &["values:batchUpdate"])
            .ok_or_else(|| report!(WriteError::InvalidSpreadsheet(spreadsheet_id.to_string())))?;

        let request = BatchUpdateValuesRequest {
            data: Some(data),
            value_input_option: Some(input_option.to_string()),
            ..Default::default()
        };
        let body = json_body(&request).change_context(WriteError::Transport)?;

        let response = self
            .send(
                self.client.post(url).bearer_auth(access_token).json(&body),
                WriteError::Transport,
                classify_write_rejection,
            )
            .attach_printable_lazy(|| format!("Failed to batch write {} ranges", ranges))?;

        let updated_cells = response
            .json::<Value>()
            .ok()
            .and_then(|json| json.get("totalUpdatedCells").and_then(Value::as_u64));
        tracing::debug!(?updated_cells, "values.batchUpdate done");
        Ok(ranges)
    }

    #[instrument(skip(self, access_token))]
    fn get_values(
        &self,
        access_token: &str,
        spreadsheet_id: &SpreadsheetId,
        range: &A1Notation,
    ) -> error_stack::Result<ValueRange, ReadError> {
        let url = self
            .endpoint(spreadsheet_id, &["values", range.as_ref()])
            .ok_or_else(|| report!(ReadError::InvalidResponse))
            .attach_printable("Could not build the values.get URL")?;

        self.send(
            self.client.get(url).bearer_auth(access_token),
            ReadError::Transport,
            |status, message| ReadError::Rejected { status, message },
        )
        .attach_printable_lazy(|| format!("Failed to read range {}", range))?
        .json::<ValueRange>()
        .change_context(ReadError::InvalidResponse)
    }
}
