//! Values-API client for the hosted spreadsheet platform. All commands go
//! through the [`SheetsApi`] trait so callers can run against
//! [`InMemorySheets`] in tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use capmodel_core::config::SheetsConfig;
use reqwest::{StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("sheets request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sheets api error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("required column `{0}` was not found in the header row")]
    MissingColumn(&'static str),
    #[error("sheet `{0}` returned no rows")]
    EmptySheet(String),
    #[error("could not decode sheets response: {0}")]
    Decode(String),
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

/// The subset of the values API the capacity model needs.
#[async_trait]
pub trait SheetsApi: Send + Sync {
    /// All rows of a sheet, cell values rendered as strings.
    async fn get_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, SheetsError>;

    /// Overwrite a sheet starting at A1; returns the updated-cell count.
    async fn update_values(
        &self,
        sheet: &str,
        values: &[Vec<String>],
    ) -> Result<u64, SheetsError>;

    async fn clear(&self, sheet: &str) -> Result<(), SheetsError>;
}

pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    access_token: SecretString,
}

impl SheetsClient {
    pub fn new(config: &SheetsConfig) -> Result<Self, SheetsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            access_token: config.access_token.clone(),
        })
    }

    fn values_url(&self, range_segment: &str) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|error| SheetsError::Decode(format!("invalid base url: {error}")))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Decode("base url cannot carry path segments".to_string()))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range_segment);
        Ok(url)
    }

    async fn check_status(response: reqwest::Response) -> Result<Value, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Err(api_error(status, &body))
    }
}

#[async_trait]
impl SheetsApi for SheetsClient {
    async fn get_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(sheet)?;
        debug!(sheet, "fetching sheet values");

        let response = self
            .http
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await?;
        let body = Self::check_status(response).await?;

        decode_values(&body)
    }

    async fn update_values(
        &self,
        sheet: &str,
        values: &[Vec<String>],
    ) -> Result<u64, SheetsError> {
        let mut url = self.values_url(sheet)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        debug!(sheet, rows = values.len(), "writing sheet values");

        let response = self
            .http
            .put(url)
            .bearer_auth(self.access_token.expose_secret())
            .json(&json!({ "values": values }))
            .send()
            .await?;
        let body = Self::check_status(response).await?;

        Ok(body.get("updatedCells").and_then(Value::as_u64).unwrap_or(0))
    }

    async fn clear(&self, sheet: &str) -> Result<(), SheetsError> {
        let url = self.values_url(&format!("{sheet}:clear"))?;

        let response = self
            .http
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await?;
        Self::check_status(response).await?;

        Ok(())
    }
}

fn api_error(status: StatusCode, body: &Value) -> SheetsError {
    let message = body
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("no error message in response body")
        .to_string();
    SheetsError::Api { status: status.as_u16(), message }
}

/// The API omits `values` for an empty sheet and may return numeric cells as
/// JSON numbers; everything is flattened to strings here.
fn decode_values(body: &Value) -> Result<Vec<Vec<String>>, SheetsError> {
    let Some(values) = body.get("values") else {
        return Ok(Vec::new());
    };

    let rows = values
        .as_array()
        .ok_or_else(|| SheetsError::Decode("`values` is not an array".to_string()))?;

    rows.iter()
        .map(|row| {
            let cells = row
                .as_array()
                .ok_or_else(|| SheetsError::Decode("row is not an array".to_string()))?;
            Ok(cells.iter().map(cell_to_string).collect())
        })
        .collect()
}

fn cell_to_string(cell: &Value) -> String {
    match cell {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Test double keyed by sheet name.
#[derive(Default)]
pub struct InMemorySheets {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
}

impl InMemorySheets {
    pub fn with_sheet(self, sheet: &str, values: Vec<Vec<String>>) -> Self {
        if let Ok(mut sheets) = self.sheets.lock() {
            sheets.insert(sheet.to_string(), values);
        }
        self
    }

    pub fn sheet(&self, sheet: &str) -> Option<Vec<Vec<String>>> {
        self.sheets.lock().ok()?.get(sheet).cloned()
    }
}

#[async_trait]
impl SheetsApi for InMemorySheets {
    async fn get_values(&self, sheet: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        Ok(self.sheet(sheet).unwrap_or_default())
    }

    async fn update_values(
        &self,
        sheet: &str,
        values: &[Vec<String>],
    ) -> Result<u64, SheetsError> {
        let cells = values.iter().map(|row| row.len() as u64).sum();
        if let Ok(mut sheets) = self.sheets.lock() {
            sheets.insert(sheet.to_string(), values.to_vec());
        }
        Ok(cells)
    }

    async fn clear(&self, sheet: &str) -> Result<(), SheetsError> {
        if let Ok(mut sheets) = self.sheets.lock() {
            sheets.remove(sheet);
        }
        Ok(())
    }
}
