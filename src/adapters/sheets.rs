//! Google Sheets v4 `values` API as a record store.
//!
//! Every table is a worksheet whose first row is a header. Writes use
//! `valueInputOption=RAW` so dates stay in their stored text format.

use crate::config::toml_config::SheetsConfig;
use crate::core::rows::cell_text;
use crate::domain::model::Table;
use crate::domain::ports::{RecordStore, Row};
use crate::utils::error::{DeskError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use url::Url;

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Row>,
}

#[derive(Debug, Clone)]
pub struct GoogleSheetsStore {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    access_token: String,
}

impl GoogleSheetsStore {
    pub fn new(
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.into(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
        }
    }

    pub fn from_config(config: &SheetsConfig) -> Self {
        Self::new(
            config.api_base(),
            config.spreadsheet_id.clone(),
            config.access_token.clone(),
        )
    }

    /// `A`, `B`, ... `Z`, `AA`, ... for a zero-based column index.
    pub fn column_letter(column: usize) -> String {
        let mut letters = Vec::new();
        let mut n = column + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push((b'A' + rem as u8) as char);
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }

    /// A1 range of a single cell. Data row 0 is sheet row 2.
    pub fn cell_range(table: Table, row: usize, column: usize) -> String {
        format!("{}!{}{}", table.sheet_name(), Self::column_letter(column), row + 2)
    }

    fn data_range(table: Table) -> String {
        format!(
            "{}!A2:{}",
            table.sheet_name(),
            Self::column_letter(table.width() - 1)
        )
    }

    fn values_url(&self, range: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| DeskError::ConfigError {
                message: format!("invalid sheets api_base '{}': {}", self.api_base, e),
            })?;
        url.path_segments_mut()
            .map_err(|_| DeskError::ConfigError {
                message: format!("sheets api_base '{}' cannot carry a path", self.api_base),
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DeskError::store(format!("{} failed: {}", action, e)))?;

        tracing::debug!("Sheets {} -> {}", action, response.status());
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(DeskError::store(format!("{} returned {}: {}", action, status, body)))
    }

    async fn read_range(&self, range: &str) -> Result<Vec<Row>> {
        let url = self.values_url(range)?;
        let response = self
            .send(
                self.client
                    .get(url)
                    .query(&[("valueRenderOption", "UNFORMATTED_VALUE")]),
                &format!("read {}", range),
            )
            .await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| DeskError::store(format!("unexpected response for {}: {}", range, e)))?;
        Ok(body.values)
    }
}

#[async_trait]
impl RecordStore for GoogleSheetsStore {
    async fn read_rows(&self, table: Table) -> Result<Vec<Row>> {
        self.read_range(&Self::data_range(table)).await
    }

    async fn append_row(&self, table: Table, row: Row) -> Result<()> {
        let range = format!("{}!A1", table.sheet_name());
        let url = self.values_url(&format!("{}:append", range))?;
        self.send(
            self.client
                .post(url)
                .query(&[
                    ("valueInputOption", "RAW"),
                    ("insertDataOption", "INSERT_ROWS"),
                ])
                .json(&json!({ "values": [row] })),
            &format!("append {}", table),
        )
        .await?;
        Ok(())
    }

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        column: usize,
        value: serde_json::Value,
    ) -> Result<()> {
        let range = Self::cell_range(table, row, column);
        let url = self.values_url(&range)?;
        self.send(
            self.client
                .put(url)
                .query(&[("valueInputOption", "RAW")])
                .json(&json!({ "range": range, "values": [[value]] })),
            &format!("update {}", range),
        )
        .await?;
        Ok(())
    }

    // Sheets has no conditional write; this is read-then-write and relies on
    // the caller's booking lock for mutual exclusion.
    async fn compare_and_set_cell(
        &self,
        table: Table,
        row: usize,
        column: usize,
        expected: &str,
        value: serde_json::Value,
    ) -> Result<bool> {
        let range = Self::cell_range(table, row, column);
        let current = self
            .read_range(&range)
            .await?
            .first()
            .and_then(|cells| cells.first())
            .map(cell_text)
            .unwrap_or_default();

        if !current.trim().eq_ignore_ascii_case(expected.trim()) {
            tracing::debug!("{} is '{}', expected '{}'", range, current, expected);
            return Ok(false);
        }
        self.update_cell(table, row, column, value).await?;
        Ok(true)
    }
}
