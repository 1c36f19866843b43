//! Google Sheets REST v4 client.
//!
//! Values API for reads/writes, batchUpdate for sheet creation.
//! Docs: <https://developers.google.com/sheets/api/reference/rest>

use crate::store::{Row, RowStore};
use crate::table::Table;
use async_trait::async_trait;
use sambo_core::config::SheetsConfig;
use sambo_core::error::SamboError;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Remote spreadsheet store over the Sheets values API.
pub struct SheetsClient {
    client: reqwest::Client,
    spreadsheet_id: String,
    api_token: String,
}

// --- Sheets API response types ---

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
struct AppendUpdates {
    #[serde(rename = "updatedRange")]
    updated_range: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

impl SheetsClient {
    /// Create a client from config.
    pub fn new(config: &SheetsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            api_token: config.api_token.clone(),
        }
    }

    fn url(&self, suffix: &str) -> String {
        format!("{API_BASE}/{}{suffix}", self.spreadsheet_id)
    }

    async fn check(resp: reqwest::Response, op: &str) -> Result<reqwest::Response, SamboError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SamboError::Store(format!("{op} returned {status}: {body}")));
        }
        Ok(resp)
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SamboError> {
        let url = self.url(&format!("/values/{range}"));
        debug!("sheets: GET {range}");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| SamboError::Store(format!("sheets read failed: {e}")))?;
        let resp = Self::check(resp, "sheets read").await?;
        let parsed: ValueRange = resp
            .json()
            .await
            .map_err(|e| SamboError::Store(format!("sheets read parse failed: {e}")))?;
        Ok(parsed.values)
    }

    async fn put_values(&self, range: &str, values: Vec<Vec<String>>) -> Result<(), SamboError> {
        let url = self.url(&format!("/values/{range}?valueInputOption=RAW"));
        debug!("sheets: PUT {range}");
        let body = json!({ "values": values });
        let resp = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SamboError::Store(format!("sheets write failed: {e}")))?;
        Self::check(resp, "sheets write").await?;
        Ok(())
    }

    async fn sheet_titles(&self) -> Result<Vec<String>, SamboError> {
        let url = self.url("?fields=sheets.properties.title");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| SamboError::Store(format!("sheets metadata failed: {e}")))?;
        let resp = Self::check(resp, "sheets metadata").await?;
        let meta: SpreadsheetMeta = resp
            .json()
            .await
            .map_err(|e| SamboError::Store(format!("sheets metadata parse failed: {e}")))?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn add_sheet(&self, title: &str) -> Result<(), SamboError> {
        let url = self.url(":batchUpdate");
        let body = json!({
            "requests": [ { "addSheet": { "properties": { "title": title } } } ]
        });
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SamboError::Store(format!("sheets addSheet failed: {e}")))?;
        Self::check(resp, "sheets addSheet").await?;
        info!("created sheet {title}");
        Ok(())
    }

    async fn clear(&self, title: &str) -> Result<(), SamboError> {
        let url = self.url(&format!("/values/{title}:clear"));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| SamboError::Store(format!("sheets clear failed: {e}")))?;
        Self::check(resp, "sheets clear").await?;
        Ok(())
    }
}

#[async_trait]
impl RowStore for SheetsClient {
    async fn rows(&self, table: Table) -> Result<Vec<Row>, SamboError> {
        let values = self.get_values(table.title()).await?;
        Ok(values
            .into_iter()
            .enumerate()
            .skip(1)
            .map(|(i, cells)| Row {
                number: i + 1,
                cells,
            })
            .collect())
    }

    async fn append(&self, table: Table, cells: Vec<String>) -> Result<usize, SamboError> {
        let url = self.url(&format!(
            "/values/{}!A1:append?valueInputOption=RAW",
            table.title()
        ));
        let body = json!({ "values": [cells] });
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SamboError::Store(format!("sheets append failed: {e}")))?;
        let resp = Self::check(resp, "sheets append").await?;
        let parsed: AppendResponse = resp
            .json()
            .await
            .map_err(|e| SamboError::Store(format!("sheets append parse failed: {e}")))?;

        parsed
            .updates
            .and_then(|u| u.updated_range)
            .as_deref()
            .and_then(row_from_range)
            .ok_or_else(|| SamboError::Store("sheets append returned no updatedRange".into()))
    }

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        col: usize,
        value: &str,
    ) -> Result<(), SamboError> {
        if row == 0 || col == 0 {
            return Err(SamboError::Store(format!(
                "coordinates are 1-based, got row {row} col {col}"
            )));
        }
        let range = format!("{}!{}{row}", table.title(), col_letter(col));
        self.put_values(&range, vec![vec![value.to_string()]]).await
    }

    async fn ensure_schema(&self, table: Table) -> Result<(), SamboError> {
        let titles = self.sheet_titles().await?;
        if !titles.iter().any(|t| t == table.title()) {
            self.add_sheet(table.title()).await?;
        }

        let expected: Vec<String> = table.headers().iter().map(|h| h.to_string()).collect();
        let values = self.get_values(&format!("{}!1:1", table.title())).await?;
        let stored = values.into_iter().next().unwrap_or_default();

        if stored != expected {
            warn!(
                "{}: header drift detected, clearing sheet and rewriting headers",
                table.title()
            );
            self.clear(table.title()).await?;
            self.put_values(
                &format!("{}!A1:{}1", table.title(), col_letter(table.width())),
                vec![expected],
            )
            .await?;
            info!("{}: sheet structure initialized", table.title());
        }
        Ok(())
    }
}

/// A1-notation column letter for a 1-based column index.
fn col_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        col = (col - 1) / 26;
    }
    letters.into_iter().rev().collect()
}

/// Extract the 1-based row number from an updatedRange like
/// `Activity!A5:I5`.
fn row_from_range(range: &str) -> Option<usize> {
    let after_sheet = range.rsplit('!').next()?;
    let start = after_sheet.split(':').next()?;
    let digits: String = start.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
