// src/export/sheets.rs

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::table::Dataset;

pub const TOKEN_ENV: &str = "FLOWSCRAPER_SHEETS_TOKEN";
pub const GOOGLE_SHEETS_API: &str = "https://sheets.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// A1 range the dataset is written from, e.g. `Sheet1!A1`.
    #[serde(default = "default_range")]
    pub range: String,
    /// Range emptied before each write. Defaults to the whole sheet named in `range`.
    #[serde(default)]
    pub clear_range: Option<String>,
    /// JSON file holding an `access_token`. Falls back to `FLOWSCRAPER_SHEETS_TOKEN`.
    #[serde(default)]
    pub token_path: Option<PathBuf>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_range() -> String {
    "Sheet1!A1".into()
}

fn default_api_base() -> String {
    GOOGLE_SHEETS_API.into()
}

impl SheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            range: default_range(),
            clear_range: None,
            token_path: None,
            api_base: default_api_base(),
        }
    }

    /// `clear_range` if set, else the sheet part of `range` (`Sheet1!A1` -> `Sheet1`).
    pub fn effective_clear_range(&self) -> &str {
        match &self.clear_range {
            Some(r) => r.as_str(),
            None => self
                .range
                .split_once('!')
                .map(|(sheet, _)| sheet)
                .unwrap_or(self.range.as_str()),
        }
    }
}

#[derive(Deserialize)]
struct Credentials {
    access_token: String,
}

/// Read the bearer token from `path`, or from the environment when no path is given.
pub fn load_token(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p).map_err(|e| ScrapeError::io("reading", p, e))?;
            let creds: Credentials = serde_json::from_str(&text)
                .map_err(|e| ScrapeError::Config(format!("credentials {:?}: {}", p, e)))?;
            Ok(creds.access_token)
        }
        None => env::var(TOKEN_ENV).map_err(|_| {
            ScrapeError::Config(format!("no sheets token: set token_path or {}", TOKEN_ENV))
        }),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: usize,
    #[serde(default)]
    pub updated_cells: usize,
}

/// Header strings, then the key as a string and values as numbers.
fn sheet_values(ds: &Dataset) -> Vec<Vec<Value>> {
    let mut out = Vec::with_capacity(ds.len() + 1);
    out.push(ds.fields().names().iter().map(|n| Value::from(n.as_str())).collect());
    for rec in ds {
        let mut row = Vec::with_capacity(rec.values.len() + 1);
        row.push(Value::from(rec.date.as_str()));
        row.extend(rec.values.iter().map(|v| Value::from(*v)));
        out.push(row);
    }
    out
}

/// Minimal Sheets v4 values client: clear a range, then overwrite it.
pub struct SheetsClient {
    http: Client,
    cfg: SheetsConfig,
    token: String,
}

impl SheetsClient {
    pub fn new(http: Client, cfg: SheetsConfig) -> Result<Self> {
        let token = load_token(cfg.token_path.as_deref())?;
        Ok(Self::with_token(http, cfg, token))
    }

    pub fn with_token(http: Client, cfg: SheetsConfig, token: impl Into<String>) -> Self {
        Self {
            http,
            cfg,
            token: token.into(),
        }
    }

    fn target(&self) -> String {
        format!("sheets:{}/{}", self.cfg.spreadsheet_id, self.cfg.range)
    }

    fn values_url(&self, last_segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.cfg.api_base)
            .map_err(|e| ScrapeError::Config(format!("api_base {:?}: {}", self.cfg.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| ScrapeError::Config(format!("api_base {:?} cannot be a base", self.cfg.api_base)))?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.cfg.spreadsheet_id.as_str(),
                "values",
                last_segment,
            ]);
        Ok(url)
    }

    async fn check(&self, resp: reqwest::Result<reqwest::Response>) -> Result<reqwest::Response> {
        let resp = resp.map_err(|e| ScrapeError::export(self.target(), e))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ScrapeError::export(
            self.target(),
            format!("{}: {}", status, body.trim()),
        ))
    }

    #[instrument(level = "debug", skip(self), fields(sheet = %self.cfg.spreadsheet_id))]
    pub async fn clear(&self) -> Result<()> {
        let url = self.values_url(&format!("{}:clear", self.cfg.effective_clear_range()))?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({}))
            .send()
            .await;
        self.check(resp).await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self, values), fields(sheet = %self.cfg.spreadsheet_id))]
    pub async fn update(&self, values: Vec<Vec<Value>>) -> Result<UpdateResponse> {
        let mut url = self.values_url(&self.cfg.range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let body = ValueRange {
            range: &self.cfg.range,
            major_dimension: "ROWS",
            values,
        };
        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await;
        let resp = self.check(resp).await?;
        resp.json::<UpdateResponse>()
            .await
            .map_err(|e| ScrapeError::export(self.target(), e))
    }

    /// Replace the sheet contents with the dataset, header row first.
    /// An empty dataset leaves the sheet untouched.
    pub async fn overwrite(&self, ds: &Dataset) -> Result<usize> {
        if ds.is_empty() {
            warn!(dest = %self.target(), "no data to write");
            return Ok(0);
        }
        self.clear().await?;
        let resp = self.update(sheet_values(ds)).await?;
        info!(
            dest = %self.target(),
            rows = ds.len(),
            updated_range = resp.updated_range.as_deref().unwrap_or("-"),
            updated_rows = resp.updated_rows,
            updated_cells = resp.updated_cells,
            "wrote dataset to spreadsheet"
        );
        Ok(ds.len())
    }
}
