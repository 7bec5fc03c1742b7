// src/run.rs

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::analysis::{self, Summary};
use crate::config::ScrapeConfig;
use crate::error::{Result, ScrapeError};
use crate::export::{self, dump_raw_tables};
use crate::fetch::{build_client, fetch_page, save_snapshot};
use crate::table::{extract, parse_tables, select_table, Dataset};

/// What a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub url: String,
    pub tables_found: usize,
    pub summary: Summary,
    pub destination: String,
    pub rows_written: usize,
    pub dumped_tables: Vec<PathBuf>,
    /// Last point of the configured moving average, if there was enough data.
    pub sma_last: Option<f64>,
}

/// Fetch, parse, extract and export once. Any failure ends the run and
/// nothing is exported after it.
#[instrument(level = "info", skip(cfg), fields(url = %cfg.fetch.url))]
pub async fn run(cfg: &ScrapeConfig) -> Result<RunReport> {
    let started_at = Utc::now();
    cfg.validate()?;

    // ─── 1) fetch ────────────────────────────────────────────────────
    let client = build_client(&cfg.fetch)?;
    let page = fetch_page(&client, &cfg.fetch.url).await?;
    if let Some(path) = &cfg.snapshot {
        save_snapshot(&page, path).await?;
    }

    // ─── 2) parse + pick the table ───────────────────────────────────
    let tables = parse_tables(&page.body, &cfg.table)?;
    let tables_found = tables.len();
    let dumped_tables = match &cfg.dump_tables {
        Some(dir) => dump_raw_tables(&tables, dir)?,
        None => Vec::new(),
    };
    let raw = select_table(tables, &cfg.table)?;
    info!(rows = raw.len(), "selected table");

    // ─── 3) extract ──────────────────────────────────────────────────
    let ds = extract(&raw, &cfg.fields, cfg.header_rows_to_skip);
    if ds.is_empty() {
        warn!(
            rows = raw.len(),
            columns = cfg.fields.len(),
            skip = cfg.header_rows_to_skip,
            "no data rows; nothing exported"
        );
        return Err(ScrapeError::EmptyDataset {
            columns: cfg.fields.len(),
        });
    }
    let summary = analysis::summarize(&ds);
    log_summary(&summary, &ds);

    // ─── 4) export ───────────────────────────────────────────────────
    let destination = cfg.export.describe();
    let rows_written = export::export_dataset(&ds, &cfg.export, &client).await?;
    info!(dest = %destination, rows_written, "exported");

    // ─── 5) moving average ───────────────────────────────────────────
    let sma_last = cfg.sma.as_ref().and_then(|s| {
        let series = ds.column(&s.column)?;
        let avg = analysis::sma(&series, s.window);
        match avg.last() {
            Some(last) => {
                info!(column = %s.column, window = s.window, points = avg.len(), last, "sma");
                Some(*last)
            }
            None => {
                warn!(column = %s.column, window = s.window, rows = series.len(), "not enough rows for sma");
                None
            }
        }
    });

    Ok(RunReport {
        started_at,
        finished_at: Utc::now(),
        url: cfg.fetch.url.clone(),
        tables_found,
        summary,
        destination,
        rows_written,
        dumped_tables,
        sma_last,
    })
}

fn log_summary(summary: &Summary, ds: &Dataset) {
    info!(rows = summary.rows, columns = summary.columns, "dataset");
    let names = ds.fields().names();
    for rec in &summary.head {
        let cells: Vec<String> = names
            .iter()
            .skip(1)
            .zip(&rec.values)
            .map(|(n, v)| format!("{}={}", n, v))
            .collect();
        info!(date = %rec.date, "{}", cells.join(" "));
    }
}
