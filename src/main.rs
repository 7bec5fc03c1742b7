use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use flowscraper::config::SmaConfig;
use flowscraper::export::{Delimiter, ExportTarget, SheetsConfig};
use flowscraper::ScrapeConfig;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Scrape an HTML flow table (Farside BTC ETFs by default) into CSV or a spreadsheet.
#[derive(Debug, Parser)]
#[command(name = "flowscraper", version)]
struct Cli {
    /// YAML config file; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page to fetch.
    #[arg(long)]
    url: Option<String>,

    /// Write the dataset to this file.
    #[arg(short, long, conflicts_with = "sheet")]
    out: Option<PathBuf>,

    /// Delimiter for --out, or for the config's file target. Csv when neither sets one.
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Overwrite this Google Sheets spreadsheet instead of writing a file.
    #[arg(long)]
    sheet: Option<String>,

    /// A1 range for --sheet.
    #[arg(long, requires = "sheet")]
    range: Option<String>,

    /// JSON credentials with an `access_token` for --sheet.
    #[arg(long, requires = "sheet")]
    token: Option<PathBuf>,

    /// Save the fetched HTML here.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Dump every matching table verbatim into this directory.
    #[arg(long)]
    dump_tables: Option<PathBuf>,

    /// Log a moving average over this many rows.
    #[arg(long)]
    sma: Option<usize>,

    /// Column for --sma. Falls back to the config's sma column, then Total.
    #[arg(long, requires = "sma")]
    sma_column: Option<String>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Format {
    Csv,
    Tsv,
}

impl From<Format> for Delimiter {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => Delimiter::Csv,
            Format::Tsv => Delimiter::Tsv,
        }
    }
}

fn build_config(cli: Cli) -> Result<ScrapeConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ScrapeConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ScrapeConfig::default(),
    };

    if let Some(url) = cli.url {
        cfg.fetch.url = url;
    }
    if let Some(path) = cli.out {
        cfg.export = ExportTarget::File {
            path,
            delimiter: cli.format.unwrap_or(Format::Csv).into(),
        };
    } else if let (Some(format), ExportTarget::File { delimiter, .. }) =
        (cli.format, &mut cfg.export)
    {
        *delimiter = format.into();
    }
    if let Some(id) = cli.sheet {
        let mut sheets = SheetsConfig::new(id);
        if let Some(range) = cli.range {
            sheets.range = range;
        }
        sheets.token_path = cli.token;
        cfg.export = ExportTarget::Sheets(sheets);
    }
    if cli.snapshot.is_some() {
        cfg.snapshot = cli.snapshot;
    }
    if cli.dump_tables.is_some() {
        cfg.dump_tables = cli.dump_tables;
    }
    if let Some(window) = cli.sma {
        let column = cli
            .sma_column
            .or_else(|| cfg.sma.as_ref().map(|s| s.column.clone()))
            .unwrap_or_else(|| "Total".into());
        cfg.sma = Some(SmaConfig { column, window });
    }

    cfg.validate().context("invalid configuration")?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) config ───────────────────────────────────────────────────
    let cfg = build_config(Cli::parse())?;
    info!(url = %cfg.fetch.url, dest = %cfg.export.describe(), "startup");

    // ─── 3) run once ─────────────────────────────────────────────────
    match flowscraper::run(&cfg).await {
        Ok(report) => {
            info!(
                rows = report.rows_written,
                dest = %report.destination,
                elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
                "all done"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "run failed");
            Err(e).context("scrape run failed")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("flowscraper").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_target_farside_csv() {
        let cfg = build_config(cli(&[])).unwrap();
        assert_eq!(cfg, ScrapeConfig::default());
    }

    #[test]
    fn flags_override_export() {
        let cfg = build_config(cli(&["--out", "x.tsv", "--format", "tsv", "--sma", "7"])).unwrap();
        assert_eq!(
            cfg.export,
            ExportTarget::File {
                path: "x.tsv".into(),
                delimiter: Delimiter::Tsv
            }
        );
        assert_eq!(cfg.sma.unwrap().window, 7);

        let cfg = build_config(cli(&["--sheet", "abc", "--range", "Flows!A1"])).unwrap();
        match cfg.export {
            ExportTarget::Sheets(s) => {
                assert_eq!(s.spreadsheet_id, "abc");
                assert_eq!(s.range, "Flows!A1");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn format_flag_overrides_config_delimiter() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("flows.yaml");
        std::fs::write(&path, "export: {kind: file, path: o.tsv, delimiter: tsv}\n").unwrap();
        let config = path.to_str().unwrap();

        let cfg = build_config(cli(&["--config", config, "--format", "csv"])).unwrap();
        assert_eq!(
            cfg.export,
            ExportTarget::File {
                path: "o.tsv".into(),
                delimiter: Delimiter::Csv
            }
        );

        // no flag keeps what the file says
        let cfg = build_config(cli(&["--config", config])).unwrap();
        assert_eq!(
            cfg.export,
            ExportTarget::File {
                path: "o.tsv".into(),
                delimiter: Delimiter::Tsv
            }
        );
    }

    #[test]
    fn sma_column_comes_from_flag_then_config() {
        let cfg = build_config(cli(&["--sma", "3", "--sma-column", "IBIT"])).unwrap();
        assert_eq!(cfg.sma.unwrap().column, "IBIT");

        let tmp = tempdir().unwrap();
        let path = tmp.path().join("flows.yaml");
        std::fs::write(&path, "sma: {column: FBTC, window: 10}\n").unwrap();
        let config = path.to_str().unwrap();
        let sma = build_config(cli(&["--config", config, "--sma", "3"])).unwrap().sma.unwrap();
        assert_eq!((sma.column.as_str(), sma.window), ("FBTC", 3));

        let sma = build_config(cli(&["--sma", "3"])).unwrap().sma.unwrap();
        assert_eq!(sma.column, "Total");

        assert!(build_config(cli(&["--sma", "3", "--sma-column", "Nope"])).is_err());
    }

    #[test]
    fn out_and_sheet_conflict() {
        assert!(Cli::try_parse_from(["flowscraper", "--out", "a.csv", "--sheet", "x"]).is_err());
    }

    #[test]
    fn zero_sma_window_is_rejected() {
        assert!(build_config(cli(&["--sma", "0"])).is_err());
    }
}
