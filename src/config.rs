// src/config.rs

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ScrapeError};
use crate::export::ExportTarget;
use crate::fetch::FetchConfig;
use crate::table::{FieldSpec, TableSelector};

/// Header and fee rows at the top of the Farside table, ahead of the daily flows.
pub const FARSIDE_HEADER_ROWS: usize = 4;

/// Moving average to log after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmaConfig {
    #[serde(default = "default_sma_column")]
    pub column: String,
    pub window: usize,
}

fn default_sma_column() -> String {
    "Total".into()
}

/// Everything one run needs. Defaults scrape the Farside BTC ETF flow table
/// into `btc_etf_data.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub fetch: FetchConfig,
    pub table: TableSelector,
    pub fields: FieldSpec,
    pub header_rows_to_skip: usize,
    pub export: ExportTarget,
    /// Save the fetched HTML here before parsing.
    pub snapshot: Option<PathBuf>,
    /// Dump every matched table verbatim into this directory.
    pub dump_tables: Option<PathBuf>,
    pub sma: Option<SmaConfig>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            table: TableSelector::default(),
            fields: FieldSpec::btc_etf(),
            header_rows_to_skip: FARSIDE_HEADER_ROWS,
            export: ExportTarget::default(),
            snapshot: None,
            dump_tables: None,
            sma: None,
        }
    }
}

impl ScrapeConfig {
    /// Read a YAML config; missing keys take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ScrapeError::io("reading", path, e))?;
        let cfg = Self::from_yaml_str(&text)
            .map_err(|e| ScrapeError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self =
            serde_yaml::from_str(text).map_err(|e| ScrapeError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(sma) = &self.sma {
            if sma.window == 0 {
                return Err(ScrapeError::Config("sma.window must be at least 1".into()));
            }
            if self.fields.value_index(&sma.column).is_none() {
                return Err(ScrapeError::Config(format!(
                    "sma.column {:?} is not a numeric field",
                    sma.column
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::Delimiter;

    #[test]
    fn empty_yaml_is_farside_default() {
        let cfg = ScrapeConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg, ScrapeConfig::default());
        assert_eq!(cfg.header_rows_to_skip, 4);
        assert_eq!(cfg.table.table, "table.etf");
    }

    #[test]
    fn partial_yaml_overrides_only_given_keys() {
        let cfg = ScrapeConfig::from_yaml_str(
            r#"
fetch:
  url: https://example.com/table
table:
  table: table
  cell: "td, th"
fields: [Date, A, B]
header_rows_to_skip: 1
export:
  kind: file
  path: out/flows.tsv
  delimiter: tsv
sma:
  column: B
  window: 3
"#,
        )
        .unwrap();
        assert_eq!(cfg.fetch.url, "https://example.com/table");
        // headers keep their defaults
        assert!(cfg.fetch.headers.contains_key("User-Agent"));
        assert_eq!(cfg.table.index, 0);
        assert_eq!(cfg.fields.len(), 3);
        assert_eq!(
            cfg.export,
            ExportTarget::File {
                path: "out/flows.tsv".into(),
                delimiter: Delimiter::Tsv
            }
        );
        assert_eq!(cfg.sma.unwrap().window, 3);
    }

    #[test]
    fn sma_on_unknown_column_is_rejected() {
        let err = ScrapeConfig::from_yaml_str("sma: {column: Nope, window: 5}").unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
        assert!(ScrapeConfig::from_yaml_str("sma: {window: 0}").is_err());
    }

    #[test]
    fn bundled_farside_config_loads() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/farside_btc.yaml");
        let cfg = ScrapeConfig::from_yaml_file(path).unwrap();
        assert_eq!(cfg.fields, FieldSpec::btc_etf());
        assert_eq!(cfg.header_rows_to_skip, FARSIDE_HEADER_ROWS);
        assert_eq!(cfg.snapshot, Some(PathBuf::from("webpage.html")));
    }

    #[test]
    fn empty_field_list_is_rejected() {
        assert!(ScrapeConfig::from_yaml_str("fields: []").is_err());
    }
}
