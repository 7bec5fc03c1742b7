// src/export/mod.rs

pub mod file;
pub mod sheets;

use std::path::PathBuf;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::table::Dataset;

pub use self::file::{dump_raw_tables, write_dataset, Delimiter};
pub use self::sheets::{SheetsClient, SheetsConfig};

/// Where a finished dataset goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExportTarget {
    /// Delimited text file with a header row.
    File {
        path: PathBuf,
        #[serde(default)]
        delimiter: Delimiter,
    },
    /// Clear and overwrite a Google Sheets range.
    Sheets(SheetsConfig),
    /// Extract and log only.
    None,
}

impl Default for ExportTarget {
    fn default() -> Self {
        ExportTarget::File {
            path: PathBuf::from("btc_etf_data.csv"),
            delimiter: Delimiter::Csv,
        }
    }
}

impl ExportTarget {
    pub fn describe(&self) -> String {
        match self {
            ExportTarget::File { path, .. } => path.display().to_string(),
            ExportTarget::Sheets(cfg) => format!("sheets:{}/{}", cfg.spreadsheet_id, cfg.range),
            ExportTarget::None => "none".into(),
        }
    }
}

/// Hand the dataset to the configured writer; returns rows written.
pub async fn export_dataset(ds: &Dataset, target: &ExportTarget, http: &Client) -> Result<usize> {
    match target {
        ExportTarget::File { path, delimiter } => write_dataset(ds, path, *delimiter),
        ExportTarget::Sheets(cfg) => {
            SheetsClient::new(http.clone(), cfg.clone())?
                .overwrite(ds)
                .await
        }
        ExportTarget::None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_deserialize_from_yaml() {
        let file: ExportTarget = serde_yaml::from_str("kind: file\npath: out.tsv\ndelimiter: tsv\n").unwrap();
        assert_eq!(
            file,
            ExportTarget::File {
                path: "out.tsv".into(),
                delimiter: Delimiter::Tsv
            }
        );

        let sheets: ExportTarget =
            serde_yaml::from_str("kind: sheets\nspreadsheet_id: abc\n").unwrap();
        match sheets {
            ExportTarget::Sheets(cfg) => {
                assert_eq!(cfg.range, "Sheet1!A1");
                assert_eq!(cfg.api_base, sheets::GOOGLE_SHEETS_API);
            }
            other => panic!("unexpected {:?}", other),
        }

        let none: ExportTarget = serde_yaml::from_str("kind: none\n").unwrap();
        assert_eq!(none, ExportTarget::None);
    }
}
