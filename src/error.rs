// src/error.rs

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

/// Every way a single scrape run can stop early.
///
/// Cell normalisation is not in here: unparseable numbers degrade to `0.0`.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("GET {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("invalid CSS selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("no table #{index} matching {selector:?} (found {found})")]
    NoTable {
        selector: String,
        index: usize,
        found: usize,
    },

    #[error("table yielded no data rows for {columns} columns; check field spec and header skip")]
    EmptyDataset { columns: usize },

    #[error("export to {target} failed: {reason}")]
    Export { target: String, reason: String },

    #[error("{action} {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config: {0}")]
    Config(String),
}

impl ScrapeError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn export(target: impl Into<String>, reason: impl ToString) -> Self {
        ScrapeError::Export {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}
