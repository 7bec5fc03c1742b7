// src/export/file.rs

use std::fs;
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ScrapeError};
use crate::table::{Dataset, RawTable};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Csv,
    Tsv,
}

impl Delimiter {
    pub fn byte(self) -> u8 {
        match self {
            Delimiter::Csv => b',',
            Delimiter::Tsv => b'\t',
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ScrapeError::io("creating", parent, e))?;
    }
    Ok(())
}

/// Write the dataset with a header row of column names.
pub fn write_dataset(ds: &Dataset, path: impl AsRef<Path>, delimiter: Delimiter) -> Result<usize> {
    let path = path.as_ref();
    let target = path.display().to_string();
    ensure_parent(path)?;

    let mut w = WriterBuilder::new()
        .delimiter(delimiter.byte())
        .from_path(path)
        .map_err(|e| ScrapeError::export(&target, e))?;

    for row in ds.to_string_rows() {
        w.write_record(&row).map_err(|e| ScrapeError::export(&target, e))?;
    }
    w.flush().map_err(|e| ScrapeError::io("flushing", path, e))?;

    info!(path = %target, rows = ds.len(), "wrote dataset");
    Ok(ds.len())
}

/// Dump every table verbatim to `dir/table_<n>.csv`, numbered from 1.
/// Rows keep their own widths.
pub fn dump_raw_tables(tables: &[RawTable], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| ScrapeError::io("creating", dir, e))?;

    let mut written = Vec::with_capacity(tables.len());
    for (i, table) in tables.iter().enumerate() {
        let path = dir.join(format!("table_{}.csv", i + 1));
        let target = path.display().to_string();
        let mut w = WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| ScrapeError::export(&target, e))?;
        for row in table.rows.iter().filter(|r| !r.is_empty()) {
            w.write_record(row).map_err(|e| ScrapeError::export(&target, e))?;
        }
        w.flush().map_err(|e| ScrapeError::io("flushing", &path, e))?;
        debug!(path = %target, rows = table.len(), "dumped raw table");
        written.push(path);
    }
    info!(dir = %dir.display(), tables = written.len(), "dumped raw tables");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{extract, FieldSpec};
    use tempfile::tempdir;

    fn sample() -> Dataset {
        let raw = RawTable::from_rows(vec![
            vec!["11 Jan 2024", "111.7", "(95.1)"],
            vec!["12 Jan 2024", "1,000", "-"],
        ]);
        extract(&raw, &FieldSpec::new(["Date", "IBIT", "Total"]).unwrap(), 0)
    }

    #[test]
    fn csv_has_header_and_rows() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out").join("btc_etf_data.csv");
        assert_eq!(write_dataset(&sample(), &path, Delimiter::Csv).unwrap(), 2);

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,IBIT,Total",
                "11 Jan 2024,111.7,-95.1",
                "12 Jan 2024,1000,0"
            ]
        );
    }

    #[test]
    fn tsv_uses_tabs() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("out.tsv");
        write_dataset(&sample(), &path, Delimiter::Tsv).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("Date\tIBIT\tTotal"));
    }

    #[test]
    fn raw_dump_numbers_files_and_skips_empty_rows() {
        let tmp = tempdir().unwrap();
        let tables = vec![
            RawTable::from_rows(vec![vec![], vec!["a", "b"], vec!["c"]]),
            RawTable::from_rows(vec![vec!["x"]]),
        ];
        let paths = dump_raw_tables(&tables, tmp.path()).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with("table_2.csv"));
        let first = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(first, "a,b\nc\n");
    }
}
