// src/table/parse.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::RawTable;
use crate::error::{Result, ScrapeError};

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());

/// Which table on the page to read, and which cells count as columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSelector {
    /// CSS selector for candidate tables, e.g. `table.etf`.
    pub table: String,
    /// Position among the matched tables.
    pub index: usize,
    /// CSS selector for cells inside a `<tr>`.
    pub cell: String,
}

impl Default for TableSelector {
    fn default() -> Self {
        Self {
            table: "table.etf".into(),
            index: 0,
            cell: "td".into(),
        }
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Text of a cell with every text node trimmed and joined.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect::<String>()
}

fn read_table(table: ElementRef<'_>, cells: &Selector) -> RawTable {
    let rows = table
        .select(&ROW_SELECTOR)
        .map(|tr| tr.select(cells).map(cell_text).collect::<Vec<_>>())
        .collect();
    RawTable::new(rows)
}

/// Every table on the page matching `selector.table`, in document order.
pub fn parse_tables(html: &str, selector: &TableSelector) -> Result<Vec<RawTable>> {
    let tables = compile(&selector.table)?;
    let cells = compile(&selector.cell)?;

    let doc = Html::parse_document(html);
    let out: Vec<RawTable> = doc.select(&tables).map(|t| read_table(t, &cells)).collect();

    info!(selector = %selector.table, found = out.len(), "parsed tables");
    for (i, t) in out.iter().enumerate() {
        debug!(table = i, rows = t.len(), cols = t.max_columns(), "table shape");
    }
    Ok(out)
}

/// Take table number `selector.index` out of the parsed list.
pub fn select_table(mut tables: Vec<RawTable>, selector: &TableSelector) -> Result<RawTable> {
    let found = tables.len();
    if selector.index >= found {
        warn!(selector = %selector.table, index = selector.index, found, "table not found");
        return Err(ScrapeError::NoTable {
            selector: selector.table.clone(),
            index: selector.index,
            found,
        });
    }
    Ok(tables.swap_remove(selector.index))
}
