// src/table/extract.rs

use tracing::{debug, trace};

use super::normalize::{clean_cell, normalize};
use super::{Dataset, FieldSpec, RawTable, Record};

/// Convert a raw table into typed records.
///
/// The first `header_rows_to_skip` rows are dropped (header and fee rows on
/// Farside). After that a row must have exactly `fields.len()` cells and at
/// least one non-zero numeric cell to become a record. Rows failing either
/// check are skipped silently; a field list that does not fit the table gives an
/// empty dataset.
///
/// Note: a genuine all-zero day is indistinguishable from a placeholder row
/// and is dropped too.
pub fn extract(raw: &RawTable, fields: &FieldSpec, header_rows_to_skip: usize) -> Dataset {
    let width = fields.len();
    let mut records = Vec::new();
    let mut wrong_width = 0usize;
    let mut all_zero = 0usize;

    for (i, row) in raw.rows.iter().enumerate().skip(header_rows_to_skip) {
        if row.len() != width {
            trace!(row = i, cells = row.len(), expected = width, "skip: column count");
            wrong_width += 1;
            continue;
        }

        let values: Vec<f64> = row[1..].iter().map(|c| normalize(c)).collect();
        if values.iter().all(|v| *v == 0.0) {
            trace!(row = i, "skip: no non-zero values");
            all_zero += 1;
            continue;
        }

        records.push(Record {
            date: clean_cell(&row[0]),
            values,
        });
    }

    debug!(
        rows = raw.rows.len(),
        skipped_header = header_rows_to_skip.min(raw.rows.len()),
        wrong_width,
        all_zero,
        kept = records.len(),
        "extracted table"
    );

    Dataset::new(fields.clone(), records)
}
