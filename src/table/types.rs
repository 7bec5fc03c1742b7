// src/table/types.rs

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};

/// Column layout of the Farside BTC spot-ETF flow table.
pub const BTC_ETF_FIELDS: &[&str] = &[
    "Date", "IBIT", "FBTC", "BITB", "ARKB", "BTCO", "EZBC", "BRRR", "HODL", "BTCW", "GBTC", "BTC",
    "Total",
];

/// Ordered column names of the expected table.
///
/// Column 0 is the text key (a date on Farside); every other column is numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FieldSpec {
    names: Vec<String>,
}

impl FieldSpec {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ScrapeError::Config("field spec needs at least one column".into()));
        }
        Ok(Self { names })
    }

    pub fn btc_etf() -> Self {
        Self {
            names: BTC_ETF_FIELDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Total column count, key included.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Number of numeric columns, i.e. `len() - 1`.
    pub fn numeric_len(&self) -> usize {
        self.names.len() - 1
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn key_name(&self) -> &str {
        &self.names[0]
    }

    /// Index into `Record::values` for a numeric column name.
    pub fn value_index(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .skip(1)
            .position(|n| n.eq_ignore_ascii_case(name))
    }
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self::btc_etf()
    }
}

impl TryFrom<Vec<String>> for FieldSpec {
    type Error = ScrapeError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        FieldSpec::new(names)
    }
}

impl From<FieldSpec> for Vec<String> {
    fn from(spec: FieldSpec) -> Self {
        spec.names
    }
}

/// One normalised data row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: String,
    pub values: Vec<f64>,
}

/// Records that all conform to `fields`, in source row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    fields: FieldSpec,
    records: Vec<Record>,
}

impl Dataset {
    pub(crate) fn new(fields: FieldSpec, records: Vec<Record>) -> Self {
        debug_assert!(records.iter().all(|r| r.values.len() == fields.numeric_len()));
        Self { fields, records }
    }

    pub fn fields(&self) -> &FieldSpec {
        &self.fields
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// All values of one numeric column, in record order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.fields.value_index(name)?;
        Some(self.records.iter().map(|r| r.values[idx]).collect())
    }

    /// Header row followed by one string row per record.
    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.records.len() + 1);
        rows.push(self.fields.names().to_vec());
        for rec in &self.records {
            let mut row = Vec::with_capacity(rec.values.len() + 1);
            row.push(rec.date.clone());
            row.extend(rec.values.iter().map(f64::to_string));
            rows.push(row);
        }
        rows
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
