// src/analysis.rs

use serde::Serialize;

use crate::table::{Dataset, Record};

/// Simple moving average over complete windows only.
///
/// Output has `values.len() - window + 1` points; empty when the window is
/// zero or longer than the input.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || window > values.len() {
        return Vec::new();
    }
    let w = window as f64;
    let mut out = Vec::with_capacity(values.len() - window + 1);
    let mut sum: f64 = values[..window].iter().sum();
    out.push(sum / w);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out.push(sum / w);
    }
    out
}

/// Shape of a dataset plus its first few records, for run logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub columns: usize,
    pub head: Vec<Record>,
}

pub const HEAD_ROWS: usize = 5;

pub fn summarize(ds: &Dataset) -> Summary {
    Summary {
        rows: ds.len(),
        columns: ds.fields().len(),
        head: ds.iter().take(HEAD_ROWS).cloned().collect(),
    }
}
