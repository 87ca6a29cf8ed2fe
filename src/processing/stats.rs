// Summary statistics for datasets
// Author: Gabriel Demetrios Lafis

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::data::{DataSet, Value};
use super::is_null;

/// Mean of values; `None` when there are none
pub(crate) fn compute_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of values; the mean of the two middle values for even counts
pub(crate) fn compute_median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent value; ties go to the smallest
pub(crate) fn compute_mode(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;

    while i < sorted.len() {
        let run = sorted[i..].iter().take_while(|&&x| x == sorted[i]).count();
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((sorted[i], run));
        }
        i += run;
    }

    best.map(|(value, _)| value)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Non-null values of a column when every one of them is a number.
///
/// Returns `None` for columns holding text, booleans or date-times, and for
/// columns with no values at all.
pub(crate) fn numeric_values(data: &DataSet, column: &str) -> Option<Vec<f64>> {
    let mut values = Vec::new();

    for value in data.rows.iter().filter_map(|row| row.get(column)) {
        if is_null(value) {
            continue;
        }
        values.push(value.as_f64()?);
    }

    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Numeric statistics of a column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// Statistics of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    /// Cells holding a non-null value
    pub count: usize,
    /// Rows where the column is null or absent
    pub missing: usize,
    /// Distinct non-null values
    pub unique: usize,
    pub numeric: Option<NumericSummary>,
}

/// Shape and per-column statistics of a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
}

/// Summarize every column of a dataset, in first-seen column order
pub fn summarize(data: &DataSet) -> DataSummary {
    let columns = data
        .columns_in_order()
        .into_iter()
        .map(|column| {
            let present: Vec<&Value> = data
                .rows
                .iter()
                .filter_map(|row| row.get(&column))
                .filter(|value| !is_null(value))
                .collect();
            let distinct: HashSet<String> = present.iter().map(|value| value.to_string()).collect();

            let numeric = numeric_values(data, &column).and_then(|values| {
                Some(NumericSummary {
                    min: values.iter().copied().fold(f64::INFINITY, f64::min),
                    max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    mean: compute_mean(&values)?,
                    median: compute_median(&values)?,
                })
            });

            ColumnSummary {
                count: present.len(),
                missing: data.len() - present.len(),
                unique: distinct.len(),
                numeric,
                column,
            }
        })
        .collect();

    DataSummary {
        rows: data.len(),
        columns,
    }
}

impl DataSummary {
    /// Plain-text report with one line per column
    pub fn to_text(&self) -> String {
        let mut lines = vec![
            "Data report".to_string(),
            format!("Rows: {}", self.rows),
            format!("Columns: {}", self.columns.len()),
            String::new(),
        ];

        for summary in &self.columns {
            let mut line = format!(
                "{}: count={} missing={} unique={}",
                summary.column, summary.count, summary.missing, summary.unique
            );
            if let Some(numeric) = &summary.numeric {
                line.push_str(&format!(
                    " min={} max={} mean={} median={}",
                    Value::Float(numeric.min),
                    Value::Float(numeric.max),
                    Value::Float(numeric.mean),
                    Value::Float(numeric.median)
                ));
            }
            lines.push(line);
        }

        lines.join("\n")
    }
}
