// Cleaning steps: whitespace and missing values
// Author: Gabriel Demetrios Lafis

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{DataSet, Value};
use super::stats::{compute_mean, compute_median, compute_mode, numeric_values};
use super::{is_null, DataProcessor, ProcessingError};

/// Trim leading and trailing whitespace from every text cell
pub struct WhitespaceStripper;

impl WhitespaceStripper {
    pub fn new() -> Self {
        WhitespaceStripper
    }
}

impl Default for WhitespaceStripper {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProcessor for WhitespaceStripper {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        Ok(input.map_rows(|row| {
            let mut out = row.clone();
            for value in out.values_mut() {
                if let Value::String(text) = value {
                    let trimmed = text.trim();
                    if trimmed.len() != text.len() {
                        *text = trimmed.to_string();
                    }
                }
            }
            out
        }))
    }

    fn name(&self) -> &str {
        "WhitespaceStripper"
    }
}

/// How [`MissingValueFiller`] picks the replacement for a numeric column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FillStrategy {
    Mean,
    Median,
    Mode,
    Zero,
}

impl FromStr for FillStrategy {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mean" => Ok(FillStrategy::Mean),
            "median" => Ok(FillStrategy::Median),
            "mode" => Ok(FillStrategy::Mode),
            "zero" => Ok(FillStrategy::Zero),
            other => Err(ProcessingError::InvalidArgument(format!(
                "unknown fill strategy '{}', expected one of mean, median, mode, zero",
                other
            ))),
        }
    }
}

impl TryFrom<String> for FillStrategy {
    type Error = ProcessingError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FillStrategy> for String {
    fn from(strategy: FillStrategy) -> Self {
        strategy.to_string()
    }
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FillStrategy::Mean => "mean",
            FillStrategy::Median => "median",
            FillStrategy::Mode => "mode",
            FillStrategy::Zero => "zero",
        };
        write!(f, "{}", name)
    }
}

/// Fill missing cells of numeric columns.
///
/// A column is numeric when every non-null value in it is an integer or a
/// float, so this step belongs after type casting. Null cells and rows that
/// lack the column both count as missing. `mean` and `median` fill with a
/// float; `mode` and `zero` keep integer columns integer.
pub struct MissingValueFiller {
    strategy: FillStrategy,
}

impl MissingValueFiller {
    pub fn new(strategy: FillStrategy) -> Self {
        MissingValueFiller { strategy }
    }

    fn fill_value(&self, values: &[f64], all_integers: bool) -> Option<Value> {
        let filled = match self.strategy {
            FillStrategy::Mean => return compute_mean(values).map(Value::Float),
            FillStrategy::Median => return compute_median(values).map(Value::Float),
            FillStrategy::Mode => compute_mode(values)?,
            FillStrategy::Zero => 0.0,
        };

        if all_integers && filled.fract() == 0.0 {
            Some(Value::Integer(filled as i64))
        } else {
            Some(Value::Float(filled))
        }
    }
}

impl DataProcessor for MissingValueFiller {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut fills: Vec<(String, Value)> = Vec::new();

        for column in input.columns_in_order() {
            let Some(values) = numeric_values(input, &column) else {
                continue;
            };
            let all_integers = input
                .rows
                .iter()
                .filter_map(|row| row.get(&column))
                .all(|value| matches!(value, Value::Integer(_)) || is_null(value));

            if let Some(value) = self.fill_value(&values, all_integers) {
                debug!("Filling missing '{}' with {} ({})", column, value, self.strategy);
                fills.push((column, value));
            }
        }

        Ok(input.map_rows(|row| {
            let mut out = row.clone();
            for (column, value) in &fills {
                let missing = out.get(column).map_or(true, is_null);
                if missing {
                    out.insert(column.clone(), value.clone());
                }
            }
            out
        }))
    }

    fn name(&self) -> &str {
        "MissingValueFiller"
    }
}
