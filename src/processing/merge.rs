// Merging datasets on their shared columns
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::info;

use crate::data::{DataSet, Row};
use super::{is_null, ProcessingError};

/// Which rows survive a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeHow {
    /// Only rows whose key appears on both sides
    Inner,
    /// Every row from both sides
    Outer,
    /// Every row from the left side
    Left,
    /// Every row from the right side
    Right,
}

impl FromStr for MergeHow {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inner" => Ok(MergeHow::Inner),
            "outer" => Ok(MergeHow::Outer),
            "left" => Ok(MergeHow::Left),
            "right" => Ok(MergeHow::Right),
            other => Err(ProcessingError::InvalidArgument(format!(
                "unknown merge type '{}', expected one of inner, outer, left, right",
                other
            ))),
        }
    }
}

impl fmt::Display for MergeHow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MergeHow::Inner => "inner",
            MergeHow::Outer => "outer",
            MergeHow::Left => "left",
            MergeHow::Right => "right",
        };
        write!(f, "{}", name)
    }
}

/// Merge datasets left to right on the columns each pair has in common.
///
/// Null and absent key cells match each other. Matched rows combine the left
/// row with the right row's other columns. Unmatched rows that `how` keeps are
/// passed through as they are; for `outer` the unmatched right rows follow the
/// left-driven rows. The result carries the first dataset's metadata.
pub fn merge_datasets(datasets: &[DataSet], how: MergeHow) -> Result<DataSet, ProcessingError> {
    let (first, rest) = datasets.split_first().ok_or_else(|| {
        ProcessingError::InvalidArgument("merge needs at least one dataset".to_string())
    })?;

    let merged = rest
        .iter()
        .try_fold(first.clone(), |left, right| merge_pair(&left, right, how))?;

    info!(
        "Merged {} datasets ({}): {} rows, {} columns",
        datasets.len(),
        how,
        merged.len(),
        merged.columns().len()
    );
    Ok(merged)
}

type MergeKey = Vec<Option<String>>;

fn merge_pair(left: &DataSet, right: &DataSet, how: MergeHow) -> Result<DataSet, ProcessingError> {
    let right_columns = right.columns_in_order();
    let on: Vec<String> = left
        .columns_in_order()
        .into_iter()
        .filter(|column| right_columns.contains(column))
        .collect();

    if on.is_empty() {
        return Err(ProcessingError::InvalidArgument(
            "datasets share no columns to merge on".to_string(),
        ));
    }

    let key_of = |row: &Row| -> MergeKey {
        on.iter()
            .map(|column| {
                row.get(column)
                    .filter(|value| !is_null(value))
                    .map(|value| value.to_string())
            })
            .collect()
    };
    let combine = |l: &Row, r: &Row| -> Row {
        let mut out = l.clone();
        for (column, value) in r.iter() {
            if !out.contains_key(column) {
                out.insert(column, value.clone());
            }
        }
        out
    };
    let index = |data: &DataSet| -> HashMap<MergeKey, Vec<usize>> {
        let mut index: HashMap<MergeKey, Vec<usize>> = HashMap::new();
        for (i, row) in data.rows.iter().enumerate() {
            index.entry(key_of(row)).or_default().push(i);
        }
        index
    };

    let mut result = DataSet::new();
    result.metadata = left.metadata.clone();

    if how == MergeHow::Right {
        let left_index = index(left);
        for r in &right.rows {
            match left_index.get(&key_of(r)) {
                Some(matches) => {
                    for &i in matches {
                        result.add_row(combine(&left.rows[i], r));
                    }
                }
                None => result.add_row(r.clone()),
            }
        }
        return Ok(result);
    }

    let right_index = index(right);
    let mut right_matched = vec![false; right.len()];

    for l in &left.rows {
        match right_index.get(&key_of(l)) {
            Some(matches) => {
                for &i in matches {
                    right_matched[i] = true;
                    result.add_row(combine(l, &right.rows[i]));
                }
            }
            None if how != MergeHow::Inner => result.add_row(l.clone()),
            None => {}
        }
    }

    if how == MergeHow::Outer {
        for (r, matched) in right.rows.iter().zip(&right_matched) {
            if !matched {
                result.add_row(r.clone());
            }
        }
    }

    Ok(result)
}
