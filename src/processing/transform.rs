// Transform operations for cleaning survey exports
// Author: Gabriel Demetrios Lafis

use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::data::{DataSet, Row, Value};
use super::{cast_row, DataProcessor, ProcessingError, TypeMap};

/// Normalize a column header to snake_case.
///
/// Lower-cases, turns every run of characters outside `[0-9a-z]` into a single
/// underscore, trims underscores at both ends, and prefixes `col_` when the
/// result starts with a digit. An empty result becomes `unnamed`.
///
/// ```
/// use research_data_pipeline::processing::normalize_header;
///
/// assert_eq!(normalize_header("Q3 - Overall Satisfaction (1-5)"), "q3_overall_satisfaction_1_5");
/// assert_eq!(normalize_header("123"), "col_123");
/// assert_eq!(normalize_header("!!!"), "unnamed");
/// ```
pub fn normalize_header(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_underscore = false;

    for c in name.trim().to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_underscore && !out.is_empty() {
                out.push('_');
            }
            pending_underscore = false;
            out.push(c);
        } else {
            pending_underscore = true;
        }
    }

    if out.is_empty() {
        return "unnamed".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "col_");
    }
    out
}

/// Rename every column header of a dataset to snake_case.
///
/// Headers that normalize to the same name are kept apart with `_2`, `_3`, ...
pub struct HeaderNormalizer;

impl HeaderNormalizer {
    pub fn new() -> Self {
        HeaderNormalizer
    }
}

impl Default for HeaderNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProcessor for HeaderNormalizer {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        Ok(input.map_rows(|row| {
            let mut out = Row::new();
            for (key, value) in row.iter() {
                insert_with_suffix(&mut out, normalize_header(key), value.clone());
            }
            out
        }))
    }

    fn name(&self) -> &str {
        "HeaderNormalizer"
    }
}

/// Old column name to new column name; an empty target drops the column
pub type RenameMap = BTreeMap<String, String>;

/// Options for [`rename_columns`]
#[derive(Debug, Clone, Copy)]
pub struct RenameOptions {
    /// Drop columns that have no entry in the rename map
    pub drop_unmapped: bool,
    /// Pass target names through [`normalize_header`]
    pub normalize_targets: bool,
}

impl Default for RenameOptions {
    fn default() -> Self {
        RenameOptions {
            drop_unmapped: false,
            normalize_targets: true,
        }
    }
}

/// Rename columns of one row.
///
/// When a target name is already taken, `_2`, `_3`, ... is appended until it
/// is free.
pub fn rename_columns(row: &Row, rename_map: &RenameMap, options: RenameOptions) -> Row {
    let mut out = Row::new();

    for (old_key, value) in row.iter() {
        let new_key = match rename_map.get(old_key) {
            Some(target) if target.is_empty() => continue,
            Some(target) if options.normalize_targets => normalize_header(target),
            Some(target) => target.clone(),
            None if options.drop_unmapped => continue,
            None => old_key.to_string(),
        };

        insert_with_suffix(&mut out, new_key, value.clone());
    }

    out
}

/// Insert under `key`, or under the first free `key_2`, `key_3`, ... when
/// `key` is already taken
fn insert_with_suffix(row: &mut Row, key: String, value: Value) {
    if !row.contains_key(&key) {
        row.insert(key, value);
        return;
    }

    let mut suffix = 2;
    loop {
        let candidate = format!("{}_{}", key, suffix);
        if !row.contains_key(&candidate) {
            row.insert(candidate, value);
            return;
        }
        suffix += 1;
    }
}

/// Rename or drop columns using a rename map
pub struct RenameTransform {
    rename_map: RenameMap,
    options: RenameOptions,
}

impl RenameTransform {
    pub fn new(rename_map: RenameMap) -> Self {
        RenameTransform {
            rename_map,
            options: RenameOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenameOptions) -> Self {
        self.options = options;
        self
    }
}

impl DataProcessor for RenameTransform {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        Ok(input.map_rows(|row| rename_columns(row, &self.rename_map, self.options)))
    }

    fn name(&self) -> &str {
        "RenameTransform"
    }
}

/// Drop personally identifying columns; absent columns are ignored
pub struct PiiRemover {
    columns: BTreeSet<String>,
}

impl PiiRemover {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PiiRemover {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

impl DataProcessor for PiiRemover {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        Ok(input.map_rows(|row| {
            row.iter()
                .filter(|(key, _)| !self.columns.contains(*key))
                .map(|(key, value)| (key, value.clone()))
                .collect()
        }))
    }

    fn name(&self) -> &str {
        "PIIRemover"
    }
}

/// Cast columns to their configured types
pub struct TypeCaster {
    type_map: TypeMap,
}

impl TypeCaster {
    pub fn new(type_map: TypeMap) -> Self {
        for (column, label) in &type_map {
            if !label.is_supported() {
                warn!("Column '{}' uses unsupported type label '{}'", column, label);
            }
        }
        TypeCaster { type_map }
    }
}

impl DataProcessor for TypeCaster {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        Ok(input.map_rows(|row| cast_row(row, &self.type_map)))
    }

    fn name(&self) -> &str {
        "TypeCaster"
    }

    fn required_columns(&self) -> Vec<String> {
        self.type_map.keys().cloned().collect()
    }
}
