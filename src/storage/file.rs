// File storage for raw input and pipeline artifacts
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::data::{CsvSink, CsvSource, DataSet, DataSink, DataSource};
use crate::processing::summarize;
use crate::validation::ValidationReport;
use super::StorageError;

/// Create the parent directory of a path if it does not exist
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Load a raw survey CSV export.
///
/// Fails with `NotFound` when the file is missing and with `Empty` when it has
/// no data rows.
pub fn load_raw_csv<P: AsRef<Path>>(path: P) -> Result<DataSet, StorageError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }

    let dataset = CsvSource::new(path, true, ',').read()?;
    if dataset.is_empty() {
        return Err(StorageError::Empty(path.to_path_buf()));
    }

    info!(
        "Loaded {} rows, {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

/// Save the cleaned dataset as CSV, returning the written path
pub fn save_cleaned_csv<P: AsRef<Path>>(data: &DataSet, path: P) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    CsvSink::new(path, ',').write(data)?;
    Ok(path.to_path_buf())
}

/// Save a validation report as Markdown, returning the written path
pub fn save_validation_report<P: AsRef<Path>>(
    report: &ValidationReport,
    path: P,
) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    fs::write(path, report.to_markdown())?;
    Ok(path.to_path_buf())
}

/// Save the column statistics of a dataset as plain text, returning the written path
pub fn save_data_report<P: AsRef<Path>>(data: &DataSet, path: P) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    fs::write(path, format!("{}\n\n{}\n", data, summarize(data).to_text()))?;
    Ok(path.to_path_buf())
}
