// JSON state file: configuration plus pipeline history
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::file::ensure_parent_dir;
use super::StorageError;

/// What a pipeline run leaves behind for the next one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub config: JsonValue,
    pub history: Vec<String>,
}

impl PipelineState {
    pub fn new(config: JsonValue, history: Vec<String>) -> Self {
        PipelineState { config, history }
    }
}

/// Write the state as pretty JSON, returning the written path
pub fn save_state<P: AsRef<Path>>(path: P, state: &PipelineState) -> Result<PathBuf, StorageError> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;

    let text = serde_json::to_string_pretty(state).map_err(|e| StorageError::InvalidState {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    fs::write(path, text)?;
    Ok(path.to_path_buf())
}

/// Read a state file written by [`save_state`].
///
/// The document must be a JSON object holding both `config` and `history`.
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<PipelineState, StorageError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(StorageError::NotFound(path.to_path_buf()));
    }

    let invalid = |reason: String| StorageError::InvalidState {
        path: path.to_path_buf(),
        reason,
    };

    let text = fs::read_to_string(path)?;
    let json: JsonValue =
        serde_json::from_str(&text).map_err(|e| invalid(format!("invalid JSON: {}", e)))?;

    match json.as_object() {
        Some(obj) if obj.contains_key("config") && obj.contains_key("history") => {}
        _ => {
            return Err(invalid(
                "expected an object with 'config' and 'history' keys".to_string(),
            ))
        }
    }

    serde_json::from_value(json).map_err(|e| invalid(e.to_string()))
}
