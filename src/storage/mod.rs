// Storage module for pipeline inputs, artifacts and state
// Author: Gabriel Demetrios Lafis

mod file;
mod state;

pub use file::*;
pub use state::*;

use std::path::PathBuf;

use thiserror::Error;

use crate::data::DataError;

/// Represents an error in the storage module
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Data error: {0}")]
    DataError(#[from] DataError),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("CSV at {} is empty or has no data rows", .0.display())]
    Empty(PathBuf),
    #[error("Invalid state file {}: {reason}", .path.display())]
    InvalidState { path: PathBuf, reason: String },
}
