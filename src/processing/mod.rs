// Processing module for cleaning steps and pipelines
// Author: Gabriel Demetrios Lafis

mod cast;
mod clean;
mod merge;
mod stats;
mod transform;

pub use cast::*;
pub use clean::*;
pub use merge::*;
pub use stats::*;
pub use transform::*;

use chrono::Local;
use log::info;
use thiserror::Error;

use crate::data::{DataError, DataSet};

/// Represents one cleaning step that transforms a dataset
pub trait DataProcessor {
    /// Process a dataset and return a new dataset
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError>;

    /// Get the processor name
    fn name(&self) -> &str;

    /// Columns that must exist before this step can run
    fn required_columns(&self) -> Vec<String> {
        Vec::new()
    }

    /// Check that the required columns exist in the incoming dataset
    fn preflight(&self, input: &DataSet) -> Result<(), ProcessingError> {
        let missing: Vec<String> = self
            .required_columns()
            .into_iter()
            .filter(|column| !input.has_column(column))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ProcessingError::MissingColumns {
                step: self.name().to_string(),
                columns: missing,
            })
        }
    }
}

/// Represents an error in the processing module
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Data error: {0}")]
    DataError(#[from] DataError),
    #[error("{step}: missing required columns: {}", .columns.join(", "))]
    MissingColumns { step: String, columns: Vec<String> },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Pipeline for chaining cleaning steps in a fixed order
pub struct Pipeline {
    name: String,
    processors: Vec<Box<dyn DataProcessor>>,
    history: Vec<String>,
}

impl Pipeline {
    /// Create a new pipeline with the given name
    pub fn new(name: &str) -> Self {
        Pipeline {
            name: name.to_string(),
            processors: Vec::new(),
            history: Vec::new(),
        }
    }

    /// Add a processor to the pipeline
    pub fn add<P: DataProcessor + 'static>(mut self, processor: P) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Names of the steps, in execution order
    pub fn step_names(&self) -> Vec<String> {
        self.processors.iter().map(|p| p.name().to_string()).collect()
    }

    /// Run every step on a copy of the dataset, recording one history line per step
    pub fn run(&mut self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut current = input.clone();

        for processor in &self.processors {
            processor.preflight(&current)?;
            current = processor.process(&current)?;

            info!(
                "{}: {} finished ({} rows, {} columns)",
                self.name,
                processor.name(),
                current.len(),
                current.columns().len()
            );
            let stamp = Local::now().format("%H:%M:%S");
            self.history
                .push(format!("[{}] {}: {} finished", stamp, processor.name(), processor.name()));
        }

        Ok(current)
    }

    /// Copy of the history log
    pub fn history(&self) -> Vec<String> {
        self.history.clone()
    }
}

impl DataProcessor for Pipeline {
    /// Runs the steps without recording history
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut current = input.clone();

        for processor in &self.processors {
            processor.preflight(&current)?;
            current = processor.process(&current)?;
        }

        Ok(current)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
