// End-to-end cleaning and validation workflow
// Author: Gabriel Demetrios Lafis

use std::path::{Path, PathBuf};

use log::info;

use crate::processing::{
    HeaderNormalizer, MissingValueFiller, PiiRemover, Pipeline, RenameTransform, TypeCaster,
    WhitespaceStripper,
};
use crate::storage::{
    load_raw_csv, save_cleaned_csv, save_data_report, save_state, save_validation_report,
    PipelineState,
};
use crate::utils::{AppResult, Config};
use crate::validation::{RulesValidator, ValidationReport};

/// File name of the cleaned dataset inside the output directory
pub const CLEANED_CSV_NAME: &str = "cleaned_survey.csv";

/// File name of the Markdown report inside the output directory
pub const REPORT_NAME: &str = "validation_report.md";

/// File name of the column statistics report inside the output directory
pub const DATA_REPORT_NAME: &str = "data_report.txt";

/// Paths and results of one workflow run
#[derive(Debug)]
pub struct WorkflowOutcome {
    pub cleaned_path: PathBuf,
    pub report_path: PathBuf,
    pub data_report_path: PathBuf,
    pub state_path: Option<PathBuf>,
    pub report: ValidationReport,
    pub history: Vec<String>,
}

/// Build the standard cleaning pipeline:
/// normalize headers, apply the rename map, drop PII columns, strip
/// whitespace, cast types, fill missing numbers. Optional steps are left out
/// when the config does not ask for them.
pub fn build_pipeline(config: &Config) -> Pipeline {
    let mut pipeline = Pipeline::new("survey").add(HeaderNormalizer::new());

    if !config.rename_map.is_empty() {
        pipeline = pipeline.add(RenameTransform::new(config.rename_map.clone()));
    }

    pipeline = pipeline.add(PiiRemover::new(config.pii_columns.iter().cloned()));

    if config.strip_whitespace {
        pipeline = pipeline.add(WhitespaceStripper::new());
    }

    pipeline = pipeline.add(TypeCaster::new(config.type_map.clone()));

    if let Some(strategy) = config.fill_missing {
        pipeline = pipeline.add(MissingValueFiller::new(strategy));
    }

    pipeline
}

/// Load the raw CSV, clean it, validate it, and write the cleaned CSV, the
/// validation report, the data report and, when `state_path` is given, the
/// JSON state file.
pub fn run_workflow(
    input_csv: &Path,
    config: &Config,
    output_dir: &Path,
    state_path: Option<&Path>,
) -> AppResult<WorkflowOutcome> {
    let raw = load_raw_csv(input_csv)?;

    let mut pipeline = build_pipeline(config);
    let cleaned = pipeline.run(&raw)?;
    info!(
        "Pipeline finished: {} rows, {} columns",
        cleaned.len(),
        cleaned.columns().len()
    );

    let report = RulesValidator::new().check(&cleaned, &config.rules);

    let cleaned_path = save_cleaned_csv(&cleaned, output_dir.join(CLEANED_CSV_NAME))?;
    let report_path = save_validation_report(&report, output_dir.join(REPORT_NAME))?;
    let data_report_path = save_data_report(&cleaned, output_dir.join(DATA_REPORT_NAME))?;
    info!("Cleaned dataset saved to: {}", cleaned_path.display());
    info!("Validation report saved to: {}", report_path.display());

    let history = pipeline.history();
    let state_path = match state_path {
        Some(path) => {
            let mut state_config = config.to_json()?;
            if let Some(obj) = state_config.as_object_mut() {
                obj.insert(
                    "input_csv".to_string(),
                    input_csv.display().to_string().into(),
                );
                obj.insert(
                    "output_dir".to_string(),
                    output_dir.display().to_string().into(),
                );
            }
            let written = save_state(path, &PipelineState::new(state_config, history.clone()))?;
            info!("State saved to: {}", written.display());
            Some(written)
        }
        None => None,
    };

    Ok(WorkflowOutcome {
        cleaned_path,
        report_path,
        data_report_path,
        state_path,
        report,
        history,
    })
}
