// Research Data Pipeline - Main executable
// Author: Gabriel Demetrios Lafis

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use log::error;

use research_data_pipeline::{
    utils::{init_logging, Config},
    workflow::run_workflow,
};

fn main() -> ExitCode {
    // Parse command line arguments
    let matches = Command::new("Research Data Pipeline")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Gabriel Demetrios Lafis")
        .about("Survey data cleaning and validation pipeline")
        .arg(
            Arg::new("input_csv")
                .value_name("INPUT_CSV")
                .help("Path to the raw survey CSV export")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file (.json, .yaml)")
                .takes_value(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .value_name("DIR")
                .help("Directory where the cleaned data and report are written")
                .takes_value(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("state-file")
                .long("state-file")
                .value_name("FILE")
                .help("Path of the JSON state file")
                .takes_value(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-state")
                .long("no-state")
                .help("Do not write a JSON state file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log at debug level")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Load configuration
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error loading config file: {}", err);
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    // Initialize logging
    let level = if matches.get_flag("verbose") {
        log::LevelFilter::Debug
    } else {
        config.log_level_filter()
    };
    if let Err(err) = init_logging(level) {
        eprintln!("Error initializing logger: {}", err);
    }

    match run(&matches, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &clap::ArgMatches, config: &Config) -> anyhow::Result<()> {
    let input_csv = matches
        .get_one::<PathBuf>("input_csv")
        .context("missing input CSV argument")?;

    // Command line arguments override the config file
    let output_dir = matches
        .get_one::<PathBuf>("output-dir")
        .cloned()
        .unwrap_or_else(|| config.output.dir.clone());
    let state_path = if matches.get_flag("no-state") {
        None
    } else {
        Some(
            matches
                .get_one::<PathBuf>("state-file")
                .cloned()
                .unwrap_or_else(|| config.output.state_file.clone()),
        )
    };

    let outcome = run_workflow(input_csv, config, &output_dir, state_path.as_deref())
        .with_context(|| format!("workflow failed for {}", input_csv.display()))?;

    println!("Cleaned dataset: {}", outcome.cleaned_path.display());
    println!("Validation report: {}", outcome.report_path.display());
    println!("Data report: {}", outcome.data_report_path.display());
    if let Some(path) = &outcome.state_path {
        println!("State file: {}", path.display());
    }
    println!();
    println!("Validation summary:");
    println!("{}", outcome.report.to_markdown());

    Ok(())
}
