// Storage, config and workflow tests
// Author: Gabriel Demetrios Lafis

use std::fs;

use serde_json::json;
use tempfile::tempdir;

use research_data_pipeline::{
    data::{CsvSource, DataSet, DataSource, JsonSource, Row, Value},
    processing::{FillStrategy, TypeLabel, TypeMap},
    storage::{
        load_raw_csv, load_state, save_cleaned_csv, save_state, save_validation_report,
        PipelineState, StorageError,
    },
    utils::Config,
    validation::{ColumnRule, RuleKind, RuleSet, ValidationReport, ALL_CHECKS_PASSED},
    workflow::{run_workflow, CLEANED_CSV_NAME, DATA_REPORT_NAME, REPORT_NAME},
};

#[test]
fn test_load_raw_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("raw.csv");
    fs::write(&path, "Q1 - Age,Email\n19,a@umd.edu\n,b@umd.edu\n").unwrap();

    let dataset = load_raw_csv(&path).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.rows[0].get("Q1 - Age"), Some(&Value::from("19")));
    assert_eq!(dataset.rows[1].get("Q1 - Age"), Some(&Value::Null));
    assert_eq!(dataset.metadata.get("source"), Some(&"csv".to_string()));
}

#[test]
fn test_load_raw_csv_missing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nope.csv");

    match load_raw_csv(&path) {
        Err(StorageError::NotFound(p)) => assert_eq!(p, path),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_load_raw_csv_header_only_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "a,b,c\n").unwrap();

    assert!(matches!(load_raw_csv(&path), Err(StorageError::Empty(_))));
}

#[test]
fn test_save_cleaned_csv_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("out").join("clean.csv");

    let dataset = DataSet::from_rows(vec![
        Row::from_pairs([
            ("age", Value::Integer(19)),
            ("consent", Value::Boolean(true)),
            ("score", Value::Float(4.0)),
        ]),
        Row::from_pairs([("age", Value::Null), ("note", Value::from("late"))]),
    ]);

    let written = save_cleaned_csv(&dataset, &path).unwrap();
    assert_eq!(written, path);

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["age,consent,score,note", "19,True,4.0,", ",,,late"]);

    let back = CsvSource::new(&path, true, ',').read().unwrap();
    assert_eq!(back.rows[0].get("consent"), Some(&Value::from("True")));
    assert_eq!(back.rows[1].get("age"), Some(&Value::Null));
    assert_eq!(back.rows[1].get("note"), Some(&Value::from("late")));
}

#[test]
fn test_save_validation_report() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reports").join("report.md");

    save_validation_report(&ValidationReport::default(), &path).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), ALL_CHECKS_PASSED);
}

#[test]
fn test_state_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("state.json");
    let state = PipelineState::new(
        json!({"pii_columns": ["email"], "input_csv": "raw.csv"}),
        vec!["[10:00:00] HeaderNormalizer: HeaderNormalizer finished".to_string()],
    );

    save_state(&path, &state).unwrap();
    let loaded = load_state(&path).unwrap();

    assert_eq!(loaded, state);
}

#[test]
fn test_load_state_rejects_bad_documents() {
    let dir = tempdir().unwrap();

    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "{not json").unwrap();
    assert!(matches!(load_state(&garbage), Err(StorageError::InvalidState { .. })));

    let partial = dir.path().join("partial.json");
    fs::write(&partial, r#"{"config": {}}"#).unwrap();
    assert!(matches!(load_state(&partial), Err(StorageError::InvalidState { .. })));

    let list = dir.path().join("list.json");
    fs::write(&list, "[]").unwrap();
    assert!(matches!(load_state(&list), Err(StorageError::InvalidState { .. })));

    let missing = dir.path().join("missing.json");
    assert!(matches!(load_state(&missing), Err(StorageError::NotFound(_))));
}

#[test]
fn test_json_source_with_array_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("responses.json");
    fs::write(
        &path,
        r#"{"survey": {"responses": [{"age": 19, "name": "Ada"}, {"age": null}]}}"#,
    )
    .unwrap();

    let dataset = JsonSource::with_array_path(&path, "survey.responses")
        .read()
        .unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.rows[0].get("age"), Some(&Value::Integer(19)));
    assert_eq!(dataset.rows[1].get("age"), Some(&Value::Null));
    assert!(!dataset.rows[1].contains_key("name"));

    let wrong = JsonSource::with_array_path(&path, "survey.answers").read();
    assert!(wrong.is_err());
}

#[test]
fn test_config_from_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        "\
pii_columns: [email_address]
rename_map:
  q1_age: age
type_map:
  age: int
  joined: \"datetime:%Y-%m-%d\"
rules:
  age:
    required: true
    min: 0
    max: 120
  consent:
    allowed: [true, false]
logging:
  level: debug
",
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.pii_columns, vec!["email_address".to_string()]);
    assert_eq!(config.rename_map.get("q1_age"), Some(&"age".to_string()));
    assert_eq!(config.type_map.get("age"), Some(&TypeLabel::Int));
    assert_eq!(
        config.type_map.get("joined"),
        Some(&TypeLabel::DateTime("%Y-%m-%d".to_string()))
    );
    let columns: Vec<&str> = config.rules.iter().map(|(column, _)| column).collect();
    assert_eq!(columns, vec!["age", "consent"]);
    assert_eq!(config.rules.get("age").and_then(|rule| rule.max), Some(120.0));
    assert_eq!(config.log_level_filter(), log::LevelFilter::Debug);
    // unset sections keep their defaults
    assert_eq!(config.output.dir.to_str(), Some("outputs"));
    assert!(!config.strip_whitespace);
    assert_eq!(config.fill_missing, None);
}

#[test]
fn test_config_cleaning_options() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yml");
    fs::write(&path, "strip_whitespace: true\nfill_missing: median\n").unwrap();

    let config = Config::from_file(&path).unwrap();
    assert!(config.strip_whitespace);
    assert_eq!(config.fill_missing, Some(FillStrategy::Median));

    let json = config.to_json().unwrap();
    assert_eq!(json["fill_missing"], json!("median"));
    assert_eq!(json["strip_whitespace"], json!(true));
    assert_eq!(json["rules"], json!({}));

    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"fill_missing": "average"}"#).unwrap();
    assert!(Config::from_file(&bad).is_err());
}

#[test]
fn test_config_rejects_unknown_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "pii_columns = []").unwrap();

    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_run_workflow_end_to_end() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    fs::write(
        &input,
        "Q1 - Age,Email,Consent\n19,a@umd.edu,Yes\n200,b@umd.edu,no\nNA,c@umd.edu,yes\n",
    )
    .unwrap();

    let mut type_map = TypeMap::new();
    type_map.insert("q1_age".to_string(), TypeLabel::Int);
    type_map.insert("consent".to_string(), TypeLabel::Bool);
    let config = Config {
        type_map,
        rules: RuleSet::new()
            .column("q1_age", ColumnRule::new().type_label("int").max(120.0))
            .column("consent", ColumnRule::new().not_null()),
        ..Config::default()
    };

    let output_dir = dir.path().join("outputs");
    let state_path = dir.path().join("state").join("state.json");
    let outcome = run_workflow(&input, &config, &output_dir, Some(&state_path)).unwrap();

    assert_eq!(outcome.cleaned_path, output_dir.join(CLEANED_CSV_NAME));
    assert_eq!(outcome.report_path, output_dir.join(REPORT_NAME));
    assert_eq!(outcome.data_report_path, output_dir.join(DATA_REPORT_NAME));
    assert_eq!(outcome.state_path.as_deref(), Some(state_path.as_path()));

    let cleaned = fs::read_to_string(&outcome.cleaned_path).unwrap();
    let lines: Vec<&str> = cleaned.lines().collect();
    assert_eq!(lines, vec!["q1_age,consent", "19,True", "200,False", ",True"]);

    assert_eq!(outcome.report.len(), 1);
    let issue = &outcome.report.issues[0];
    assert_eq!((issue.row_idx, issue.column.as_str(), issue.rule), (1, "q1_age", RuleKind::Max));

    let report = fs::read_to_string(&outcome.report_path).unwrap();
    assert!(report.starts_with("|Row|Column|Rule|Value|Message|"));
    assert!(report.contains("|1|q1_age|max|200|"));

    let state = load_state(&state_path).unwrap();
    assert_eq!(state.history.len(), 3);
    assert!(state.history[0].ends_with("HeaderNormalizer: HeaderNormalizer finished"));
    assert!(state.history[2].ends_with("TypeCaster: TypeCaster finished"));
    assert_eq!(state.config["input_csv"], json!(input.display().to_string()));
    assert_eq!(state.config["type_map"]["q1_age"], json!("int"));

    let data_report = fs::read_to_string(&outcome.data_report_path).unwrap();
    let lines: Vec<&str> = data_report.lines().collect();
    assert!(lines[0].starts_with("Dataset '"));
    assert!(lines[0].ends_with("' | 3 rows, 2 columns"));
    assert!(data_report.contains("q1_age: count=2 missing=1 unique=2 min=19.0 max=200.0"));
    assert!(data_report.contains("consent: count=3 missing=0 unique=2"));
}

#[test]
fn test_run_workflow_strips_and_fills() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    fs::write(&input, "Name,Score,Note\nAda, 3 ,  hi \nBo,NA,x\nCy,5,y\n").unwrap();

    let mut type_map = TypeMap::new();
    type_map.insert("score".to_string(), TypeLabel::Int);
    let config = Config {
        type_map,
        strip_whitespace: true,
        fill_missing: Some(FillStrategy::Zero),
        ..Config::default()
    };

    let outcome = run_workflow(&input, &config, &dir.path().join("out"), None).unwrap();

    let cleaned = fs::read_to_string(&outcome.cleaned_path).unwrap();
    let lines: Vec<&str> = cleaned.lines().collect();
    assert_eq!(lines, vec!["score,note", "3,hi", "0,x", "5,y"]);

    assert_eq!(outcome.history.len(), 5);
    assert!(outcome.history[2].ends_with("WhitespaceStripper: WhitespaceStripper finished"));
    assert!(outcome.history[4].ends_with("MissingValueFiller: MissingValueFiller finished"));
}

#[test]
fn test_run_workflow_without_state_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    fs::write(&input, "Name,Score\nAda,3\n").unwrap();

    let output_dir = dir.path().join("out");
    let outcome = run_workflow(&input, &Config::default(), &output_dir, None).unwrap();

    assert!(outcome.state_path.is_none());
    assert!(outcome.report.is_valid());
    assert_eq!(
        fs::read_to_string(&outcome.report_path).unwrap(),
        ALL_CHECKS_PASSED
    );
    let cleaned = fs::read_to_string(&outcome.cleaned_path).unwrap();
    assert_eq!(cleaned.lines().next(), Some("score"));
}

#[test]
fn test_run_workflow_reports_missing_typed_column() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    fs::write(&input, "Score\n3\n").unwrap();

    let mut type_map = TypeMap::new();
    type_map.insert("age".to_string(), TypeLabel::Int);
    let config = Config {
        type_map,
        ..Config::default()
    };

    let result = run_workflow(&input, &config, &dir.path().join("out"), None);
    assert!(result.is_err());
}
