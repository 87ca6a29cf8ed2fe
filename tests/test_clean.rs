// Cleaning, merging and summary tests
// Author: Gabriel Demetrios Lafis

use serde_json::json;

use research_data_pipeline::{
    data::{DataSet, Row, Value},
    processing::{
        merge_datasets, summarize, DataProcessor, FillStrategy, MergeHow, MissingValueFiller,
        ProcessingError, WhitespaceStripper,
    },
};

fn ages() -> DataSet {
    DataSet::from_rows(vec![
        Row::from_pairs([("age", Value::Integer(19)), ("name", Value::from("Ada"))]),
        Row::from_pairs([("age", Value::Null), ("name", Value::from("Bo"))]),
        Row::from_pairs([("age", Value::Integer(21)), ("name", Value::Null)]),
        Row::from_pairs([("age", Value::Integer(21))]),
        Row::from_pairs([("name", Value::from("Cy"))]),
    ])
}

fn fill(strategy: FillStrategy, data: &DataSet) -> DataSet {
    MissingValueFiller::new(strategy).process(data).unwrap()
}

#[test]
fn test_whitespace_stripper_trims_text_cells() {
    let dataset = DataSet::from_rows(vec![Row::from_pairs([
        (" Name ", Value::from("  Ada ")),
        ("age", Value::Integer(19)),
        ("note", Value::from("   ")),
        ("city", Value::from("College Park")),
    ])]);

    let out = WhitespaceStripper::new().process(&dataset).unwrap();
    let row = &out.rows[0];

    assert_eq!(row.get(" Name "), Some(&Value::from("Ada")));
    assert_eq!(row.get("age"), Some(&Value::Integer(19)));
    assert_eq!(row.get("note"), Some(&Value::from("")));
    assert_eq!(row.get("city"), Some(&Value::from("College Park")));
}

#[test]
fn test_fill_mean_and_median() {
    let data = ages();

    let mean = fill(FillStrategy::Mean, &data);
    assert_eq!(mean.rows[1].get("age"), Some(&Value::Float(61.0 / 3.0)));
    assert_eq!(mean.rows[4].get("age"), Some(&Value::Float(61.0 / 3.0)));
    assert_eq!(mean.rows[0].get("age"), Some(&Value::Integer(19)));

    let median = fill(FillStrategy::Median, &data);
    assert_eq!(median.rows[1].get("age"), Some(&Value::Float(21.0)));

    let even = DataSet::from_rows(vec![
        Row::from_pairs([("score", Value::Float(2.0))]),
        Row::from_pairs([("score", Value::Float(3.0))]),
        Row::from_pairs([("score", Value::Null)]),
    ]);
    let out = fill(FillStrategy::Median, &even);
    assert_eq!(out.rows[2].get("score"), Some(&Value::Float(2.5)));
}

#[test]
fn test_fill_mode_keeps_integer_columns_integer() {
    let out = fill(FillStrategy::Mode, &ages());

    assert_eq!(out.rows[1].get("age"), Some(&Value::Integer(21)));
    assert_eq!(out.rows[4].get("age"), Some(&Value::Integer(21)));

    let tied = DataSet::from_rows(vec![
        Row::from_pairs([("q", Value::Integer(5))]),
        Row::from_pairs([("q", Value::Integer(3))]),
        Row::from_pairs([("q", Value::Null)]),
    ]);
    let out = fill(FillStrategy::Mode, &tied);
    assert_eq!(out.rows[2].get("q"), Some(&Value::Integer(3)));
}

#[test]
fn test_fill_zero_matches_column_type() {
    let dataset = DataSet::from_rows(vec![
        Row::from_pairs([("count", Value::Integer(4)), ("score", Value::Float(1.5))]),
        Row::from_pairs([("count", Value::Null), ("score", Value::Null)]),
    ]);

    let out = fill(FillStrategy::Zero, &dataset);

    assert_eq!(out.rows[1].get("count"), Some(&Value::Integer(0)));
    assert_eq!(out.rows[1].get("score"), Some(&Value::Float(0.0)));
}

#[test]
fn test_fill_skips_non_numeric_columns() {
    let out = fill(FillStrategy::Zero, &ages());

    // text column stays sparse and null
    assert_eq!(out.rows[2].get("name"), Some(&Value::Null));
    assert!(!out.rows[3].contains_key("name"));

    let all_null = DataSet::from_rows(vec![Row::from_pairs([("x", Value::Null)])]);
    assert_eq!(fill(FillStrategy::Mean, &all_null), all_null);
}

#[test]
fn test_fill_strategy_parsing() {
    assert_eq!(" Median ".parse::<FillStrategy>().unwrap(), FillStrategy::Median);
    assert!(matches!(
        "bogus".parse::<FillStrategy>(),
        Err(ProcessingError::InvalidArgument(_))
    ));

    let strategy: FillStrategy = serde_json::from_value(json!("mode")).unwrap();
    assert_eq!(strategy, FillStrategy::Mode);
    assert_eq!(serde_json::to_value(FillStrategy::Zero).unwrap(), json!("zero"));
    assert!(serde_json::from_value::<FillStrategy>(json!("average")).is_err());
}

fn left() -> DataSet {
    let mut data = DataSet::from_rows(vec![
        Row::from_pairs([("id", "1"), ("a", "x")]),
        Row::from_pairs([("id", "2"), ("a", "y")]),
    ]);
    data.metadata.add("name".to_string(), "wave1".to_string());
    data
}

fn right() -> DataSet {
    DataSet::from_rows(vec![
        Row::from_pairs([("id", "2"), ("b", "p")]),
        Row::from_pairs([("id", "3"), ("b", "q")]),
    ])
}

#[test]
fn test_merge_inner_and_left() {
    let inner = merge_datasets(&[left(), right()], MergeHow::Inner).unwrap();
    assert_eq!(inner.rows, vec![Row::from_pairs([("id", "2"), ("a", "y"), ("b", "p")])]);
    assert_eq!(inner.name(), "wave1");

    let kept = merge_datasets(&[left(), right()], MergeHow::Left).unwrap();
    assert_eq!(
        kept.rows,
        vec![
            Row::from_pairs([("id", "1"), ("a", "x")]),
            Row::from_pairs([("id", "2"), ("a", "y"), ("b", "p")]),
        ]
    );
}

#[test]
fn test_merge_right_and_outer() {
    let kept = merge_datasets(&[left(), right()], MergeHow::Right).unwrap();
    assert_eq!(
        kept.rows,
        vec![
            Row::from_pairs([("id", "2"), ("a", "y"), ("b", "p")]),
            Row::from_pairs([("id", "3"), ("b", "q")]),
        ]
    );

    let outer = merge_datasets(&[left(), right()], MergeHow::Outer).unwrap();
    assert_eq!(outer.len(), 3);
    assert_eq!(outer.columns_in_order(), vec!["id", "a", "b"]);
    assert_eq!(outer.rows[2], Row::from_pairs([("id", "3"), ("b", "q")]));
}

#[test]
fn test_merge_null_and_absent_keys_match() {
    let l = DataSet::from_rows(vec![Row::from_pairs([("id", Value::Null), ("a", Value::from("z"))])]);
    let r = DataSet::from_rows(vec![Row::from_pairs([("id", Value::from("NA")), ("b", Value::from("w"))])]);

    let out = merge_datasets(&[l, r], MergeHow::Inner).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out.rows[0].get("b"), Some(&Value::from("w")));
    assert_eq!(out.rows[0].get("id"), Some(&Value::Null));
}

#[test]
fn test_merge_errors() {
    assert!(matches!(
        merge_datasets(&[], MergeHow::Inner),
        Err(ProcessingError::InvalidArgument(_))
    ));

    let other = DataSet::from_rows(vec![Row::from_pairs([("zzz", "1")])]);
    assert!(matches!(
        merge_datasets(&[left(), other], MergeHow::Outer),
        Err(ProcessingError::InvalidArgument(_))
    ));

    assert_eq!(merge_datasets(&[left()], MergeHow::Inner).unwrap(), left());
    assert_eq!("OUTER".parse::<MergeHow>().unwrap(), MergeHow::Outer);
    assert!("cross".parse::<MergeHow>().is_err());
}

#[test]
fn test_summarize_columns() {
    let summary = summarize(&ages());

    assert_eq!(summary.rows, 5);
    let age = &summary.columns[0];
    assert_eq!((age.column.as_str(), age.count, age.missing, age.unique), ("age", 3, 2, 2));
    let numeric = age.numeric.as_ref().unwrap();
    assert_eq!((numeric.min, numeric.max, numeric.median), (19.0, 21.0, 21.0));

    let name = &summary.columns[1];
    assert_eq!((name.count, name.missing, name.unique), (3, 2, 3));
    assert!(name.numeric.is_none());
}

#[test]
fn test_summary_text_and_dataset_display() {
    let mut data = DataSet::from_rows(vec![
        Row::from_pairs([("age", Value::Integer(19)), ("name", Value::from("Ada"))]),
        Row::from_pairs([("age", Value::Integer(21)), ("name", Value::Null)]),
        Row::from_pairs([("age", Value::Null), ("name", Value::from("Ada"))]),
    ]);

    assert_eq!(
        summarize(&data).to_text(),
        "Data report\nRows: 3\nColumns: 2\n\n\
         age: count=2 missing=1 unique=2 min=19.0 max=21.0 mean=20.0 median=20.0\n\
         name: count=2 missing=1 unique=1"
    );

    assert_eq!(data.to_string(), "Dataset 'dataset' | 3 rows, 2 columns");
    data.metadata.add("name".to_string(), "survey".to_string());
    assert_eq!(data.to_string(), "Dataset 'survey' | 3 rows, 2 columns");
}
