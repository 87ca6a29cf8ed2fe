// Survey cleaning and validation example
// Author: Gabriel Demetrios Lafis

use research_data_pipeline::{
    data::{DataSet, Row, Value},
    processing::{
        HeaderNormalizer, PiiRemover, Pipeline, RenameMap, RenameTransform, TypeCaster, TypeLabel,
        TypeMap,
    },
    validation::{ColumnRule, RuleSet, RulesValidator},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Raw responses as they come out of the survey tool
    let dataset = DataSet::from_rows(vec![
        Row::from_pairs([
            ("Respondent", "R001"),
            ("Q1 - Age", "19"),
            ("Q2 - Consent?", "Yes"),
            ("Email Address", "ada@umd.edu"),
            ("Q3 - Overall Satisfaction (1-5)", "4"),
        ]),
        Row::from_pairs([
            ("Respondent", "R002"),
            ("Q1 - Age", "200"),
            ("Q2 - Consent?", "no"),
            ("Email Address", "bob@umd.edu"),
            ("Q3 - Overall Satisfaction (1-5)", "7"),
        ]),
        Row::from_pairs([
            ("Respondent", "R002"),
            ("Q1 - Age", "n/a"),
            ("Q2 - Consent?", ""),
            ("Email Address", "cy@umd.edu"),
            ("Q3 - Overall Satisfaction (1-5)", "3"),
        ]),
    ]);

    println!("Original dataset:");
    print_dataset(&dataset);

    let mut rename = RenameMap::new();
    rename.insert("q1_age".to_string(), "age".to_string());
    rename.insert("q2_consent".to_string(), "consent".to_string());
    rename.insert("q3_overall_satisfaction_1_5".to_string(), "satisfaction".to_string());

    let mut type_map = TypeMap::new();
    type_map.insert("age".to_string(), TypeLabel::Int);
    type_map.insert("consent".to_string(), TypeLabel::Bool);
    type_map.insert("satisfaction".to_string(), TypeLabel::Int);

    let mut pipeline = Pipeline::new("survey")
        .add(HeaderNormalizer::new())
        .add(RenameTransform::new(rename))
        .add(PiiRemover::new(["email_address"]))
        .add(TypeCaster::new(type_map));

    let cleaned = pipeline.run(&dataset)?;

    println!("\nCleaned dataset:");
    print_dataset(&cleaned);

    let rules = RuleSet::new()
        .column("respondent", ColumnRule::new().required().unique())
        .column(
            "age",
            ColumnRule::new()
                .required()
                .not_null()
                .type_label("int")
                .min(18.0)
                .max(99.0),
        )
        .column("consent", ColumnRule::new().not_null())
        .column("satisfaction", ColumnRule::new().allowed([1i64, 2, 3, 4, 5]));

    let report = RulesValidator::new().check(&cleaned, &rules);

    println!("\nValidation report:");
    println!("{}", report.to_markdown());

    println!("\nHistory:");
    for line in pipeline.history() {
        println!("  {}", line);
    }

    Ok(())
}

// Helper function to print a dataset
fn print_dataset(dataset: &DataSet) {
    let columns = dataset.columns_in_order();
    println!("{}", columns.join(" | "));
    println!("{}", vec!["----"; columns.len()].join("-+-"));

    for row in &dataset.rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|column| match row.get(column) {
                None | Some(Value::Null) => "NULL".to_string(),
                Some(value) => value.to_string(),
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
}
