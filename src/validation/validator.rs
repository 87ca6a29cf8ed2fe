// Dataset validator
// Author: Gabriel Demetrios Lafis

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use log::info;

use crate::data::{DataSet, Row, Value};
use crate::processing::{cast_row, is_null};
use super::{ColumnRule, Issue, RuleKind, RuleSet, ValidationReport};

/// Validate every row against a rule set.
///
/// Columns with a `type` rule are cast first; the other checks look at the
/// interpreted values, while issues carry the raw ones. Every applicable rule
/// is checked independently, so one cell can produce several issues. Issues
/// come back in row order, followed by the uniqueness violations of each
/// `unique` column.
///
/// Within a row, columns follow rule declaration order. Within a cell the
/// checks always run as `required`, `not_null`, `type`, `min`, `max`,
/// `len_min`, `len_max`, `allowed`, `regex`, whatever order the rule object
/// lists its keys in. `min` and `max` report the interpreted number.
///
/// Row content never makes validation fail.
pub fn validate(rows: &[Row], rules: &RuleSet) -> Vec<Issue> {
    let type_map = rules.type_map();
    let interpreted: Vec<Row> = rows.iter().map(|row| cast_row(row, &type_map)).collect();

    let mut issues = Vec::new();

    for (row_idx, (raw, typed)) in rows.iter().zip(&interpreted).enumerate() {
        for (column, rule) in rules.iter() {
            check_cell(
                &mut issues,
                row_idx,
                column,
                rule,
                raw.get(column),
                typed.get(column),
            );
        }
    }

    for (column, rule) in rules.iter() {
        if rule.unique {
            check_unique(&mut issues, column, rows, &interpreted);
        }
    }

    issues
}

fn check_cell(
    issues: &mut Vec<Issue>,
    row_idx: usize,
    column: &str,
    rule: &ColumnRule,
    raw: Option<&Value>,
    typed: Option<&Value>,
) {
    let raw_value = || raw.cloned().unwrap_or(Value::Null);
    let raw_is_null = raw.map_or(true, is_null);

    if rule.required && raw_is_null {
        let message = if raw.is_some() {
            "required value is missing"
        } else {
            "required column is missing"
        };
        issues.push(Issue::new(row_idx, column, RuleKind::Required, raw_value(), message));
    }

    if rule.not_null && raw.is_some() && raw_is_null {
        issues.push(Issue::new(row_idx, column, RuleKind::NotNull, raw_value(), "value is null"));
    }

    let Some(typed) = typed else {
        return;
    };

    if let Some(label) = &rule.type_label {
        if !typed.is_null() && !label.accepts(typed) {
            issues.push(Issue::new(
                row_idx,
                column,
                RuleKind::Type,
                raw_value(),
                format!("expected {}, got {}", label, typed.type_name()),
            ));
        }
    }

    if let Some(number) = typed.as_f64() {
        if let Some(min) = rule.min {
            if number < min {
                issues.push(Issue::new(
                    row_idx,
                    column,
                    RuleKind::Min,
                    typed.clone(),
                    format!("{} < min {}", typed, min),
                ));
            }
        }
        if let Some(max) = rule.max {
            if number > max {
                issues.push(Issue::new(
                    row_idx,
                    column,
                    RuleKind::Max,
                    typed.clone(),
                    format!("{} > max {}", typed, max),
                ));
            }
        }
    }

    if let Value::String(text) = typed {
        let length = text.chars().count();
        if let Some(len_min) = rule.len_min {
            if length < len_min {
                issues.push(Issue::new(
                    row_idx,
                    column,
                    RuleKind::LenMin,
                    raw_value(),
                    format!("length {} < len_min {}", length, len_min),
                ));
            }
        }
        if let Some(len_max) = rule.len_max {
            if length > len_max {
                issues.push(Issue::new(
                    row_idx,
                    column,
                    RuleKind::LenMax,
                    raw_value(),
                    format!("length {} > len_max {}", length, len_max),
                ));
            }
        }
    }

    if let Some(allowed) = &rule.allowed {
        if !typed.is_null() && !allowed.iter().any(|candidate| values_equal(typed, candidate)) {
            let choices: Vec<String> = allowed.iter().map(Value::to_string).collect();
            issues.push(Issue::new(
                row_idx,
                column,
                RuleKind::Allowed,
                raw_value(),
                format!("{} not in allowed values [{}]", typed, choices.join(", ")),
            ));
        }
    }

    if let (Some(pattern), Value::String(text)) = (&rule.regex, typed) {
        if !pattern.full_match(text) {
            issues.push(Issue::new(
                row_idx,
                column,
                RuleKind::Regex,
                raw_value(),
                format!("does not match pattern {}", pattern.as_str()),
            ));
        }
    }
}

/// Equality after casting; integers and floats compare by numeric value
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => {
            a.as_f64() == b.as_f64()
        }
        _ => a == b,
    }
}

/// Hashable identity of an interpreted value for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum UniqueKey {
    Boolean(bool),
    Integer(i64),
    Float(u64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl UniqueKey {
    fn of(value: &Value) -> Option<UniqueKey> {
        match value {
            Value::Null => None,
            Value::Boolean(b) => Some(UniqueKey::Boolean(*b)),
            Value::Integer(i) => Some(UniqueKey::Integer(*i)),
            // Whole floats share a key with the equal integer
            Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => {
                Some(UniqueKey::Integer(*f as i64))
            }
            Value::Float(f) => Some(UniqueKey::Float(f.to_bits())),
            Value::String(s) => Some(UniqueKey::Text(s.clone())),
            Value::DateTime(dt) => Some(UniqueKey::DateTime(*dt)),
        }
    }
}

/// Report every row holding a value that occurs more than once in the column
fn check_unique(issues: &mut Vec<Issue>, column: &str, rows: &[Row], interpreted: &[Row]) {
    let mut first_seen: HashMap<UniqueKey, usize> = HashMap::new();
    // violating row -> row where its value first appeared
    let mut violators: BTreeMap<usize, usize> = BTreeMap::new();

    for (row_idx, row) in interpreted.iter().enumerate() {
        let Some(value) = row.get(column) else {
            continue;
        };
        if is_null(value) {
            continue;
        }
        let Some(key) = UniqueKey::of(value) else {
            continue;
        };

        match first_seen.get(&key) {
            Some(&first) => {
                violators.insert(first, first);
                violators.insert(row_idx, first);
            }
            None => {
                first_seen.insert(key, row_idx);
            }
        }
    }

    for (row_idx, first) in violators {
        let raw = rows
            .get(row_idx)
            .and_then(|row| row.get(column))
            .cloned()
            .unwrap_or(Value::Null);
        let shown = interpreted
            .get(row_idx)
            .and_then(|row| row.get(column))
            .map(Value::to_string)
            .unwrap_or_default();
        let message = if row_idx == first {
            format!("duplicate value '{}'", shown)
        } else {
            format!("duplicate value '{}' (first seen in row {})", shown, first)
        };
        issues.push(Issue::new(row_idx, column, RuleKind::Unique, raw, message));
    }
}

/// Runs [`validate`] over a dataset and wraps the result in a report
#[derive(Debug, Default)]
pub struct RulesValidator;

impl RulesValidator {
    pub fn new() -> Self {
        RulesValidator
    }

    pub fn check(&self, dataset: &DataSet, rules: &RuleSet) -> ValidationReport {
        let report = ValidationReport::new(validate(&dataset.rows, rules));

        if report.is_valid() {
            info!(
                "Validated {} rows against {} column rules: all checks passed",
                dataset.len(),
                rules.len()
            );
        } else {
            let summary: Vec<String> = report
                .issue_count_by_rule()
                .into_iter()
                .map(|(rule, count)| format!("{}={}", rule, count))
                .collect();
            info!(
                "Validated {} rows against {} column rules: {} issues ({})",
                dataset.len(),
                rules.len(),
                report.len(),
                summary.join(", ")
            );
        }

        report
    }
}
