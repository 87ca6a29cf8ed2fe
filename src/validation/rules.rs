// Declarative per-column validation rules
// Author: Gabriel Demetrios Lafis

use indexmap::IndexMap;
use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

use crate::data::{json_kind, Value};
use crate::processing::{TypeLabel, TypeMap};

/// Represents an error in a rule definition
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Rules must be {expected}, found {found}")]
    NotAMapping { expected: &'static str, found: String },
    #[error("Rule '{key}' on column '{column}' must be {expected}, found {found}")]
    InvalidValue {
        column: String,
        key: String,
        expected: &'static str,
        found: String,
    },
    #[error("Rule 'regex' on column '{column}' is not a valid pattern: {source}")]
    InvalidPattern {
        column: String,
        #[source]
        source: regex::Error,
    },
}

/// A pattern that must match the whole text of a cell
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    anchored: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{})$", source))?;
        Ok(Pattern {
            source: source.to_string(),
            anchored,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn full_match(&self, text: &str) -> bool {
        self.anchored.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Constraints on one column. Every field is optional; unset fields are not checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnRule {
    pub required: bool,
    pub not_null: bool,
    pub type_label: Option<TypeLabel>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub len_min: Option<usize>,
    pub len_max: Option<usize>,
    pub allowed: Option<Vec<Value>>,
    pub regex: Option<Pattern>,
    pub unique: bool,
}

impl ColumnRule {
    pub fn new() -> Self {
        ColumnRule::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn type_label<L: Into<TypeLabel>>(mut self, label: L) -> Self {
        self.type_label = Some(label.into());
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn len_min(mut self, len_min: usize) -> Self {
        self.len_min = Some(len_min);
        self
    }

    pub fn len_max(mut self, len_max: usize) -> Self {
        self.len_max = Some(len_max);
        self
    }

    pub fn allowed<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn regex(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.regex = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Parse one column's rule object
    pub fn from_json(column: &str, json: &JsonValue) -> Result<Self, RuleError> {
        let obj = json.as_object().ok_or_else(|| RuleError::InvalidValue {
            column: column.to_string(),
            key: "<rule>".to_string(),
            expected: "an object",
            found: json_kind(json).to_string(),
        })?;

        let invalid = |key: &str, expected: &'static str, value: &JsonValue| RuleError::InvalidValue {
            column: column.to_string(),
            key: key.to_string(),
            expected,
            found: json_kind(value).to_string(),
        };

        let mut rule = ColumnRule::new();

        for (key, value) in obj {
            let key = key.as_str();
            match key {
                "required" => {
                    rule.required = value.as_bool().ok_or_else(|| invalid(key, "a boolean", value))?
                }
                "not_null" => {
                    rule.not_null = value.as_bool().ok_or_else(|| invalid(key, "a boolean", value))?
                }
                "unique" => {
                    rule.unique = value.as_bool().ok_or_else(|| invalid(key, "a boolean", value))?
                }
                "type" => {
                    let label = value.as_str().ok_or_else(|| invalid(key, "a type label", value))?;
                    let label = TypeLabel::from(label);
                    if !label.is_supported() {
                        warn!("Column '{}' uses unsupported type label '{}'", column, label);
                    }
                    rule.type_label = Some(label);
                }
                "min" => rule.min = Some(value.as_f64().ok_or_else(|| invalid(key, "a number", value))?),
                "max" => rule.max = Some(value.as_f64().ok_or_else(|| invalid(key, "a number", value))?),
                "len_min" => {
                    rule.len_min = Some(length(value).ok_or_else(|| invalid(key, "a non-negative integer", value))?)
                }
                "len_max" => {
                    rule.len_max = Some(length(value).ok_or_else(|| invalid(key, "a non-negative integer", value))?)
                }
                "allowed" => {
                    let values = value.as_array().ok_or_else(|| invalid(key, "a list", value))?;
                    rule.allowed = Some(values.iter().map(Value::from_json).collect());
                }
                "regex" => {
                    let source = value.as_str().ok_or_else(|| invalid(key, "a string", value))?;
                    let pattern = Pattern::new(source).map_err(|source| RuleError::InvalidPattern {
                        column: column.to_string(),
                        source,
                    })?;
                    rule.regex = Some(pattern);
                }
                other => warn!("Ignoring unknown rule '{}' on column '{}'", other, column),
            }
        }

        Ok(rule)
    }

    /// Convert the rule back to its JSON object form
    pub fn to_json(&self) -> JsonValue {
        let mut obj = Map::new();

        if self.required {
            obj.insert("required".to_string(), JsonValue::Bool(true));
        }
        if self.not_null {
            obj.insert("not_null".to_string(), JsonValue::Bool(true));
        }
        if let Some(label) = &self.type_label {
            obj.insert("type".to_string(), JsonValue::String(label.to_string()));
        }
        if let Some(min) = self.min {
            obj.insert("min".to_string(), bound_to_json(min));
        }
        if let Some(max) = self.max {
            obj.insert("max".to_string(), bound_to_json(max));
        }
        if let Some(len_min) = self.len_min {
            obj.insert("len_min".to_string(), JsonValue::from(len_min));
        }
        if let Some(len_max) = self.len_max {
            obj.insert("len_max".to_string(), JsonValue::from(len_max));
        }
        if let Some(allowed) = &self.allowed {
            obj.insert(
                "allowed".to_string(),
                JsonValue::Array(allowed.iter().map(Value::to_json).collect()),
            );
        }
        if let Some(pattern) = &self.regex {
            obj.insert("regex".to_string(), JsonValue::String(pattern.as_str().to_string()));
        }
        if self.unique {
            obj.insert("unique".to_string(), JsonValue::Bool(true));
        }

        JsonValue::Object(obj)
    }
}

fn length(value: &JsonValue) -> Option<usize> {
    value.as_u64().and_then(|n| usize::try_from(n).ok())
}

fn bound_to_json(bound: f64) -> JsonValue {
    if bound.fract() == 0.0 && bound.abs() < 1e15 {
        JsonValue::from(bound as i64)
    } else {
        JsonValue::from(bound)
    }
}

/// Column rules in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub struct RuleSet {
    columns: IndexMap<String, ColumnRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet::default()
    }

    /// Add or replace the rule of a column
    pub fn column<S: Into<String>>(mut self, column: S, rule: ColumnRule) -> Self {
        self.insert(column, rule);
        self
    }

    pub fn insert<S: Into<String>>(&mut self, column: S, rule: ColumnRule) {
        self.columns.insert(column.into(), rule);
    }

    /// Parse a rules document: an object mapping column names to rule objects
    pub fn from_json(json: &JsonValue) -> Result<Self, RuleError> {
        let obj = json.as_object().ok_or_else(|| RuleError::NotAMapping {
            expected: "an object of column rules",
            found: json_kind(json).to_string(),
        })?;

        let mut rules = RuleSet::new();
        for (column, rule_json) in obj {
            rules.insert(column.clone(), ColumnRule::from_json(column, rule_json)?);
        }
        Ok(rules)
    }

    pub fn to_json(&self) -> JsonValue {
        let mut obj = Map::new();
        for (column, rule) in &self.columns {
            obj.insert(column.clone(), rule.to_json());
        }
        JsonValue::Object(obj)
    }

    pub fn get(&self, column: &str) -> Option<&ColumnRule> {
        self.columns.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnRule)> {
        self.columns.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Type labels of every column that declares a `type` rule
    pub fn type_map(&self) -> TypeMap {
        self.iter()
            .filter_map(|(column, rule)| {
                rule.type_label
                    .as_ref()
                    .map(|label| (column.to_string(), label.clone()))
            })
            .collect()
    }
}

impl TryFrom<JsonValue> for RuleSet {
    type Error = RuleError;

    fn try_from(json: JsonValue) -> Result<Self, Self::Error> {
        RuleSet::from_json(&json)
    }
}

impl From<RuleSet> for JsonValue {
    fn from(rules: RuleSet) -> Self {
        rules.to_json()
    }
}
