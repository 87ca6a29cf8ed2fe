// Data module for handling rows, values and file formats
// Author: Gabriel Demetrios Lafis

pub mod csv;
pub mod json;

pub use self::csv::*;
pub use self::json::*;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Display format used for date-time cells
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Represents a generic data source
pub trait DataSource {
    /// Read data from the source
    fn read(&self) -> Result<DataSet, DataError>;

    /// Get the source name
    fn name(&self) -> &str;
}

/// Represents a generic data sink
pub trait DataSink {
    /// Write data to the sink
    fn write(&self, data: &DataSet) -> Result<(), DataError>;

    /// Get the sink name
    fn name(&self) -> &str;
}

/// Represents a dataset: an ordered sequence of sparse rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    pub rows: Vec<Row>,
    pub metadata: Metadata,
}

impl DataSet {
    /// Create a new empty dataset
    pub fn new() -> Self {
        DataSet::default()
    }

    /// Create a dataset from already-built rows
    pub fn from_rows(rows: Vec<Row>) -> Self {
        DataSet {
            rows,
            metadata: Metadata::new(),
        }
    }

    /// Build a dataset from a JSON array of objects
    pub fn from_json(json: &JsonValue) -> Result<Self, DataError> {
        let array = json.as_array().ok_or_else(|| DataError::ShapeMismatch {
            expected: "an array of objects",
            found: json_kind(json).to_string(),
        })?;

        let rows = array
            .iter()
            .map(Row::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DataSet::from_rows(rows))
    }

    /// Convert the dataset to a JSON array of objects
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Array(self.rows.iter().map(Row::to_json).collect())
    }

    /// Add a row to the dataset
    pub fn add_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Get the number of rows in the dataset
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Display name: the `name` metadata property, else the source `path`
    pub fn name(&self) -> &str {
        self.metadata
            .get("name")
            .or_else(|| self.metadata.get("path"))
            .map_or("dataset", String::as_str)
    }

    /// Union of the column names of every row, sorted
    pub fn columns(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.rows.iter().flat_map(Row::keys).collect();
        names.into_iter().map(str::to_string).collect()
    }

    /// Union of the column names of every row, in first-seen order
    pub fn columns_in_order(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();

        for key in self.rows.iter().flat_map(Row::keys) {
            if seen.insert(key) {
                columns.push(key.to_string());
            }
        }

        columns
    }

    /// Check whether any row carries the given column
    pub fn has_column(&self, column: &str) -> bool {
        self.rows.iter().any(|row| row.contains_key(column))
    }

    /// Apply a function to every row, producing a new dataset with the same metadata
    pub fn map_rows<F>(&self, f: F) -> DataSet
    where
        F: FnMut(&Row) -> Row,
    {
        DataSet {
            rows: self.rows.iter().map(f).collect(),
            metadata: self.metadata.clone(),
        }
    }
}

impl fmt::Display for DataSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Dataset '{}' | {} rows, {} columns",
            self.name(),
            self.len(),
            self.columns().len()
        )
    }
}

/// A single record: an ordered, sparse mapping from column name to value.
///
/// Keys keep their insertion order. Inserting an existing key replaces the
/// value in place, so column order survives casting and renaming.
#[derive(Debug, Clone, Default)]
pub struct Row {
    cells: IndexMap<String, Value>,
}

impl Row {
    /// Create a new empty row
    pub fn new() -> Self {
        Row::default()
    }

    /// Create a row from `(column, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Row {
            cells: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Build a row from a JSON object
    pub fn from_json(json: &JsonValue) -> Result<Self, DataError> {
        let obj = json.as_object().ok_or_else(|| DataError::ShapeMismatch {
            expected: "an object",
            found: json_kind(json).to_string(),
        })?;

        Ok(obj
            .iter()
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect())
    }

    /// Convert the row to a JSON object
    pub fn to_json(&self) -> JsonValue {
        let mut obj = Map::new();
        for (key, value) in &self.cells {
            obj.insert(key.clone(), value.to_json());
        }
        JsonValue::Object(obj)
    }

    /// Get a reference to a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// Get a mutable reference to a value by column name
    pub fn get_mut(&mut self, column: &str) -> Option<&mut Value> {
        self.cells.get_mut(column)
    }

    /// Check whether the row carries a column
    pub fn contains_key(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Insert a value, returning the previous one if the column existed
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, column: K, value: V) -> Option<Value> {
        self.cells.insert(column.into(), value.into())
    }

    /// Remove a column, returning its value; later columns keep their order
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.cells.shift_remove(column)
    }

    /// Number of columns in the row
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no columns
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Column names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    /// `(column, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Mutable access to every value, in column order
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.cells.values_mut()
    }
}

// Column order is part of a row's identity
impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.cells.len() == other.cells.len() && self.cells.iter().eq(other.cells.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Row::from_pairs(iter)
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Represents a value in a row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Convert a JSON value to a cell value.
    ///
    /// Arrays and objects have no cell representation and are kept as their
    /// JSON text.
    pub fn from_json(json: &JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => n.as_f64().map_or(Value::Null, Value::Float),
            },
            JsonValue::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }
    }

    /// Convert a cell value to a JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Integer(i) => JsonValue::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map_or(JsonValue::Null, JsonValue::Number),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::DateTime(dt) => {
                JsonValue::String(dt.format(DATETIME_DISPLAY_FORMAT).to_string())
            }
        }
    }

    /// Short name of the variant, as used in type labels and messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "str",
            Value::DateTime(_) => "datetime",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of integers and floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Text used when writing the value to a CSV cell
    pub fn to_csv_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Boolean(true) => write!(f, "True"),
            Value::Boolean(false) => write!(f, "False"),
            Value::Integer(i) => write!(f, "{}", i),
            // Whole floats keep a trailing ".0" so they read back as floats
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_DISPLAY_FORMAT)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

/// Represents metadata for a dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub properties: HashMap<String, String>,
}

impl Metadata {
    /// Create new empty metadata
    pub fn new() -> Self {
        Metadata::default()
    }

    /// Add a property to the metadata
    pub fn add(&mut self, key: String, value: String) {
        self.properties.insert(key, value);
    }

    /// Get a property from the metadata
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }
}

/// Name of a JSON value's kind, for shape errors
pub(crate) fn json_kind(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Represents an error in the data module
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Expected {expected}, found {found}")]
    ShapeMismatch { expected: &'static str, found: String },
}
