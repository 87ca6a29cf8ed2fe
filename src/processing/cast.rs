// Type casting of raw cell values
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;
use std::fmt;

use chrono::format::{parse, ParseResult, Parsed, StrftimeItems};
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{Row, Value};

/// Text tokens that count as a missing value once trimmed and lower-cased.
///
/// Shared by the caster and the validator; both must agree on what is null.
pub const NULL_TOKENS: [&str; 4] = ["", "na", "n/a", "null"];

/// Tokens accepted as `true` by the `bool` label
pub const TRUE_TOKENS: [&str; 4] = ["true", "yes", "y", "1"];

/// Tokens accepted as `false` by the `bool` label
pub const FALSE_TOKENS: [&str; 4] = ["false", "no", "n", "0"];

/// Prefix of date-time labels, followed by a strftime-style format
pub const DATETIME_PREFIX: &str = "datetime:";

/// Check a value against the null convention
pub fn is_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let folded = s.trim().to_lowercase();
            NULL_TOKENS.contains(&folded.as_str())
        }
        _ => false,
    }
}

/// Column name to type label
pub type TypeMap = BTreeMap<String, TypeLabel>;

/// Target type of a column: `int`, `float`, `bool`, `str` or `datetime:<format>`.
///
/// Any other text is kept as `Unsupported`; casting to it always fails, which
/// leaves the cell untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeLabel {
    Int,
    Float,
    Bool,
    Str,
    DateTime(String),
    Unsupported(String),
}

impl TypeLabel {
    /// Check whether an interpreted value has this label's runtime type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeLabel::Int, Value::Integer(_)) => true,
            (TypeLabel::Float, Value::Integer(_) | Value::Float(_)) => true,
            (TypeLabel::Bool, Value::Boolean(_)) => true,
            (TypeLabel::Str, Value::String(_) | Value::Null) => true,
            (TypeLabel::DateTime(_), Value::DateTime(_)) => true,
            _ => false,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, TypeLabel::Unsupported(_))
    }
}

impl From<&str> for TypeLabel {
    fn from(label: &str) -> Self {
        match label {
            "int" => TypeLabel::Int,
            "float" => TypeLabel::Float,
            "bool" => TypeLabel::Bool,
            "str" => TypeLabel::Str,
            other => match other.strip_prefix(DATETIME_PREFIX) {
                Some(format) => TypeLabel::DateTime(format.to_string()),
                None => TypeLabel::Unsupported(other.to_string()),
            },
        }
    }
}

impl From<String> for TypeLabel {
    fn from(label: String) -> Self {
        TypeLabel::from(label.as_str())
    }
}

impl From<TypeLabel> for String {
    fn from(label: TypeLabel) -> Self {
        label.to_string()
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeLabel::Int => write!(f, "int"),
            TypeLabel::Float => write!(f, "float"),
            TypeLabel::Bool => write!(f, "bool"),
            TypeLabel::Str => write!(f, "str"),
            TypeLabel::DateTime(format) => write!(f, "{}{}", DATETIME_PREFIX, format),
            TypeLabel::Unsupported(label) => write!(f, "{}", label),
        }
    }
}

/// Why a single cell could not be cast
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CastError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{0} does not fit in an integer")]
    OutOfRange(f64),
    #[error("'{0}' is not a boolean")]
    NotABool(String),
    #[error("'{value}' does not match date-time format '{format}'")]
    DateTime { value: String, format: String },
    #[error("cannot convert {from} to {to}")]
    Incompatible { from: &'static str, to: String },
    #[error("unsupported type label: {0}")]
    Unsupported(String),
}

/// Cast one non-null value to a label
pub fn cast_value(value: &Value, label: &TypeLabel) -> Result<Value, CastError> {
    match label {
        TypeLabel::Str => Ok(match value {
            Value::Null => Value::Null,
            Value::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }),
        TypeLabel::Int => to_float(value, label).and_then(|f| {
            if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
                Ok(Value::Integer(f.trunc() as i64))
            } else {
                Err(CastError::OutOfRange(f))
            }
        }),
        TypeLabel::Float => to_float(value, label).map(Value::Float),
        TypeLabel::Bool => to_bool(value).map(Value::Boolean),
        TypeLabel::DateTime(format) => match value {
            Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
            Value::String(s) => parse_datetime(s, format).map(Value::DateTime),
            other => parse_datetime(&other.to_string(), format).map(Value::DateTime),
        },
        TypeLabel::Unsupported(name) => Err(CastError::Unsupported(name.clone())),
    }
}

fn to_float(value: &Value, label: &TypeLabel) -> Result<f64, CastError> {
    match value {
        Value::Integer(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| CastError::NotANumber(s.clone())),
        other => Err(CastError::Incompatible {
            from: other.type_name(),
            to: label.to_string(),
        }),
    }
}

fn to_bool(value: &Value) -> Result<bool, CastError> {
    if let Value::Boolean(b) = value {
        return Ok(*b);
    }

    let text = value.to_string();
    let folded = text.trim().to_lowercase();
    if TRUE_TOKENS.contains(&folded.as_str()) {
        Ok(true)
    } else if FALSE_TOKENS.contains(&folded.as_str()) {
        Ok(false)
    } else {
        Err(CastError::NotABool(text))
    }
}

/// Parse text with a strftime-style format.
///
/// Fields the format leaves out take strptime defaults: year 1900, January,
/// day 1, midnight. So `%Y-%m` reads `"2024-10"` as 2024-10-01 00:00:00 and a
/// time-only format lands on 1900-01-01.
pub fn parse_datetime(text: &str, format: &str) -> Result<NaiveDateTime, CastError> {
    let fail = || CastError::DateTime {
        value: text.to_string(),
        format: format.to_string(),
    };

    let mut parsed = Parsed::new();
    parse(&mut parsed, text, StrftimeItems::new(format)).map_err(|_| fail())?;
    fill_strptime_defaults(&mut parsed).map_err(|_| fail())?;

    let date = parsed.to_naive_date().map_err(|_| fail())?;
    let time = parsed.to_naive_time().map_err(|_| fail())?;
    Ok(date.and_time(time))
}

fn fill_strptime_defaults(parsed: &mut Parsed) -> ParseResult<()> {
    let has_year = parsed.year().is_some()
        || parsed.year_div_100().is_some()
        || parsed.year_mod_100().is_some()
        || parsed.isoyear().is_some()
        || parsed.isoyear_div_100().is_some()
        || parsed.isoyear_mod_100().is_some();
    if !has_year {
        parsed.set_year(1900)?;
    }

    // %j and the week directives pin the day on their own
    let has_day_of_year = parsed.ordinal().is_some()
        || parsed.isoweek().is_some()
        || parsed.week_from_sun().is_some()
        || parsed.week_from_mon().is_some();
    if !has_day_of_year {
        if parsed.month().is_none() {
            parsed.set_month(1)?;
        }
        if parsed.day().is_none() {
            parsed.set_day(1)?;
        }
    }

    match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (None, None) => parsed.set_hour(0)?,
        // %I without %p reads as AM
        (None, Some(_)) => parsed.set_ampm(false)?,
        _ => {}
    }
    if parsed.minute().is_none() {
        parsed.set_minute(0)?;
    }

    Ok(())
}

/// Cast the mapped columns of a row, returning a new row.
///
/// Null-convention values become `Value::Null` under every label. A cell that
/// fails to cast keeps its original value; the `type` validation rule is what
/// reports it. Columns missing from the row are skipped, so the output has the
/// same keys, in the same order, as the input.
pub fn cast_row(row: &Row, type_map: &TypeMap) -> Row {
    let mut out = row.clone();

    for (column, label) in type_map {
        let Some(slot) = out.get_mut(column) else {
            continue;
        };

        if is_null(slot) {
            *slot = Value::Null;
            continue;
        }

        match cast_value(slot, label) {
            Ok(value) => *slot = value,
            Err(err) => debug!("Keeping raw value of '{}': {}", column, err),
        }
    }

    out
}
