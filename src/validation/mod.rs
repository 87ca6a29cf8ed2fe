// Validation module for rule-based dataset checks
// Author: Gabriel Demetrios Lafis

mod report;
mod rules;
mod validator;

pub use report::*;
pub use rules::*;
pub use validator::*;

use std::fmt;

use serde::Serialize;

use crate::data::Value;

/// The rule key an issue was raised for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Required,
    NotNull,
    Type,
    Min,
    Max,
    LenMin,
    LenMax,
    Allowed,
    Regex,
    Unique,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::NotNull => "not_null",
            RuleKind::Type => "type",
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::LenMin => "len_min",
            RuleKind::LenMax => "len_max",
            RuleKind::Allowed => "allowed",
            RuleKind::Regex => "regex",
            RuleKind::Unique => "unique",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rule violation.
///
/// `value` is the cell as supplied, before casting. The `min` and `max` rules
/// report the interpreted number instead; an absent column reports `Null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub row_idx: usize,
    pub column: String,
    pub rule: RuleKind,
    pub value: Value,
    pub message: String,
}

impl Issue {
    pub fn new<C: Into<String>, M: Into<String>>(
        row_idx: usize,
        column: C,
        rule: RuleKind,
        value: Value,
        message: M,
    ) -> Self {
        Issue {
            row_idx,
            column: column.into(),
            rule,
            value,
            message: message.into(),
        }
    }
}
