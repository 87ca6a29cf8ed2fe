// Research Data Pipeline
// Author: Gabriel Demetrios Lafis

//! # Research Data Pipeline
//!
//! A small toolkit for cleaning and validating tabular survey exports.
//!
//! ## Features
//!
//! - Header normalization, column renaming and PII removal
//! - Type casting with a shared null convention (`""`, `na`, `n/a`, `null`)
//! - Declarative per-column rules: `required`, `not_null`, `type`, `min`/`max`,
//!   `len_min`/`len_max`, `allowed`, `regex`, `unique`
//! - Markdown issue reports, CSV/JSON I/O and a JSON state file
//!
//! ## Example
//!
//! ```rust
//! use research_data_pipeline::{
//!     data::{Row, Value},
//!     validation::{validate, ColumnRule, RuleKind, RuleSet},
//! };
//!
//! let rules = RuleSet::new().column(
//!     "age",
//!     ColumnRule::new().required().type_label("int").min(0.0).max(120.0),
//! );
//!
//! let rows = vec![
//!     Row::from_pairs([("age", "19")]),
//!     Row::from_pairs([("age", "200")]),
//!     Row::new(),
//! ];
//!
//! let issues = validate(&rows, &rules);
//! assert_eq!(issues.len(), 2);
//! assert_eq!((issues[0].row_idx, issues[0].rule), (1, RuleKind::Max));
//! assert_eq!(issues[0].value, Value::Integer(200));
//! assert_eq!((issues[1].row_idx, issues[1].rule), (2, RuleKind::Required));
//! ```

pub mod data;
pub mod processing;
pub mod storage;
pub mod utils;
pub mod validation;
pub mod workflow;

// Re-export main types
pub use data::{DataSet, Row, Value};
pub use processing::{cast_row, Pipeline, TypeLabel, TypeMap};
pub use utils::Config;
pub use validation::{validate, Issue, RuleSet, ValidationReport};
