// Validation report rendering
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;

use serde::Serialize;

use super::{Issue, RuleKind};

/// Text rendered when a dataset passes every rule
pub const ALL_CHECKS_PASSED: &str = "All checks passed ✅";

/// The issues found by one validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new(issues: Vec<Issue>) -> Self {
        ValidationReport { issues }
    }

    /// True when no rule was violated
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Number of issues per rule key
    pub fn issue_count_by_rule(&self) -> BTreeMap<RuleKind, usize> {
        let mut counts = BTreeMap::new();
        for issue in &self.issues {
            *counts.entry(issue.rule).or_insert(0) += 1;
        }
        counts
    }

    /// Render the issues as a Markdown table with one line per issue
    pub fn to_markdown(&self) -> String {
        if self.issues.is_empty() {
            return ALL_CHECKS_PASSED.to_string();
        }

        let mut lines = vec![
            "|Row|Column|Rule|Value|Message|".to_string(),
            "|--|--|--|--|--|".to_string(),
        ];
        for issue in &self.issues {
            lines.push(format!(
                "|{}|{}|{}|{}|{}|",
                issue.row_idx,
                escape_cell(&issue.column),
                issue.rule,
                escape_cell(&issue.value.to_string()),
                escape_cell(&issue.message)
            ));
        }
        lines.join("\n")
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
