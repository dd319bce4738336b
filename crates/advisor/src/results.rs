// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Diagnostic report
//!
//! Diagnostics accumulate across every check run on one statement; nothing is
//! ever removed. The report's level is the most severe entry.
//!
//! ```text
//! [error]表 exist_db.exist_tb_1 已存在
//! [notice]表建议添加注释
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic, ordered `normal < notice < warn < error`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    #[default]
    Normal,
    Notice,
    Warn,
    Error,
}

impl RuleLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleLevel::Normal => "normal",
            RuleLevel::Notice => "notice",
            RuleLevel::Warn => "warn",
            RuleLevel::Error => "error",
        }
    }
}

impl fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `(level, message)` diagnostics of one statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectResults {
    entries: Vec<(RuleLevel, String)>,
}

impl InspectResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, level: RuleLevel, message: impl Into<String>) {
        self.entries.push((level, message.into()));
    }

    /// Append every entry of `other`
    pub fn extend(&mut self, other: InspectResults) {
        self.entries.extend(other.entries);
    }

    /// Highest level seen; `normal` when empty
    pub fn level(&self) -> RuleLevel {
        self.entries
            .iter()
            .map(|(level, _)| *level)
            .max()
            .unwrap_or_default()
    }

    /// All messages in order, each tagged with its level
    pub fn message(&self) -> String {
        self.entries
            .iter()
            .map(|(level, message)| format!("[{}]{}", level, message))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn entries(&self) -> &[(RuleLevel, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
