// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Task and statement records
//!
//! A [`Task`] is one reviewed batch: its forward statements
//! ([`CommitSql`]) and the rollback statements generated for them
//! ([`RollbackSql`]). Each record carries its own execution bookkeeping.
//!
//! ```text
//! Task
//!   ├── commit_sqls:   #1 .. #N   (inspect level/result, exec status)
//!   └── rollback_sqls: #1 .. #M   (#1 undoes the last applied statement)
//! ```

use crate::error::ActionError;
use crate::results::{InspectResults, RuleLevel};
use serde::{Deserialize, Serialize};
use sqlreview_catalog::BinlogPosition;
use sqlreview_ir::{Statement, StatementKind};
use sqlreview_lowering::{parse_sql, split_statements};

/// Execution state of one statement record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecStatus {
    #[default]
    Init,
    Doing,
    Done,
    Error,
}

/// Review state of one forward statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InspectStatus {
    #[default]
    Init,
    Done,
}

/// Actions whose legality depends on task state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Inspect,
    Commit,
    Rollback,
}

/// One statement text with its parsed nodes and execution bookkeeping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sql {
    /// 1-based position in its list
    pub number: usize,
    pub content: String,
    pub statements: Vec<Statement>,
    pub parse_error: Option<String>,
    pub exec_status: ExecStatus,
    pub exec_result: String,
    pub rows_affected: u64,
    pub start_binlog: Option<BinlogPosition>,
    pub end_binlog: Option<BinlogPosition>,
}

impl Sql {
    /// Parse `content`; a parse failure is kept on the record, not returned
    pub fn new(number: usize, content: impl Into<String>) -> Self {
        let content = content.into();
        let (statements, parse_error) = match parse_sql(&content) {
            Ok(statements) => (statements, None),
            Err(e) => (Vec::new(), Some(e.to_string())),
        };
        Self {
            number,
            content,
            statements,
            parse_error,
            ..Default::default()
        }
    }

    /// A record whose nodes are already known
    pub fn from_statements(number: usize, statements: Vec<Statement>) -> Self {
        let content = statements
            .iter()
            .map(|s| format!("{};", s))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            number,
            content,
            statements,
            ..Default::default()
        }
    }

    /// Statement texts to send to the database, one per `;`-terminated piece
    pub fn exec_texts(&self) -> Vec<String> {
        split_statements(&self.content)
    }

    pub fn is_dml(&self) -> bool {
        !self.statements.is_empty() && self.statements.iter().all(Statement::is_dml)
    }

    pub fn is_ddl(&self) -> bool {
        self.statements
            .iter()
            .any(|s| s.is_ddl() || s.kind() == StatementKind::Other)
    }
}

/// A forward statement and its review outcome
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitSql {
    #[serde(flatten)]
    pub sql: Sql,
    pub inspect_status: InspectStatus,
    pub inspect_level: RuleLevel,
    pub inspect_result: String,
}

impl CommitSql {
    pub fn new(number: usize, content: impl Into<String>) -> Self {
        Self {
            sql: Sql::new(number, content),
            ..Default::default()
        }
    }

    /// Record a finished review
    pub fn set_inspect(&mut self, results: &InspectResults) {
        self.inspect_status = InspectStatus::Done;
        self.inspect_level = results.level();
        self.inspect_result = results.message();
    }
}

/// A statement that reverses one forward statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollbackSql {
    #[serde(flatten)]
    pub sql: Sql,
    /// Number of the forward statement this one undoes
    pub commit_number: usize,
}

/// One reviewed batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    /// Schema the batch runs in when statements are unqualified
    pub instance_schema: String,
    pub commit_sqls: Vec<CommitSql>,
    pub rollback_sqls: Vec<RollbackSql>,
}

impl Task {
    pub fn new(id: impl Into<String>, instance_schema: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            instance_schema: instance_schema.into(),
            ..Default::default()
        }
    }

    /// Split a batch on top-level `;` and number the pieces from 1
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let task = Task::from_batch("1", "exist_db", "use exist_db; select 1 from t1;");
    /// assert_eq!(task.commit_sqls.len(), 2);
    /// ```
    pub fn from_batch(
        id: impl Into<String>,
        instance_schema: impl Into<String>,
        batch: &str,
    ) -> Self {
        let mut task = Self::new(id, instance_schema);
        task.commit_sqls = split_statements(batch)
            .into_iter()
            .enumerate()
            .map(|(i, text)| CommitSql::new(i + 1, text))
            .collect();
        task
    }

    /// Fraction of statements reviewed as `normal`, rounded to 4 decimals
    pub fn normal_rate(&self) -> f64 {
        if self.commit_sqls.is_empty() {
            return 0.0;
        }
        let normal = self
            .commit_sqls
            .iter()
            .filter(|s| s.inspect_level == RuleLevel::Normal)
            .count();
        let rate = normal as f64 / self.commit_sqls.len() as f64;
        (rate * 10000.0).round() / 10000.0
    }

    /// Whether any statement was reviewed at `error`
    pub fn has_error(&self) -> bool {
        self.commit_sqls
            .iter()
            .any(|s| s.inspect_level == RuleLevel::Error)
    }

    /// Whether every statement is DML, so the batch commits in one transaction
    pub fn is_dml(&self) -> bool {
        !self.commit_sqls.is_empty() && self.commit_sqls.iter().all(|s| s.sql.is_dml())
    }

    fn has_committed(&self) -> bool {
        self.commit_sqls
            .iter()
            .any(|s| s.sql.exec_status != ExecStatus::Init)
    }

    fn has_rolled_back(&self) -> bool {
        self.rollback_sqls
            .iter()
            .any(|s| s.sql.exec_status != ExecStatus::Init)
    }

    /// Check `action` against the execution state
    pub fn valid_action(&self, action: TaskAction) -> Result<(), ActionError> {
        match action {
            TaskAction::Inspect => Ok(()),
            TaskAction::Commit => {
                if self.has_committed() {
                    return Err(ActionError::Committed);
                }
                Ok(())
            }
            TaskAction::Rollback => {
                if self.has_rolled_back() {
                    return Err(ActionError::RolledBack);
                }
                if !self.has_committed() {
                    return Err(ActionError::NotCommitted);
                }
                Ok(())
            }
        }
    }

    /// Rollback statement texts in the order they should run
    pub fn all_rollback_sql(&self) -> Vec<&str> {
        let mut sqls: Vec<&RollbackSql> = self.rollback_sqls.iter().collect();
        sqls.sort_by_key(|s| s.sql.number);
        sqls.iter().map(|s| s.sql.content.as_str()).collect()
    }
}
