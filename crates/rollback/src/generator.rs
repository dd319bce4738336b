// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Rollback generator
//!
//! Walks a reviewed task in statement order against a catalog
//! [`Session`]. Each statement's rollback is derived from the catalog state
//! (and, for UPDATE/DELETE, the live rows) *before* its schema effect is
//! applied, so later statements see the earlier ones.
//!
//! The result is in reverse statement order: rollback #1 undoes the last
//! forward statement.

use crate::ddl;
use crate::dml;
use crate::error::RollbackResult;
use serde::{Deserialize, Serialize};
use sqlreview_advisor::{RollbackSql, Sql, Task};
use sqlreview_catalog::Session;
use sqlreview_ir::Statement;
use tracing::{debug, info};

/// Default cap on rows captured for an UPDATE/DELETE rollback
pub const DEFAULT_DML_ROLLBACK_MAX_ROWS: i64 = 1000;

/// Rollback tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackConfig {
    /// Most rows a DML rollback may cover; negative disables DML rollback
    pub dml_rollback_max_rows: i64,
}

impl Default for RollbackConfig {
    fn default() -> Self {
        Self {
            dml_rollback_max_rows: DEFAULT_DML_ROLLBACK_MAX_ROWS,
        }
    }
}

impl RollbackConfig {
    pub fn with_max_rows(mut self, rows: i64) -> Self {
        self.dml_rollback_max_rows = rows;
        self
    }
}

/// Generate the rollback statements of `task`, numbered from 1
///
/// Statements that do not parse are skipped. A statement that cannot be
/// rolled back safely contributes nothing; the caller must treat it as
/// needing a manual rollback.
///
/// # Errors
///
/// Returns an error when the live database cannot be consulted.
pub async fn generate_rollback(
    session: &mut Session,
    task: &Task,
    config: &RollbackConfig,
) -> RollbackResult<Vec<RollbackSql>> {
    info!(task = %task.id, "start generate rollback sql");
    let mut forward = Vec::new();
    for commit in &task.commit_sqls {
        if commit.sql.parse_error.is_some() {
            continue;
        }
        let mut pieces = Vec::new();
        for statement in &commit.sql.statements {
            session.prepare(statement).await?;
            if let Some(rollback) = rollback_statement(session, statement, config).await? {
                pieces.push(rollback);
            }
            session.apply(statement);
        }
        if pieces.is_empty() {
            debug!(number = commit.sql.number, "no rollback for sql");
            continue;
        }
        pieces.reverse();
        forward.push((commit.sql.number, pieces.join("\n")));
    }

    let rollbacks: Vec<RollbackSql> = forward
        .into_iter()
        .rev()
        .enumerate()
        .map(|(i, (commit_number, content))| RollbackSql {
            sql: Sql::new(i + 1, content),
            commit_number,
        })
        .collect();
    info!(task = %task.id, count = rollbacks.len(), "generate rollback sql finish");
    Ok(rollbacks)
}

/// Rollback of one statement against the session's current catalog
///
/// Must run before the statement is applied to the catalog or executed.
pub async fn rollback_statement(
    session: &mut Session,
    statement: &Statement,
    config: &RollbackConfig,
) -> RollbackResult<Option<String>> {
    let max_rows = config.dml_rollback_max_rows;
    if statement.is_dml() && max_rows < 0 {
        return Ok(None);
    }
    match statement {
        Statement::CreateDatabase(stmt) => ddl::create_database(session, stmt).await,
        Statement::CreateTable(stmt) => ddl::create_table(session, stmt).await,
        Statement::DropTable(stmt) => ddl::drop_table(session, stmt).await,
        Statement::CreateIndex(stmt) => Ok(ddl::create_index(session, stmt)),
        Statement::DropIndex(stmt) => ddl::drop_index(session, stmt).await,
        Statement::AlterTable(stmt) => ddl::alter_table(session, stmt).await,
        Statement::Insert(stmt) => dml::insert(session, stmt, max_rows).await,
        Statement::Delete(stmt) => dml::delete(session, stmt, max_rows).await,
        Statement::Update(stmt) => dml::update(session, stmt, max_rows).await,
        _ => Ok(None),
    }
}
