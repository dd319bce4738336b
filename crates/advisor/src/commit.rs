// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Commit and rollback execution
//!
//! Runs a reviewed task's statements against the live database and records
//! the outcome on each statement record. Every run holds one connection,
//! switched to the task's instance schema first, so `USE` statements in the
//! batch carry over. A task made only of DML commits each record in its own
//! transaction, bracketed by binlog positions; anything else runs statement
//! by statement and stops at the first failure.

use crate::error::{AdvisorError, AdvisorResult};
use crate::task::{ExecStatus, Sql, Task, TaskAction};
use serde::Serialize;
use sqlreview_catalog::{Connection, Executor};
use sqlreview_ir::quote_ident;
use tracing::{info, warn};

/// Result text of a statement that ran
pub const EXEC_OK: &str = "ok";

/// What a commit or rollback run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitOutcome {
    /// Numbers of the records that ran, in order
    pub done: Vec<usize>,
    /// Record that failed and the error it failed with
    pub failed: Option<(usize, String)>,
    pub rows_affected: u64,
}

impl CommitOutcome {
    pub fn is_success(&self) -> bool {
        self.failed.is_none()
    }
}

/// Commit every statement of a reviewed task
///
/// # Errors
///
/// Returns [`ActionError::Committed`](crate::ActionError::Committed) if the
/// task ran before, or the failure of a DML transaction.
pub async fn commit_task(executor: &dyn Executor, task: &mut Task) -> AdvisorResult<CommitOutcome> {
    task.valid_action(TaskAction::Commit)?;
    let mut conn = open_session(executor, &task.instance_schema).await?;
    if task.is_dml() {
        commit_dml(conn.as_mut(), task).await
    } else {
        commit_ddl(conn.as_mut(), task).await
    }
}

/// Pin a connection and switch it to `schema`
async fn open_session<'a>(
    executor: &'a dyn Executor,
    schema: &str,
) -> AdvisorResult<Box<dyn Connection + 'a>> {
    let mut conn = executor.acquire().await?;
    if !schema.is_empty() {
        conn.exec(&format!("USE {}", quote_ident(schema))).await?;
    }
    Ok(conn)
}

/// Run the task's statements one by one, stopping at the first failure
pub async fn commit_ddl(conn: &mut dyn Connection, task: &mut Task) -> AdvisorResult<CommitOutcome> {
    info!(task = %task.id, "start commit ddl");
    let sqls = task.commit_sqls.iter_mut().map(|c| &mut c.sql);
    Ok(run_ddl(conn, sqls).await)
}

/// Run each statement record in its own transaction, capturing binlog
/// positions around it
///
/// # Errors
///
/// A failed transaction marks the record `error` and is returned as
/// [`AdvisorError::Execution`]; later records are left untouched.
pub async fn commit_dml(conn: &mut dyn Connection, task: &mut Task) -> AdvisorResult<CommitOutcome> {
    info!(task = %task.id, "start commit dml");
    let sqls = task.commit_sqls.iter_mut().map(|c| &mut c.sql);
    run_dml(conn, sqls).await
}

/// Run the task's rollback statements in rollback order
///
/// # Errors
///
/// Returns an [`ActionError`](crate::ActionError) unless the task was
/// committed and not yet rolled back.
pub async fn rollback_task(
    executor: &dyn Executor,
    task: &mut Task,
) -> AdvisorResult<CommitOutcome> {
    task.valid_action(TaskAction::Rollback)?;
    info!(task = %task.id, statements = task.rollback_sqls.len(), "start rollback");
    let dml = task.is_dml();
    let mut conn = open_session(executor, &task.instance_schema).await?;
    task.rollback_sqls.sort_by_key(|r| r.sql.number);
    let sqls = task.rollback_sqls.iter_mut().map(|r| &mut r.sql);
    if dml {
        run_dml(conn.as_mut(), sqls).await
    } else {
        Ok(run_ddl(conn.as_mut(), sqls).await)
    }
}

async fn run_ddl<'a>(
    conn: &mut dyn Connection,
    sqls: impl Iterator<Item = &'a mut Sql>,
) -> CommitOutcome {
    let mut outcome = CommitOutcome::default();
    for sql in sqls {
        sql.exec_status = ExecStatus::Doing;
        match conn.exec(&sql.content).await {
            Ok(result) => {
                sql.exec_status = ExecStatus::Done;
                sql.exec_result = EXEC_OK.to_string();
                sql.rows_affected = result.rows_affected;
                outcome.rows_affected += result.rows_affected;
                outcome.done.push(sql.number);
            }
            Err(e) => {
                warn!(number = sql.number, error = %e, "exec sql failed");
                sql.exec_status = ExecStatus::Error;
                sql.exec_result = e.to_string();
                outcome.failed = Some((sql.number, e.to_string()));
                break;
            }
        }
    }
    outcome
}

async fn run_dml<'a>(
    conn: &mut dyn Connection,
    sqls: impl Iterator<Item = &'a mut Sql>,
) -> AdvisorResult<CommitOutcome> {
    let mut outcome = CommitOutcome::default();
    for sql in sqls {
        sql.exec_status = ExecStatus::Doing;
        match transact(conn, sql).await {
            Ok(rows) => {
                outcome.rows_affected += rows;
                outcome.done.push(sql.number);
            }
            Err(message) => {
                warn!(number = sql.number, error = %message, "commit dml failed");
                sql.exec_status = ExecStatus::Error;
                sql.exec_result = message.clone();
                return Err(AdvisorError::Execution {
                    number: sql.number,
                    message,
                });
            }
        }
    }
    Ok(outcome)
}

async fn transact(conn: &mut dyn Connection, sql: &mut Sql) -> Result<u64, String> {
    let start = conn
        .fetch_binlog_position()
        .await
        .map_err(|e| e.to_string())?;
    sql.start_binlog = Some(start);

    let result = conn
        .transact(&sql.exec_texts())
        .await
        .map_err(|e| e.to_string())?;
    sql.rows_affected = result.rows_affected;
    sql.exec_status = ExecStatus::Done;
    sql.exec_result = EXEC_OK.to_string();

    match conn.fetch_binlog_position().await {
        Ok(end) => sql.end_binlog = Some(end),
        Err(e) => warn!(number = sql.number, error = %e, "fetch end binlog position failed"),
    }
    Ok(result.rows_affected)
}
