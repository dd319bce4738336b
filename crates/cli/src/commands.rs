// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Subcommand bodies, independent of argument parsing and output streams

use crate::config::{ConnectionConfig, ReviewConfig};
use anyhow::{Context, Result, bail};
use sqlreview_advisor::{Advisor, RuleRegistry, Task};
use sqlreview_catalog::{Catalog, Executor, LiveMySqlExecutor, Session};
use sqlreview_ir::Statement;
use sqlreview_optimizer::{OptimizeResult, Optimizer};
use sqlreview_rollback::generate_rollback;
use std::fmt::Write;
use std::sync::Arc;
use tracing::info;

/// Task id given to batches reviewed from the command line
pub const CLI_TASK_ID: &str = "cli";

/// Open the configured live database
pub async fn connect(config: &ConnectionConfig) -> Result<Arc<dyn Executor>> {
    if config.url.is_empty() {
        bail!("connection.url is not configured");
    }
    let executor =
        LiveMySqlExecutor::with_config(config.url.clone(), config.pool_size, config.timeout_secs)
            .await
            .context("failed to open database connection")?;
    Ok(Arc::new(executor))
}

/// Review `batch` in `schema` and derive its rollback statements
///
/// The review and the rollback each walk the batch from the live state on
/// their own catalog. A batch with an error-level record gets no rollback.
pub async fn review(
    executor: Arc<dyn Executor>,
    schema: &str,
    batch: &str,
    config: &ReviewConfig,
) -> Result<Task> {
    let rules = config.active_rules(&RuleRegistry::builtin())?;
    let mut task = Task::from_batch(CLI_TASK_ID, schema, batch);
    let session = Session::new(executor, Catalog::new(schema));

    let mut advisor = Advisor::new(session.fork(), rules);
    let valid = advisor.advise(&mut task).await?;
    info!(valid, statements = task.commit_sqls.len(), "batch reviewed");

    if !valid {
        info!("batch invalid, rollback skipped");
        return Ok(task);
    }
    let mut session = session;
    task.rollback_sqls = generate_rollback(&mut session, &task, &config.rollback_config()).await?;
    Ok(task)
}

/// Index advice for one SELECT
pub async fn optimize(
    executor: Arc<dyn Executor>,
    schema: &str,
    sql: &str,
    config: &ReviewConfig,
) -> Result<Vec<OptimizeResult>> {
    let select = match sqlreview_lowering::parse_one(sql)? {
        Statement::Select(select) => select,
        other => bail!("only SELECT can be optimized, got {}", other.tag()),
    };
    let mut session = Session::new(executor, Catalog::new(schema));
    let mut optimizer = Optimizer::new(&mut session, config.optimizer_config());
    Ok(optimizer.optimize(&select).await?)
}

/// Plain-text review report
pub fn render_review(task: &Task) -> String {
    let mut out = String::new();
    for commit in &task.commit_sqls {
        let _ = writeln!(
            out,
            "#{} [{}] {}",
            commit.sql.number, commit.inspect_level, commit.sql.content
        );
        for line in commit.inspect_result.lines() {
            let _ = writeln!(out, "    {}", line);
        }
    }
    if task.rollback_sqls.is_empty() {
        return out;
    }
    let _ = writeln!(out, "\n-- rollback");
    for rollback in &task.rollback_sqls {
        let _ = writeln!(
            out,
            "-- #{} undoes #{}",
            rollback.sql.number, rollback.commit_number
        );
        let _ = writeln!(out, "{}", rollback.sql.content.trim_end());
    }
    out
}

/// Plain-text index advice
pub fn render_advice(results: &[OptimizeResult]) -> String {
    let mut out = String::new();
    for result in results {
        let _ = writeln!(out, "-- {}", result.reason);
        let _ = writeln!(out, "{};", result.create_index_sql());
    }
    out
}

/// Registered rules, one per line
pub fn render_rules(registry: &RuleRegistry) -> String {
    let mut out = String::new();
    for rule in registry.rules() {
        let _ = writeln!(
            out,
            "{:<48} {:<7} {}",
            rule.name,
            rule.level.as_str(),
            rule.description
        );
    }
    out
}
