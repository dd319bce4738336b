// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Advisor
//!
//! Reviews a task's statements in order against a [`Session`]. Each
//! statement is checked against the catalog state left by the statements
//! before it, then its schema effect is applied so the next one sees it.
//!
//! ```text
//! for each CommitSql:
//!   prepare (lazy load)  ->  existence checks  ->  active rules
//!                        ->  record level/result  ->  apply to catalog
//! ```
//!
//! Relate tasks are reviewed first on a fork of the session, so the batch
//! is checked as if they had already run.

use crate::checks::check_statement;
use crate::error::AdvisorResult;
use crate::results::{InspectResults, RuleLevel};
use crate::rule::RuleHandler;
use crate::task::{CommitSql, Task};
use sqlreview_catalog::Session;
use tracing::{debug, info, warn};

/// Message prefix for a statement that could not be parsed
pub const SYNTAX_ERROR_PREFIX: &str = "语法错误: ";

/// Reviews tasks against a lazily loaded catalog
#[derive(Debug)]
pub struct Advisor {
    session: Session,
    rules: Vec<RuleHandler>,
    relate_tasks: Vec<Task>,
}

impl Advisor {
    /// Create an advisor running `rules` in the order given
    pub fn new(session: Session, rules: Vec<RuleHandler>) -> Self {
        Self {
            session,
            rules,
            relate_tasks: Vec::new(),
        }
    }

    /// Tasks assumed to have run before the reviewed one
    pub fn with_relate_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.relate_tasks = tasks;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Review every statement of `task`, recording level and result on each
    ///
    /// Returns whether the batch is valid, i.e. no statement was reviewed at
    /// `error`. A statement that does not parse is reported on its record and
    /// does not stop the review.
    ///
    /// # Errors
    ///
    /// Returns an error when the live database cannot be consulted while
    /// loading the catalog.
    pub async fn advise(&mut self, task: &mut Task) -> AdvisorResult<bool> {
        info!(task = %task.id, statements = task.commit_sqls.len(), "start advise sql");
        self.advise_relate_tasks().await?;

        let mut valid = true;
        for commit in &mut task.commit_sqls {
            let results = review(&mut self.session, &self.rules, commit).await?;
            if results.level() == RuleLevel::Error {
                valid = false;
                warn!(
                    number = commit.sql.number,
                    sql = %commit.sql.content,
                    result = %results.message(),
                    "sql invalid"
                );
            }
            commit.set_inspect(&results);
            debug!(
                number = commit.sql.number,
                level = %commit.inspect_level,
                "sql reviewed"
            );
        }
        info!(task = %task.id, valid, "advise sql finish");
        Ok(valid)
    }

    /// Replay relate tasks on a fork, dropping any that is itself invalid
    async fn advise_relate_tasks(&mut self) -> AdvisorResult<()> {
        if self.relate_tasks.is_empty() {
            return Ok(());
        }
        let mut remaining = std::mem::take(&mut self.relate_tasks);
        let ids: Vec<&str> = remaining.iter().map(|t| t.id.as_str()).collect();
        info!(tasks = %ids.join(", "), "relate advise tasks");

        loop {
            let mut fork = self.session.fork();
            let mut invalid = None;
            for (i, relate) in remaining.iter().enumerate() {
                let mut valid = true;
                for commit in &relate.commit_sqls {
                    let results = review(&mut fork, &[], commit).await?;
                    valid &= results.level() != RuleLevel::Error;
                }
                if !valid {
                    invalid = Some(i);
                    break;
                }
            }
            match invalid {
                Some(i) => {
                    let dropped = remaining.remove(i);
                    warn!(task = %dropped.id, "relate tasks failed, task invalid in tasks");
                }
                None => {
                    info!(count = remaining.len(), "relate tasks success");
                    self.session = fork;
                    self.relate_tasks = remaining;
                    return Ok(());
                }
            }
        }
    }
}

/// Review one statement record and apply its effect to the session
async fn review(
    session: &mut Session,
    rules: &[RuleHandler],
    commit: &CommitSql,
) -> AdvisorResult<InspectResults> {
    let mut results = InspectResults::new();
    if let Some(e) = &commit.sql.parse_error {
        results.add(RuleLevel::Error, format!("{}{}", SYNTAX_ERROR_PREFIX, e));
        return Ok(results);
    }
    for statement in &commit.sql.statements {
        session.prepare(statement).await?;
        results.extend(check_statement(session.catalog(), statement));
        for handler in rules {
            if let Some(message) = handler.apply(session.catalog(), statement) {
                results.add(handler.rule.level, message);
            }
        }
        session.apply(statement);
    }
    Ok(results)
}
