// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Review - Advisor
//!
//! Reviews a batch of MySQL statements before it runs, then commits or rolls
//! it back with per-statement bookkeeping.
//!
//! ## Architecture
//!
//! - [`Task`]: the batch, split into numbered [`CommitSql`] records, plus the
//!   [`RollbackSql`] records generated for it.
//! - [`check_statement`]: existence checks that always run (schema, table,
//!   column, index, value arity).
//! - [`RuleRegistry`]: the configurable rules; [`RuleRegistry::activate`]
//!   selects and re-levels them.
//! - [`Advisor`]: walks the batch in order against a catalog
//!   [`Session`](sqlreview_catalog::Session), applying each statement's schema
//!   effect before the next is checked.
//! - [`commit_task`] / [`rollback_task`]: execution with status, result text,
//!   rows affected and binlog positions recorded on each record.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sqlreview_advisor::{Advisor, RuleRegistry, Task, commit_task};
//!
//! let mut task = Task::from_batch("1", "app", "alter table users add column age int;");
//! let mut advisor = Advisor::new(session, RuleRegistry::builtin().all_active());
//! if advisor.advise(&mut task).await? {
//!     commit_task(executor.as_ref(), &mut task).await?;
//! }
//! ```

pub mod advisor;
pub mod checks;
pub mod commit;
pub mod error;
pub mod results;
pub mod rule;
pub mod rules;
pub mod task;

pub use advisor::{Advisor, SYNTAX_ERROR_PREFIX};
pub use checks::check_statement;
pub use commit::{CommitOutcome, EXEC_OK, commit_ddl, commit_dml, commit_task, rollback_task};
pub use error::{ActionError, AdvisorError, AdvisorResult};
pub use results::{InspectResults, RuleLevel};
pub use rule::{Rule, RuleCategory, RuleConfig, RuleHandler, RuleRegistry, Verdict, render_message};
pub use task::{CommitSql, ExecStatus, InspectStatus, RollbackSql, Sql, Task, TaskAction};
