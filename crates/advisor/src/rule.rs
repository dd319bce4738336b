// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Rule registry
//!
//! Configurable rules are plain functions over the catalog and one statement,
//! registered once in a static table. The registry is immutable after
//! construction and can be shared freely between reviews.
//!
//! ```rust,ignore
//! use sqlreview_advisor::{RuleConfig, RuleLevel, RuleRegistry};
//!
//! let registry = RuleRegistry::builtin();
//! let active = registry.activate(&[RuleConfig::new("DDL_DISABLE_FK").with_level(RuleLevel::Warn)])?;
//! ```

use crate::error::{AdvisorError, AdvisorResult};
use crate::results::RuleLevel;
use crate::rules;
use serde::{Deserialize, Serialize};
use sqlreview_catalog::Catalog;
use sqlreview_ir::Statement;
use std::fmt;

/// Grouping used when listing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Naming,
    Index,
    Column,
    TableStructure,
    Dml,
    Usage,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleCategory::Naming => "命名规范",
            RuleCategory::Index => "索引规范",
            RuleCategory::Column => "字段规范",
            RuleCategory::TableStructure => "表结构规范",
            RuleCategory::Dml => "DML规范",
            RuleCategory::Usage => "使用建议",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub name: &'static str,
    pub description: &'static str,
    /// Default level; an active rule may override it
    pub level: RuleLevel,
    pub category: RuleCategory,
}

/// Outcome of one rule on one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// Violated; the arguments fill the message's `%s`
    Violated(Vec<String>),
}

impl Verdict {
    /// `Violated` without arguments when `violated` holds
    pub fn when(violated: bool) -> Self {
        if violated {
            Verdict::Violated(Vec::new())
        } else {
            Verdict::Pass
        }
    }
}

/// Checks one statement against the catalog state before it is applied
pub type CheckFn = fn(&Catalog, &Statement) -> Verdict;

#[derive(Clone)]
pub struct RuleHandler {
    pub rule: Rule,
    /// Message template; `%s` takes the verdict's arguments
    pub message: &'static str,
    pub check: CheckFn,
}

impl fmt::Debug for RuleHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleHandler")
            .field("rule", &self.rule)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl RuleHandler {
    /// Run the check, rendering the message on violation
    pub fn apply(&self, catalog: &Catalog, statement: &Statement) -> Option<String> {
        match (self.check)(catalog, statement) {
            Verdict::Pass => None,
            Verdict::Violated(args) => Some(render_message(self.message, &args)),
        }
    }
}

/// Substitute `%s` with the arguments joined by `, `
pub fn render_message(template: &str, args: &[String]) -> String {
    if args.is_empty() || !template.contains("%s") {
        return template.to_string();
    }
    template.replacen("%s", &args.join(", "), 1)
}

/// Rule selection from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    /// Overrides the rule's default level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<RuleLevel>,
}

impl RuleConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: None,
        }
    }

    pub fn with_level(mut self, level: RuleLevel) -> Self {
        self.level = Some(level);
        self
    }
}

/// Registry of configurable rules, in registration order
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    handlers: Vec<RuleHandler>,
}

impl RuleRegistry {
    /// Registry holding every built-in rule
    pub fn builtin() -> Self {
        Self {
            handlers: rules::all_handlers(),
        }
    }

    pub fn from_handlers(handlers: Vec<RuleHandler>) -> Self {
        Self { handlers }
    }

    /// Handler by exact rule name
    pub fn get(&self, name: &str) -> Option<&RuleHandler> {
        self.handlers.iter().find(|h| h.rule.name == name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn rules(&self) -> Vec<&Rule> {
        self.handlers.iter().map(|h| &h.rule).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Every rule at its default level
    pub fn all_active(&self) -> Vec<RuleHandler> {
        self.handlers.clone()
    }

    /// Handlers for the configured rules, kept in registration order, with
    /// level overrides applied
    ///
    /// # Errors
    ///
    /// Returns [`AdvisorError::UnknownRule`] for a name that is not registered.
    pub fn activate(&self, configs: &[RuleConfig]) -> AdvisorResult<Vec<RuleHandler>> {
        if let Some(unknown) = configs.iter().find(|c| !self.has(&c.name)) {
            return Err(AdvisorError::UnknownRule(unknown.name.clone()));
        }
        Ok(self
            .handlers
            .iter()
            .filter_map(|handler| {
                let config = configs.iter().find(|c| c.name == handler.rule.name)?;
                let mut handler = handler.clone();
                if let Some(level) = config.level {
                    handler.rule.level = level;
                }
                Some(handler)
            })
            .collect())
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
