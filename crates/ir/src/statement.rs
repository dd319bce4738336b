// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Statements
//!
//! [`Statement`] is the tagged union every per-kind handler dispatches on.
//! Accessors here give the uniform view (kind, referenced tables) that the
//! advisor and rollback generator need independent of statement shape.

use crate::ddl::{AlterTable, CreateDatabase, CreateIndex, CreateTable, DropDatabase, DropIndex, DropTable};
use crate::dml::{Delete, Insert, Update};
use crate::name::{ObjectName, quote_ident};
use crate::query::SelectStatement;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad statement category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    Ddl,
    Dml,
    Query,
    Other,
}

/// A parsed SQL statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Use(String),
    CreateDatabase(CreateDatabase),
    DropDatabase(DropDatabase),
    CreateTable(Box<CreateTable>),
    AlterTable(AlterTable),
    DropTable(DropTable),
    CreateIndex(CreateIndex),
    DropIndex(DropIndex),
    Insert(Box<Insert>),
    Update(Box<Update>),
    Delete(Box<Delete>),
    Select(Box<SelectStatement>),
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self {
            Statement::CreateDatabase(_)
            | Statement::DropDatabase(_)
            | Statement::CreateTable(_)
            | Statement::AlterTable(_)
            | Statement::DropTable(_)
            | Statement::CreateIndex(_)
            | Statement::DropIndex(_) => StatementKind::Ddl,
            Statement::Insert(_) | Statement::Update(_) | Statement::Delete(_) => {
                StatementKind::Dml
            }
            Statement::Select(_) => StatementKind::Query,
            Statement::Use(_) => StatementKind::Other,
        }
    }

    pub fn is_ddl(&self) -> bool {
        self.kind() == StatementKind::Ddl
    }

    pub fn is_dml(&self) -> bool {
        self.kind() == StatementKind::Dml
    }

    /// Short statement tag for logs
    pub fn tag(&self) -> &'static str {
        match self {
            Statement::Use(_) => "USE",
            Statement::CreateDatabase(_) => "CREATE DATABASE",
            Statement::DropDatabase(_) => "DROP DATABASE",
            Statement::CreateTable(_) => "CREATE TABLE",
            Statement::AlterTable(_) => "ALTER TABLE",
            Statement::DropTable(_) => "DROP TABLE",
            Statement::CreateIndex(_) => "CREATE INDEX",
            Statement::DropIndex(_) => "DROP INDEX",
            Statement::Insert(i) if i.replace => "REPLACE",
            Statement::Insert(_) => "INSERT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
            Statement::Select(_) => "SELECT",
        }
    }

    /// Every table the statement references, as written
    pub fn table_refs(&self) -> Vec<ObjectName> {
        match self {
            Statement::CreateTable(t) => {
                let mut out = vec![t.name.clone()];
                out.extend(t.like.clone());
                out
            }
            Statement::AlterTable(t) => vec![t.name.clone()],
            Statement::DropTable(t) => t.tables.clone(),
            Statement::CreateIndex(i) => vec![i.table.clone()],
            Statement::DropIndex(i) => vec![i.table.clone()],
            Statement::Insert(i) => vec![i.table.clone()],
            Statement::Update(u) => u.target_tables().into_iter().map(|(n, _)| n.clone()).collect(),
            Statement::Delete(d) => {
                let mut out: Vec<ObjectName> = d.targets.clone();
                out.extend(d.source_tables().into_iter().map(|(n, _)| n.clone()));
                out
            }
            Statement::Select(s) => s.tables().into_iter().map(|(n, _)| n.clone()).collect(),
            Statement::Use(_) | Statement::CreateDatabase(_) | Statement::DropDatabase(_) => {
                Vec::new()
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Use(schema) => write!(f, "USE {}", quote_ident(schema)),
            Statement::CreateDatabase(s) => write!(f, "{}", s),
            Statement::DropDatabase(s) => write!(f, "{}", s),
            Statement::CreateTable(s) => write!(f, "{}", s),
            Statement::AlterTable(s) => write!(f, "{}", s),
            Statement::DropTable(s) => write!(f, "{}", s),
            Statement::CreateIndex(s) => write!(f, "{}", s),
            Statement::DropIndex(s) => write!(f, "{}", s),
            Statement::Insert(s) => write!(f, "{}", s),
            Statement::Update(s) => write!(f, "{}", s),
            Statement::Delete(s) => write!(f, "{}", s),
            Statement::Select(s) => write!(f, "{}", s),
        }
    }
}
