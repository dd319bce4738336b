// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Review - Intermediate Representation
//!
//! This crate provides the typed statement nodes every other layer of the
//! review engine works on. The IR is designed to:
//! - Model the MySQL DDL/DML subset the engine reviews
//! - Expose uniform accessors (table references, columns, predicates)
//! - Render back to SQL text through `Display`, which is how rollback
//!   statements and fetched table definitions are produced
//!
//! ## Statement kinds
//!
//! ```text
//! Statement
//!   ├── DDL: CREATE/DROP DATABASE, CREATE/ALTER/DROP TABLE, CREATE/DROP INDEX
//!   ├── DML: INSERT/REPLACE, UPDATE, DELETE
//!   ├── Query: SELECT
//!   └── Other: USE
//! ```

pub mod ddl;
pub mod dml;
pub mod expr;
pub mod name;
pub mod query;
pub mod statement;

// Re-export commonly used types
pub use ddl::{
    AlterColumnDefault, AlterSpec, AlterTable, ColumnDef, ColumnOption, ColumnPosition,
    Constraint, ConstraintKind, CreateDatabase, CreateIndex, CreateTable, DataType, DropDatabase,
    DropIndex, DropTable, ForeignKeyRef, IndexColumn, IndexOptions, IndexType, ReferenceAction,
    TableOption,
};
pub use dml::{Assignment, Delete, Insert, InsertSource, Update};
pub use expr::{BinaryOp, ColumnRef, Expr, Literal, UnaryOp};
pub use name::{ObjectName, quote_ident};
pub use query::{
    Join, JoinCondition, JoinType, Limit, OrderBy, SelectItem, SelectStatement, SortDirection,
    TableFactor, TableRef,
};
pub use statement::{Statement, StatementKind};
