// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # DDL rollback
//!
//! Inverse statements for schema changes, derived from the table definition
//! the catalog holds *before* the forward statement is applied.
//!
//! ```text
//! CREATE DATABASE s        ->  DROP DATABASE IF EXISTS `s`
//! CREATE TABLE t           ->  DROP TABLE IF EXISTS `s`.`t`
//! DROP TABLE t             ->  CREATE TABLE `s`.`t` (...);
//! CREATE INDEX i ON t      ->  DROP INDEX `i` ON `s`.`t`
//! DROP INDEX i ON t        ->  CREATE [UNIQUE] INDEX `i` ON `s`.`t` (...)
//! ALTER TABLE t <specs>    ->  ALTER TABLE `s`.`t` <inverse specs>;
//! ```

use crate::error::RollbackResult;
use sqlreview_catalog::Session;
use sqlreview_ir::{
    AlterColumnDefault, AlterSpec, AlterTable, ColumnPosition, Constraint, ConstraintKind,
    CreateDatabase, CreateIndex, CreateTable, DropIndex, DropTable, IndexColumn, ObjectName,
    quote_ident,
};
use tracing::debug;

/// `DROP DATABASE` for a schema this batch creates
pub async fn create_database(
    session: &mut Session,
    stmt: &CreateDatabase,
) -> RollbackResult<Option<String>> {
    if session.is_schema_exist(&stmt.name).await? {
        return Ok(None);
    }
    Ok(Some(format!("DROP DATABASE IF EXISTS {}", quote_ident(&stmt.name))))
}

/// `DROP TABLE` for a table this batch creates
///
/// Nothing when the schema is missing or the table already exists, since
/// the forward statement fails or does nothing.
pub async fn create_table(
    session: &mut Session,
    stmt: &CreateTable,
) -> RollbackResult<Option<String>> {
    let schema = session.catalog().schema_of(&stmt.name).to_string();
    if !session.is_schema_exist(&schema).await? {
        return Ok(None);
    }
    if session.is_table_exist(&stmt.name).await? {
        return Ok(None);
    }
    let table = session.catalog().resolve(&stmt.name);
    Ok(Some(format!("DROP TABLE IF EXISTS {}", table)))
}

/// The current definition of every dropped table that exists
pub async fn drop_table(session: &mut Session, stmt: &DropTable) -> RollbackResult<Option<String>> {
    let mut rollback = String::new();
    for name in &stmt.tables {
        let Some(table) = session.create_table_of(name).await? else {
            continue;
        };
        let mut table = CreateTable::clone(&table);
        table.name = session.catalog().resolve(name);
        rollback.push_str(&format!("{};\n", table));
    }
    Ok(non_empty(rollback))
}

pub fn create_index(session: &Session, stmt: &CreateIndex) -> Option<String> {
    let table = session.catalog().resolve(&stmt.table);
    Some(format!("DROP INDEX {} ON {}", quote_ident(&stmt.name), table))
}

/// Rebuild a dropped plain or unique index from its definition
pub async fn drop_index(session: &mut Session, stmt: &DropIndex) -> RollbackResult<Option<String>> {
    let Some(table) = session.create_table_of(&stmt.table).await? else {
        return Ok(None);
    };
    let Some(constraint) = table.constraint(&stmt.name) else {
        return Ok(None);
    };
    if !matches!(constraint.kind, ConstraintKind::Index | ConstraintKind::Unique) {
        debug!(index = %stmt.name, "only plain and unique indexes are rebuilt");
        return Ok(None);
    }
    let index = CreateIndex {
        name: stmt.name.clone(),
        table: session.catalog().resolve(&stmt.table),
        kind: constraint.kind,
        keys: constraint.keys.clone(),
        options: constraint.options.clone(),
    };
    Ok(Some(index.to_string()))
}

/// Inverse ALTER built against the pre-ALTER definition
pub async fn alter_table(
    session: &mut Session,
    stmt: &AlterTable,
) -> RollbackResult<Option<String>> {
    let Some(table) = session.create_table_of(&stmt.name).await? else {
        return Ok(None);
    };
    let rollback = invert_alter(&table, &session.catalog().resolve(&stmt.name), stmt);
    if rollback.specs.is_empty() {
        return Ok(None);
    }
    Ok(Some(format!("{};", rollback)))
}

/// Specs that undo `stmt` on `table`, grouped by kind
///
/// `name` is the fully qualified name of the table before the ALTER.
pub fn invert_alter(table: &CreateTable, name: &ObjectName, stmt: &AlterTable) -> AlterTable {
    let mut rollback = AlterTable {
        name: name.clone(),
        specs: Vec::new(),
    };

    if let Some(new_name) = stmt.renamed_to() {
        rollback.name = ObjectName {
            schema: new_name.schema.clone().or_else(|| name.schema.clone()),
            name: new_name.name.clone(),
        };
        rollback.specs.push(AlterSpec::RenameTable {
            new_name: name.clone(),
        });
    }

    for spec in &stmt.specs {
        if let AlterSpec::AddColumns { columns, .. } = spec {
            for column in columns {
                rollback.specs.push(AlterSpec::DropColumn {
                    name: column.name.clone(),
                });
            }
        }
    }

    // Re-add in table order so each AFTER target exists when it runs
    let mut dropped: Vec<usize> = stmt
        .specs
        .iter()
        .filter_map(|spec| match spec {
            AlterSpec::DropColumn { name } => table.column_position(name),
            _ => None,
        })
        .collect();
    dropped.sort_unstable();
    dropped.dedup();
    for index in dropped {
        rollback.specs.push(AlterSpec::AddColumns {
            columns: vec![table.columns[index].clone()],
            position: Some(position_of(table, index)),
        });
    }

    for spec in &stmt.specs {
        if let AlterSpec::ChangeColumn {
            old_name,
            column,
            position,
        } = spec
        {
            if let Some(index) = table.column_position(old_name) {
                rollback.specs.push(AlterSpec::ChangeColumn {
                    old_name: column.name.clone(),
                    column: table.columns[index].clone(),
                    position: position.as_ref().map(|_| position_of(table, index)),
                });
            }
        }
    }

    for spec in &stmt.specs {
        if let AlterSpec::ModifyColumn { column, position } = spec {
            if let Some(index) = table.column_position(&column.name) {
                rollback.specs.push(AlterSpec::ModifyColumn {
                    column: table.columns[index].clone(),
                    position: position.as_ref().map(|_| position_of(table, index)),
                });
            }
        }
    }

    // A column without a default gets DROP DEFAULT back only when the
    // forward spec set one; dropping an absent default needs no rollback.
    for spec in &stmt.specs {
        if let AlterSpec::AlterColumn { name, default } = spec {
            let Some(original) = table.column(name) else {
                continue;
            };
            match (original.default_value(), default) {
                (Some(value), _) => rollback.specs.push(AlterSpec::AlterColumn {
                    name: original.name.clone(),
                    default: AlterColumnDefault::Set(value.clone()),
                }),
                (None, AlterColumnDefault::Set(_)) => rollback.specs.push(AlterSpec::AlterColumn {
                    name: original.name.clone(),
                    default: AlterColumnDefault::Drop,
                }),
                (None, AlterColumnDefault::Drop) => {}
            }
        }
    }

    for spec in &stmt.specs {
        match spec {
            AlterSpec::DropIndex { name } if name.eq_ignore_ascii_case("PRIMARY") => {
                rollback.specs.extend(primary_key_of(table).map(AlterSpec::AddConstraint));
            }
            AlterSpec::DropIndex { name } => {
                if let Some(index) = table
                    .constraints
                    .iter()
                    .find(|c| c.is_index() && c.name_is(name))
                {
                    rollback.specs.push(AlterSpec::AddConstraint(index.clone()));
                }
            }
            _ => {}
        }
    }

    if stmt.specs.iter().any(|s| matches!(s, AlterSpec::DropPrimaryKey)) {
        rollback.specs.extend(primary_key_of(table).map(AlterSpec::AddConstraint));
    }

    for spec in &stmt.specs {
        if let AlterSpec::DropForeignKey { name } = spec {
            if let Some(fk) = table
                .constraints
                .iter()
                .find(|c| c.kind == ConstraintKind::ForeignKey && c.name_is(name))
            {
                rollback.specs.push(AlterSpec::AddConstraint(fk.clone()));
            }
        }
    }

    for spec in &stmt.specs {
        if let AlterSpec::RenameIndex { from, to } = spec {
            rollback.specs.push(AlterSpec::RenameIndex {
                from: to.clone(),
                to: from.clone(),
            });
        }
    }

    for spec in &stmt.specs {
        let AlterSpec::AddConstraint(constraint) = spec else {
            continue;
        };
        match constraint.kind {
            ConstraintKind::Index | ConstraintKind::Unique | ConstraintKind::Fulltext => {
                // The database names an unnamed index itself
                if let Some(name) = &constraint.name {
                    rollback.specs.push(AlterSpec::DropIndex { name: name.clone() });
                }
            }
            ConstraintKind::PrimaryKey => rollback.specs.push(AlterSpec::DropPrimaryKey),
            ConstraintKind::ForeignKey => {
                if let Some(name) = &constraint.name {
                    rollback.specs.push(AlterSpec::DropForeignKey { name: name.clone() });
                }
            }
        }
    }

    rollback
}

/// Position clause that puts column `index` back where it was
fn position_of(table: &CreateTable, index: usize) -> ColumnPosition {
    match index.checked_sub(1) {
        Some(prev) => ColumnPosition::After(table.columns[prev].name.clone()),
        None => ColumnPosition::First,
    }
}

/// The primary key as a table constraint, whichever way it was declared
fn primary_key_of(table: &CreateTable) -> Option<Constraint> {
    if let Some(pk) = table
        .constraints
        .iter()
        .find(|c| c.kind == ConstraintKind::PrimaryKey)
    {
        return Some(pk.clone());
    }
    let keys: Vec<IndexColumn> = table
        .columns
        .iter()
        .filter(|c| c.is_primary_key())
        .map(|c| IndexColumn::new(c.name.clone()))
        .collect();
    (!keys.is_empty()).then(|| Constraint::new(ConstraintKind::PrimaryKey, keys))
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
