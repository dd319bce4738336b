// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Table state
//!
//! A [`TableInfo`] keeps the definition fetched from the live database, the
//! ALTER statements virtually applied since, and the merged definition that
//! results from folding those ALTERs in order.
//!
//! Definitions are shared behind `Arc`. Applying an ALTER builds a new merged
//! definition instead of editing the previous one, so a snapshot taken before
//! the ALTER (for example by the rollback generator) stays valid.

use sqlreview_ir::{
    AlterColumnDefault, AlterSpec, AlterTable, ColumnDef, ColumnOption, ColumnPosition,
    ConstraintKind, CreateTable, ObjectName,
};
use std::sync::Arc;

/// Virtual state of one table
#[derive(Debug, Clone, Default)]
pub struct TableInfo {
    original: Option<Arc<CreateTable>>,
    merged: Option<Arc<CreateTable>>,
    alters: Vec<Arc<AlterTable>>,
    row_count: Option<u64>,
    from_database: bool,
}

impl TableInfo {
    /// A table listed by the live database whose definition is not fetched yet
    pub fn listed() -> Self {
        Self {
            from_database: true,
            ..Default::default()
        }
    }

    /// A table created earlier in the batch; it starts empty
    pub fn created(table: CreateTable) -> Self {
        let table = Arc::new(table);
        Self {
            original: Some(table.clone()),
            merged: Some(table),
            alters: Vec::new(),
            row_count: Some(0),
            from_database: false,
        }
    }

    /// Whether the table exists in the live database
    pub fn is_from_database(&self) -> bool {
        self.from_database
    }

    /// Whether a definition is available
    pub fn has_definition(&self) -> bool {
        self.original.is_some()
    }

    /// Definition as fetched or created
    pub fn original(&self) -> Option<&Arc<CreateTable>> {
        self.original.as_ref()
    }

    /// Definition with all ALTERs applied so far
    pub fn merged(&self) -> Option<&Arc<CreateTable>> {
        self.merged.as_ref().or(self.original.as_ref())
    }

    /// ALTER statements applied in this batch, in order
    pub fn alters(&self) -> &[Arc<AlterTable>] {
        &self.alters
    }

    pub fn row_count(&self) -> Option<u64> {
        self.row_count
    }

    pub fn set_row_count(&mut self, rows: u64) {
        self.row_count = Some(rows);
    }

    /// Install the fetched definition and refold pending ALTERs onto it
    pub fn set_original(&mut self, table: CreateTable) {
        let original = Arc::new(table);
        let merged = self
            .alters
            .iter()
            .fold(original.as_ref().clone(), |acc, alter| merge_alter(&acc, alter));
        self.original = Some(original);
        self.merged = Some(Arc::new(merged));
    }

    /// Fold `alter` onto the merged definition
    ///
    /// Without a definition the ALTER is only recorded; it is folded once
    /// [`set_original`](Self::set_original) installs one.
    pub fn apply_alter(&mut self, alter: AlterTable) {
        if let Some(current) = self.merged() {
            self.merged = Some(Arc::new(merge_alter(current, &alter)));
        }
        self.alters.push(Arc::new(alter));
    }
}

/// Apply every spec of `alter` to a copy of `table`
pub fn merge_alter(table: &CreateTable, alter: &AlterTable) -> CreateTable {
    let mut table = table.clone();
    for spec in &alter.specs {
        match spec {
            AlterSpec::RenameTable { new_name } => {
                let schema = new_name.schema.clone().or_else(|| table.name.schema.clone());
                table.name = ObjectName {
                    schema,
                    name: new_name.name.clone(),
                };
            }
            AlterSpec::AddColumns { columns, position } => {
                let mut position = position.clone();
                for column in columns {
                    insert_column(&mut table, column.clone(), position.as_ref(), None);
                    position = Some(ColumnPosition::After(column.name.clone()));
                }
            }
            AlterSpec::DropColumn { name } => drop_column(&mut table, name),
            AlterSpec::ChangeColumn {
                old_name,
                column,
                position,
            } => replace_column(&mut table, old_name, column, position.as_ref()),
            AlterSpec::ModifyColumn { column, position } => {
                replace_column(&mut table, &column.name, column, position.as_ref())
            }
            AlterSpec::AlterColumn { name, default } => {
                if let Some(column) = column_mut(&mut table, name) {
                    match default {
                        AlterColumnDefault::Set(value) => column.set_default(Some(value.clone())),
                        AlterColumnDefault::Drop => column.set_default(None),
                    }
                }
            }
            AlterSpec::AddConstraint(constraint) => table.constraints.push(constraint.clone()),
            AlterSpec::DropIndex { name } if name.eq_ignore_ascii_case("PRIMARY") => {
                drop_primary_key(&mut table)
            }
            AlterSpec::DropIndex { name } => table
                .constraints
                .retain(|c| !(c.is_index() && c.name_is(name))),
            AlterSpec::DropPrimaryKey => drop_primary_key(&mut table),
            AlterSpec::DropForeignKey { name } => table
                .constraints
                .retain(|c| !(c.kind == ConstraintKind::ForeignKey && c.name_is(name))),
            AlterSpec::RenameIndex { from, to } => {
                if let Some(index) = table
                    .constraints
                    .iter_mut()
                    .find(|c| c.is_index() && c.name_is(from))
                {
                    index.name = Some(to.clone());
                }
            }
            AlterSpec::TableOptions(options) => {
                for option in options {
                    table.set_option(option.clone());
                }
            }
        }
    }
    table
}

fn column_mut<'a>(table: &'a mut CreateTable, name: &str) -> Option<&'a mut ColumnDef> {
    table
        .columns
        .iter_mut()
        .find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Insert at `position`, else at `fallback`, else at the end
fn insert_column(
    table: &mut CreateTable,
    column: ColumnDef,
    position: Option<&ColumnPosition>,
    fallback: Option<usize>,
) {
    let index = match position {
        Some(ColumnPosition::First) => Some(0),
        Some(ColumnPosition::After(after)) => table.column_position(after).map(|i| i + 1),
        None => fallback,
    };
    match index {
        Some(i) if i <= table.columns.len() => table.columns.insert(i, column),
        _ => table.columns.push(column),
    }
}

fn drop_column(table: &mut CreateTable, name: &str) {
    table.columns.retain(|c| !c.name.eq_ignore_ascii_case(name));
    for constraint in &mut table.constraints {
        constraint
            .keys
            .retain(|k| !k.column.eq_ignore_ascii_case(name));
    }
    table.constraints.retain(|c| !c.keys.is_empty());
}

fn replace_column(
    table: &mut CreateTable,
    old_name: &str,
    column: &ColumnDef,
    position: Option<&ColumnPosition>,
) {
    let Some(index) = table.column_position(old_name) else {
        return;
    };
    table.columns.remove(index);
    insert_column(table, column.clone(), position, Some(index));
    if !old_name.eq_ignore_ascii_case(&column.name) {
        for key in table.constraints.iter_mut().flat_map(|c| c.keys.iter_mut()) {
            if key.column.eq_ignore_ascii_case(old_name) {
                key.column = column.name.clone();
            }
        }
    }
}

fn drop_primary_key(table: &mut CreateTable) {
    table
        .constraints
        .retain(|c| c.kind != ConstraintKind::PrimaryKey);
    for column in &mut table.columns {
        column.options.retain(|o| *o != ColumnOption::PrimaryKey);
    }
}
