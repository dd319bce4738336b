// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! DDL rules
//!
//! Most rules look only at what the statement introduces: the columns and
//! indexes of a CREATE TABLE, or those an ALTER TABLE adds or redefines.
//! `CREATE TABLE ... LIKE` introduces nothing of its own and is skipped by
//! the structural rules.

use super::keywords::is_reserved;
use crate::rule::Verdict;
use sqlreview_catalog::Catalog;
use sqlreview_ir::{
    AlterSpec, ColumnDef, ConstraintKind, CreateTable, Expr, Literal, Statement,
};

const MAX_OBJECT_NAME_LENGTH: usize = 64;
const MAX_CHAR_LENGTH: u64 = 20;
const MAX_INDEX_COUNT: usize = 5;
const MAX_COMPOSITE_INDEX_COLUMNS: usize = 5;

/// An index the statement introduces
struct NewIndex<'a> {
    kind: ConstraintKind,
    name: Option<&'a str>,
    keys: Vec<&'a str>,
    /// Declared as a column option rather than a table constraint
    inline: bool,
}

fn created_table(statement: &Statement) -> Option<&CreateTable> {
    match statement {
        Statement::CreateTable(create) if create.like.is_none() => Some(create),
        _ => None,
    }
}

/// Columns the statement defines or redefines
fn new_columns(statement: &Statement) -> Vec<&ColumnDef> {
    match statement {
        Statement::CreateTable(create) => create.columns.iter().collect(),
        Statement::AlterTable(alter) => alter
            .specs
            .iter()
            .flat_map(|spec| match spec {
                AlterSpec::AddColumns { columns, .. } => columns.iter().collect(),
                AlterSpec::ChangeColumn { column, .. } | AlterSpec::ModifyColumn { column, .. } => {
                    vec![column]
                }
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Indexes and keys the statement adds, including column-level keys
fn new_indexes(statement: &Statement) -> Vec<NewIndex<'_>> {
    let mut out: Vec<NewIndex<'_>> = match statement {
        Statement::CreateTable(create) => create
            .constraints
            .iter()
            .map(|c| NewIndex {
                kind: c.kind,
                name: c.name.as_deref(),
                keys: c.key_names(),
                inline: false,
            })
            .collect(),
        Statement::AlterTable(alter) => alter
            .specs
            .iter()
            .filter_map(|spec| match spec {
                AlterSpec::AddConstraint(c) => Some(NewIndex {
                    kind: c.kind,
                    name: c.name.as_deref(),
                    keys: c.key_names(),
                    inline: false,
                }),
                _ => None,
            })
            .collect(),
        Statement::CreateIndex(index) => vec![NewIndex {
            kind: index.kind,
            name: Some(index.name.as_str()),
            keys: index.keys.iter().map(|k| k.column.as_str()).collect(),
            inline: false,
        }],
        _ => Vec::new(),
    };
    for column in new_columns(statement) {
        let kind = if column.is_primary_key() {
            ConstraintKind::PrimaryKey
        } else if column.is_unique() {
            ConstraintKind::Unique
        } else {
            continue;
        };
        out.push(NewIndex {
            kind,
            name: None,
            keys: vec![column.name.as_str()],
            inline: true,
        });
    }
    out
}

/// Names the statement gives to new objects, in table, column, index order
fn new_object_names(statement: &Statement) -> Vec<&str> {
    let mut names = Vec::new();
    match statement {
        Statement::CreateDatabase(db) => names.push(db.name.as_str()),
        Statement::CreateTable(create) => names.push(create.name.name.as_str()),
        Statement::AlterTable(alter) => {
            names.extend(alter.renamed_to().map(|n| n.name.as_str()));
        }
        _ => {}
    }
    names.extend(new_columns(statement).into_iter().map(|c| c.name.as_str()));
    names.extend(new_indexes(statement).into_iter().filter_map(|i| i.name));
    if let Statement::AlterTable(alter) = statement {
        for spec in &alter.specs {
            if let AlterSpec::RenameIndex { to, .. } = spec {
                names.push(to.as_str());
            }
        }
    }
    names
}

/// Column definition of `name` as the statement leaves the table
fn column_type_of<'a>(
    catalog: &'a Catalog,
    statement: &'a Statement,
    name: &str,
) -> Option<&'a ColumnDef> {
    if let Some(column) = new_columns(statement)
        .into_iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
    {
        return Some(column);
    }
    let table = match statement {
        Statement::AlterTable(alter) => &alter.name,
        Statement::CreateIndex(index) => &index.table,
        _ => return None,
    };
    catalog.table(table)?.merged()?.column(name)
}

fn is_null_literal(expr: &Expr) -> bool {
    matches!(expr.unparen(), Expr::Literal(Literal::Null))
}

pub fn check_table_without_if_not_exist(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(matches!(statement, Statement::CreateTable(c) if !c.if_not_exists))
}

pub fn check_object_name_length(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(
        new_object_names(statement)
            .iter()
            .any(|name| name.len() > MAX_OBJECT_NAME_LENGTH),
    )
}

pub fn check_object_name_using_keyword(_: &Catalog, statement: &Statement) -> Verdict {
    let mut keywords: Vec<String> = Vec::new();
    for name in new_object_names(statement) {
        if is_reserved(name) && !keywords.iter().any(|k| k == name) {
            keywords.push(name.to_string());
        }
    }
    if keywords.is_empty() {
        Verdict::Pass
    } else {
        Verdict::Violated(keywords)
    }
}

pub fn check_pk_not_exist(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(created_table(statement).is_some_and(|t| t.primary_key().is_none()))
}

/// Primary key columns of a new table that are actually declared
fn declared_pk_columns(create: &CreateTable) -> Vec<&ColumnDef> {
    create
        .primary_key()
        .unwrap_or_default()
        .iter()
        .filter_map(|name| create.column(name))
        .collect()
}

pub fn check_pk_without_auto_increment(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(created_table(statement).is_some_and(|t| {
        declared_pk_columns(t)
            .iter()
            .any(|c| !c.is_auto_increment())
    }))
}

pub fn check_pk_without_bigint_unsigned(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(created_table(statement).is_some_and(|t| {
        declared_pk_columns(t)
            .iter()
            .any(|c| c.data_type.name != "bigint" || !c.data_type.unsigned)
    }))
}

pub fn check_column_char_length(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(new_columns(statement).iter().any(|c| {
        c.data_type.name == "char" && c.data_type.length().is_some_and(|l| l > MAX_CHAR_LENGTH)
    }))
}

pub fn disable_fk(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(
        new_indexes(statement)
            .iter()
            .any(|i| i.kind == ConstraintKind::ForeignKey),
    )
}

fn is_secondary_index(kind: ConstraintKind) -> bool {
    matches!(
        kind,
        ConstraintKind::Index | ConstraintKind::Unique | ConstraintKind::Fulltext
    )
}

pub fn check_index_count(catalog: &Catalog, statement: &Statement) -> Verdict {
    let existing = match statement {
        Statement::CreateTable(create) if create.like.is_none() => 0,
        Statement::AlterTable(alter) => catalog
            .table(&alter.name)
            .and_then(|t| t.merged())
            .map_or(0, |t| t.constraints.iter().filter(|c| c.is_index()).count()),
        Statement::CreateIndex(index) => catalog
            .table(&index.table)
            .and_then(|t| t.merged())
            .map_or(0, |t| t.constraints.iter().filter(|c| c.is_index()).count()),
        _ => return Verdict::Pass,
    };
    let added = new_indexes(statement)
        .iter()
        .filter(|i| is_secondary_index(i.kind) && !i.inline)
        .count();
    Verdict::when(existing + added > MAX_INDEX_COUNT)
}

pub fn check_composite_index_max(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(new_indexes(statement).iter().any(|i| {
        i.kind != ConstraintKind::ForeignKey && i.keys.len() > MAX_COMPOSITE_INDEX_COLUMNS
    }))
}

pub fn check_table_without_innodb_utf8mb4(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(created_table(statement).is_some_and(|t| {
        !t.engine().is_some_and(|e| e.eq_ignore_ascii_case("innodb"))
            || !t.charset().is_some_and(|c| c.eq_ignore_ascii_case("utf8mb4"))
    }))
}

pub fn check_index_column_with_blob(catalog: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(new_indexes(statement).iter().any(|index| {
        index.kind != ConstraintKind::ForeignKey
            && index.keys.iter().any(|key| {
                column_type_of(catalog, statement, key).is_some_and(|c| c.data_type.is_blob())
            })
    }))
}

pub fn check_alter_table_need_merge(catalog: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(matches!(statement, Statement::AlterTable(alter)
        if catalog.table(&alter.name).is_some_and(|t| !t.alters().is_empty())))
}

pub fn disable_drop_statement(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(matches!(
        statement,
        Statement::DropTable(_) | Statement::DropDatabase(_)
    ))
}

pub fn check_table_without_comment(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(created_table(statement).is_some_and(|t| t.comment().is_none()))
}

pub fn check_column_without_comment(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(new_columns(statement).iter().any(|c| c.comment().is_none()))
}

fn has_prefix(name: &str, prefix: &str) -> bool {
    name.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

pub fn check_index_prefix(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(new_indexes(statement).iter().any(|i| {
        matches!(i.kind, ConstraintKind::Index | ConstraintKind::Fulltext)
            && i.name.is_some_and(|n| !has_prefix(n, "idx_"))
    }))
}

pub fn check_unique_index_prefix(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(new_indexes(statement).iter().any(|i| {
        i.kind == ConstraintKind::Unique && i.name.is_some_and(|n| !has_prefix(n, "uniq_"))
    }))
}

pub fn check_column_without_default(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(new_columns(statement).iter().any(|c| {
        !c.is_auto_increment() && !c.data_type.is_blob() && c.default_value().is_none()
    }))
}

pub fn check_column_timestamp_without_default(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(
        new_columns(statement)
            .iter()
            .any(|c| c.data_type.is_timestamp() && c.default_value().is_none()),
    )
}

pub fn check_column_blob_with_not_null(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(
        new_columns(statement)
            .iter()
            .any(|c| c.data_type.is_blob() && c.is_not_null()),
    )
}

pub fn check_column_blob_default_is_not_null(_: &Catalog, statement: &Statement) -> Verdict {
    Verdict::when(new_columns(statement).iter().any(|c| {
        c.data_type.is_blob() && c.default_value().is_some_and(|d| !is_null_literal(d))
    }))
}
