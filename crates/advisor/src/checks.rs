// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Existence and shape checks
//!
//! These checks always run and always report at `error`. They read the
//! catalog state as it stands before the statement is applied, so every
//! table the statement references must already be loaded (see
//! [`Session::prepare`](sqlreview_catalog::Session::prepare)).
//!
//! Name lists in messages are lowercased, deduplicated and joined with `,`.
//! Tables render as `schema.table`.

use crate::results::{InspectResults, RuleLevel};
use crate::rule::render_message;
use sqlreview_catalog::Catalog;
use sqlreview_ir::{
    AlterSpec, AlterTable, ConstraintKind, CreateIndex, CreateTable, Delete, DropIndex, DropTable,
    Insert, InsertSource, ObjectName, Statement, Update,
};
use std::collections::HashSet;

pub const SCHEMA_NOT_EXIST_MSG: &str = "schema %s 不存在";
pub const SCHEMA_EXIST_MSG: &str = "schema %s 已存在";
pub const TABLE_NOT_EXIST_MSG: &str = "表 %s 不存在";
pub const TABLE_EXIST_MSG: &str = "表 %s 已存在";
pub const COLUMN_NOT_EXIST_MSG: &str = "字段 %s 不存在";
pub const COLUMN_EXIST_MSG: &str = "字段 %s 已存在";
pub const COLUMN_IS_AMBIGUOUS_MSG: &str = "字段 %s 指代不明";
pub const INDEX_NOT_EXIST_MSG: &str = "索引 %s 不存在";
pub const INDEX_EXIST_MSG: &str = "索引 %s 已存在";
pub const DUPLICATE_COLUMN_MSG: &str = "字段名 %s 重复";
pub const DUPLICATE_INDEX_MSG: &str = "索引名 %s 重复";
pub const PRIMARY_KEY_MULTI_MSG: &str = "主键只能设置一个";
pub const KEY_COLUMN_NOT_EXIST_MSG: &str = "索引字段 %s 不存在";
pub const PRIMARY_KEY_EXIST_MSG: &str = "已经存在主键，不能再添加";
pub const PRIMARY_KEY_NOT_EXIST_MSG: &str = "当前没有主键，不能执行删除";
pub const NOT_MATCH_VALUES_AND_COLUMNS_MSG: &str = "指定的值列数与字段列数不匹配";

/// Run every existence check that applies to `statement`
pub fn check_statement(catalog: &Catalog, statement: &Statement) -> InspectResults {
    let mut results = InspectResults::new();
    let out = &mut results;
    match statement {
        Statement::Use(schema) => {
            if !catalog.has_schema(schema) {
                report(out, SCHEMA_NOT_EXIST_MSG, schema);
            }
        }
        Statement::CreateDatabase(db) => {
            if !db.if_not_exists && catalog.has_schema(&db.name) {
                report(out, SCHEMA_EXIST_MSG, &db.name);
            }
        }
        Statement::DropDatabase(db) => {
            if !db.if_exists && !catalog.has_schema(&db.name) {
                report(out, SCHEMA_NOT_EXIST_MSG, &db.name);
            }
        }
        Statement::CreateTable(create) => check_create_table(catalog, create, out),
        Statement::AlterTable(alter) => check_alter_table(catalog, alter, out),
        Statement::DropTable(drop) => check_drop_table(catalog, drop, out),
        Statement::CreateIndex(index) => check_create_index(catalog, index, out),
        Statement::DropIndex(index) => check_drop_index(catalog, index, out),
        Statement::Insert(insert) => check_insert(catalog, insert, out),
        Statement::Update(update) => check_update(catalog, update, out),
        Statement::Delete(delete) => check_delete(catalog, delete, out),
        Statement::Select(_) => {}
    }
    results
}

fn report(results: &mut InspectResults, template: &str, arg: &str) {
    results.add(RuleLevel::Error, render_message(template, &[arg.to_string()]));
}

fn report_names(results: &mut InspectResults, template: &str, names: &[String]) {
    if !names.is_empty() {
        report(results, template, &dedup(names).join(","));
    }
}

/// First occurrence of each name, in order
fn dedup(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect()
}

/// Names that occur more than once, each reported once
fn duplicates(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let repeated: Vec<String> = names
        .iter()
        .filter(|n| !seen.insert(n.as_str()))
        .cloned()
        .collect();
    dedup(&repeated)
}

fn table_display(catalog: &Catalog, name: &ObjectName) -> String {
    format!("{}.{}", catalog.schema_of(name), name.name)
}

/// Definition of an existing table, reporting a missing schema or table
fn existing_table<'c>(
    catalog: &'c Catalog,
    name: &ObjectName,
    results: &mut InspectResults,
) -> Option<&'c CreateTable> {
    let schema = catalog.schema_of(name);
    if !catalog.has_schema(schema) {
        report(results, SCHEMA_NOT_EXIST_MSG, schema);
        return None;
    }
    let Some(info) = catalog.table(name) else {
        report(results, TABLE_NOT_EXIST_MSG, &table_display(catalog, name));
        return None;
    };
    info.merged().map(|t| t.as_ref())
}

/// Report every missing schema, then every missing table; true if all exist
fn tables_exist<'n>(
    catalog: &Catalog,
    names: impl IntoIterator<Item = &'n ObjectName>,
    results: &mut InspectResults,
) -> bool {
    let mut schemas = Vec::new();
    let mut tables = Vec::new();
    for name in names {
        let schema = catalog.schema_of(name);
        if !catalog.has_schema(schema) {
            schemas.push(schema.to_string());
        } else if !catalog.has_table(name) {
            tables.push(table_display(catalog, name));
        }
    }
    report_names(results, SCHEMA_NOT_EXIST_MSG, &schemas);
    report_names(results, TABLE_NOT_EXIST_MSG, &tables);
    schemas.is_empty() && tables.is_empty()
}

fn lower(name: &str) -> String {
    name.to_lowercase()
}

fn check_create_table(catalog: &Catalog, create: &CreateTable, results: &mut InspectResults) {
    let schema = catalog.schema_of(&create.name);
    if !catalog.has_schema(schema) {
        report(results, SCHEMA_NOT_EXIST_MSG, schema);
    } else {
        if catalog.has_table(&create.name) && !create.if_not_exists {
            report(results, TABLE_EXIST_MSG, &table_display(catalog, &create.name));
        }
        if let Some(like) = &create.like {
            if !catalog.has_table(like) {
                report(results, TABLE_NOT_EXIST_MSG, &table_display(catalog, like));
            }
        }
    }

    let columns: Vec<String> = create.columns.iter().map(|c| lower(&c.name)).collect();
    let mut pk_count = create.columns.iter().filter(|c| c.is_primary_key()).count();
    let mut indexes = Vec::new();
    let mut key_columns = Vec::new();
    for constraint in &create.constraints {
        match constraint.kind {
            ConstraintKind::PrimaryKey => pk_count += 1,
            ConstraintKind::ForeignKey => continue,
            _ => indexes.extend(constraint.name.as_deref().map(lower)),
        }
        key_columns.extend(constraint.key_names().into_iter().map(lower));
    }

    report_names(results, DUPLICATE_COLUMN_MSG, &duplicates(&columns));
    report_names(results, DUPLICATE_INDEX_MSG, &duplicates(&indexes));
    if pk_count > 1 {
        results.add(RuleLevel::Error, PRIMARY_KEY_MULTI_MSG);
    }
    let missing: Vec<String> = key_columns
        .into_iter()
        .filter(|k| !columns.contains(k))
        .collect();
    report_names(results, KEY_COLUMN_NOT_EXIST_MSG, &missing);
}

fn check_alter_table(catalog: &Catalog, alter: &AlterTable, results: &mut InspectResults) {
    let Some(table) = existing_table(catalog, &alter.name, results) else {
        return;
    };

    let mut columns: HashSet<String> = table.columns.iter().map(|c| lower(&c.name)).collect();
    let mut indexes: HashSet<String> = table
        .constraints
        .iter()
        .filter(|c| c.kind != ConstraintKind::PrimaryKey)
        .filter_map(|c| c.name.as_deref().map(lower))
        .collect();
    let mut has_pk = table.primary_key().is_some();

    let mut need_exist_cols = Vec::new();
    let mut need_not_exist_cols = Vec::new();
    let mut need_exist_indexes = Vec::new();
    let mut need_not_exist_indexes = Vec::new();
    let mut need_exist_key_cols = Vec::new();

    // Specs are checked grouped by kind, not in statement order
    for spec in &alter.specs {
        if let AlterSpec::DropColumn { name } = spec {
            let name = lower(name);
            if !columns.remove(&name) {
                need_exist_cols.push(name);
            }
        }
    }
    for spec in &alter.specs {
        match spec {
            AlterSpec::ChangeColumn {
                old_name, column, ..
            } => {
                let old = lower(old_name);
                let new = lower(&column.name);
                if !columns.contains(&old) {
                    need_exist_cols.push(old.clone());
                }
                if new == old {
                    continue;
                }
                if columns.contains(&new) {
                    need_not_exist_cols.push(new);
                } else {
                    columns.remove(&old);
                    columns.insert(new);
                }
            }
            AlterSpec::ModifyColumn { column, .. } => {
                let name = lower(&column.name);
                if !columns.contains(&name) {
                    need_exist_cols.push(name);
                }
            }
            _ => {}
        }
    }
    for spec in &alter.specs {
        if let AlterSpec::AddColumns { columns: added, .. } = spec {
            for column in added {
                let name = lower(&column.name);
                if columns.contains(&name) {
                    need_not_exist_cols.push(name);
                    continue;
                }
                columns.insert(name);
                if column.is_primary_key() {
                    if has_pk {
                        results.add(RuleLevel::Error, PRIMARY_KEY_EXIST_MSG);
                    }
                    has_pk = true;
                }
            }
        }
    }
    for spec in &alter.specs {
        if let AlterSpec::AlterColumn { name, .. } = spec {
            let name = lower(name);
            if !columns.contains(&name) {
                need_exist_cols.push(name);
            }
        }
    }

    if alter.specs.contains(&AlterSpec::DropPrimaryKey) {
        if has_pk {
            has_pk = false;
        } else {
            results.add(RuleLevel::Error, PRIMARY_KEY_NOT_EXIST_MSG);
        }
    }
    for spec in &alter.specs {
        match spec {
            AlterSpec::DropIndex { name } | AlterSpec::DropForeignKey { name } => {
                let name = lower(name);
                if !indexes.remove(&name) {
                    need_exist_indexes.push(name);
                }
            }
            _ => {}
        }
    }
    for spec in &alter.specs {
        if let AlterSpec::RenameIndex { from, to } = spec {
            let (from, to) = (lower(from), lower(to));
            let from_exists = indexes.contains(&from);
            let to_exists = indexes.contains(&to);
            if !from_exists {
                need_exist_indexes.push(from.clone());
            }
            if to_exists {
                need_not_exist_indexes.push(to.clone());
            }
            if from_exists && !to_exists {
                indexes.remove(&from);
                indexes.insert(to);
            }
        }
    }
    for spec in &alter.specs {
        let AlterSpec::AddConstraint(constraint) = spec else {
            continue;
        };
        match constraint.kind {
            ConstraintKind::PrimaryKey => {
                if has_pk {
                    results.add(RuleLevel::Error, PRIMARY_KEY_EXIST_MSG);
                    continue;
                }
                has_pk = true;
            }
            _ => {
                if let Some(name) = constraint.name.as_deref().map(lower) {
                    if indexes.contains(&name) {
                        need_not_exist_indexes.push(name);
                    } else {
                        indexes.insert(name);
                    }
                }
            }
        }
        for key in constraint.key_names() {
            let key = lower(key);
            if !columns.contains(&key) {
                need_exist_key_cols.push(key);
            }
        }
    }

    report_names(results, COLUMN_NOT_EXIST_MSG, &need_exist_cols);
    report_names(results, COLUMN_EXIST_MSG, &need_not_exist_cols);
    report_names(results, INDEX_NOT_EXIST_MSG, &need_exist_indexes);
    report_names(results, INDEX_EXIST_MSG, &need_not_exist_indexes);
    report_names(results, KEY_COLUMN_NOT_EXIST_MSG, &need_exist_key_cols);
}

fn check_drop_table(catalog: &Catalog, drop: &DropTable, results: &mut InspectResults) {
    if drop.if_exists {
        return;
    }
    tables_exist(catalog, &drop.tables, results);
}

fn check_create_index(catalog: &Catalog, index: &CreateIndex, results: &mut InspectResults) {
    let Some(table) = existing_table(catalog, &index.table, results) else {
        return;
    };
    if table.constraint(&index.name).is_some() {
        report(results, INDEX_EXIST_MSG, &index.name);
    }
    let missing: Vec<String> = index
        .keys
        .iter()
        .filter(|k| table.column(&k.column).is_none())
        .map(|k| lower(&k.column))
        .collect();
    report_names(results, KEY_COLUMN_NOT_EXIST_MSG, &missing);
}

fn check_drop_index(catalog: &Catalog, index: &DropIndex, results: &mut InspectResults) {
    let Some(table) = existing_table(catalog, &index.table, results) else {
        return;
    };
    if table.constraint(&index.name).is_none() && !index.if_exists {
        report(results, INDEX_NOT_EXIST_MSG, &index.name);
    }
}

fn check_insert(catalog: &Catalog, insert: &Insert, results: &mut InspectResults) {
    let Some(table) = existing_table(catalog, &insert.table, results) else {
        return;
    };
    let columns: Vec<String> = if !insert.columns.is_empty() {
        insert.columns.iter().map(|c| lower(c)).collect()
    } else if let InsertSource::Set(assignments) = &insert.source {
        assignments.iter().map(|a| lower(&a.column.column)).collect()
    } else {
        table.columns.iter().map(|c| lower(&c.name)).collect()
    };

    report_names(results, DUPLICATE_COLUMN_MSG, &duplicates(&columns));
    let missing: Vec<String> = columns
        .iter()
        .filter(|c| table.column(c).is_none())
        .cloned()
        .collect();
    report_names(results, COLUMN_NOT_EXIST_MSG, &missing);

    if let InsertSource::Values(rows) = &insert.source {
        for row in rows {
            if row.len() != columns.len() {
                results.add(RuleLevel::Error, NOT_MATCH_VALUES_AND_COLUMNS_MSG);
            }
        }
    }
}

/// A table of a multi-table statement with its alias and definition
struct Scope<'a> {
    name: &'a ObjectName,
    alias: Option<&'a str>,
    table: &'a CreateTable,
}

impl Scope<'_> {
    fn answers_to(&self, qualifier: &str) -> bool {
        self.alias.is_some_and(|a| a.eq_ignore_ascii_case(qualifier))
            || self.name.name.eq_ignore_ascii_case(qualifier)
    }

    fn qualified(&self, column: &str) -> String {
        format!("{}.{}", self.name.name, lower(column))
    }
}

fn check_update(catalog: &Catalog, update: &Update, results: &mut InspectResults) {
    let targets = update.target_tables();
    if !tables_exist(catalog, targets.iter().map(|(n, _)| *n), results) {
        return;
    }
    let scopes: Vec<Scope<'_>> = targets
        .iter()
        .filter_map(|(name, alias)| {
            let table = catalog.table(name)?.merged()?;
            Some(Scope {
                name: *name,
                alias: *alias,
                table: table.as_ref(),
            })
        })
        .collect();
    if scopes.len() != targets.len() {
        return;
    }

    let mut set_columns = Vec::new();
    let mut missing = Vec::new();
    let mut ambiguous = Vec::new();

    if let [scope] = scopes.as_slice() {
        for assignment in &update.assignments {
            let col = &assignment.column;
            let name = lower(&col.column);
            set_columns.push(name.clone());
            let known = match &col.table {
                Some(q) => scope.answers_to(q) && scope.table.column(&name).is_some(),
                None => scope.table.column(&name).is_some(),
            };
            if !known {
                missing.push(match &col.table {
                    Some(q) if scope.answers_to(q) => scope.qualified(&name),
                    Some(q) => format!("{}.{}", q, name),
                    None => name,
                });
            }
        }
    } else {
        for assignment in &update.assignments {
            let col = &assignment.column;
            let name = lower(&col.column);
            match &col.table {
                Some(q) => match scopes.iter().find(|s| s.answers_to(q)) {
                    Some(scope) => {
                        if scope.table.column(&name).is_none() {
                            missing.push(scope.qualified(&name));
                        }
                        set_columns.push(scope.qualified(&name));
                    }
                    None => {
                        missing.push(format!("{}.{}", q, name));
                        set_columns.push(format!("{}.{}", q, name));
                    }
                },
                None => {
                    let owners: Vec<&Scope<'_>> = scopes
                        .iter()
                        .filter(|s| s.table.column(&name).is_some())
                        .collect();
                    match owners.as_slice() {
                        [] => missing.push(name.clone()),
                        [owner] => set_columns.push(owner.qualified(&name)),
                        _ => ambiguous.push(name.clone()),
                    }
                }
            }
        }
    }

    report_names(results, DUPLICATE_COLUMN_MSG, &duplicates(&set_columns));
    report_names(results, COLUMN_NOT_EXIST_MSG, &missing);
    report_names(results, COLUMN_IS_AMBIGUOUS_MSG, &ambiguous);
}

fn check_delete(catalog: &Catalog, delete: &Delete, results: &mut InspectResults) {
    let sources = delete.source_tables();
    if !tables_exist(catalog, sources.iter().map(|(n, _)| *n), results) {
        return;
    }
    // Multi-table targets name a source table or its alias
    let unknown: Vec<String> = delete
        .targets
        .iter()
        .filter(|target| {
            !sources.iter().any(|(name, alias)| {
                alias.is_some_and(|a| a.eq_ignore_ascii_case(&target.name))
                    || (name.name.eq_ignore_ascii_case(&target.name)
                        && catalog.schema_of(name) == catalog.schema_of(target))
            })
        })
        .map(|target| table_display(catalog, target))
        .collect();
    report_names(results, TABLE_NOT_EXIST_MSG, &unknown);
}
