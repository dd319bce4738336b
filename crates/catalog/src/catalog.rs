// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Virtual catalog
//!
//! The in-memory mirror of schemas and tables that statements are checked
//! against. It mutates in lock-step with the statements of a batch through
//! [`Catalog::apply_ddl`] and never touches the live database itself; lazy
//! population is driven by [`Session`](crate::Session).
//!
//! ## Loading model
//!
//! ```text
//! schemas_loaded = false   → nothing known, ask the live database
//! schema.tables = None     → schema known, table list not fetched
//! TableInfo::listed()      → table known, definition not fetched
//! ```
//!
//! Forking is a plain `Clone`: maps are copied and table definitions are
//! shared behind `Arc`, so a fork shares no mutable state with its parent.

use crate::executor::ExplainRecord;
use crate::table::TableInfo;
use sqlreview_ir::{ObjectName, Statement};
use std::collections::HashMap;
use tracing::debug;

/// One schema; `tables` is `None` until the table list is loaded
#[derive(Debug, Clone, Default)]
pub struct SchemaInfo {
    tables: Option<HashMap<String, TableInfo>>,
}

impl SchemaInfo {
    /// A schema whose table list is known to be empty
    fn empty() -> Self {
        Self {
            tables: Some(HashMap::new()),
        }
    }

    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .tables
            .iter()
            .flat_map(|t| t.keys().map(String::as_str))
            .collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    current_schema: String,
    schemas: HashMap<String, SchemaInfo>,
    schemas_loaded: bool,
    execution_plans: HashMap<String, Vec<ExplainRecord>>,
}

/// Table keys are case-insensitive
fn table_key(name: &str) -> String {
    name.to_lowercase()
}

impl Catalog {
    pub fn new(current_schema: impl Into<String>) -> Self {
        Self {
            current_schema: current_schema.into(),
            ..Default::default()
        }
    }

    /// Independent copy for hypothetical validation
    pub fn fork(&self) -> Self {
        self.clone()
    }

    pub fn current_schema(&self) -> &str {
        &self.current_schema
    }

    pub fn use_schema(&mut self, schema: impl Into<String>) {
        self.current_schema = schema.into();
    }

    /// Schema of `name`, falling back to the current schema
    pub fn schema_of<'a>(&'a self, name: &'a ObjectName) -> &'a str {
        name.schema_or(&self.current_schema)
    }

    /// `name` qualified with the current schema when unqualified
    pub fn resolve(&self, name: &ObjectName) -> ObjectName {
        name.resolve(&self.current_schema)
    }

    pub fn schemas_loaded(&self) -> bool {
        self.schemas_loaded
    }

    /// Register the live schema list; no-op once loaded
    pub fn load_schemas<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.schemas_loaded {
            return;
        }
        for name in names {
            self.schemas.entry(name.into()).or_default();
        }
        self.schemas_loaded = true;
    }

    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn schema(&self, name: &str) -> Option<&SchemaInfo> {
        self.schemas.get(name)
    }

    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Add a schema created in this batch; its table list is empty
    pub fn add_schema(&mut self, name: impl Into<String>) {
        self.schemas.entry(name.into()).or_insert_with(SchemaInfo::empty);
    }

    pub fn del_schema(&mut self, name: &str) {
        self.schemas.remove(name);
    }

    pub fn tables_loaded(&self, schema: &str) -> bool {
        self.schemas
            .get(schema)
            .is_some_and(|s| s.tables.is_some())
    }

    /// Register the live table list of `schema`; no-op once loaded
    pub fn load_tables<I, S>(&mut self, schema: &str, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(info) = self.schemas.get_mut(schema) else {
            return;
        };
        if info.tables.is_some() {
            return;
        }
        info.tables = Some(
            names
                .into_iter()
                .map(|n| (table_key(n.as_ref()), TableInfo::listed()))
                .collect(),
        );
    }

    pub fn table(&self, name: &ObjectName) -> Option<&TableInfo> {
        let schema = self.schema_of(name);
        self.schemas
            .get(schema)?
            .tables
            .as_ref()?
            .get(&table_key(&name.name))
    }

    pub fn table_mut(&mut self, name: &ObjectName) -> Option<&mut TableInfo> {
        let schema = name.schema_or(&self.current_schema).to_string();
        self.schemas
            .get_mut(&schema)?
            .tables
            .as_mut()?
            .get_mut(&table_key(&name.name))
    }

    pub fn has_table(&self, name: &ObjectName) -> bool {
        self.table(name).is_some()
    }

    /// Add a table; ignored unless the schema and its table list are loaded
    pub fn add_table(&mut self, name: &ObjectName, table: TableInfo) {
        let schema = name.schema_or(&self.current_schema).to_string();
        if let Some(tables) = self
            .schemas
            .get_mut(&schema)
            .and_then(|s| s.tables.as_mut())
        {
            tables.insert(table_key(&name.name), table);
        }
    }

    pub fn del_table(&mut self, name: &ObjectName) -> Option<TableInfo> {
        let schema = name.schema_or(&self.current_schema).to_string();
        self.schemas
            .get_mut(&schema)?
            .tables
            .as_mut()?
            .remove(&table_key(&name.name))
    }

    pub fn execution_plan(&self, sql: &str) -> Option<&[ExplainRecord]> {
        self.execution_plans.get(sql).map(Vec::as_slice)
    }

    pub fn add_execution_plan(&mut self, sql: impl Into<String>, plan: Vec<ExplainRecord>) {
        self.execution_plans.insert(sql.into(), plan);
    }

    /// Apply the schema effect of `statement`
    ///
    /// DML and queries leave the catalog unchanged.
    pub fn apply_ddl(&mut self, statement: &Statement) {
        match statement {
            Statement::Use(schema) => {
                if self.has_schema(schema) {
                    self.use_schema(schema.clone());
                }
            }
            Statement::CreateDatabase(db) => {
                if self.schemas_loaded {
                    self.add_schema(db.name.clone());
                }
            }
            Statement::DropDatabase(db) => {
                if self.schemas_loaded {
                    self.del_schema(&db.name);
                }
            }
            Statement::CreateTable(create) => {
                if self.has_table(&create.name) {
                    return;
                }
                let mut table = create.as_ref().clone();
                if let Some(like) = &create.like {
                    match self.table(like).and_then(|t| t.merged()) {
                        Some(source) => {
                            let mut copied = source.as_ref().clone();
                            copied.name = create.name.clone();
                            copied.if_not_exists = create.if_not_exists;
                            table = copied;
                        }
                        None => debug!(table = %like, "LIKE source has no definition"),
                    }
                }
                self.add_table(&create.name, TableInfo::created(table));
            }
            Statement::DropTable(drop) => {
                if self.schemas_loaded {
                    for name in &drop.tables {
                        self.del_table(name);
                    }
                }
            }
            Statement::AlterTable(alter) => {
                let Some(mut info) = self.del_table(&alter.name) else {
                    return;
                };
                info.apply_alter(alter.clone());
                let target = match alter.renamed_to() {
                    Some(new_name) => match new_name.schema {
                        Some(_) => new_name.clone(),
                        None => ObjectName {
                            schema: Some(self.schema_of(&alter.name).to_string()),
                            name: new_name.name.clone(),
                        },
                    },
                    None => alter.name.clone(),
                };
                if alter.renamed_to().is_some() {
                    debug!(from = %alter.name, to = %target, "table renamed");
                }
                self.add_table(&target, info);
            }
            Statement::CreateIndex(_)
            | Statement::DropIndex(_)
            | Statement::Insert(_)
            | Statement::Update(_)
            | Statement::Delete(_)
            | Statement::Select(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlreview_lowering::parse_one;

    fn loaded_catalog() -> Catalog {
        let mut catalog = Catalog::new("exist_db");
        catalog.load_schemas(["exist_db", "mysql"]);
        catalog.load_tables("exist_db", ["exist_tb_1"]);
        let table = match parse_one("create table exist_db.exist_tb_1 (id int, v1 int, primary key (id))").unwrap() {
            Statement::CreateTable(t) => *t,
            _ => unreachable!(),
        };
        catalog
            .table_mut(&ObjectName::new("exist_tb_1"))
            .unwrap()
            .set_original(table);
        catalog
    }

    fn apply(catalog: &mut Catalog, sql: &str) {
        catalog.apply_ddl(&parse_one(sql).unwrap());
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut catalog = loaded_catalog();
        catalog.load_schemas(["other"]);
        assert!(!catalog.has_schema("other"));
        catalog.load_tables("exist_db", ["exist_tb_9"]);
        assert!(!catalog.has_table(&ObjectName::new("exist_tb_9")));
        assert!(catalog.has_table(&ObjectName::new("EXIST_TB_1")));
    }

    #[test]
    fn test_create_and_drop_database() {
        let mut catalog = Catalog::new("");
        apply(&mut catalog, "create database db1");
        assert!(!catalog.has_schema("db1"), "unloaded catalog ignores CREATE DATABASE");

        let mut catalog = loaded_catalog();
        apply(&mut catalog, "create database db1");
        assert!(catalog.has_schema("db1"));
        assert!(catalog.tables_loaded("db1"));
        apply(&mut catalog, "use db1");
        assert_eq!(catalog.current_schema(), "db1");
        apply(&mut catalog, "drop database db1");
        assert!(!catalog.has_schema("db1"));
        apply(&mut catalog, "use db1");
        assert_eq!(catalog.current_schema(), "db1");
    }

    #[test]
    fn test_create_table_and_like() {
        let mut catalog = loaded_catalog();
        apply(&mut catalog, "create table t2 (id int)");
        let t2 = catalog.table(&ObjectName::new("t2")).unwrap();
        assert_eq!(t2.row_count(), Some(0));
        assert!(!t2.is_from_database());

        apply(&mut catalog, "create table t3 like exist_tb_1");
        let t3 = catalog.table(&ObjectName::new("t3")).unwrap();
        let merged = t3.merged().unwrap();
        assert_eq!(merged.name.name, "t3");
        assert_eq!(merged.column_names(), vec!["id", "v1"]);
    }

    #[test]
    fn test_alter_with_rename_moves_entry() {
        let mut catalog = loaded_catalog();
        apply(&mut catalog, "alter table exist_tb_1 add column v2 int, rename to exist_tb_9");
        assert!(!catalog.has_table(&ObjectName::new("exist_tb_1")));
        let moved = catalog
            .table(&ObjectName::new("exist_tb_9").with_schema("exist_db"))
            .unwrap();
        assert_eq!(moved.alters().len(), 1);
        assert_eq!(moved.merged().unwrap().columns.len(), 3);
        assert_eq!(moved.original().unwrap().columns.len(), 2);
    }

    #[test]
    fn test_fork_is_independent() {
        let mut parent = loaded_catalog();
        let mut fork = parent.fork();
        apply(&mut fork, "drop table exist_tb_1");
        apply(&mut fork, "create database db2");
        assert!(parent.has_table(&ObjectName::new("exist_tb_1")));
        assert!(!parent.has_schema("db2"));

        apply(&mut parent, "alter table exist_tb_1 drop column v1");
        assert!(!fork.has_table(&ObjectName::new("exist_tb_1")));
    }
}
