// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Lazily populated catalog
//!
//! A [`Session`] pairs a [`Catalog`] with the [`Executor`] it is seeded from.
//! The first reference to any schema fetches the schema list, the first
//! reference to a table fetches its schema's table list, and the first deep
//! reference to a table fetches its `SHOW CREATE TABLE` definition. Each fetch
//! happens at most once per session.

use crate::catalog::Catalog;
use crate::error::{CatalogError, CatalogResult};
use crate::executor::{Executor, ExplainRecord, row_value};
use sqlreview_ir::{AlterSpec, CreateTable, Literal, ObjectName, Statement, quote_ident};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Session {
    catalog: Catalog,
    executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(executor: Arc<dyn Executor>, catalog: Catalog) -> Self {
        Self { catalog, executor }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    pub fn executor(&self) -> &Arc<dyn Executor> {
        &self.executor
    }

    /// Fork the catalog; the executor is shared
    pub fn fork(&self) -> Self {
        Self {
            catalog: self.catalog.fork(),
            executor: self.executor.clone(),
        }
    }

    async fn ensure_schemas_loaded(&mut self) -> CatalogResult<()> {
        if self.catalog.schemas_loaded() {
            return Ok(());
        }
        let schemas = self.executor.show_databases().await?;
        debug!(count = schemas.len(), "loaded schema list");
        self.catalog.load_schemas(schemas);
        Ok(())
    }

    pub async fn is_schema_exist(&mut self, schema: &str) -> CatalogResult<bool> {
        self.ensure_schemas_loaded().await?;
        Ok(self.catalog.has_schema(schema))
    }

    pub async fn is_table_exist(&mut self, name: &ObjectName) -> CatalogResult<bool> {
        let schema = self.catalog.schema_of(name).to_string();
        if !self.is_schema_exist(&schema).await? {
            return Ok(false);
        }
        if !self.catalog.tables_loaded(&schema) {
            let tables = self.executor.show_tables(&schema).await?;
            debug!(schema = %schema, count = tables.len(), "loaded table list");
            self.catalog.load_tables(&schema, tables);
        }
        Ok(self.catalog.has_table(name))
    }

    /// Definition as fetched from the live database (or created in this batch)
    pub async fn original_table_of(
        &mut self,
        name: &ObjectName,
    ) -> CatalogResult<Option<Arc<CreateTable>>> {
        if !self.load_definition(name).await? {
            return Ok(None);
        }
        Ok(self.catalog.table(name).and_then(|t| t.original().cloned()))
    }

    /// Definition with every ALTER of this batch applied
    pub async fn create_table_of(
        &mut self,
        name: &ObjectName,
    ) -> CatalogResult<Option<Arc<CreateTable>>> {
        if !self.load_definition(name).await? {
            return Ok(None);
        }
        Ok(self.catalog.table(name).and_then(|t| t.merged().cloned()))
    }

    /// Fetch the definition of an existing table; false if the table does not exist
    async fn load_definition(&mut self, name: &ObjectName) -> CatalogResult<bool> {
        if !self.is_table_exist(name).await? {
            return Ok(false);
        }
        let needs_fetch = self
            .catalog
            .table(name)
            .is_some_and(|t| t.is_from_database() && !t.has_definition());
        if needs_fetch {
            let resolved = self.catalog.resolve(name);
            let text = self.executor.show_create_table(&resolved).await?;
            let mut table = parse_create_table(&resolved, &text)?;
            if table.name.schema.is_none() {
                table.name.schema = resolved.schema.clone();
            }
            debug!(table = %resolved, "loaded table definition");
            if let Some(info) = self.catalog.table_mut(name) {
                info.set_original(table);
            }
        }
        Ok(true)
    }

    /// Approximate row count from `SHOW TABLE STATUS`, cached per table
    pub async fn table_row_count(&mut self, name: &ObjectName) -> CatalogResult<u64> {
        if !self.is_table_exist(name).await? {
            let schema = self.catalog.schema_of(name).to_string();
            return Err(CatalogError::TableNotFound(name.name.clone(), schema));
        }
        if let Some(rows) = self.catalog.table(name).and_then(|t| t.row_count()) {
            return Ok(rows);
        }
        let schema = self.catalog.schema_of(name).to_string();
        let sql = format!(
            "SHOW TABLE STATUS FROM {} LIKE {}",
            quote_ident(&schema),
            Literal::String(name.name.clone())
        );
        let rows = self.executor.query(&sql, &[]).await?;
        let count = rows
            .iter()
            .find(|row| row_value(row, "Name").is_some_and(|n| n.eq_ignore_ascii_case(&name.name)))
            .or(rows.first())
            .and_then(|row| row_value(row, "Rows"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if let Some(info) = self.catalog.table_mut(name) {
            info.set_row_count(count);
        }
        Ok(count)
    }

    /// `EXPLAIN` of a query, cached per statement text
    pub async fn explain(&mut self, sql: &str) -> CatalogResult<Vec<ExplainRecord>> {
        if let Some(plan) = self.catalog.execution_plan(sql) {
            return Ok(plan.to_vec());
        }
        let plan = self.executor.explain(sql).await?;
        self.catalog.add_execution_plan(sql, plan.clone());
        Ok(plan)
    }

    /// Load everything `statement` references so checks can run against the
    /// catalog synchronously
    pub async fn prepare(&mut self, statement: &Statement) -> CatalogResult<()> {
        match statement {
            Statement::Use(schema) => {
                self.is_schema_exist(schema).await?;
            }
            Statement::CreateDatabase(db) => {
                self.is_schema_exist(&db.name).await?;
            }
            Statement::DropDatabase(db) => {
                self.is_schema_exist(&db.name).await?;
            }
            Statement::AlterTable(alter) => {
                self.create_table_of(&alter.name).await?;
                for spec in &alter.specs {
                    if let AlterSpec::RenameTable { new_name } = spec {
                        let target = match new_name.schema {
                            Some(_) => new_name.clone(),
                            None => ObjectName {
                                schema: Some(self.catalog.schema_of(&alter.name).to_string()),
                                name: new_name.name.clone(),
                            },
                        };
                        self.is_table_exist(&target).await?;
                    }
                }
            }
            other => {
                self.ensure_schemas_loaded().await?;
                for name in other.table_refs() {
                    self.create_table_of(&name).await?;
                }
            }
        }
        Ok(())
    }

    /// Apply the schema effect of `statement` to the catalog
    pub fn apply(&mut self, statement: &Statement) {
        self.catalog.apply_ddl(statement);
    }
}

fn parse_create_table(name: &ObjectName, text: &str) -> CatalogResult<CreateTable> {
    match sqlreview_lowering::parse_one(text) {
        Ok(Statement::CreateTable(table)) => Ok(*table),
        Ok(other) => Err(CatalogError::InvalidDefinition(
            name.plain(),
            format!("expected CREATE TABLE, got {}", other.tag()),
        )),
        Err(e) => Err(CatalogError::InvalidDefinition(name.plain(), e.to_string())),
    }
}
