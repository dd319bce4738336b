// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Data Definition Statements
//!
//! Table, index and database definitions. `Display` renders each node in
//! the canonical form used for rollback statements:
//!
//! ```sql
//! `v1` varchar(255) NOT NULL DEFAULT "v1" COMMENT "unit test"
//! ADD UNIQUE INDEX `uniq_1` (`v1`,`v2`)
//! ALTER TABLE `exist_db`.`exist_tb_1`
//! DROP COLUMN `v3`
//! ```
//!
//! String defaults and comments inside definitions are rendered with double
//! quotes, everything else follows [`Expr`]'s rendering.

use crate::expr::{Expr, Literal, write_list};
use crate::name::{ObjectName, quote_ident};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column data type as written, e.g. `int(10) unsigned`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    /// Lower-cased type name
    pub name: String,
    /// Length/precision arguments or enum members, as rendered text
    pub args: Vec<String>,
    pub unsigned: bool,
    pub zerofill: bool,
    pub charset: Option<String>,
    pub collate: Option<String>,
}

impl DataType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_lowercase(),
            args: Vec::new(),
            unsigned: false,
            zerofill: false,
            charset: None,
            collate: None,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unsigned(mut self) -> Self {
        self.unsigned = true;
        self
    }

    /// BLOB and TEXT family types
    pub fn is_blob(&self) -> bool {
        matches!(
            self.name.as_str(),
            "blob"
                | "tinyblob"
                | "mediumblob"
                | "longblob"
                | "text"
                | "tinytext"
                | "mediumtext"
                | "longtext"
        )
    }

    pub fn is_timestamp(&self) -> bool {
        self.name == "timestamp"
    }

    /// First numeric argument (`varchar(255)` -> 255)
    pub fn length(&self) -> Option<u64> {
        self.args.first().and_then(|a| a.trim().parse().ok())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "({})", self.args.join(","))?;
        }
        if self.unsigned {
            write!(f, " unsigned")?;
        }
        if self.zerofill {
            write!(f, " zerofill")?;
        }
        if let Some(charset) = &self.charset {
            write!(f, " CHARACTER SET {}", charset)?;
        }
        if let Some(collate) = &self.collate {
            write!(f, " COLLATE {}", collate)?;
        }
        Ok(())
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
    pub options: Vec<ColumnOption>,
}

/// Column-level option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnOption {
    NotNull,
    Null,
    Default(Expr),
    AutoIncrement,
    PrimaryKey,
    UniqueKey,
    Comment(String),
    OnUpdate(Expr),
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, option: ColumnOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn default_value(&self) -> Option<&Expr> {
        self.options.iter().find_map(|o| match o {
            ColumnOption::Default(expr) => Some(expr),
            _ => None,
        })
    }

    pub fn comment(&self) -> Option<&str> {
        self.options.iter().find_map(|o| match o {
            ColumnOption::Comment(c) => Some(c.as_str()),
            _ => None,
        })
    }

    pub fn is_not_null(&self) -> bool {
        self.options.contains(&ColumnOption::NotNull)
    }

    pub fn is_auto_increment(&self) -> bool {
        self.options.contains(&ColumnOption::AutoIncrement)
    }

    pub fn is_primary_key(&self) -> bool {
        self.options.contains(&ColumnOption::PrimaryKey)
    }

    pub fn is_unique(&self) -> bool {
        self.options.contains(&ColumnOption::UniqueKey)
    }

    /// Replace the DEFAULT option, removing it when `value` is `None`
    pub fn set_default(&mut self, value: Option<Expr>) {
        let Some(value) = value else {
            self.options.retain(|o| !matches!(o, ColumnOption::Default(_)));
            return;
        };
        match self
            .options
            .iter_mut()
            .find(|o| matches!(o, ColumnOption::Default(_)))
        {
            Some(option) => *option = ColumnOption::Default(value),
            None => self.options.push(ColumnOption::Default(value)),
        }
    }
}

impl fmt::Display for ColumnDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", quote_ident(&self.name), self.data_type)?;
        for option in &self.options {
            write!(f, " {}", option)?;
        }
        Ok(())
    }
}

impl fmt::Display for ColumnOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnOption::NotNull => write!(f, "NOT NULL"),
            ColumnOption::Null => write!(f, "NULL"),
            ColumnOption::Default(expr) => write!(f, "DEFAULT {}", DefinitionValue(expr)),
            ColumnOption::AutoIncrement => write!(f, "AUTO_INCREMENT"),
            ColumnOption::PrimaryKey => write!(f, "PRIMARY KEY"),
            ColumnOption::UniqueKey => write!(f, "UNIQUE KEY"),
            ColumnOption::Comment(c) => write!(f, "COMMENT {}", double_quoted(c)),
            ColumnOption::OnUpdate(expr) => write!(f, "ON UPDATE {}", expr),
        }
    }
}

/// Renders string literals with double quotes, anything else as-is
pub(crate) struct DefinitionValue<'a>(pub &'a Expr);

impl fmt::Display for DefinitionValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Expr::Literal(Literal::String(s)) => write!(f, "{}", double_quoted(s)),
            other => write!(f, "{}", other),
        }
    }
}

fn double_quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Position clause of ADD/CHANGE/MODIFY COLUMN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnPosition {
    First,
    After(String),
}

impl fmt::Display for ColumnPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnPosition::First => write!(f, "FIRST"),
            ColumnPosition::After(col) => write!(f, "AFTER {}", quote_ident(col)),
        }
    }
}

/// Kind of table constraint / index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    PrimaryKey,
    Index,
    Unique,
    Fulltext,
    ForeignKey,
}

/// Index key part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub column: String,
    /// Prefix length (`col(10)`)
    pub length: Option<u64>,
}

impl IndexColumn {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            length: None,
        }
    }
}

impl fmt::Display for IndexColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_ident(&self.column))?;
        if let Some(len) = self.length {
            write!(f, "({})", len)?;
        }
        Ok(())
    }
}

/// Index algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    BTree,
    Hash,
}

/// Trailing index options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    pub using: Option<IndexType>,
    pub comment: Option<String>,
}

impl fmt::Display for IndexOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.using {
            Some(IndexType::BTree) => write!(f, " USING BTREE")?,
            Some(IndexType::Hash) => write!(f, " USING HASH")?,
            None => {}
        }
        if let Some(comment) = &self.comment {
            write!(f, " COMMENT {}", double_quoted(comment))?;
        }
        Ok(())
    }
}

/// Foreign key `ON DELETE` / `ON UPDATE` action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceAction {
    Restrict,
    Cascade,
    SetNull,
    NoAction,
    SetDefault,
}

impl fmt::Display for ReferenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ReferenceAction::Restrict => "RESTRICT",
            ReferenceAction::Cascade => "CASCADE",
            ReferenceAction::SetNull => "SET NULL",
            ReferenceAction::NoAction => "NO ACTION",
            ReferenceAction::SetDefault => "SET DEFAULT",
        };
        write!(f, "{}", text)
    }
}

/// `REFERENCES tbl (cols) [ON DELETE ..] [ON UPDATE ..]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub table: ObjectName,
    pub columns: Vec<String>,
    pub on_delete: Option<ReferenceAction>,
    pub on_update: Option<ReferenceAction>,
}

/// Table-level constraint or index definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub name: Option<String>,
    pub keys: Vec<IndexColumn>,
    pub options: IndexOptions,
    pub reference: Option<ForeignKeyRef>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, keys: Vec<IndexColumn>) -> Self {
        Self {
            kind,
            name: None,
            keys,
            options: IndexOptions::default(),
            reference: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Plain, unique and fulltext indexes
    pub fn is_index(&self) -> bool {
        matches!(
            self.kind,
            ConstraintKind::Index | ConstraintKind::Unique | ConstraintKind::Fulltext
        )
    }

    pub fn key_names(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.column.as_str()).collect()
    }

    pub fn name_is(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|n| n.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .name
            .as_deref()
            .map(|n| format!(" {}", quote_ident(n)))
            .unwrap_or_default();
        match self.kind {
            ConstraintKind::PrimaryKey => write!(f, "PRIMARY KEY")?,
            ConstraintKind::Index => write!(f, "INDEX{}", name)?,
            ConstraintKind::Unique => write!(f, "UNIQUE INDEX{}", name)?,
            ConstraintKind::Fulltext => write!(f, "FULLTEXT INDEX{}", name)?,
            ConstraintKind::ForeignKey => {
                if let Some(n) = &self.name {
                    write!(f, "CONSTRAINT {} ", quote_ident(n))?;
                }
                write!(f, "FOREIGN KEY")?;
            }
        }
        write!(f, " (")?;
        write_list(f, &self.keys, ",")?;
        write!(f, ")")?;
        if let Some(reference) = &self.reference {
            let cols: Vec<String> = reference.columns.iter().map(|c| quote_ident(c)).collect();
            write!(f, " REFERENCES {} ({})", reference.table, cols.join(","))?;
            if let Some(action) = reference.on_delete {
                write!(f, " ON DELETE {}", action)?;
            }
            if let Some(action) = reference.on_update {
                write!(f, " ON UPDATE {}", action)?;
            }
        }
        write!(f, "{}", self.options)
    }
}

/// Table option following the column list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableOption {
    Engine(String),
    Charset(String),
    Collate(String),
    AutoIncrement(u64),
    Comment(String),
    RowFormat(String),
}

impl TableOption {
    fn same_kind(&self, other: &TableOption) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for TableOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableOption::Engine(v) => write!(f, "ENGINE={}", v),
            TableOption::Charset(v) => write!(f, "DEFAULT CHARSET={}", v),
            TableOption::Collate(v) => write!(f, "COLLATE={}", v),
            TableOption::AutoIncrement(v) => write!(f, "AUTO_INCREMENT={}", v),
            TableOption::Comment(v) => write!(f, "COMMENT={}", double_quoted(v)),
            TableOption::RowFormat(v) => write!(f, "ROW_FORMAT={}", v),
        }
    }
}

/// CREATE TABLE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTable {
    pub name: ObjectName,
    pub if_not_exists: bool,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<Constraint>,
    pub options: Vec<TableOption>,
    /// `CREATE TABLE t LIKE other`
    pub like: Option<ObjectName>,
}

impl CreateTable {
    pub fn new(name: ObjectName) -> Self {
        Self {
            name,
            if_not_exists: false,
            columns: Vec::new(),
            constraints: Vec::new(),
            options: Vec::new(),
            like: None,
        }
    }

    /// Column by case-insensitive name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Primary key columns, from a table constraint or a column option
    pub fn primary_key(&self) -> Option<Vec<String>> {
        if let Some(pk) = self
            .constraints
            .iter()
            .find(|c| c.kind == ConstraintKind::PrimaryKey)
        {
            return Some(pk.keys.iter().map(|k| k.column.clone()).collect());
        }
        let cols: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.is_primary_key())
            .map(|c| c.name.clone())
            .collect();
        if cols.is_empty() { None } else { Some(cols) }
    }

    /// Named index or constraint by case-insensitive name
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name_is(name))
    }

    pub fn option<'a, T>(&'a self, pick: impl Fn(&'a TableOption) -> Option<T>) -> Option<T> {
        self.options.iter().find_map(pick)
    }

    pub fn engine(&self) -> Option<&str> {
        self.option(|o| match o {
            TableOption::Engine(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn charset(&self) -> Option<&str> {
        self.option(|o| match o {
            TableOption::Charset(v) => Some(v.as_str()),
            _ => None,
        })
    }

    pub fn comment(&self) -> Option<&str> {
        self.option(|o| match o {
            TableOption::Comment(v) => Some(v.as_str()),
            _ => None,
        })
    }

    /// Set an option, replacing any existing option of the same kind
    pub fn set_option(&mut self, option: TableOption) {
        match self.options.iter_mut().find(|o| o.same_kind(&option)) {
            Some(existing) => *existing = option,
            None => self.options.push(option),
        }
    }
}

impl fmt::Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TABLE ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(like) = &self.like {
            return write!(f, " LIKE {}", like);
        }
        write!(f, " (\n")?;
        let defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| c.to_string())
            .chain(self.constraints.iter().map(|c| c.to_string()))
            .map(|d| format!("  {}", d))
            .collect();
        write!(f, "{}\n)", defs.join(",\n"))?;
        for option in &self.options {
            write!(f, " {}", option)?;
        }
        Ok(())
    }
}

/// Target default of `ALTER COLUMN`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlterColumnDefault {
    Set(Expr),
    Drop,
}

/// One specification of an ALTER TABLE statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AlterSpec {
    AddColumns {
        columns: Vec<ColumnDef>,
        position: Option<ColumnPosition>,
    },
    DropColumn {
        name: String,
    },
    ChangeColumn {
        old_name: String,
        column: ColumnDef,
        position: Option<ColumnPosition>,
    },
    ModifyColumn {
        column: ColumnDef,
        position: Option<ColumnPosition>,
    },
    AlterColumn {
        name: String,
        default: AlterColumnDefault,
    },
    RenameTable {
        new_name: ObjectName,
    },
    AddConstraint(Constraint),
    DropIndex {
        name: String,
    },
    DropPrimaryKey,
    DropForeignKey {
        name: String,
    },
    RenameIndex {
        from: String,
        to: String,
    },
    TableOptions(Vec<TableOption>),
}

impl fmt::Display for AlterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlterSpec::AddColumns { columns, position } => {
                if columns.len() == 1 {
                    write!(f, "ADD COLUMN {}", columns[0])?;
                } else {
                    write!(f, "ADD COLUMN (")?;
                    write_list(f, columns, ", ")?;
                    write!(f, ")")?;
                }
                if let Some(position) = position {
                    write!(f, " {}", position)?;
                }
                Ok(())
            }
            AlterSpec::DropColumn { name } => write!(f, "DROP COLUMN {}", quote_ident(name)),
            AlterSpec::ChangeColumn {
                old_name,
                column,
                position,
            } => {
                write!(f, "CHANGE COLUMN {} {}", quote_ident(old_name), column)?;
                if let Some(position) = position {
                    write!(f, " {}", position)?;
                }
                Ok(())
            }
            AlterSpec::ModifyColumn { column, position } => {
                write!(f, "MODIFY COLUMN {}", column)?;
                if let Some(position) = position {
                    write!(f, " {}", position)?;
                }
                Ok(())
            }
            AlterSpec::AlterColumn { name, default } => match default {
                AlterColumnDefault::Set(expr) => write!(
                    f,
                    "ALTER COLUMN {} SET DEFAULT {}",
                    quote_ident(name),
                    DefinitionValue(expr)
                ),
                AlterColumnDefault::Drop => {
                    write!(f, "ALTER COLUMN {} DROP DEFAULT", quote_ident(name))
                }
            },
            AlterSpec::RenameTable { new_name } => write!(f, "RENAME AS {}", new_name),
            AlterSpec::AddConstraint(constraint) => write!(f, "ADD {}", constraint),
            AlterSpec::DropIndex { name } => write!(f, "DROP INDEX {}", quote_ident(name)),
            AlterSpec::DropPrimaryKey => write!(f, "DROP PRIMARY KEY"),
            AlterSpec::DropForeignKey { name } => {
                write!(f, "DROP FOREIGN KEY {}", quote_ident(name))
            }
            AlterSpec::RenameIndex { from, to } => write!(
                f,
                "RENAME INDEX {} TO {}",
                quote_ident(from),
                quote_ident(to)
            ),
            AlterSpec::TableOptions(options) => write_list(f, options, " "),
        }
    }
}

/// ALTER TABLE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterTable {
    pub name: ObjectName,
    pub specs: Vec<AlterSpec>,
}

impl AlterTable {
    /// The target name after a `RENAME` spec, if any
    pub fn renamed_to(&self) -> Option<&ObjectName> {
        self.specs.iter().rev().find_map(|s| match s {
            AlterSpec::RenameTable { new_name } => Some(new_name),
            _ => None,
        })
    }
}

impl fmt::Display for AlterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ALTER TABLE {}\n", self.name)?;
        write_list(f, &self.specs, ",\n")
    }
}

/// CREATE [UNIQUE|FULLTEXT] INDEX
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndex {
    pub name: String,
    pub table: ObjectName,
    /// `Index`, `Unique` or `Fulltext`
    pub kind: ConstraintKind,
    pub keys: Vec<IndexColumn>,
    pub options: IndexOptions,
}

impl fmt::Display for CreateIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ConstraintKind::Unique => "UNIQUE ",
            ConstraintKind::Fulltext => "FULLTEXT ",
            _ => "",
        };
        write!(
            f,
            "CREATE {}INDEX {} ON {} (",
            kind,
            quote_ident(&self.name),
            self.table
        )?;
        write_list(f, &self.keys, ",")?;
        write!(f, "){}", self.options)
    }
}

/// DROP INDEX name ON table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropIndex {
    pub name: String,
    pub table: ObjectName,
    pub if_exists: bool,
}

impl fmt::Display for DropIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DROP INDEX ")?;
        if self.if_exists {
            write!(f, "IF EXISTS ")?;
        }
        write!(f, "{} ON {}", quote_ident(&self.name), self.table)
    }
}

/// CREATE DATABASE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDatabase {
    pub name: String,
    pub if_not_exists: bool,
    pub charset: Option<String>,
    pub collate: Option<String>,
}

impl fmt::Display for CreateDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE DATABASE ")?;
        if self.if_not_exists {
            write!(f, "IF NOT EXISTS ")?;
        }
        write!(f, "{}", quote_ident(&self.name))?;
        if let Some(charset) = &self.charset {
            write!(f, " DEFAULT CHARACTER SET {}", charset)?;
        }
        if let Some(collate) = &self.collate {
            write!(f, " COLLATE {}", collate)?;
        }
        Ok(())
    }
}

/// DROP DATABASE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropDatabase {
    pub name: String,
    pub if_exists: bool,
}

impl fmt::Display for DropDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DROP DATABASE ")?;
        if self.if_exists {
            write!(f, "IF EXISTS ")?;
        }
        write!(f, "{}", quote_ident(&self.name))
    }
}

/// DROP TABLE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropTable {
    pub tables: Vec<ObjectName>,
    pub if_exists: bool,
}

impl fmt::Display for DropTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DROP TABLE ")?;
        if self.if_exists {
            write!(f, "IF EXISTS ")?;
        }
        write_list(f, &self.tables, ", ")
    }
}
