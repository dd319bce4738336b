// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! SQL-specific test helpers and custom assertions

use sqlreview_ir::{ConstraintKind, CreateTable, Expr, Literal};

/// Custom assertion helpers for SQL testing
pub struct SqlAssertions;

impl SqlAssertions {
    /// Assert that an expression is a column reference with the given name
    pub fn assert_column_ref(expr: &Expr, name: &str) {
        match expr {
            Expr::Column(col) => {
                assert_eq!(col.column, name, "Expected column '{}', found '{}'", name, col.column);
            }
            _ => panic!("Expected Column expression, found {:?}", expr),
        }
    }

    /// Assert that an expression is a numeric literal with the given text
    pub fn assert_literal_number(expr: &Expr, value: &str) {
        match expr {
            Expr::Literal(Literal::Number(v)) => {
                assert_eq!(v, value, "Expected number {}, found {}", value, v);
            }
            _ => panic!("Expected Number literal, found {:?}", expr),
        }
    }

    /// Assert that an expression is a literal string
    pub fn assert_literal_string(expr: &Expr, value: &str) {
        match expr {
            Expr::Literal(Literal::String(v)) => {
                assert_eq!(v, value, "Expected string '{}', found '{}'", value, v);
            }
            _ => panic!("Expected String literal, found {:?}", expr),
        }
    }

    /// Assert that a table has a column with the given type name and nullability
    pub fn assert_column(table: &CreateTable, name: &str, type_name: &str, not_null: bool) {
        let column = table
            .column(name)
            .unwrap_or_else(|| panic!("Table '{}' has no column '{}'", table.name, name));
        assert_eq!(column.data_type.name, type_name, "Column data type mismatch");
        assert_eq!(column.is_not_null(), not_null, "Column nullable mismatch");
    }

    /// Assert that the table's primary key is exactly `columns`
    pub fn assert_primary_key(table: &CreateTable, columns: &[&str]) {
        let pk = table
            .primary_key()
            .unwrap_or_else(|| panic!("Table '{}' has no primary key", table.name));
        assert_eq!(pk, columns, "Primary key mismatch");
    }

    /// Assert that the table has an index named `name` over `columns`
    pub fn assert_index(table: &CreateTable, name: &str, columns: &[&str]) {
        let index = table
            .constraint(name)
            .filter(|c| c.is_index())
            .unwrap_or_else(|| panic!("Table '{}' has no index '{}'", table.name, name));
        assert_eq!(index.key_names(), columns, "Index columns mismatch");
    }

    /// Assert that `column` is a foreign key referencing `ref_table (ref_column)`
    pub fn assert_foreign_key(table: &CreateTable, column: &str, ref_table: &str, ref_column: &str) {
        let fk = table
            .constraints
            .iter()
            .find(|c| c.kind == ConstraintKind::ForeignKey && c.key_names() == [column])
            .unwrap_or_else(|| panic!("Column '{}' is not a foreign key", column));
        let Some(reference) = &fk.reference else {
            panic!("Column '{}' has no reference information", column);
        };
        assert_eq!(reference.table.name, ref_table, "Foreign key references wrong table");
        assert_eq!(reference.columns, [ref_column], "Foreign key references wrong column");
    }
}
