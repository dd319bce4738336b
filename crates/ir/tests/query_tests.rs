// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Unit tests for IR statement representation

use sqlreview_ir::{
    Assignment, BinaryOp, ColumnRef, Delete, Expr, Insert, InsertSource, Join, JoinCondition,
    JoinType, Limit, ObjectName, OrderBy, SelectItem, SelectStatement, SortDirection, Statement,
    StatementKind, TableFactor, TableRef, Update,
};

fn table(name: &str) -> TableRef {
    TableRef::new(TableFactor::table(
        ObjectName::new(name).with_schema("exist_db"),
    ))
}

#[test]
fn test_select_display_with_clauses() {
    let select = SelectStatement {
        projection: vec![
            SelectItem::UnnamedExpr(Expr::column("id")),
            SelectItem::AliasedExpr {
                expr: Expr::column("v1"),
                alias: "value".to_string(),
            },
        ],
        from: vec![table("exist_tb_1")],
        where_clause: Some(Expr::binary(
            Expr::column("id"),
            BinaryOp::Gt,
            Expr::number("1"),
        )),
        order_by: vec![OrderBy {
            expr: Expr::column("id"),
            direction: Some(SortDirection::Desc),
        }],
        limit: Some(Limit {
            count: 10,
            offset: None,
        }),
        ..Default::default()
    };
    assert_eq!(
        select.to_string(),
        "SELECT id, v1 AS value FROM `exist_db`.`exist_tb_1` WHERE id > 1 ORDER BY id DESC LIMIT 10"
    );
}

#[test]
fn test_join_using_display() {
    let mut from = table("exist_tb_1");
    from.joins.push(Join {
        join_type: JoinType::Inner,
        relation: TableFactor::table(ObjectName::new("exist_tb_2").with_schema("exist_db")),
        condition: JoinCondition::Using(vec!["v1".to_string()]),
    });
    assert_eq!(
        from.to_string(),
        "`exist_db`.`exist_tb_1` JOIN `exist_db`.`exist_tb_2` USING (v1)"
    );
}

#[test]
fn test_insert_statement() {
    let insert = Insert {
        replace: false,
        ignore: false,
        table: ObjectName::new("exist_tb_1").with_schema("exist_db"),
        columns: vec!["id".to_string(), "v1".to_string()],
        source: InsertSource::Values(vec![
            vec![Expr::number("1"), Expr::string("a")],
            vec![Expr::number("2"), Expr::string("b")],
        ]),
        on_duplicate: Vec::new(),
    };
    assert_eq!(insert.row_count(), Some(2));
    let stmt = Statement::Insert(Box::new(insert));
    assert_eq!(stmt.kind(), StatementKind::Dml);
    assert_eq!(
        stmt.to_string(),
        "INSERT INTO `exist_db`.`exist_tb_1` (id, v1) VALUES (1, 'a'), (2, 'b')"
    );
}

#[test]
fn test_update_targets_and_display() {
    let update = Update {
        tables: vec![table("exist_tb_1")],
        assignments: vec![Assignment {
            column: ColumnRef::new("v1"),
            value: Expr::string("v1"),
        }],
        where_clause: Some(Expr::binary(
            Expr::column("id"),
            BinaryOp::Eq,
            Expr::number("1"),
        )),
        order_by: Vec::new(),
        limit: None,
    };
    assert_eq!(update.target_tables().len(), 1);
    assert_eq!(
        update.to_string(),
        "UPDATE `exist_db`.`exist_tb_1` SET v1 = 'v1' WHERE id = 1"
    );
}

#[test]
fn test_delete_multi_table_detection() {
    let single = Delete {
        targets: Vec::new(),
        from: vec![table("exist_tb_1")],
        where_clause: None,
        order_by: Vec::new(),
        limit: None,
    };
    assert!(!single.is_multi_table());

    let multi = Delete {
        targets: vec![ObjectName::new("exist_tb_1").with_schema("exist_db")],
        from: vec![table("exist_tb_1"), table("exist_tb_2")],
        ..single.clone()
    };
    assert!(multi.is_multi_table());
    assert_eq!(Statement::Delete(Box::new(multi)).table_refs().len(), 3);
}
