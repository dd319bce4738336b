// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Rollback generation against the `exist_db` fixture schema

use sqlreview_advisor::Task;
use sqlreview_ir::Statement;
use sqlreview_rollback::{RollbackConfig, RollbackError, generate_rollback, rollback_statement};
use sqlreview_test_utils::{MockExecutor, exist_db_executor, exist_db_session, row};

const TB1: &str = "`exist_db`.`exist_tb_1`";

async fn rollback_with(executor: MockExecutor, sql: &str, config: RollbackConfig) -> Option<String> {
    let (mut session, _) = exist_db_session(executor);
    let statement = sqlreview_lowering::parse_one(sql).unwrap();
    session.prepare(&statement).await.unwrap();
    rollback_statement(&mut session, &statement, &config)
        .await
        .unwrap()
}

async fn rollback_of(sql: &str) -> Option<String> {
    rollback_with(exist_db_executor().build(), sql, RollbackConfig::default()).await
}

fn alter_rollback(table: &str, specs: &[&str]) -> Option<String> {
    Some(format!("ALTER TABLE `exist_db`.`{}`\n{};", table, specs.join(",\n")))
}

#[tokio::test]
async fn test_alter_table_rollback() {
    let cases: Vec<(&str, Option<String>)> = vec![
        (
            "ALTER TABLE exist_db.exist_tb_1 DROP COLUMN v1",
            alter_rollback(
                "exist_tb_1",
                &["ADD COLUMN `v1` varchar(255) NOT NULL DEFAULT \"v1\" COMMENT \"unit test\" AFTER `id`"],
            ),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 ADD COLUMN v3 varchar(255) DEFAULT NULL COMMENT \"unit test\"",
            alter_rollback("exist_tb_1", &["DROP COLUMN `v3`"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 RENAME AS exist_tb_4",
            alter_rollback("exist_tb_4", &["RENAME AS `exist_db`.`exist_tb_1`"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 CHANGE COLUMN v1 v3 varchar(30) NOT NULL COMMENT \"unit test\"",
            alter_rollback(
                "exist_tb_1",
                &["CHANGE COLUMN `v3` `v1` varchar(255) NOT NULL DEFAULT \"v1\" COMMENT \"unit test\""],
            ),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 MODIFY COLUMN v1 varchar(30) NOT NULL COMMENT \"unit test\"",
            alter_rollback(
                "exist_tb_1",
                &["MODIFY COLUMN `v1` varchar(255) NOT NULL DEFAULT \"v1\" COMMENT \"unit test\""],
            ),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 ALTER COLUMN v1 DROP DEFAULT",
            alter_rollback("exist_tb_1", &["ALTER COLUMN `v1` SET DEFAULT \"v1\""]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 ALTER COLUMN v1 SET DEFAULT \"test\"",
            alter_rollback("exist_tb_1", &["ALTER COLUMN `v1` SET DEFAULT \"v1\""]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 ALTER COLUMN v2 SET DEFAULT \"test\"",
            alter_rollback("exist_tb_1", &["ALTER COLUMN `v2` DROP DEFAULT"]),
        ),
        ("ALTER TABLE exist_db.exist_tb_1 ALTER COLUMN v2 DROP DEFAULT", None),
        (
            "ALTER TABLE exist_db.exist_tb_1 ADD INDEX idx_2(v1)",
            alter_rollback("exist_tb_1", &["DROP INDEX `idx_2`"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 ADD KEY idx_2(v1)",
            alter_rollback("exist_tb_1", &["DROP INDEX `idx_2`"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 DROP INDEX idx_1",
            alter_rollback("exist_tb_1", &["ADD INDEX `idx_1` (`v1`)"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 DROP INDEX uniq_1",
            alter_rollback("exist_tb_1", &["ADD UNIQUE INDEX `uniq_1` (`v1`,`v2`)"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 ADD UNIQUE INDEX uniq_2(v1,v2)",
            alter_rollback("exist_tb_1", &["DROP INDEX `uniq_2`"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 ADD PRIMARY KEY (id) USING BTREE",
            alter_rollback("exist_tb_1", &["DROP PRIMARY KEY"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 DROP PRIMARY KEY",
            alter_rollback("exist_tb_1", &["ADD PRIMARY KEY (`id`) USING BTREE"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 ADD FOREIGN KEY pk_1 (user_id) REFERENCES exist_db.exist_tb_2 (id) ON DELETE NO ACTION",
            alter_rollback("exist_tb_1", &["DROP FOREIGN KEY `pk_1`"]),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_2 DROP FOREIGN KEY pk_test_1",
            alter_rollback(
                "exist_tb_2",
                &["ADD CONSTRAINT `pk_test_1` FOREIGN KEY (`user_id`) REFERENCES `exist_db`.`exist_tb_1` (`id`) ON DELETE NO ACTION"],
            ),
        ),
        (
            "ALTER TABLE exist_db.exist_tb_1 RENAME INDEX old_name TO new_name",
            alter_rollback("exist_tb_1", &["RENAME INDEX `new_name` TO `old_name`"]),
        ),
        ("ALTER TABLE exist_db.not_exist_tb_1 ADD COLUMN v3 int", None),
    ];
    for (sql, expected) in cases {
        assert_eq!(rollback_of(sql).await, expected, "{}", sql);
    }
}

#[tokio::test]
async fn test_alter_rollback_reparses() {
    let rollback = rollback_of(
        "ALTER TABLE exist_db.exist_tb_1 DROP COLUMN v2, ADD COLUMN v3 int, DROP INDEX idx_1",
    )
    .await
    .unwrap();
    match sqlreview_lowering::parse_one(&rollback).unwrap() {
        Statement::AlterTable(alter) => assert_eq!(alter.specs.len(), 3),
        other => panic!("expected ALTER TABLE, found {:?}", other),
    }
}

#[tokio::test]
async fn test_create_rollback() {
    assert_eq!(
        rollback_of("create database new_db").await.as_deref(),
        Some("DROP DATABASE IF EXISTS `new_db`")
    );
    assert_eq!(rollback_of("create database exist_db").await, None);

    assert_eq!(
        rollback_of("create table t1 (id int)").await.as_deref(),
        Some("DROP TABLE IF EXISTS `exist_db`.`t1`")
    );
    assert_eq!(rollback_of("create table if not exists exist_tb_1 (id int)").await, None);
    assert_eq!(rollback_of("create table not_exist_db.t1 (id int)").await, None);

    assert_eq!(
        rollback_of("create index idx_2 on exist_tb_1 (v2)").await.as_deref(),
        Some("DROP INDEX `idx_2` ON `exist_db`.`exist_tb_1`")
    );
}

#[tokio::test]
async fn test_drop_rollback() {
    let rollback = rollback_of("drop table exist_db.exist_tb_3, exist_db.not_exist_tb_1")
        .await
        .unwrap();
    assert!(rollback.starts_with("CREATE TABLE `exist_db`.`exist_tb_3` (\n"));
    assert!(rollback.ends_with(";\n"));
    let statements = sqlreview_lowering::parse_sql(&rollback).unwrap();
    match &statements[..] {
        [Statement::CreateTable(table)] => {
            assert_eq!(table.column_names(), vec!["id", "v1", "v2"]);
        }
        other => panic!("expected one CREATE TABLE, found {:?}", other),
    }

    assert_eq!(
        rollback_of("drop index uniq_1 on exist_tb_1").await.as_deref(),
        Some("CREATE UNIQUE INDEX `uniq_1` ON `exist_db`.`exist_tb_1` (`v1`,`v2`)")
    );
    assert_eq!(
        rollback_of("drop index idx_1 on exist_db.exist_tb_1").await.as_deref(),
        Some("CREATE INDEX `idx_1` ON `exist_db`.`exist_tb_1` (`v1`)")
    );
    assert_eq!(rollback_of("drop index not_exist_idx on exist_tb_1").await, None);
}

#[tokio::test]
async fn test_insert_rollback() {
    let two_rows = format!(
        "DELETE FROM {} WHERE `id` = '10';\nDELETE FROM {} WHERE `id` = '11';\n",
        TB1, TB1
    );
    assert_eq!(
        rollback_of("INSERT INTO exist_db.exist_tb_1 (id,v1,v2) values (10,\"v1\",\"v2\"),(11,\"v1\",\"v2\")")
            .await,
        Some(two_rows.clone())
    );
    assert_eq!(
        rollback_of("INSERT INTO exist_db.exist_tb_1 values (10,\"v1\",\"v2\"),(11,\"v1\",\"v2\")").await,
        Some(two_rows)
    );
    assert_eq!(
        rollback_of("INSERT INTO exist_db.exist_tb_1 set id=10,v1=\"v1\",v2=\"v2\"").await,
        Some(format!("DELETE FROM {} WHERE `id` = '10';\n", TB1))
    );
}

#[tokio::test]
async fn test_insert_without_safe_rollback() {
    let cases = [
        // no primary key
        "INSERT INTO exist_db.exist_tb_3 (id,v1,v2) values (1,'a','b')",
        "INSERT INTO exist_db.exist_tb_1 (id,v1,v2) values (1,'a','b') ON DUPLICATE KEY UPDATE v1 = 'c'",
        // arity mismatch
        "INSERT INTO exist_db.exist_tb_1 (id,v1) values (1,'a','b')",
        // primary key not supplied
        "INSERT INTO exist_db.exist_tb_1 (v1,v2) values ('a','b')",
        "INSERT INTO exist_db.not_exist_tb_1 (id) values (1)",
    ];
    for sql in cases {
        assert_eq!(rollback_of(sql).await, None, "{}", sql);
    }

    let capped = rollback_with(
        exist_db_executor().build(),
        "INSERT INTO exist_db.exist_tb_1 (id,v1,v2) values (1,'a','b'),(2,'a','b')",
        RollbackConfig::default().with_max_rows(1),
    )
    .await;
    assert_eq!(capped, None);
}

#[tokio::test]
async fn test_delete_rollback_restores_rows() {
    let executor = exist_db_executor()
        .with_query(
            "SELECT count(*) as count FROM `exist_db`.`exist_tb_1` WHERE v1 = 'v1' LIMIT 1001",
            vec![row(&[("count", Some("2"))])],
        )
        .with_query(
            "SELECT * FROM `exist_db`.`exist_tb_1` WHERE v1 = 'v1' LIMIT 1001",
            vec![
                row(&[("id", Some("1")), ("v1", Some("v1")), ("v2", None)]),
                row(&[("id", Some("2")), ("v1", Some("v1")), ("v2", Some("it's"))]),
            ],
        )
        .build();
    let rollback = rollback_with(
        executor,
        "delete from exist_db.exist_tb_1 where v1 = 'v1'",
        RollbackConfig::default(),
    )
    .await;
    assert_eq!(
        rollback,
        Some(format!(
            "INSERT INTO {} (`id`, `v1`, `v2`) VALUES ('1', 'v1', NULL), ('2', 'v1', 'it''s');",
            TB1
        ))
    );
}

#[tokio::test]
async fn test_delete_over_row_cap_has_no_rollback() {
    let executor = exist_db_executor()
        .with_query(
            "SELECT count(*) as count FROM `exist_db`.`exist_tb_1` WHERE id > 0 LIMIT 1001",
            vec![row(&[("count", Some("2000"))])],
        )
        .build();
    let (mut session, executor) = exist_db_session(executor);
    let statement = sqlreview_lowering::parse_one("delete from exist_tb_1 where id > 0").unwrap();
    session.prepare(&statement).await.unwrap();
    let rollback = rollback_statement(&mut session, &statement, &RollbackConfig::default())
        .await
        .unwrap();
    assert_eq!(rollback, None);
    assert_eq!(executor.call_count("SELECT *"), 0);
}

#[tokio::test]
async fn test_statement_limit_within_cap_skips_count() {
    let executor = exist_db_executor()
        .with_query(
            "SELECT * FROM `exist_db`.`exist_tb_1` WHERE id > 0 ORDER BY id DESC LIMIT 1",
            vec![row(&[("id", Some("7")), ("v1", Some("a")), ("v2", Some("b"))])],
        )
        .build();
    let (mut session, executor) = exist_db_session(executor);
    let statement =
        sqlreview_lowering::parse_one("delete from exist_tb_1 where id > 0 order by id desc limit 1")
            .unwrap();
    session.prepare(&statement).await.unwrap();
    let rollback = rollback_statement(&mut session, &statement, &RollbackConfig::default())
        .await
        .unwrap();
    assert_eq!(
        rollback,
        Some(format!("INSERT INTO {} (`id`, `v1`, `v2`) VALUES ('7', 'a', 'b');", TB1))
    );
    assert_eq!(executor.call_count("SELECT count"), 0);
}

#[tokio::test]
async fn test_unexpected_count_is_an_error() {
    let (mut session, _) = exist_db_session(exist_db_executor().build());
    let statement = sqlreview_lowering::parse_one("delete from exist_tb_1 where id = 1").unwrap();
    session.prepare(&statement).await.unwrap();
    let err = rollback_statement(&mut session, &statement, &RollbackConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RollbackError::RecordCount(_)));
}

#[tokio::test]
async fn test_update_rollback_restores_assigned_columns() {
    let executor = exist_db_executor()
        .with_query(
            "SELECT count(*) as count FROM `exist_db`.`exist_tb_1` AS `t` WHERE t.v2 = 'v2' LIMIT 1001",
            vec![row(&[("count", Some("2"))])],
        )
        .with_query(
            "SELECT * FROM `exist_db`.`exist_tb_1` AS `t` WHERE t.v2 = 'v2' LIMIT 1001",
            vec![
                row(&[("id", Some("1")), ("v1", Some("a")), ("v2", Some("v2"))]),
                row(&[("id", Some("2")), ("v1", None), ("v2", Some("v2"))]),
            ],
        )
        .build();
    let rollback = rollback_with(
        executor,
        "update exist_tb_1 as t set t.v1 = 'x' where t.v2 = 'v2'",
        RollbackConfig::default(),
    )
    .await;
    assert_eq!(
        rollback,
        Some(format!(
            "UPDATE {tb} SET `v1` = 'a' WHERE `id` = '1';\nUPDATE {tb} SET `v1` = NULL WHERE `id` = '2';\n",
            tb = TB1
        ))
    );
}

#[tokio::test]
async fn test_update_rollback_pins_new_key_value() {
    let executor = exist_db_executor()
        .with_query(
            "SELECT count(*) as count FROM `exist_db`.`exist_tb_1` AS `t` WHERE t.id = 1 LIMIT 1001",
            vec![row(&[("count", Some("1"))])],
        )
        .with_query(
            "SELECT * FROM `exist_db`.`exist_tb_1` AS `t` WHERE t.id = 1 LIMIT 1001",
            vec![row(&[("id", Some("1")), ("v1", Some("a")), ("v2", Some("v2"))])],
        )
        .build();
    let rollback = rollback_with(
        executor,
        "update exist_tb_1 as t set t.id = 100, t.v1 = 'x' where t.id = 1",
        RollbackConfig::default(),
    )
    .await;
    assert_eq!(
        rollback,
        Some(format!(
            "UPDATE {} SET `id` = '1', `v1` = 'a' WHERE `id` = '100';\n",
            TB1
        ))
    );
}

#[tokio::test]
async fn test_update_key_to_expression_has_no_rollback() {
    let (mut session, executor) = exist_db_session(exist_db_executor().build());
    let statement =
        sqlreview_lowering::parse_one("update exist_tb_1 set id = id + 1 where v1 = 'a'").unwrap();
    session.prepare(&statement).await.unwrap();
    let rollback = rollback_statement(&mut session, &statement, &RollbackConfig::default())
        .await
        .unwrap();
    assert_eq!(rollback, None);
    assert_eq!(executor.call_count("SELECT"), 0);
}

#[tokio::test]
async fn test_limit_zero_has_no_rollback() {
    let (mut session, executor) = exist_db_session(exist_db_executor().build());
    for sql in [
        "delete from exist_tb_1 where v1 = 'a' limit 0",
        "update exist_tb_1 set v1 = 'b' where v1 = 'a' limit 0",
    ] {
        let statement = sqlreview_lowering::parse_one(sql).unwrap();
        session.prepare(&statement).await.unwrap();
        let rollback = rollback_statement(&mut session, &statement, &RollbackConfig::default())
            .await
            .unwrap();
        assert_eq!(rollback, None, "{}", sql);
    }
    assert_eq!(executor.call_count("SELECT"), 0);
}

#[tokio::test]
async fn test_multi_table_dml_has_no_rollback() {
    let cases = [
        "update exist_tb_1, exist_tb_2 set exist_tb_1.v1 = 'x' where exist_tb_1.id = exist_tb_2.id",
        "delete exist_tb_1 from exist_tb_1 join exist_tb_2 on exist_tb_1.id = exist_tb_2.id where exist_tb_2.v1 = 'a'",
    ];
    for sql in cases {
        assert_eq!(rollback_of(sql).await, None, "{}", sql);
    }
}

#[tokio::test]
async fn test_generate_rollback_tracks_batch_changes() {
    let (mut session, executor) = exist_db_session(exist_db_executor().build());
    let task = Task::from_batch(
        "1",
        "exist_db",
        "alter table exist_tb_1 add column v3 int; \
         alter table exist_tb_1 drop column v3; \
         insert into exist_tb_1 (id, v1, v2) values (5, 'a', 'b');",
    );
    let rollbacks = generate_rollback(&mut session, &task, &RollbackConfig::default())
        .await
        .unwrap();
    let contents: Vec<&str> = rollbacks.iter().map(|r| r.sql.content.as_str()).collect();
    assert_eq!(
        contents,
        vec![
            "DELETE FROM `exist_db`.`exist_tb_1` WHERE `id` = '5';\n",
            "ALTER TABLE `exist_db`.`exist_tb_1`\nADD COLUMN `v3` int AFTER `v2`;",
            "ALTER TABLE `exist_db`.`exist_tb_1`\nDROP COLUMN `v3`;",
        ]
    );
    assert!(rollbacks.iter().all(|r| r.sql.parse_error.is_none()));
    assert_eq!(executor.call_count("SHOW CREATE TABLE"), 1);
}
