// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: the `exist_db` schema and sample statements
//!
//! `exist_db` holds three tables:
//!
//! ```text
//! exist_tb_1  id (pk, auto_increment), v1, v2; KEY idx_1 (v1), UNIQUE KEY uniq_1 (v1, v2)
//! exist_tb_2  id, v1, v2, user_id; UNIQUE KEY uniq_1 (id), FK pk_test_1 -> exist_tb_1 (id)
//! exist_tb_3  id, v1, v2; no keys
//! ```
//!
//! Each reports a single row through `SHOW TABLE STATUS`.

use crate::mock_executor::{MockExecutor, MockExecutorBuilder};
use sqlreview_catalog::{Catalog, Session};
use std::sync::Arc;

/// Name of the fixture schema
pub const EXIST_DB: &str = "exist_db";

/// Sample SQL for testing
pub struct SqlFixtures;

impl SqlFixtures {
    // ===== exist_db definitions, as `SHOW CREATE TABLE` returns them =====

    pub const fn exist_tb_1() -> &'static str {
        "CREATE TABLE `exist_tb_1` (
id int(10) unsigned NOT NULL AUTO_INCREMENT COMMENT \"unit test\",
v1 varchar(255) NOT NULL DEFAULT \"v1\" COMMENT \"unit test\",
v2 varchar(255) COMMENT \"unit test\",
PRIMARY KEY (id) USING BTREE,
KEY idx_1 (v1),
UNIQUE KEY uniq_1 (v1,v2)
)ENGINE=InnoDB AUTO_INCREMENT=3 DEFAULT CHARSET=utf8mb4 COMMENT=\"unit test\""
    }

    pub const fn exist_tb_2() -> &'static str {
        "CREATE TABLE `exist_tb_2` (
id bigint unsigned NOT NULL AUTO_INCREMENT COMMENT \"unit test\",
v1 varchar(255) NOT NULL COMMENT \"unit test\",
v2 varchar(255) COMMENT \"unit test\",
user_id bigint unsigned NOT NULL COMMENT \"unit test\",
UNIQUE KEY uniq_1(id),
CONSTRAINT pk_test_1 FOREIGN KEY (user_id) REFERENCES exist_db.exist_tb_1 (id) ON DELETE NO ACTION
)ENGINE=InnoDB AUTO_INCREMENT=3 DEFAULT CHARSET=utf8mb4 COMMENT=\"unit test\""
    }

    pub const fn exist_tb_3() -> &'static str {
        "CREATE TABLE `exist_tb_3` (
id bigint unsigned NOT NULL AUTO_INCREMENT COMMENT \"unit test\",
v1 varchar(255) NOT NULL COMMENT \"unit test\",
v2 varchar(255) COMMENT \"unit test\"
)ENGINE=InnoDB AUTO_INCREMENT=3 DEFAULT CHARSET=utf8mb4 COMMENT=\"uint test\""
    }

    // ===== Statements against exist_db =====

    /// CREATE TABLE that passes every default rule
    pub const fn valid_create_table() -> &'static str {
        "CREATE TABLE if not exists exist_db.not_exist_tb_1 (
id bigint unsigned NOT NULL AUTO_INCREMENT COMMENT \"unit test\",
v1 varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\",
v2 varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\",
PRIMARY KEY (id)
)ENGINE=InnoDB AUTO_INCREMENT=3 DEFAULT CHARSET=utf8mb4 COMMENT=\"unit test\""
    }

    /// ALTER TABLE adding a column
    pub const fn valid_alter_table() -> &'static str {
        "ALTER TABLE exist_db.exist_tb_1 ADD COLUMN v3 varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\""
    }

    /// INSERT with an explicit column list
    pub const fn valid_insert() -> &'static str {
        "INSERT INTO exist_db.exist_tb_1 (id,v1,v2) VALUES (1,\"1\",\"1\")"
    }

    /// UPDATE with a WHERE clause
    pub const fn valid_update() -> &'static str {
        "UPDATE exist_db.exist_tb_1 SET v1=\"2\" WHERE id=1"
    }

    /// DELETE with a WHERE clause
    pub const fn valid_delete() -> &'static str {
        "DELETE FROM exist_db.exist_tb_1 WHERE id=1"
    }
}

/// Builder preloaded with `exist_db`; add scripted queries before `build()`
pub fn exist_db_executor() -> MockExecutorBuilder {
    MockExecutor::builder()
        .with_table(EXIST_DB, "exist_tb_1", SqlFixtures::exist_tb_1())
        .with_table(EXIST_DB, "exist_tb_2", SqlFixtures::exist_tb_2())
        .with_table(EXIST_DB, "exist_tb_3", SqlFixtures::exist_tb_3())
        .with_row_count(EXIST_DB, "exist_tb_1", 1)
        .with_row_count(EXIST_DB, "exist_tb_2", 1)
        .with_row_count(EXIST_DB, "exist_tb_3", 1)
}

/// Session over `exist_db` with it as the current schema
pub fn exist_db_session(executor: MockExecutor) -> (Session, Arc<MockExecutor>) {
    let executor = Arc::new(executor);
    let session = Session::new(executor.clone(), Catalog::new(EXIST_DB));
    (session, executor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlreview_ir::{ConstraintKind, Statement};

    fn parse_table(sql: &str) -> sqlreview_ir::CreateTable {
        match sqlreview_lowering::parse_one(sql).unwrap() {
            Statement::CreateTable(table) => *table,
            other => panic!("expected CREATE TABLE, found {:?}", other),
        }
    }

    #[test]
    fn test_fixture_definitions_parse() {
        let tb1 = parse_table(SqlFixtures::exist_tb_1());
        assert_eq!(tb1.column_names(), vec!["id", "v1", "v2"]);
        assert_eq!(tb1.primary_key(), Some(vec!["id".to_string()]));

        let tb2 = parse_table(SqlFixtures::exist_tb_2());
        assert!(tb2.constraints.iter().any(|c| c.kind == ConstraintKind::ForeignKey));

        let tb3 = parse_table(SqlFixtures::exist_tb_3());
        assert!(tb3.primary_key().is_none());
    }

    #[test]
    fn test_fixture_statements_parse() {
        for sql in [
            SqlFixtures::valid_create_table(),
            SqlFixtures::valid_alter_table(),
            SqlFixtures::valid_insert(),
            SqlFixtures::valid_update(),
            SqlFixtures::valid_delete(),
        ] {
            assert!(sqlreview_lowering::parse_one(sql).is_ok(), "failed to parse {}", sql);
        }
    }

    #[tokio::test]
    async fn test_exist_db_session() {
        let (mut session, executor) = exist_db_session(exist_db_executor().build());
        let name = sqlreview_ir::ObjectName::new("exist_tb_1");
        assert!(session.is_table_exist(&name).await.unwrap());
        assert_eq!(session.table_row_count(&name).await.unwrap(), 1);
        assert_eq!(executor.call_count("SHOW DATABASES"), 1);
    }
}
