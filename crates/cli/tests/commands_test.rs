// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Subcommands against the `exist_db` fixture schema

use sqlreview_advisor::{RuleLevel, RuleRegistry};
use sqlreview_catalog::{ExplainRecord, Executor};
use sqlreview_cli::{ConnectionConfig, ReviewConfig, commands};
use sqlreview_test_utils::exist_db_executor;
use std::sync::Arc;

fn executor() -> Arc<dyn Executor> {
    Arc::new(exist_db_executor().build())
}

#[tokio::test]
async fn test_review_reports_and_rolls_back() {
    let mut config = ReviewConfig::default();
    config
        .rules
        .push(sqlreview_advisor::RuleConfig::new("DDL_CHECK_OBJECT_NAME_LENGTH"));
    let batch = "create table exist_tb_9 (id int primary key comment 'id') comment 'tb';";
    let task = commands::review(executor(), "exist_db", batch, &config)
        .await
        .unwrap();

    assert_eq!(task.commit_sqls.len(), 1);
    assert_ne!(task.commit_sqls[0].inspect_level, RuleLevel::Error);
    assert_eq!(task.all_rollback_sql(), vec!["DROP TABLE IF EXISTS `exist_db`.`exist_tb_9`"]);
    assert_eq!(task.rollback_sqls[0].commit_number, 1);

    let report = commands::render_review(&task);
    assert!(report.starts_with("#1 ["));
    assert!(report.contains("-- #1 undoes #1\nDROP TABLE IF EXISTS `exist_db`.`exist_tb_9`\n"));
}

#[tokio::test]
async fn test_invalid_batch_has_no_rollback() {
    let batch = "create table exist_tb_9 (id int primary key comment 'id') comment 'tb';\n\
                 create table exist_tb_1 (id int);";
    let task = commands::review(executor(), "exist_db", batch, &ReviewConfig::default())
        .await
        .unwrap();

    assert_eq!(task.commit_sqls.len(), 2);
    assert_eq!(task.commit_sqls[1].inspect_level, RuleLevel::Error);
    assert!(task.commit_sqls[1].inspect_result.contains("exist_db.exist_tb_1"));
    assert!(task.rollback_sqls.is_empty());

    let report = commands::render_review(&task);
    assert!(report.contains("#2 [error]"));
    assert!(!report.contains("undoes"));
}

#[tokio::test]
async fn test_review_with_unknown_rule_fails() {
    let mut config = ReviewConfig::default();
    config.rules.push(sqlreview_advisor::RuleConfig::new("NO_SUCH_RULE"));
    let err = commands::review(executor(), "exist_db", "select 1;", &config)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("NO_SUCH_RULE"));
}

#[tokio::test]
async fn test_optimize_renders_create_index() {
    let sql = "select * from exist_tb_3 where v1 = 1";
    let select = sqlreview_lowering::parse_one(sql).unwrap().to_string();
    let executor: Arc<dyn Executor> = Arc::new(
        exist_db_executor()
            .with_explain(&select, vec![ExplainRecord::new("1", "exist_tb_3", "ALL")])
            .build(),
    );
    let advice = commands::optimize(executor, "exist_db", sql, &ReviewConfig::default())
        .await
        .unwrap();
    assert_eq!(
        commands::render_advice(&advice),
        "-- 三星索引建议\nCREATE INDEX `idx_exist_tb_3_v1` ON `exist_db`.`exist_tb_3` (`v1`);\n"
    );
}

#[tokio::test]
async fn test_optimize_rejects_other_statements() {
    let err = commands::optimize(
        executor(),
        "exist_db",
        "delete from exist_tb_3",
        &ReviewConfig::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "only SELECT can be optimized, got DELETE");
}

#[test]
fn test_connect_requires_url() {
    let err = tokio_test::block_on(commands::connect(&ConnectionConfig::default()))
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "connection.url is not configured");
}

#[test]
fn test_rules_listing_has_every_rule() {
    let registry = RuleRegistry::builtin();
    let listing = commands::render_rules(&registry);
    assert_eq!(listing.lines().count(), registry.len());
    for rule in registry.rules() {
        assert!(listing.contains(rule.name));
    }
}
