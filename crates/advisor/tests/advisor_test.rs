// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Review cases against the `exist_db` fixture schema
//!
//! Each case reviews one batch with a fresh session and compares every
//! statement's level and result text.

use sqlreview_advisor::checks::*;
use sqlreview_advisor::rules::names::*;
use sqlreview_advisor::{
    Advisor, InspectResults, RuleHandler, RuleLevel, RuleRegistry, Task, render_message,
};
use sqlreview_test_utils::{exist_db_executor, exist_db_session};

const LENGTH_64: &str = "aaaaaaaaaabbbbbbbbbbccccccccccddddddddddeeeeeeeeeeffffffffffabcd";
const LENGTH_65: &str = "aaaaaaaaaabbbbbbbbbbccccccccccddddddddddeeeeeeeeeeffffffffffabcde";

/// Expected review outcome of one statement
#[derive(Default)]
struct Expect {
    results: InspectResults,
}

impl Expect {
    fn new() -> Self {
        Self::default()
    }

    /// An existence check message at `error`
    fn add(mut self, template: &str, args: &[&str]) -> Self {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.results
            .add(RuleLevel::Error, render_message(template, &args));
        self
    }

    /// A rule violation at the rule's default level
    fn rule(mut self, name: &str, args: &[&str]) -> Self {
        let registry = RuleRegistry::builtin();
        let handler = registry.get(name).expect("rule is registered");
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        self.results
            .add(handler.rule.level, render_message(handler.message, &args));
        self
    }
}

fn all_rules() -> Vec<RuleHandler> {
    RuleRegistry::builtin().all_active()
}

fn rules_without(excluded: &[&str]) -> Vec<RuleHandler> {
    all_rules()
        .into_iter()
        .filter(|h| !excluded.contains(&h.rule.name))
        .collect()
}

async fn run_case(desc: &str, rules: Vec<RuleHandler>, sql: &str, expected: Vec<Expect>) {
    let (session, _) = exist_db_session(exist_db_executor().build());
    let mut advisor = Advisor::new(session, rules);
    let mut task = Task::from_batch("test", "exist_db", sql);
    advisor
        .advise(&mut task)
        .await
        .unwrap_or_else(|e| panic!("{desc}: review failed: {e}"));

    assert_eq!(task.commit_sqls.len(), expected.len(), "{desc}: statement count");
    for (commit, expect) in task.commit_sqls.iter().zip(&expected) {
        assert_eq!(
            commit.inspect_level,
            expect.results.level(),
            "{desc}: level of `{}`",
            commit.sql.content
        );
        assert_eq!(
            commit.inspect_result,
            expect.results.message(),
            "{desc}: result of `{}`",
            commit.sql.content
        );
    }
}

async fn case(desc: &str, sql: &str, expected: Expect) {
    run_case(desc, all_rules(), sql, vec![expected]).await;
}

/// A CREATE TABLE that passes every rule, with `body` as its columns/keys
fn create_table(name: &str, body: &str) -> String {
    format!(
        "CREATE TABLE if not exists exist_db.{name} (\n{body}\n)ENGINE=InnoDB AUTO_INCREMENT=3 DEFAULT CHARSET=utf8mb4 COMMENT=\"unit test\";"
    )
}

const ID_COLUMN: &str = "id bigint unsigned NOT NULL AUTO_INCREMENT COMMENT \"unit test\",";
const V1_COLUMN: &str = "v1 varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\",";
const V2_COLUMN: &str = "v2 varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\",";

fn standard_table(extra: &str) -> String {
    create_table(
        "not_exist_tb_1",
        &format!("{ID_COLUMN}\n{V1_COLUMN}\n{V2_COLUMN}\nPRIMARY KEY (id){extra}"),
    )
}

#[tokio::test]
async fn test_message_format() {
    let mut results = InspectResults::new();
    results.add(
        RuleLevel::Error,
        "新建表必须加入if not exists create，保证重复执行不报错",
    );
    results.add(
        RuleLevel::Error,
        render_message(TABLE_NOT_EXIST_MSG, &["not_exist_tb".to_string()]),
    );
    assert_eq!(results.level(), RuleLevel::Error);
    assert_eq!(
        results.message(),
        "[error]新建表必须加入if not exists create，保证重复执行不报错\n[error]表 not_exist_tb 不存在"
    );

    let (session, _) = exist_db_session(exist_db_executor().build());
    let mut advisor = Advisor::new(session, all_rules());
    let mut task = Task::from_batch("test", "exist_db", "use no_exist_db");
    assert!(!advisor.advise(&mut task).await.unwrap());
    assert_eq!(task.commit_sqls[0].inspect_result, "[error]schema no_exist_db 不存在");
}

#[tokio::test]
async fn test_check_invalid_create_table() {
    case(
        "schema not exist",
        &standard_table("").replace("exist_db.not_exist_tb_1", "not_exist_db.not_exist_tb_1"),
        Expect::new().add(SCHEMA_NOT_EXIST_MSG, &["not_exist_db"]),
    )
    .await;

    case(
        "table is exist(1)",
        &create_table(
            "exist_tb_1",
            &format!("{ID_COLUMN}\n{V1_COLUMN}\n{V2_COLUMN}\nPRIMARY KEY (id)"),
        ),
        Expect::new(),
    )
    .await;

    run_case(
        "table is exist(2)",
        rules_without(&[DDL_CHECK_TABLE_WITHOUT_IF_NOT_EXIST]),
        &create_table(
            "exist_tb_1",
            &format!("{ID_COLUMN}\n{V1_COLUMN}\n{V2_COLUMN}\nPRIMARY KEY (id)"),
        )
        .replace(" if not exists", ""),
        vec![Expect::new().add(TABLE_EXIST_MSG, &["exist_db.exist_tb_1"])],
    )
    .await;

    run_case(
        "refer table not exist",
        rules_without(&[DDL_CHECK_TABLE_WITHOUT_IF_NOT_EXIST]),
        "CREATE TABLE exist_db.not_exist_tb_1 like exist_db.not_exist_tb_2;",
        vec![Expect::new().add(TABLE_NOT_EXIST_MSG, &["exist_db.not_exist_tb_2"])],
    )
    .await;

    case(
        "multi pk",
        &create_table(
            "not_exist_tb_1",
            &format!(
                "id bigint unsigned NOT NULL AUTO_INCREMENT KEY COMMENT \"unit test\",\n{V1_COLUMN}\n{V2_COLUMN}\nPRIMARY KEY (id)"
            ),
        ),
        Expect::new().add(PRIMARY_KEY_MULTI_MSG, &[]),
    )
    .await;

    case(
        "duplicate column",
        &create_table(
            "not_exist_tb_1",
            &format!("{ID_COLUMN}\n{V1_COLUMN}\n{V1_COLUMN}\nPRIMARY KEY (id)"),
        ),
        Expect::new().add(DUPLICATE_COLUMN_MSG, &["v1"]),
    )
    .await;

    case(
        "duplicate index",
        &standard_table(",\nINDEX idx_1 (v1),\nINDEX idx_1 (v2)"),
        Expect::new().add(DUPLICATE_INDEX_MSG, &["idx_1"]),
    )
    .await;

    case(
        "key column not exist",
        &standard_table(",\nINDEX idx_1 (v3),\nINDEX idx_2 (v4,v5)"),
        Expect::new().add(KEY_COLUMN_NOT_EXIST_MSG, &["v3,v4,v5"]),
    )
    .await;

    case(
        "pk column not exist",
        &create_table(
            "not_exist_tb_1",
            &format!("{ID_COLUMN}\n{V1_COLUMN}\n{V2_COLUMN}\nPRIMARY KEY (id11)"),
        ),
        Expect::new().add(KEY_COLUMN_NOT_EXIST_MSG, &["id11"]),
    )
    .await;
}

#[tokio::test]
async fn test_check_invalid_alter_table() {
    let v5 = "varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\"";
    case(
        "schema not exist",
        &format!("ALTER TABLE not_exist_db.exist_tb_1 add column v5 {v5};"),
        Expect::new().add(SCHEMA_NOT_EXIST_MSG, &["not_exist_db"]),
    )
    .await;
    case(
        "table not exist",
        &format!("ALTER TABLE exist_db.not_exist_tb_1 add column v5 {v5};"),
        Expect::new().add(TABLE_NOT_EXIST_MSG, &["exist_db.not_exist_tb_1"]),
    )
    .await;
    case(
        "add a exist column",
        &format!("ALTER TABLE exist_db.exist_tb_1 add column v1 {v5};"),
        Expect::new().add(COLUMN_EXIST_MSG, &["v1"]),
    )
    .await;
    case(
        "drop a not exist column",
        "ALTER TABLE exist_db.exist_tb_1 drop column v5;",
        Expect::new().add(COLUMN_NOT_EXIST_MSG, &["v5"]),
    )
    .await;
    case(
        "add a exist index",
        "ALTER TABLE exist_db.exist_tb_1 add index idx_1 (v1);",
        Expect::new().add(INDEX_EXIST_MSG, &["idx_1"]),
    )
    .await;
    case(
        "drop a not exist index",
        "ALTER TABLE exist_db.exist_tb_1 drop index idx_2;",
        Expect::new().add(INDEX_NOT_EXIST_MSG, &["idx_2"]),
    )
    .await;
    case(
        "add index but key column not exist",
        "ALTER TABLE exist_db.exist_tb_1 add index idx_2 (v3);",
        Expect::new().add(KEY_COLUMN_NOT_EXIST_MSG, &["v3"]),
    )
    .await;
    case(
        "alter a not exist column",
        "ALTER TABLE exist_db.exist_tb_1 alter column v5 set default 'v5';",
        Expect::new().add(COLUMN_NOT_EXIST_MSG, &["v5"]),
    )
    .await;
    case(
        "change a exist column",
        &format!("ALTER TABLE exist_db.exist_tb_1 change column v1 v1 {v5};"),
        Expect::new(),
    )
    .await;
    case(
        "change a not exist column",
        &format!("ALTER TABLE exist_db.exist_tb_1 change column v5 v5 {v5};"),
        Expect::new().add(COLUMN_NOT_EXIST_MSG, &["v5"]),
    )
    .await;
    case(
        "change column to a exist column",
        &format!("ALTER TABLE exist_db.exist_tb_1 change column v2 v1 {v5};"),
        Expect::new().add(COLUMN_EXIST_MSG, &["v1"]),
    )
    .await;
    case(
        "add pk but exist pk",
        "ALTER TABLE exist_db.exist_tb_1 add primary key(v1);",
        Expect::new().add(PRIMARY_KEY_EXIST_MSG, &[]),
    )
    .await;
    case(
        "add pk but key column not exist",
        "ALTER TABLE exist_db.exist_tb_2 add primary key(id11);",
        Expect::new().add(KEY_COLUMN_NOT_EXIST_MSG, &["id11"]),
    )
    .await;
    case(
        "add pk ok",
        "ALTER TABLE exist_db.exist_tb_2 add primary key(id);",
        Expect::new(),
    )
    .await;
}

#[tokio::test]
async fn test_check_invalid_create_database() {
    case("schema exist(1)", "CREATE DATABASE if not exists exist_db;", Expect::new()).await;
    case(
        "schema exist(2)",
        "CREATE DATABASE exist_db;",
        Expect::new().add(SCHEMA_EXIST_MSG, &["exist_db"]),
    )
    .await;
}

#[tokio::test]
async fn test_check_invalid_create_index() {
    case(
        "schema not exist",
        "CREATE INDEX idx_1 ON not_exist_db.not_exist_tb(v1);",
        Expect::new().add(SCHEMA_NOT_EXIST_MSG, &["not_exist_db"]),
    )
    .await;
    case(
        "table not exist",
        "CREATE INDEX idx_1 ON exist_db.not_exist_tb(v1);",
        Expect::new().add(TABLE_NOT_EXIST_MSG, &["exist_db.not_exist_tb"]),
    )
    .await;
    case(
        "index exist",
        "CREATE INDEX idx_1 ON exist_db.exist_tb_1(v1);",
        Expect::new().add(INDEX_EXIST_MSG, &["idx_1"]),
    )
    .await;
    case(
        "key column not exist",
        "CREATE INDEX idx_2 ON exist_db.exist_tb_1(v3);",
        Expect::new().add(KEY_COLUMN_NOT_EXIST_MSG, &["v3"]),
    )
    .await;
}

#[tokio::test]
async fn test_check_invalid_drop() {
    let cases: Vec<(&str, &str, Expect)> = vec![
        ("drop database ok", "DROP DATABASE if exists exist_db;", Expect::new()),
        (
            "drop database if exists",
            "DROP DATABASE if exists not_exist_db;",
            Expect::new(),
        ),
        (
            "drop database not exist",
            "DROP DATABASE not_exist_db;",
            Expect::new().add(SCHEMA_NOT_EXIST_MSG, &["not_exist_db"]),
        ),
        ("drop table ok", "DROP TABLE exist_db.exist_tb_1;", Expect::new()),
        (
            "drop table if exists",
            "DROP TABLE if exists not_exist_db.not_exist_tb_1;",
            Expect::new(),
        ),
        (
            "drop table schema not exist",
            "DROP TABLE not_exist_db.not_exist_tb_1;",
            Expect::new().add(SCHEMA_NOT_EXIST_MSG, &["not_exist_db"]),
        ),
        (
            "drop table not exist",
            "DROP TABLE exist_db.not_exist_tb_1;",
            Expect::new().add(TABLE_NOT_EXIST_MSG, &["exist_db.not_exist_tb_1"]),
        ),
        ("drop index ok", "DROP INDEX idx_1 ON exist_db.exist_tb_1;", Expect::new()),
        (
            "drop index not exist",
            "DROP INDEX idx_2 ON exist_db.exist_tb_1;",
            Expect::new().add(INDEX_NOT_EXIST_MSG, &["idx_2"]),
        ),
    ];
    for (desc, sql, expect) in cases {
        run_case(
            desc,
            rules_without(&[DDL_DISABLE_DROP_STATEMENT]),
            sql,
            vec![expect],
        )
        .await;
    }

    case(
        "drop is disabled",
        "DROP TABLE exist_db.exist_tb_1;",
        Expect::new().rule(DDL_DISABLE_DROP_STATEMENT, &[]),
    )
    .await;
}

#[tokio::test]
async fn test_check_invalid_insert() {
    case(
        "schema not exist",
        "insert into not_exist_db.not_exist_tb values (1,\"1\",\"1\");",
        Expect::new().add(SCHEMA_NOT_EXIST_MSG, &["not_exist_db"]),
    )
    .await;
    case(
        "table not exist",
        "insert into exist_db.not_exist_tb values (1,\"1\",\"1\");",
        Expect::new().add(TABLE_NOT_EXIST_MSG, &["exist_db.not_exist_tb"]),
    )
    .await;
    case(
        "column not exist(1)",
        "insert into exist_db.exist_tb_1 (id,v1,v3) values (1,\"1\",\"1\");",
        Expect::new().add(COLUMN_NOT_EXIST_MSG, &["v3"]),
    )
    .await;
    case(
        "column not exist(2)",
        "insert into exist_db.exist_tb_1 set id=1,v1=\"1\",v3=\"1\";",
        Expect::new().add(COLUMN_NOT_EXIST_MSG, &["v3"]),
    )
    .await;
    case(
        "column is duplicate(1)",
        "insert into exist_db.exist_tb_1 (id,v1,v1) values (1,\"1\",\"1\");",
        Expect::new().add(DUPLICATE_COLUMN_MSG, &["v1"]),
    )
    .await;
    case(
        "column is duplicate(2)",
        "insert into exist_db.exist_tb_1 set id=1,v1=\"1\",v1=\"1\";",
        Expect::new().add(DUPLICATE_COLUMN_MSG, &["v1"]),
    )
    .await;
    case(
        "values do not match columns",
        "insert into exist_db.exist_tb_1 (id,v1,v2) values (1,\"1\",\"1\"),(2,\"2\",\"2\",\"2\");",
        Expect::new().add(NOT_MATCH_VALUES_AND_COLUMNS_MSG, &[]),
    )
    .await;
}

#[tokio::test]
async fn test_check_invalid_update() {
    let cases: Vec<(&str, &str, Expect)> = vec![
        (
            "schema not exist",
            "update not_exist_db.not_exist_tb set v1=\"2\" where id=1;",
            Expect::new().add(SCHEMA_NOT_EXIST_MSG, &["not_exist_db"]),
        ),
        (
            "table not exist",
            "update exist_db.not_exist_tb set v1=\"2\" where id=1;",
            Expect::new().add(TABLE_NOT_EXIST_MSG, &["exist_db.not_exist_tb"]),
        ),
        (
            "column not exist",
            "update exist_db.exist_tb_1 set v3=\"2\" where id=1;",
            Expect::new().add(COLUMN_NOT_EXIST_MSG, &["v3"]),
        ),
        (
            "column is duplicate",
            "update exist_db.exist_tb_1 set v1=\"2\",v1=\"1\" where id=1;",
            Expect::new().add(DUPLICATE_COLUMN_MSG, &["v1"]),
        ),
        (
            "alias ok",
            "update exist_tb_1 as t set t.v1 = \"1\" where t.id = 1;",
            Expect::new(),
        ),
        (
            "alias table not exist",
            "update exist_db.not_exist_tb as t set t.v3 = \"1\" where t.id = 1;",
            Expect::new().add(TABLE_NOT_EXIST_MSG, &["exist_db.not_exist_tb"]),
        ),
        (
            "alias column not exist",
            "update exist_tb_1 as t set t.v3 = \"1\" where t.id = 1;",
            Expect::new().add(COLUMN_NOT_EXIST_MSG, &["exist_tb_1.v3"]),
        ),
        (
            "alias column is duplicate(1)",
            "update exist_tb_1 as t set t.v2 = \"1\",t.v2=\"1\" where t.id = 1;",
            Expect::new().add(DUPLICATE_COLUMN_MSG, &["v2"]),
        ),
        (
            "alias column is duplicate(2)",
            "update exist_tb_1 as t set t.v2 = \"1\",exist_tb_1.v2=\"1\" where t.id = 1;",
            Expect::new().add(DUPLICATE_COLUMN_MSG, &["v2"]),
        ),
        (
            "multi-update ok",
            "update exist_tb_1,exist_tb_2 set exist_tb_1.v1 = \"1\" where exist_tb_1.id = exist_tb_2.id;",
            Expect::new(),
        ),
        (
            "multi-update join ok",
            "update exist_tb_1 inner join exist_tb_2 on exist_tb_1.id = exist_tb_2.id set exist_tb_1.v1 = \"1\" where exist_tb_1.id = 1;",
            Expect::new(),
        ),
        (
            "multi-update column not exist(1)",
            "update exist_tb_1,exist_tb_2 set exist_tb_1.v3 = \"1\" where exist_tb_1.id = exist_tb_2.id;",
            Expect::new().add(COLUMN_NOT_EXIST_MSG, &["exist_tb_1.v3"]),
        ),
        (
            "multi-update column not exist(2)",
            "update exist_tb_1,exist_tb_2 set exist_tb_2.v3 = \"1\" where exist_tb_1.id = exist_tb_2.id;",
            Expect::new().add(COLUMN_NOT_EXIST_MSG, &["exist_tb_2.v3"]),
        ),
        (
            "multi-update column not ambiguous",
            "update exist_tb_1,exist_tb_2 set user_id = \"1\" where exist_tb_1.id = exist_tb_2.id;",
            Expect::new(),
        ),
        (
            "multi-update column is ambiguous",
            "update exist_tb_1,exist_tb_2 set v1 = \"1\" where exist_tb_1.id = exist_tb_2.id;",
            Expect::new().add(COLUMN_IS_AMBIGUOUS_MSG, &["v1"]),
        ),
        (
            "multi-update column is duplicate(1)",
            "update exist_tb_1,exist_tb_2 set exist_tb_1.v1 = 1,exist_tb_1.v1 = \"1\" where exist_tb_1.id = exist_tb_2.id;",
            Expect::new().add(DUPLICATE_COLUMN_MSG, &["exist_tb_1.v1"]),
        ),
        (
            "multi-update column is duplicate(2)",
            "update exist_tb_1 t,exist_tb_2 set t.v1 = 1,exist_tb_1.v1 = \"1\" where exist_tb_1.id = exist_tb_2.id;",
            Expect::new().add(DUPLICATE_COLUMN_MSG, &["exist_tb_1.v1"]),
        ),
    ];
    for (desc, sql, expect) in cases {
        case(desc, sql, expect).await;
    }
}

#[tokio::test]
async fn test_check_invalid_delete() {
    case(
        "schema not exist",
        "delete from not_exist_db.not_exist_tb where id=1;",
        Expect::new().add(SCHEMA_NOT_EXIST_MSG, &["not_exist_db"]),
    )
    .await;
    case(
        "table not exist",
        "delete from exist_db.not_exist_tb where id=1;",
        Expect::new().add(TABLE_NOT_EXIST_MSG, &["exist_db.not_exist_tb"]),
    )
    .await;
}

#[tokio::test]
async fn test_dml_rules() {
    let invalid = || Expect::new().rule(DML_CHECK_WHERE_IS_INVALID, &[]);
    let cases: Vec<(&str, Expect)> = vec![
        (
            "select * from exist_db.exist_tb_1 where id =1;",
            Expect::new().rule(DML_DISABLE_SELECT_ALL_COLUMN, &[]),
        ),
        ("select id from exist_db.exist_tb_1 where id > 1;", Expect::new()),
        ("select id from exist_db.exist_tb_1;", invalid()),
        ("select id from exist_db.exist_tb_1 where 1=1 and 2=2;", invalid()),
        ("select id from exist_db.exist_tb_1 where id=id;", invalid()),
        (
            "select id from exist_db.exist_tb_1 where exist_tb_1.id=exist_tb_1.id;",
            invalid(),
        ),
        ("update exist_db.exist_tb_1 set v1='v1' where id = 1;", Expect::new()),
        ("update exist_db.exist_tb_1 set v1='v1';", invalid()),
        ("update exist_db.exist_tb_1 set v1='v1' where 1=1 and 2=2;", invalid()),
        ("update exist_db.exist_tb_1 set v1='v1' where id=id;", invalid()),
        ("delete from exist_db.exist_tb_1 where id = 1;", Expect::new()),
        ("delete from exist_db.exist_tb_1;", invalid()),
        ("delete from exist_db.exist_tb_1 where 1=1 and id=id;", invalid()),
        (
            "delete from exist_db.exist_tb_1 where 1=1 and exist_tb_1.id=exist_tb_1.id;",
            invalid(),
        ),
        (
            "UPDATE exist_db.exist_tb_1 Set v1=\"2\" where id=1 limit 1;",
            Expect::new().rule(DML_CHECK_WITH_LIMIT, &[]),
        ),
        (
            "DELETE FROM exist_db.exist_tb_1 where id=1 limit 1;",
            Expect::new().rule(DML_CHECK_WITH_LIMIT, &[]),
        ),
        (
            "UPDATE exist_db.exist_tb_1 Set v1=\"2\" where id=1 order by v1;",
            Expect::new().rule(DML_CHECK_WITH_ORDER_BY, &[]),
        ),
    ];
    for (sql, expect) in cases {
        case(sql, sql, expect).await;
    }
}

#[tokio::test]
async fn test_create_table_without_if_not_exists() {
    case(
        "need if not exists",
        &standard_table("").replace(" if not exists", ""),
        Expect::new().rule(DDL_CHECK_TABLE_WITHOUT_IF_NOT_EXIST, &[]),
    )
    .await;
}

#[tokio::test]
async fn test_object_name_using_keyword() {
    case(
        "using keyword",
        &create_table(
            "`select`",
            &format!(
                "{ID_COLUMN}\n{V1_COLUMN}\n`create` varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\",\nPRIMARY KEY (id),\nINDEX `show` (v1)"
            ),
        ),
        Expect::new()
            .rule(DDL_CHECK_OBJECT_NAME_USING_KEYWORD, &["select, create, show"])
            .rule(DDL_CHECK_INDEX_PREFIX, &[]),
    )
    .await;
}

#[tokio::test]
async fn test_alter_table_need_merge() {
    run_case(
        "alter table need merge",
        all_rules(),
        "ALTER TABLE exist_db.exist_tb_1 add column v5 varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\";
ALTER TABLE exist_db.exist_tb_1 add column v6 varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\";",
        vec![
            Expect::new(),
            Expect::new().rule(DDL_CHECK_ALTER_TABLE_NEED_MERGE, &[]),
        ],
    )
    .await;
}

#[tokio::test]
async fn test_object_name_length() {
    let too_long = || Expect::new().rule(DDL_CHECK_OBJECT_NAME_LENGTH, &[]);
    let body = format!("{ID_COLUMN}\n{V1_COLUMN}\n{V2_COLUMN}\nPRIMARY KEY (id)");
    let column = "varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\"";

    case("table length <= 64", &create_table(LENGTH_64, &body), Expect::new()).await;
    case("table length > 64", &create_table(LENGTH_65, &body), too_long()).await;
    case(
        "column length > 64",
        &create_table(
            "not_exist_tb_1",
            &format!("{ID_COLUMN}\n{LENGTH_65} {column},\n{V2_COLUMN}\nPRIMARY KEY (id)"),
        ),
        too_long(),
    )
    .await;
    case(
        "index length > 64",
        &standard_table(&format!(",\nINDEX idx_{LENGTH_65} (v1)")),
        too_long(),
    )
    .await;
    case(
        "rename table length > 64",
        &format!("ALTER TABLE exist_db.exist_tb_1 RENAME {LENGTH_65};"),
        too_long(),
    )
    .await;
    case(
        "add column length > 64",
        &format!("ALTER TABLE exist_db.exist_tb_1 ADD COLUMN {LENGTH_65} {column};"),
        too_long(),
    )
    .await;
    case(
        "change column length > 64",
        &format!("ALTER TABLE exist_db.exist_tb_1 CHANGE COLUMN v1 {LENGTH_65} {column};"),
        too_long(),
    )
    .await;
    case(
        "add index length > 64",
        &format!("ALTER TABLE exist_db.exist_tb_1 ADD index idx_{LENGTH_65} (v1);"),
        too_long(),
    )
    .await;
    case(
        "rename index length > 64",
        &format!("ALTER TABLE exist_db.exist_tb_1 RENAME index idx_1 TO idx_{LENGTH_65};"),
        too_long(),
    )
    .await;
}

#[tokio::test]
async fn test_primary_key_rules() {
    let rest = format!("{V1_COLUMN}\n{V2_COLUMN}");
    let rest = rest.trim_end_matches(',');
    let cases: Vec<(&str, String, Expect)> = vec![
        (
            "primary key exist",
            format!("id bigint unsigned NOT NULL AUTO_INCREMENT PRIMARY KEY COMMENT \"unit test\",\n{rest}"),
            Expect::new(),
        ),
        (
            "primary key not exist",
            format!("{ID_COLUMN}\n{rest}"),
            Expect::new().rule(DDL_CHECK_PK_NOT_EXIST, &[]),
        ),
        (
            "primary key not auto increment(1)",
            format!("id bigint unsigned NOT NULL KEY DEFAULT \"unit test\" COMMENT \"unit test\",\n{rest}"),
            Expect::new().rule(DDL_CHECK_PK_WITHOUT_AUTO_INCREMENT, &[]),
        ),
        (
            "primary key not auto increment(2)",
            format!("id bigint unsigned NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\",\n{rest},\nPRIMARY KEY (id)"),
            Expect::new().rule(DDL_CHECK_PK_WITHOUT_AUTO_INCREMENT, &[]),
        ),
        (
            "primary key not bigint unsigned(1)",
            format!("id bigint NOT NULL AUTO_INCREMENT KEY COMMENT \"unit test\",\n{rest}"),
            Expect::new().rule(DDL_CHECK_PK_WITHOUT_BIGINT_UNSIGNED, &[]),
        ),
        (
            "primary key not bigint unsigned(2)",
            format!("id bigint NOT NULL AUTO_INCREMENT COMMENT \"unit test\",\n{rest},\nPRIMARY KEY (id)"),
            Expect::new().rule(DDL_CHECK_PK_WITHOUT_BIGINT_UNSIGNED, &[]),
        ),
    ];
    for (desc, body, expect) in cases {
        case(desc, &create_table("not_exist_tb_1", &body), expect).await;
    }
}

#[tokio::test]
async fn test_column_char_length() {
    let table = |len: u32| {
        create_table(
            "not_exist_tb_1",
            &format!(
                "{ID_COLUMN}\nv1 char({len}) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\",\n{V2_COLUMN}\nPRIMARY KEY (id)"
            ),
        )
    };
    case("char(20)", &table(20), Expect::new()).await;
    case(
        "char(21)",
        &table(21),
        Expect::new().rule(DDL_CHECK_COLUMN_CHAR_LENGTH, &[]),
    )
    .await;
}

#[tokio::test]
async fn test_index_count_and_composite_index() {
    let indexes = |n: usize| -> String {
        (1..=n)
            .map(|i| format!(",\nINDEX idx_{i} (id)"))
            .collect()
    };
    case("index <= 5", &standard_table(&indexes(5)), Expect::new()).await;
    case(
        "index > 5",
        &standard_table(&indexes(6)),
        Expect::new().rule(DDL_CHECK_INDEX_COUNT, &[]),
    )
    .await;

    let composite = |columns: &[&str]| {
        let defs: String = columns
            .iter()
            .map(|c| format!("{c} varchar(255) NOT NULL DEFAULT \"unit test\" COMMENT \"unit test\",\n"))
            .collect();
        create_table(
            "not_exist_tb_1",
            &format!(
                "{ID_COLUMN}\n{defs}PRIMARY KEY (id),\nINDEX idx_1 (id,{})",
                columns.join(",")
            ),
        )
    };
    case(
        "composite index columns <= 5",
        &composite(&["v1", "v2", "v3", "v4"]),
        Expect::new(),
    )
    .await;
    case(
        "composite index columns > 5",
        &composite(&["v1", "v2", "v3", "v4", "v5"]),
        Expect::new().rule(DDL_CHECK_COMPOSITE_INDEX_MAX, &[]),
    )
    .await;
}

#[tokio::test]
async fn test_table_without_innodb_utf8mb4() {
    let body = format!(
        "id bigint unsigned NOT NULL AUTO_INCREMENT PRIMARY KEY COMMENT \"unit test\",\n{V1_COLUMN}\n{}",
        V2_COLUMN.trim_end_matches(',')
    );
    for (desc, options) in [
        ("engine not innodb", "AUTO_INCREMENT=3 DEFAULT CHARSET=utf8mb4 COMMENT=\"unit test\""),
        ("charset not utf8mb4", "ENGINE=InnoDB AUTO_INCREMENT=3 COMMENT=\"unit test\""),
    ] {
        case(
            desc,
            &format!("CREATE TABLE if not exists exist_db.not_exist_tb_1 (\n{body}\n){options};"),
            Expect::new().rule(DDL_CHECK_TABLE_WITHOUT_INNODB_UTF8MB4, &[]),
        )
        .await;
    }
}

#[tokio::test]
async fn test_index_column_with_blob() {
    let blob = || Expect::new().rule(DDL_CHECK_INDEX_COLUMN_WITH_BLOB, &[]);
    let with_blob = |b1: &str, extra: &str| {
        create_table(
            "not_exist_tb_1",
            &format!("{ID_COLUMN}\n{V1_COLUMN}\n{V2_COLUMN}\n{b1},\nPRIMARY KEY (id){extra}"),
        )
    };

    case(
        "index on blob column",
        &with_blob("b1 blob COMMENT \"unit test\"", ",\nINDEX idx_b1 (b1)"),
        blob(),
    )
    .await;
    case(
        "unique blob column",
        &with_blob("b1 blob UNIQUE KEY COMMENT \"unit test\"", ""),
        blob(),
    )
    .await;

    let batch = format!(
        "{}
CREATE INDEX idx_1 ON exist_db.not_exist_tb_1(b1);
ALTER TABLE exist_db.not_exist_tb_1 ADD INDEX idx_2(b1);
ALTER TABLE exist_db.not_exist_tb_1 ADD COLUMN b2 blob UNIQUE KEY COMMENT \"unit test\";
ALTER TABLE exist_db.not_exist_tb_1 MODIFY COLUMN b1 blob UNIQUE KEY COMMENT \"unit test\";",
        with_blob("b1 blob COMMENT \"unit test\"", "")
    );
    run_case(
        "blob indexed after create",
        rules_without(&[DDL_CHECK_ALTER_TABLE_NEED_MERGE]),
        &batch,
        vec![Expect::new(), blob(), blob(), blob(), blob()],
    )
    .await;
}

#[tokio::test]
async fn test_disable_foreign_key() {
    case(
        "has foreign key",
        &standard_table(",\nFOREIGN KEY (id) REFERENCES exist_tb_1(id)"),
        Expect::new().rule(DDL_DISABLE_FK, &[]),
    )
    .await;
}

#[tokio::test]
async fn test_comment_rules() {
    case(
        "table without comment",
        &standard_table("").replace(" COMMENT=\"unit test\"", ""),
        Expect::new().rule(DDL_CHECK_TABLE_WITHOUT_COMMENT, &[]),
    )
    .await;
    case(
        "column without comment",
        &create_table(
            "not_exist_tb_1",
            &format!("id bigint unsigned NOT NULL AUTO_INCREMENT,\n{V1_COLUMN}\n{V2_COLUMN}\nPRIMARY KEY (id)"),
        ),
        Expect::new().rule(DDL_CHECK_COLUMN_WITHOUT_COMMENT, &[]),
    )
    .await;
    case(
        "add column without comment",
        "ALTER TABLE exist_db.exist_tb_1 ADD COLUMN v3 varchar(255) NOT NULL DEFAULT \"unit test\";",
        Expect::new().rule(DDL_CHECK_COLUMN_WITHOUT_COMMENT, &[]),
    )
    .await;
    case(
        "change column without comment",
        "ALTER TABLE exist_db.exist_tb_1 CHANGE COLUMN v2 v3 varchar(255) NOT NULL DEFAULT \"unit test\" ;",
        Expect::new().rule(DDL_CHECK_COLUMN_WITHOUT_COMMENT, &[]),
    )
    .await;
}

#[tokio::test]
async fn test_index_prefix_rules() {
    let plain = || Expect::new().rule(DDL_CHECK_INDEX_PREFIX, &[]);
    let unique = || Expect::new().rule(DDL_CHECK_UNIQUE_INDEX_PREFIX, &[]);
    case("create table index", &standard_table(",\nINDEX index_1 (v1)"), plain()).await;
    case(
        "alter table index",
        "ALTER TABLE exist_db.exist_tb_1 ADD INDEX index_1(v1);",
        plain(),
    )
    .await;
    case(
        "create index",
        "CREATE INDEX index_1 ON exist_db.exist_tb_1(v1);",
        plain(),
    )
    .await;
    case(
        "create table unique index",
        &standard_table(",\nUNIQUE INDEX index_1 (v1)"),
        unique(),
    )
    .await;
    case(
        "alter table unique index",
        "ALTER TABLE exist_db.exist_tb_1 ADD UNIQUE INDEX index_1(v1);",
        unique(),
    )
    .await;
    case(
        "create unique index",
        "CREATE UNIQUE INDEX index_1 ON exist_db.exist_tb_1(v1);",
        unique(),
    )
    .await;
}

#[tokio::test]
async fn test_column_default_rules() {
    let without_default = || Expect::new().rule(DDL_CHECK_COLUMN_WITHOUT_DEFAULT, &[]);
    case(
        "create column without default",
        &create_table(
            "not_exist_tb_1",
            &format!("{ID_COLUMN}\nv1 varchar(255) COMMENT \"unit test\",\nPRIMARY KEY (id)"),
        ),
        without_default(),
    )
    .await;
    case(
        "add column without default",
        "ALTER TABLE exist_db.exist_tb_1 ADD COLUMN v3 varchar(255) NOT NULL COMMENT \"unit test\";",
        without_default(),
    )
    .await;
    case(
        "auto increment column without default",
        "ALTER TABLE exist_db.exist_tb_1 ADD COLUMN v3 bigint unsigned NOT NULL AUTO_INCREMENT COMMENT \"unit test\";",
        Expect::new(),
    )
    .await;
    case(
        "blob column without default",
        "ALTER TABLE exist_db.exist_tb_1 ADD COLUMN v3 blob COMMENT \"unit test\";",
        Expect::new(),
    )
    .await;

    let timestamp = || Expect::new().rule(DDL_CHECK_COLUMN_TIMESTAMP_WITHOUT_DEFAULT, &[]);
    run_case(
        "create timestamp without default",
        rules_without(&[DDL_CHECK_COLUMN_WITHOUT_DEFAULT]),
        &create_table(
            "not_exist_tb_1",
            &format!("{ID_COLUMN}\nv1 timestamp COMMENT \"unit test\",\nPRIMARY KEY (id)"),
        ),
        vec![timestamp()],
    )
    .await;
    run_case(
        "add timestamp without default",
        rules_without(&[DDL_CHECK_COLUMN_WITHOUT_DEFAULT]),
        "ALTER TABLE exist_db.exist_tb_1 ADD COLUMN v3 timestamp NOT NULL COMMENT \"unit test\";",
        vec![timestamp()],
    )
    .await;
}

#[tokio::test]
async fn test_blob_column_rules() {
    let blob_table = |column: &str| {
        create_table(
            "not_exist_tb_1",
            &format!("{ID_COLUMN}\n{column},\nPRIMARY KEY (id)"),
        )
    };
    let not_null = || Expect::new().rule(DDL_CHECK_COLUMN_BLOB_WITH_NOT_NULL, &[]);
    let has_default = || Expect::new().rule(DDL_CHECK_COLUMN_BLOB_DEFAULT_IS_NOT_NULL, &[]);

    case(
        "create blob not null",
        &blob_table("v1 blob NOT NULL COMMENT \"unit test\""),
        not_null(),
    )
    .await;
    case(
        "add blob not null",
        "ALTER TABLE exist_db.exist_tb_1 ADD COLUMN v3 blob NOT NULL COMMENT \"unit test\";",
        not_null(),
    )
    .await;
    case(
        "create blob with default",
        &blob_table("v1 blob DEFAULT \"unit test\" COMMENT \"unit test\""),
        has_default(),
    )
    .await;
    case(
        "add blob with default",
        "ALTER TABLE exist_db.exist_tb_1 ADD COLUMN v3 blob DEFAULT \"unit test\" COMMENT \"unit test\";",
        has_default(),
    )
    .await;
}

#[tokio::test]
async fn test_relate_tasks_shape_the_catalog() {
    let (session, _) = exist_db_session(exist_db_executor().build());
    let relate = Task::from_batch(
        "relate",
        "exist_db",
        &standard_table(""),
    );
    let invalid = Task::from_batch("broken", "exist_db", "DROP TABLE exist_db.no_such_table;");
    let mut advisor = Advisor::new(session, all_rules()).with_relate_tasks(vec![invalid, relate]);

    let mut task = Task::from_batch(
        "test",
        "exist_db",
        "insert into exist_db.not_exist_tb_1 (id,v1,v2) values (1,\"1\",\"1\");",
    );
    assert!(advisor.advise(&mut task).await.unwrap());
    assert_eq!(task.commit_sqls[0].inspect_level, RuleLevel::Normal);
    assert!(advisor.session().catalog().has_table(&sqlreview_ir::ObjectName::new("not_exist_tb_1")));
}

#[tokio::test]
async fn test_advise_is_repeatable_on_forked_catalogs() {
    let batch = "alter table exist_tb_1 add column v3 varchar(10) not null default '' comment 'c'; \
                 alter table exist_tb_1 add column v3 int; \
                 alter table exist_tb_1 drop column v2; \
                 alter table exist_tb_1 drop column v2; \
                 update exist_tb_1 set v3 = 'a' where id = 1;";
    let (base, executor) = exist_db_session(exist_db_executor().build());

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let mut advisor = Advisor::new(base.fork(), all_rules());
        let mut task = Task::from_batch("test", "exist_db", batch);
        let valid = advisor.advise(&mut task).await.unwrap();
        let records: Vec<(RuleLevel, String)> = task
            .commit_sqls
            .iter()
            .map(|c| (c.inspect_level, c.inspect_result.clone()))
            .collect();
        outcomes.push((valid, records));
    }

    let (valid, records) = &outcomes[0];
    assert!(!valid);
    assert_eq!(records.len(), 5);
    assert_eq!(records[1].0, RuleLevel::Error);
    assert!(records[1].1.contains("v3"));
    assert_eq!(records[3].0, RuleLevel::Error);
    assert!(records[3].1.contains("v2"));
    assert_eq!(outcomes[0], outcomes[1]);
    assert!(executor.call_count("SHOW CREATE TABLE") >= 1);
}
