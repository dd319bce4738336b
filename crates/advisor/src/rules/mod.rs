// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Built-in rules
//!
//! Every configurable rule, registered in the order reviews report them.

pub mod ddl;
pub mod dml;
pub mod keywords;

use crate::results::RuleLevel;
use crate::rule::{CheckFn, Rule, RuleCategory, RuleHandler};

/// Rule names as they appear in configuration
pub mod names {
    pub const DDL_CHECK_TABLE_WITHOUT_IF_NOT_EXIST: &str = "DDL_CHECK_TABLE_WITHOUT_IF_NOT_EXIST";
    pub const DDL_CHECK_OBJECT_NAME_LENGTH: &str = "DDL_CHECK_OBJECT_NAME_LENGTH";
    pub const DDL_CHECK_OBJECT_NAME_USING_KEYWORD: &str = "DDL_CHECK_OBJECT_NAME_USING_KEYWORD";
    pub const DDL_CHECK_PK_NOT_EXIST: &str = "DDL_CHECK_PK_NOT_EXIST";
    pub const DDL_CHECK_PK_WITHOUT_AUTO_INCREMENT: &str = "DDL_CHECK_PK_WITHOUT_AUTO_INCREMENT";
    pub const DDL_CHECK_PK_WITHOUT_BIGINT_UNSIGNED: &str = "DDL_CHECK_PK_WITHOUT_BIGINT_UNSIGNED";
    pub const DDL_CHECK_COLUMN_CHAR_LENGTH: &str = "DDL_CHECK_COLUMN_CHAR_LENGTH";
    pub const DDL_DISABLE_FK: &str = "DDL_DISABLE_FK";
    pub const DDL_CHECK_INDEX_COUNT: &str = "DDL_CHECK_INDEX_COUNT";
    pub const DDL_CHECK_COMPOSITE_INDEX_MAX: &str = "DDL_CHECK_COMPOSITE_INDEX_MAX";
    pub const DDL_CHECK_TABLE_WITHOUT_INNODB_UTF8MB4: &str = "DDL_CHECK_TABLE_WITHOUT_INNODB_UTF8MB4";
    pub const DDL_CHECK_INDEX_COLUMN_WITH_BLOB: &str = "DDL_CHECK_INDEX_COLUMN_WITH_BLOB";
    pub const DDL_CHECK_ALTER_TABLE_NEED_MERGE: &str = "DDL_CHECK_ALTER_TABLE_NEED_MERGE";
    pub const DDL_DISABLE_DROP_STATEMENT: &str = "DDL_DISABLE_DROP_STATEMENT";
    pub const DDL_CHECK_TABLE_WITHOUT_COMMENT: &str = "DDL_CHECK_TABLE_WITHOUT_COMMENT";
    pub const DDL_CHECK_COLUMN_WITHOUT_COMMENT: &str = "DDL_CHECK_COLUMN_WITHOUT_COMMENT";
    pub const DDL_CHECK_INDEX_PREFIX: &str = "DDL_CHECK_INDEX_PREFIX";
    pub const DDL_CHECK_UNIQUE_INDEX_PREFIX: &str = "DDL_CHECK_UNIQUE_INDEX_PREFIX";
    pub const DDL_CHECK_COLUMN_WITHOUT_DEFAULT: &str = "DDL_CHECK_COLUMN_WITHOUT_DEFAULT";
    pub const DDL_CHECK_COLUMN_TIMESTAMP_WITHOUT_DEFAULT: &str = "DDL_CHECK_COLUMN_TIMESTAMP_WITHOUT_DEFAULT";
    pub const DDL_CHECK_COLUMN_BLOB_WITH_NOT_NULL: &str = "DDL_CHECK_COLUMN_BLOB_WITH_NOT_NULL";
    pub const DDL_CHECK_COLUMN_BLOB_DEFAULT_IS_NOT_NULL: &str = "DDL_CHECK_COLUMN_BLOB_DEFAULT_IS_NOT_NULL";
    pub const DML_CHECK_WHERE_IS_INVALID: &str = "DML_CHECK_WHERE_IS_INVALID";
    pub const DML_DISABLE_SELECT_ALL_COLUMN: &str = "DML_DISABLE_SELECT_ALL_COLUMN";
    pub const DML_CHECK_WITH_LIMIT: &str = "DML_CHECK_WITH_LIMIT";
    pub const DML_CHECK_WITH_ORDER_BY: &str = "DML_CHECK_WITH_ORDER_BY";
}

fn handler(
    name: &'static str,
    description: &'static str,
    level: RuleLevel,
    category: RuleCategory,
    message: &'static str,
    check: CheckFn,
) -> RuleHandler {
    RuleHandler {
        rule: Rule {
            name,
            description,
            level,
            category,
        },
        message,
        check,
    }
}

/// Every built-in rule at its default level
pub fn all_handlers() -> Vec<RuleHandler> {
    use RuleCategory::*;
    use RuleLevel::{Error, Notice};
    use names::*;

    vec![
        handler(
            DDL_CHECK_TABLE_WITHOUT_IF_NOT_EXIST,
            "新建表必须加入if not exists create，保证重复执行不报错",
            Error,
            Usage,
            "新建表必须加入if not exists create，保证重复执行不报错",
            ddl::check_table_without_if_not_exist,
        ),
        handler(
            DDL_CHECK_OBJECT_NAME_LENGTH,
            "表名、列名、索引名的长度不能大于64字节",
            Error,
            Naming,
            "表名、列名、索引名的长度不能大于64字节",
            ddl::check_object_name_length,
        ),
        handler(
            DDL_CHECK_OBJECT_NAME_USING_KEYWORD,
            "数据库对象命名禁止使用关键字",
            Error,
            Naming,
            "数据库对象命名禁止使用关键字 %s",
            ddl::check_object_name_using_keyword,
        ),
        handler(
            DDL_CHECK_PK_NOT_EXIST,
            "表必须有主键",
            Error,
            Index,
            "表必须有主键",
            ddl::check_pk_not_exist,
        ),
        handler(
            DDL_CHECK_PK_WITHOUT_AUTO_INCREMENT,
            "主键建议使用自增",
            Error,
            Index,
            "主键建议使用自增",
            ddl::check_pk_without_auto_increment,
        ),
        handler(
            DDL_CHECK_PK_WITHOUT_BIGINT_UNSIGNED,
            "主键建议使用 bigint 无符号类型，即 bigint unsigned",
            Error,
            Index,
            "主键建议使用 bigint 无符号类型，即 bigint unsigned",
            ddl::check_pk_without_bigint_unsigned,
        ),
        handler(
            DDL_CHECK_COLUMN_CHAR_LENGTH,
            "char长度大于20时，必须使用varchar类型",
            Error,
            Column,
            "char长度大于20时，必须使用varchar类型",
            ddl::check_column_char_length,
        ),
        handler(
            DDL_DISABLE_FK,
            "禁止使用外键",
            Error,
            Index,
            "禁止使用外键",
            ddl::disable_fk,
        ),
        handler(
            DDL_CHECK_INDEX_COUNT,
            "索引个数建议不超过5个",
            Notice,
            Index,
            "索引个数建议不超过5个",
            ddl::check_index_count,
        ),
        handler(
            DDL_CHECK_COMPOSITE_INDEX_MAX,
            "复合索引的列数量不建议超过5个",
            Notice,
            Index,
            "复合索引的列数量不建议超过5个",
            ddl::check_composite_index_max,
        ),
        handler(
            DDL_CHECK_TABLE_WITHOUT_INNODB_UTF8MB4,
            "建议使用Innodb引擎,utf8mb4字符集",
            Notice,
            TableStructure,
            "建议使用Innodb引擎,utf8mb4字符集",
            ddl::check_table_without_innodb_utf8mb4,
        ),
        handler(
            DDL_CHECK_INDEX_COLUMN_WITH_BLOB,
            "禁止将blob类型的列加入索引",
            Error,
            Index,
            "禁止将blob类型的列加入索引",
            ddl::check_index_column_with_blob,
        ),
        handler(
            DDL_CHECK_ALTER_TABLE_NEED_MERGE,
            "存在多条对同一个表的修改语句，建议合并成一个ALTER语句",
            Notice,
            Usage,
            "存在多条对同一个表的修改语句，建议合并成一个ALTER语句",
            ddl::check_alter_table_need_merge,
        ),
        handler(
            DDL_DISABLE_DROP_STATEMENT,
            "禁止除索引外的drop操作",
            Error,
            Usage,
            "禁止除索引外的drop操作",
            ddl::disable_drop_statement,
        ),
        handler(
            DDL_CHECK_TABLE_WITHOUT_COMMENT,
            "表建议添加注释",
            Notice,
            TableStructure,
            "表建议添加注释",
            ddl::check_table_without_comment,
        ),
        handler(
            DDL_CHECK_COLUMN_WITHOUT_COMMENT,
            "列建议添加注释",
            Notice,
            Column,
            "列建议添加注释",
            ddl::check_column_without_comment,
        ),
        handler(
            DDL_CHECK_INDEX_PREFIX,
            "普通索引必须要以\"idx_\"为前缀",
            Notice,
            Naming,
            "普通索引必须要以\"idx_\"为前缀",
            ddl::check_index_prefix,
        ),
        handler(
            DDL_CHECK_UNIQUE_INDEX_PREFIX,
            "unique索引必须要以\"uniq_\"为前缀",
            Notice,
            Naming,
            "unique索引必须要以\"uniq_\"为前缀",
            ddl::check_unique_index_prefix,
        ),
        handler(
            DDL_CHECK_COLUMN_WITHOUT_DEFAULT,
            "除了自增列及大字段列之外，每个列都必须添加默认值",
            Notice,
            Column,
            "除了自增列及大字段列之外，每个列都必须添加默认值",
            ddl::check_column_without_default,
        ),
        handler(
            DDL_CHECK_COLUMN_TIMESTAMP_WITHOUT_DEFAULT,
            "timestamp 类型的列必须添加默认值",
            Error,
            Column,
            "timestamp 类型的列必须添加默认值",
            ddl::check_column_timestamp_without_default,
        ),
        handler(
            DDL_CHECK_COLUMN_BLOB_WITH_NOT_NULL,
            "BLOB 和 TEXT 类型的字段不建议设置为 NOT NULL",
            Error,
            Column,
            "BLOB 和 TEXT 类型的字段不建议设置为 NOT NULL",
            ddl::check_column_blob_with_not_null,
        ),
        handler(
            DDL_CHECK_COLUMN_BLOB_DEFAULT_IS_NOT_NULL,
            "BLOB 和 TEXT 类型的字段不可指定非 NULL 的默认值",
            Error,
            Column,
            "BLOB 和 TEXT 类型的字段不可指定非 NULL 的默认值",
            ddl::check_column_blob_default_is_not_null,
        ),
        handler(
            DML_CHECK_WHERE_IS_INVALID,
            "禁止使用没有where条件的sql语句或者使用where 1=1等变相没有条件的sql",
            Error,
            Dml,
            "禁止使用没有where条件的sql语句或者使用where 1=1等变相没有条件的sql",
            dml::check_where_is_invalid,
        ),
        handler(
            DML_DISABLE_SELECT_ALL_COLUMN,
            "不建议使用select *",
            Notice,
            Dml,
            "不建议使用select *",
            dml::disable_select_all_column,
        ),
        handler(
            DML_CHECK_WITH_LIMIT,
            "delete/update 语句不能有limit条件",
            Error,
            Dml,
            "delete/update 语句不能有limit条件",
            dml::check_with_limit,
        ),
        handler(
            DML_CHECK_WITH_ORDER_BY,
            "delete/update 语句不能有order by",
            Error,
            Dml,
            "delete/update 语句不能有order by",
            dml::check_with_order_by,
        ),
    ]
}
