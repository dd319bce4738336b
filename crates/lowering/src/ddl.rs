// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! DDL lowering: databases, tables, indexes and ALTER TABLE specifications
//!
//! Column types are read here rather than through `Parser::parse_data_type`,
//! whose `DataType` has no room for MySQL display widths on every numeric
//! type, `ZEROFILL`, or a per-column charset.

use crate::error::{LoweringError, LoweringResult};
use crate::expr::lower_expr;
use crate::statement::MySqlParser;
use sqlparser::ast;
use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::Token;
use sqlreview_ir::{
    AlterColumnDefault, AlterSpec, AlterTable, ColumnDef, ColumnOption, ColumnPosition,
    Constraint, ConstraintKind, CreateDatabase, CreateIndex, CreateTable, DataType, DropDatabase,
    DropIndex, Expr, ForeignKeyRef, IndexColumn, IndexOptions, IndexType, ReferenceAction,
    TableOption, expr::escape_string,
};

/// Table options accepted and dropped because nothing downstream reads them
const IGNORED_TABLE_OPTIONS: &[&str] = &[
    "AVG_ROW_LENGTH",
    "CHECKSUM",
    "COMPRESSION",
    "CONNECTION",
    "DELAY_KEY_WRITE",
    "ENCRYPTION",
    "INSERT_METHOD",
    "KEY_BLOCK_SIZE",
    "MAX_ROWS",
    "MIN_ROWS",
    "PACK_KEYS",
    "STATS_AUTO_RECALC",
    "STATS_PERSISTENT",
    "STATS_SAMPLE_PAGES",
    "TABLESPACE",
];

const CONSTRAINT_START: &[Keyword] = &[
    Keyword::CONSTRAINT,
    Keyword::PRIMARY,
    Keyword::INDEX,
    Keyword::KEY,
    Keyword::UNIQUE,
    Keyword::FULLTEXT,
    Keyword::SPATIAL,
    Keyword::FOREIGN,
    Keyword::CHECK,
];

impl MySqlParser<'_> {
    /// After `CREATE [TEMPORARY] TABLE`
    pub(crate) fn parse_create_table(&mut self) -> LoweringResult<CreateTable> {
        let if_not_exists = self
            .parser
            .parse_keywords(&[Keyword::IF, Keyword::NOT, Keyword::EXISTS]);
        let mut table = CreateTable::new(self.parse_object_name()?);
        table.if_not_exists = if_not_exists;

        if self.parser.parse_keyword(Keyword::LIKE) {
            table.like = Some(self.parse_object_name()?);
            return Ok(table);
        }
        self.parser.expect_token(&Token::LParen)?;
        if self.parser.parse_keyword(Keyword::LIKE) {
            table.like = Some(self.parse_object_name()?);
            self.parser.expect_token(&Token::RParen)?;
            return Ok(table);
        }
        loop {
            if self.is_constraint_start() {
                table.constraints.push(self.parse_constraint()?);
            } else {
                table.columns.push(self.parse_column_def()?);
            }
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        self.parser.expect_token(&Token::RParen)?;
        table.options = self.parse_table_options()?;
        if self.peek_keyword(Keyword::PARTITION) {
            return Err(LoweringError::unsupported("PARTITION BY"));
        }
        if self.peek_keyword(Keyword::AS) || self.peek_keyword(Keyword::SELECT) {
            return Err(LoweringError::unsupported("CREATE TABLE ... SELECT"));
        }
        Ok(table)
    }

    fn is_constraint_start(&self) -> bool {
        CONSTRAINT_START.iter().any(|kw| self.peek_keyword(*kw))
    }

    /// Table-level index or constraint definition
    pub(crate) fn parse_constraint(&mut self) -> LoweringResult<Constraint> {
        let mut symbol = None;
        if self.parser.parse_keyword(Keyword::CONSTRAINT)
            && !(self.peek_keyword(Keyword::PRIMARY)
                || self.peek_keyword(Keyword::UNIQUE)
                || self.peek_keyword(Keyword::FOREIGN)
                || self.peek_keyword(Keyword::CHECK))
        {
            symbol = Some(self.parse_ident()?);
        }

        if self.parser.parse_keywords(&[Keyword::PRIMARY, Keyword::KEY]) {
            let mut constraint = Constraint::new(ConstraintKind::PrimaryKey, Vec::new());
            self.parse_index_body(&mut constraint)?;
            return Ok(constraint);
        }
        if self.parser.parse_keywords(&[Keyword::FOREIGN, Keyword::KEY]) {
            let mut constraint = Constraint::new(ConstraintKind::ForeignKey, Vec::new());
            constraint.name = symbol;
            if self.parser.peek_token().token != Token::LParen {
                let index_name = self.parse_ident()?;
                constraint.name.get_or_insert(index_name);
            }
            constraint.keys = self.parse_key_parts()?;
            constraint.reference = Some(self.parse_reference()?);
            return Ok(constraint);
        }
        if self.peek_keyword(Keyword::CHECK) {
            return Err(LoweringError::unsupported("CHECK constraint"));
        }

        let kind = if self.parser.parse_keyword(Keyword::UNIQUE) {
            self.parser
                .parse_one_of_keywords(&[Keyword::INDEX, Keyword::KEY]);
            ConstraintKind::Unique
        } else if self
            .parser
            .parse_one_of_keywords(&[Keyword::FULLTEXT, Keyword::SPATIAL])
            .is_some()
        {
            self.parser
                .parse_one_of_keywords(&[Keyword::INDEX, Keyword::KEY]);
            ConstraintKind::Fulltext
        } else if self
            .parser
            .parse_one_of_keywords(&[Keyword::INDEX, Keyword::KEY])
            .is_some()
        {
            ConstraintKind::Index
        } else {
            return self.expected("index definition");
        };
        let mut constraint = Constraint::new(kind, Vec::new());
        constraint.name = symbol;
        if self.parser.peek_token().token != Token::LParen && !self.peek_keyword(Keyword::USING) {
            constraint.name = Some(self.parse_ident()?);
        }
        self.parse_index_body(&mut constraint)?;
        Ok(constraint)
    }

    /// `[USING type] (key_parts) [index_option ...]`
    fn parse_index_body(&mut self, constraint: &mut Constraint) -> LoweringResult<()> {
        if let Some(using) = self.parse_index_type()? {
            constraint.options.using = Some(using);
        }
        constraint.keys = self.parse_key_parts()?;
        self.parse_index_options(&mut constraint.options)
    }

    fn parse_index_type(&mut self) -> LoweringResult<Option<IndexType>> {
        if !self.parser.parse_keyword(Keyword::USING) {
            return Ok(None);
        }
        match self
            .parser
            .parse_one_of_keywords(&[Keyword::BTREE, Keyword::HASH])
        {
            Some(Keyword::BTREE) => Ok(Some(IndexType::BTree)),
            Some(_) => Ok(Some(IndexType::Hash)),
            None => self.expected("BTREE or HASH"),
        }
    }

    fn parse_index_options(&mut self, options: &mut IndexOptions) -> LoweringResult<()> {
        loop {
            if let Some(using) = self.parse_index_type()? {
                options.using = Some(using);
            } else if self.parser.parse_keyword(Keyword::COMMENT) {
                options.comment = Some(self.parser.parse_literal_string()?);
            } else if self.parse_word("KEY_BLOCK_SIZE") {
                self.parser.consume_token(&Token::Eq);
                self.parser.parse_literal_uint()?;
            } else if self.parse_one_of_words(&["VISIBLE", "INVISIBLE"]).is_none() {
                return Ok(());
            }
        }
    }

    /// `(col[(len)] [ASC|DESC], ...)`
    fn parse_key_parts(&mut self) -> LoweringResult<Vec<IndexColumn>> {
        self.parser.expect_token(&Token::LParen)?;
        let mut keys = Vec::new();
        loop {
            let mut key = IndexColumn::new(self.parse_ident()?);
            if self.parser.consume_token(&Token::LParen) {
                key.length = Some(self.parser.parse_literal_uint()?);
                self.parser.expect_token(&Token::RParen)?;
            }
            self.parser
                .parse_one_of_keywords(&[Keyword::ASC, Keyword::DESC]);
            keys.push(key);
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        self.parser.expect_token(&Token::RParen)?;
        Ok(keys)
    }

    fn parse_reference(&mut self) -> LoweringResult<ForeignKeyRef> {
        self.parser.expect_keyword(Keyword::REFERENCES)?;
        let table = self.parse_object_name()?;
        let columns = self.parse_ident_list()?;
        let mut reference = ForeignKeyRef {
            table,
            columns,
            on_delete: None,
            on_update: None,
        };
        loop {
            if self.parser.parse_keywords(&[Keyword::ON, Keyword::DELETE]) {
                reference.on_delete = Some(lower_referential_action(
                    self.parser.parse_referential_action()?,
                ));
            } else if self.parser.parse_keywords(&[Keyword::ON, Keyword::UPDATE]) {
                reference.on_update = Some(lower_referential_action(
                    self.parser.parse_referential_action()?,
                ));
            } else if self.parser.parse_keyword(Keyword::MATCH) {
                if !self.parser.parse_keyword(Keyword::FULL) {
                    self.parse_one_of_words(&["PARTIAL", "SIMPLE"]);
                }
            } else {
                return Ok(reference);
            }
        }
    }

    /// `name data_type [column_option ...]`
    fn parse_column_def(&mut self) -> LoweringResult<ColumnDef> {
        let name = self.parse_ident()?;
        let data_type = self.parse_data_type()?;
        let mut column = ColumnDef::new(name, data_type);
        self.parse_column_options(&mut column)?;
        Ok(column)
    }

    fn parse_data_type(&mut self) -> LoweringResult<DataType> {
        let next = self.parser.next_token();
        let name = match next.token {
            Token::Word(w) if w.quote_style.is_none() => w.value,
            _ => return Ok(self.parser.expected("a data type name", next)?),
        };
        let mut data_type = DataType::new(name);
        if data_type.name == "double" {
            self.parser.parse_keyword(Keyword::PRECISION);
        }
        if self.parser.consume_token(&Token::LParen) {
            data_type.args = self.parser.parse_comma_separated(|p| {
                let next = p.next_token();
                match next.token {
                    Token::Number(n, _) => Ok(n),
                    Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => {
                        Ok(format!("'{}'", escape_string(&s)))
                    }
                    _ => p.expected("a type argument", next),
                }
            })?;
            self.parser.expect_token(&Token::RParen)?;
        }
        loop {
            if self.parser.parse_keyword(Keyword::UNSIGNED) {
                data_type.unsigned = true;
            } else if self.parse_word("SIGNED") {
                data_type.unsigned = false;
            } else if self.parse_word("ZEROFILL") {
                data_type.zerofill = true;
            } else if let Some(charset) = self.parse_charset_clause()? {
                data_type.charset = Some(charset);
            } else if self.parser.parse_keyword(Keyword::COLLATE) {
                data_type.collate = Some(self.parse_option_value()?);
            } else {
                return Ok(data_type);
            }
        }
    }

    /// `{CHARACTER SET | CHARSET} [=] name`
    fn parse_charset_clause(&mut self) -> LoweringResult<Option<String>> {
        if self
            .parser
            .parse_keywords(&[Keyword::CHARACTER, Keyword::SET])
            || self.parser.parse_keyword(Keyword::CHARSET)
        {
            self.parser.consume_token(&Token::Eq);
            return self.parse_option_value().map(Some);
        }
        Ok(None)
    }

    fn parse_column_options(&mut self, column: &mut ColumnDef) -> LoweringResult<()> {
        loop {
            if self.parser.parse_keywords(&[Keyword::NOT, Keyword::NULL]) {
                column.options.push(ColumnOption::NotNull);
            } else if self.parser.parse_keyword(Keyword::NULL) {
                column.options.push(ColumnOption::Null);
            } else if self.parser.parse_keyword(Keyword::DEFAULT) {
                let value = self.parse_default_value(column)?;
                column.options.push(ColumnOption::Default(value));
            } else if self.parser.parse_keyword(Keyword::AUTO_INCREMENT) {
                column.options.push(ColumnOption::AutoIncrement);
            } else if self.parser.parse_keywords(&[Keyword::PRIMARY, Keyword::KEY])
                || self.parser.parse_keyword(Keyword::KEY)
            {
                column.options.push(ColumnOption::PrimaryKey);
            } else if self.parser.parse_keyword(Keyword::UNIQUE) {
                self.parser.parse_keyword(Keyword::KEY);
                column.options.push(ColumnOption::UniqueKey);
            } else if self.parser.parse_keyword(Keyword::COMMENT) {
                let comment = self.parser.parse_literal_string()?;
                column.options.push(ColumnOption::Comment(comment));
            } else if self.parser.parse_keywords(&[Keyword::ON, Keyword::UPDATE]) {
                let value = self.parse_default_value(column)?;
                column.options.push(ColumnOption::OnUpdate(value));
            } else if self.parser.parse_keyword(Keyword::COLLATE) {
                column.data_type.collate = Some(self.parse_option_value()?);
            } else if let Some(charset) = self.parse_charset_clause()? {
                column.data_type.charset = Some(charset);
            } else if self.parse_one_of_words(&["COLUMN_FORMAT", "STORAGE"]).is_some() {
                self.parse_option_value()?;
            } else if self.peek_keyword(Keyword::GENERATED) || self.peek_keyword(Keyword::AS) {
                return Err(LoweringError::unsupported("generated column"));
            } else if self.peek_keyword(Keyword::REFERENCES) || self.peek_keyword(Keyword::CHECK) {
                return Err(LoweringError::unsupported("inline column constraint"));
            } else {
                return Ok(());
            }
        }
    }

    /// Literal, `CURRENT_TIMESTAMP[(n)]`, function call or parenthesized
    /// expression; a trailing `COLLATE` lands on the column type
    fn parse_default_value(&mut self, column: &mut ColumnDef) -> LoweringResult<Expr> {
        match self.parser.parse_prefix()? {
            ast::Expr::Collate { expr, collation } => {
                column.data_type.collate = Some(collation.to_string());
                lower_expr(&expr)
            }
            expr => lower_expr(&expr),
        }
    }

    /// `ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT="..."`
    fn parse_table_options(&mut self) -> LoweringResult<Vec<TableOption>> {
        let mut options = Vec::new();
        loop {
            let has_default = self.parser.parse_keyword(Keyword::DEFAULT);
            if self.parser.parse_keyword(Keyword::ENGINE) {
                self.parser.consume_token(&Token::Eq);
                options.push(TableOption::Engine(self.parse_option_value()?));
            } else if let Some(charset) = self.parse_charset_clause()? {
                options.push(TableOption::Charset(charset));
            } else if self.parser.parse_keyword(Keyword::COLLATE) {
                self.parser.consume_token(&Token::Eq);
                options.push(TableOption::Collate(self.parse_option_value()?));
            } else if has_default {
                return self.expected("CHARSET or COLLATE");
            } else if self.parser.parse_keyword(Keyword::AUTO_INCREMENT) {
                self.parser.consume_token(&Token::Eq);
                options.push(TableOption::AutoIncrement(self.parser.parse_literal_uint()?));
            } else if self.parser.parse_keyword(Keyword::COMMENT) {
                self.parser.consume_token(&Token::Eq);
                options.push(TableOption::Comment(self.parser.parse_literal_string()?));
            } else if self.parse_word("ROW_FORMAT") {
                self.parser.consume_token(&Token::Eq);
                options.push(TableOption::RowFormat(self.parse_option_value()?));
            } else if self.parse_one_of_words(IGNORED_TABLE_OPTIONS).is_some() {
                self.parser.consume_token(&Token::Eq);
                self.parse_option_value()?;
            } else {
                return Ok(options);
            }
        }
    }

    /// After `ALTER TABLE`
    pub(crate) fn parse_alter_table(&mut self) -> LoweringResult<AlterTable> {
        let name = self.parse_object_name()?;
        let mut specs = Vec::new();
        loop {
            if let Some(spec) = self.parse_alter_spec()? {
                specs.push(spec);
            }
            if !self.parser.consume_token(&Token::Comma) {
                break;
            }
        }
        if specs.is_empty() {
            return self.expected("ALTER TABLE specification");
        }
        Ok(AlterTable { name, specs })
    }

    fn parse_alter_spec(&mut self) -> LoweringResult<Option<AlterSpec>> {
        if self.parser.parse_keyword(Keyword::ADD) {
            if self.is_constraint_start() {
                return Ok(Some(AlterSpec::AddConstraint(self.parse_constraint()?)));
            }
            self.parser.parse_keyword(Keyword::COLUMN);
            if self.parser.consume_token(&Token::LParen) {
                let mut columns = vec![self.parse_column_def()?];
                while self.parser.consume_token(&Token::Comma) {
                    columns.push(self.parse_column_def()?);
                }
                self.parser.expect_token(&Token::RParen)?;
                return Ok(Some(AlterSpec::AddColumns {
                    columns,
                    position: None,
                }));
            }
            let column = self.parse_column_def()?;
            let position = self.parse_column_position()?;
            return Ok(Some(AlterSpec::AddColumns {
                columns: vec![column],
                position,
            }));
        }
        if self.parser.parse_keyword(Keyword::DROP) {
            if self.parser.parse_keywords(&[Keyword::PRIMARY, Keyword::KEY]) {
                return Ok(Some(AlterSpec::DropPrimaryKey));
            }
            if self.parser.parse_keywords(&[Keyword::FOREIGN, Keyword::KEY]) {
                let name = self.parse_ident()?;
                return Ok(Some(AlterSpec::DropForeignKey { name }));
            }
            if self
                .parser
                .parse_one_of_keywords(&[Keyword::INDEX, Keyword::KEY])
                .is_some()
            {
                let name = self.parse_ident()?;
                return Ok(Some(AlterSpec::DropIndex { name }));
            }
            self.parser.parse_keyword(Keyword::COLUMN);
            let name = self.parse_ident()?;
            return Ok(Some(AlterSpec::DropColumn { name }));
        }
        if self.parser.parse_keyword(Keyword::CHANGE) {
            self.parser.parse_keyword(Keyword::COLUMN);
            let old_name = self.parse_ident()?;
            let column = self.parse_column_def()?;
            let position = self.parse_column_position()?;
            return Ok(Some(AlterSpec::ChangeColumn {
                old_name,
                column,
                position,
            }));
        }
        if self.parse_word("MODIFY") {
            self.parser.parse_keyword(Keyword::COLUMN);
            let column = self.parse_column_def()?;
            let position = self.parse_column_position()?;
            return Ok(Some(AlterSpec::ModifyColumn { column, position }));
        }
        if self.parser.parse_keyword(Keyword::ALTER) {
            if self.peek_keyword(Keyword::INDEX)
                || self.peek_keyword(Keyword::CHECK)
                || self.peek_keyword(Keyword::CONSTRAINT)
            {
                return Err(LoweringError::unsupported("ALTER INDEX/CONSTRAINT"));
            }
            self.parser.parse_keyword(Keyword::COLUMN);
            let name = self.parse_ident()?;
            let default = if self.parser.parse_keywords(&[Keyword::SET, Keyword::DEFAULT]) {
                AlterColumnDefault::Set(lower_expr(&self.parser.parse_prefix()?)?)
            } else if self.parser.parse_keywords(&[Keyword::DROP, Keyword::DEFAULT]) {
                AlterColumnDefault::Drop
            } else {
                return self.expected("SET DEFAULT or DROP DEFAULT");
            };
            return Ok(Some(AlterSpec::AlterColumn { name, default }));
        }
        if self.parser.parse_keyword(Keyword::RENAME) {
            if self
                .parser
                .parse_one_of_keywords(&[Keyword::INDEX, Keyword::KEY])
                .is_some()
            {
                let from = self.parse_ident()?;
                self.parser.expect_keyword(Keyword::TO)?;
                let to = self.parse_ident()?;
                return Ok(Some(AlterSpec::RenameIndex { from, to }));
            }
            if self.peek_keyword(Keyword::COLUMN) {
                return Err(LoweringError::unsupported("RENAME COLUMN"));
            }
            self.parser
                .parse_one_of_keywords(&[Keyword::TO, Keyword::AS]);
            let new_name = self.parse_object_name()?;
            return Ok(Some(AlterSpec::RenameTable { new_name }));
        }
        if self.parse_one_of_words(&["ALGORITHM", "LOCK"]).is_some() {
            self.parser.consume_token(&Token::Eq);
            self.parse_option_value()?;
            return Ok(None);
        }
        if self.peek_keyword(Keyword::CONVERT) || self.peek_keyword(Keyword::PARTITION) {
            return Err(LoweringError::unsupported("ALTER TABLE CONVERT/PARTITION"));
        }
        let start = self.parser.index();
        let options = self.parse_table_options()?;
        if options.is_empty() {
            if self.parser.index() > start {
                return Ok(None);
            }
            return self.expected("ALTER TABLE specification");
        }
        Ok(Some(AlterSpec::TableOptions(options)))
    }

    fn parse_column_position(&mut self) -> LoweringResult<Option<ColumnPosition>> {
        if self.parser.parse_keyword(Keyword::FIRST) {
            return Ok(Some(ColumnPosition::First));
        }
        if self.parse_word("AFTER") {
            return Ok(Some(ColumnPosition::After(self.parse_ident()?)));
        }
        Ok(None)
    }

    /// After `CREATE [UNIQUE|FULLTEXT|SPATIAL]`, with the kind already consumed
    pub(crate) fn parse_create_index(&mut self, kind: ConstraintKind) -> LoweringResult<CreateIndex> {
        self.parser.expect_keyword(Keyword::INDEX)?;
        let name = self.parse_ident()?;
        let mut options = IndexOptions::default();
        if let Some(using) = self.parse_index_type()? {
            options.using = Some(using);
        }
        self.parser.expect_keyword(Keyword::ON)?;
        let table = self.parse_object_name()?;
        let keys = self.parse_key_parts()?;
        self.parse_index_options(&mut options)?;
        while self.parse_one_of_words(&["ALGORITHM", "LOCK"]).is_some() {
            self.parser.consume_token(&Token::Eq);
            self.parse_option_value()?;
        }
        Ok(CreateIndex {
            name,
            table,
            kind,
            keys,
            options,
        })
    }

    /// After `DROP INDEX`
    pub(crate) fn parse_drop_index(&mut self) -> LoweringResult<DropIndex> {
        let if_exists = self.parser.parse_keywords(&[Keyword::IF, Keyword::EXISTS]);
        let name = self.parse_ident()?;
        self.parser.expect_keyword(Keyword::ON)?;
        let table = self.parse_object_name()?;
        Ok(DropIndex {
            name,
            table,
            if_exists,
        })
    }

    /// After `CREATE {DATABASE|SCHEMA}`
    pub(crate) fn parse_create_database(&mut self) -> LoweringResult<CreateDatabase> {
        let if_not_exists = self
            .parser
            .parse_keywords(&[Keyword::IF, Keyword::NOT, Keyword::EXISTS]);
        let name = self.parse_ident()?;
        let mut database = CreateDatabase {
            name,
            if_not_exists,
            charset: None,
            collate: None,
        };
        loop {
            self.parser.parse_keyword(Keyword::DEFAULT);
            if let Some(charset) = self.parse_charset_clause()? {
                database.charset = Some(charset);
            } else if self.parser.parse_keyword(Keyword::COLLATE) {
                self.parser.consume_token(&Token::Eq);
                database.collate = Some(self.parse_option_value()?);
            } else {
                return Ok(database);
            }
        }
    }

    /// After `DROP {DATABASE|SCHEMA}`
    pub(crate) fn parse_drop_database(&mut self) -> LoweringResult<DropDatabase> {
        let if_exists = self.parser.parse_keywords(&[Keyword::IF, Keyword::EXISTS]);
        let name = self.parse_ident()?;
        Ok(DropDatabase { name, if_exists })
    }
}

fn lower_referential_action(action: ast::ReferentialAction) -> ReferenceAction {
    match action {
        ast::ReferentialAction::Restrict => ReferenceAction::Restrict,
        ast::ReferentialAction::Cascade => ReferenceAction::Cascade,
        ast::ReferentialAction::SetNull => ReferenceAction::SetNull,
        ast::ReferentialAction::NoAction => ReferenceAction::NoAction,
        ast::ReferentialAction::SetDefault => ReferenceAction::SetDefault,
    }
}
