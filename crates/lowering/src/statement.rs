// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Statement dispatch over the `sqlparser` MySQL parser
//!
//! Statements the MySQL dialect of `sqlparser` models fully (`USE`, `SELECT`,
//! `DELETE`, `DROP TABLE`) are parsed into its AST and lowered. The DDL and
//! write statements whose MySQL clauses it does not model (column positions,
//! index options, `INSERT ... SET`, `UPDATE ... LIMIT`, `DROP INDEX ... ON`,
//! database charsets) are driven here on the same parser, reusing its
//! expression, query, table and assignment grammar.

use crate::dml::lower_delete;
use crate::error::{LoweringError, LoweringResult};
use crate::expr::lower_object_name;
use crate::query::lower_query;
use sqlparser::ast;
use sqlparser::dialect::MySqlDialect;
use sqlparser::keywords::Keyword;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Token;
use sqlreview_ir::{ConstraintKind, DropTable, ObjectName, Statement};

pub(crate) static DIALECT: MySqlDialect = MySqlDialect {};

/// Nesting limit for subqueries and parenthesized expressions
pub const RECURSION_LIMIT: usize = 64;

/// MySQL statement parser producing IR statements
pub struct MySqlParser<'a> {
    pub(crate) parser: Parser<'a>,
}

impl MySqlParser<'static> {
    /// Tokenize `sql` with the MySQL dialect
    pub fn new(sql: &str) -> LoweringResult<Self> {
        let parser = Parser::new(&DIALECT)
            .with_recursion_limit(RECURSION_LIMIT)
            .try_with_sql(sql)?;
        Ok(Self { parser })
    }
}

impl MySqlParser<'_> {
    /// Every statement of a batch, separated by `;`
    pub fn parse_statements(&mut self) -> LoweringResult<Vec<Statement>> {
        let mut statements = Vec::new();
        loop {
            while self.parser.consume_token(&Token::SemiColon) {}
            if self.is_eof() {
                return Ok(statements);
            }
            statements.push(self.parse_statement()?);
            if !self.is_eof() && !self.parser.consume_token(&Token::SemiColon) {
                return self.expected("end of statement");
            }
        }
    }

    /// Exactly one statement; anything after it other than `;` is an error
    pub fn parse_single(&mut self) -> LoweringResult<Statement> {
        while self.parser.consume_token(&Token::SemiColon) {}
        if self.is_eof() {
            return Err(LoweringError::Empty);
        }
        let statement = self.parse_statement()?;
        while self.parser.consume_token(&Token::SemiColon) {}
        if !self.is_eof() {
            return self.expected("end of statement");
        }
        Ok(statement)
    }

    fn parse_statement(&mut self) -> LoweringResult<Statement> {
        let next = self.parser.peek_token();
        match &next.token {
            Token::LParen => self.parse_ast_statement(),
            Token::Word(w) => match w.keyword {
                Keyword::USE | Keyword::SELECT | Keyword::WITH => self.parse_ast_statement(),
                Keyword::DELETE => {
                    self.parser.next_token();
                    while self.parse_word("LOW_PRIORITY")
                        || self.parse_word("QUICK")
                        || self.parser.parse_keyword(Keyword::IGNORE)
                    {}
                    let delete = self.parser.parse_delete()?;
                    lower_ast_statement(&delete)
                }
                Keyword::INSERT => {
                    self.parser.next_token();
                    Ok(Statement::Insert(Box::new(self.parse_insert(false)?)))
                }
                Keyword::REPLACE => {
                    self.parser.next_token();
                    Ok(Statement::Insert(Box::new(self.parse_insert(true)?)))
                }
                Keyword::UPDATE => {
                    self.parser.next_token();
                    Ok(Statement::Update(Box::new(self.parse_update()?)))
                }
                Keyword::CREATE => {
                    self.parser.next_token();
                    self.parse_create()
                }
                Keyword::ALTER => {
                    self.parser.next_token();
                    if self.parser.parse_keyword(Keyword::TABLE) {
                        return Ok(Statement::AlterTable(self.parse_alter_table()?));
                    }
                    Err(self.unsupported_here("ALTER"))
                }
                Keyword::DROP => {
                    self.parser.next_token();
                    self.parse_drop()
                }
                _ => Err(self.unsupported_here("")),
            },
            _ => Err(self.unsupported_here("")),
        }
    }

    fn parse_ast_statement(&mut self) -> LoweringResult<Statement> {
        let statement = self.parser.parse_statement()?;
        lower_ast_statement(&statement)
    }

    fn parse_create(&mut self) -> LoweringResult<Statement> {
        if self
            .parser
            .parse_one_of_keywords(&[Keyword::DATABASE, Keyword::SCHEMA])
            .is_some()
        {
            return Ok(Statement::CreateDatabase(self.parse_create_database()?));
        }
        self.parser.parse_keyword(Keyword::TEMPORARY);
        if self.parser.parse_keyword(Keyword::TABLE) {
            return Ok(Statement::CreateTable(Box::new(self.parse_create_table()?)));
        }
        let kind = if self.parser.parse_keyword(Keyword::UNIQUE) {
            ConstraintKind::Unique
        } else if self
            .parser
            .parse_one_of_keywords(&[Keyword::FULLTEXT, Keyword::SPATIAL])
            .is_some()
        {
            ConstraintKind::Fulltext
        } else {
            ConstraintKind::Index
        };
        if self.peek_keyword(Keyword::INDEX) {
            return Ok(Statement::CreateIndex(self.parse_create_index(kind)?));
        }
        Err(self.unsupported_here("CREATE"))
    }

    fn parse_drop(&mut self) -> LoweringResult<Statement> {
        if self
            .parser
            .parse_one_of_keywords(&[Keyword::DATABASE, Keyword::SCHEMA])
            .is_some()
        {
            return Ok(Statement::DropDatabase(self.parse_drop_database()?));
        }
        if self.parser.parse_keyword(Keyword::INDEX) {
            return Ok(Statement::DropIndex(self.parse_drop_index()?));
        }
        if self.peek_keyword(Keyword::TABLE) || self.peek_keyword(Keyword::TEMPORARY) {
            let drop = self.parser.parse_drop()?;
            return lower_ast_statement(&drop);
        }
        Err(self.unsupported_here("DROP"))
    }

    /// Unsupported-statement error naming the keyword that follows `prefix`
    fn unsupported_here(&self, prefix: &str) -> LoweringError {
        let next = match self.parser.peek_token().token {
            Token::Word(w) => w.value.to_uppercase(),
            other => other.to_string(),
        };
        let feature = if prefix.is_empty() {
            format!("{} statement", next)
        } else {
            format!("{} {} statement", prefix, next)
        };
        LoweringError::unsupported(feature)
    }

    // Token helpers for MySQL words that are not `sqlparser` keywords

    pub(crate) fn is_eof(&self) -> bool {
        self.parser.peek_token().token == Token::EOF
    }

    pub(crate) fn peek_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.parser.peek_token().token, Token::Word(w) if w.keyword == keyword)
    }

    pub(crate) fn peek_nth_keyword(&self, n: usize, keyword: Keyword) -> bool {
        matches!(self.parser.peek_nth_token(n).token, Token::Word(w) if w.keyword == keyword)
    }

    fn peek_nth_word(&self, n: usize, word: &str) -> bool {
        matches!(
            self.parser.peek_nth_token(n).token,
            Token::Word(w) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(word)
        )
    }

    pub(crate) fn peek_word(&self, word: &str) -> bool {
        self.peek_nth_word(0, word)
    }

    /// Consume the unquoted word `word` if it is next
    pub(crate) fn parse_word(&mut self, word: &str) -> bool {
        if self.peek_word(word) {
            self.parser.next_token();
            true
        } else {
            false
        }
    }

    /// Consume the whole word sequence, or nothing
    pub(crate) fn parse_words(&mut self, words: &[&str]) -> bool {
        if words.iter().enumerate().all(|(i, w)| self.peek_nth_word(i, w)) {
            for _ in words {
                self.parser.next_token();
            }
            true
        } else {
            false
        }
    }

    /// Consume whichever of `words` comes next, returning it upper-cased
    pub(crate) fn parse_one_of_words(&mut self, words: &[&str]) -> Option<String> {
        let found = words.iter().find(|w| self.peek_word(w))?;
        self.parser.next_token();
        Some(found.to_uppercase())
    }

    pub(crate) fn expected<T>(&self, expected: &str) -> LoweringResult<T> {
        Ok(self.parser.expected(expected, self.parser.peek_token())?)
    }

    pub(crate) fn parse_ident(&mut self) -> LoweringResult<String> {
        Ok(self.parser.parse_identifier(false)?.value)
    }

    pub(crate) fn parse_object_name(&mut self) -> LoweringResult<ObjectName> {
        lower_object_name(&self.parser.parse_object_name(false)?)
    }

    /// Option value such as `InnoDB`, `utf8mb4`, `DYNAMIC` or a quoted string
    pub(crate) fn parse_option_value(&mut self) -> LoweringResult<String> {
        let next = self.parser.next_token();
        match next.token {
            Token::Word(w) => Ok(w.value),
            Token::Number(n, _) => Ok(n),
            Token::SingleQuotedString(s) | Token::DoubleQuotedString(s) => Ok(s),
            _ => Ok(self.parser.expected("option value", next)?),
        }
    }

    /// `(ident, ...)`
    pub(crate) fn parse_ident_list(&mut self) -> LoweringResult<Vec<String>> {
        let idents = self
            .parser
            .parse_parenthesized_column_list(sqlparser::parser::IsOptional::Mandatory, false)?;
        Ok(idents.into_iter().map(|i| i.value).collect())
    }
}

/// Lower a statement parsed by `sqlparser` itself
fn lower_ast_statement(statement: &ast::Statement) -> LoweringResult<Statement> {
    match statement {
        ast::Statement::Use { db_name } => Ok(Statement::Use(db_name.value.clone())),
        ast::Statement::Query(query) => Ok(Statement::Select(Box::new(lower_query(query)?))),
        ast::Statement::Delete { .. } => Ok(Statement::Delete(Box::new(lower_delete(statement)?))),
        ast::Statement::Drop {
            object_type: ast::ObjectType::Table,
            if_exists,
            names,
            ..
        } => Ok(Statement::DropTable(DropTable {
            tables: names
                .iter()
                .map(lower_object_name)
                .collect::<LoweringResult<_>>()?,
            if_exists: *if_exists,
        })),
        other => Err(LoweringError::unsupported(format!("{} statement", ast_tag(other)))),
    }
}

fn ast_tag(statement: &ast::Statement) -> String {
    statement
        .to_string()
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
