// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! DML lowering: INSERT/REPLACE, UPDATE and DELETE

use crate::error::{LoweringError, LoweringResult};
use crate::expr::{lower_column, lower_expr, lower_object_name};
use crate::query::{lower_limit, lower_order_by, lower_query, lower_table_refs};
use crate::statement::MySqlParser;
use sqlparser::ast;
use sqlparser::keywords::Keyword;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::Token;
use sqlreview_ir::{Assignment, Delete, Insert, InsertSource, ObjectName, Update};

impl MySqlParser<'_> {
    /// After `INSERT` or `REPLACE`
    pub(crate) fn parse_insert(&mut self, replace: bool) -> LoweringResult<Insert> {
        self.parse_one_of_words(&["LOW_PRIORITY", "DELAYED", "HIGH_PRIORITY"]);
        let ignore = self.parser.parse_keyword(Keyword::IGNORE);
        self.parser.parse_keyword(Keyword::INTO);
        let table = self.parse_object_name()?;
        if self.peek_keyword(Keyword::PARTITION) {
            return Err(LoweringError::unsupported("INSERT ... PARTITION"));
        }

        let mut columns = Vec::new();
        if self.parser.peek_token().token == Token::LParen
            && !self.peek_nth_keyword(1, Keyword::SELECT)
            && !self.peek_nth_keyword(1, Keyword::WITH)
        {
            if self.parser.peek_nth_token(1).token == Token::RParen {
                self.parser.next_token();
                self.parser.next_token();
            } else {
                columns = self.parse_ident_list()?;
            }
        }

        let source = if self
            .parser
            .parse_one_of_keywords(&[Keyword::VALUES, Keyword::VALUE])
            .is_some()
        {
            let rows = self.parser.parse_comma_separated(parse_values_row)?;
            InsertSource::Values(
                rows.iter()
                    .map(|row| row.iter().map(lower_expr).collect())
                    .collect::<LoweringResult<_>>()?,
            )
        } else if self.parser.parse_keyword(Keyword::SET) {
            InsertSource::Set(self.parse_assignments()?)
        } else if self.peek_keyword(Keyword::SELECT)
            || self.peek_keyword(Keyword::WITH)
            || self.parser.peek_token().token == Token::LParen
        {
            InsertSource::Select(Box::new(lower_query(&self.parser.parse_query()?)?))
        } else {
            return self.expected("VALUES, SET or SELECT");
        };

        let on_duplicate = if self.parser.parse_keywords(&[
            Keyword::ON,
            Keyword::DUPLICATE,
            Keyword::KEY,
            Keyword::UPDATE,
        ]) {
            self.parse_assignments()?
        } else {
            Vec::new()
        };

        Ok(Insert {
            replace,
            ignore,
            table,
            columns,
            source,
            on_duplicate,
        })
    }

    /// `col = expr, ...`
    pub(crate) fn parse_assignments(&mut self) -> LoweringResult<Vec<Assignment>> {
        self.parser
            .parse_comma_separated(Parser::parse_assignment)?
            .iter()
            .map(|a| {
                Ok(Assignment {
                    column: lower_column(&a.id)?,
                    value: lower_expr(&a.value)?,
                })
            })
            .collect()
    }

    /// After `UPDATE`
    pub(crate) fn parse_update(&mut self) -> LoweringResult<Update> {
        self.parse_word("LOW_PRIORITY");
        self.parser.parse_keyword(Keyword::IGNORE);
        let tables = self
            .parser
            .parse_comma_separated(Parser::parse_table_and_joins)?;
        self.parser.expect_keyword(Keyword::SET)?;
        let assignments = self.parse_assignments()?;
        let where_clause = if self.parser.parse_keyword(Keyword::WHERE) {
            Some(lower_expr(&self.parser.parse_expr()?)?)
        } else {
            None
        };
        let order_by = if self.parser.parse_keywords(&[Keyword::ORDER, Keyword::BY]) {
            lower_order_by(&self.parser.parse_comma_separated(Parser::parse_order_by_expr)?)?
        } else {
            Vec::new()
        };
        let limit = if self.parser.parse_keyword(Keyword::LIMIT) {
            lower_limit(self.parser.parse_limit()?.as_ref(), None)?
        } else {
            None
        };
        Ok(Update {
            tables: lower_table_refs(&tables)?,
            assignments,
            where_clause,
            order_by,
            limit,
        })
    }
}

/// `[ROW] (expr, ...)`, possibly empty
fn parse_values_row(parser: &mut Parser<'_>) -> Result<Vec<ast::Expr>, ParserError> {
    parser.parse_keyword(Keyword::ROW);
    parser.expect_token(&Token::LParen)?;
    if parser.consume_token(&Token::RParen) {
        return Ok(Vec::new());
    }
    let row = parser.parse_comma_separated(Parser::parse_expr)?;
    parser.expect_token(&Token::RParen)?;
    Ok(row)
}

/// Lower a `sqlparser` DELETE
///
/// `DELETE FROM t ...` has no explicit targets. `DELETE t1[, t2] FROM refs`
/// and `DELETE FROM t1[, t2] USING refs` name their targets.
pub(crate) fn lower_delete(statement: &ast::Statement) -> LoweringResult<Delete> {
    let ast::Statement::Delete {
        tables,
        from,
        using,
        selection,
        returning,
        order_by,
        limit,
    } = statement
    else {
        return Err(LoweringError::unsupported("DELETE form"));
    };
    if returning.is_some() {
        return Err(LoweringError::unsupported("DELETE ... RETURNING"));
    }
    let (targets, from): (Vec<ObjectName>, _) = match using {
        Some(using) => {
            let targets = lower_table_refs(from)?
                .iter()
                .flat_map(|t| t.tables())
                .map(|(name, _)| name.clone())
                .collect();
            (targets, lower_table_refs(using)?)
        }
        None => (
            tables
                .iter()
                .map(lower_object_name)
                .collect::<LoweringResult<_>>()?,
            lower_table_refs(from)?,
        ),
    };
    Ok(Delete {
        targets,
        from,
        where_clause: selection.as_ref().map(lower_expr).transpose()?,
        order_by: lower_order_by(order_by)?,
        limit: lower_limit(limit.as_ref(), None)?,
    })
}
