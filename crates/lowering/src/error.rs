// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Error types for the lowering layer

use serde::Serialize;
use sqlparser::parser::ParserError;

/// Result type alias for lowering operations
pub type LoweringResult<T> = Result<T, LoweringError>;

/// Errors that can occur while lowering SQL text to IR
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum LoweringError {
    /// The tokenizer rejected the input
    #[error("Tokenize failed: {message}")]
    Tokenize { message: String },

    /// The MySQL parser rejected the input
    #[error("Syntax error: {message}")]
    Syntax { message: String },

    /// Invalid literal value
    #[error("Invalid literal value: {value} cannot be parsed as {type_name}")]
    InvalidLiteral { value: String, type_name: String },

    /// Statement or clause outside the supported MySQL subset
    #[error("Syntax not supported: {feature}. {suggestion}")]
    UnsupportedSyntax { feature: String, suggestion: String },

    /// Recursion limit exceeded (e.g., deeply nested subqueries)
    #[error("Recursion limit exceeded (limit: {limit})")]
    RecursionLimitExceeded { limit: usize },

    /// No statement in the input
    #[error("Empty statement")]
    Empty,
}

impl LoweringError {
    pub(crate) fn unsupported(feature: impl Into<String>) -> Self {
        LoweringError::UnsupportedSyntax {
            feature: feature.into(),
            suggestion: "Rewrite the statement using the supported MySQL subset".to_string(),
        }
    }
}

impl From<ParserError> for LoweringError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::TokenizerError(message) => LoweringError::Tokenize { message },
            ParserError::ParserError(message) => LoweringError::Syntax { message },
            ParserError::RecursionLimitExceeded => LoweringError::RecursionLimitExceeded {
                limit: crate::statement::RECURSION_LIMIT,
            },
        }
    }
}
