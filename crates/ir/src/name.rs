// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Object names (`schema.table`) and identifier quoting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Possibly schema-qualified object name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectName {
    /// Optional schema (database) qualifier
    pub schema: Option<String>,
    /// Object name
    pub name: String,
}

impl ObjectName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Schema qualifier, falling back to `current` when the name is unqualified
    pub fn schema_or<'a>(&'a self, current: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(current)
    }

    /// Resolve against the current schema, producing a fully qualified name
    pub fn resolve(&self, current: &str) -> ObjectName {
        ObjectName {
            schema: Some(self.schema_or(current).to_string()),
            name: self.name.clone(),
        }
    }

    /// `schema.name` without quoting, as used in diagnostics
    pub fn plain(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{}.", quote_ident(schema))?;
        }
        write!(f, "{}", quote_ident(&self.name))
    }
}

/// Quote an identifier with backticks, doubling embedded backticks
pub fn quote_ident(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Render an identifier bare when it is a plain word, quoted otherwise
pub(crate) fn display_ident(ident: &str) -> String {
    let plain = !ident.is_empty()
        && !ident.starts_with(|c: char| c.is_ascii_digit())
        && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain {
        ident.to_string()
    } else {
        quote_ident(ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_display() {
        let name = ObjectName::new("exist_tb_1").with_schema("exist_db");
        assert_eq!(name.to_string(), "`exist_db`.`exist_tb_1`");
        assert_eq!(name.plain(), "exist_db.exist_tb_1");
    }

    #[test]
    fn test_resolve_uses_current_schema() {
        let name = ObjectName::new("t1").resolve("db1");
        assert_eq!(name.schema.as_deref(), Some("db1"));

        let qualified = ObjectName::new("t1").with_schema("db2").resolve("db1");
        assert_eq!(qualified.schema.as_deref(), Some("db2"));
    }

    #[test]
    fn test_quote_ident_escapes_backticks() {
        assert_eq!(quote_ident("a`b"), "`a``b`");
        assert_eq!(display_ident("user_id"), "user_id");
        assert_eq!(display_ident("my col"), "`my col`");
    }
}
