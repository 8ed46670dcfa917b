//! SQL identifier and literal escaping
//!
//! Every value that ends up in generated SQL passes through this module.
//! Escaping is total: any [`CellValue`] produces a terminated literal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::CellValue;
use crate::validation::input::is_sql_reserved_word;

static RE_PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"));

/// SQL dialect of the target engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// ClickHouse: backtick identifiers, backslash escapes in strings
    #[default]
    ClickHouse,
    /// Standard SQL: double-quoted identifiers, quotes doubled only
    Ansi,
}

impl SqlDialect {
    /// Identifier quote character
    pub fn quote_char(&self) -> char {
        match self {
            SqlDialect::ClickHouse => '`',
            SqlDialect::Ansi => '"',
        }
    }

    /// Whether a backslash starts an escape sequence inside string literals
    pub fn backslash_escapes(&self) -> bool {
        matches!(self, SqlDialect::ClickHouse)
    }

    /// Boolean literal
    pub fn bool_literal(&self, value: bool) -> &'static str {
        match (self, value) {
            (SqlDialect::ClickHouse, true) => "true",
            (SqlDialect::ClickHouse, false) => "false",
            (SqlDialect::Ansi, true) => "TRUE",
            (SqlDialect::Ansi, false) => "FALSE",
        }
    }

    /// Quote an identifier, doubling embedded quote characters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use table_upload_sdk::export::SqlDialect;
    ///
    /// assert_eq!(SqlDialect::ClickHouse.escape_identifier("a`b"), "`a``b`");
    /// assert_eq!(SqlDialect::Ansi.escape_identifier("user"), "\"user\"");
    /// ```
    pub fn escape_identifier(&self, name: &str) -> String {
        let quote = self.quote_char();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(quote);
        for c in name.chars() {
            if c == quote {
                out.push(quote);
            }
            out.push(c);
        }
        out.push(quote);
        out
    }

    /// Identifier as used by the SQL builders: plain, non-reserved names are
    /// emitted bare, everything else is quoted.
    pub fn identifier(&self, name: &str) -> String {
        if is_plain_identifier(name) {
            name.to_string()
        } else {
            self.escape_identifier(name)
        }
    }

    /// `namespace.name`, each part through [`SqlDialect::identifier`]
    pub fn qualified(&self, namespace: &str, name: &str) -> String {
        format!("{}.{}", self.identifier(namespace), self.identifier(name))
    }

    /// Escape a string into a single-quoted literal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use table_upload_sdk::export::SqlDialect;
    ///
    /// assert_eq!(SqlDialect::ClickHouse.escape_str("O'Brien"), "'O''Brien'");
    /// assert_eq!(SqlDialect::ClickHouse.escape_str(r"C:\tmp"), r"'C:\\tmp'");
    /// assert_eq!(SqlDialect::Ansi.escape_str(r"C:\tmp"), r"'C:\tmp'");
    /// ```
    pub fn escape_str(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('\'');
        for c in value.chars() {
            match c {
                '\\' if self.backslash_escapes() => out.push_str("\\\\"),
                '\'' => out.push_str("''"),
                other => out.push(other),
            }
        }
        out.push('\'');
        out
    }

    /// Render a cell as a SQL literal. `Null` and empty text become `NULL`.
    pub fn escape_literal(&self, value: &CellValue) -> String {
        match value {
            CellValue::Null => "NULL".to_string(),
            CellValue::Text(s) if s.is_empty() => "NULL".to_string(),
            CellValue::Text(s) => self.escape_str(s),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => self.bool_literal(*b).to_string(),
        }
    }

    /// Inverse of [`SqlDialect::escape_str`]. Returns `None` for text that
    /// is not a well-formed single-quoted literal.
    pub fn unescape_literal(&self, literal: &str) -> Option<String> {
        let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' if self.backslash_escapes() => out.push(chars.next()?),
                '\'' => {
                    if chars.next()? != '\'' {
                        return None;
                    }
                    out.push('\'');
                }
                other => out.push(other),
            }
        }
        Some(out)
    }
}

/// Whether a name can be used without quoting
pub fn is_plain_identifier(name: &str) -> bool {
    RE_PLAIN_IDENTIFIER.is_match(name) && !is_sql_reserved_word(name)
}

/// Quote an identifier for the default dialect
pub fn escape_identifier(name: &str) -> String {
    SqlDialect::default().escape_identifier(name)
}

/// Render a cell as a literal for the default dialect
pub fn escape_literal(value: &CellValue) -> String {
    SqlDialect::default().escape_literal(value)
}

/// Escape a string literal for the default dialect
pub fn escape_str(value: &str) -> String {
    SqlDialect::default().escape_str(value)
}

/// Inverse of [`escape_str`] for the default dialect
pub fn unescape_literal(literal: &str) -> Option<String> {
    SqlDialect::default().unescape_literal(literal)
}
