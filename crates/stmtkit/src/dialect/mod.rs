//! SQL dialect policies.
//!
//! A [`Dialect`] answers the handful of questions whose answer differs between
//! databases: how identifiers are quoted, how literals are spelled, what a bind
//! placeholder looks like, and where (if anywhere) row limiting goes.
//!
//! New databases are supported by adding another implementation; the builder
//! never inspects which dialect it was handed.
//!
//! ```ignore
//! use stmtkit::dialect::{self, Dialect};
//!
//! let mysql = dialect::for_url("jdbc:mysql://localhost/app")?;
//! assert_eq!(mysql.escape_identifier("group"), "`group`");
//! ```

mod derby;
mod hsqldb;
mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

pub use derby::Derby;
pub use hsqldb::Hsqldb;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use sqlserver::SqlServer;

use crate::error::{StmtError, StmtResult};
use crate::value::Value;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Where a dialect places its row-limiting clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStyle {
    /// `LIMIT n` or `LIMIT offset,n` after everything else.
    TrailingCombined,
    /// `LIMIT n OFFSET m` after everything else.
    TrailingSeparate,
    /// Immediately after `SELECT`, before the column list.
    Prefix,
    /// No row limiting at all.
    Unsupported,
}

/// Rendered pagination text, split by position in the statement.
///
/// Each present fragment ends with a single space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Text placed right after `SELECT ` (and `DISTINCT `, when present).
    pub prefix: Option<String>,
    /// Text placed at the very end of the statement.
    pub trailing: Option<String>,
}

impl Pagination {
    fn trailing(text: String) -> Self {
        Self {
            prefix: None,
            trailing: Some(text),
        }
    }
}

/// Per-database SQL conventions.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// Short lowercase name, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Opening and closing identifier quote characters.
    fn identifier_quotes(&self) -> (char, char) {
        ('`', '`')
    }

    /// Append `name` quoted, doubling any embedded closing quote.
    fn append_escaped_identifier(&self, out: &mut String, name: &str) {
        let (open, close) = self.identifier_quotes();
        out.push(open);
        for ch in name.chars() {
            if ch == close {
                out.push(close);
            }
            out.push(ch);
        }
        out.push(close);
    }

    fn escape_identifier(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.append_escaped_identifier(&mut out, name);
        out
    }

    /// Append `value` as inline SQL text.
    fn append_literal(&self, out: &mut String, value: &Value) {
        match value {
            Value::Null => out.push_str("NULL"),
            Value::Bool(true) => out.push_str("TRUE"),
            Value::Bool(false) => out.push_str("FALSE"),
            Value::SmallInt(v) => push_display(out, v),
            Value::Int(v) => push_display(out, v),
            Value::BigInt(v) => push_display(out, v),
            Value::Real(v) if v.is_finite() => push_display(out, v),
            Value::Double(v) if v.is_finite() => push_display(out, v),
            Value::Real(v) => push_quoted(out, &v.to_string()),
            Value::Double(v) => push_quoted(out, &v.to_string()),
            Value::Text(v) => push_quoted(out, v),
            Value::Bytes(v) => {
                out.push_str("X'");
                for b in v {
                    let _ = write!(out, "{b:02X}");
                }
                out.push('\'');
            }
            Value::Uuid(v) => push_quoted(out, &v.to_string()),
            Value::Date(v) => push_quoted(out, &v.format("%Y-%m-%d").to_string()),
            Value::Timestamp(v) => {
                push_quoted(out, &v.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            Value::TimestampTz(v) => {
                push_quoted(out, &v.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string())
            }
            Value::Json(v) => push_quoted(out, &v.to_string()),
        }
    }

    /// Placeholder text for the 1-based bind position `index`.
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::TrailingCombined
    }

    /// Whether an OFFSET may be rendered without a LIMIT.
    fn supports_offset_without_limit(&self) -> bool {
        false
    }

    /// Prefix pagination text, for [`PaginationStyle::Prefix`] dialects.
    fn prefix_limit(&self, limit: Option<u64>, offset: Option<u64>) -> StmtResult<String> {
        match (limit, offset) {
            (Some(limit), Some(offset)) => Ok(format!("LIMIT {offset} {limit} ")),
            (Some(limit), None) => Ok(format!("LIMIT {limit} ")),
            (None, _) => Err(StmtError::dialect_capability(
                self.name(),
                "OFFSET without LIMIT",
            )),
        }
    }

    /// Render LIMIT/OFFSET for this dialect.
    fn render_pagination(&self, limit: Option<u64>, offset: Option<u64>) -> StmtResult<Pagination> {
        if limit.is_none() && offset.is_none() {
            return Ok(Pagination::default());
        }
        if limit.is_none() && !self.supports_offset_without_limit() {
            return Err(StmtError::dialect_capability(
                self.name(),
                "OFFSET without LIMIT",
            ));
        }

        match self.pagination_style() {
            PaginationStyle::TrailingCombined => {
                let text = match (limit, offset) {
                    (Some(limit), Some(offset)) => format!("LIMIT {offset},{limit} "),
                    (Some(limit), None) => format!("LIMIT {limit} "),
                    (None, Some(offset)) => format!("OFFSET {offset} "),
                    (None, None) => String::new(),
                };
                Ok(Pagination::trailing(text))
            }
            PaginationStyle::TrailingSeparate => {
                let mut text = String::new();
                if let Some(limit) = limit {
                    let _ = write!(text, "LIMIT {limit} ");
                }
                if let Some(offset) = offset {
                    let _ = write!(text, "OFFSET {offset} ");
                }
                Ok(Pagination::trailing(text))
            }
            PaginationStyle::Prefix => Ok(Pagination {
                prefix: Some(self.prefix_limit(limit, offset)?),
                trailing: None,
            }),
            PaginationStyle::Unsupported => Err(StmtError::dialect_capability(
                self.name(),
                "LIMIT or OFFSET",
            )),
        }
    }
}

fn push_display(out: &mut String, v: impl fmt::Display) {
    let _ = write!(out, "{v}");
}

fn push_quoted(out: &mut String, text: &str) {
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
}

/// Pick a built-in dialect from a connection URL.
///
/// Accepts both `scheme://...` and `jdbc:scheme:...` forms.
pub fn for_url(url: &str) -> StmtResult<Arc<dyn Dialect>> {
    let rest = url.strip_prefix("jdbc:").unwrap_or(url);
    let scheme = rest
        .split(':')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    let dialect: Arc<dyn Dialect> = match scheme.as_str() {
        "mysql" | "mariadb" => Arc::new(MySql),
        "postgres" | "postgresql" => Arc::new(Postgres),
        "sqlite" => Arc::new(Sqlite),
        "hsqldb" => Arc::new(Hsqldb),
        "sqlserver" | "mssql" => Arc::new(SqlServer),
        "derby" => Arc::new(Derby),
        _ => {
            return Err(StmtError::invalid_argument(format!(
                "no dialect registered for URL '{url}'"
            )));
        }
    };
    Ok(dialect)
}

#[cfg(test)]
mod tests;
