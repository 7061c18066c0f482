//! `tracing` output for prepared statements and rejected builder calls.
//!
//! Enable via the crate feature: `stmtkit = { features = ["tracing"] }` (on by default).

use crate::error::StmtError;
use crate::stmt::PreparedQuery;
use tracing::Level;

/// How prepared SQL is logged.
#[derive(Debug, Clone)]
pub struct SqlLog {
    /// Whether `prepare()` emits an event at all.
    pub enabled: bool,
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for SqlLog {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl SqlLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_bytes(sql, max)).into(),
            _ => sql.into(),
        }
    }

    pub(crate) fn prepared(&self, query: &PreparedQuery) {
        if !self.enabled {
            return;
        }

        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    Level::TRACE => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(query.sql());
        emit_at_level!(
            self.level,
            target: "stmtkit.sql",
            entity = query.entity(),
            result_mode = ?query.result_mode(),
            arg_count = query.arguments().len(),
            sql = %sql,
        );
    }
}

pub(crate) fn rejected(operation: &str, err: &StmtError) {
    tracing::debug!(target: "stmtkit.builder", operation, error = %err, "builder call rejected");
}

/// Cut `sql` to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_bytes("SELECT", 10), "SELECT");
        assert_eq!(truncate_bytes("SELECT", 3), "SEL");
        // 'é' is two bytes; cutting inside it backs off.
        assert_eq!(truncate_bytes("aé", 2), "a");
    }

    #[test]
    fn truncated_sql_gets_ellipsis() {
        let log = SqlLog::new().max_sql_length(6);
        assert_eq!(log.truncate_sql("SELECT * FROM t"), "SELECT...");
        assert_eq!(log.no_truncate().truncate_sql("SELECT * FROM t"), "SELECT * FROM t");
    }
}
