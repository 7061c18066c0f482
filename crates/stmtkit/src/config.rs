//! Builder configuration.

#[cfg(feature = "tracing")]
use crate::trace::SqlLog;

/// Settings shared by a builder and the sub-queries rendered inside it.
///
/// Defaults: literals are rendered inline and prepared SQL is logged at DEBUG.
#[derive(Debug, Clone, Default)]
pub struct BuilderConfig {
    /// Render literal predicate values as placeholders with bind arguments
    /// instead of inline SQL text.
    pub bind_literals: bool,
    /// How prepared statements are logged.
    #[cfg(feature = "tracing")]
    pub sql_log: SqlLog,
}

impl BuilderConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind literal values instead of inlining them.
    pub fn with_bind_literals(mut self, bind: bool) -> Self {
        self.bind_literals = bind;
        self
    }

    /// Replace the SQL logging settings.
    #[cfg(feature = "tracing")]
    pub fn with_sql_log(mut self, sql_log: SqlLog) -> Self {
        self.sql_log = sql_log;
        self
    }

    /// Stop logging prepared statements.
    #[cfg(feature = "tracing")]
    pub fn without_sql_log(mut self) -> Self {
        self.sql_log = self.sql_log.disabled();
        self
    }
}
