//! Error types for stmtkit

use thiserror::Error;

/// Result type alias for statement construction
pub type StmtResult<T> = Result<T, StmtError>;

/// Errors raised while building or preparing a statement.
///
/// Every setter that returns one of these leaves the builder unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StmtError {
    /// A column name is not part of the entity schema
    #[error("Unknown column '{column}' for entity '{entity}'")]
    SchemaViolation { entity: String, column: String },

    /// Two builder modes were mixed, or a statement was used in a mode it cannot serve
    #[error("Mode conflict: {0}")]
    ModeConflict(String),

    /// A value does not fit the declared type of the column it is compared against
    #[error("Type mismatch on column '{column}': expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// The dialect cannot express the requested construct
    #[error("Dialect '{dialect}' does not support {message}")]
    DialectCapability { dialect: String, message: String },

    /// Malformed call input (placeholder count, argument position, dialect URL)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The entity schema itself is inconsistent
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A placeholder has no value at hand-off time
    #[error("Argument {position} (column {column}) has no value")]
    UnsetArgument { position: usize, column: String },
}

impl StmtError {
    /// Create an unknown-column error
    pub fn schema_violation(entity: impl Into<String>, column: impl Into<String>) -> Self {
        Self::SchemaViolation {
            entity: entity.into(),
            column: column.into(),
        }
    }

    /// Create a mode conflict error
    pub fn mode_conflict(message: impl Into<String>) -> Self {
        Self::ModeConflict(message.into())
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a dialect capability error
    pub fn dialect_capability(dialect: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DialectCapability {
            dialect: dialect.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create an invalid schema error
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema(message.into())
    }

    /// Check if this is an unknown-column error
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::SchemaViolation { .. })
    }

    /// Check if this is a mode conflict error
    pub fn is_mode_conflict(&self) -> bool {
        matches!(self, Self::ModeConflict(_))
    }

    /// Check if this is a type mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Check if this is a dialect capability error
    pub fn is_dialect_capability(&self) -> bool {
        matches!(self, Self::DialectCapability { .. })
    }

    /// Check if this is an invalid argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}
