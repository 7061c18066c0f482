use crate::arg::BindArgument;
use crate::error::{StmtError, StmtResult};
use crate::value::Value;
use serde::Serialize;
use tokio_postgres::types::ToSql;

/// How the execution layer should treat result rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultMode {
    /// Rows hydrate into entity instances.
    EntityRows,
    /// A single `COUNT(*)` scalar.
    ScalarCount,
    /// Raw projected columns, returned as-is.
    RawColumns,
}

/// A rendered statement ready for an execution layer.
///
/// Bind arguments are in the same order as the placeholders in [`sql`](Self::sql).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedQuery {
    sql: String,
    arguments: Vec<BindArgument>,
    result_mode: ResultMode,
    entity: String,
    result_columns: Vec<String>,
}

impl PreparedQuery {
    pub(crate) fn new(
        sql: String,
        arguments: Vec<BindArgument>,
        result_mode: ResultMode,
        entity: String,
        result_columns: Vec<String>,
    ) -> Self {
        Self {
            sql,
            arguments,
            result_mode,
            entity,
            result_columns,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn arguments(&self) -> &[BindArgument] {
        &self.arguments
    }

    pub fn result_mode(&self) -> ResultMode {
        self.result_mode
    }

    /// Entity type the statement is bound to.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Columns the execution layer can map onto entity fields.
    ///
    /// Empty for count queries; for raw projections, the expressions themselves.
    pub fn result_columns(&self) -> &[String] {
        &self.result_columns
    }

    /// Fail unless rows from this statement can be hydrated into entities.
    pub fn ensure_entity_rows(&self) -> StmtResult<()> {
        match self.result_mode {
            ResultMode::EntityRows => Ok(()),
            mode => Err(StmtError::mode_conflict(format!(
                "statement for '{}' returns {:?}, not entity rows",
                self.entity, mode
            ))),
        }
    }

    /// Give the placeholder at 1-based `position` a value.
    ///
    /// The value is coerced to the argument's declared type.
    pub fn set_argument(&mut self, position: usize, value: impl Into<Value>) -> StmtResult<()> {
        let count = self.arguments.len();
        let arg = position
            .checked_sub(1)
            .and_then(|i| self.arguments.get_mut(i))
            .ok_or_else(|| {
                StmtError::invalid_argument(format!(
                    "argument position {position} out of range 1..={count}"
                ))
            })?;

        let value = value.into();
        let coerced = arg.sql_type.coerce(&value).ok_or_else(|| {
            StmtError::type_mismatch(
                arg.column.as_deref().unwrap_or("?"),
                arg.sql_type.to_string(),
                value.type_label(),
            )
        })?;
        arg.value = Some(coerced);
        Ok(())
    }

    /// Borrow the bind values in placeholder order, for `tokio-postgres` style execution.
    ///
    /// Fails if any placeholder still has no value.
    pub fn params(&self) -> StmtResult<Vec<&(dyn ToSql + Sync)>> {
        self.arguments
            .iter()
            .enumerate()
            .map(|(i, arg)| match &arg.value {
                Some(value) => Ok(value as &(dyn ToSql + Sync)),
                None => Err(StmtError::UnsetArgument {
                    position: i + 1,
                    column: arg.column.clone().unwrap_or_else(|| "?".to_string()),
                }),
            })
            .collect()
    }
}
