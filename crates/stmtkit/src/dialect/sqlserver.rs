use super::{Dialect, PaginationStyle};
use crate::error::{StmtError, StmtResult};

/// Microsoft SQL Server: bracket quoting and `SELECT DISTINCT TOP n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl Dialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('[', ']')
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::Prefix
    }

    fn prefix_limit(&self, limit: Option<u64>, offset: Option<u64>) -> StmtResult<String> {
        match (limit, offset) {
            (Some(limit), None) => Ok(format!("TOP {limit} ")),
            _ => Err(StmtError::dialect_capability(self.name(), "OFFSET")),
        }
    }
}
