use super::{Dialect, PaginationStyle};

/// SQLite: `LIMIT n OFFSET m`; an offset needs a limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::TrailingSeparate
    }
}
