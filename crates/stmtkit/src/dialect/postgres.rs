use super::{Dialect, PaginationStyle};

/// PostgreSQL: double-quoted identifiers and numbered `$n` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::TrailingSeparate
    }

    fn supports_offset_without_limit(&self) -> bool {
        true
    }
}
