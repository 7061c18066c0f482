use super::{Dialect, PaginationStyle};

/// HSQLDB: row limiting written right after `SELECT`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hsqldb;

impl Dialect for Hsqldb {
    fn name(&self) -> &'static str {
        "hsqldb"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::Prefix
    }
}
