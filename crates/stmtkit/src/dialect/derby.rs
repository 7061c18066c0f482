use super::{Dialect, PaginationStyle};

/// Apache Derby: no row limiting support.
#[derive(Debug, Clone, Copy, Default)]
pub struct Derby;

impl Dialect for Derby {
    fn name(&self) -> &'static str {
        "derby"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    fn pagination_style(&self) -> PaginationStyle {
        PaginationStyle::Unsupported
    }
}
