//! Statement construction: the SELECT builder, its WHERE clause tree, and the
//! prepared statement handed to an execution layer.

mod predicate;
mod prepared;
mod query_builder;
mod render;
mod where_builder;

pub use predicate::{CompareOp, Predicate};
pub use prepared::{PreparedQuery, ResultMode};
pub use query_builder::QueryBuilder;
pub use where_builder::Where;
