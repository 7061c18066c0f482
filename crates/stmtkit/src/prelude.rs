//! Convenient imports for typical `stmtkit` usage.
//!
//! ```ignore
//! use stmtkit::prelude::*;
//! ```

pub use crate::{
    Arg, BuilderConfig, Dialect, EntityInstance, EntityRef, EntitySchema, FieldDescriptor, MySql,
    Postgres, PreparedQuery, QueryBuilder, ResultMode, SelectArg, SqlType, Sqlite, StmtError,
    StmtResult, Value, Where,
};
