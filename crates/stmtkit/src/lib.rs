//! # stmtkit
//!
//! Schema-checked SELECT statement construction for an object-relational
//! mapping layer.
//!
//! A [`QueryBuilder`] is bound to one [`EntitySchema`] and one [`Dialect`].
//! Columns are validated as they are named, so malformed queries fail at the
//! call that introduced the problem instead of at the database. Preparing a
//! builder yields a [`PreparedQuery`]: SQL text, bind arguments in placeholder
//! order, and how the result rows should be treated. Executing it is left to
//! the caller.
//!
//! ```ignore
//! use std::sync::Arc;
//! use stmtkit::prelude::*;
//!
//! let foo = EntitySchema::builder("Foo", "foo")
//!     .field(FieldDescriptor::generated_id("id", SqlType::Integer))
//!     .field(FieldDescriptor::new("val", SqlType::Integer))
//!     .build()?;
//!
//! let mut qb = QueryBuilder::new(Arc::new(MySql), foo);
//! qb.select_columns(["val"])?.limit(10);
//! qb.filter().gt("val", 3)?.and()?.lt("val", SelectArg::new())?;
//!
//! let mut prepared = qb.prepare()?;
//! // SELECT `val`,`id` FROM `foo` WHERE `val` > 3 AND `val` < ? LIMIT 10
//! prepared.set_argument(1, 100)?;
//! let rows = client.query(prepared.sql(), &prepared.params()?).await?;
//! ```
//!
//! ## Dialects
//!
//! [`MySql`], [`Postgres`], [`Sqlite`], [`Hsqldb`], [`SqlServer`] and [`Derby`]
//! are built in; [`dialect::for_url`] picks one from a connection URL. Other
//! databases implement [`Dialect`].

pub mod arg;
pub mod config;
pub mod dialect;
pub mod error;
pub mod prelude;
pub mod schema;
pub mod stmt;
#[cfg(feature = "tracing")]
pub mod trace;
pub mod value;

pub use arg::{Arg, BindArgument, EntityRef, HeldValue, SelectArg};
pub use config::BuilderConfig;
pub use dialect::{Derby, Dialect, Hsqldb, MySql, Pagination, PaginationStyle, Postgres, SqlServer, Sqlite};
pub use error::{StmtError, StmtResult};
pub use schema::{EntityInstance, EntitySchema, EntitySchemaBuilder, FieldDescriptor};
pub use stmt::{CompareOp, Predicate, PreparedQuery, QueryBuilder, ResultMode, Where};
#[cfg(feature = "tracing")]
pub use trace::SqlLog;
pub use value::{SqlType, Value};
