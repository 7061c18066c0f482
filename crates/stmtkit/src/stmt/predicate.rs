//! Predicate tree nodes and their SQL rendering.
//!
//! Rendering keeps parentheses to the minimum needed for correct precedence:
//! an OR nested in an AND (and vice versa) is wrapped, `NOT` always wraps its
//! operand, and leaves are never wrapped.

use super::query_builder::QueryBuilder;
use super::render::RenderCtx;
use crate::arg::{Arg, SelectArg};
use crate::error::StmtResult;
use crate::schema::FieldDescriptor;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Like => "LIKE",
        }
    }

    /// LIKE patterns are text whatever the column type, so they are not coerced.
    fn coerces(self) -> bool {
        self != CompareOp::Like
    }
}

/// One node of a WHERE clause.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `column op value`
    Comparison {
        field: FieldDescriptor,
        op: CompareOp,
        value: Arg,
    },
    /// `column BETWEEN low AND high`
    Between {
        field: FieldDescriptor,
        low: Arg,
        high: Arg,
    },
    /// `column IS [NOT] NULL`
    Null {
        field: FieldDescriptor,
        negated: bool,
    },
    /// `column [NOT] IN (v1,v2,...)`
    In {
        field: FieldDescriptor,
        values: Vec<Arg>,
        negated: bool,
    },
    /// `column [NOT] IN (SELECT ...)`
    InQuery {
        field: FieldDescriptor,
        query: Box<QueryBuilder>,
        negated: bool,
    },
    /// `[NOT] EXISTS (SELECT ...)`
    Exists {
        query: Box<QueryBuilder>,
        negated: bool,
    },
    /// Caller-supplied SQL. With arguments, each `?` binds the matching one;
    /// without, the text is emitted as written.
    Raw {
        sql: String,
        args: Vec<(Option<FieldDescriptor>, SelectArg)>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub(crate) fn render(&self, ctx: &mut RenderCtx<'_>) -> StmtResult<()> {
        match self {
            Predicate::Comparison { field, op, value } => {
                ctx.push_identifier(field.column_name());
                ctx.push(" ");
                ctx.push(op.as_sql());
                ctx.push(" ");
                ctx.push_arg(Some(field), value, op.coerces())?;
            }
            Predicate::Between { field, low, high } => {
                ctx.push_identifier(field.column_name());
                ctx.push(" BETWEEN ");
                ctx.push_arg(Some(field), low, true)?;
                ctx.push(" AND ");
                ctx.push_arg(Some(field), high, true)?;
            }
            Predicate::Null { field, negated } => {
                ctx.push_identifier(field.column_name());
                ctx.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Predicate::In {
                field,
                values,
                negated,
            } => {
                if values.is_empty() {
                    ctx.push(if *negated { "1=1" } else { "1=0" });
                    return Ok(());
                }
                ctx.push_identifier(field.column_name());
                ctx.push(if *negated { " NOT IN (" } else { " IN (" });
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        ctx.push(",");
                    }
                    ctx.push_arg(Some(field), value, true)?;
                }
                ctx.push(")");
            }
            Predicate::InQuery {
                field,
                query,
                negated,
            } => {
                ctx.push_identifier(field.column_name());
                ctx.push(if *negated { " NOT IN (" } else { " IN (" });
                query.render_inner(ctx)?;
                ctx.push(")");
            }
            Predicate::Exists { query, negated } => {
                ctx.push(if *negated { "NOT EXISTS (" } else { "EXISTS (" });
                query.render_inner(ctx)?;
                ctx.push(")");
            }
            Predicate::Raw { sql, args } if args.is_empty() => ctx.push(sql),
            Predicate::Raw { sql, args } => {
                // `raw_with_args` guarantees one argument per `?`.
                let mut parts = sql.split('?');
                ctx.push(parts.next().unwrap_or_default());
                for ((field, arg), part) in args.iter().zip(parts) {
                    ctx.push_arg(field.as_ref(), &Arg::Placeholder(arg.clone()), true)?;
                    ctx.push(part);
                }
            }
            Predicate::And(children) => render_group(children, true, ctx)?,
            Predicate::Or(children) => render_group(children, false, ctx)?,
            Predicate::Not(inner) => {
                ctx.push("NOT (");
                inner.render(ctx)?;
                ctx.push(")");
            }
        }
        Ok(())
    }
}

/// Render `children` joined by AND (or OR), wrapping children of the opposite kind.
pub(crate) fn render_group(
    children: &[Predicate],
    is_and: bool,
    ctx: &mut RenderCtx<'_>,
) -> StmtResult<()> {
    let sep = if is_and { " AND " } else { " OR " };
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            ctx.push(sep);
        }
        let wrap = match child {
            Predicate::Or(_) => is_and,
            Predicate::And(_) => !is_and,
            _ => false,
        };
        if wrap {
            ctx.push("(");
            child.render(ctx)?;
            ctx.push(")");
        } else {
            child.render(ctx)?;
        }
    }
    Ok(())
}
