//! Fluent WHERE clause accumulation.

use super::predicate::{CompareOp, Predicate, render_group};
use super::query_builder::QueryBuilder;
use super::render::RenderCtx;
use crate::arg::{Arg, HeldValue, SelectArg, resolve};
use crate::error::{StmtError, StmtResult};
use crate::schema::{EntitySchema, FieldDescriptor};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    And,
    Or,
}

/// Accumulates predicates for one entity schema.
///
/// Consecutive clauses are implicitly ANDed. `and()` / `or()` are infix: they
/// combine the previous clause with the next one. `not()` negates the next
/// clause. Columns and literal values are checked as each clause is added.
///
/// ```ignore
/// let w = qb.filter();
/// w.eq("val", 12)?.or()?.is_null("val")?;
/// // WHERE `val` = 12 OR `val` IS NULL
/// ```
#[derive(Debug, Clone)]
pub struct Where {
    schema: Arc<EntitySchema>,
    clauses: Vec<Predicate>,
    pending: Option<(Combinator, Predicate)>,
    negations: usize,
}

impl Where {
    /// An empty clause list for `schema`.
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            clauses: Vec::new(),
            pending: None,
            negations: 0,
        }
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// No clauses have been added.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.pending.is_none() && self.negations == 0
    }

    /// The accumulated clauses, in insertion order.
    pub fn clauses(&self) -> &[Predicate] {
        &self.clauses
    }

    // ==================== Comparisons ====================

    pub fn eq(&mut self, column: &str, value: impl Into<Arg>) -> StmtResult<&mut Self> {
        self.compare(column, CompareOp::Eq, value.into())
    }

    pub fn ne(&mut self, column: &str, value: impl Into<Arg>) -> StmtResult<&mut Self> {
        self.compare(column, CompareOp::Ne, value.into())
    }

    pub fn lt(&mut self, column: &str, value: impl Into<Arg>) -> StmtResult<&mut Self> {
        self.compare(column, CompareOp::Lt, value.into())
    }

    pub fn le(&mut self, column: &str, value: impl Into<Arg>) -> StmtResult<&mut Self> {
        self.compare(column, CompareOp::Le, value.into())
    }

    pub fn gt(&mut self, column: &str, value: impl Into<Arg>) -> StmtResult<&mut Self> {
        self.compare(column, CompareOp::Gt, value.into())
    }

    pub fn ge(&mut self, column: &str, value: impl Into<Arg>) -> StmtResult<&mut Self> {
        self.compare(column, CompareOp::Ge, value.into())
    }

    pub fn like(&mut self, column: &str, pattern: impl Into<Arg>) -> StmtResult<&mut Self> {
        self.compare(column, CompareOp::Like, pattern.into())
    }

    /// Compare the identifier column with `value`.
    pub fn id_eq(&mut self, value: impl Into<Arg>) -> StmtResult<&mut Self> {
        let field = self
            .schema
            .identifier_field()
            .ok_or_else(|| StmtError::schema_violation(self.schema.entity_name(), "<identifier>"))?
            .clone();
        let value = check_literal(&field, value.into(), true)?;
        Ok(self.push(Predicate::Comparison {
            field,
            op: CompareOp::Eq,
            value,
        }))
    }

    /// `column BETWEEN low AND high`
    pub fn between(
        &mut self,
        column: &str,
        low: impl Into<Arg>,
        high: impl Into<Arg>,
    ) -> StmtResult<&mut Self> {
        let field = self.field(column)?;
        let low = check_literal(&field, low.into(), true)?;
        let high = check_literal(&field, high.into(), true)?;
        Ok(self.push(Predicate::Between { field, low, high }))
    }

    pub fn is_null(&mut self, column: &str) -> StmtResult<&mut Self> {
        let field = self.field(column)?;
        Ok(self.push(Predicate::Null {
            field,
            negated: false,
        }))
    }

    pub fn is_not_null(&mut self, column: &str) -> StmtResult<&mut Self> {
        let field = self.field(column)?;
        Ok(self.push(Predicate::Null {
            field,
            negated: true,
        }))
    }

    // ==================== Membership ====================

    /// `column IN (values...)`; an empty list never matches.
    pub fn in_list<I>(&mut self, column: &str, values: I) -> StmtResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        self.membership(column, values, false)
    }

    /// `column NOT IN (values...)`; an empty list always matches.
    pub fn not_in<I>(&mut self, column: &str, values: I) -> StmtResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        self.membership(column, values, true)
    }

    /// `column IN (SELECT ...)` over another builder.
    ///
    /// The builder is captured as it is now; later changes to it are not seen.
    /// It must project exactly one column.
    pub fn in_query(&mut self, column: &str, query: &QueryBuilder) -> StmtResult<&mut Self> {
        self.sub_query(column, query, false)
    }

    pub fn not_in_query(&mut self, column: &str, query: &QueryBuilder) -> StmtResult<&mut Self> {
        self.sub_query(column, query, true)
    }

    /// `EXISTS (SELECT ...)` over another builder, captured as it is now.
    pub fn exists(&mut self, query: &QueryBuilder) -> StmtResult<&mut Self> {
        Ok(self.push(Predicate::Exists {
            query: Box::new(query.clone()),
            negated: false,
        }))
    }

    pub fn not_exists(&mut self, query: &QueryBuilder) -> StmtResult<&mut Self> {
        Ok(self.push(Predicate::Exists {
            query: Box::new(query.clone()),
            negated: true,
        }))
    }

    // ==================== Raw ====================

    /// A verbatim SQL fragment. It is not validated, and any `?` in it is
    /// left as written.
    pub fn raw(&mut self, sql: &str) -> StmtResult<&mut Self> {
        Ok(self.push(Predicate::Raw {
            sql: sql.to_string(),
            args: Vec::new(),
        }))
    }

    /// A verbatim SQL fragment whose `?` markers bind `args` in order.
    ///
    /// The number of `?` markers must equal the number of arguments, and any
    /// column named by an argument must exist.
    pub fn raw_with_args<I>(&mut self, sql: &str, args: I) -> StmtResult<&mut Self>
    where
        I: IntoIterator<Item = SelectArg>,
    {
        let args: Vec<SelectArg> = args.into_iter().collect();
        let markers = sql.matches('?').count();
        if markers != args.len() {
            return Err(StmtError::invalid_argument(format!(
                "raw fragment has {} '?' markers but {} arguments",
                markers,
                args.len()
            )));
        }

        let args = args
            .into_iter()
            .map(|arg| {
                let field = arg.column().map(|c| self.field(c)).transpose()?;
                Ok((field, arg))
            })
            .collect::<StmtResult<Vec<_>>>()?;

        Ok(self.push(Predicate::Raw {
            sql: sql.to_string(),
            args,
        }))
    }

    // ==================== Combinators ====================

    /// Combine the previous clause with the next one using AND.
    pub fn and(&mut self) -> StmtResult<&mut Self> {
        self.infix(Combinator::And)
    }

    /// Combine the previous clause with the next one using OR.
    pub fn or(&mut self) -> StmtResult<&mut Self> {
        self.infix(Combinator::Or)
    }

    /// Negate the next clause. Repeated calls nest: `NOT (NOT (...))`.
    pub fn not(&mut self) -> &mut Self {
        self.negations += 1;
        self
    }

    /// Add a parenthesized group whose clauses are ANDed.
    pub fn all<F>(&mut self, build: F) -> StmtResult<&mut Self>
    where
        F: FnOnce(&mut Where) -> StmtResult<()>,
    {
        let group = self.group(build)?;
        Ok(self.push(Predicate::And(group)))
    }

    /// Add a parenthesized group whose clauses are ORed.
    pub fn any<F>(&mut self, build: F) -> StmtResult<&mut Self>
    where
        F: FnOnce(&mut Where) -> StmtResult<()>,
    {
        let group = self.group(build)?;
        Ok(self.push(Predicate::Or(group)))
    }

    /// Add `NOT (...)` around a group whose clauses are ANDed.
    pub fn negate<F>(&mut self, build: F) -> StmtResult<&mut Self>
    where
        F: FnOnce(&mut Where) -> StmtResult<()>,
    {
        let mut group = self.group(build)?;
        let inner = if group.len() == 1 {
            group.remove(0)
        } else {
            Predicate::And(group)
        };
        Ok(self.push(Predicate::Not(Box::new(inner))))
    }

    /// Drop every clause.
    pub fn reset(&mut self) -> &mut Self {
        self.clauses.clear();
        self.pending = None;
        self.negations = 0;
        self
    }

    // ==================== Internals ====================

    fn field(&self, column: &str) -> StmtResult<FieldDescriptor> {
        self.schema.require_field(column).cloned()
    }

    fn compare(&mut self, column: &str, op: CompareOp, value: Arg) -> StmtResult<&mut Self> {
        let field = self.field(column)?;
        let value = check_literal(&field, value, op != CompareOp::Like)?;
        Ok(self.push(Predicate::Comparison { field, op, value }))
    }

    fn membership<I>(&mut self, column: &str, values: I, negated: bool) -> StmtResult<&mut Self>
    where
        I: IntoIterator,
        I::Item: Into<Arg>,
    {
        let field = self.field(column)?;
        let values = values
            .into_iter()
            .map(|v| check_literal(&field, v.into(), true))
            .collect::<StmtResult<Vec<_>>>()?;
        Ok(self.push(Predicate::In {
            field,
            values,
            negated,
        }))
    }

    fn sub_query(
        &mut self,
        column: &str,
        query: &QueryBuilder,
        negated: bool,
    ) -> StmtResult<&mut Self> {
        let field = self.field(column)?;
        query.check_single_column()?;
        Ok(self.push(Predicate::InQuery {
            field,
            query: Box::new(query.clone()),
            negated,
        }))
    }

    fn group<F>(&self, build: F) -> StmtResult<Vec<Predicate>>
    where
        F: FnOnce(&mut Where) -> StmtResult<()>,
    {
        let mut inner = Where::new(self.schema.clone());
        build(&mut inner)?;
        inner.ensure_complete()?;
        if inner.clauses.is_empty() {
            return Err(StmtError::mode_conflict("predicate group has no clauses"));
        }
        Ok(inner.clauses)
    }

    fn infix(&mut self, op: Combinator) -> StmtResult<&mut Self> {
        if self.pending.is_some() || self.negations > 0 {
            return Err(StmtError::mode_conflict(
                "and()/or() must follow a complete clause",
            ));
        }
        let left = self
            .clauses
            .pop()
            .ok_or_else(|| StmtError::mode_conflict("and()/or() needs a preceding clause"))?;
        self.pending = Some((op, left));
        Ok(self)
    }

    fn push(&mut self, predicate: Predicate) -> &mut Self {
        let predicate = (0..std::mem::take(&mut self.negations))
            .fold(predicate, |inner, _| Predicate::Not(Box::new(inner)));

        let combined = match self.pending.take() {
            None => predicate,
            Some((Combinator::And, Predicate::And(mut children))) => {
                children.push(predicate);
                Predicate::And(children)
            }
            Some((Combinator::Or, Predicate::Or(mut children))) => {
                children.push(predicate);
                Predicate::Or(children)
            }
            Some((Combinator::And, left)) => Predicate::And(vec![left, predicate]),
            Some((Combinator::Or, left)) => Predicate::Or(vec![left, predicate]),
        };
        self.clauses.push(combined);
        self
    }

    /// Fail when an `and()`, `or()` or `not()` is still waiting for its operand.
    pub(crate) fn ensure_complete(&self) -> StmtResult<()> {
        if self.pending.is_some() {
            return Err(StmtError::mode_conflict(
                "and()/or() is missing its right-hand clause",
            ));
        }
        if self.negations > 0 {
            return Err(StmtError::mode_conflict("not() is missing its clause"));
        }
        Ok(())
    }

    /// Render the clauses ANDed together. Renders nothing when empty.
    pub(crate) fn render(&self, ctx: &mut RenderCtx<'_>) -> StmtResult<()> {
        self.ensure_complete()?;
        match self.clauses.as_slice() {
            [single] => single.render(ctx),
            clauses => render_group(clauses, true, ctx),
        }
    }
}

/// Coerce literal arguments now so bad values fail at the call that added them.
///
/// Domain objects and placeholders are resolved at render time.
fn check_literal(field: &FieldDescriptor, arg: Arg, coerce: bool) -> StmtResult<Arg> {
    match arg {
        Arg::Literal(value) => {
            let value = resolve(Some(field), &HeldValue::Value(value), coerce)?;
            Ok(Arg::Literal(value))
        }
        other => Ok(other),
    }
}
