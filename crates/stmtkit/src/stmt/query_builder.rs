use super::prepared::{PreparedQuery, ResultMode};
use super::render::RenderCtx;
use super::where_builder::Where;
use crate::config::BuilderConfig;
use crate::dialect::{Dialect, Pagination};
use crate::error::{StmtError, StmtResult};
use crate::schema::EntitySchema;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    All,
    Columns(Vec<String>),
    Raw(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GroupBy {
    Column(String),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum OrderBy {
    Column { column: String, ascending: bool },
    Raw(String),
}

/// SELECT statement builder bound to one entity schema.
///
/// Setters validate against the schema immediately and leave the builder
/// untouched when they fail. Rendering does not consume or change the builder,
/// so `prepare()` may be called any number of times.
///
/// ```ignore
/// let mut qb = QueryBuilder::new(Arc::new(MySql), foo_schema);
/// qb.select_columns(["val"])?.order_by("val", false)?.limit(10);
/// qb.filter().gt("val", 3)?;
/// // SELECT `val`,`id` FROM `foo` WHERE `val` > 3 ORDER BY `val` DESC LIMIT 10
/// let prepared = qb.prepare()?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    dialect: Arc<dyn Dialect>,
    schema: Arc<EntitySchema>,
    config: BuilderConfig,
    selection: Selection,
    distinct: bool,
    count_of: bool,
    group_by: Vec<GroupBy>,
    order_by: Vec<OrderBy>,
    having: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    filter: Option<Where>,
}

impl QueryBuilder {
    /// Create a builder with the default configuration.
    pub fn new(dialect: Arc<dyn Dialect>, schema: Arc<EntitySchema>) -> Self {
        Self::with_config(dialect, schema, BuilderConfig::default())
    }

    pub fn with_config(
        dialect: Arc<dyn Dialect>,
        schema: Arc<EntitySchema>,
        config: BuilderConfig,
    ) -> Self {
        Self {
            dialect,
            schema,
            config,
            selection: Selection::All,
            distinct: false,
            count_of: false,
            group_by: Vec::new(),
            order_by: Vec::new(),
            having: None,
            limit: None,
            offset: None,
            filter: None,
        }
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    // ==================== Projection ====================

    /// Select specific columns. The identifier column is added when rendering.
    ///
    /// Every name is checked before any is added. Rejected once a raw
    /// projection is active.
    pub fn select_columns<I, S>(&mut self, columns: I) -> StmtResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns: Vec<String> = columns.into_iter().map(|c| c.as_ref().to_string()).collect();
        self.guarded("select_columns", |qb| {
            if matches!(qb.selection, Selection::Raw(_)) {
                return Err(StmtError::mode_conflict(
                    "select_columns() cannot follow select_raw()",
                ));
            }
            for column in &columns {
                qb.schema.require_field(column)?;
            }
            if columns.is_empty() {
                return Ok(());
            }

            if !matches!(qb.selection, Selection::Columns(_)) {
                qb.selection = Selection::Columns(Vec::new());
            }
            if let Selection::Columns(selected) = &mut qb.selection {
                for column in columns {
                    if !selected.contains(&column) {
                        selected.push(column);
                    }
                }
            }
            Ok(())
        })
    }

    /// Add a raw projection expression, rendered verbatim.
    ///
    /// Rejected once specific columns are selected.
    pub fn select_raw(&mut self, expression: &str) -> StmtResult<&mut Self> {
        self.guarded("select_raw", |qb| match &mut qb.selection {
            Selection::Columns(_) => Err(StmtError::mode_conflict(
                "select_raw() cannot follow select_columns()",
            )),
            Selection::Raw(expressions) => {
                expressions.push(expression.to_string());
                Ok(())
            }
            Selection::All => {
                qb.selection = Selection::Raw(vec![expression.to_string()]);
                Ok(())
            }
        })
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Render `SELECT COUNT(*)` instead of the projection.
    pub fn set_count_of(&mut self, count_of: bool) -> &mut Self {
        self.count_of = count_of;
        self
    }

    // ==================== Clauses ====================

    /// Group by a schema column. Rejected once a raw projection is active.
    pub fn group_by(&mut self, column: &str) -> StmtResult<&mut Self> {
        self.guarded("group_by", |qb| {
            if matches!(qb.selection, Selection::Raw(_)) {
                return Err(StmtError::mode_conflict(
                    "group_by() cannot follow select_raw(); use group_by_raw()",
                ));
            }
            qb.schema.require_field(column)?;
            qb.group_by.push(GroupBy::Column(column.to_string()));
            Ok(())
        })
    }

    /// Group by a verbatim expression.
    pub fn group_by_raw(&mut self, fragment: &str) -> &mut Self {
        self.group_by.push(GroupBy::Raw(fragment.to_string()));
        self
    }

    /// Order by a schema column.
    pub fn order_by(&mut self, column: &str, ascending: bool) -> StmtResult<&mut Self> {
        self.guarded("order_by", |qb| {
            qb.schema.require_field(column)?;
            qb.order_by.push(OrderBy::Column {
                column: column.to_string(),
                ascending,
            });
            Ok(())
        })
    }

    /// Order by a verbatim fragment, e.g. `"val + equal DESC"`.
    pub fn order_by_raw(&mut self, fragment: &str) -> &mut Self {
        self.order_by.push(OrderBy::Raw(fragment.to_string()));
        self
    }

    /// Set the HAVING fragment, replacing any previous one. Not validated.
    pub fn having(&mut self, fragment: &str) -> &mut Self {
        self.having = Some(fragment.to_string());
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// The WHERE clause builder, created on first use.
    pub fn filter(&mut self) -> &mut Where {
        self.filter
            .get_or_insert_with(|| Where::new(self.schema.clone()))
    }

    /// Replace the WHERE clause with one built elsewhere for the same entity.
    pub fn set_where(&mut self, filter: Where) -> StmtResult<&mut Self> {
        self.guarded("set_where", |qb| {
            if filter.schema().entity_name() != qb.schema.entity_name() {
                return Err(StmtError::mode_conflict(format!(
                    "WHERE clause for '{}' used on a builder for '{}'",
                    filter.schema().entity_name(),
                    qb.schema.entity_name()
                )));
            }
            qb.filter = Some(filter);
            Ok(())
        })
    }

    /// Reset every clause to the `SELECT * FROM <table>` baseline.
    pub fn clear(&mut self) -> &mut Self {
        self.selection = Selection::All;
        self.distinct = false;
        self.count_of = false;
        self.group_by.clear();
        self.order_by.clear();
        self.having = None;
        self.limit = None;
        self.offset = None;
        self.filter = None;
        self
    }

    // ==================== Rendering ====================

    /// Render the statement and its bind arguments.
    pub fn prepare(&self) -> StmtResult<PreparedQuery> {
        let mut ctx = RenderCtx::new(self.dialect.as_ref(), self.config.bind_literals);
        if let Err(err) = self.render_statement(&mut ctx, true) {
            #[cfg(feature = "tracing")]
            crate::trace::rejected("prepare", &err);
            return Err(err);
        }

        let (result_mode, result_columns) = self.result_shape();
        let prepared = PreparedQuery::new(
            ctx.sql,
            ctx.args,
            result_mode,
            self.schema.entity_name().to_string(),
            result_columns,
        );

        #[cfg(feature = "tracing")]
        self.config.sql_log.prepared(&prepared);

        Ok(prepared)
    }

    /// Render only the SQL text.
    pub fn to_sql(&self) -> StmtResult<String> {
        let mut ctx = RenderCtx::new(self.dialect.as_ref(), self.config.bind_literals);
        self.render_statement(&mut ctx, true)?;
        Ok(ctx.sql)
    }

    /// Fail unless this builder projects exactly one column, as `IN (SELECT ...)` needs.
    pub(crate) fn check_single_column(&self) -> StmtResult<()> {
        let single = self.count_of
            || match &self.selection {
                Selection::All => false,
                Selection::Columns(columns) => columns.len() == 1,
                Selection::Raw(expressions) => expressions.len() == 1,
            };
        if single {
            Ok(())
        } else {
            Err(StmtError::mode_conflict(format!(
                "sub-query on '{}' must select exactly one column",
                self.schema.entity_name()
            )))
        }
    }

    /// Render as a sub-query into an enclosing statement, without the trailing space.
    pub(crate) fn render_inner(&self, ctx: &mut RenderCtx<'_>) -> StmtResult<()> {
        self.render_statement(ctx, false)?;
        if ctx.sql.ends_with(' ') {
            ctx.sql.pop();
        }
        Ok(())
    }

    fn render_statement(&self, ctx: &mut RenderCtx<'_>, outer: bool) -> StmtResult<()> {
        if !self.count_of {
            return self.render_select(ctx, outer, true);
        }

        // ORDER BY and pagination cannot change a count.
        if self.distinct || !self.group_by.is_empty() || self.having.is_some() {
            ctx.push("SELECT COUNT(*) FROM (");
            self.render_select(ctx, false, false)?;
            if ctx.sql.ends_with(' ') {
                ctx.sql.pop();
            }
            ctx.push(") AS t ");
            return Ok(());
        }

        ctx.push("SELECT COUNT(*) FROM ");
        ctx.push_identifier(self.schema.table_name());
        ctx.push(" ");
        self.render_where(ctx)
    }

    fn render_select(
        &self,
        ctx: &mut RenderCtx<'_>,
        inject_id: bool,
        ordered: bool,
    ) -> StmtResult<()> {
        let pagination = if ordered {
            self.dialect.render_pagination(self.limit, self.offset)?
        } else {
            Pagination::default()
        };

        ctx.push("SELECT ");
        if self.distinct {
            ctx.push("DISTINCT ");
        }
        if let Some(prefix) = &pagination.prefix {
            ctx.push(prefix);
        }
        self.render_projection(ctx, inject_id);
        ctx.push(" FROM ");
        ctx.push_identifier(self.schema.table_name());
        ctx.push(" ");

        self.render_where(ctx)?;

        if !self.group_by.is_empty() {
            ctx.push("GROUP BY ");
            for (i, group) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ctx.push(",");
                }
                match group {
                    GroupBy::Column(column) => ctx.push_identifier(column),
                    GroupBy::Raw(fragment) => ctx.push(fragment),
                }
            }
            ctx.push(" ");
        }

        if let Some(having) = &self.having {
            ctx.push("HAVING ");
            ctx.push(having);
            ctx.push(" ");
        }

        if ordered && !self.order_by.is_empty() {
            ctx.push("ORDER BY ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    ctx.push(",");
                }
                match order {
                    OrderBy::Column { column, ascending } => {
                        ctx.push_identifier(column);
                        if !ascending {
                            ctx.push(" DESC");
                        }
                    }
                    OrderBy::Raw(fragment) => ctx.push(fragment),
                }
            }
            ctx.push(" ");
        }

        if let Some(trailing) = &pagination.trailing {
            ctx.push(trailing);
        }
        Ok(())
    }

    fn render_projection(&self, ctx: &mut RenderCtx<'_>, inject_id: bool) {
        match &self.selection {
            Selection::All => ctx.push("*"),
            Selection::Raw(expressions) => ctx.push(&expressions.join(", ")),
            Selection::Columns(columns) => {
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        ctx.push(",");
                    }
                    ctx.push_identifier(column);
                }
                if inject_id {
                    if let Some(id) = self.schema.identifier_field() {
                        if !columns.iter().any(|c| c == id.column_name()) {
                            ctx.push(",");
                            ctx.push_identifier(id.column_name());
                        }
                    }
                }
            }
        }
    }

    fn render_where(&self, ctx: &mut RenderCtx<'_>) -> StmtResult<()> {
        match &self.filter {
            Some(filter) if !filter.is_empty() => {
                ctx.push("WHERE ");
                filter.render(ctx)?;
                ctx.push(" ");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn result_shape(&self) -> (ResultMode, Vec<String>) {
        if self.count_of {
            return (ResultMode::ScalarCount, Vec::new());
        }
        match &self.selection {
            Selection::All => (
                ResultMode::EntityRows,
                self.schema
                    .fields()
                    .iter()
                    .map(|f| f.column_name().to_string())
                    .collect(),
            ),
            Selection::Columns(columns) => {
                let mut out = columns.clone();
                if let Some(id) = self.schema.identifier_field() {
                    if !out.iter().any(|c| c == id.column_name()) {
                        out.push(id.column_name().to_string());
                    }
                }
                (ResultMode::EntityRows, out)
            }
            Selection::Raw(expressions) => {
                let hydrates = self.schema.identifier_field().is_some_and(|id| {
                    let escaped = self.dialect.escape_identifier(id.column_name());
                    expressions
                        .iter()
                        .any(|e| e.trim() == id.column_name() || e.trim() == escaped)
                });
                let mode = if hydrates {
                    ResultMode::EntityRows
                } else {
                    ResultMode::RawColumns
                };
                (mode, expressions.clone())
            }
        }
    }

    /// Run a fallible setter; on failure the builder is left as it was.
    fn guarded<F>(&mut self, operation: &str, apply: F) -> StmtResult<&mut Self>
    where
        F: FnOnce(&mut Self) -> StmtResult<()>,
    {
        match apply(self) {
            Ok(()) => Ok(self),
            Err(err) => {
                #[cfg(feature = "tracing")]
                crate::trace::rejected(operation, &err);
                #[cfg(not(feature = "tracing"))]
                let _ = operation;
                Err(err)
            }
        }
    }
}
