use crate::arg::{Arg, BindArgument, HeldValue, resolve};
use crate::dialect::Dialect;
use crate::error::StmtResult;
use crate::schema::FieldDescriptor;
use crate::value::Value;

/// Output buffer shared by a statement and every sub-query rendered inside it.
///
/// Placeholders are numbered by the bind arguments already collected, so the
/// argument list always follows the left-to-right placeholder order.
pub(crate) struct RenderCtx<'a> {
    pub(crate) dialect: &'a dyn Dialect,
    pub(crate) sql: String,
    pub(crate) args: Vec<BindArgument>,
    bind_literals: bool,
}

impl<'a> RenderCtx<'a> {
    pub(crate) fn new(dialect: &'a dyn Dialect, bind_literals: bool) -> Self {
        Self {
            dialect,
            sql: String::with_capacity(128),
            args: Vec::new(),
            bind_literals,
        }
    }

    pub(crate) fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    pub(crate) fn push_identifier(&mut self, name: &str) {
        self.dialect.append_escaped_identifier(&mut self.sql, name);
    }

    /// Append a placeholder and record its bind argument.
    pub(crate) fn push_bind(&mut self, field: Option<&FieldDescriptor>, value: Option<Value>) {
        self.args.push(BindArgument::new(field, value));
        let placeholder = self.dialect.placeholder(self.args.len());
        self.sql.push_str(&placeholder);
    }

    /// Append a predicate value compared against `field`.
    pub(crate) fn push_arg(
        &mut self,
        field: Option<&FieldDescriptor>,
        arg: &Arg,
        coerce: bool,
    ) -> StmtResult<()> {
        let value = match arg {
            Arg::Placeholder(select) => {
                let value = select
                    .held()
                    .map(|held| resolve(field, held, coerce))
                    .transpose()?;
                self.push_bind(field, value);
                return Ok(());
            }
            Arg::Literal(v) => resolve(field, &HeldValue::Value(v.clone()), coerce)?,
            Arg::Entity(e) => resolve(field, &HeldValue::Entity(e.clone()), coerce)?,
        };

        if self.bind_literals {
            self.push_bind(field, Some(value));
        } else {
            self.dialect.append_literal(&mut self.sql, &value);
        }
        Ok(())
    }
}
