//! Predicate arguments and their resolution into inline literals or bind arguments.

use crate::error::{StmtError, StmtResult};
use crate::schema::{EntityInstance, FieldDescriptor};
use crate::value::{SqlType, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A reference to a domain object, used as the value of a foreign column.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRef {
    entity: String,
    id: Value,
}

impl EntityRef {
    pub fn new(entity: impl Into<String>, id: impl Into<Value>) -> Self {
        Self {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Capture the type name and identifier of `instance`.
    pub fn of<E: EntityInstance + ?Sized>(instance: &E) -> Self {
        Self::new(instance.entity_name(), instance.id_value())
    }

    pub fn entity_name(&self) -> &str {
        &self.entity
    }

    pub fn id(&self) -> &Value {
        &self.id
    }
}

/// What a [`SelectArg`] currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum HeldValue {
    Value(Value),
    Entity(EntityRef),
}

/// An explicit placeholder.
///
/// Always renders as a dialect placeholder and contributes exactly one bind
/// argument. It may carry its value up front or be filled in on the prepared
/// statement later via [`PreparedQuery::set_argument`](crate::PreparedQuery::set_argument).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectArg {
    column: Option<String>,
    held: Option<HeldValue>,
}

impl SelectArg {
    /// An unset placeholder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<Value>) -> Self {
        Self {
            column: None,
            held: Some(HeldValue::Value(value.into())),
        }
    }

    pub fn with_entity(entity: EntityRef) -> Self {
        Self {
            column: None,
            held: Some(HeldValue::Entity(entity)),
        }
    }

    /// Name the column whose declared type this placeholder binds as.
    ///
    /// Only used by raw predicate fragments; structured predicates already know their column.
    pub fn for_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.held = Some(HeldValue::Value(value.into()));
    }

    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn held(&self) -> Option<&HeldValue> {
        self.held.as_ref()
    }
}

/// A predicate value: a literal, a domain object, or an explicit placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Literal(Value),
    Entity(EntityRef),
    Placeholder(SelectArg),
}

impl Arg {
    /// Use a domain object as the value; its identifier is extracted at render time.
    pub fn entity<E: EntityInstance + ?Sized>(instance: &E) -> Self {
        Arg::Entity(EntityRef::of(instance))
    }
}

macro_rules! impl_from_literal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(v: $ty) -> Self {
                    Arg::Literal(v.into())
                }
            }
        )*
    };
}

impl_from_literal!(
    Value,
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    &str,
    Vec<u8>,
    Uuid,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    serde_json::Value,
);

impl<T: Into<Value>> From<Option<T>> for Arg {
    fn from(v: Option<T>) -> Self {
        Arg::Literal(v.into())
    }
}

impl From<EntityRef> for Arg {
    fn from(v: EntityRef) -> Self {
        Arg::Entity(v)
    }
}

impl From<SelectArg> for Arg {
    fn from(v: SelectArg) -> Self {
        Arg::Placeholder(v)
    }
}

/// A value destined for one placeholder slot, with the type to bind it as.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindArgument {
    /// Column the placeholder compares against, if any.
    pub column: Option<String>,
    pub sql_type: SqlType,
    /// `None` until the placeholder is given a value.
    pub value: Option<Value>,
}

impl BindArgument {
    pub(crate) fn new(field: Option<&FieldDescriptor>, value: Option<Value>) -> Self {
        Self {
            column: field.map(|f| f.column_name().to_string()),
            sql_type: field.map_or(SqlType::Unknown, FieldDescriptor::sql_type),
            value,
        }
    }
}

/// Resolve a held value against the field it is compared with.
///
/// Literals are coerced to the declared column type when `coerce` is set.
/// Domain objects are only accepted on foreign columns, and only when their
/// type is the declared foreign entity or one of its registered subtypes; the
/// object's identifier becomes the value.
pub(crate) fn resolve(
    field: Option<&FieldDescriptor>,
    held: &HeldValue,
    coerce: bool,
) -> StmtResult<Value> {
    let Some(field) = field else {
        return Ok(match held {
            HeldValue::Value(v) => v.clone(),
            HeldValue::Entity(e) => e.id.clone(),
        });
    };

    let value = match held {
        HeldValue::Value(v) => v,
        HeldValue::Entity(e) => {
            let Some(foreign) = field.foreign_schema() else {
                return Err(StmtError::type_mismatch(
                    field.column_name(),
                    field.sql_type().to_string(),
                    format!("instance of {}", e.entity),
                ));
            };
            if !foreign.accepts_entity(&e.entity) {
                return Err(StmtError::type_mismatch(
                    field.column_name(),
                    foreign.entity_name(),
                    e.entity.clone(),
                ));
            }
            &e.id
        }
    };

    if !coerce {
        return Ok(value.clone());
    }
    field.sql_type().coerce(value).ok_or_else(|| {
        StmtError::type_mismatch(
            field.column_name(),
            field.sql_type().to_string(),
            value.type_label(),
        )
    })
}
