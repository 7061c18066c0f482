//! Runtime values carried by predicates and bind arguments.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{IsNull, ToSql, Type};
use uuid::Uuid;

/// Declared data type of a column.
///
/// The execution layer uses it to pick the parameter type when binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Text,
    Bytes,
    Uuid,
    Date,
    Timestamp,
    TimestampTz,
    Json,
    /// No declared type; any value is accepted and binding is left to the driver.
    Unknown,
}

impl SqlType {
    /// The Postgres wire type used when binding a value of this type.
    pub fn pg_type(self) -> Option<Type> {
        Some(match self {
            SqlType::Boolean => Type::BOOL,
            SqlType::SmallInt => Type::INT2,
            SqlType::Integer => Type::INT4,
            SqlType::BigInt => Type::INT8,
            SqlType::Real => Type::FLOAT4,
            SqlType::Double => Type::FLOAT8,
            SqlType::Text => Type::TEXT,
            SqlType::Bytes => Type::BYTEA,
            SqlType::Uuid => Type::UUID,
            SqlType::Date => Type::DATE,
            SqlType::Timestamp => Type::TIMESTAMP,
            SqlType::TimestampTz => Type::TIMESTAMPTZ,
            SqlType::Json => Type::JSONB,
            SqlType::Unknown => return None,
        })
    }

    fn is_numeric(self) -> bool {
        matches!(
            self,
            SqlType::SmallInt | SqlType::Integer | SqlType::BigInt | SqlType::Real | SqlType::Double
        )
    }

    fn is_temporal(self) -> bool {
        matches!(self, SqlType::Date | SqlType::Timestamp | SqlType::TimestampTz)
    }

    /// Convert `value` into a form comparable with a column of this type.
    ///
    /// Numbers are converted into this type's variant. Temporal types accept
    /// each other, and text is accepted where the database parses it (uuid,
    /// temporal, json).
    /// Text compared against a numeric column is parsed into the column's type.
    /// Returns `None` when the value cannot stand for this type.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        let Some(found) = value.sql_type() else {
            return Some(Value::Null);
        };
        if self == SqlType::Unknown || self == found {
            return Some(value.clone());
        }
        match (self, value) {
            (t, _) if t.is_numeric() && found.is_numeric() => convert_numeric(t, value),
            (t, Value::Text(text)) if t.is_numeric() => parse_numeric(t, text.trim()),
            (t, _) if t.is_temporal() => {
                (found.is_temporal() || found == SqlType::Text).then(|| value.clone())
            }
            (SqlType::Uuid | SqlType::Json, Value::Text(_)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Whether a value can be compared against a column of this type.
    pub fn accepts(self, value: &Value) -> bool {
        self.coerce(value).is_some()
    }
}

/// Convert a number into the variant of `target`.
///
/// Floats become integers only when integral and in range.
fn convert_numeric(target: SqlType, value: &Value) -> Option<Value> {
    let wide = match value {
        Value::SmallInt(v) => i64::from(*v),
        Value::Int(v) => i64::from(*v),
        Value::BigInt(v) => *v,
        Value::Real(v) => return float_into(target, f64::from(*v)),
        Value::Double(v) => return float_into(target, *v),
        _ => return None,
    };
    match target {
        SqlType::SmallInt => i16::try_from(wide).ok().map(Value::SmallInt),
        SqlType::Integer => i32::try_from(wide).ok().map(Value::Int),
        SqlType::BigInt => Some(Value::BigInt(wide)),
        SqlType::Real => Some(Value::Real(wide as f32)),
        SqlType::Double => Some(Value::Double(wide as f64)),
        _ => None,
    }
}

fn float_into(target: SqlType, v: f64) -> Option<Value> {
    match target {
        SqlType::Real => Some(Value::Real(v as f32)),
        SqlType::Double => Some(Value::Double(v)),
        _ if v.fract() != 0.0 || !(-(2f64.powi(63))..2f64.powi(63)).contains(&v) => None,
        _ => convert_numeric(target, &Value::BigInt(v as i64)),
    }
}

fn parse_numeric(target: SqlType, text: &str) -> Option<Value> {
    match target {
        SqlType::SmallInt => text.parse().ok().map(Value::SmallInt),
        SqlType::Integer => text.parse().ok().map(Value::Int),
        SqlType::BigInt => text.parse().ok().map(Value::BigInt),
        SqlType::Real => text.parse().ok().map(Value::Real),
        SqlType::Double => text.parse().ok().map(Value::Double),
        _ => None,
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Boolean => "boolean",
            SqlType::SmallInt => "smallint",
            SqlType::Integer => "integer",
            SqlType::BigInt => "bigint",
            SqlType::Real => "real",
            SqlType::Double => "double",
            SqlType::Text => "text",
            SqlType::Bytes => "bytes",
            SqlType::Uuid => "uuid",
            SqlType::Date => "date",
            SqlType::Timestamp => "timestamp",
            SqlType::TimestampTz => "timestamptz",
            SqlType::Json => "json",
            SqlType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A concrete value, either rendered inline as a literal or bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Json(serde_json::Value),
}

impl Value {
    /// The natural type of this value, `None` for `NULL`.
    pub fn sql_type(&self) -> Option<SqlType> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => SqlType::Boolean,
            Value::SmallInt(_) => SqlType::SmallInt,
            Value::Int(_) => SqlType::Integer,
            Value::BigInt(_) => SqlType::BigInt,
            Value::Real(_) => SqlType::Real,
            Value::Double(_) => SqlType::Double,
            Value::Text(_) => SqlType::Text,
            Value::Bytes(_) => SqlType::Bytes,
            Value::Uuid(_) => SqlType::Uuid,
            Value::Date(_) => SqlType::Date,
            Value::Timestamp(_) => SqlType::Timestamp,
            Value::TimestampTz(_) => SqlType::TimestampTz,
            Value::Json(_) => SqlType::Json,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type label used in error messages.
    pub(crate) fn type_label(&self) -> String {
        self.sql_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "null".to_string())
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_value! {
    bool => Bool,
    i16 => SmallInt,
    i32 => Int,
    i64 => BigInt,
    f32 => Real,
    f64 => Double,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    &[u8] => Bytes,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveDateTime => Timestamp,
    DateTime<Utc> => TimestampTz,
    serde_json::Value => Json,
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl ToSql for Value {
    /// Each variant checks `ty` against its own Rust type, so a value that
    /// does not match the parameter type is an error rather than wrong bytes.
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::SmallInt(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => v.to_sql_checked(ty, out),
            Value::BigInt(v) => v.to_sql_checked(ty, out),
            Value::Real(v) => v.to_sql_checked(ty, out),
            Value::Double(v) => v.to_sql_checked(ty, out),
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::TimestampTz(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        <bool as ToSql>::accepts(ty)
            || <i16 as ToSql>::accepts(ty)
            || <i32 as ToSql>::accepts(ty)
            || <i64 as ToSql>::accepts(ty)
            || <f32 as ToSql>::accepts(ty)
            || <f64 as ToSql>::accepts(ty)
            || <String as ToSql>::accepts(ty)
            || <Vec<u8> as ToSql>::accepts(ty)
            || <Uuid as ToSql>::accepts(ty)
            || <NaiveDate as ToSql>::accepts(ty)
            || <NaiveDateTime as ToSql>::accepts(ty)
            || <DateTime<Utc> as ToSql>::accepts(ty)
            || <serde_json::Value as ToSql>::accepts(ty)
    }

    tokio_postgres::types::to_sql_checked!();
}
