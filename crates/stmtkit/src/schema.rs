//! Entity schema descriptors.
//!
//! A schema maps one entity type onto a table: the ordered column list, which
//! column (if any) is the identifier, and which columns reference another
//! entity. Builders only ever read a schema, so it is shared behind an `Arc`.

use crate::error::{StmtError, StmtResult};
use crate::value::{SqlType, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// One mapped column of an entity.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    column: String,
    sql_type: SqlType,
    id: bool,
    generated_id: bool,
    foreign: Option<Arc<EntitySchema>>,
}

impl FieldDescriptor {
    /// A plain data column.
    pub fn new(column: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            column: column.into(),
            sql_type,
            id: false,
            generated_id: false,
            foreign: None,
        }
    }

    /// An identifier column supplied by the caller.
    pub fn id(column: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            id: true,
            ..Self::new(column, sql_type)
        }
    }

    /// An identifier column generated by the database.
    pub fn generated_id(column: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            id: true,
            generated_id: true,
            ..Self::new(column, sql_type)
        }
    }

    /// A column holding the identifier of another entity.
    ///
    /// The declared type is taken from the foreign schema's identifier at build time.
    pub fn foreign(column: impl Into<String>, schema: Arc<EntitySchema>) -> Self {
        Self {
            foreign: Some(schema),
            ..Self::new(column, SqlType::Unknown)
        }
    }

    pub fn column_name(&self) -> &str {
        &self.column
    }

    pub fn sql_type(&self) -> SqlType {
        self.sql_type
    }

    pub fn is_id(&self) -> bool {
        self.id
    }

    pub fn is_generated_id(&self) -> bool {
        self.generated_id
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign.is_some()
    }

    /// Schema of the referenced entity, for foreign columns.
    pub fn foreign_schema(&self) -> Option<&Arc<EntitySchema>> {
        self.foreign.as_ref()
    }
}

/// The table mapping of one entity type.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    entity: String,
    table: String,
    fields: Vec<FieldDescriptor>,
    subtypes: Vec<String>,
}

impl EntitySchema {
    /// Start describing `entity` stored in `table`.
    pub fn builder(entity: impl Into<String>, table: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder {
            entity: entity.into(),
            table: table.into(),
            fields: Vec::new(),
            subtypes: Vec::new(),
        }
    }

    pub fn entity_name(&self) -> &str {
        &self.entity
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Columns in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by its column name.
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.column == name)
    }

    /// Like [`field_by_name`](Self::field_by_name), failing with `SchemaViolation`.
    pub fn require_field(&self, name: &str) -> StmtResult<&FieldDescriptor> {
        self.field_by_name(name)
            .ok_or_else(|| StmtError::schema_violation(&self.entity, name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.field_by_name(name).is_some()
    }

    pub fn identifier_field(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id)
    }

    /// Whether an instance of `entity` may stand in for this schema's entity.
    ///
    /// The entity itself and its registered subtypes qualify; supertypes never do.
    pub fn accepts_entity(&self, entity: &str) -> bool {
        self.entity == entity || self.subtypes.iter().any(|s| s == entity)
    }
}

/// Builder for [`EntitySchema`], validating the column set on `build`.
#[derive(Debug)]
#[must_use]
pub struct EntitySchemaBuilder {
    entity: String,
    table: String,
    fields: Vec<FieldDescriptor>,
    subtypes: Vec<String>,
}

impl EntitySchemaBuilder {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Register an entity type whose instances are accepted in place of this one.
    pub fn subtype(mut self, entity: impl Into<String>) -> Self {
        self.subtypes.push(entity.into());
        self
    }

    /// Validate and freeze the schema.
    ///
    /// Fails when column names repeat, when more than one identifier is declared,
    /// or when a foreign column points at a schema without an identifier.
    pub fn build(mut self) -> StmtResult<Arc<EntitySchema>> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.column.as_str()) {
                return Err(StmtError::invalid_schema(format!(
                    "column '{}' declared twice on '{}'",
                    field.column, self.entity
                )));
            }
        }

        let ids = self.fields.iter().filter(|f| f.id).count();
        if ids > 1 {
            return Err(StmtError::invalid_schema(format!(
                "'{}' declares {} identifier columns",
                self.entity, ids
            )));
        }

        for field in &mut self.fields {
            if let Some(foreign) = &field.foreign {
                let id = foreign.identifier_field().ok_or_else(|| {
                    StmtError::invalid_schema(format!(
                        "column '{}' references '{}', which has no identifier",
                        field.column, foreign.entity
                    ))
                })?;
                field.sql_type = id.sql_type;
            }
        }

        Ok(Arc::new(EntitySchema {
            entity: self.entity,
            table: self.table,
            fields: self.fields,
            subtypes: self.subtypes,
        }))
    }
}

/// A domain object that can be used as the value of a foreign-column predicate.
pub trait EntityInstance {
    /// Name of the instance's concrete entity type.
    fn entity_name(&self) -> &str;

    /// The instance's identifier value.
    fn id_value(&self) -> Value;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> Arc<EntitySchema> {
        EntitySchema::builder("Bar", "bar")
            .field(FieldDescriptor::generated_id("id", SqlType::Integer))
            .field(FieldDescriptor::new("val", SqlType::Integer))
            .subtype("BarSuperClass")
            .build()
            .unwrap()
    }

    #[test]
    fn foreign_field_takes_identifier_type() {
        let baz = EntitySchema::builder("Baz", "baz")
            .field(FieldDescriptor::generated_id("id", SqlType::BigInt))
            .field(FieldDescriptor::foreign("bar_id", bar()))
            .build()
            .unwrap();

        let field = baz.field_by_name("bar_id").unwrap();
        assert!(field.is_foreign());
        assert_eq!(field.sql_type(), SqlType::Integer);
        assert_eq!(field.foreign_schema().unwrap().table_name(), "bar");
    }

    #[test]
    fn duplicate_columns_are_rejected() {
        let err = EntitySchema::builder("Foo", "foo")
            .field(FieldDescriptor::new("val", SqlType::Integer))
            .field(FieldDescriptor::new("val", SqlType::Text))
            .build()
            .unwrap_err();
        assert!(matches!(err, StmtError::InvalidSchema(_)));
    }

    #[test]
    fn at_most_one_identifier() {
        let err = EntitySchema::builder("Foo", "foo")
            .field(FieldDescriptor::id("a", SqlType::Integer))
            .field(FieldDescriptor::id("b", SqlType::Integer))
            .build()
            .unwrap_err();
        assert!(matches!(err, StmtError::InvalidSchema(_)));
    }

    #[test]
    fn foreign_schema_needs_identifier() {
        let no_id = EntitySchema::builder("Log", "log")
            .field(FieldDescriptor::new("line", SqlType::Text))
            .build()
            .unwrap();
        let err = EntitySchema::builder("Entry", "entry")
            .field(FieldDescriptor::foreign("log_id", no_id))
            .build()
            .unwrap_err();
        assert!(matches!(err, StmtError::InvalidSchema(_)));
    }

    #[test]
    fn subtypes_are_accepted_supertypes_are_not() {
        let bar = bar();
        assert!(bar.accepts_entity("Bar"));
        assert!(bar.accepts_entity("BarSuperClass"));
        assert!(!bar.accepts_entity("Object"));
    }

    #[test]
    fn require_field_reports_entity() {
        let err = bar().require_field("nope").unwrap_err();
        assert_eq!(err, StmtError::schema_violation("Bar", "nope"));
    }
}
