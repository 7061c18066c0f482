//! End-to-end statement rendering against small entity models.

use std::sync::Arc;
use stmtkit::prelude::*;
use stmtkit::{Hsqldb, ResultMode};

const ID: &str = "id";
const VAL: &str = "val";
const EQUAL: &str = "equal";

fn foo_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("Foo", "foo")
        .field(FieldDescriptor::id(ID, SqlType::Integer))
        .field(FieldDescriptor::new(VAL, SqlType::Integer))
        .field(FieldDescriptor::new(EQUAL, SqlType::Integer))
        .build()
        .unwrap()
}

fn bar_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("Bar", "bar")
        .field(FieldDescriptor::generated_id(ID, SqlType::Integer))
        .field(FieldDescriptor::new(VAL, SqlType::Integer))
        .subtype("BarSubClass")
        .build()
        .unwrap()
}

fn baz_schema() -> Arc<EntitySchema> {
    EntitySchema::builder("Baz", "baz")
        .field(FieldDescriptor::generated_id(ID, SqlType::Integer))
        .field(FieldDescriptor::foreign("bar", bar_schema()))
        .build()
        .unwrap()
}

struct Bar {
    id: i32,
}

impl EntityInstance for Bar {
    fn entity_name(&self) -> &str {
        "Bar"
    }

    fn id_value(&self) -> Value {
        self.id.into()
    }
}

struct BarSubClass {
    id: i32,
}

impl EntityInstance for BarSubClass {
    fn entity_name(&self) -> &str {
        "BarSubClass"
    }

    fn id_value(&self) -> Value {
        self.id.into()
    }
}

struct Unrelated;

impl EntityInstance for Unrelated {
    fn entity_name(&self) -> &str {
        "Object"
    }

    fn id_value(&self) -> Value {
        Value::Null
    }
}

fn foo_qb() -> QueryBuilder {
    QueryBuilder::new(Arc::new(MySql), foo_schema())
}

#[test]
fn select_all() {
    assert_eq!(foo_qb().to_sql().unwrap(), "SELECT * FROM `foo` ");
}

#[test]
fn select_columns() {
    let mut qb = foo_qb();
    qb.select_columns([ID, VAL, EQUAL]).unwrap();
    assert_eq!(qb.to_sql().unwrap(), "SELECT `id`,`val`,`equal` FROM `foo` ");
}

#[test]
fn select_columns_appends_identifier() {
    let mut qb = foo_qb();
    qb.select_columns([VAL]).unwrap();
    assert_eq!(qb.to_sql().unwrap(), "SELECT `val`,`id` FROM `foo` ");
}

#[test]
fn select_unknown_column_fails() {
    let mut qb = foo_qb();
    let err = qb.select_columns(["unknown column"]).unwrap_err();
    assert!(err.is_schema_violation());
}

#[test]
fn group_by() {
    let mut qb = foo_qb();
    qb.group_by(VAL).unwrap().group_by(ID).unwrap();
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM `foo` GROUP BY `val`,`id` ");
}

#[test]
fn order_by() {
    let mut qb = foo_qb();
    qb.order_by(VAL, true).unwrap().order_by(ID, true).unwrap();
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM `foo` ORDER BY `val`,`id` ");

    let mut qb = foo_qb();
    qb.order_by(VAL, false).unwrap();
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM `foo` ORDER BY `val` DESC ");
}

#[test]
fn distinct() {
    let mut qb = foo_qb();
    qb.distinct();
    assert_eq!(qb.to_sql().unwrap(), "SELECT DISTINCT * FROM `foo` ");
}

#[test]
fn limit() {
    let mut qb = foo_qb();
    qb.limit(103);
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM `foo` LIMIT 103 ");
}

#[test]
fn offset_combines_with_limit() {
    let mut qb = foo_qb();
    qb.offset(1).limit(2);
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM `foo` LIMIT 1,2 ");
}

#[test]
fn limit_after_select() {
    let mut qb = QueryBuilder::new(Arc::new(Hsqldb), foo_schema());
    qb.limit(103);
    assert_eq!(qb.to_sql().unwrap(), "SELECT LIMIT 103 * FROM \"foo\" ");
}

#[test]
fn limit_and_offset_as_separate_keywords() {
    let mut qb = QueryBuilder::new(Arc::new(Sqlite), foo_schema());
    qb.limit(213);
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM \"foo\" LIMIT 213 ");

    qb.offset(200);
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM \"foo\" LIMIT 213 OFFSET 200 ");
}

#[test]
fn where_literal_is_inlined() {
    let mut qb = foo_qb();
    qb.filter().eq(ID, "1").unwrap();
    let prepared = qb.prepare().unwrap();
    assert_eq!(prepared.sql(), "SELECT * FROM `foo` WHERE `id` = 1 ");
    assert!(prepared.arguments().is_empty());
}

#[test]
fn where_select_arg_and_reuse() {
    let mut qb = foo_qb();
    qb.filter().eq(ID, SelectArg::new()).unwrap();
    let expected = "SELECT * FROM `foo` WHERE `id` = ? ";
    assert_eq!(qb.to_sql().unwrap(), expected);

    let filter = qb.filter().clone();
    qb.set_where(filter).unwrap();
    assert_eq!(qb.to_sql().unwrap(), expected);

    let prepared = qb.prepare().unwrap();
    assert_eq!(prepared.arguments().len(), 1);
    assert_eq!(prepared.arguments()[0].sql_type, SqlType::Integer);
}

#[test]
fn where_shared_between_builders() {
    let mut first = foo_qb();
    first.filter().gt(VAL, 10).unwrap();
    let shared = first.filter().clone();

    let mut second = QueryBuilder::new(Arc::new(Postgres), foo_schema());
    second.set_where(shared).unwrap();
    assert_eq!(second.to_sql().unwrap(), "SELECT * FROM \"foo\" WHERE \"val\" > 10 ");
}

#[test]
fn clear_resets_everything() {
    let mut qb = foo_qb();
    qb.select_columns([VAL]).unwrap();
    qb.group_by(VAL).unwrap();
    qb.having("COUNT(VAL) > 1");
    qb.filter().eq(ID, 1).unwrap();
    qb.clear();
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM `foo` ");

    // Raw mode is gone too.
    qb.select_columns([VAL]).unwrap();
}

#[test]
fn raw_count_cannot_hydrate_entities() {
    let mut qb = foo_qb();
    qb.select_raw("COUNT(*)").unwrap();
    let prepared = qb.prepare().unwrap();
    assert_eq!(prepared.sql(), "SELECT COUNT(*) FROM `foo` ");
    assert_eq!(prepared.result_mode(), ResultMode::RawColumns);
    assert!(prepared.ensure_entity_rows().is_err());
}

#[test]
fn inner_count_of() {
    let mut bar_qb = QueryBuilder::new(Arc::new(MySql), bar_schema());
    bar_qb.select_columns([ID]).unwrap();
    bar_qb.filter().eq(VAL, 12).unwrap();

    let mut qb = foo_qb();
    qb.filter()
        .in_list(ID, [1, 2, 3])
        .unwrap()
        .and()
        .unwrap()
        .in_query(VAL, &bar_qb)
        .unwrap();
    qb.set_count_of(true);

    let prepared = qb.prepare().unwrap();
    assert_eq!(
        prepared.sql(),
        "SELECT COUNT(*) FROM `foo` WHERE `id` IN (1,2,3) AND `val` IN (SELECT `id` FROM `bar` WHERE `val` = 12) "
    );
    assert_eq!(prepared.result_mode(), ResultMode::ScalarCount);
}

#[test]
fn foreign_instance_and_id_are_equivalent() {
    let bar = Bar { id: 7 };

    let mut by_instance = QueryBuilder::new(Arc::new(Postgres), baz_schema());
    by_instance
        .filter()
        .eq("bar", SelectArg::with_entity(EntityRef::of(&bar)))
        .unwrap();
    let mut by_id = QueryBuilder::new(Arc::new(Postgres), baz_schema());
    by_id.filter().eq("bar", SelectArg::with_value(bar.id)).unwrap();

    let a = by_instance.prepare().unwrap();
    let b = by_id.prepare().unwrap();
    assert_eq!(a.sql(), "SELECT * FROM \"baz\" WHERE \"bar\" = $1 ");
    assert_eq!(a.sql(), b.sql());
    assert_eq!(a.arguments(), b.arguments());
    assert_eq!(a.arguments()[0].value, Some(Value::Int(7)));

    let mut inline = QueryBuilder::new(Arc::new(MySql), baz_schema());
    inline.filter().eq("bar", Arg::entity(&bar)).unwrap();
    assert_eq!(inline.to_sql().unwrap(), "SELECT * FROM `baz` WHERE `bar` = 7 ");
}

#[test]
fn foreign_subtype_is_accepted() {
    let sub = BarSubClass { id: 3 };
    let mut qb = QueryBuilder::new(Arc::new(MySql), baz_schema());
    qb.filter().eq("bar", Arg::entity(&sub)).unwrap();
    assert_eq!(qb.to_sql().unwrap(), "SELECT * FROM `baz` WHERE `bar` = 3 ");
}

#[test]
fn foreign_unrelated_type_is_rejected_at_render() {
    let mut qb = QueryBuilder::new(Arc::new(MySql), baz_schema());
    qb.filter().eq("bar", Arg::entity(&Unrelated)).unwrap();
    let err = qb.prepare().unwrap_err();
    assert!(err.is_type_mismatch());
}

#[test]
fn reserved_word_columns_are_escaped() {
    let reserved = EntitySchema::builder("Reserved", "reserved")
        .field(FieldDescriptor::generated_id(ID, SqlType::Integer))
        .field(FieldDescriptor::new("group", SqlType::Text))
        .build()
        .unwrap();

    let mut qb = QueryBuilder::new(Arc::new(MySql), reserved.clone());
    qb.filter().eq("group", "something").unwrap();
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT * FROM `reserved` WHERE `group` = 'something' "
    );

    let mut qb = QueryBuilder::new(Arc::new(Postgres), reserved);
    qb.select_columns(["group"]).unwrap().group_by("group").unwrap();
    assert_eq!(
        qb.to_sql().unwrap(),
        "SELECT \"group\",\"id\" FROM \"reserved\" GROUP BY \"group\" "
    );
}

#[test]
fn dialect_from_url() {
    let dialect = stmtkit::dialect::for_url("jdbc:hsqldb:mem:test").unwrap();
    let mut qb = QueryBuilder::new(dialect, foo_schema());
    qb.limit(10).offset(5);
    assert_eq!(qb.to_sql().unwrap(), "SELECT LIMIT 5 10 * FROM \"foo\" ");
}
