//! Example: building SELECT statements for a couple of entities
//!
//! Run with:
//!   cargo run --example select_builder -p stmtkit

use std::sync::Arc;
use stmtkit::prelude::*;
use stmtkit::dialect;

fn main() -> StmtResult<()> {
    let users = EntitySchema::builder("User", "users")
        .field(FieldDescriptor::generated_id("id", SqlType::BigInt))
        .field(FieldDescriptor::new("name", SqlType::Text))
        .field(FieldDescriptor::new("status", SqlType::Text))
        .field(FieldDescriptor::new("age", SqlType::Integer))
        .build()?;
    let orders = EntitySchema::builder("Order", "orders")
        .field(FieldDescriptor::generated_id("id", SqlType::BigInt))
        .field(FieldDescriptor::foreign("user_id", users.clone()))
        .field(FieldDescriptor::new("total", SqlType::Double))
        .build()?;

    let pg = dialect::for_url("postgres://localhost/app")?;

    // ============================================
    // Columns, ordering and pagination
    // ============================================
    println!("=== Columns, ordering and pagination ===");
    let mut qb = QueryBuilder::new(pg.clone(), users.clone());
    qb.select_columns(["name", "age"])?
        .order_by("age", false)?
        .limit(20)
        .offset(40);
    qb.filter()
        .eq("status", "active")?
        .and()?
        .any(|w| {
            w.lt("age", 18)?.or()?.is_null("age")?;
            Ok(())
        })?;
    println!("{}\n", qb.to_sql()?);

    // ============================================
    // Placeholders filled after preparing
    // ============================================
    println!("=== Placeholders ===");
    let mut qb = QueryBuilder::new(pg.clone(), users.clone());
    qb.filter().ge("age", SelectArg::new())?;
    let mut prepared = qb.prepare()?;
    prepared.set_argument(1, "21")?;
    println!("{}", prepared.sql());
    println!("{:?}\n", prepared.arguments());

    // ============================================
    // Sub-query and count
    // ============================================
    println!("=== Sub-query and count ===");
    let mut big_spenders = QueryBuilder::new(pg.clone(), orders.clone());
    big_spenders.select_columns(["user_id"])?.distinct();
    big_spenders.filter().gt("total", 500.0)?;

    let mut qb = QueryBuilder::new(pg.clone(), users.clone());
    qb.filter().in_query("id", &big_spenders)?;
    qb.set_count_of(true);
    let prepared = qb.prepare()?;
    println!("{} -> {:?}\n", prepared.sql(), prepared.result_mode());

    // ============================================
    // Same query, different databases
    // ============================================
    println!("=== Dialects ===");
    for url in [
        "mysql://localhost/app",
        "sqlite::memory:",
        "jdbc:hsqldb:mem:app",
        "sqlserver://localhost",
    ] {
        let mut qb = QueryBuilder::new(dialect::for_url(url)?, users.clone());
        qb.distinct().limit(5);
        qb.filter().like("name", "A%")?;
        println!("{url:<24} {}", qb.to_sql()?);
    }

    // ============================================
    // Rejected calls
    // ============================================
    println!("\n=== Rejected calls ===");
    let mut qb = QueryBuilder::new(pg, users);
    match qb.filter().eq("nickname", "x") {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("unknown column: {e}"),
    }
    qb.select_raw("COUNT(*)")?;
    match qb.prepare()?.ensure_entity_rows() {
        Ok(()) => println!("unexpected success"),
        Err(e) => println!("raw projection: {e}"),
    }

    Ok(())
}
