use super::*;
use crate::error::StmtError;
use crate::value::Value;

#[test]
fn test_escape_identifier_per_dialect() {
    assert_eq!(MySql.escape_identifier("group"), "`group`");
    assert_eq!(Postgres.escape_identifier("group"), "\"group\"");
    assert_eq!(SqlServer.escape_identifier("group"), "[group]");
}

#[test]
fn test_escape_identifier_doubles_closing_quote() {
    assert_eq!(MySql.escape_identifier("we`ird"), "`we``ird`");
    assert_eq!(Sqlite.escape_identifier("a\"b"), "\"a\"\"b\"");
    assert_eq!(SqlServer.escape_identifier("x]y"), "[x]]y]");
}

#[test]
fn test_literals() {
    let lit = |v: Value| {
        let mut out = String::new();
        MySql.append_literal(&mut out, &v);
        out
    };
    assert_eq!(lit(Value::Int(1)), "1");
    assert_eq!(lit(Value::Null), "NULL");
    assert_eq!(lit(Value::Bool(true)), "TRUE");
    assert_eq!(lit(Value::Text("it's".into())), "'it''s'");
    assert_eq!(lit(Value::Bytes(vec![0xde, 0xad])), "X'DEAD'");
    assert_eq!(lit(Value::Double(f64::NAN)), "'NaN'");
}

#[test]
fn test_placeholders() {
    assert_eq!(MySql.placeholder(3), "?");
    assert_eq!(Postgres.placeholder(3), "$3");
}

#[test]
fn test_no_pagination_renders_nothing() {
    for dialect in [&MySql as &dyn Dialect, &Postgres, &Derby, &SqlServer] {
        assert_eq!(dialect.render_pagination(None, None).unwrap(), Pagination::default());
    }
}

#[test]
fn test_trailing_combined() {
    let p = MySql.render_pagination(Some(103), None).unwrap();
    assert_eq!(p.trailing.as_deref(), Some("LIMIT 103 "));
    let p = MySql.render_pagination(Some(2), Some(1)).unwrap();
    assert_eq!(p.trailing.as_deref(), Some("LIMIT 1,2 "));
    assert!(p.prefix.is_none());
}

#[test]
fn test_trailing_separate() {
    let p = Sqlite.render_pagination(Some(213), Some(200)).unwrap();
    assert_eq!(p.trailing.as_deref(), Some("LIMIT 213 OFFSET 200 "));
}

#[test]
fn test_offset_without_limit() {
    let err = MySql.render_pagination(None, Some(5)).unwrap_err();
    assert!(err.is_dialect_capability());
    let err = Sqlite.render_pagination(None, Some(5)).unwrap_err();
    assert!(err.is_dialect_capability());

    let p = Postgres.render_pagination(None, Some(5)).unwrap();
    assert_eq!(p.trailing.as_deref(), Some("OFFSET 5 "));
}

#[test]
fn test_prefix_pagination() {
    let p = Hsqldb.render_pagination(Some(103), None).unwrap();
    assert_eq!(p.prefix.as_deref(), Some("LIMIT 103 "));
    assert!(p.trailing.is_none());
    let p = Hsqldb.render_pagination(Some(10), Some(20)).unwrap();
    assert_eq!(p.prefix.as_deref(), Some("LIMIT 20 10 "));

    let p = SqlServer.render_pagination(Some(7), None).unwrap();
    assert_eq!(p.prefix.as_deref(), Some("TOP 7 "));
    assert!(SqlServer.render_pagination(Some(7), Some(1)).is_err());
}

#[test]
fn test_unsupported_pagination() {
    let err = Derby.render_pagination(Some(1), None).unwrap_err();
    assert_eq!(
        err,
        StmtError::dialect_capability("derby", "LIMIT or OFFSET")
    );
}

#[test]
fn test_for_url() {
    assert_eq!(for_url("jdbc:mysql://localhost/app").unwrap().name(), "mysql");
    assert_eq!(for_url("postgresql://u@h/db").unwrap().name(), "postgres");
    assert_eq!(for_url("sqlite::memory:").unwrap().name(), "sqlite");
    assert_eq!(for_url("jdbc:derby:memory:x").unwrap().name(), "derby");
    assert!(for_url("jdbc:oracle:thin:@h").unwrap_err().is_invalid_argument());
}
