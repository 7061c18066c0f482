use super::Dialect;

/// MySQL and MariaDB: backtick quoting, `LIMIT offset,n`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }
}
