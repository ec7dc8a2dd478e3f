//! SQL Server dialect: `top <n>` in the select list instead of a trailing limit

use tracing::debug;

use super::{CursorOwner, QueryClauses, SqlQueryGenerator};
use crate::config::{CursorCfg, InternalSqlQueryCfg};
use crate::error::Result;
use crate::value::Row;

/// SQL Server generator
#[derive(Debug, Clone)]
pub struct SqlServerQueryGenerator {
    cfg: InternalSqlQueryCfg,
}

impl SqlServerQueryGenerator {
    /// Create a generator over an initialized config
    pub fn new(cfg: InternalSqlQueryCfg) -> Self {
        Self { cfg }
    }
}

impl QueryClauses for SqlServerQueryGenerator {
    fn query_cfg(&self) -> &InternalSqlQueryCfg {
        &self.cfg
    }

    fn get_select(&self) -> String {
        match self.cfg.limit {
            0 => format!("select * from {} ", self.cfg.table),
            n => format!("select top {} * from {} ", n, self.cfg.table),
        }
    }

    fn get_limit(&self) -> String {
        String::new()
    }
}

impl CursorOwner for SqlServerQueryGenerator {
    fn cursor(&self) -> &CursorCfg {
        &self.cfg.cursor
    }

    fn cursor_mut(&mut self) -> &mut CursorCfg {
        &mut self.cfg.cursor
    }
}

impl SqlQueryGenerator for SqlServerQueryGenerator {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn sql_query_statement(&self) -> Result<String> {
        let sql = self.assemble()?;
        debug!(generator = self.name(), sql = %sql, "Generated SQL query");
        Ok(sql)
    }

    fn update_max_index_value(&mut self, row: &Row) {
        self.cfg.cursor.advance(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::IndexField;

    #[test]
    fn test_top_only_with_limit() {
        let mut cfg = InternalSqlQueryCfg::new(
            "dbo.events",
            0,
            CursorCfg::with_legacy(IndexField::new("id", 7_i64)),
        );
        cfg.init().unwrap();
        let g = SqlServerQueryGenerator::new(cfg);
        assert_eq!(
            g.sql_query_statement().unwrap(),
            "select * from dbo.events where id > '7' order by id ASC"
        );
    }

    #[test]
    fn test_no_cursor() {
        let mut cfg = InternalSqlQueryCfg::new("t", 3, CursorCfg::default());
        cfg.init().unwrap();
        let g = SqlServerQueryGenerator::new(cfg);
        assert_eq!(g.sql_query_statement().unwrap(), "select top 3 * from t ");
    }
}
