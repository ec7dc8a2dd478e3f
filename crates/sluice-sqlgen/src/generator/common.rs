//! Common dialect (MySQL, PostgreSQL, SQLite and anything unrecognized)

use tracing::debug;

use super::{CursorOwner, QueryClauses, SqlQueryGenerator};
use crate::config::{CursorCfg, InternalSqlQueryCfg};
use crate::error::Result;
use crate::security::quote_literal;
use crate::value::Row;

/// Generator emitting a trailing `limit` clause
#[derive(Debug, Clone)]
pub struct CommonQueryGenerator {
    cfg: InternalSqlQueryCfg,
}

impl CommonQueryGenerator {
    /// Create a generator over an initialized config
    pub fn new(cfg: InternalSqlQueryCfg) -> Self {
        Self { cfg }
    }
}

impl QueryClauses for CommonQueryGenerator {
    fn query_cfg(&self) -> &InternalSqlQueryCfg {
        &self.cfg
    }

    fn quote_column(&self, name: &str) -> String {
        quote_literal(name)
    }
}

impl CursorOwner for CommonQueryGenerator {
    fn cursor(&self) -> &CursorCfg {
        &self.cfg.cursor
    }

    fn cursor_mut(&mut self) -> &mut CursorCfg {
        &mut self.cfg.cursor
    }
}

impl SqlQueryGenerator for CommonQueryGenerator {
    fn name(&self) -> &'static str {
        "common"
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
    use crate::value::Value;

    fn generator(limit: u64, fields: Vec<IndexField>) -> CommonQueryGenerator {
        let mut cfg = InternalSqlQueryCfg::new("t", limit, CursorCfg::with_fields(fields));
        cfg.init().unwrap();
        CommonQueryGenerator::new(cfg)
    }

    #[test]
    fn test_no_cursor() {
        let g = generator(0, vec![]);
        assert_eq!(g.sql_query_statement().unwrap(), "select * from t ");
        let g = generator(5, vec![]);
        assert_eq!(g.sql_query_statement().unwrap(), "select * from t limit 5");
    }

    #[test]
    fn test_multi_field_with_limit() {
        let g = generator(
            10,
            vec![IndexField::new("col1", 1_i64), IndexField::new("col2", 2_i64)],
        );
        assert_eq!(
            g.sql_query_statement().unwrap(),
            "select * from t where col1 > '1' AND col2 > '2' order by 'col1' ASC, 'col2' ASC limit 10"
        );
    }

    #[test]
    fn test_null_value_has_no_condition() {
        let g = generator(0, vec![IndexField::new("id", Value::Null)]);
        assert_eq!(g.sql_query_statement().unwrap(), "select * from t order by 'id' ASC");
    }

    #[test]
    fn test_value_quotes_escaped() {
        let g = generator(0, vec![IndexField::new("name", "O'Brien")]);
        assert_eq!(
            g.sql_query_statement().unwrap(),
            "select * from t where name > 'O''Brien' order by 'name' ASC"
        );
    }
}
