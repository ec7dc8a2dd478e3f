//! Oracle dialect: the common query wrapped in a `rownum` filter

use tracing::debug;

use super::{CommonQueryGenerator, CursorOwner, QueryClauses, SqlQueryGenerator};
use crate::config::{CursorCfg, InternalSqlQueryCfg};
use crate::error::Result;
use crate::value::Row;

/// Oracle generator, built on the common dialect's clauses
#[derive(Debug, Clone)]
pub struct OracleQueryGenerator {
    common: CommonQueryGenerator,
}

impl OracleQueryGenerator {
    /// Create a generator over an initialized config
    pub fn new(cfg: InternalSqlQueryCfg) -> Self {
        Self {
            common: CommonQueryGenerator::new(cfg),
        }
    }
}

impl QueryClauses for OracleQueryGenerator {
    fn query_cfg(&self) -> &InternalSqlQueryCfg {
        self.common.query_cfg()
    }

    fn get_condition(&self) -> Result<String> {
        self.common.get_condition()
    }

    fn get_orderby(&self) -> String {
        self.common.get_orderby()
    }

    fn get_limit(&self) -> String {
        String::new()
    }

    fn assemble(&self) -> Result<String> {
        let inner = self.base_query()?;
        Ok(match self.query_cfg().limit {
            0 => inner,
            n => format!("select * from ({}) where rownum <= {}", inner, n),
        })
    }
}

impl CursorOwner for OracleQueryGenerator {
    fn cursor(&self) -> &CursorCfg {
        self.common.cursor()
    }

    fn cursor_mut(&mut self) -> &mut CursorCfg {
        self.common.cursor_mut()
    }
}

impl SqlQueryGenerator for OracleQueryGenerator {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn sql_query_statement(&self) -> Result<String> {
        let sql = self.assemble()?;
        debug!(generator = self.name(), sql = %sql, "Generated SQL query");
        Ok(sql)
    }

    fn update_max_index_value(&mut self, row: &Row) {
        self.common.update_max_index_value(row);
    }
}
