//! Dialect-polymorphic SQL statement generators.
//!
//! Every generator owns its query config, which owns the cursor store. A
//! poll cycle is:
//! 1. [`SqlQueryGenerator::sql_query_statement`] builds the SQL text
//! 2. the caller executes it
//! 3. [`SqlQueryGenerator::update_max_index_value`] advances the cursor from
//!    the last returned row
//!
//! The dialect generators share one clause pipeline ([`QueryClauses`]):
//! `select` + `where` + `order by` + `limit`, each overridable. Rows come
//! back ordered ascending on every cursor column, so the last row carries the
//! maximum of each.

mod common;
mod oracle;
mod sqlserver;
mod template;

use std::fmt;

use tracing::info;

pub use common::CommonQueryGenerator;
pub use oracle::OracleQueryGenerator;
pub use sqlserver::SqlServerQueryGenerator;
pub use template::TemplateQueryGenerator;

use crate::config::{CursorCfg, InternalSqlQueryCfg, Props, SqlConfig};
use crate::datetime::render_field_value;
use crate::error::{Error, Result};
use crate::security::quote_literal;
use crate::store::IndexFieldStoreWrap;
use crate::value::Row;

/// Checkpoint access to a generator's cursor
pub trait IndexValuer {
    /// Restore the cursor from a checkpoint snapshot
    fn set_index_value(&mut self, snapshot: &serde_json::Value) -> Result<()>;

    /// Snapshot the cursor for checkpointing
    fn get_index_value(&self) -> Result<serde_json::Value>;

    /// The cursor store itself
    fn get_index_value_wrap(&mut self) -> &mut IndexFieldStoreWrap;
}

/// A type owning a [`CursorCfg`]
pub trait CursorOwner {
    /// The owned cursor
    fn cursor(&self) -> &CursorCfg;

    /// The owned cursor, mutably
    fn cursor_mut(&mut self) -> &mut CursorCfg;
}

impl<T: CursorOwner> IndexValuer for T {
    fn set_index_value(&mut self, snapshot: &serde_json::Value) -> Result<()> {
        self.cursor_mut().restore(snapshot)
    }

    fn get_index_value(&self) -> Result<serde_json::Value> {
        self.cursor().snapshot()
    }

    fn get_index_value_wrap(&mut self) -> &mut IndexFieldStoreWrap {
        self.cursor_mut().store_mut()
    }
}

/// SQL statement generator
pub trait SqlQueryGenerator: IndexValuer + Send + Sync + fmt::Debug {
    /// Generator name for logs
    fn name(&self) -> &'static str;

    /// Build the SQL text for the next poll
    fn sql_query_statement(&self) -> Result<String>;

    /// Advance the cursor from a polled row. Columns that are not tracked
    /// are ignored.
    fn update_max_index_value(&mut self, row: &Row);
}

/// Clause builders shared by the dialect generators
pub trait QueryClauses {
    /// The table/limit/cursor config
    fn query_cfg(&self) -> &InternalSqlQueryCfg;

    /// `select * from <table> `
    fn get_select(&self) -> String {
        format!("select * from {} ", self.query_cfg().table)
    }

    /// `where f1 > 'v1' AND f2 > 'v2' `, or empty without cursor values
    fn get_condition(&self) -> Result<String> {
        let mut conditions = Vec::new();
        for field in self.query_cfg().cursor.store().store().field_list() {
            if let Some(value) = render_field_value(field)? {
                conditions.push(format!("{} > {}", field.name, self.quote_value(&value)));
            }
        }
        if conditions.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("where {} ", conditions.join(" AND ")))
    }

    /// `order by f1 ASC, f2 ASC`, or empty without cursor
    fn get_orderby(&self) -> String {
        let fields = self.query_cfg().cursor.store().store().field_list();
        if fields.is_empty() {
            return String::new();
        }
        let columns: Vec<String> = fields
            .iter()
            .map(|f| format!("{} ASC", self.quote_column(&f.name)))
            .collect();
        format!("order by {}", columns.join(", "))
    }

    /// Trailing row limit clause
    fn get_limit(&self) -> String {
        match self.query_cfg().limit {
            0 => String::new(),
            n => format!("limit {}", n),
        }
    }

    /// Column name as written in `order by`
    fn quote_column(&self, name: &str) -> String {
        name.to_string()
    }

    /// Value literal as written in `where`
    fn quote_value(&self, value: &str) -> String {
        quote_literal(value)
    }

    /// Select, condition and ordering without the limit
    fn base_query(&self) -> Result<String> {
        let mut sql = self.get_select();
        sql.push_str(&self.get_condition()?);
        sql.push_str(&self.get_orderby());
        Ok(sql)
    }

    /// The full statement
    fn assemble(&self) -> Result<String> {
        let mut sql = self.base_query()?;
        let limit = self.get_limit();
        if !limit.is_empty() {
            if !sql.ends_with(' ') {
                sql.push(' ');
            }
            sql.push_str(&limit);
        }
        Ok(sql)
    }
}

/// Build a generator for a driver from source properties.
///
/// A template config always wins. Otherwise the driver picks the dialect:
/// `sqlserver`, `godror`/`oracle`, and the common dialect for anything else.
pub fn get_query_generator(driver: &str, props: &Props) -> Result<Box<dyn SqlQueryGenerator>> {
    let cfg = SqlConfig::init(props)?;

    let generator: Box<dyn SqlQueryGenerator> = if let Some(template) = cfg.template_sql_query_cfg
    {
        Box::new(TemplateQueryGenerator::new(template)?)
    } else {
        let internal = cfg
            .internal_sql_query_cfg
            .ok_or_else(|| Error::config("internalSqlQueryCfg is not configured"))?;
        match driver.to_lowercase().as_str() {
            "sqlserver" => Box::new(SqlServerQueryGenerator::new(internal)),
            "godror" | "oracle" => Box::new(OracleQueryGenerator::new(internal)),
            _ => Box::new(CommonQueryGenerator::new(internal)),
        }
    };

    info!(driver, generator = generator.name(), "Selected SQL query generator");
    Ok(generator)
}
