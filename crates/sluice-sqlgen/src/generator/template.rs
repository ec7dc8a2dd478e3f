//! Generator rendering a user-supplied SQL template

use std::collections::HashMap;

use tracing::debug;

use super::{CursorOwner, SqlQueryGenerator};
use crate::config::{CursorCfg, TemplateSqlQueryCfg};
use crate::datetime::render_field_value;
use crate::error::Result;
use crate::template::SqlTemplate;
use crate::value::Row;

/// Template generator. The template is responsible for its own predicate
/// and ordering; nothing is added to it.
#[derive(Debug, Clone)]
pub struct TemplateQueryGenerator {
    cfg: TemplateSqlQueryCfg,
    template: SqlTemplate,
}

impl TemplateQueryGenerator {
    /// Compile the configured template
    pub fn new(cfg: TemplateSqlQueryCfg) -> Result<Self> {
        let template = SqlTemplate::compile(&cfg.template_sql)?;
        Ok(Self { cfg, template })
    }

    fn input(&self) -> Result<HashMap<String, String>> {
        let mut input = HashMap::new();
        for field in self.cfg.cursor.store().store().field_list() {
            let value = render_field_value(field)?.unwrap_or_default();
            input.insert(field.name.clone(), value);
        }
        Ok(input)
    }
}

impl CursorOwner for TemplateQueryGenerator {
    fn cursor(&self) -> &CursorCfg {
        &self.cfg.cursor
    }

    fn cursor_mut(&mut self) -> &mut CursorCfg {
        &mut self.cfg.cursor
    }
}

impl SqlQueryGenerator for TemplateQueryGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    fn sql_query_statement(&self) -> Result<String> {
        let sql = self.template.render(&self.input()?)?;
        debug!(generator = self.name(), sql = %sql, "Generated SQL query");
        Ok(sql)
    }

    fn update_max_index_value(&mut self, row: &Row) {
        self.cfg.cursor.advance(row);
    }
}
