//! SQL query configuration
//!
//! Source properties carry one of two query configs:
//!
//! ```json
//! {
//!   "internalSqlQueryCfg": {
//!     "table": "t",
//!     "limit": 10,
//!     "indexFields": [
//!       {"indexField": "id", "indexValue": 0},
//!       {"indexField": "ts", "indexValue": "2024-01-01 00:00:00",
//!        "indexFieldType": "DATETIME", "dateTimeFormat": "YYYY-MM-dd HH:mm:ss"}
//!     ]
//!   }
//! }
//! ```
//!
//! or `templateSqlQueryCfg` with a `templateSql` instead of `table`/`limit`.
//! Either config describes its cursor with the legacy single-field keys
//! (`indexField`, `indexValue`, `indexFieldType`, `dateTimeFormat`) or with
//! an `indexFields` list, never both.

use std::cmp::Ordering;
use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use crate::datetime::{interface_to_time, normalize_field};
use crate::error::{Error, Result};
use crate::security::{validate_identifier, validate_table_name, IdentRole};
use crate::store::{IndexField, IndexFieldStoreWrap, IndexFieldType};
use crate::value::{Row, Value};

/// Raw source properties
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Cursor definition shared by both query configs
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CursorCfg {
    /// Legacy single cursor column
    #[serde(rename = "indexField", default)]
    pub index_field_name: String,

    /// Legacy single cursor initial value
    #[serde(rename = "indexValue", default)]
    #[schemars(with = "serde_json::Value")]
    pub index_field_value: Value,

    /// Legacy single cursor type
    #[serde(rename = "indexFieldType", default)]
    #[schemars(with = "String")]
    pub index_field_type: IndexFieldType,

    /// Legacy single cursor date/time format
    #[serde(default)]
    pub date_time_format: String,

    /// Multi-column cursor, in SQL column order
    #[serde(default)]
    #[validate(nested)]
    pub index_fields: Option<Vec<IndexField>>,

    /// Only advance a cursor value when the polled value is greater
    #[serde(default)]
    pub strict_monotonic: bool,

    #[serde(skip)]
    store: IndexFieldStoreWrap,
}

/// The two accepted cursor shapes after decoding
#[derive(Debug, Clone, PartialEq)]
pub enum CursorShape {
    /// No cursor: every poll reads from the start
    None,
    /// Legacy single field
    Legacy(IndexField),
    /// Field list
    Fields(Vec<IndexField>),
}

impl CursorShape {
    /// Normalize to the ordered field list
    pub fn into_fields(self) -> Vec<IndexField> {
        match self {
            Self::None => Vec::new(),
            Self::Legacy(field) => vec![field],
            Self::Fields(fields) => fields,
        }
    }
}

impl CursorCfg {
    /// Create a cursor from a field list
    pub fn with_fields(fields: Vec<IndexField>) -> Self {
        Self {
            index_fields: Some(fields),
            ..Default::default()
        }
    }

    /// Create a legacy single-field cursor
    pub fn with_legacy(field: IndexField) -> Self {
        Self {
            index_field_name: field.name,
            index_field_value: field.value,
            index_field_type: field.data_type,
            date_time_format: field.date_time_format,
            ..Default::default()
        }
    }

    /// Enable or disable the strict monotonic guard
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_monotonic = strict;
        self
    }

    /// Resolve which cursor shape was configured
    pub fn shape(&self) -> Result<CursorShape> {
        let list = self.index_fields.as_deref().unwrap_or_default();
        match (list.is_empty(), self.index_field_name.is_empty()) {
            (false, false) => Err(Error::config(
                "indexFields and indexField can't be defined at the same time",
            )),
            (false, true) => Ok(CursorShape::Fields(list.to_vec())),
            (true, false) => Ok(CursorShape::Legacy(IndexField {
                name: self.index_field_name.clone(),
                value: self.index_field_value.clone(),
                data_type: self.index_field_type.clone(),
                date_time_format: self.date_time_format.clone(),
            })),
            (true, true) => Ok(CursorShape::None),
        }
    }

    /// Normalize configured values and initialize the store
    pub fn init(&mut self) -> Result<()> {
        let mut fields = self.shape()?.into_fields();
        let mut seen = HashSet::new();
        for field in &mut fields {
            validate_identifier(&field.name, IdentRole::IndexField)?;
            if !seen.insert(field.name.clone()) {
                return Err(Error::config(format!(
                    "index field '{}' is defined more than once",
                    field.name
                )));
            }
            normalize_field(field)?;
        }
        self.store.init(fields);
        Ok(())
    }

    /// The owned cursor store
    #[inline]
    pub fn store(&self) -> &IndexFieldStoreWrap {
        &self.store
    }

    /// Mutable access to the owned cursor store
    #[inline]
    pub fn store_mut(&mut self) -> &mut IndexFieldStoreWrap {
        &mut self.store
    }

    /// Checkpoint form of the cursor
    pub fn snapshot(&self) -> Result<serde_json::Value> {
        self.store.snapshot()
    }

    /// Restore the cursor from a checkpoint
    pub fn restore(&mut self, snapshot: &serde_json::Value) -> Result<()> {
        self.store.restore(snapshot)
    }

    /// Advance the cursor from a polled row.
    ///
    /// Every tracked column present in the row overwrites the stored value.
    /// Null cells and DATETIME cells that do not convert are ignored. With
    /// `strictMonotonic` a value only replaces one it compares greater than.
    /// Returns the number of fields updated.
    pub fn advance(&mut self, row: &Row) -> usize {
        let strict = self.strict_monotonic;
        let mut updated = 0;
        for field in self.store.store_mut().fields_mut() {
            let Some(cell) = row.get(&field.name) else {
                continue;
            };
            if cell.is_null() {
                continue;
            }
            let next = if field.data_type.is_datetime() {
                match interface_to_time(cell, &field.date_time_format, &field.name) {
                    Ok(t) => Value::Timestamp(t),
                    Err(e) => {
                        warn!(error = %e, polled = %cell, "Date/time cursor value not advanced");
                        continue;
                    }
                }
            } else {
                cell.clone()
            };
            if strict
                && !field.value.is_null()
                && next.cursor_cmp(&field.value) != Some(Ordering::Greater)
            {
                debug!(
                    field = %field.name,
                    current = %field.value,
                    polled = %next,
                    "Cursor value not advanced"
                );
                continue;
            }
            field.value = next;
            updated += 1;
        }
        updated
    }
}

/// Query config for the dialect generators
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InternalSqlQueryCfg {
    /// Table to poll, optionally schema-qualified
    #[validate(length(min = 1))]
    pub table: String,

    /// Maximum rows per poll, 0 for unlimited
    #[serde(default)]
    pub limit: u64,

    /// Cursor definition
    #[serde(flatten)]
    #[validate(nested)]
    pub cursor: CursorCfg,
}

impl InternalSqlQueryCfg {
    /// Create a config for a table
    pub fn new(table: impl Into<String>, limit: u64, cursor: CursorCfg) -> Self {
        Self {
            table: table.into(),
            limit,
            cursor,
        }
    }

    /// Check the table name and initialize the cursor
    pub fn init(&mut self) -> Result<()> {
        validate_table_name(&self.table)?;
        self.cursor.init()
    }
}

/// Query config for a user-supplied SQL template
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSqlQueryCfg {
    /// SQL text with `{{.field}}` placeholders
    #[serde(rename = "templateSql")]
    #[validate(length(min = 1))]
    pub template_sql: String,

    /// Cursor definition
    #[serde(flatten)]
    #[validate(nested)]
    pub cursor: CursorCfg,
}

impl TemplateSqlQueryCfg {
    /// Create a template config
    pub fn new(template_sql: impl Into<String>, cursor: CursorCfg) -> Self {
        Self {
            template_sql: template_sql.into(),
            cursor,
        }
    }

    /// Initialize the cursor
    pub fn init(&mut self) -> Result<()> {
        self.cursor.init()
    }
}

/// Top-level SQL query configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SqlConfig {
    /// Template mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub template_sql_query_cfg: Option<TemplateSqlQueryCfg>,

    /// Dialect-generated mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub internal_sql_query_cfg: Option<InternalSqlQueryCfg>,
}

impl SqlConfig {
    /// Decode, validate and initialize from source properties
    pub fn init(props: &Props) -> Result<Self> {
        let mut cfg: SqlConfig = serde_json::from_value(serde_json::Value::Object(props.clone()))
            .map_err(|e| Error::config(format!("failed to decode sql query config: {}", e)))?;
        cfg.validate()
            .map_err(|e| Error::config(format!("Validation failed: {}", e)))?;

        if cfg.template_sql_query_cfg.is_none() && cfg.internal_sql_query_cfg.is_none() {
            return Err(Error::config(
                "either templateSqlQueryCfg or internalSqlQueryCfg must be configured",
            ));
        }
        if let Some(template) = cfg.template_sql_query_cfg.as_mut() {
            template.init()?;
        }
        if let Some(internal) = cfg.internal_sql_query_cfg.as_mut() {
            internal.init()?;
        }
        Ok(cfg)
    }
}

/// JSON schema of [`SqlConfig`]
pub fn config_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(SqlConfig);
    serde_json::to_value(schema).unwrap_or_default()
}
