//! Cursor store.
//!
//! An [`IndexFieldStore`] holds the ordered set of cursor columns and their
//! last-seen values. The list order is the column order of every generated
//! `WHERE` and `ORDER BY` clause. A name index over the same list gives
//! constant-time updates from polled rows.
//!
//! [`IndexFieldStoreWrap`] is the owner handed to a config: it adds manual
//! offset resets and the checkpoint snapshot/restore protocol.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use validator::Validate;

use crate::datetime::normalize_field;
use crate::error::{Error, Result};
use crate::value::{Row, Value};

/// Key of the field list in a serialized snapshot
pub const SNAPSHOT_LIST_KEY: &str = "indexFieldValueList";

/// How a cursor column's value is compared and rendered
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IndexFieldType {
    /// Compared and embedded by its string representation
    #[default]
    Generic,
    /// A date/time rendered through the field's token format
    DateTime,
    /// A generic field carrying a user label such as `bigint`
    Named(String),
}

impl IndexFieldType {
    /// Whether this is the DATETIME type
    #[inline]
    pub const fn is_datetime(&self) -> bool {
        matches!(self, Self::DateTime)
    }
}

impl From<String> for IndexFieldType {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Self::Generic
        } else if s.eq_ignore_ascii_case("DATETIME") {
            Self::DateTime
        } else {
            Self::Named(s)
        }
    }
}

impl From<&str> for IndexFieldType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<IndexFieldType> for String {
    fn from(t: IndexFieldType) -> Self {
        match t {
            IndexFieldType::Generic => String::new(),
            IndexFieldType::DateTime => "DATETIME".to_string(),
            IndexFieldType::Named(s) => s,
        }
    }
}

/// One tracked cursor column
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndexField {
    /// Column name
    #[serde(rename = "indexField")]
    #[validate(length(min = 1))]
    pub name: String,

    /// Last-seen value
    #[serde(rename = "indexValue", default)]
    #[schemars(with = "serde_json::Value")]
    pub value: Value,

    /// Empty for generic fields, `DATETIME` for date/time fields
    #[serde(rename = "indexFieldType", default)]
    #[schemars(with = "String")]
    pub data_type: IndexFieldType,

    /// Token format, required for DATETIME fields
    #[serde(default)]
    pub date_time_format: String,
}

impl IndexField {
    /// Create a generic field
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Set the field type
    pub fn with_type(mut self, data_type: IndexFieldType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Set the date/time token format
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.date_time_format = format.into();
        self
    }
}

/// Ordered cursor fields with a name index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexFieldStore {
    #[serde(rename = "indexFieldValueList", default)]
    fields: Vec<IndexField>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl PartialEq for IndexFieldStore {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl IndexFieldStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the tracked fields.
    ///
    /// Fields with an empty name are skipped. A repeated name keeps its
    /// first occurrence.
    pub fn init(&mut self, fields: impl IntoIterator<Item = IndexField>) {
        self.fields.clear();
        self.index.clear();
        for field in fields {
            if field.name.is_empty() {
                continue;
            }
            if self.index.contains_key(&field.name) {
                warn!(field = %field.name, "Duplicate index field ignored");
                continue;
            }
            self.index.insert(field.name.clone(), self.fields.len());
            self.fields.push(field);
        }
    }

    /// Overwrite the value of a tracked field.
    ///
    /// Returns false when the name is not tracked.
    pub fn update_field_value(&mut self, name: &str, value: Value) -> bool {
        match self.get_mut(name) {
            Some(field) => {
                field.value = value;
                true
            }
            None => false,
        }
    }

    /// Fields in configured order
    #[inline]
    pub fn field_list(&self) -> &[IndexField] {
        &self.fields
    }

    /// Name-keyed view over the same fields
    pub fn field_map(&self) -> HashMap<&str, &IndexField> {
        self.index
            .iter()
            .filter_map(|(name, &i)| self.fields.get(i).map(|f| (name.as_str(), f)))
            .collect()
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&IndexField> {
        self.index.get(name).and_then(|&i| self.fields.get(i))
    }

    /// Look up a field by name for mutation
    pub fn get_mut(&mut self, name: &str) -> Option<&mut IndexField> {
        let i = *self.index.get(name)?;
        self.fields.get_mut(i)
    }

    /// Mutable iteration in configured order. Names must not change.
    pub(crate) fn fields_mut(&mut self) -> std::slice::IterMut<'_, IndexField> {
        self.fields.iter_mut()
    }

    /// Rebuild the name index from the list
    pub fn load_from_list(&mut self) {
        self.index = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.clone(), i))
            .collect();
    }

    /// Number of tracked fields
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no cursor is configured
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Owner of a config's cursor store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexFieldStoreWrap {
    store: IndexFieldStore,
}

impl IndexFieldStoreWrap {
    /// Replace the tracked fields
    pub fn init(&mut self, fields: impl IntoIterator<Item = IndexField>) {
        self.store.init(fields);
    }

    /// Read access to the store
    #[inline]
    pub fn store(&self) -> &IndexFieldStore {
        &self.store
    }

    /// Write access to the store
    #[inline]
    pub fn store_mut(&mut self) -> &mut IndexFieldStore {
        &mut self.store
    }

    /// Overwrite tracked fields from a user-supplied map.
    ///
    /// Unknown names are ignored. DATETIME values are normalized before they
    /// are stored; a value that fails to convert aborts the reset before any
    /// field is touched. Returns the number of fields updated.
    pub fn update_by_input(&mut self, input: &Row) -> Result<usize> {
        let mut staged = Vec::new();
        for field in self.store.field_list() {
            if let Some(value) = input.get(&field.name) {
                let mut candidate = field.clone();
                candidate.value = value.clone();
                normalize_field(&mut candidate)?;
                staged.push(candidate);
            }
        }
        let updated = staged.len();
        for field in staged {
            self.store.update_field_value(&field.name, field.value);
        }
        debug!(updated, "Index fields reset from input");
        Ok(updated)
    }

    /// Serializable copy of the store
    pub fn snapshot(&self) -> Result<serde_json::Value> {
        serde_json::to_value(&self.store)
            .map_err(|e| Error::snapshot(format!("failed to serialize index fields: {}", e)))
    }

    /// Restore values from a checkpoint.
    ///
    /// Accepts the object form written by [`snapshot`](Self::snapshot), a
    /// bare list of fields, or a bare scalar when exactly one field is
    /// tracked. The configured field order, types and formats are kept; only
    /// values of known names are taken.
    pub fn restore(&mut self, snapshot: &serde_json::Value) -> Result<()> {
        let restored = match snapshot {
            serde_json::Value::Object(map) if map.contains_key(SNAPSHOT_LIST_KEY) => {
                serde_json::from_value::<IndexFieldStore>(snapshot.clone())
                    .map_err(|e| Error::snapshot(e.to_string()))?
                    .fields
            }
            serde_json::Value::Array(_) => serde_json::from_value::<Vec<IndexField>>(snapshot.clone())
                .map_err(|e| Error::snapshot(e.to_string()))?,
            serde_json::Value::Object(_) => {
                return Err(Error::snapshot(format!(
                    "object without '{}' key",
                    SNAPSHOT_LIST_KEY
                )))
            }
            scalar => match self.store.field_list() {
                [only] => vec![IndexField {
                    value: Value::from(scalar.clone()),
                    ..only.clone()
                }],
                fields => {
                    return Err(Error::snapshot(format!(
                        "scalar snapshot needs exactly one tracked field, {} configured",
                        fields.len()
                    )))
                }
            },
        };

        let mut next = self.store.clone();
        for snap in restored {
            let Some(field) = next.get_mut(&snap.name) else {
                warn!(field = %snap.name, "Snapshot field is not tracked, dropping it");
                continue;
            };
            field.value = snap.value;
            normalize_field(field)?;
        }
        next.load_from_list();
        self.store = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_fields() -> IndexFieldStore {
        let mut store = IndexFieldStore::new();
        store.init([IndexField::new("col1", 1_i64), IndexField::new("col2", 2_i64)]);
        store
    }

    #[test]
    fn test_init_skips_empty_names() {
        let mut store = IndexFieldStore::new();
        store.init([IndexField::default()]);
        assert!(store.is_empty());
        assert!(store.field_map().is_empty());
    }

    #[test]
    fn test_init_keeps_order_and_first_duplicate() {
        let mut store = IndexFieldStore::new();
        store.init([
            IndexField::new("b", 1_i64),
            IndexField::new("a", 2_i64),
            IndexField::new("b", 3_i64),
        ]);
        let names: Vec<_> = store.field_list().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(store.get("b").unwrap().value, Value::Int(1));
    }

    #[test]
    fn test_update_is_visible_through_both_views() {
        let mut store = two_fields();
        assert!(store.update_field_value("col2", Value::Int(9)));
        assert_eq!(store.field_list()[1].value, Value::Int(9));
        assert_eq!(store.field_map()["col2"].value, Value::Int(9));
    }

    #[test]
    fn test_update_unknown_name_is_noop() {
        let mut store = two_fields();
        let before = store.clone();
        assert!(!store.update_field_value("other", Value::Int(9)));
        assert_eq!(store, before);
    }

    #[test]
    fn test_load_from_list_after_deserialize() {
        let mut store: IndexFieldStore = serde_json::from_value(json!({
            "indexFieldValueList": [{"indexField": "id", "indexValue": 5}]
        }))
        .unwrap();
        assert!(store.get("id").is_none());
        store.load_from_list();
        assert_eq!(store.get("id").unwrap().value, Value::Int(5));
    }

    #[test]
    fn test_field_type_serde() {
        let field: IndexField = serde_json::from_value(json!({
            "indexField": "ts",
            "indexFieldType": "datetime",
            "dateTimeFormat": "YYYY"
        }))
        .unwrap();
        assert_eq!(field.data_type, IndexFieldType::DateTime);
        assert!(field.value.is_null());

        let field: IndexField = serde_json::from_value(json!({
            "indexField": "a",
            "indexFieldType": "bigint"
        }))
        .unwrap();
        assert_eq!(field.data_type, IndexFieldType::Named("bigint".into()));
        assert_eq!(serde_json::to_value(&field).unwrap()["indexFieldType"], json!("bigint"));

        let json = serde_json::to_value(IndexField::new("id", 1_i64)).unwrap();
        assert_eq!(json["indexFieldType"], json!(""));
    }

    #[test]
    fn test_snapshot_shape() {
        let mut wrap = IndexFieldStoreWrap::default();
        wrap.init([IndexField::new("id", 7_i64)]);
        assert_eq!(
            wrap.snapshot().unwrap(),
            json!({"indexFieldValueList": [{
                "indexField": "id",
                "indexValue": 7,
                "indexFieldType": "",
                "dateTimeFormat": ""
            }]})
        );
    }

    #[test]
    fn test_restore_scalar_needs_single_field() {
        let mut wrap = IndexFieldStoreWrap::default();
        wrap.init([IndexField::new("id", 1_i64)]);
        wrap.restore(&json!(42)).unwrap();
        assert_eq!(wrap.store().get("id").unwrap().value, Value::Int(42));

        wrap.init([IndexField::new("a", 1_i64), IndexField::new("b", 1_i64)]);
        assert!(wrap.restore(&json!(42)).is_err());
    }

    #[test]
    fn test_restore_keeps_configured_order() {
        let mut wrap = IndexFieldStoreWrap::default();
        wrap.init([IndexField::new("a", 1_i64), IndexField::new("b", 1_i64)]);
        wrap.restore(&json!([
            {"indexField": "b", "indexValue": 20},
            {"indexField": "zzz", "indexValue": 0},
            {"indexField": "a", "indexValue": 10}
        ]))
        .unwrap();
        let list = wrap.store().field_list();
        assert_eq!(list[0].name, "a");
        assert_eq!(list[0].value, Value::Int(10));
        assert_eq!(list[1].value, Value::Int(20));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_update_by_input_ignores_unknown() {
        let mut wrap = IndexFieldStoreWrap::default();
        wrap.init([IndexField::new("id", 1_i64)]);
        let input = Row::from([
            ("id".to_string(), Value::Int(100)),
            ("other".to_string(), Value::Int(5)),
        ]);
        assert_eq!(wrap.update_by_input(&input).unwrap(), 1);
        assert_eq!(wrap.store().get("id").unwrap().value, Value::Int(100));
    }
}
