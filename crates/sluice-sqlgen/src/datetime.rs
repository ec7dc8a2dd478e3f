//! Date/time conversion of cursor values.
//!
//! DATETIME cursor fields hold a [`Value::Timestamp`] once normalized. Values
//! reach them from three places (configuration, checkpoints and polled rows)
//! in whatever shape the source produced:
//! - integers and floats are epoch milliseconds (UTC)
//! - strings are parsed with the field's token format, falling back to
//!   RFC 3339 (the checkpoint form)
//! - timestamps pass through

use chrono::{DateTime, FixedOffset, Utc};
use sluice_timefmt::Layout;

use crate::error::{DateTimeStage, Error, Result};
use crate::store::IndexField;
use crate::value::Value;

/// Convert a value into an instant.
pub fn interface_to_time(value: &Value, format: &str, field: &str) -> Result<DateTime<FixedOffset>> {
    let stage = DateTimeStage::InterfaceToTime;
    match value {
        Value::Int(ms) => from_unix_millis(*ms)
            .ok_or_else(|| Error::datetime(field, stage, format!("epoch millis {} out of range", ms))),
        Value::Float(ms) if ms.is_finite() => from_unix_millis(*ms as i64)
            .ok_or_else(|| Error::datetime(field, stage, format!("epoch millis {} out of range", ms))),
        Value::Timestamp(t) => Ok(*t),
        Value::String(s) if format.is_empty() => {
            DateTime::parse_from_rfc3339(s).map_err(|e| Error::datetime(field, stage, e))
        }
        Value::String(s) => match Layout::compile(format).and_then(|layout| layout.parse(s)) {
            Ok(t) => Ok(t),
            // checkpoints carry RFC 3339 text
            Err(e) => DateTime::parse_from_rfc3339(s).map_err(|_| Error::datetime(field, stage, e)),
        },
        other => Err(Error::datetime(
            field,
            stage,
            format!("unsupported type to convert to timestamp: {}", other.type_name()),
        )),
    }
}

fn from_unix_millis(ms: i64) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|t| t.fixed_offset())
}

/// Normalize a field's value in place.
///
/// Generic fields are left untouched. A DATETIME field must carry a token
/// format; its non-null value is converted to a [`Value::Timestamp`].
pub fn normalize_field(field: &mut IndexField) -> Result<()> {
    if !field.data_type.is_datetime() {
        return Ok(());
    }
    if field.date_time_format.is_empty() {
        return Err(Error::config(format!(
            "index field '{}' is DATETIME but has no dateTimeFormat",
            field.name
        )));
    }
    if field.value.is_null() {
        return Ok(());
    }
    let t = interface_to_time(&field.value, &field.date_time_format, &field.name)?;
    field.value = Value::Timestamp(t);
    Ok(())
}

/// Render a field's current value in the literal form the target column
/// expects. Null renders as `None`.
pub fn render_field_value(field: &IndexField) -> Result<Option<String>> {
    if field.value.is_null() {
        return Ok(None);
    }
    if !field.data_type.is_datetime() {
        return Ok(Some(field.value.to_sql_string()));
    }
    let t = interface_to_time(&field.value, &field.date_time_format, &field.name)?;
    sluice_timefmt::render_token(&t, &field.date_time_format)
        .map(Some)
        .map_err(|e| Error::datetime(&field.name, DateTimeStage::RenderToken, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::IndexFieldType;

    const FORMAT: &str = "YYYY-MM-dd HH:mm:ssSSS";

    fn datetime_field(value: Value) -> IndexField {
        IndexField::new("responseTime", value)
            .with_type(IndexFieldType::DateTime)
            .with_format(FORMAT)
    }

    #[test]
    fn test_epoch_millis() {
        let t = interface_to_time(&Value::Int(1_224_946_619_123), "", "f").unwrap();
        assert_eq!(t.timestamp_millis(), 1_224_946_619_123);
        let t = interface_to_time(&Value::Float(1_224_946_619_123.9), "", "f").unwrap();
        assert_eq!(t.timestamp_millis(), 1_224_946_619_123);
    }

    #[test]
    fn test_string_with_and_without_format() {
        let t = interface_to_time(&Value::from("2008-10-25 14:56:59.123"), FORMAT, "f").unwrap();
        assert_eq!(t.timestamp_millis(), 1_224_946_619_123);
        let t = interface_to_time(&Value::from("2008-10-25T14:56:59.123Z"), "", "f").unwrap();
        assert_eq!(t.timestamp_millis(), 1_224_946_619_123);
        let t = interface_to_time(&Value::from("2008-10-25T14:56:59.123Z"), FORMAT, "f").unwrap();
        assert_eq!(t.timestamp_millis(), 1_224_946_619_123);
        assert!(interface_to_time(&Value::from("25/10/2008"), FORMAT, "f").is_err());
    }

    #[test]
    fn test_unsupported_type_names_stage() {
        let err = interface_to_time(&Value::Bool(true), FORMAT, "responseTime").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("InterfaceToTime"));
        assert!(msg.contains("responseTime"));
    }

    #[test]
    fn test_normalize_requires_format() {
        let mut field = IndexField::new("ts", Value::Int(1)).with_type(IndexFieldType::DateTime);
        assert!(normalize_field(&mut field).is_err());
    }

    #[test]
    fn test_normalize_and_render() {
        let mut field = datetime_field(Value::from("2008-10-25 14:56:59.123"));
        normalize_field(&mut field).unwrap();
        assert!(matches!(field.value, Value::Timestamp(_)));
        assert_eq!(
            render_field_value(&field).unwrap().as_deref(),
            Some("2008-10-25 14:56:59.123")
        );
    }

    #[test]
    fn test_render_null_and_generic() {
        let field = IndexField::new("id", Value::Null);
        assert_eq!(render_field_value(&field).unwrap(), None);
        let field = IndexField::new("id", Value::Float(10.0));
        assert_eq!(render_field_value(&field).unwrap().as_deref(), Some("10"));
    }
}
