//! Cursor checkpoint snapshot and restore

use serde_json::json;
use sluice_sqlgen::prelude::*;

fn props(v: serde_json::Value) -> Props {
    v.as_object().cloned().expect("props object")
}

fn multi_field_props() -> Props {
    props(json!({"internalSqlQueryCfg": {
        "table": "t",
        "limit": 1,
        "indexFields": [
            {"indexField": "a", "indexValue": 0, "indexFieldType": "bigint"},
            {"indexField": "b", "indexValue": 0, "indexFieldType": "bigint"}
        ]
    }}))
}

#[test]
fn test_snapshot_restores_into_fresh_generator() {
    let mut generator = get_query_generator("mysql", &multi_field_props()).unwrap();
    generator.update_max_index_value(&Row::from([
        ("a".to_string(), Value::Int(1)),
        ("b".to_string(), Value::Int(1)),
    ]));
    let offset = generator.get_index_value().unwrap();
    assert_eq!(
        offset,
        json!({"indexFieldValueList": [
            {"indexField": "a", "indexValue": 1, "indexFieldType": "bigint", "dateTimeFormat": ""},
            {"indexField": "b", "indexValue": 1, "indexFieldType": "bigint", "dateTimeFormat": ""}
        ]})
    );

    let mut restarted = get_query_generator("mysql", &multi_field_props()).unwrap();
    restarted.set_index_value(&offset).unwrap();
    assert_eq!(
        restarted.sql_query_statement().unwrap(),
        generator.sql_query_statement().unwrap()
    );
    assert_eq!(restarted.get_index_value().unwrap(), offset);
}

#[test]
fn test_snapshot_is_a_copy() {
    let mut generator = get_query_generator("mysql", &multi_field_props()).unwrap();
    let before = generator.get_index_value().unwrap();
    generator.update_max_index_value(&Row::from([("a".to_string(), Value::Int(5))]));
    assert_eq!(before["indexFieldValueList"][0]["indexValue"], json!(0));
    assert_eq!(
        generator.get_index_value().unwrap()["indexFieldValueList"][0]["indexValue"],
        json!(5)
    );
}

#[test]
fn test_restore_legacy_scalar_checkpoint() {
    let mut generator = get_query_generator(
        "sqlserver",
        &props(json!({"internalSqlQueryCfg": {
            "table": "t",
            "indexField": "id",
            "indexValue": 0
        }})),
    )
    .unwrap();
    generator.set_index_value(&json!(250)).unwrap();
    assert_eq!(
        generator.sql_query_statement().unwrap(),
        "select * from t where id > '250' order by id ASC"
    );
}

#[test]
fn test_restore_rejects_malformed_snapshot() {
    let mut generator = get_query_generator("mysql", &multi_field_props()).unwrap();
    let err = generator.set_index_value(&json!({"cursor": 1})).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Snapshot);
    assert!(generator.set_index_value(&json!(3)).is_err());
}

#[test]
fn test_datetime_checkpoint_round_trip() {
    let cfg = props(json!({"templateSqlQueryCfg": {
        "templateSql": "select * from t where ts > '{{.ts}}' order by ts",
        "indexFields": [{
            "indexField": "ts",
            "indexValue": "2024-03-01 08:30:00.250",
            "indexFieldType": "DATETIME",
            "dateTimeFormat": "YYYY-MM-dd HH:mm:ssSSS"
        }]
    }}));
    let generator = get_query_generator("postgres", &cfg).unwrap();
    let offset = generator.get_index_value().unwrap();
    assert_eq!(
        offset["indexFieldValueList"][0]["indexValue"],
        json!("2024-03-01T08:30:00.250Z")
    );

    let mut restarted = get_query_generator("postgres", &cfg).unwrap();
    restarted
        .set_index_value(&json!({"indexFieldValueList": [{
            "indexField": "ts",
            "indexValue": "2024-03-02T00:00:00Z",
            "indexFieldType": "DATETIME",
            "dateTimeFormat": "YYYY-MM-dd HH:mm:ssSSS"
        }]}))
        .unwrap();
    assert_eq!(
        restarted.sql_query_statement().unwrap(),
        "select * from t where ts > '2024-03-02 00:00:00.000' order by ts"
    );

    restarted.set_index_value(&offset).unwrap();
    assert_eq!(
        restarted.sql_query_statement().unwrap(),
        "select * from t where ts > '2024-03-01 08:30:00.250' order by ts"
    );
}

#[test]
fn test_reset_through_wrap() {
    let mut generator = get_query_generator("mysql", &multi_field_props()).unwrap();
    let updated = generator
        .get_index_value_wrap()
        .update_by_input(&Row::from([
            ("a".to_string(), Value::Int(2)),
            ("b".to_string(), Value::Int(2)),
            ("c".to_string(), Value::Int(2)),
        ]))
        .unwrap();
    assert_eq!(updated, 2);
    assert!(generator
        .sql_query_statement()
        .unwrap()
        .starts_with("select * from t where a > '2' AND b > '2'"));
}
