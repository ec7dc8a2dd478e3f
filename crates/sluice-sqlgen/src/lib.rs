//! # sluice-sqlgen
//!
//! Incremental SQL polling for the Sluice streaming engine.
//!
//! A pull source re-polls a relational table without re-reading rows it has
//! already consumed. It keeps a cursor (one or more columns and their
//! last-seen values), embeds the cursor into each generated statement, and
//! advances it from the rows the statement returns.
//!
//! ## Features
//!
//! - **Cursor store**: ordered multi-column cursors with checkpoint
//!   snapshot/restore
//! - **Dialects**: common (`limit`), SQL Server (`top`), Oracle (`rownum`)
//! - **Templates**: user-written SQL with `{{.field}}` cursor placeholders
//! - **Date/time cursors**: values rendered through custom token formats
//! - **Pull source**: interval-driven polling over any [`source::RowFetcher`]
//!
//! ## Quick Start
//!
//! ```rust
//! use sluice_sqlgen::prelude::*;
//!
//! let props = serde_json::json!({
//!     "internalSqlQueryCfg": {
//!         "table": "table",
//!         "limit": 2,
//!         "indexField": "responseTime",
//!         "indexValue": 10
//!     }
//! });
//! let mut generator = get_query_generator("sqlserver", props.as_object().unwrap()).unwrap();
//! assert_eq!(
//!     generator.sql_query_statement().unwrap(),
//!     "select top 2 * from table where responseTime > '10' order by responseTime ASC"
//! );
//!
//! generator.update_max_index_value(&Row::from([("responseTime".to_string(), Value::Int(42))]));
//! assert!(generator.sql_query_statement().unwrap().contains("responseTime > '42'"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod datetime;
pub mod error;
pub mod generator;
pub mod security;
pub mod source;
pub mod store;
pub mod template;
pub mod value;

/// Prelude module for convenient imports
pub mod prelude {
    // Error types
    pub use crate::error::{DateTimeStage, Error, ErrorCategory, Result};

    // Values
    pub use crate::value::{Row, Value};

    // Cursor store
    pub use crate::store::{IndexField, IndexFieldStore, IndexFieldStoreWrap, IndexFieldType};

    // Configuration
    pub use crate::config::{
        config_schema, CursorCfg, CursorShape, InternalSqlQueryCfg, Props, SqlConfig,
        TemplateSqlQueryCfg,
    };

    // Generators
    pub use crate::generator::{
        get_query_generator, CommonQueryGenerator, CursorOwner, IndexValuer,
        OracleQueryGenerator, QueryClauses, SqlQueryGenerator, SqlServerQueryGenerator,
        TemplateQueryGenerator,
    };

    // Pull source
    pub use crate::source::{parse_driver, RowFetcher, SourceStats, SqlPullSource, SqlSourceConf};
}
