//! Arrow integration layer for `msgpack2arrow`.
//!
//! This crate focuses on three responsibilities:
//! 1. Convert `msgpack2arrow-core` schema IR (`FieldDefs`) to an Arrow `Schema`.
//! 2. Append decoded map records to per-field [`ColumnBuilder`]s.
//! 3. Finalize builders into an immutable, optionally chunked [`Table`].
//!
//! # Typical Flow
//! ```rust
//! use std::sync::Arc;
//!
//! use msgpack2arrow_arrow::{TableAssembler, arrow_value_rows_to_table, field_defs_to_arrow_schema};
//! use msgpack2arrow_core::{FieldDefs, Value};
//!
//! # let field_defs = FieldDefs::default();
//! # let rows: Vec<Value> = vec![];
//! let schema = Arc::new(field_defs_to_arrow_schema(&field_defs));
//! let assembler = TableAssembler::new(schema).with_chunk_size(Some(1024));
//! let table = arrow_value_rows_to_table(&rows, assembler).unwrap();
//! assert_eq!(table.num_rows(), rows.len());
//! ```
pub mod arrow_convert;
pub mod error;
pub mod schema_convert;
pub mod table;

/// Re-exports from [`arrow_convert`].
pub use arrow_convert::{ColumnBuilder, append_record, arrow_value_rows_to_table};
/// Re-export of [`error::ArrowConvertError`].
pub use error::ArrowConvertError;
/// Re-export of [`schema_convert::field_defs_to_arrow_schema`].
pub use schema_convert::field_defs_to_arrow_schema;
/// Re-exports from [`table`].
pub use table::{ChunkedArray, Table, TableAssembler};
