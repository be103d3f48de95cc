use arrow::error::ArrowError;
use datafusion_common::DataFusionError;
use msgpack2arrow_core::ValueTypeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArrowConvertError {
    #[error("value type mismatch: {0}")]
    ValueType(#[from] ValueTypeError),
    #[error("column '{column}' has {actual} rows, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },
    /// The memory pool refused to grow the column reservation.
    #[error("column buffers exceed the memory pool: {0}")]
    Memory(#[source] DataFusionError),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
}
