//! Error types for the table reader.

use datafusion_common::DataFusionError;
use msgpack2arrow_arrow::ArrowConvertError;
use msgpack2arrow_core::InferError;
use msgpack2arrow_msgpack::DecodeError;

/// Errors produced by [`MsgPackReader`](crate::MsgPackReader).
///
/// Every failure is fatal to the read that raised it; no partial table is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The input stream failed or did not hold valid MessagePack.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A top-level value was not a map (or, with a lenient root, an array
    /// element was not a map).
    #[error("record {record}: top-level value must be a map, found {found}")]
    RootMustBeMap { record: usize, found: &'static str },

    /// A field was observed with two kinds that have no common type.
    #[error("record {record}: incompatible types at '{path}': {existing} vs {incoming}")]
    IncompatibleTypes {
        record: usize,
        path: String,
        existing: &'static str,
        incoming: &'static str,
    },

    /// A retained record did not conform to the inferred schema.
    #[error("internal type mismatch while building columns: {0}")]
    InternalTypeMismatch(#[source] ArrowConvertError),

    /// The memory pool refused a reservation for retained records or columns.
    #[error("memory limit reached: {0}")]
    MemoryLimit(#[source] DataFusionError),

    #[error("invalid read options: {0}")]
    InvalidOptions(String),

    /// `read` or `infer_field_defs` was already called on this reader.
    #[error("input stream has already been consumed")]
    AlreadyConsumed,
}

impl From<InferError> for ReaderError {
    fn from(e: InferError) -> Self {
        match e {
            InferError::RootMustBeMap { record, found } => Self::RootMustBeMap { record, found },
            InferError::IncompatibleTypes {
                record,
                path,
                existing,
                incoming,
            } => Self::IncompatibleTypes {
                record,
                path,
                existing,
                incoming,
            },
        }
    }
}

impl From<ArrowConvertError> for ReaderError {
    fn from(e: ArrowConvertError) -> Self {
        match e {
            ArrowConvertError::Memory(e) => Self::MemoryLimit(e),
            other => Self::InternalTypeMismatch(other),
        }
    }
}
