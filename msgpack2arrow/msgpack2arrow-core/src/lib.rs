//! Encoding-agnostic core types for `msgpack2arrow`.
//!
//! This crate provides the Arrow-independent intermediate representations
//! ([`Value`] / [`DataTypeDef`]), the type unification lattice and the
//! record-by-record [`SchemaInferencer`].

mod error;
mod infer;
mod schema;
mod value;

pub use error::{InferError, UnifyError, ValueTypeError};
pub use infer::{InferenceWarning, InferredSchema, SchemaInferencer};
pub use schema::{
    DataTypeDef, ElementDef, FieldDef, FieldDefs, format_field_defs, join_path, natural_type,
    unify,
};
pub use value::Value;
