use arrow::array::{
    ArrayBuilder, BinaryBuilder, BooleanBuilder, Float64Builder, Int64Builder, ListBuilder,
    NullBuilder, StringBuilder, StructBuilder,
};
use arrow::datatypes::{DataType, Field};
use msgpack2arrow_core::Value;

/// Initial value-data bytes for string and binary builders.
const VALUE_DATA_CAPACITY: usize = 64;

pub(super) fn make_builder(dt: &DataType, capacity: usize) -> Box<dyn ArrayBuilder> {
    match dt {
        DataType::Null => Box::new(NullBuilder::new()),
        DataType::Boolean => Box::new(BooleanBuilder::with_capacity(capacity)),
        DataType::Int64 => Box::new(Int64Builder::with_capacity(capacity)),
        DataType::Float64 => Box::new(Float64Builder::with_capacity(capacity)),
        DataType::Utf8 => Box::new(StringBuilder::with_capacity(capacity, VALUE_DATA_CAPACITY)),
        DataType::Binary => Box::new(BinaryBuilder::with_capacity(capacity, VALUE_DATA_CAPACITY)),
        DataType::List(field) => {
            let child = make_builder(field.data_type(), capacity);
            Box::new(ListBuilder::with_capacity(child, capacity).with_field(field.clone()))
        }
        DataType::Struct(fields) => {
            let child_builders: Vec<Box<dyn ArrayBuilder>> = fields
                .iter()
                .map(|f| make_builder(f.data_type(), capacity))
                .collect();
            let fields_vec: Vec<Field> = fields.iter().map(|f| f.as_ref().clone()).collect();
            Box::new(StructBuilder::new(fields_vec, child_builders))
        }
        other => panic!("unsupported DataType for builder: {other:?}"),
    }
}

/// Bytes `make_builder(dt, capacity)` allocates before the first append.
pub(crate) fn preallocated_size(dt: &DataType, capacity: usize) -> usize {
    match dt {
        DataType::Boolean => capacity.div_ceil(8),
        DataType::Int64 | DataType::Float64 => capacity.saturating_mul(8),
        DataType::Utf8 | DataType::Binary => capacity
            .saturating_add(1)
            .saturating_mul(4)
            .saturating_add(VALUE_DATA_CAPACITY),
        DataType::List(field) => capacity
            .saturating_add(1)
            .saturating_mul(4)
            .saturating_add(preallocated_size(field.data_type(), capacity)),
        DataType::Struct(fields) => fields
            .iter()
            .map(|f| preallocated_size(f.data_type(), capacity))
            .sum(),
        _ => 0,
    }
}

/// Estimated buffer bytes one append of `value` adds to a builder for `dt`.
///
/// Fixed-width slots are counted whether or not the value is null, matching
/// how Arrow lays out null slots. Validity bitmaps are not counted.
pub(super) fn appended_size(dt: &DataType, value: &Value) -> usize {
    match dt {
        DataType::Boolean => 1,
        DataType::Int64 | DataType::Float64 => 8,
        DataType::Utf8 | DataType::Binary => {
            4 + match value {
                Value::String(s) => s.len(),
                Value::Bytes(b) => b.len(),
                _ => 0,
            }
        }
        DataType::List(field) => {
            4 + match value {
                Value::Array(items) => items
                    .iter()
                    .map(|item| appended_size(field.data_type(), item))
                    .sum(),
                _ => 0,
            }
        }
        DataType::Struct(fields) => fields
            .iter()
            .map(|f| appended_size(f.data_type(), value.get(f.name()).unwrap_or(&Value::Null)))
            .sum(),
        _ => 0,
    }
}
