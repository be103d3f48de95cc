use arrow::datatypes::DataType;
use msgpack2arrow_core::{Value, ValueTypeError};

pub(super) enum ScalarValue<'a> {
    Null,
    Boolean(Option<bool>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Utf8(Option<&'a str>),
    Binary(Option<&'a [u8]>),
}

/// Read `value` as the scalar type `dt`, widening numerics where the schema
/// asks for it. Returns `Ok(None)` for nested types.
pub(super) fn scalar_value_for_datatype<'a>(
    dt: &DataType,
    value: &'a Value,
) -> Result<Option<ScalarValue<'a>>, ValueTypeError> {
    Ok(Some(match dt {
        DataType::Null => match value {
            Value::Null => ScalarValue::Null,
            other => return Err(other.type_mismatch("Null")),
        },
        DataType::Boolean => ScalarValue::Boolean(value.try_bool()?),
        DataType::Int64 => ScalarValue::Int64(value.try_i64()?),
        DataType::Float64 => ScalarValue::Float64(value.try_f64()?),
        DataType::Utf8 => ScalarValue::Utf8(value.try_str()?),
        DataType::Binary => ScalarValue::Binary(value.try_bytes()?),
        _ => return Ok(None),
    }))
}
