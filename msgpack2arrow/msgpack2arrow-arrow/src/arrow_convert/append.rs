use arrow::{
    array::{
        ArrayBuilder, BinaryBuilder, BooleanBuilder, Float64Builder, Int64Builder, ListBuilder,
        NullBuilder, StringBuilder, StructBuilder,
    },
    datatypes::DataType,
};
use msgpack2arrow_core::{Value, ValueTypeError};

use super::scalar::{ScalarValue, scalar_value_for_datatype};

macro_rules! cast_builder {
    ($b:expr, $T:ty) => {
        $b.as_any_mut()
            .downcast_mut::<$T>()
            .expect(concat!("expected builder type: ", stringify!($T)))
    };
}

fn append_scalar_dyn(builder: &mut Box<dyn ArrayBuilder>, scalar: &ScalarValue<'_>) {
    match scalar {
        ScalarValue::Null => cast_builder!(builder, NullBuilder).append_null(),
        ScalarValue::Boolean(v) => cast_builder!(builder, BooleanBuilder).append_option(*v),
        ScalarValue::Int64(v) => cast_builder!(builder, Int64Builder).append_option(*v),
        ScalarValue::Float64(v) => cast_builder!(builder, Float64Builder).append_option(*v),
        ScalarValue::Utf8(v) => cast_builder!(builder, StringBuilder).append_option(*v),
        ScalarValue::Binary(v) => cast_builder!(builder, BinaryBuilder).append_option(*v),
    }
}

fn append_list_items(
    child_builder: &mut Box<dyn ArrayBuilder>,
    item_dt: &DataType,
    value: &Value,
) -> Result<bool, ValueTypeError> {
    match value {
        Value::Array(items) => {
            for item in items {
                append_value_to_builder(child_builder, item_dt, item)
                    .map_err(|e| e.nested_in("[]"))?;
            }
            Ok(true)
        }
        Value::Null => Ok(false),
        _ => Err(value.type_mismatch("Array")),
    }
}

/// Append one value to a builder created by `make_builder` for `dt`.
///
/// `Null` appends a null slot at any level; struct members missing from a map
/// are appended as nulls.
pub(super) fn append_value_to_builder(
    builder: &mut Box<dyn ArrayBuilder>,
    dt: &DataType,
    value: &Value,
) -> Result<(), ValueTypeError> {
    if let Some(scalar) = scalar_value_for_datatype(dt, value)? {
        append_scalar_dyn(builder, &scalar);
        return Ok(());
    }

    match dt {
        DataType::List(field) => {
            let b = cast_builder!(builder, ListBuilder<Box<dyn ArrayBuilder>>);
            let valid = append_list_items(b.values(), field.data_type(), value)?;
            b.append(valid);
        }
        DataType::Struct(fields) => {
            let b = cast_builder!(builder, StructBuilder);
            let valid = match value {
                Value::Map(_) => true,
                Value::Null => false,
                _ => return Err(value.type_mismatch("Map")),
            };
            for (i, field) in fields.iter().enumerate() {
                let member = value.get(field.name()).unwrap_or(&Value::Null);
                append_value_to_struct_field(b, i, field.data_type(), member)
                    .map_err(|e| e.nested_in(field.name()))?;
            }
            b.append(valid);
        }
        other => panic!("unsupported DataType in append_value_to_builder: {other:?}"),
    }
    Ok(())
}

fn append_value_to_struct_field(
    sb: &mut StructBuilder,
    index: usize,
    dt: &DataType,
    value: &Value,
) -> Result<(), ValueTypeError> {
    append_value_to_builder(&mut sb.field_builders_mut()[index], dt, value)
}
