use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Schema};
use msgpack2arrow_core::{DataTypeDef, ElementDef, FieldDef, FieldDefs};

/// Converts `msgpack2arrow-core` schema IR into an Arrow `Schema`.
///
/// Field order and nullability are carried over unchanged.
pub fn field_defs_to_arrow_schema(fields: &FieldDefs) -> Schema {
    let arrow_fields: Vec<Field> = fields.iter().map(field_def_to_arrow_field).collect();
    Schema::new(arrow_fields)
}

fn field_def_to_arrow_field(f: &FieldDef) -> Field {
    Field::new(
        &f.name,
        element_def_to_datatype(&f.element),
        f.element.nullable,
    )
}

fn element_def_to_datatype(elem: &ElementDef) -> DataType {
    match &elem.data_type {
        DataTypeDef::Null => DataType::Null,
        DataTypeDef::Bool => DataType::Boolean,
        DataTypeDef::I64 => DataType::Int64,
        DataTypeDef::F64 => DataType::Float64,
        DataTypeDef::String => DataType::Utf8,
        DataTypeDef::Bytes => DataType::Binary,
        DataTypeDef::Struct(fields) => {
            let arrow_fields: Vec<Field> = fields.iter().map(field_def_to_arrow_field).collect();
            DataType::Struct(arrow_fields.into())
        }
        DataTypeDef::List(item) => {
            let child_dt = element_def_to_datatype(item);
            DataType::List(Arc::new(Field::new("item", child_dt, item.nullable)))
        }
    }
}
