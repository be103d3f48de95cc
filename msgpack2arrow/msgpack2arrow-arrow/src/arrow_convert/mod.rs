//! Column builders that materialize map records into Arrow arrays.
//!
//! There is exactly one [`ColumnBuilder`] per top-level schema field. Each
//! record appends one slot to every builder, so all builders always have the
//! same length; a field missing from a record is appended as null.
//!
//! Each builder keeps an estimate of its buffer bytes so the table's memory
//! reservation can grow while records are appended, not only once the arrays
//! are finished.

mod append;
mod builder;
mod scalar;

use arrow::array::{ArrayBuilder, ArrayRef};
use arrow::datatypes::FieldRef;
use msgpack2arrow_core::{Value, ValueTypeError};

use crate::{error::ArrowConvertError, table::Table, table::TableAssembler};

pub(crate) use builder::preallocated_size;

/// Records appended between two reservation updates.
const RESERVE_INTERVAL: usize = 1024;

/// Mutable accumulator for one top-level column.
pub struct ColumnBuilder {
    field: FieldRef,
    builder: Box<dyn ArrayBuilder>,
    preallocated: usize,
    appended: usize,
}

impl ColumnBuilder {
    pub fn new(field: FieldRef, capacity: usize) -> Self {
        let builder = builder::make_builder(field.data_type(), capacity);
        let preallocated = preallocated_size(field.data_type(), capacity);
        Self {
            field,
            builder,
            preallocated,
            appended: 0,
        }
    }

    pub fn field(&self) -> &FieldRef {
        &self.field
    }

    pub fn len(&self) -> usize {
        self.builder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    /// Estimated bytes held by the builder's buffers.
    pub fn memory_size(&self) -> usize {
        self.preallocated.max(self.appended)
    }

    /// Append one row. `None` means the field was absent from the record.
    pub fn append(&mut self, value: Option<&Value>) -> Result<(), ValueTypeError> {
        let value = value.unwrap_or(&Value::Null);
        append::append_value_to_builder(&mut self.builder, self.field.data_type(), value)
            .map_err(|e| e.nested_in(self.field.name()))?;
        self.appended += builder::appended_size(self.field.data_type(), value);
        Ok(())
    }

    /// Finalize into an immutable array. The builder is consumed.
    pub fn finish(mut self) -> ArrayRef {
        self.builder.finish()
    }
}

/// Append one record to every column builder, looking fields up by name.
pub fn append_record(builders: &mut [ColumnBuilder], record: &Value) -> Result<(), ValueTypeError> {
    if !matches!(record, Value::Map(_)) {
        return Err(record.type_mismatch("Map"));
    }
    for builder in builders.iter_mut() {
        let value = record.get(builder.field().name());
        builder.append(value)?;
    }
    Ok(())
}

/// Convert map records into a [`Table`] using the assembler's frozen schema.
///
/// Every record must conform to that schema; a value that cannot be read as
/// its column type is reported as [`ArrowConvertError::ValueType`]. If the
/// assembler holds a reservation, it is grown periodically while appending
/// to cover the builders' estimated size.
pub fn arrow_value_rows_to_table(
    rows: &[Value],
    mut assembler: TableAssembler,
) -> Result<Table, ArrowConvertError> {
    let mut builders = assembler.column_builders(rows.len())?;
    for (index, row) in rows.iter().enumerate() {
        append_record(&mut builders, row)
            .map_err(|e| ArrowConvertError::ValueType(e.in_record(index)))?;
        if (index + 1) % RESERVE_INTERVAL == 0 {
            assembler.reserve_builders(&builders)?;
        }
    }
    assembler.reserve_builders(&builders)?;
    assembler.finish(builders, rows.len())
}
