//! Two-pass MessagePack table reader.
//!
//! Pass 1 decodes every top-level record into a [`Value`] and threads it
//! through the [`SchemaInferencer`]. Columnar output needs its schema fixed
//! before any column builder exists, and the schema is only known once every
//! record has been seen, so the decoded records are retained.
//!
//! Pass 2 walks the retained records and appends each one to the column
//! builders of the frozen schema, then assembles the [`Table`].
//!
//! Peak memory is therefore the decoded input held twice: once as retained
//! values and once as Arrow buffers. Both are accounted against the caller's
//! [`MemoryPool`] through one [`MemoryConsumer`] each. The column reservation
//! grows while builders fill, before any array is finished. The retained
//! values are released in bulk once the table is built; the table's own
//! reservation lives as long as the table.

use std::{io::Read, sync::Arc};

use datafusion_execution::memory_pool::{MemoryConsumer, MemoryPool, MemoryReservation};
use msgpack2arrow_arrow::{
    Table, TableAssembler, arrow_value_rows_to_table, field_defs_to_arrow_schema,
};
use msgpack2arrow_core::{
    FieldDefs, InferenceWarning, InferredSchema, SchemaInferencer, Value,
};
use msgpack2arrow_msgpack::Decoder;
use tracing::debug;

use crate::{error::ReaderError, options::ReadOptions};

/// Reads a stream of MessagePack maps into a single Arrow [`Table`].
///
/// The input is consumed by the first call to [`read`](Self::read) or
/// [`infer_field_defs`](Self::infer_field_defs); any later call fails with
/// [`ReaderError::AlreadyConsumed`].
pub struct MsgPackReader<R> {
    pool: Arc<dyn MemoryPool>,
    input: Option<R>,
    options: ReadOptions,
    warnings: Vec<InferenceWarning>,
    peak_reserved: usize,
}

/// Output of the first pass.
struct RetainedRecords {
    records: Vec<Value>,
    schema: InferredSchema,
    /// Accounts for `records`; released when this struct is dropped.
    _reservation: MemoryReservation,
}

impl<R: Read> MsgPackReader<R> {
    /// Create a reader over `input`. Options are validated here; no bytes
    /// are read until [`read`](Self::read).
    pub fn make(
        pool: Arc<dyn MemoryPool>,
        input: R,
        options: ReadOptions,
    ) -> Result<Self, ReaderError> {
        options.validate()?;
        Ok(Self {
            pool,
            input: Some(input),
            options,
            warnings: Vec::new(),
            peak_reserved: 0,
        })
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Warnings collected by the last pass over the input.
    pub fn warnings(&self) -> &[InferenceWarning] {
        &self.warnings
    }

    /// Highest pool reservation seen at the end of each pass of the last read.
    ///
    /// After [`read`](Self::read) this covers retained records and finished
    /// columns held together.
    pub fn peak_reserved(&self) -> usize {
        self.peak_reserved
    }

    /// Decode the whole stream and return it as one table.
    pub fn read(&mut self) -> Result<Table, ReaderError> {
        let retained = self.decode_and_infer()?;

        let schema = Arc::new(field_defs_to_arrow_schema(&retained.schema.fields));
        let assembler = TableAssembler::new(schema)
            .with_chunk_size(self.options.chunk_size)
            .with_reservation(MemoryConsumer::new("msgpack2arrow columns").register(&self.pool));
        let table = arrow_value_rows_to_table(&retained.records, assembler)?;
        self.peak_reserved = self.peak_reserved.max(self.pool.reserved());

        debug!(
            rows = table.num_rows(),
            columns = table.num_columns(),
            pool_reserved = self.pool.reserved(),
            peak_reserved = self.peak_reserved,
            "columns built"
        );
        Ok(table)
    }

    /// Run only the inference pass and return the frozen field list.
    pub fn infer_field_defs(&mut self) -> Result<FieldDefs, ReaderError> {
        let retained = self.decode_and_infer()?;
        Ok(retained.schema.fields)
    }

    fn decode_and_infer(&mut self) -> Result<RetainedRecords, ReaderError> {
        let input = self.input.take().ok_or(ReaderError::AlreadyConsumed)?;
        self.warnings.clear();
        self.peak_reserved = 0;

        let mut decoder = Decoder::new(input).with_max_depth(self.options.max_nesting_depth);
        let mut inferencer = SchemaInferencer::new();
        let mut reservation =
            MemoryConsumer::new("msgpack2arrow retained records").register(&self.pool);
        let mut records = Vec::new();

        loop {
            // The wrapper array of a lenient root is not part of any record.
            if !self.options.strict_root
                && let Some(len) = decoder.read_array_header()?
            {
                for _ in 0..len {
                    let item = decoder.next_element()?;
                    retain(&mut inferencer, &mut reservation, &mut records, item)?;
                }
                continue;
            }
            match decoder.next_value()? {
                Some(value) => retain(&mut inferencer, &mut reservation, &mut records, value)?,
                None => break,
            }
        }

        let schema = inferencer.finish();
        self.warnings = schema.warnings.clone();
        self.peak_reserved = self.peak_reserved.max(self.pool.reserved());
        debug!(
            records = records.len(),
            fields = schema.fields.len(),
            bytes = decoder.position(),
            retained_bytes = reservation.size(),
            "decode pass finished"
        );

        Ok(RetainedRecords {
            records,
            schema,
            _reservation: reservation,
        })
    }
}

fn retain(
    inferencer: &mut SchemaInferencer,
    reservation: &mut MemoryReservation,
    records: &mut Vec<Value>,
    record: Value,
) -> Result<(), ReaderError> {
    inferencer.observe(&record)?;
    reservation
        .try_grow(record.estimated_size())
        .map_err(ReaderError::MemoryLimit)?;
    records.push(record);
    Ok(())
}
