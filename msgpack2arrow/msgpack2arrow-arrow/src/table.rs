//! Immutable, optionally chunked output table.

use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef},
    datatypes::{DataType, SchemaRef},
    error::ArrowError,
    record_batch::{RecordBatch, RecordBatchOptions},
};
use datafusion_execution::memory_pool::MemoryReservation;
use tracing::debug;

use crate::{
    arrow_convert::{ColumnBuilder, preallocated_size},
    error::ArrowConvertError,
};

/// Contiguous, row-aligned slices of one column.
#[derive(Debug, Clone)]
pub struct ChunkedArray {
    data_type: DataType,
    chunks: Vec<ArrayRef>,
}

impl ChunkedArray {
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn chunks(&self) -> &[ArrayRef] {
        &self.chunks
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Total number of rows across all chunks.
    pub fn len(&self) -> usize {
        self.chunks.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        self.chunks.iter().map(|c| c.null_count()).sum()
    }
}

/// Schema plus columns that all share identical chunk boundaries.
///
/// The table holds the memory reservation for its column buffers; it is
/// returned to the pool when the table is dropped.
#[derive(Debug)]
pub struct Table {
    schema: SchemaRef,
    columns: Vec<ChunkedArray>,
    chunk_lengths: Vec<usize>,
    num_rows: usize,
    _reservation: Option<MemoryReservation>,
}

impl Table {
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Row count of every chunk, shared by all columns.
    pub fn chunk_lengths(&self) -> &[usize] {
        &self.chunk_lengths
    }

    pub fn columns(&self) -> &[ChunkedArray] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> &ChunkedArray {
        &self.columns[index]
    }

    pub fn column_by_name(&self, name: &str) -> Option<&ChunkedArray> {
        self.schema
            .index_of(name)
            .ok()
            .map(|index| &self.columns[index])
    }

    /// One `RecordBatch` per chunk, in row order.
    pub fn to_record_batches(&self) -> Result<Vec<RecordBatch>, ArrowError> {
        self.chunk_lengths
            .iter()
            .enumerate()
            .map(|(i, &rows)| {
                let arrays: Vec<ArrayRef> = self
                    .columns
                    .iter()
                    .map(|c| Arc::clone(&c.chunks[i]))
                    .collect();
                RecordBatch::try_new_with_options(
                    Arc::clone(&self.schema),
                    arrays,
                    &RecordBatchOptions::new().with_row_count(Some(rows)),
                )
            })
            .collect()
    }
}

/// Finalizes column builders into a [`Table`] for a frozen schema.
pub struct TableAssembler {
    schema: SchemaRef,
    chunk_size: Option<usize>,
    reservation: Option<MemoryReservation>,
}

impl TableAssembler {
    pub fn new(schema: SchemaRef) -> Self {
        Self {
            schema,
            chunk_size: None,
            reservation: None,
        }
    }

    /// Rows per output chunk; `None` yields a single chunk per column.
    ///
    /// # Panics
    /// Panics if `chunk_size` is `Some(0)`.
    pub fn with_chunk_size(mut self, chunk_size: Option<usize>) -> Self {
        assert_ne!(chunk_size, Some(0), "chunk size must be positive");
        self.chunk_size = chunk_size;
        self
    }

    /// Account builder and column buffers against `reservation`.
    pub fn with_reservation(mut self, reservation: MemoryReservation) -> Self {
        self.reservation = Some(reservation);
        self
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// One builder per schema field, in schema order.
    ///
    /// The builders' initial allocation is reserved before they are created.
    pub fn column_builders(
        &mut self,
        capacity: usize,
    ) -> Result<Vec<ColumnBuilder>, ArrowConvertError> {
        let preallocated = self
            .schema
            .fields()
            .iter()
            .map(|f| preallocated_size(f.data_type(), capacity))
            .sum();
        self.grow_to(preallocated)?;
        Ok(self
            .schema
            .fields()
            .iter()
            .map(|f| ColumnBuilder::new(Arc::clone(f), capacity))
            .collect())
    }

    /// Grow the reservation to cover the estimated size of `builders`.
    pub fn reserve_builders(
        &mut self,
        builders: &[ColumnBuilder],
    ) -> Result<(), ArrowConvertError> {
        self.grow_to(builders.iter().map(ColumnBuilder::memory_size).sum())
    }

    fn grow_to(&mut self, bytes: usize) -> Result<(), ArrowConvertError> {
        if let Some(reservation) = self.reservation.as_mut()
            && bytes > reservation.size()
        {
            let additional = bytes - reservation.size();
            reservation
                .try_grow(additional)
                .map_err(ArrowConvertError::Memory)?;
        }
        Ok(())
    }

    /// Finalize every builder and pair the arrays with the schema.
    ///
    /// All builders must hold exactly `num_rows` rows. The reservation is
    /// resized to the finished arrays' actual size. No table is produced on
    /// error.
    pub fn finish(
        mut self,
        builders: Vec<ColumnBuilder>,
        num_rows: usize,
    ) -> Result<Table, ArrowConvertError> {
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(builders.len());
        for builder in builders {
            let name = builder.field().name().clone();
            let array = builder.finish();
            if array.len() != num_rows {
                return Err(ArrowConvertError::ColumnLength {
                    column: name,
                    expected: num_rows,
                    actual: array.len(),
                });
            }
            arrays.push(array);
        }

        if let Some(reservation) = self.reservation.as_mut() {
            let size = arrays.iter().map(|a| a.get_array_memory_size()).sum();
            reservation
                .try_resize(size)
                .map_err(ArrowConvertError::Memory)?;
        }

        // Validates types and nullability of every column against the schema.
        RecordBatch::try_new_with_options(
            Arc::clone(&self.schema),
            arrays.clone(),
            &RecordBatchOptions::new().with_row_count(Some(num_rows)),
        )?;

        let chunk_lengths = chunk_lengths(num_rows, self.chunk_size);
        let columns: Vec<ChunkedArray> = arrays
            .into_iter()
            .map(|array| ChunkedArray {
                data_type: array.data_type().clone(),
                chunks: split_chunks(&array, &chunk_lengths),
            })
            .collect();

        debug!(
            rows = num_rows,
            columns = columns.len(),
            chunks = chunk_lengths.len(),
            "table assembled"
        );

        Ok(Table {
            schema: self.schema,
            columns,
            chunk_lengths,
            num_rows,
            _reservation: self.reservation,
        })
    }
}

fn chunk_lengths(num_rows: usize, chunk_size: Option<usize>) -> Vec<usize> {
    match chunk_size {
        None => vec![num_rows],
        Some(size) => (0..num_rows)
            .step_by(size)
            .map(|start| size.min(num_rows - start))
            .collect(),
    }
}

fn split_chunks(array: &ArrayRef, lengths: &[usize]) -> Vec<ArrayRef> {
    if let [only] = lengths
        && *only == array.len()
    {
        return vec![Arc::clone(array)];
    }
    let mut offset = 0;
    lengths
        .iter()
        .map(|&len| {
            let chunk = array.slice(offset, len);
            offset += len;
            chunk
        })
        .collect()
}
