use std::{
    fs,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use arrow::{datatypes::SchemaRef, record_batch::RecordBatch};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};
use tracing::info;

pub trait RecordBatchWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()>;
    fn finish(self: Box<Self>) -> Result<()>;
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

// --- JSON Lines ---

pub struct JsonlWriter {
    inner: arrow::json::LineDelimitedWriter<Box<dyn Write>>,
}

impl JsonlWriter {
    pub fn new(output: Option<&Path>) -> Result<Self> {
        Ok(Self {
            inner: arrow::json::LineDelimitedWriter::new(open_output(output)?),
        })
    }
}

impl RecordBatchWriter for JsonlWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.inner.write(batch)?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let mut inner = self.inner;
        inner.finish()?;
        inner.into_inner().flush()?;
        Ok(())
    }
}

// --- CSV ---

pub struct CsvWriter {
    inner: arrow::csv::Writer<Box<dyn Write>>,
}

impl CsvWriter {
    pub fn new(output: Option<&Path>) -> Result<Self> {
        let inner = arrow::csv::WriterBuilder::new()
            .with_header(true)
            .build(open_output(output)?);
        Ok(Self { inner })
    }
}

impl RecordBatchWriter for CsvWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.inner.write(batch)?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        self.inner.into_inner().flush()?;
        Ok(())
    }
}

// --- Parquet ---

pub struct ParquetWriter {
    output_path: PathBuf,
    inner: ArrowWriter<fs::File>,
}

impl ParquetWriter {
    pub fn new(output: &Path, schema: SchemaRef) -> Result<Self> {
        let file = fs::File::create(output)?;
        let props = WriterProperties::builder().build();
        Ok(Self {
            output_path: output.to_path_buf(),
            inner: ArrowWriter::try_new(file, schema, Some(props))?,
        })
    }
}

impl RecordBatchWriter for ParquetWriter {
    fn write_batch(&mut self, batch: &RecordBatch) -> Result<()> {
        self.inner.write(batch)?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let Self { output_path, inner } = *self;
        inner.close()?;
        info!(path = %output_path.display(), "parquet file written");
        Ok(())
    }
}
