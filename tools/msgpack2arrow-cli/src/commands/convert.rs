use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Args;
use msgpack2arrow::MsgPackReader;
use tracing::{info, warn};

use crate::{
    commands::ReadArgs,
    format::OutputFormat,
    input::mmap_file,
    writer::{CsvWriter, JsonlWriter, ParquetWriter, RecordBatchWriter},
};

#[derive(Args)]
pub struct ConvertArgs {
    /// Path to the MessagePack file
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Jsonl)]
    format: OutputFormat,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    read: ReadArgs,
}

impl ConvertArgs {
    pub fn run(self) -> Result<()> {
        let mmap = mmap_file(&self.input)?;
        let mut reader = MsgPackReader::make(self.read.pool(), &mmap[..], self.read.options())?;
        let table = reader
            .read()
            .with_context(|| format!("failed to read {}", self.input.display()))?;

        let mut indices = Vec::new();
        let mut dropped = Vec::new();
        for (i, field) in table.schema().fields().iter().enumerate() {
            if self.format.supports(field.data_type()) {
                indices.push(i);
            } else {
                dropped.push(field.name().as_str());
            }
        }
        if !dropped.is_empty() {
            warn!(
                columns = %dropped.join(", "),
                format = ?self.format,
                "output format skipped nested columns"
            );
        }
        let schema = Arc::new(table.schema().project(&indices)?);

        let mut writer: Box<dyn RecordBatchWriter> = match self.format {
            OutputFormat::Jsonl => Box::new(JsonlWriter::new(self.output.as_deref())?),
            OutputFormat::Csv => Box::new(CsvWriter::new(self.output.as_deref())?),
            OutputFormat::Parquet => {
                let path = self
                    .output
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("Parquet output requires -o <file>"))?;
                Box::new(ParquetWriter::new(path, Arc::clone(&schema))?)
            }
        };

        for batch in table.to_record_batches()? {
            writer.write_batch(&batch.project(&indices)?)?;
        }
        writer.finish()?;

        info!(
            rows = table.num_rows(),
            columns = schema.fields().len(),
            "conversion finished"
        );
        Ok(())
    }
}
