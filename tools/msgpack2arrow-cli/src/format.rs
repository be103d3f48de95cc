use arrow::datatypes::DataType;
use clap::ValueEnum;

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    Jsonl,
    Csv,
    Parquet,
}

impl OutputFormat {
    /// Whether a column of type `dt` can be written in this format.
    pub fn supports(&self, dt: &DataType) -> bool {
        match self {
            OutputFormat::Jsonl | OutputFormat::Parquet => true,
            OutputFormat::Csv => !dt.is_nested(),
        }
    }
}
