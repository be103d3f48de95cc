use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use msgpack2arrow::{MsgPackReader, core::format_field_defs};

use crate::{commands::ReadArgs, input::mmap_file};

#[derive(Args)]
pub struct SchemaArgs {
    /// Path to the MessagePack file
    input: PathBuf,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    read: ReadArgs,
}

impl SchemaArgs {
    pub fn run(self) -> Result<()> {
        let mmap = mmap_file(&self.input)?;
        let mut reader = MsgPackReader::make(self.read.pool(), &mmap[..], self.read.options())?;
        let field_defs = reader
            .infer_field_defs()
            .with_context(|| format!("failed to infer schema of {}", self.input.display()))?;
        let text = format_field_defs(&field_defs)?;

        match self.output {
            Some(path) => fs::write(path, format!("{text}\n"))?,
            None => println!("{text}"),
        }
        Ok(())
    }
}
