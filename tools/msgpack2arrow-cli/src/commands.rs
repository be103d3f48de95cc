pub mod convert;
pub mod schema;

use std::sync::Arc;

use clap::Args;
use msgpack2arrow::{
    ReadOptions,
    memory_pool::{GreedyMemoryPool, MemoryPool, UnboundedMemoryPool},
};

/// Reader options shared by every subcommand.
#[derive(Args)]
pub struct ReadArgs {
    /// Maximum container nesting depth per record
    #[arg(long, default_value_t = ReadOptions::default().max_nesting_depth)]
    max_depth: usize,

    /// Rows per output chunk (single chunk if not specified)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Also accept a top-level array of maps
    #[arg(long)]
    lenient_root: bool,

    /// Memory limit in bytes for decoded records and column buffers
    #[arg(long)]
    memory_limit: Option<usize>,
}

impl ReadArgs {
    pub fn options(&self) -> ReadOptions {
        ReadOptions::default()
            .with_max_nesting_depth(self.max_depth)
            .with_chunk_size(self.chunk_size)
            .with_strict_root(!self.lenient_root)
    }

    pub fn pool(&self) -> Arc<dyn MemoryPool> {
        match self.memory_limit {
            Some(limit) => Arc::new(GreedyMemoryPool::new(limit)),
            None => Arc::new(UnboundedMemoryPool::default()),
        }
    }
}
