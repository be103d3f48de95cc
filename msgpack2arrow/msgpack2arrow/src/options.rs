use msgpack2arrow_msgpack::DEFAULT_MAX_NESTING_DEPTH;

use crate::error::ReaderError;

/// Options recognized by [`MsgPackReader`](crate::MsgPackReader).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Maximum number of nested containers in one record. The array wrapping
    /// records under a lenient root does not count.
    pub max_nesting_depth: usize,
    /// Rows per output chunk; `None` produces a single chunk per column.
    pub chunk_size: Option<usize>,
    /// Require every top-level value to be a map. When `false`, a top-level
    /// array is also accepted and each of its elements becomes a record.
    pub strict_root: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            chunk_size: None,
            strict_root: true,
        }
    }
}

impl ReadOptions {
    pub fn with_max_nesting_depth(mut self, max_nesting_depth: usize) -> Self {
        self.max_nesting_depth = max_nesting_depth;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: Option<usize>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_strict_root(mut self, strict_root: bool) -> Self {
        self.strict_root = strict_root;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), ReaderError> {
        if self.max_nesting_depth == 0 {
            return Err(ReaderError::InvalidOptions(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        if self.chunk_size == Some(0) {
            return Err(ReaderError::InvalidOptions(
                "chunk_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
