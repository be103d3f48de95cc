mod error;
mod options;
mod reader;

pub use datafusion_execution::memory_pool;
pub use error::ReaderError;
pub use msgpack2arrow_arrow as arrow;
pub use msgpack2arrow_core as core;
pub use msgpack2arrow_msgpack as msgpack;
pub use options::ReadOptions;
pub use reader::MsgPackReader;
