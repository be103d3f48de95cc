//! MessagePack decoding into [`msgpack2arrow_core::Value`].
//!
//! Key components:
//! - [`Marker`]: classification of the leading type byte of every value
//! - [`Decoder`]: forward-only recursive-descent decoder over any [`std::io::Read`]

mod decoder;
mod error;
mod marker;
#[cfg(feature = "test-util")]
pub mod test_util;

pub use decoder::{DEFAULT_MAX_NESTING_DEPTH, Decoder, decode_msgpack_to_value};
pub use error::DecodeError;
pub use marker::Marker;
