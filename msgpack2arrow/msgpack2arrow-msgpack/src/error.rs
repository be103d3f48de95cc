//! Errors raised while decoding a MessagePack stream.

use std::str::Utf8Error;

/// Decode failure. Offsets are absolute byte positions in the input stream.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// A marker or length prefix implies more bytes than the stream holds.
    #[error("truncated input at offset {offset}: needed {needed} bytes, {available} available")]
    TruncatedInput {
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// Reserved marker (`0xc1`) or an extension type, which has no value mapping.
    #[error("unsupported marker 0x{marker:02x} at offset {offset}")]
    UnsupportedMarker { marker: u8, offset: u64 },

    /// A string payload is not valid UTF-8.
    #[error("invalid UTF-8 in string at offset {offset}: {source}")]
    InvalidUtf8 {
        offset: u64,
        #[source]
        source: Utf8Error,
    },

    /// Containers are nested deeper than the configured limit.
    #[error("nesting deeper than {max_depth} levels at offset {offset}")]
    NestingTooDeep { max_depth: usize, offset: u64 },

    /// A map key decoded to something other than a string.
    #[error("map key at offset {offset} must be a string, found {found}")]
    MapKeyNotString { offset: u64, found: &'static str },

    /// The underlying byte stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
