//! Forward-only MessagePack decoding to the dynamic Value type.

use std::{
    io::{ErrorKind, Read},
    sync::Arc,
};

use bytes::{Buf, Bytes, BytesMut};
use indexmap::IndexMap;
use msgpack2arrow_core::Value;
use tracing::trace;

use crate::{error::DecodeError, marker::Marker};

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Bytes requested from the underlying reader per refill.
const READ_CHUNK: usize = 64 * 1024;

/// Upper bound on container pre-allocation; declared counts are untrusted.
const PREALLOC_LIMIT: usize = 1024;

/// Decode exactly one value from an in-memory buffer.
///
/// Trailing bytes after the first value are ignored.
pub fn decode_msgpack_to_value(data: &[u8], max_depth: usize) -> Result<Value, DecodeError> {
    let mut d = Decoder::new(data).with_max_depth(max_depth);
    d.next_value()?.ok_or(DecodeError::TruncatedInput {
        offset: 0,
        needed: 1,
        available: 0,
    })
}

/// Pulls self-describing values from a byte stream, one top-level value at a time.
///
/// The stream is consumed strictly forward through an internal buffer that is
/// refilled in bounded chunks; nothing is ever re-read.
pub struct Decoder<R> {
    reader: R,
    buf: BytesMut,
    /// Absolute stream offset of `buf[0]`.
    pos: u64,
    eof: bool,
    max_depth: usize,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: BytesMut::new(),
            pos: 0,
            eof: false,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Maximum number of nested containers; the top-level container is depth 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Decode the next top-level value.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between values.
    pub fn next_value(&mut self) -> Result<Option<Value>, DecodeError> {
        if !self.fill_to(1)? {
            trace!(offset = self.pos, "end of stream");
            return Ok(None);
        }
        self.decode_value(0).map(Some)
    }

    /// Consume the header of a top-level array and return its length.
    ///
    /// Returns `Ok(None)` without consuming anything if the next value is not
    /// an array or the stream has ended. The elements can then be read with
    /// [`next_element`](Self::next_element), each counted from depth 0 as if
    /// it were a top-level value.
    pub fn read_array_header(&mut self) -> Result<Option<usize>, DecodeError> {
        if !self.fill_to(1)? {
            return Ok(None);
        }
        let len = match Marker::from_u8(self.buf[0]) {
            Marker::FixArray(n) => {
                self.read_u8()?;
                n as usize
            }
            Marker::Array16 => {
                self.read_u8()?;
                self.read_u16()? as usize
            }
            Marker::Array32 => {
                self.read_u8()?;
                self.read_u32()? as usize
            }
            _ => return Ok(None),
        };
        trace!(offset = self.pos, len, "top-level array header");
        Ok(Some(len))
    }

    /// Decode one element announced by [`read_array_header`](Self::read_array_header).
    ///
    /// Unlike [`next_value`](Self::next_value), the end of the stream is an
    /// error here.
    pub fn next_element(&mut self) -> Result<Value, DecodeError> {
        self.decode_value(0)
    }

    /// Make sure at least `n` bytes are buffered. Returns `false` if the stream
    /// ends first.
    fn fill_to(&mut self, n: usize) -> Result<bool, DecodeError> {
        while self.buf.len() < n {
            if self.eof {
                return Ok(false);
            }
            let start = self.buf.len();
            self.buf.resize(start + READ_CHUNK, 0);
            let read = loop {
                match self.reader.read(&mut self.buf[start..]) {
                    Ok(read) => break read,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        self.buf.truncate(start);
                        return Err(e.into());
                    }
                }
            };
            self.buf.truncate(start + read);
            if read == 0 {
                self.eof = true;
            }
        }
        Ok(true)
    }

    fn ensure(&mut self, n: usize) -> Result<(), DecodeError> {
        if self.fill_to(n)? {
            Ok(())
        } else {
            Err(DecodeError::TruncatedInput {
                offset: self.pos,
                needed: n,
                available: self.buf.len(),
            })
        }
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.ensure(1)?;
        self.pos += 1;
        Ok(self.buf.get_u8())
    }

    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        self.ensure(2)?;
        self.pos += 2;
        Ok(self.buf.get_u16())
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.ensure(4)?;
        self.pos += 4;
        Ok(self.buf.get_u32())
    }

    fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.ensure(8)?;
        self.pos += 8;
        Ok(self.buf.get_u64())
    }

    fn read_bytes(&mut self, n: usize) -> Result<Bytes, DecodeError> {
        self.ensure(n)?;
        self.pos += n as u64;
        Ok(self.buf.split_to(n).freeze())
    }

    fn decode_value(&mut self, depth: usize) -> Result<Value, DecodeError> {
        let offset = self.pos;
        let byte = self.read_u8()?;
        let marker = Marker::from_u8(byte);

        if marker.is_container() && depth >= self.max_depth {
            return Err(DecodeError::NestingTooDeep {
                max_depth: self.max_depth,
                offset,
            });
        }

        Ok(match marker {
            Marker::Nil => Value::Null,
            Marker::False => Value::Bool(false),
            Marker::True => Value::Bool(true),
            Marker::PosFixInt(n) => Value::U64(n as u64),
            Marker::NegFixInt(n) => Value::I64(n as i64),
            Marker::U8 => Value::U64(self.read_u8()? as u64),
            Marker::U16 => Value::U64(self.read_u16()? as u64),
            Marker::U32 => Value::U64(self.read_u32()? as u64),
            Marker::U64 => Value::U64(self.read_u64()?),
            Marker::I8 => Value::I64(self.read_u8()? as i8 as i64),
            Marker::I16 => Value::I64(self.read_u16()? as i16 as i64),
            Marker::I32 => Value::I64(self.read_u32()? as i32 as i64),
            Marker::I64 => Value::I64(self.read_u64()? as i64),
            Marker::F32 => Value::F64(f32::from_bits(self.read_u32()?) as f64),
            Marker::F64 => Value::F64(f64::from_bits(self.read_u64()?)),
            Marker::FixStr(n) => self.decode_str(n as usize)?,
            Marker::Str8 => {
                let len = self.read_u8()? as usize;
                self.decode_str(len)?
            }
            Marker::Str16 => {
                let len = self.read_u16()? as usize;
                self.decode_str(len)?
            }
            Marker::Str32 => {
                let len = self.read_u32()? as usize;
                self.decode_str(len)?
            }
            Marker::Bin8 => {
                let len = self.read_u8()? as usize;
                Value::Bytes(Arc::from(&self.read_bytes(len)?[..]))
            }
            Marker::Bin16 => {
                let len = self.read_u16()? as usize;
                Value::Bytes(Arc::from(&self.read_bytes(len)?[..]))
            }
            Marker::Bin32 => {
                let len = self.read_u32()? as usize;
                Value::Bytes(Arc::from(&self.read_bytes(len)?[..]))
            }
            Marker::FixArray(n) => self.decode_array(n as usize, depth + 1)?,
            Marker::Array16 => {
                let len = self.read_u16()? as usize;
                self.decode_array(len, depth + 1)?
            }
            Marker::Array32 => {
                let len = self.read_u32()? as usize;
                self.decode_array(len, depth + 1)?
            }
            Marker::FixMap(n) => self.decode_map(n as usize, depth + 1)?,
            Marker::Map16 => {
                let len = self.read_u16()? as usize;
                self.decode_map(len, depth + 1)?
            }
            Marker::Map32 => {
                let len = self.read_u32()? as usize;
                self.decode_map(len, depth + 1)?
            }
            Marker::Reserved
            | Marker::Ext8
            | Marker::Ext16
            | Marker::Ext32
            | Marker::FixExt1
            | Marker::FixExt2
            | Marker::FixExt4
            | Marker::FixExt8
            | Marker::FixExt16 => {
                return Err(DecodeError::UnsupportedMarker {
                    marker: byte,
                    offset,
                });
            }
        })
    }

    fn decode_str(&mut self, len: usize) -> Result<Value, DecodeError> {
        let offset = self.pos;
        let bytes = self.read_bytes(len)?;
        let s = std::str::from_utf8(&bytes)
            .map_err(|source| DecodeError::InvalidUtf8 { offset, source })?;
        Ok(Value::String(Arc::from(s)))
    }

    fn decode_array(&mut self, len: usize, depth: usize) -> Result<Value, DecodeError> {
        let mut items = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            items.push(self.decode_value(depth)?);
        }
        Ok(Value::Array(items))
    }

    fn decode_map(&mut self, len: usize, depth: usize) -> Result<Value, DecodeError> {
        let mut entries = IndexMap::with_capacity(len.min(PREALLOC_LIMIT));
        for _ in 0..len {
            let offset = self.pos;
            let key = match self.decode_value(depth)? {
                Value::String(s) => s,
                other => {
                    return Err(DecodeError::MapKeyNotString {
                        offset,
                        found: other.variant_name(),
                    });
                }
            };
            let value = self.decode_value(depth)?;
            // A repeated key keeps its first position and takes the last value.
            entries.insert(key, value);
        }
        Ok(Value::Map(entries))
    }
}
