//! CBOR encoding and decoding primitives for ledger data.
//!
//! This module provides the low-level serialization infrastructure shared by
//! every binary value in the crate. Values are written as CBOR (RFC 8949) data
//! items, restricted to the subset the ledger's data format uses.
//!
//! # Binary Format
//!
//! - Every item starts with a head byte: major type in the top 3 bits,
//!   additional info in the low 5 bits
//! - Arguments below 24 live in the head byte; larger ones follow in 1, 2, 4
//!   or 8 big-endian bytes (shortest form is always written)
//! - Additional info 31 opens an indefinite-length byte string or array,
//!   closed by the break byte `0xff`
//! - Byte strings longer than 64 bytes are written as an indefinite string of
//!   64-byte chunks
//!
//! # Example
//!
//! ```ignore
//! use crate::types::encoding::{Encode, Decode};
//!
//! let node = BinaryNode::integer(42u64);
//! let bytes = node.to_bytes();
//! let decoded = BinaryNode::from_bytes(&bytes).unwrap();
//! assert_eq!(node, decoded);
//! ```

use aftermarket_derive::Error;

/// Major type 0: unsigned integer.
pub const MAJOR_UNSIGNED: u8 = 0;
/// Major type 1: negative integer, encoded as `-1 - n`.
pub const MAJOR_NEGATIVE: u8 = 1;
/// Major type 2: byte string.
pub const MAJOR_BYTES: u8 = 2;
/// Major type 3: text string.
pub const MAJOR_TEXT: u8 = 3;
/// Major type 4: array.
pub const MAJOR_ARRAY: u8 = 4;
/// Major type 5: map.
pub const MAJOR_MAP: u8 = 5;
/// Major type 6: semantic tag.
pub const MAJOR_TAG: u8 = 6;
/// Major type 7: simple values, floats and the break code.
pub const MAJOR_SIMPLE: u8 = 7;

/// Additional info value that marks an indefinite-length item.
const INDEFINITE: u8 = 31;

/// Stop code closing an indefinite-length item.
pub const BREAK: u8 = 0xff;

/// Maximum size of one byte string chunk on the encoding side.
pub const BYTES_CHUNK_LEN: usize = 64;

/// Sink for writing encoded bytes.
///
/// Implemented by byte buffers and hashers to allow encoding directly into
/// the target without intermediate allocations.
pub trait EncodeSink {
    /// Writes the given bytes to the sink.
    fn write(&mut self, bytes: &[u8]);
}

/// Counter for computing encoded size without allocating memory.
///
/// Used by `Encode::to_bytes` to pre-allocate exact capacity before encoding.
pub struct SizeCounter {
    len: usize,
}

impl SizeCounter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self { len: 0 }
    }

    /// Returns the total number of bytes counted.
    pub fn len(&self) -> usize {
        self.len
    }
}

impl Default for SizeCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeSink for SizeCounter {
    fn write(&mut self, bytes: &[u8]) {
        self.len += bytes.len();
    }
}

impl EncodeSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Trait for types that can be serialized to CBOR.
pub trait Encode {
    /// Writes the binary representation to the given sink.
    fn encode<S: EncodeSink>(&self, out: &mut S);

    /// Returns the number of bytes `encode` writes.
    fn encoded_len(&self) -> usize {
        let mut counter = SizeCounter::new();
        self.encode(&mut counter);
        counter.len()
    }

    /// Serializes to a new byte buffer with exact capacity.
    ///
    /// Performs two passes: first to count bytes, then to encode.
    fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.encode(&mut out);
        out
    }
}

/// Errors that can occur during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before expected data was read.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Data does not represent a valid value for the target type.
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),

    /// Length argument exceeds what the input or the platform can hold.
    #[error("length {0} exceeds the remaining input")]
    LengthOverflow(u64),

    /// Major type outside the supported subset (text, maps, floats, simple values).
    #[error("unsupported major type {0}")]
    UnsupportedMajor(u8),

    /// Semantic tag the data format does not define.
    #[error("unsupported tag {0}")]
    UnsupportedTag(u64),

    /// Bytes remain after a complete value was read.
    #[error("{0} trailing bytes after the encoded value")]
    TrailingBytes(usize),

    /// Nesting is deeper than the decoder accepts.
    #[error("nesting exceeds {0} levels")]
    DepthExceeded(usize),
}

/// Trait for types that can be deserialized from CBOR.
pub trait Decode: Sized {
    /// Reads and decodes a value from the input buffer.
    ///
    /// Advances the input slice past the consumed bytes.
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError>;

    /// Decodes a value from a byte slice, requiring all bytes to be consumed.
    ///
    /// Returns `TrailingBytes` if input remains after decoding.
    fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut input = data;
        let value = Self::decode(&mut input)?;

        if !input.is_empty() {
            return Err(DecodeError::TrailingBytes(input.len()));
        }

        Ok(value)
    }
}

/// Decoded head of a CBOR data item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head {
    /// Item with a definite argument (value, length or tag number).
    Definite { major: u8, value: u64 },
    /// Start of an indefinite-length byte string, text string, array or map.
    Indefinite { major: u8 },
    /// The break stop code.
    Break,
}

/// Reads exactly `n` bytes from the input, advancing the slice.
pub fn read_bytes<'a>(input: &mut &'a [u8], n: usize) -> Result<&'a [u8], DecodeError> {
    if input.len() < n {
        return Err(DecodeError::UnexpectedEof);
    }
    let (bytes, rest) = input.split_at(n);
    *input = rest;
    Ok(bytes)
}

/// Returns the major type of the next item without consuming it.
pub fn peek_major(input: &[u8]) -> Result<u8, DecodeError> {
    input
        .first()
        .map(|b| b >> 5)
        .ok_or(DecodeError::UnexpectedEof)
}

/// Returns `true` if the next byte is the break code.
pub fn at_break(input: &[u8]) -> bool {
    input.first() == Some(&BREAK)
}

/// Reads one item head.
pub fn read_head(input: &mut &[u8]) -> Result<Head, DecodeError> {
    let initial = read_bytes(input, 1)?[0];
    let major = initial >> 5;
    let info = initial & 0x1f;

    let value = match info {
        0..=23 => u64::from(info),
        24 => u64::from(read_bytes(input, 1)?[0]),
        25 => {
            let b = read_bytes(input, 2)?;
            u64::from(u16::from_be_bytes([b[0], b[1]]))
        }
        26 => {
            let b = read_bytes(input, 4)?;
            u64::from(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        }
        27 => {
            let b = read_bytes(input, 8)?;
            u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
        }
        INDEFINITE => {
            return match major {
                MAJOR_BYTES | MAJOR_TEXT | MAJOR_ARRAY | MAJOR_MAP => Ok(Head::Indefinite { major }),
                MAJOR_SIMPLE => Ok(Head::Break),
                _ => Err(DecodeError::InvalidValue("indefinite length on a sized major type")),
            };
        }
        _ => return Err(DecodeError::InvalidValue("reserved additional info")),
    };

    Ok(Head::Definite { major, value })
}

/// Writes an item head using the shortest argument form.
pub fn write_head<S: EncodeSink>(out: &mut S, major: u8, value: u64) {
    let prefix = major << 5;
    if value < 24 {
        out.write(&[prefix | value as u8]);
    } else if let Ok(v) = u8::try_from(value) {
        out.write(&[prefix | 24, v]);
    } else if let Ok(v) = u16::try_from(value) {
        out.write(&[prefix | 25]);
        out.write(&v.to_be_bytes());
    } else if let Ok(v) = u32::try_from(value) {
        out.write(&[prefix | 26]);
        out.write(&v.to_be_bytes());
    } else {
        out.write(&[prefix | 27]);
        out.write(&value.to_be_bytes());
    }
}

/// Opens an indefinite-length item of the given major type.
pub fn write_indefinite<S: EncodeSink>(out: &mut S, major: u8) {
    out.write(&[(major << 5) | INDEFINITE]);
}

/// Closes an indefinite-length item.
pub fn write_break<S: EncodeSink>(out: &mut S) {
    out.write(&[BREAK]);
}

/// Writes a byte string, chunked when longer than [`BYTES_CHUNK_LEN`].
pub fn write_byte_string<S: EncodeSink>(out: &mut S, bytes: &[u8]) {
    if bytes.len() <= BYTES_CHUNK_LEN {
        write_head(out, MAJOR_BYTES, bytes.len() as u64);
        out.write(bytes);
        return;
    }

    write_indefinite(out, MAJOR_BYTES);
    for chunk in bytes.chunks(BYTES_CHUNK_LEN) {
        write_head(out, MAJOR_BYTES, chunk.len() as u64);
        out.write(chunk);
    }
    write_break(out);
}

/// Converts a definite length argument, rejecting lengths the input cannot satisfy.
pub fn checked_len(len: u64, input: &[u8]) -> Result<usize, DecodeError> {
    match usize::try_from(len) {
        Ok(n) if n <= input.len() => Ok(n),
        Ok(_) => Err(DecodeError::UnexpectedEof),
        Err(_) => Err(DecodeError::LengthOverflow(len)),
    }
}

/// Reads a byte string in definite or chunked form.
pub fn read_byte_string(input: &mut &[u8]) -> Result<Vec<u8>, DecodeError> {
    match read_head(input)? {
        Head::Definite {
            major: MAJOR_BYTES,
            value,
        } => {
            let n = checked_len(value, input)?;
            Ok(read_bytes(input, n)?.to_vec())
        }
        Head::Indefinite { major: MAJOR_BYTES } => {
            let mut bytes = Vec::new();
            loop {
                match read_head(input)? {
                    Head::Break => return Ok(bytes),
                    Head::Definite {
                        major: MAJOR_BYTES,
                        value,
                    } => {
                        let n = checked_len(value, input)?;
                        bytes.extend_from_slice(read_bytes(input, n)?);
                    }
                    _ => return Err(DecodeError::InvalidValue("byte string chunk must be a definite byte string")),
                }
            }
        }
        Head::Definite { major, .. } | Head::Indefinite { major } => {
            Err(DecodeError::InvalidValue(expected_bytes_message(major)))
        }
        Head::Break => Err(DecodeError::InvalidValue("unexpected break")),
    }
}

fn expected_bytes_message(major: u8) -> &'static str {
    match major {
        MAJOR_UNSIGNED | MAJOR_NEGATIVE => "expected byte string, found integer",
        MAJOR_TEXT => "expected byte string, found text",
        MAJOR_ARRAY => "expected byte string, found array",
        MAJOR_MAP => "expected byte string, found map",
        MAJOR_TAG => "expected byte string, found tag",
        _ => "expected byte string, found simple value",
    }
}
