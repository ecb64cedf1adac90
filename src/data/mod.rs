//! Ledger data model.
//!
//! [`BinaryNode`] is the untyped value the ledger stores in datums and
//! redeemers: byte strings, integers, lists and constructor applications.
//! This module owns its canonical CBOR encoding and a lenient decoder.
//!
//! # Canonical Encoding
//!
//! - Constructor `i`: tag `121 + i` for `0..=6`, tag `1280 + (i - 7)` for
//!   `7..=127`, otherwise tag `102` around the pair `[i, fields]`
//! - Lists and constructor fields: `0x80` when empty, otherwise an
//!   indefinite-length array
//! - Byte strings: definite up to 64 bytes, otherwise 64-byte chunks
//! - Integers: see [`Integer`]
//!
//! Decoding also accepts definite-length arrays and unchunked long byte
//! strings, so foreign encodings of the same value are read back. Only bytes
//! produced by [`encode`] are guaranteed to re-encode bit-for-bit.

pub mod integer;
pub mod json;

pub use integer::Integer;

use crate::types::encoding::{
    Decode, DecodeError, Encode, EncodeSink, Head, MAJOR_ARRAY, MAJOR_BYTES, MAJOR_NEGATIVE,
    MAJOR_TAG, MAJOR_UNSIGNED, at_break, checked_len, peek_major, read_byte_string, read_bytes,
    read_head, write_break, write_byte_string, write_head, write_indefinite,
};
use aftermarket_derive::Error;

/// Maximum nesting depth accepted by the decoder.
pub const MAX_DEPTH: usize = 256;

/// First tag of the compact constructor range `0..=6`.
const TAG_CONSTR_COMPACT: u64 = 121;
/// First tag of the extended constructor range `7..=127`.
const TAG_CONSTR_EXTENDED: u64 = 1280;
/// Tag of the general constructor form `[index, fields]`.
const TAG_CONSTR_GENERAL: u64 = 102;

/// Errors raised by the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("malformed encoding: {0}")]
    MalformedEncoding(#[from] DecodeError),

    #[error("invalid node: {0}")]
    InvalidNode(String),

    #[error("invalid integer literal {0:?}")]
    InvalidInteger(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Untyped ledger data value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryNode {
    Bytes(Vec<u8>),
    Integer(Integer),
    List(Vec<BinaryNode>),
    Constructor { index: u64, fields: Vec<BinaryNode> },
}

impl BinaryNode {
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    pub fn integer(value: impl Into<Integer>) -> Self {
        Self::Integer(value.into())
    }

    pub fn list(items: Vec<BinaryNode>) -> Self {
        Self::List(items)
    }

    pub fn constructor(index: u64, fields: Vec<BinaryNode>) -> Self {
        Self::Constructor { index, fields }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Self::Integer(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[BinaryNode]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_constructor(&self) -> Option<(u64, &[BinaryNode])> {
        match self {
            Self::Constructor { index, fields } => Some((*index, fields)),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::Integer(_) => "int",
            Self::List(_) => "list",
            Self::Constructor { .. } => "constructor",
        }
    }

    /// Parses a hex string and decodes it.
    pub fn from_hex(s: &str) -> Result<Self, DataError> {
        let bytes = hex::decode(s.trim()).map_err(|e| DataError::InvalidHex(e.to_string()))?;
        decode(&bytes)
    }

    /// Encodes to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

/// Encodes a node to canonical CBOR.
pub fn encode(node: &BinaryNode) -> Vec<u8> {
    node.to_bytes()
}

/// Decodes one node that spans the whole input.
pub fn decode(bytes: &[u8]) -> Result<BinaryNode, DataError> {
    Ok(BinaryNode::from_bytes(bytes)?)
}

fn write_list<S: EncodeSink>(out: &mut S, items: &[BinaryNode]) {
    if items.is_empty() {
        write_head(out, MAJOR_ARRAY, 0);
        return;
    }
    write_indefinite(out, MAJOR_ARRAY);
    for item in items {
        item.encode(out);
    }
    write_break(out);
}

impl Encode for BinaryNode {
    fn encode<S: EncodeSink>(&self, out: &mut S) {
        match self {
            Self::Bytes(bytes) => write_byte_string(out, bytes),
            Self::Integer(value) => value.encode(out),
            Self::List(items) => write_list(out, items),
            Self::Constructor { index, fields } => {
                match *index {
                    0..=6 => write_head(out, MAJOR_TAG, TAG_CONSTR_COMPACT + index),
                    7..=127 => write_head(out, MAJOR_TAG, TAG_CONSTR_EXTENDED + (index - 7)),
                    _ => {
                        write_head(out, MAJOR_TAG, TAG_CONSTR_GENERAL);
                        write_head(out, MAJOR_ARRAY, 2);
                        write_head(out, MAJOR_UNSIGNED, *index);
                    }
                }
                write_list(out, fields);
            }
        }
    }
}

impl Decode for BinaryNode {
    fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
        decode_node(input, 0)
    }
}

fn decode_node(input: &mut &[u8], depth: usize) -> Result<BinaryNode, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::DepthExceeded(MAX_DEPTH));
    }

    match peek_major(input)? {
        MAJOR_UNSIGNED | MAJOR_NEGATIVE => return Ok(BinaryNode::Integer(Integer::decode(input)?)),
        MAJOR_BYTES => return Ok(BinaryNode::Bytes(read_byte_string(input)?)),
        MAJOR_ARRAY => return Ok(BinaryNode::List(decode_list(input, depth)?)),
        MAJOR_TAG => {}
        other => return Err(DecodeError::UnsupportedMajor(other)),
    }

    // Bignums share the tag major type with constructors; let the integer
    // decoder consume the head itself.
    let mut lookahead = *input;
    let tag = match read_head(&mut lookahead)? {
        Head::Definite { value, .. } => value,
        _ => return Err(DecodeError::InvalidValue("malformed tag")),
    };
    if tag == integer::TAG_POSITIVE_BIGNUM || tag == integer::TAG_NEGATIVE_BIGNUM {
        return Ok(BinaryNode::Integer(Integer::decode(input)?));
    }
    *input = lookahead;

    let index = match tag {
        121..=127 => tag - TAG_CONSTR_COMPACT,
        1280..=1400 => tag - TAG_CONSTR_EXTENDED + 7,
        TAG_CONSTR_GENERAL => return decode_general_constructor(input, depth),
        other => return Err(DecodeError::UnsupportedTag(other)),
    };
    let fields = decode_list(input, depth)?;
    Ok(BinaryNode::Constructor { index, fields })
}

/// Decodes the `[index, fields]` body of a tag 102 constructor.
fn decode_general_constructor(input: &mut &[u8], depth: usize) -> Result<BinaryNode, DecodeError> {
    let items = decode_list(input, depth)?;
    let [index, fields] = <[BinaryNode; 2]>::try_from(items)
        .map_err(|_| DecodeError::InvalidValue("general constructor must be a pair"))?;

    let index = match index {
        BinaryNode::Integer(value) => value
            .to_u64()
            .ok_or(DecodeError::InvalidValue("constructor index out of range"))?,
        _ => return Err(DecodeError::InvalidValue("constructor index must be an integer")),
    };
    let fields = match fields {
        BinaryNode::List(fields) => fields,
        _ => return Err(DecodeError::InvalidValue("constructor fields must be a list")),
    };
    Ok(BinaryNode::Constructor { index, fields })
}

/// Decodes a definite or indefinite array of nodes.
fn decode_list(input: &mut &[u8], depth: usize) -> Result<Vec<BinaryNode>, DecodeError> {
    match read_head(input)? {
        Head::Definite {
            major: MAJOR_ARRAY,
            value,
        } => {
            // every item takes at least one byte
            let len = checked_len(value, input)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(decode_node(input, depth + 1)?);
            }
            Ok(items)
        }
        Head::Indefinite { major: MAJOR_ARRAY } => {
            let mut items = Vec::new();
            while !at_break(input) {
                if input.is_empty() {
                    return Err(DecodeError::UnexpectedEof);
                }
                items.push(decode_node(input, depth + 1)?);
            }
            read_bytes(input, 1)?;
            Ok(items)
        }
        _ => Err(DecodeError::InvalidValue("expected array")),
    }
}
