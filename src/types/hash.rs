//! Fixed-size hash identifiers and SHA-256 hashing.
//!
//! Ledger identifiers are Blake2b digests computed elsewhere; this crate only
//! carries them around. Each identifier gets its own newtype so a script hash
//! can never be passed where a transaction hash is expected. At the boundary
//! they are lowercase hex, inside they are raw bytes.

use crate::types::encoding::EncodeSink;
use aftermarket_derive::Error;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// Length of key hashes, script hashes and policy ids.
pub const HASH28_LEN: usize = 28;

/// Length of transaction hashes and SHA-256 digests.
pub const HASH32_LEN: usize = 32;

/// Errors produced when parsing hex identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseHashError {
    #[error("hex must be lowercase [0-9a-f], found {0:?}")]
    NotLowercaseHex(char),

    #[error("hex string has odd length {0}")]
    OddLength(usize),

    #[error("expected {expected} bytes, found {found}")]
    InvalidLength { expected: usize, found: usize },

    #[error("asset name is {found} bytes, at most {max} allowed")]
    NameTooLong { max: usize, found: usize },
}

/// Decodes a lowercase hex string.
///
/// Uppercase digits are rejected so that every identifier has exactly one
/// textual form.
pub fn decode_lower_hex(s: &str) -> Result<Vec<u8>, ParseHashError> {
    if let Some(c) = s.chars().find(|c| !matches!(c, '0'..='9' | 'a'..='f')) {
        return Err(ParseHashError::NotLowercaseHex(c));
    }
    if s.len() % 2 != 0 {
        return Err(ParseHashError::OddLength(s.len()));
    }
    hex::decode(s).map_err(|_| ParseHashError::OddLength(s.len()))
}

macro_rules! fixed_hash {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Length in bytes.
            pub const LEN: usize = $len;

            /// Returns the raw bytes.
            pub fn as_slice(&self) -> &[u8] {
                &self.0
            }

            /// Copies an identifier out of a slice of exactly [`Self::LEN`] bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseHashError> {
                let array: [u8; $len] =
                    bytes
                        .try_into()
                        .map_err(|_| ParseHashError::InvalidLength {
                            expected: $len,
                            found: bytes.len(),
                        })?;
                Ok(Self(array))
            }

            /// Returns the lowercase hex form.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for byte in &self.0 {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = ParseHashError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_slice(&decode_lower_hex(s)?)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }
    };
}

fixed_hash!(
    /// Hash of a verification key (payment or staking credential).
    KeyHash,
    HASH28_LEN
);

fixed_hash!(
    /// Hash of a script (validator, minting policy or observer).
    ScriptHash,
    HASH28_LEN
);

fixed_hash!(
    /// Currency symbol of a native asset: the hash of its minting policy.
    PolicyId,
    HASH28_LEN
);

fixed_hash!(
    /// Transaction id.
    TxHash,
    HASH32_LEN
);

impl From<ScriptHash> for PolicyId {
    fn from(hash: ScriptHash) -> Self {
        PolicyId(hash.0)
    }
}

/// Incremental SHA-256 hash builder.
///
/// Implements [`EncodeSink`] so encodable values can be hashed directly
/// without intermediate byte buffers.
pub struct HashBuilder {
    hasher: Sha256,
}

impl HashBuilder {
    /// Creates a new hash builder with empty state.
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Feeds data into the hash computation.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    /// Consumes the builder and returns the digest.
    pub fn finalize(self) -> [u8; HASH32_LEN] {
        self.hasher.finalize().into()
    }
}

impl Default for HashBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EncodeSink for HashBuilder {
    fn write(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }
}
