//! Native asset names.

use crate::types::hash::{ParseHashError, decode_lower_hex};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Maximum length of an asset name in bytes.
pub const ASSET_NAME_MAX_LEN: usize = 32;

/// Token name of a native asset: up to 32 raw bytes.
///
/// Names are opaque bytes. Hex is only their textual form; a name built from
/// a UTF-8 label (such as `Spot`) holds the label's bytes.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetName(Vec<u8>);

impl AssetName {
    /// Wraps raw bytes, rejecting names longer than [`ASSET_NAME_MAX_LEN`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, ParseHashError> {
        let bytes = bytes.into();
        if bytes.len() > ASSET_NAME_MAX_LEN {
            return Err(ParseHashError::NameTooLong {
                max: ASSET_NAME_MAX_LEN,
                found: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Builds a name from a fixed-size array; the length is checked at compile time.
    pub fn from_array<const N: usize>(bytes: [u8; N]) -> Self {
        const { assert!(N <= ASSET_NAME_MAX_LEN, "asset names are at most 32 bytes") };
        Self(bytes.to_vec())
    }

    /// Builds a name from the UTF-8 bytes of a label.
    pub fn from_label(label: &str) -> Result<Self, ParseHashError> {
        Self::new(label.as_bytes())
    }

    /// Parses a lowercase hex name.
    pub fn from_hex(s: &str) -> Result<Self, ParseHashError> {
        Self::new(decode_lower_hex(s)?)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetName({})", self.to_hex())
    }
}

impl FromStr for AssetName {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for AssetName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
