//! Payment and staking credentials.

use crate::codec::{CodecError, FromData, ToData, constructor_parts, expect_bytes};
use crate::data::BinaryNode;
use crate::types::hash::{KeyHash, ScriptHash};
use serde::Serialize;

/// Who can spend from, or withdraw rewards of, an address part.
///
/// Encoded as `Constructor(0, [Bytes(hash)])` for a key and
/// `Constructor(1, [Bytes(hash)])` for a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "hash", rename_all = "lowercase")]
pub enum Credential {
    PubKey(KeyHash),
    Script(ScriptHash),
}

impl Credential {
    /// Raw 28-byte hash regardless of the credential kind.
    pub fn hash_bytes(&self) -> &[u8] {
        match self {
            Self::PubKey(hash) => hash.as_slice(),
            Self::Script(hash) => hash.as_slice(),
        }
    }

    pub fn is_script(&self) -> bool {
        matches!(self, Self::Script(_))
    }
}

impl ToData for Credential {
    fn to_data(&self) -> BinaryNode {
        match self {
            Self::PubKey(hash) => BinaryNode::constructor(0, vec![hash.to_data()]),
            Self::Script(hash) => BinaryNode::constructor(1, vec![hash.to_data()]),
        }
    }
}

impl FromData for Credential {
    fn from_data(node: &BinaryNode) -> Result<Self, CodecError> {
        let (index, fields) = constructor_parts(node, "Credential")?;
        if index > 1 {
            return Err(CodecError::InvalidCredential(format!(
                "constructor {} is neither a key (0) nor a script (1)",
                index
            )));
        }
        let [hash] = fields else {
            return Err(CodecError::InvalidCredential(format!(
                "expected one hash field, found {}",
                fields.len()
            )));
        };
        let hash = expect_bytes(hash, "Credential")?;

        let credential = if index == 0 {
            KeyHash::from_slice(hash).map(Self::PubKey)
        } else {
            ScriptHash::from_slice(hash).map(Self::Script)
        };
        credential.map_err(|e| CodecError::InvalidCredential(e.to_string()))
    }
}
