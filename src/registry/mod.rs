//! Script and currency registry.
//!
//! Read-only lookup of the protocol's script hashes, beacon currency symbol
//! and the reference outputs where the scripts are deployed, per network.
//! The built-in registry is constructed once on first use and shared by all
//! callers; [`RegistryBuilder`] assembles custom tables for other
//! deployments.

pub mod tables;

use crate::ledger::network::Network;
use crate::types::asset::AssetName;
use crate::types::hash::{HashBuilder, PolicyId, ScriptHash, TxHash};
use aftermarket_derive::Error;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Prefix byte hashed in front of a policy id to derive its beacon name.
pub const POLICY_BEACON_PREFIX: u8 = 0x00;

static BUILTIN: LazyLock<Registry> = LazyLock::new(tables::builtin);

/// Errors raised by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown script type {0:?}")]
    UnknownScriptType(String),

    #[error("unknown currency type {0:?}")]
    UnknownCurrencyType(String),

    #[error("no {network} reference for script {hash}")]
    UnresolvedReference { network: Network, hash: ScriptHash },
}

/// Scripts of the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ScriptType {
    Proxy,
    Aftermarket,
    AftermarketObserver,
    Beacon,
}

impl ScriptType {
    pub const ALL: [ScriptType; 4] = [
        ScriptType::Proxy,
        ScriptType::Aftermarket,
        ScriptType::AftermarketObserver,
        ScriptType::Beacon,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Proxy => "PROXY",
            Self::Aftermarket => "AFTERMARKET",
            Self::AftermarketObserver => "AFTERMARKET_OBSERVER",
            Self::Beacon => "BEACON",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScriptType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|script| script.name() == s)
            .ok_or_else(|| RegistryError::UnknownScriptType(s.to_string()))
    }
}

/// Currencies minted by the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CurrencyType {
    Beacon,
}

impl CurrencyType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Beacon => "BEACON",
        }
    }
}

impl fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurrencyType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BEACON" => Ok(Self::Beacon),
            _ => Err(RegistryError::UnknownCurrencyType(s.to_string())),
        }
    }
}

/// Beacon token names with a fixed label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeaconName {
    Spot,
    Auction,
    Bid,
}

impl BeaconName {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spot => "Spot",
            Self::Auction => "Auction",
            Self::Bid => "Bid",
        }
    }

    /// Token name: the UTF-8 bytes of the label.
    pub fn asset_name(&self) -> AssetName {
        match self {
            Self::Spot => AssetName::from_array(*b"Spot"),
            Self::Auction => AssetName::from_array(*b"Auction"),
            Self::Bid => AssetName::from_array(*b"Bid"),
        }
    }
}

/// Output holding a deployed script, used as a reference input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ScriptReference {
    pub tx_hash: TxHash,
    pub output_index: u32,
    pub size: u32,
}

/// Token name of the beacon tracking an NFT policy: `sha256(0x00 ‖ policy)`.
pub fn policy_beacon_name(policy: &PolicyId) -> AssetName {
    let mut hasher = HashBuilder::new();
    hasher.update(&[POLICY_BEACON_PREFIX]);
    hasher.update(policy.as_slice());
    AssetName::from_array(hasher.finalize())
}

/// Network-scoped script and currency tables.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    script_hashes: Vec<(ScriptType, ScriptHash)>,
    currency_symbols: Vec<(CurrencyType, PolicyId)>,
    references: Vec<(Network, ScriptType, ScriptReference)>,
}

impl Registry {
    /// The registry of the deployed protocol.
    pub fn builtin() -> &'static Registry {
        &BUILTIN
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn script_hash(&self, script: ScriptType) -> Result<ScriptHash, RegistryError> {
        self.script_hashes
            .iter()
            .find(|(s, _)| *s == script)
            .map(|(_, hash)| *hash)
            .ok_or_else(|| RegistryError::UnknownScriptType(script.name().to_string()))
    }

    /// Looks up a script hash by its registered name, e.g. `"AFTERMARKET"`.
    pub fn script_hash_by_name(&self, name: &str) -> Result<ScriptHash, RegistryError> {
        self.script_hash(name.parse()?)
    }

    pub fn currency_symbol(&self, currency: CurrencyType) -> Result<PolicyId, RegistryError> {
        self.currency_symbols
            .iter()
            .find(|(c, _)| *c == currency)
            .map(|(_, symbol)| *symbol)
            .ok_or_else(|| RegistryError::UnknownCurrencyType(currency.name().to_string()))
    }

    /// Looks up a currency symbol by its registered name, e.g. `"BEACON"`.
    pub fn currency_symbol_by_name(&self, name: &str) -> Result<PolicyId, RegistryError> {
        self.currency_symbol(name.parse()?)
    }

    /// Resolves the reference output of the script with the given hash.
    ///
    /// Entries are searched in declaration order. Scripts sharing a hash
    /// resolve to the first one declared; use [`Registry::reference_for`] to
    /// pick a specific script.
    pub fn script_reference(
        &self,
        network: Network,
        hash: &ScriptHash,
    ) -> Result<ScriptReference, RegistryError> {
        self.references
            .iter()
            .filter(|(n, _, _)| *n == network)
            .find(|(_, script, _)| self.script_hash(*script).ok().as_ref() == Some(hash))
            .map(|(_, _, reference)| *reference)
            .ok_or(RegistryError::UnresolvedReference {
                network,
                hash: *hash,
            })
    }

    /// Resolves the reference output of a specific script.
    pub fn reference_for(
        &self,
        network: Network,
        script: ScriptType,
    ) -> Result<ScriptReference, RegistryError> {
        let hash = self.script_hash(script)?;
        self.references
            .iter()
            .find(|(n, s, _)| *n == network && *s == script)
            .map(|(_, _, reference)| *reference)
            .ok_or(RegistryError::UnresolvedReference { network, hash })
    }

    /// All references deployed on a network, in declaration order.
    pub fn references(&self, network: Network) -> Vec<(ScriptType, ScriptReference)> {
        self.references
            .iter()
            .filter(|(n, _, _)| *n == network)
            .map(|(_, script, reference)| (*script, *reference))
            .collect()
    }
}

/// Assembles a [`Registry`].
///
/// Later entries for the same key replace earlier ones.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    pub fn script_hash(mut self, script: ScriptType, hash: ScriptHash) -> Self {
        self.registry.script_hashes.retain(|(s, _)| *s != script);
        self.registry.script_hashes.push((script, hash));
        self
    }

    pub fn currency_symbol(mut self, currency: CurrencyType, symbol: PolicyId) -> Self {
        self.registry.currency_symbols.retain(|(c, _)| *c != currency);
        self.registry.currency_symbols.push((currency, symbol));
        self
    }

    pub fn reference(mut self, network: Network, script: ScriptType, reference: ScriptReference) -> Self {
        self.registry
            .references
            .retain(|(n, s, _)| !(*n == network && *s == script));
        self.registry.references.push((network, script, reference));
        self
    }

    pub fn build(self) -> Registry {
        self.registry
    }
}
