//! Unspent outputs, assets and multi-asset values as reported by wallets.

use crate::types::asset::AssetName;
use crate::types::hash::{HASH28_LEN, ParseHashError, PolicyId, TxHash};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unit name of the native currency.
pub const LOVELACE: &str = "lovelace";

/// Lovelace per ADA.
pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// Identifies an asset: the native currency or `policy ‖ name`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Unit {
    Lovelace,
    Native { policy_id: PolicyId, name: AssetName },
}

impl Unit {
    pub fn native(policy_id: PolicyId, name: AssetName) -> Self {
        Self::Native { policy_id, name }
    }

    pub fn is_lovelace(&self) -> bool {
        matches!(self, Self::Lovelace)
    }

    pub fn policy_id(&self) -> Option<&PolicyId> {
        match self {
            Self::Lovelace => None,
            Self::Native { policy_id, .. } => Some(policy_id),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lovelace => f.write_str(LOVELACE),
            Self::Native { policy_id, name } => write!(f, "{}{}", policy_id, name),
        }
    }
}

impl FromStr for Unit {
    type Err = ParseHashError;

    /// Parses `lovelace` or a hex policy id immediately followed by a hex name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == LOVELACE {
            return Ok(Self::Lovelace);
        }
        let split = HASH28_LEN * 2;
        if s.len() < split || !s.is_char_boundary(split) {
            return Err(ParseHashError::InvalidLength {
                expected: HASH28_LEN,
                found: s.len() / 2,
            });
        }
        let (policy, name) = s.split_at(split);
        Ok(Self::Native {
            policy_id: policy.parse()?,
            name: name.parse()?,
        })
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A quantity of one unit.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Asset {
    pub unit: Unit,
    pub quantity: u64,
}

impl Asset {
    pub fn new(unit: Unit, quantity: u64) -> Self {
        Self { unit, quantity }
    }

    pub fn lovelace(quantity: u64) -> Self {
        Self::new(Unit::Lovelace, quantity)
    }
}

/// A wallet-held native asset with its display fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssetExtended {
    pub policy_id: PolicyId,
    pub asset_name: AssetName,
    pub fingerprint: String,
    pub quantity: u64,
}

impl AssetExtended {
    pub fn unit(&self) -> Unit {
        Unit::native(self.policy_id, self.asset_name.clone())
    }
}

/// Multi-asset bundle, ordered by unit with lovelace first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Value(BTreeMap<Unit, u64>);

impl Value {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lovelace(amount: u64) -> Self {
        let mut value = Self::new();
        value.add(Unit::Lovelace, amount);
        value
    }

    /// Adds `quantity` of `unit`, saturating at `u64::MAX`. Zero is a no-op.
    pub fn add(&mut self, unit: Unit, quantity: u64) {
        if quantity == 0 {
            return;
        }
        let entry = self.0.entry(unit).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    pub fn with(mut self, unit: Unit, quantity: u64) -> Self {
        self.add(unit, quantity);
        self
    }

    pub fn add_value(&mut self, other: &Value) {
        for (unit, quantity) in &other.0 {
            self.add(unit.clone(), *quantity);
        }
    }

    pub fn quantity(&self, unit: &Unit) -> u64 {
        self.0.get(unit).copied().unwrap_or(0)
    }

    pub fn coin(&self) -> u64 {
        self.quantity(&Unit::Lovelace)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Unit, u64)> {
        self.0.iter().map(|(unit, quantity)| (unit, *quantity))
    }

    pub fn assets(&self) -> Vec<Asset> {
        self.iter()
            .map(|(unit, quantity)| Asset::new(unit.clone(), quantity))
            .collect()
    }
}

impl FromIterator<Asset> for Value {
    fn from_iter<I: IntoIterator<Item = Asset>>(iter: I) -> Self {
        let mut value = Self::new();
        for asset in iter {
            value.add(asset.unit, asset.quantity);
        }
        value
    }
}

/// Reference to a transaction output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TxIn {
    pub tx_hash: TxHash,
    pub output_index: u32,
}

impl fmt::Display for TxIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tx_hash, self.output_index)
    }
}

/// Output as reported by a wallet. The address stays in its bech32 form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TxOut {
    pub address: String,
    pub value: Value,
}

/// An unspent output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Utxo {
    pub input: TxIn,
    pub output: TxOut,
}

impl Utxo {
    pub fn coin(&self) -> u64 {
        self.output.value.coin()
    }
}

/// Total lovelace held by `utxos`, saturating.
pub fn total_lovelace(utxos: &[Utxo]) -> u64 {
    utxos
        .iter()
        .fold(0u64, |total, utxo| total.saturating_add(utxo.coin()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(byte: u8) -> PolicyId {
        PolicyId([byte; 28])
    }

    #[test]
    fn unit_text_form() {
        assert_eq!(Unit::Lovelace.to_string(), "lovelace");
        let unit = Unit::native(policy(0xab), "4d79".parse().unwrap());
        let text = unit.to_string();
        assert_eq!(text, format!("{}4d79", "ab".repeat(28)));
        assert_eq!(text.parse::<Unit>().unwrap(), unit);
        assert_eq!("lovelace".parse::<Unit>().unwrap(), Unit::Lovelace);
    }

    #[test]
    fn unit_with_empty_name() {
        let text = "ab".repeat(28);
        let unit: Unit = text.parse().unwrap();
        assert_eq!(unit, Unit::native(policy(0xab), AssetName::default()));
    }

    #[test]
    fn unit_rejects_short_or_uppercase() {
        assert!("abcd".parse::<Unit>().is_err());
        assert!("AB".repeat(28).parse::<Unit>().is_err());
    }

    #[test]
    fn value_orders_lovelace_first() {
        let value = Value::new()
            .with(Unit::native(policy(1), AssetName::from_array(*b"b")), 1)
            .with(Unit::Lovelace, 5)
            .with(Unit::native(policy(1), AssetName::from_array(*b"a")), 2);

        let units: Vec<String> = value.iter().map(|(unit, _)| unit.to_string()).collect();
        assert_eq!(units[0], "lovelace");
        assert!(units[1] < units[2]);
        assert_eq!(value.coin(), 5);
    }

    #[test]
    fn value_accumulates_and_ignores_zero() {
        let mut value = Value::from_lovelace(2);
        value.add(Unit::Lovelace, 3);
        value.add(Unit::native(policy(2), AssetName::default()), 0);
        assert_eq!(value.coin(), 5);
        assert_eq!(value.len(), 1);

        value.add(Unit::Lovelace, u64::MAX);
        assert_eq!(value.coin(), u64::MAX);
    }

    #[test]
    fn value_serializes_as_unit_map() {
        let value = Value::from_lovelace(7).with(Unit::native(policy(0), AssetName::default()), 1);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json["lovelace"], 7);
        assert_eq!(json["00".repeat(28).as_str()], 1);
    }

    #[test]
    fn total_lovelace_sums_outputs() {
        let utxo = |index, coin| Utxo {
            input: TxIn {
                tx_hash: TxHash([index as u8; 32]),
                output_index: index,
            },
            output: TxOut {
                address: "addr_test".to_string(),
                value: Value::from_lovelace(coin),
            },
        };
        assert_eq!(total_lovelace(&[utxo(0, 2_000_000), utxo(1, 1_500_000)]), 3_500_000);
        assert_eq!(total_lovelace(&[]), 0);
        assert_eq!(utxo(3, 0).input.to_string(), format!("{}#3", "03".repeat(32)));
    }
}
