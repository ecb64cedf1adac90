//! Shelley-era addresses and seller address derivation.
//!
//! # Binary Layout
//!
//! One header byte followed by the credential hashes:
//!
//! | type    | header bits 7..4 | payment | stake  | bytes |
//! |---------|------------------|---------|--------|-------|
//! | base    | `0b00sp`         | yes     | yes    | 57    |
//! | enterprise | `0b011p`      | yes     | no     | 29    |
//! | reward  | `0b111s`         | no      | yes    | 29    |
//!
//! `p` marks a script payment credential, `s` a script stake credential.
//! The low nibble is the network id. Pointer and Byron addresses are
//! rejected as unsupported.

use crate::codec::address::Address;
use crate::codec::credential::Credential;
use crate::ledger::network::Network;
use crate::types::hash::{HASH28_LEN, KeyHash, ScriptHash};
use aftermarket_derive::Error;
use bech32::{Bech32, Hrp};
use std::fmt;
use std::str::FromStr;

const TYPE_BASE_MAX: u8 = 0b0011;
const TYPE_POINTER_KEY: u8 = 0b0100;
const TYPE_POINTER_SCRIPT: u8 = 0b0101;
const TYPE_ENTERPRISE_KEY: u8 = 0b0110;
const TYPE_ENTERPRISE_SCRIPT: u8 = 0b0111;
const TYPE_BYRON: u8 = 0b1000;
const TYPE_REWARD_KEY: u8 = 0b1110;
const TYPE_REWARD_SCRIPT: u8 = 0b1111;

/// Errors raised while parsing or deriving addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid bech32: {0}")]
    Bech32(String),

    #[error("address payload is empty")]
    Empty,

    #[error("unsupported address type {0:#06b}")]
    UnsupportedType(u8),

    #[error("{kind} address must be {expected} bytes, found {found}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("prefix {found:?} does not match, expected {expected:?}")]
    PrefixMismatch { found: String, expected: &'static str },

    #[error("not a stake address: {0}")]
    NotAStakeAddress(String),
}

/// A parsed Shelley address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShelleyAddress {
    Base {
        network: Network,
        payment: Credential,
        stake: Credential,
    },
    Enterprise {
        network: Network,
        payment: Credential,
    },
    Reward {
        network: Network,
        stake: Credential,
    },
}

fn credential_from(script: bool, hash: &[u8]) -> Credential {
    let mut bytes = [0u8; HASH28_LEN];
    bytes.copy_from_slice(hash);
    if script {
        Credential::Script(ScriptHash(bytes))
    } else {
        Credential::PubKey(KeyHash(bytes))
    }
}

fn expect_len(kind: &'static str, expected: usize, bytes: &[u8]) -> Result<(), AddressError> {
    if bytes.len() != expected {
        return Err(AddressError::InvalidLength {
            kind,
            expected,
            found: bytes.len(),
        });
    }
    Ok(())
}

impl ShelleyAddress {
    pub fn network(&self) -> Network {
        match self {
            Self::Base { network, .. }
            | Self::Enterprise { network, .. }
            | Self::Reward { network, .. } => *network,
        }
    }

    pub fn payment_credential(&self) -> Option<Credential> {
        match self {
            Self::Base { payment, .. } | Self::Enterprise { payment, .. } => Some(*payment),
            Self::Reward { .. } => None,
        }
    }

    pub fn stake_credential(&self) -> Option<Credential> {
        match self {
            Self::Base { stake, .. } | Self::Reward { stake, .. } => Some(*stake),
            Self::Enterprise { .. } => None,
        }
    }

    pub fn is_reward(&self) -> bool {
        matches!(self, Self::Reward { .. })
    }

    /// Header byte: address type in the high nibble, network id in the low one.
    pub fn header(&self) -> u8 {
        let kind = match self {
            Self::Base { payment, stake, .. } => {
                (u8::from(stake.is_script()) << 1) | u8::from(payment.is_script())
            }
            Self::Enterprise { payment, .. } => {
                if payment.is_script() {
                    TYPE_ENTERPRISE_SCRIPT
                } else {
                    TYPE_ENTERPRISE_KEY
                }
            }
            Self::Reward { stake, .. } => {
                if stake.is_script() {
                    TYPE_REWARD_SCRIPT
                } else {
                    TYPE_REWARD_KEY
                }
            }
        };
        (kind << 4) | self.network().id()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.header()];
        if let Some(payment) = self.payment_credential() {
            out.extend_from_slice(payment.hash_bytes());
        }
        if let Some(stake) = self.stake_credential() {
            out.extend_from_slice(stake.hash_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressError> {
        let (&header, body) = bytes.split_first().ok_or(AddressError::Empty)?;
        let kind = header >> 4;
        let network = Network::from_id(header & 0x0f);

        match kind {
            0..=TYPE_BASE_MAX => {
                expect_len("base", 2 * HASH28_LEN, body)?;
                let (payment, stake) = body.split_at(HASH28_LEN);
                Ok(Self::Base {
                    network,
                    payment: credential_from(kind & 0b01 != 0, payment),
                    stake: credential_from(kind & 0b10 != 0, stake),
                })
            }
            TYPE_ENTERPRISE_KEY | TYPE_ENTERPRISE_SCRIPT => {
                expect_len("enterprise", HASH28_LEN, body)?;
                Ok(Self::Enterprise {
                    network,
                    payment: credential_from(kind == TYPE_ENTERPRISE_SCRIPT, body),
                })
            }
            TYPE_REWARD_KEY | TYPE_REWARD_SCRIPT => {
                expect_len("reward", HASH28_LEN, body)?;
                Ok(Self::Reward {
                    network,
                    stake: credential_from(kind == TYPE_REWARD_SCRIPT, body),
                })
            }
            TYPE_POINTER_KEY | TYPE_POINTER_SCRIPT | TYPE_BYRON => {
                Err(AddressError::UnsupportedType(kind))
            }
            other => Err(AddressError::UnsupportedType(other)),
        }
    }

    fn hrp(&self) -> &'static str {
        match self {
            Self::Reward { network, .. } => network.stake_hrp(),
            _ => self.network().address_hrp(),
        }
    }

    pub fn to_bech32(&self) -> Result<String, AddressError> {
        let hrp = Hrp::parse(self.hrp()).map_err(|e| AddressError::Bech32(e.to_string()))?;
        bech32::encode::<Bech32>(hrp, &self.to_bytes()).map_err(|e| AddressError::Bech32(e.to_string()))
    }

    /// Parses a bech32 address and checks its prefix against its header.
    pub fn from_bech32(s: &str) -> Result<Self, AddressError> {
        let (hrp, data) = bech32::decode(s).map_err(|e| AddressError::Bech32(e.to_string()))?;
        let address = Self::from_bytes(&data)?;

        let found = hrp.to_string().to_ascii_lowercase();
        if found != address.hrp() {
            return Err(AddressError::PrefixMismatch {
                found,
                expected: address.hrp(),
            });
        }
        Ok(address)
    }

    /// The address as it appears inside a datum. Reward addresses have no
    /// payment part and yield `None`.
    pub fn to_data_address(&self) -> Option<Address> {
        self.payment_credential()
            .map(|payment| Address::new(payment, self.stake_credential()))
    }
}

impl FromStr for ShelleyAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

impl fmt::Display for ShelleyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = self.to_bech32().map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}

/// Base address paying to `script_hash` and staking with `stake`.
pub fn seller_address(network: Network, script_hash: &ScriptHash, stake: Credential) -> ShelleyAddress {
    ShelleyAddress::Base {
        network,
        payment: Credential::Script(*script_hash),
        stake,
    }
}

/// Derives the per-seller contract address from a network name, the
/// aftermarket script hash and the seller's bech32 reward address.
pub fn derive_seller_address(
    network_name: &str,
    script_hash: &ScriptHash,
    reward_address: &str,
) -> Result<String, AddressError> {
    let network = Network::from_name(network_name);
    let stake = parse_reward_address(reward_address)?;
    seller_address(network, script_hash, stake).to_bech32()
}

/// Parses a bech32 reward address and returns its staking credential.
pub fn parse_reward_address(reward_address: &str) -> Result<Credential, AddressError> {
    match ShelleyAddress::from_bech32(reward_address)? {
        ShelleyAddress::Reward { stake, .. } => Ok(stake),
        _ => Err(AddressError::NotAStakeAddress(reward_address.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tables::AFTERMARKET_SCRIPT_HASH;

    const REWARD_TEST: &str = "stake_test1uqg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygxtxu2s";
    const REWARD_MAIN: &str = "stake1uyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygppv7wd";
    const SCRIPT_REWARD_TEST: &str =
        "stake_test17qg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg0r6uas";
    const SELLER_TEST: &str = "addr_test1zrs8a6yhjamxjt8rgaascr2nknr9pmmvett4cfvkmg3gglq3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygs94r3n6";
    const SELLER_MAIN: &str = "addr1z8s8a6yhjamxjt8rgaascr2nknr9pmmvett4cfvkmg3gglq3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygsxr73l9";
    const SELLER_TEST_SCRIPT_STAKE: &str = "addr_test1xrs8a6yhjamxjt8rgaascr2nknr9pmmvett4cfvkmg3gglq3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygsmtcwxm";
    const BASE_TEST: &str = "addr_test1qq3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygs3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygs6a5336";
    const ENTERPRISE_TEST: &str = "addr_test1vqg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygxrcya6";
    const ENTERPRISE_MAIN: &str = "addr1vy3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygs44r503";
    const POINTER_TEST: &str = "addr_test1gq3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygspqgpsu5zjst";

    fn key(byte: u8) -> Credential {
        Credential::PubKey(KeyHash([byte; 28]))
    }

    #[test]
    fn parses_reward_addresses() {
        let address: ShelleyAddress = REWARD_TEST.parse().unwrap();
        assert_eq!(
            address,
            ShelleyAddress::Reward {
                network: Network::Testnet,
                stake: key(0x11),
            }
        );
        assert_eq!(address.header(), 0xe0);
        assert_eq!(address.to_bech32().unwrap(), REWARD_TEST);

        let main: ShelleyAddress = REWARD_MAIN.parse().unwrap();
        assert_eq!(main.network(), Network::Mainnet);
        assert_eq!(main.header(), 0xe1);

        let script: ShelleyAddress = SCRIPT_REWARD_TEST.parse().unwrap();
        assert_eq!(
            script.stake_credential(),
            Some(Credential::Script(ScriptHash([0x11; 28])))
        );
        assert_eq!(script.to_string(), SCRIPT_REWARD_TEST);
    }

    #[test]
    fn parses_base_and_enterprise_addresses() {
        let base: ShelleyAddress = BASE_TEST.parse().unwrap();
        assert_eq!(base.payment_credential(), Some(key(0x22)));
        assert_eq!(base.stake_credential(), Some(key(0x11)));
        assert_eq!(base.header(), 0x00);
        assert_eq!(
            base.to_data_address(),
            Some(Address::new(key(0x22), Some(key(0x11))))
        );

        let enterprise: ShelleyAddress = ENTERPRISE_TEST.parse().unwrap();
        assert_eq!(enterprise.header(), 0x60);
        assert_eq!(enterprise.stake_credential(), None);
        assert_eq!(enterprise.to_data_address(), Some(Address::new(key(0x11), None)));

        let main: ShelleyAddress = ENTERPRISE_MAIN.parse().unwrap();
        assert_eq!(main.network(), Network::Mainnet);
        assert_eq!(main.to_bech32().unwrap(), ENTERPRISE_MAIN);
    }

    #[test]
    fn reward_address_has_no_data_address() {
        let reward: ShelleyAddress = REWARD_TEST.parse().unwrap();
        assert_eq!(reward.to_data_address(), None);
    }

    #[test]
    fn rejects_pointer_addresses() {
        assert_eq!(
            POINTER_TEST.parse::<ShelleyAddress>(),
            Err(AddressError::UnsupportedType(TYPE_POINTER_KEY))
        );
    }

    #[test]
    fn rejects_bad_checksum_and_length() {
        let mut corrupted = REWARD_TEST.to_string();
        corrupted.pop();
        corrupted.push('q');
        assert!(matches!(
            corrupted.parse::<ShelleyAddress>(),
            Err(AddressError::Bech32(_))
        ));

        assert!(matches!(
            ShelleyAddress::from_bytes(&[0xe0, 0x01, 0x02]),
            Err(AddressError::InvalidLength { kind: "reward", .. })
        ));
        assert_eq!(ShelleyAddress::from_bytes(&[]), Err(AddressError::Empty));
    }

    #[test]
    fn rejects_prefix_that_disagrees_with_header() {
        let reward: ShelleyAddress = REWARD_TEST.parse().unwrap();
        let hrp = Hrp::parse("addr_test").unwrap();
        let mislabeled = bech32::encode::<Bech32>(hrp, &reward.to_bytes()).unwrap();
        assert!(matches!(
            mislabeled.parse::<ShelleyAddress>(),
            Err(AddressError::PrefixMismatch { expected: "stake_test", .. })
        ));
    }

    // ========== Seller Address Tests ==========

    #[test]
    fn derives_testnet_seller_address() {
        let derived =
            derive_seller_address("testnet", &AFTERMARKET_SCRIPT_HASH, REWARD_TEST).unwrap();
        assert_eq!(derived, SELLER_TEST);

        let parsed: ShelleyAddress = derived.parse().unwrap();
        assert_eq!(parsed.header(), 0x10);
        assert_eq!(
            parsed.payment_credential(),
            Some(Credential::Script(AFTERMARKET_SCRIPT_HASH))
        );
        assert_eq!(parsed.stake_credential(), Some(key(0x11)));
    }

    #[test]
    fn network_name_selects_prefix() {
        assert_eq!(
            derive_seller_address("Testnet", &AFTERMARKET_SCRIPT_HASH, REWARD_TEST).unwrap(),
            SELLER_TEST
        );
        assert_eq!(
            derive_seller_address("Mainnet", &AFTERMARKET_SCRIPT_HASH, REWARD_MAIN).unwrap(),
            SELLER_MAIN
        );
        assert_eq!(
            derive_seller_address("anything", &AFTERMARKET_SCRIPT_HASH, REWARD_TEST).unwrap(),
            SELLER_MAIN
        );
    }

    #[test]
    fn script_stake_uses_script_stake_header() {
        let derived =
            derive_seller_address("testnet", &AFTERMARKET_SCRIPT_HASH, SCRIPT_REWARD_TEST)
                .unwrap();
        assert_eq!(derived, SELLER_TEST_SCRIPT_STAKE);
    }

    #[test]
    fn derivation_is_stable() {
        let first = derive_seller_address("testnet", &AFTERMARKET_SCRIPT_HASH, REWARD_TEST).unwrap();
        let second = derive_seller_address("testnet", &AFTERMARKET_SCRIPT_HASH, REWARD_TEST).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn non_reward_input_is_not_a_stake_address() {
        assert_eq!(
            derive_seller_address("testnet", &AFTERMARKET_SCRIPT_HASH, BASE_TEST),
            Err(AddressError::NotAStakeAddress(BASE_TEST.to_string()))
        );
    }
}
