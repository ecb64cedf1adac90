//! Network discriminant.

use serde::Serialize;
use std::fmt;

/// Network an address or deployment belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

impl Network {
    /// Maps a wallet network id: 0 is testnet, anything else mainnet.
    pub fn from_id(id: u8) -> Self {
        if id == 0 {
            Self::Testnet
        } else {
            Self::Mainnet
        }
    }

    /// Maps a network name: `"testnet"` in any case is testnet, anything else mainnet.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("testnet") {
            Self::Testnet
        } else {
            Self::Mainnet
        }
    }

    /// Network id carried in the low nibble of address headers.
    pub fn id(&self) -> u8 {
        match self {
            Self::Testnet => 0,
            Self::Mainnet => 1,
        }
    }

    /// Key of the network's reference table.
    pub fn table_key(&self) -> &'static str {
        match self {
            Self::Testnet => "TESTNET",
            Self::Mainnet => "MAINNET",
        }
    }

    /// Bech32 prefix of payment addresses.
    pub fn address_hrp(&self) -> &'static str {
        match self {
            Self::Testnet => "addr_test",
            Self::Mainnet => "addr",
        }
    }

    /// Bech32 prefix of reward addresses.
    pub fn stake_hrp(&self) -> &'static str {
        match self {
            Self::Testnet => "stake_test",
            Self::Mainnet => "stake",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Testnet => f.write_str("testnet"),
            Self::Mainnet => f.write_str("mainnet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id() {
        assert_eq!(Network::from_id(0), Network::Testnet);
        assert_eq!(Network::from_id(1), Network::Mainnet);
        assert_eq!(Network::from_id(7), Network::Mainnet);
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(Network::from_name("testnet"), Network::Testnet);
        assert_eq!(Network::from_name("Testnet"), Network::Testnet);
        assert_eq!(Network::from_name("TESTNET"), Network::Testnet);
        assert_eq!(Network::from_name("Mainnet"), Network::Mainnet);
        assert_eq!(Network::from_name("preprod"), Network::Mainnet);
    }

    #[test]
    fn prefixes_and_keys() {
        assert_eq!(Network::Testnet.id(), 0);
        assert_eq!(Network::Mainnet.id(), 1);
        assert_eq!(Network::Testnet.table_key(), "TESTNET");
        assert_eq!(Network::Mainnet.address_hrp(), "addr");
        assert_eq!(Network::Testnet.stake_hrp(), "stake_test");
    }
}
