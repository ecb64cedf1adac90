//! Ledger-level primitives: networks, bech32 addresses and wallet outputs.

pub mod address;
pub mod network;
pub mod utxo;

pub use address::{AddressError, ShelleyAddress, derive_seller_address, seller_address};
pub use network::Network;
pub use utxo::{Asset, AssetExtended, TxIn, TxOut, Unit, Utxo, Value};
