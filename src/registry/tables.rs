//! Compiled-in script hashes, currency symbols and deployed references.

use crate::ledger::network::Network;
use crate::registry::{CurrencyType, Registry, ScriptReference, ScriptType};
use crate::types::hash::{PolicyId, ScriptHash, TxHash};

/// Decodes a lowercase hex literal at compile time.
const fn decode_hex<const N: usize>(s: &str) -> [u8; N] {
    let bytes = s.as_bytes();
    assert!(bytes.len() == N * 2, "hex constant has the wrong length");

    let mut out = [0u8; N];
    let mut i = 0;
    while i < N {
        out[i] = (nibble(bytes[2 * i]) << 4) | nibble(bytes[2 * i + 1]);
        i += 1;
    }
    out
}

const fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => panic!("hex constant contains a non-lowercase-hex digit"),
    }
}

/// Proxy spending script. Shares its hash with the beacon policy.
pub const PROXY_SCRIPT_HASH: ScriptHash =
    ScriptHash(decode_hex("bdceb595b8754726b3efe3ab0f81c76cbda1a0a0d3653bb8fad89bb2"));

/// Aftermarket spending script that locks sale outputs.
pub const AFTERMARKET_SCRIPT_HASH: ScriptHash =
    ScriptHash(decode_hex("e07ee8979776692ce3477b0c0d53b4c650ef6ccad75c2596da22847c"));

/// Staking script observing aftermarket spends.
pub const AFTERMARKET_OBSERVER_SCRIPT_HASH: ScriptHash =
    ScriptHash(decode_hex("3e5528d9a7610aa5459a7deed9d3c1c2ee8b0310fae6642df4c37213"));

/// Beacon minting policy.
pub const BEACON_SCRIPT_HASH: ScriptHash =
    ScriptHash(decode_hex("bdceb595b8754726b3efe3ab0f81c76cbda1a0a0d3653bb8fad89bb2"));

/// Currency symbol of the beacon tokens.
pub const BEACON_CURRENCY_SYMBOL: PolicyId =
    PolicyId(decode_hex("bdceb595b8754726b3efe3ab0f81c76cbda1a0a0d3653bb8fad89bb2"));

const TESTNET_PROXY_BEACON_TX: TxHash =
    TxHash(decode_hex("6c402050892c8cb0e3e54f803d7ae292d6f5f90745b7f76722f7c303c7085d50"));

const TESTNET_AFTERMARKET_TX: TxHash =
    TxHash(decode_hex("e95a73a1e03afdf74b86d10e504b64285f7afdfab7f7021a41054ae4b377ca9f"));

const TESTNET_OBSERVER_TX: TxHash =
    TxHash(decode_hex("b6b5bd23fa762b2630dc9dedc10d0bac61d6ffa3617f451df8a8ee31a83c441f"));

/// Reference outputs holding the deployed scripts on testnet.
///
/// Mainnet has no deployment.
pub const TESTNET_REFERENCES: [(ScriptType, ScriptReference); 4] = [
    (
        ScriptType::Proxy,
        ScriptReference {
            tx_hash: TESTNET_PROXY_BEACON_TX,
            output_index: 0,
            size: 8131,
        },
    ),
    (
        ScriptType::Beacon,
        ScriptReference {
            tx_hash: TESTNET_PROXY_BEACON_TX,
            output_index: 0,
            size: 8166,
        },
    ),
    (
        ScriptType::Aftermarket,
        ScriptReference {
            tx_hash: TESTNET_AFTERMARKET_TX,
            output_index: 0,
            size: 4306,
        },
    ),
    (
        ScriptType::AftermarketObserver,
        ScriptReference {
            tx_hash: TESTNET_OBSERVER_TX,
            output_index: 0,
            size: 9892,
        },
    ),
];

/// Builds the registry of the deployed protocol.
pub(crate) fn builtin() -> Registry {
    let mut builder = Registry::builder()
        .script_hash(ScriptType::Proxy, PROXY_SCRIPT_HASH)
        .script_hash(ScriptType::Aftermarket, AFTERMARKET_SCRIPT_HASH)
        .script_hash(ScriptType::AftermarketObserver, AFTERMARKET_OBSERVER_SCRIPT_HASH)
        .script_hash(ScriptType::Beacon, BEACON_SCRIPT_HASH)
        .currency_symbol(CurrencyType::Beacon, BEACON_CURRENCY_SYMBOL);

    for (script, reference) in TESTNET_REFERENCES {
        builder = builder.reference(Network::Testnet, script, reference);
    }

    builder.build()
}
