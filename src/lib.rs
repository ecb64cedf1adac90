//! Spot-sale aftermarket library.
//!
//! Encodes marketplace datums and redeemers as ledger data, resolves the
//! deployed protocol scripts, derives seller addresses and assembles the
//! transaction that lists NFTs for sale.

pub mod codec;
pub mod data;
pub mod ledger;
pub mod market;
pub mod registry;
pub mod tx;
pub mod types;
pub mod utils;
