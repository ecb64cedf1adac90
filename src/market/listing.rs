//! Listing and unlisting an NFT by fingerprint.

use crate::codec::{CurrencySymbol, PriceEntry, Prices};
use crate::ledger::address::{AddressError, ShelleyAddress};
use crate::ledger::utxo::LOVELACE_PER_ADA;
use crate::market::{IndexError, MarketIndex};
use crate::tx::{
    Assembler, AssemblerError, ChainProvider, ExternalError, SpotSaleReceipt, SpotSaleRequest,
    Wallet,
};
use crate::types::asset::AssetName;
use crate::types::hash::TxHash;
use crate::{info, warn};
use aftermarket_derive::Error;
use std::num::NonZeroU64;

/// Lovelace locked with every listing.
pub const LISTING_DEPOSIT: u64 = 5 * LOVELACE_PER_ADA;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("no wallet asset has fingerprint {0}")]
    AssetNotFound(String),

    #[error("price of {0} ADA is not a positive lovelace amount")]
    InvalidPrice(u64),

    #[error("wallet has no change address")]
    MissingChangeAddress,

    #[error("wallet exposes no reward address")]
    NoRewardAddress,

    #[error("change address {0} cannot receive payments")]
    NotAPaymentAddress(String),

    #[error("{0}")]
    Address(#[from] AddressError),

    #[error("wallet {call} failed: {source}")]
    Wallet {
        call: &'static str,
        #[source]
        source: ExternalError,
    },

    #[error("{0}")]
    Assembler(#[from] AssemblerError),

    #[error("{0}")]
    Index(#[from] IndexError),
}

/// A submitted listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingReceipt {
    pub sale: SpotSaleReceipt,
    /// Whether the index accepted the listing after submission.
    pub indexed: bool,
}

fn wallet_call(call: &'static str) -> impl Fn(ExternalError) -> ListingError {
    move |source| ListingError::Wallet { call, source }
}

/// Price list asking `price_ada` ADA.
pub fn ada_price(price_ada: u64) -> Result<Prices, ListingError> {
    let lovelace = price_ada
        .checked_mul(LOVELACE_PER_ADA)
        .and_then(NonZeroU64::new)
        .ok_or(ListingError::InvalidPrice(price_ada))?;
    Ok(Prices::new(vec![PriceEntry::new(
        CurrencySymbol::Ada,
        AssetName::from_array(*b"lovelace"),
        lovelace,
    )]))
}

/// Lists the wallet asset with `fingerprint` for `price_ada` ADA.
///
/// The sale pays out to the wallet's change address and locks
/// [`LISTING_DEPOSIT`]. Once submitted, the listing is announced to `index`;
/// an announcement failure is logged and reported as `indexed: false`.
pub async fn list_asset<W, P, I>(
    assembler: &Assembler<'_, W, P>,
    index: &I,
    fingerprint: &str,
    price_ada: u64,
) -> Result<ListingReceipt, ListingError>
where
    W: Wallet,
    P: ChainProvider,
    I: MarketIndex + ?Sized,
{
    let wallet = assembler.wallet();
    let asset = wallet
        .assets()
        .await
        .map_err(wallet_call("assets"))?
        .into_iter()
        .find(|asset| asset.fingerprint == fingerprint)
        .ok_or_else(|| ListingError::AssetNotFound(fingerprint.to_string()))?;
    let price = ada_price(price_ada)?;

    let change_address = wallet
        .change_address()
        .await
        .map_err(wallet_call("change_address"))?
        .filter(|a| !a.is_empty())
        .ok_or(ListingError::MissingChangeAddress)?;
    let payment_address = change_address
        .parse::<ShelleyAddress>()?
        .to_data_address()
        .ok_or_else(|| ListingError::NotAPaymentAddress(change_address.clone()))?;

    let request = SpotSaleRequest {
        nfts: vec![(asset.policy_id, asset.asset_name)],
        payment_address,
        deposit: LISTING_DEPOSIT,
        price,
        change_address: Some(change_address),
    };
    let sale = assembler.build_spot_sale(request).await?;

    let indexed = match announce(wallet, index, fingerprint, &sale.tx_hash, price_ada).await {
        Ok(()) => true,
        Err(e) => {
            warn!("listing {} submitted but not indexed: {}", sale.tx_hash, e);
            false
        }
    };
    info!("listed {} for {} ADA in {}", fingerprint, price_ada, sale.tx_hash);

    Ok(ListingReceipt { sale, indexed })
}

async fn announce<W, I>(
    wallet: &W,
    index: &I,
    fingerprint: &str,
    tx_hash: &TxHash,
    price_ada: u64,
) -> Result<(), ListingError>
where
    W: Wallet,
    I: MarketIndex + ?Sized,
{
    let wallet_address = wallet
        .reward_addresses()
        .await
        .map_err(wallet_call("reward_addresses"))?
        .into_iter()
        .next()
        .ok_or(ListingError::NoRewardAddress)?;
    index
        .list_to_sell(&wallet_address, fingerprint, tx_hash, price_ada)
        .await?;
    Ok(())
}

/// Removes the listing of `fingerprint` from the index and returns the
/// transaction that created it.
pub async fn unlist_asset<I>(index: &I, fingerprint: &str) -> Result<TxHash, ListingError>
where
    I: MarketIndex + ?Sized,
{
    let tx_hash = index.tx_from_market(fingerprint).await?;
    index.del_from_market(fingerprint).await?;
    info!("unlisted {} (listed in {})", fingerprint, tx_hash);
    Ok(tx_hash)
}
