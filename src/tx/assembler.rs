//! Spot sale transaction assembly.
//!
//! [`Assembler::build_spot_sale`] walks the [`Stage`]s in order, folding a
//! [`TxPlan`] and awaiting one collaborator call at a time:
//!
//! 1. `DatumReady`: the sale datum is built from the request alone.
//! 2. `OutputsSet`: the seller address is derived from the wallet's reward
//!    address and the sale output is planned with the datum inline.
//! 3. `MintingConfigured`: the policy beacon and the `Spot` beacon are minted
//!    through the deployed beacon script.
//! 4. `ChangeSet`, `CollateralAttached`, `UtxosSelected`: wallet inputs.
//! 5. `FeeComputed`: the provider estimate plus a fixed buffer.
//! 6. `Completed`, `Signed`, `Submitted`: provider serializes, wallet signs
//!    and submits.
//!
//! The first failure aborts the build and is reported with the stage that
//! was being entered. Nothing is submitted unless every earlier stage
//! succeeded.

use crate::codec::{Address, NftNames, Prices, SpotDatum, ToData};
use crate::ledger::address::{AddressError, parse_reward_address, seller_address};
use crate::ledger::network::Network;
use crate::ledger::utxo::{Unit, Value, total_lovelace};
use crate::registry::{
    BeaconName, CurrencyType, Registry, RegistryError, ScriptType, policy_beacon_name,
};
use crate::tx::config::AssemblerConfig;
use crate::tx::plan::{MintAction, PlannedOutput, TxPlan};
use crate::tx::stage::Stage;
use crate::tx::wallet::{ChainProvider, ExternalError, Wallet};
use crate::types::asset::AssetName;
use crate::types::hash::{PolicyId, TxHash};
use crate::{debug, error, info, warn};
use aftermarket_derive::Error;

/// Why a build stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("no NFTs to list")]
    EmptyAssetSet,

    #[error("NFTs belong to different policies: {0} and {1}")]
    MixedPolicies(PolicyId, PolicyId),

    #[error("wallet exposes no reward address")]
    NoRewardAddress,

    #[error("no change address available")]
    MissingChangeAddress,

    #[error("wallet has no collateral set")]
    NoCollateralAvailable,

    #[error("submitted transaction hash is not valid hex: {0:?}")]
    InvalidTxHash(String),

    #[error("{0}")]
    Registry(#[from] RegistryError),

    #[error("{0}")]
    Address(#[from] AddressError),

    #[error("{call} failed: {source}")]
    External {
        call: &'static str,
        #[source]
        source: ExternalError,
    },
}

/// A failed build: the stage being entered and the reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("spot sale failed at {stage}: {kind}")]
pub struct AssemblerError {
    pub stage: Stage,
    #[source]
    pub kind: FailureKind,
}

/// Terms of a spot sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotSaleRequest {
    /// NFTs to lock, all under one policy.
    pub nfts: Vec<(PolicyId, AssetName)>,
    /// Where the buyer's payment goes.
    pub payment_address: Address,
    /// Lovelace locked with the NFTs and returned on close.
    pub deposit: u64,
    pub price: Prices,
    /// Overrides the wallet's change address.
    pub change_address: Option<String>,
}

/// Result of a submitted spot sale.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SpotSaleReceipt {
    pub tx_hash: TxHash,
    pub seller_address: String,
    pub fee: u64,
    pub datum: SpotDatum,
}

/// Builds the sale datum for `nfts`.
///
/// Fails with `EmptyAssetSet` when `nfts` is empty and `MixedPolicies` when
/// the NFTs do not share one policy.
pub fn spot_datum(
    registry: &Registry,
    nfts: &[(PolicyId, AssetName)],
    payment_address: Address,
    deposit: u64,
    price: Prices,
) -> Result<SpotDatum, FailureKind> {
    let (nft_policy_id, _) = nfts.first().ok_or(FailureKind::EmptyAssetSet)?;
    if let Some((other, _)) = nfts.iter().find(|(policy, _)| policy != nft_policy_id) {
        return Err(FailureKind::MixedPolicies(*nft_policy_id, *other));
    }
    let nft_names = NftNames::new(nfts.iter().map(|(_, name)| name.clone()).collect())
        .ok_or(FailureKind::EmptyAssetSet)?;

    Ok(SpotDatum {
        beacon_id: registry.currency_symbol(CurrencyType::Beacon)?,
        observer_hash: registry.script_hash(ScriptType::AftermarketObserver)?,
        nft_policy_id: *nft_policy_id,
        nft_names,
        payment_address,
        deposit,
        price,
    })
}

/// Value of the sale output: the deposit, one of each NFT, the policy
/// beacon and the `Spot` beacon.
pub fn spot_output_value(datum: &SpotDatum) -> Value {
    let mut value = Value::from_lovelace(datum.deposit);
    for name in datum.nft_names.as_slice() {
        value.add(Unit::native(datum.nft_policy_id, name.clone()), 1);
    }
    value.add(
        Unit::native(datum.beacon_id, policy_beacon_name(&datum.nft_policy_id)),
        1,
    );
    value.add(Unit::native(datum.beacon_id, BeaconName::Spot.asset_name()), 1);
    value
}

/// The two beacon mints of a listing, both through the deployed beacon script.
pub fn beacon_mints(
    registry: &Registry,
    network: Network,
    nft_policy_id: &PolicyId,
) -> Result<Vec<MintAction>, RegistryError> {
    let script_hash = registry.script_hash(ScriptType::Beacon)?;
    let reference = registry.reference_for(network, ScriptType::Beacon)?;
    Ok(vec![
        MintAction::beacon(script_hash, reference, policy_beacon_name(nft_policy_id)),
        MintAction::beacon(script_hash, reference, BeaconName::Spot.asset_name()),
    ])
}

fn at(stage: Stage) -> impl Fn(FailureKind) -> AssemblerError {
    move |kind| {
        error!("spot sale failed at {}: {}", stage, kind);
        AssemblerError { stage, kind }
    }
}

fn external(call: &'static str) -> impl Fn(ExternalError) -> FailureKind {
    move |source| FailureKind::External { call, source }
}

fn entered(plan: &TxPlan) {
    debug!("spot sale stage {}", plan.stage());
}

/// Drives a wallet and a chain provider through a spot sale build.
pub struct Assembler<'r, W, P> {
    wallet: W,
    provider: P,
    registry: &'r Registry,
    config: AssemblerConfig,
}

impl<W: Wallet, P: ChainProvider> Assembler<'static, W, P> {
    /// Uses the built-in registry and default configuration.
    pub fn new(wallet: W, provider: P) -> Self {
        Self {
            wallet,
            provider,
            registry: Registry::builtin(),
            config: AssemblerConfig::default(),
        }
    }
}

impl<'r, W: Wallet, P: ChainProvider> Assembler<'r, W, P> {
    pub fn with_registry<'s>(self, registry: &'s Registry) -> Assembler<'s, W, P> {
        Assembler {
            wallet: self.wallet,
            provider: self.provider,
            registry,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: AssemblerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Builds, signs and submits a spot sale.
    pub async fn build_spot_sale(
        &self,
        request: SpotSaleRequest,
    ) -> Result<SpotSaleReceipt, AssemblerError> {
        let SpotSaleRequest {
            nfts,
            payment_address,
            deposit,
            price,
            change_address,
        } = request;

        let datum = spot_datum(self.registry, &nfts, payment_address, deposit, price)
            .map_err(at(Stage::DatumReady))?;
        let plan = TxPlan::new().with_datum(datum.clone());
        entered(&plan);

        let network_id = self
            .wallet
            .network_id()
            .await
            .map_err(external("network_id"))
            .map_err(at(Stage::OutputsSet))?;
        let network = Network::from_id(network_id);
        let reward_addresses = self
            .wallet
            .reward_addresses()
            .await
            .map_err(external("reward_addresses"))
            .map_err(at(Stage::OutputsSet))?;
        let reward_address = reward_addresses
            .first()
            .ok_or(FailureKind::NoRewardAddress)
            .map_err(at(Stage::OutputsSet))?;
        let stake = parse_reward_address(reward_address)
            .map_err(FailureKind::from)
            .map_err(at(Stage::OutputsSet))?;
        let aftermarket = self
            .registry
            .script_hash(ScriptType::Aftermarket)
            .map_err(FailureKind::from)
            .map_err(at(Stage::OutputsSet))?;
        let seller = seller_address(network, &aftermarket, stake);
        let seller_bech32 = seller
            .to_bech32()
            .map_err(FailureKind::from)
            .map_err(at(Stage::OutputsSet))?;
        let output = PlannedOutput {
            address: seller,
            value: spot_output_value(&datum),
            inline_datum: datum.to_data(),
        };
        let plan = plan.with_outputs(network, vec![output]);
        entered(&plan);

        let mints = beacon_mints(self.registry, network, &datum.nft_policy_id)
            .map_err(FailureKind::from)
            .map_err(at(Stage::MintingConfigured))?;
        let plan = plan.with_mints(mints);
        entered(&plan);

        let change_address = match change_address.filter(|a| !a.is_empty()) {
            Some(address) => Some(address),
            None => self
                .wallet
                .change_address()
                .await
                .map_err(external("change_address"))
                .map_err(at(Stage::ChangeSet))?,
        };
        let change_address = change_address
            .filter(|a| !a.is_empty())
            .ok_or(FailureKind::MissingChangeAddress)
            .map_err(at(Stage::ChangeSet))?;
        let plan = plan.with_change_address(change_address);
        entered(&plan);

        let collateral = self
            .wallet
            .collateral()
            .await
            .map_err(external("collateral"))
            .map_err(at(Stage::CollateralAttached))?
            .into_iter()
            .next()
            .ok_or(FailureKind::NoCollateralAvailable)
            .map_err(at(Stage::CollateralAttached))?;
        let plan = plan.with_collateral(collateral);
        entered(&plan);

        let utxos = self
            .wallet
            .utxos()
            .await
            .map_err(external("utxos"))
            .map_err(at(Stage::UtxosSelected))?;
        let available = total_lovelace(&utxos);
        if available < self.config.low_balance_threshold {
            warn!(
                "wallet holds {} lovelace, below the {} lovelace needed to list comfortably",
                available, self.config.low_balance_threshold
            );
        }
        let plan = plan.with_inputs(utxos);
        entered(&plan);

        let estimate = self
            .provider
            .calculate_fee(&plan)
            .await
            .map_err(external("calculate_fee"))
            .map_err(at(Stage::FeeComputed))?;
        let fee = estimate.saturating_add(self.config.fee_buffer);
        let plan = plan.with_fee(fee);
        entered(&plan);

        let unsigned = self
            .provider
            .complete(&plan)
            .await
            .map_err(external("complete"))
            .map_err(at(Stage::Completed))?;
        let plan = plan.with_unsigned(unsigned.clone());
        entered(&plan);

        let signed = self
            .wallet
            .sign_tx(&unsigned, self.config.partial_sign)
            .await
            .map_err(external("sign_tx"))
            .map_err(at(Stage::Signed))?;
        let plan = plan.with_signed(signed.clone());
        entered(&plan);

        let submitted = self
            .wallet
            .submit_tx(&signed)
            .await
            .map_err(external("submit_tx"))
            .map_err(at(Stage::Submitted))?;
        let tx_hash: TxHash = submitted
            .parse()
            .map_err(|_| FailureKind::InvalidTxHash(submitted.clone()))
            .map_err(at(Stage::Submitted))?;
        let plan = plan.submitted();
        entered(&plan);

        info!("spot sale {} submitted to {}", tx_hash, seller_bech32);
        Ok(SpotSaleReceipt {
            tx_hash,
            seller_address: seller_bech32,
            fee,
            datum,
        })
    }
}
