use super::*;
use crate::codec::{Address, Credential, PriceEntry, Prices, ToData};
use crate::ledger::network::Network;
use crate::ledger::utxo::{Unit, Value};
use crate::registry::tables::{
    AFTERMARKET_OBSERVER_SCRIPT_HASH, BEACON_CURRENCY_SYMBOL, BEACON_SCRIPT_HASH,
};
use crate::registry::{BeaconName, Registry, RegistryError, ScriptType, policy_beacon_name};
use crate::types::asset::AssetName;
use crate::types::hash::{KeyHash, PolicyId, TxHash};
use crate::utils::test_utils::mocks::{
    MockProvider, MockWallet, SUBMITTED_TX, UNSIGNED_TX, nft_name, nft_policy, utxo,
};
use std::num::NonZeroU64;

const SELLER_TEST: &str = "addr_test1zrs8a6yhjamxjt8rgaascr2nknr9pmmvett4cfvkmg3gglq3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygs94r3n6";

fn payment_address() -> Address {
    Address::new(
        Credential::PubKey(KeyHash([0x22; 28])),
        Some(Credential::PubKey(KeyHash([0x11; 28]))),
    )
}

fn price() -> Prices {
    Prices::new(vec![
        PriceEntry::from_hex("", "6c6f76656c616365", NonZeroU64::new(33_000_000).unwrap())
            .unwrap(),
    ])
}

fn request() -> SpotSaleRequest {
    SpotSaleRequest {
        nfts: vec![(nft_policy(), nft_name())],
        payment_address: payment_address(),
        deposit: 5_000_000,
        price: price(),
        change_address: None,
    }
}

fn assembler_for(wallet: MockWallet) -> Assembler<'static, MockWallet, MockProvider> {
    Assembler::new(wallet, MockProvider::default())
}

// ========== Pure Stage Helpers ==========

#[test]
fn spot_datum_fills_registry_fields() {
    let datum = spot_datum(
        Registry::builtin(),
        &[(nft_policy(), nft_name())],
        payment_address(),
        5_000_000,
        price(),
    )
    .unwrap();

    assert_eq!(datum.beacon_id, BEACON_CURRENCY_SYMBOL);
    assert_eq!(datum.observer_hash, AFTERMARKET_OBSERVER_SCRIPT_HASH);
    assert_eq!(datum.nft_policy_id, nft_policy());
    assert_eq!(datum.nft_names.len(), 1);
    assert_eq!(datum.deposit, 5_000_000);
}

#[test]
fn spot_datum_rejects_empty_and_mixed_sets() {
    let registry = Registry::builtin();
    assert_eq!(
        spot_datum(registry, &[], payment_address(), 0, price()),
        Err(FailureKind::EmptyAssetSet)
    );

    let other = PolicyId([0x01; 28]);
    assert_eq!(
        spot_datum(
            registry,
            &[(nft_policy(), nft_name()), (other, nft_name())],
            payment_address(),
            0,
            price(),
        ),
        Err(FailureKind::MixedPolicies(nft_policy(), other))
    );
}

#[test]
fn spot_datum_reports_missing_registry_entries() {
    let registry = Registry::builder().build();
    assert!(matches!(
        spot_datum(&registry, &[(nft_policy(), nft_name())], payment_address(), 0, price()),
        Err(FailureKind::Registry(RegistryError::UnknownCurrencyType(_)))
    ));
}

#[test]
fn output_value_carries_deposit_nfts_and_beacons() {
    let datum = spot_datum(
        Registry::builtin(),
        &[(nft_policy(), nft_name()), (nft_policy(), AssetName::from_array(*b"Two"))],
        payment_address(),
        5_000_000,
        price(),
    )
    .unwrap();
    let value = spot_output_value(&datum);

    assert_eq!(value.coin(), 5_000_000);
    assert_eq!(value.quantity(&Unit::native(nft_policy(), nft_name())), 1);
    assert_eq!(
        value.quantity(&Unit::native(nft_policy(), AssetName::from_array(*b"Two"))),
        1
    );
    assert_eq!(
        value.quantity(&Unit::native(
            BEACON_CURRENCY_SYMBOL,
            policy_beacon_name(&nft_policy())
        )),
        1
    );
    assert_eq!(
        value.quantity(&Unit::native(BEACON_CURRENCY_SYMBOL, BeaconName::Spot.asset_name())),
        1
    );
    assert_eq!(value.len(), 5);
}

#[test]
fn beacon_mints_use_the_beacon_reference() {
    let registry = Registry::builtin();
    let mints = beacon_mints(registry, Network::Testnet, &nft_policy()).unwrap();
    let beacon_reference = registry
        .reference_for(Network::Testnet, ScriptType::Beacon)
        .unwrap();

    assert_eq!(mints.len(), 2);
    assert_eq!(mints[0].asset_name, policy_beacon_name(&nft_policy()));
    assert_eq!(mints[1].asset_name, BeaconName::Spot.asset_name());
    for mint in &mints {
        assert_eq!(mint.script_hash, BEACON_SCRIPT_HASH);
        assert_eq!(mint.reference, beacon_reference);
        assert_eq!(mint.reference.size, 8166);
        assert_eq!(mint.quantity, 1);
        assert_eq!(mint.redeemer.to_hex(), "d87980");
    }
}

#[test]
fn beacon_mints_need_a_deployment() {
    assert!(matches!(
        beacon_mints(Registry::builtin(), Network::Mainnet, &nft_policy()),
        Err(RegistryError::UnresolvedReference {
            network: Network::Mainnet,
            ..
        })
    ));
}

// ========== Full Builds ==========

#[tokio::test]
async fn builds_signs_and_submits() {
    let assembler = assembler_for(MockWallet::funded());

    let receipt = assembler.build_spot_sale(request()).await.unwrap();

    assert_eq!(receipt.tx_hash, SUBMITTED_TX.parse::<TxHash>().unwrap());
    assert_eq!(receipt.seller_address, SELLER_TEST);
    assert_eq!(receipt.fee, 180_000 + 1_000_000);
    let expected = spot_datum(
        Registry::builtin(),
        &[(nft_policy(), nft_name())],
        payment_address(),
        5_000_000,
        price(),
    )
    .unwrap();
    assert_eq!(receipt.datum, expected);

    assert_eq!(
        assembler.wallet().calls(),
        vec![
            "network_id",
            "reward_addresses",
            "change_address",
            "collateral",
            "utxos",
            "sign_tx",
            "submit_tx",
        ]
    );
    assert_eq!(
        assembler.wallet().signed(),
        vec![(UNSIGNED_TX.to_string(), true)]
    );
}

#[tokio::test]
async fn provider_sees_the_planned_transaction() {
    let assembler = assembler_for(MockWallet::funded());
    assembler.build_spot_sale(request()).await.unwrap();

    let plans = assembler.provider().plans();
    assert_eq!(plans.len(), 2);

    let priced = &plans[0];
    assert_eq!(priced.stage(), Stage::UtxosSelected);
    assert_eq!(priced.network(), Some(Network::Testnet));
    assert_eq!(priced.outputs().len(), 1);
    let output = &priced.outputs()[0];
    assert_eq!(output.address.to_bech32().unwrap(), SELLER_TEST);
    assert_eq!(&output.inline_datum, &priced.datum().unwrap().to_data());
    assert_eq!(output.value.coin(), 5_000_000);
    assert_eq!(priced.mints().len(), 2);
    assert_eq!(priced.reference_inputs().len(), 1);
    assert_eq!(priced.change_address(), Some(MockWallet::CHANGE_ADDRESS));
    assert_eq!(priced.collateral().map(|c| c.input.output_index), Some(1));
    assert_eq!(priced.inputs().len(), 1);
    assert_eq!(priced.fee(), None);

    let completed = &plans[1];
    assert_eq!(completed.stage(), Stage::FeeComputed);
    assert_eq!(completed.fee(), Some(1_180_000));
}

#[tokio::test]
async fn request_change_address_skips_wallet_lookup() {
    let assembler = assembler_for(MockWallet::funded());
    let request = SpotSaleRequest {
        change_address: Some("addr_test1override".to_string()),
        ..request()
    };

    assembler.build_spot_sale(request).await.unwrap();

    assert!(!assembler.wallet().calls().contains(&"change_address"));
    assert_eq!(
        assembler.provider().plans()[0].change_address(),
        Some("addr_test1override")
    );
}

#[tokio::test]
async fn config_controls_fee_buffer_and_signing() {
    let config = AssemblerConfig {
        fee_buffer: 0,
        partial_sign: false,
        ..AssemblerConfig::default()
    };
    let assembler = assembler_for(MockWallet::funded()).with_config(config);

    let receipt = assembler.build_spot_sale(request()).await.unwrap();

    assert_eq!(receipt.fee, 180_000);
    assert!(!assembler.wallet().signed()[0].1);
}

#[tokio::test]
async fn low_balance_only_warns() {
    let wallet = MockWallet {
        utxos: vec![utxo(2, Value::from_lovelace(1_000_000))],
        ..MockWallet::funded()
    };
    let assembler = assembler_for(wallet);

    assert!(assembler.build_spot_sale(request()).await.is_ok());
}

// ========== Failures ==========

#[tokio::test]
async fn empty_nft_set_fails_before_any_wallet_call() {
    let assembler = assembler_for(MockWallet::funded());
    let request = SpotSaleRequest {
        nfts: Vec::new(),
        ..request()
    };

    let err = assembler.build_spot_sale(request).await.unwrap_err();

    assert_eq!(
        err,
        AssemblerError {
            stage: Stage::DatumReady,
            kind: FailureKind::EmptyAssetSet,
        }
    );
    assert!(assembler.wallet().calls().is_empty());
    assert!(assembler.provider().plans().is_empty());
}

#[tokio::test]
async fn missing_collateral_fails_before_fee_computation() {
    let wallet = MockWallet {
        collateral: Vec::new(),
        ..MockWallet::funded()
    };
    let assembler = assembler_for(wallet);

    let err = assembler.build_spot_sale(request()).await.unwrap_err();

    assert_eq!(err.stage, Stage::CollateralAttached);
    assert_eq!(err.kind, FailureKind::NoCollateralAvailable);
    assert!(assembler.provider().plans().is_empty());
    let calls = assembler.wallet().calls();
    assert!(!calls.contains(&"utxos"));
    assert!(!calls.contains(&"submit_tx"));
}

#[tokio::test]
async fn missing_change_address() {
    let wallet = MockWallet {
        change_address: None,
        ..MockWallet::funded()
    };
    let assembler = assembler_for(wallet);

    let err = assembler.build_spot_sale(request()).await.unwrap_err();
    assert_eq!(err.stage, Stage::ChangeSet);
    assert_eq!(err.kind, FailureKind::MissingChangeAddress);

    let wallet = MockWallet {
        change_address: Some(String::new()),
        ..MockWallet::funded()
    };
    let err = assembler_for(wallet).build_spot_sale(request()).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MissingChangeAddress);
}

#[tokio::test]
async fn missing_reward_address() {
    let wallet = MockWallet {
        reward_addresses: Vec::new(),
        ..MockWallet::funded()
    };
    let err = assembler_for(wallet).build_spot_sale(request()).await.unwrap_err();
    assert_eq!(err.stage, Stage::OutputsSet);
    assert_eq!(err.kind, FailureKind::NoRewardAddress);
}

#[tokio::test]
async fn base_address_as_reward_address_is_rejected() {
    let wallet = MockWallet {
        reward_addresses: vec![MockWallet::CHANGE_ADDRESS.to_string()],
        ..MockWallet::funded()
    };
    let err = assembler_for(wallet).build_spot_sale(request()).await.unwrap_err();
    assert_eq!(err.stage, Stage::OutputsSet);
    assert!(matches!(
        err.kind,
        FailureKind::Address(crate::ledger::address::AddressError::NotAStakeAddress(_))
    ));
}

#[tokio::test]
async fn mainnet_has_no_beacon_reference() {
    let wallet = MockWallet {
        network_id: 1,
        ..MockWallet::funded()
    };
    let err = assembler_for(wallet).build_spot_sale(request()).await.unwrap_err();
    assert_eq!(err.stage, Stage::MintingConfigured);
    assert!(matches!(
        err.kind,
        FailureKind::Registry(RegistryError::UnresolvedReference { .. })
    ));
}

#[tokio::test]
async fn provider_errors_surface_unchanged() {
    let provider = MockProvider {
        fee: Err(ExternalError::Request("fee service down".to_string())),
        ..MockProvider::default()
    };
    let assembler = Assembler::new(MockWallet::funded(), provider);

    let err = assembler.build_spot_sale(request()).await.unwrap_err();
    assert_eq!(err.stage, Stage::FeeComputed);
    assert_eq!(
        err.kind,
        FailureKind::External {
            call: "calculate_fee",
            source: ExternalError::Request("fee service down".to_string()),
        }
    );
    assert!(!assembler.wallet().calls().contains(&"sign_tx"));
}

#[tokio::test]
async fn declined_signature_stops_submission() {
    let wallet = MockWallet {
        sign_error: Some(ExternalError::Declined),
        ..MockWallet::funded()
    };
    let assembler = assembler_for(wallet);

    let err = assembler.build_spot_sale(request()).await.unwrap_err();
    assert_eq!(err.stage, Stage::Signed);
    assert!(!assembler.wallet().calls().contains(&"submit_tx"));

    let source = std::error::Error::source(&err).map(|e| e.to_string());
    assert_eq!(source.as_deref(), Some("sign_tx failed: declined by user"));
}

#[tokio::test]
async fn malformed_submitted_hash() {
    let wallet = MockWallet {
        submit_result: Ok("ABC".to_string()),
        ..MockWallet::funded()
    };
    let err = assembler_for(wallet).build_spot_sale(request()).await.unwrap_err();
    assert_eq!(err.stage, Stage::Submitted);
    assert_eq!(err.kind, FailureKind::InvalidTxHash("ABC".to_string()));
}

#[test]
fn error_messages_name_the_stage() {
    let err = AssemblerError {
        stage: Stage::CollateralAttached,
        kind: FailureKind::NoCollateralAvailable,
    };
    assert_eq!(
        err.to_string(),
        "spot sale failed at CollateralAttached: wallet has no collateral set"
    );
}
