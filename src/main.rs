//! Command-line access to the aftermarket codecs and tables.
//!
//! # Usage
//! ```text
//! aftermarket <command> [ARGS]
//! ```
//!
//! # Commands
//! - `datum <cbor-hex>`: decode a spot sale datum and print it as JSON
//! - `json <cbor-hex>`: print any ledger data in the detailed JSON schema
//! - `beacon <policy-id>`: print the beacon token name of an NFT policy
//! - `seller <network> <reward-address>`: derive a seller's contract address
//! - `refs <network>`: list the deployed script references of a network

use aftermarket::codec::{FromData, SpotDatum};
use aftermarket::data::BinaryNode;
use aftermarket::ledger::address::derive_seller_address;
use aftermarket::ledger::network::Network;
use aftermarket::registry::{Registry, ScriptType, policy_beacon_name};
use aftermarket::types::hash::PolicyId;
use aftermarket::{error, info};
use serde::Serialize;
use std::env;
use std::process;

const USAGE: &str = "\
Spot-sale aftermarket tools

USAGE:
    {program} <COMMAND> [ARGS]

COMMANDS:
    datum <cbor-hex>                     Decode a spot sale datum to JSON
    json <cbor-hex>                      Print ledger data in the detailed JSON schema
    beacon <policy-id>                   Beacon token name of an NFT policy
    seller <network> <reward-address>    Seller contract address (network: testnet|mainnet)
    refs <network>                       Deployed script references

OPTIONS:
    -h, --help    Print this help message

ENVIRONMENT:
    AFTERMARKET_LOG    Minimum log level: debug, info, warn or error (default info)

EXAMPLES:
    {program} beacon abcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcdabcd
    {program} seller testnet stake_test1uqg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zyg3zygxtxu2s
";

/// Prints usage information to stderr.
fn print_usage(program: &str) {
    eprintln!("{}", USAGE.replace("{program}", program));
}

/// Prints a value as pretty JSON on stdout.
fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("Failed to serialize output: {}", e)),
    }
}

fn fail(message: String) -> ! {
    error!("{}", message);
    process::exit(1);
}

/// Returns the single argument of a command or exits with usage.
fn argument<'a>(args: &'a [String], position: usize, name: &str) -> &'a str {
    match args.get(position) {
        Some(value) => value,
        None => {
            eprintln!("Missing argument <{}>\n", name);
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}

#[derive(Serialize)]
struct ReferenceRow {
    script: &'static str,
    script_hash: String,
    tx_hash: String,
    output_index: u32,
    size: u32,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    match args[1].as_str() {
        "datum" => {
            let cbor = argument(&args, 2, "cbor-hex");
            let node = match BinaryNode::from_hex(cbor) {
                Ok(node) => node,
                Err(e) => fail(format!("Invalid ledger data: {}", e)),
            };
            match SpotDatum::from_data(&node) {
                Ok(datum) => print_json(&datum),
                Err(e) => fail(format!("Invalid spot datum: {}", e)),
            }
        }
        "json" => {
            let cbor = argument(&args, 2, "cbor-hex");
            match BinaryNode::from_hex(cbor) {
                Ok(node) => print_json(&node.to_json()),
                Err(e) => fail(format!("Invalid ledger data: {}", e)),
            }
        }
        "beacon" => {
            let policy = argument(&args, 2, "policy-id");
            match policy.parse::<PolicyId>() {
                Ok(policy) => println!("{}", policy_beacon_name(&policy)),
                Err(e) => fail(format!("Invalid policy id {}: {}", policy, e)),
            }
        }
        "seller" => {
            let network = argument(&args, 2, "network");
            let reward_address = argument(&args, 3, "reward-address");
            let registry = Registry::builtin();
            let script_hash = match registry.script_hash(ScriptType::Aftermarket) {
                Ok(hash) => hash,
                Err(e) => fail(e.to_string()),
            };
            match derive_seller_address(network, &script_hash, reward_address) {
                Ok(address) => println!("{}", address),
                Err(e) => fail(format!("Cannot derive seller address: {}", e)),
            }
        }
        "refs" => {
            let network = Network::from_name(argument(&args, 2, "network"));
            let registry = Registry::builtin();
            let rows: Vec<ReferenceRow> = registry
                .references(network)
                .into_iter()
                .filter_map(|(script, reference)| {
                    let script_hash = registry.script_hash(script).ok()?;
                    Some(ReferenceRow {
                        script: script.name(),
                        script_hash: script_hash.to_hex(),
                        tx_hash: reference.tx_hash.to_hex(),
                        output_index: reference.output_index,
                        size: reference.size,
                    })
                })
                .collect();
            if rows.is_empty() {
                info!("No scripts deployed on {}", network);
            }
            print_json(&rows);
        }
        other => {
            eprintln!("Unexpected command: {}\n", other);
            print_usage(&args[0]);
            process::exit(1);
        }
    }
}
