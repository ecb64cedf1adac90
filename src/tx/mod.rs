//! Spot sale transaction assembly.

pub mod assembler;
pub mod config;
pub mod plan;
pub mod stage;
pub mod wallet;

#[cfg(test)]
mod tests;

pub use assembler::{
    Assembler, AssemblerError, FailureKind, SpotSaleReceipt, SpotSaleRequest, beacon_mints,
    spot_datum, spot_output_value,
};
pub use config::{AssemblerConfig, ConfigError};
pub use plan::{MintAction, PlannedOutput, TxPlan};
pub use stage::Stage;
pub use wallet::{ChainProvider, ExternalError, Wallet};
