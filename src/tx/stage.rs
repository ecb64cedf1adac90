//! Build stages of a spot sale transaction.

use serde::Serialize;
use std::fmt;

/// Progress of a build, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Stage {
    Init,
    DatumReady,
    OutputsSet,
    MintingConfigured,
    ChangeSet,
    CollateralAttached,
    UtxosSelected,
    FeeComputed,
    Completed,
    Signed,
    Submitted,
}

impl Stage {
    pub const ALL: [Stage; 11] = [
        Stage::Init,
        Stage::DatumReady,
        Stage::OutputsSet,
        Stage::MintingConfigured,
        Stage::ChangeSet,
        Stage::CollateralAttached,
        Stage::UtxosSelected,
        Stage::FeeComputed,
        Stage::Completed,
        Stage::Signed,
        Stage::Submitted,
    ];

    /// The stage that follows, or `None` once submitted.
    pub fn next(self) -> Option<Stage> {
        let position = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(position + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Submitted
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        for pair in Stage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(Stage::Submitted.next(), None);
        assert!(Stage::Submitted.is_terminal());
    }

    #[test]
    fn display_uses_variant_name() {
        assert_eq!(Stage::CollateralAttached.to_string(), "CollateralAttached");
    }
}
