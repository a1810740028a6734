// Chain-agnostic block summary. Alloy types stay in evm.rs; conversion happens there.

use serde::{Deserialize, Serialize};

/// The slice of a block the navigator needs: identity, time, and how many
/// transactions to pack into its cube.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub number: u64,
    #[serde(default)]
    pub hash: Option<String>,
    pub timestamp: u64,
    pub tx_count: u64,
}

impl BlockSummary {
    /// Placeholder blocks shown when no live or recorded feed is configured.
    pub fn placeholders(count: u64, now: u64) -> Vec<Self> {
        (0..count)
            .map(|i| Self {
                number: 800_000 + i,
                hash: None,
                timestamp: now.saturating_sub((count - 1 - i) * 600),
                tx_count: 1000 + i * 100,
            })
            .collect()
    }
}
