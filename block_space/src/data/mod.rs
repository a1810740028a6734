mod channel;
pub mod evm;
mod model;

use alloy_chains::Chain;
use crossbeam_channel::Receiver;
use url::Url;

pub use channel::{init_demo_channel, init_fixture_channel, init_rpc_channel, BlockChannel};
pub use model::BlockSummary;

/// Configuration for spawning a chain fetcher.
#[derive(Clone, Debug, PartialEq)]
pub struct FetcherConfig {
    pub chain: Chain,
    pub rpc_url: Url,
}

/// Interface for chain-specific block fetchers.
pub trait ChainFetcher: Send + 'static {
    fn spawn(config: FetcherConfig) -> Receiver<BlockSummary>;
}
