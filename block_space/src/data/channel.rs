use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bevy::log::info;
use crossbeam_channel::Receiver;

use crate::data::evm::EvmFetcher;
use crate::data::model::BlockSummary;
use crate::data::{ChainFetcher, FetcherConfig};
use crate::error::FixtureError;

const CHANNEL_CAPACITY: usize = 64;
const REPLAY_INTERVAL: Duration = Duration::from_millis(50);
const DEMO_BLOCKS: u64 = 5;

/// Bevy resource holding the feed receiver. Systems drain this in ingest_blocks.
#[derive(bevy::prelude::Resource)]
pub struct BlockChannel(pub Receiver<BlockSummary>);

/// Spawn the EVM fetcher on its own thread and hand back its receiver.
pub fn init_rpc_channel(config: FetcherConfig) -> BlockChannel {
    info!("strata: live feed from {} ({})", config.rpc_url, config.chain);
    BlockChannel(EvmFetcher::spawn(config))
}

/// Replay pre-recorded summaries from a JSON fixture, paced like a live feed.
pub fn init_fixture_channel(path: &Path) -> Result<BlockChannel, FixtureError> {
    let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let blocks: Vec<BlockSummary> =
        serde_json::from_str(&json).map_err(|source| FixtureError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    info!(
        "strata: replaying {} blocks from {}",
        blocks.len(),
        path.display()
    );
    Ok(replay(blocks, REPLAY_INTERVAL))
}

/// Placeholder blocks for running without any data source.
pub fn init_demo_channel() -> BlockChannel {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    replay(BlockSummary::placeholders(DEMO_BLOCKS, now), Duration::ZERO)
}

fn replay(blocks: Vec<BlockSummary>, interval: Duration) -> BlockChannel {
    let (tx, rx) = crossbeam_channel::bounded(CHANNEL_CAPACITY);

    std::thread::spawn(move || {
        for block in blocks {
            if tx.send(block).is_err() {
                return;
            }
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }
    });

    BlockChannel(rx)
}
