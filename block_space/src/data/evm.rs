//! EVM block fetcher: dedicated thread + alloy → BlockSummary.

use std::ops::RangeInclusive;
use std::thread;
use std::time::Duration;

use alloy::eips::BlockNumberOrTag;
use alloy::providers::{Provider, ProviderBuilder};
use alloy_chains::Chain;
use bevy::log::{debug, error, info, warn};
use crossbeam_channel::{Receiver, Sender};
use url::Url;

use crate::data::model::BlockSummary;
use crate::data::{ChainFetcher, FetcherConfig};

const BACKFILL_COUNT: u64 = 12;
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// EVM-compatible block fetcher using Alloy.
pub struct EvmFetcher;

impl ChainFetcher for EvmFetcher {
    fn spawn(config: FetcherConfig) -> Receiver<BlockSummary> {
        let (tx, rx) = crossbeam_channel::bounded(64);
        thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(err) => {
                    error!("strata: failed to build tokio runtime: {err}");
                    return;
                }
            };
            rt.block_on(fetcher_loop(config.chain, config.rpc_url, tx));
        });
        rx
    }
}

/// Heights fetched on startup, ending at the current tip.
fn backfill_range(latest: u64) -> RangeInclusive<u64> {
    latest.saturating_sub(BACKFILL_COUNT - 1)..=latest
}

async fn fetcher_loop(chain: Chain, rpc_url: Url, tx: Sender<BlockSummary>) {
    let provider = ProviderBuilder::new().connect_http(rpc_url);

    let latest = match provider.get_block_number().await {
        Ok(n) => n,
        Err(err) => {
            error!("strata: {chain}: failed to get latest block number: {err}");
            return;
        }
    };

    let range = backfill_range(latest);
    info!("strata: {chain}: backfilling blocks {range:?}");

    for n in range {
        if fetch_and_send(&provider, n, &tx).await.is_err() {
            return;
        }
    }

    info!("strata: {chain}: backfill complete, polling for new blocks");

    let mut last_seen = latest;
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;

        let tip = match provider.get_block_number().await {
            Ok(n) => n,
            Err(err) => {
                warn!("strata: {chain}: poll error: {err}");
                continue;
            }
        };

        for n in (last_seen + 1)..=tip {
            if fetch_and_send(&provider, n, &tx).await.is_err() {
                return;
            }
        }
        last_seen = last_seen.max(tip);
    }
}

/// Fetch a single block header and send its summary on the channel.
/// Returns `Err(())` if the channel is closed (receiver dropped).
async fn fetch_and_send(
    provider: &impl Provider,
    number: u64,
    tx: &Sender<BlockSummary>,
) -> Result<(), ()> {
    let block = match provider
        .get_block_by_number(BlockNumberOrTag::Number(number))
        .await
    {
        Ok(Some(block)) => block,
        Ok(None) => {
            warn!("strata: block {number} not found");
            return Ok(());
        }
        Err(err) => {
            warn!("strata: failed to fetch block {number}: {err}");
            return Ok(());
        }
    };

    let header = &block.header;
    let summary = BlockSummary {
        number: header.number,
        hash: Some(format!("{:#x}", header.hash)),
        timestamp: header.timestamp,
        tx_count: block.transactions.len() as u64,
    };
    debug!(
        "strata: block {} ({} txs)",
        summary.number, summary.tx_count
    );
    tx.send(summary).map_err(|_| ())
}
