//! Env parsing and runtime defaults.

use std::path::PathBuf;

use alloy_chains::Chain;
use bevy::log::warn;
use url::Url;

use crate::data::FetcherConfig;
use crate::error::ConfigError;

const DEFAULT_GAZE_POLL_HZ: f32 = 10.0;
const DEFAULT_MOMENTUM_TICK_HZ: f64 = 120.0;

pub const GAZE_POLL_HZ_MIN: f32 = 1.0;
pub const GAZE_POLL_HZ_MAX: f32 = 120.0;
pub const MOMENTUM_TICK_HZ_MIN: f64 = 30.0;
pub const MOMENTUM_TICK_HZ_MAX: f64 = 1000.0;

/// Where blocks come from.
#[derive(Clone, Debug, PartialEq)]
pub enum BlockSource {
    /// Placeholder blocks, no network.
    Demo,
    /// JSON array of block summaries, replayed in order.
    Fixture(PathBuf),
    Rpc(FetcherConfig),
}

/// Picks the block source from the environment. `STRATA_DEMO=1` forces the
/// demo feed, then `BLOCK_FIXTURE`, then `RPC_URL` (+ optional `CHAIN_ID`).
/// Falls back to the demo feed when none is usable.
pub fn block_source() -> BlockSource {
    if env_flag("STRATA_DEMO") {
        return BlockSource::Demo;
    }
    if let Ok(path) = std::env::var("BLOCK_FIXTURE") {
        if !path.is_empty() {
            return BlockSource::Fixture(PathBuf::from(path));
        }
    }
    let Ok(raw) = std::env::var("RPC_URL") else {
        return BlockSource::Demo;
    };
    match raw.parse::<Url>() {
        Ok(rpc_url) => BlockSource::Rpc(FetcherConfig {
            chain: chain_id(),
            rpc_url,
        }),
        Err(err) => {
            warn!("strata: invalid RPC_URL {raw:?}: {err}; using demo blocks");
            BlockSource::Demo
        }
    }
}

fn chain_id() -> Chain {
    let Ok(raw) = std::env::var("CHAIN_ID") else {
        return Chain::mainnet();
    };
    match raw.trim().parse::<u64>() {
        Ok(id) => Chain::from_id(id),
        Err(err) => {
            warn!("strata: invalid CHAIN_ID {raw:?}: {err}; using mainnet");
            Chain::mainnet()
        }
    }
}

fn env_flag(key: &str) -> bool {
    std::env::var(key).is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes"))
}

/// Rates for the gaze poll and the momentum tick.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigatorConfig {
    pub gaze_poll_hz: f32,
    pub momentum_tick_hz: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            gaze_poll_hz: DEFAULT_GAZE_POLL_HZ,
            momentum_tick_hz: DEFAULT_MOMENTUM_TICK_HZ,
        }
    }
}

impl NavigatorConfig {
    /// Reads `GAZE_POLL_HZ` and `MOMENTUM_TICK_HZ`. Missing values keep their
    /// defaults; unparsable or out-of-range values warn and keep them too.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(hz) = env_rate("GAZE_POLL_HZ") {
            match check_gaze_poll_hz(hz as f32) {
                Ok(hz) => config.gaze_poll_hz = hz,
                Err(err) => warn!("strata: GAZE_POLL_HZ: {err}; using {DEFAULT_GAZE_POLL_HZ} Hz"),
            }
        }
        if let Some(hz) = env_rate("MOMENTUM_TICK_HZ") {
            match check_momentum_tick_hz(hz) {
                Ok(hz) => config.momentum_tick_hz = hz,
                Err(err) => {
                    warn!("strata: MOMENTUM_TICK_HZ: {err}; using {DEFAULT_MOMENTUM_TICK_HZ} Hz")
                }
            }
        }
        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_gaze_poll_hz(self.gaze_poll_hz)?;
        check_momentum_tick_hz(self.momentum_tick_hz)?;
        Ok(())
    }
}

pub fn check_gaze_poll_hz(hz: f32) -> Result<f32, ConfigError> {
    if (GAZE_POLL_HZ_MIN..=GAZE_POLL_HZ_MAX).contains(&hz) {
        Ok(hz)
    } else {
        Err(ConfigError::GazePollRate {
            hz,
            min: GAZE_POLL_HZ_MIN,
            max: GAZE_POLL_HZ_MAX,
        })
    }
}

pub fn check_momentum_tick_hz(hz: f64) -> Result<f64, ConfigError> {
    if (MOMENTUM_TICK_HZ_MIN..=MOMENTUM_TICK_HZ_MAX).contains(&hz) {
        Ok(hz)
    } else {
        Err(ConfigError::MomentumTickRate {
            hz,
            min: MOMENTUM_TICK_HZ_MIN,
            max: MOMENTUM_TICK_HZ_MAX,
        })
    }
}

fn env_rate(key: &str) -> Option<f64> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(hz) => Some(hz),
        Err(err) => {
            warn!("strata: invalid {key} {raw:?}: {err}; using default");
            None
        }
    }
}
