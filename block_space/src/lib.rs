//! Block space navigator: blocks as translucent cubes packed with their
//! transactions, explored with momentum drag, pinch, gaze and tap.
//!
//! Library root: the navigation core (geometry, layout, picking, navigation)
//! plus the data feed, scene, SDK builder, and config modules around it.

pub mod config;
pub mod data;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod navigation;
pub mod picking;
pub mod render;
pub mod scene;
mod ui;

pub mod prelude;
pub mod sdk;

pub use data::evm::EvmFetcher;
pub use data::{BlockSummary, ChainFetcher, FetcherConfig};
pub use error::{ConfigError, FixtureError, GeometryError, NavigationError, PackError};
