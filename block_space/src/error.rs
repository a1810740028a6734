//! Contract-violation errors for the geometry, packing, navigation, config and feed layers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("ray direction has zero length")]
    ZeroDirection,
    #[error("ray or box coordinates are not finite")]
    NonFinite,
    #[error("bounding volume half extents must be non-negative, got {0:?}")]
    NegativeExtents([f32; 3]),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PackError {
    #[error("container edge must be positive, got {0}")]
    NonPositiveContainer(f32),
    #[error("cell edge must be positive, got {0}")]
    NonPositiveCell(f32),
    #[error("spacing factor must exceed 1.0 so cells never touch, got {0}")]
    SpacingTooTight(f32),
    #[error("reference range is inverted: min {min} > max {max}")]
    InvertedRange { min: u64, max: u64 },
    #[error("container edge {container_edge} cannot hold a single row/layer of {spacing} spaced cells")]
    ContainerTooSmall { container_edge: f32, spacing: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NavigationError {
    #[error("friction per tick must lie in (0, 1), got {0}")]
    Friction(f32),
    #[error("tick interval must be positive, got {0}")]
    TickInterval(f32),
    #[error("snap step must be positive, got {0}")]
    SnapStep(f32),
    #[error("focus point must be finite, got {0:?}")]
    FocusPoint([f32; 3]),
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("gaze poll rate must lie in [{min}, {max}] Hz, got {hz}")]
    GazePollRate { hz: f32, min: f32, max: f32 },
    #[error("momentum tick rate must lie in [{min}, {max}] Hz, got {hz}")]
    MomentumTickRate { hz: f64, min: f64, max: f64 },
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse fixture {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
