//! Where blocks go in the scene and how their transactions fill them.

pub mod packer;

use std::f32::consts::TAU;

use bevy::math::Vec3;

pub use packer::{
    exact_grid_dims, pack_exact, pack_proportional, GridDims, PackStrategy, PackableSet,
    PackerSettings, ReferenceRange, VolumetricLayout, DEFAULT_CELL_EDGE,
};

/// Block placement modes. Each is a pure function of the block's index in
/// the newest-first ordering, the number of blocks shown, and a per-block
/// weight (transactions per thousand for `Scatter`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutStrategy {
    /// Newest block at eye level in front of the viewer, older blocks stepping
    /// right, up, and away.
    Immersive { origin: Vec3, step: Vec3 },
    /// Evenly spaced along +x.
    Row { spacing: f32 },
    /// Fixed-width grid on the floor plane, raised by weight.
    Scatter {
        columns: usize,
        step: f32,
        height_scale: f32,
    },
    /// Evenly spaced on a horizontal circle.
    Ring { center: Vec3, radius: f32 },
}

impl Default for LayoutStrategy {
    fn default() -> Self {
        Self::IMMERSIVE
    }
}

impl LayoutStrategy {
    pub const IMMERSIVE: Self = Self::Immersive {
        origin: Vec3::new(0.0, 1.6, -0.6),
        step: Vec3::new(0.35, 0.03, -0.08),
    };
    pub const ROW: Self = Self::Row { spacing: 0.3 };
    pub const SCATTER: Self = Self::Scatter {
        columns: 10,
        step: 0.2,
        height_scale: 0.01,
    };
    pub const RING: Self = Self::Ring {
        center: Vec3::new(0.0, 1.4, 0.0),
        radius: 1.0,
    };

    /// The preset following this mode's kind, wrapping back to immersive.
    pub fn next(&self) -> Self {
        match self {
            LayoutStrategy::Immersive { .. } => Self::ROW,
            LayoutStrategy::Row { .. } => Self::SCATTER,
            LayoutStrategy::Scatter { .. } => Self::RING,
            LayoutStrategy::Ring { .. } => Self::IMMERSIVE,
        }
    }

    /// Modes without an origin of their own start at the floor plane's
    /// origin; hosts usually shift them in front of the viewer.
    pub fn has_origin(&self) -> bool {
        matches!(
            self,
            LayoutStrategy::Immersive { .. } | LayoutStrategy::Ring { .. }
        )
    }

    pub fn position(&self, index: usize, total: usize, weight: f32) -> Vec3 {
        let i = index as f32;
        match *self {
            LayoutStrategy::Immersive { origin, step } => origin + step * i,
            LayoutStrategy::Row { spacing } => Vec3::new(i * spacing, 0.0, 0.0),
            LayoutStrategy::Scatter {
                columns,
                step,
                height_scale,
            } => {
                let columns = columns.max(1);
                Vec3::new(
                    (index % columns) as f32 * step,
                    weight * height_scale,
                    (index / columns) as f32 * step,
                )
            }
            LayoutStrategy::Ring { center, radius } => {
                let angle = i * TAU / total.max(1) as f32;
                center + Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius)
            }
        }
    }
}
