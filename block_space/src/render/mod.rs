//! Renderer traits and default implementations.

mod glass_cubes;

use bevy::prelude::*;

use crate::data::BlockSummary;
use crate::error::{GeometryError, PackError};
use crate::layout::{ReferenceRange, VolumetricLayout};

pub use glass_cubes::{GlassCubeRenderer, GlassCubeSettings};

/// Draws blocks and their packed transaction cells. Picking only needs the
/// edge length, so a renderer may use any mesh that fits inside it.
pub trait BlockRenderer: Send + Sync + 'static {
    fn setup(&self, _app: &mut App) {}

    /// Edge length of a block cube in world units.
    fn block_edge(&self) -> f32;

    /// Spawns the block entity at `position` relative to the scene root.
    fn spawn_block(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        block: &BlockSummary,
        position: Vec3,
    ) -> Result<Entity, GeometryError>;

    /// Replaces the block's transaction cells with a fresh packing.
    fn fill_block(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        block: Entity,
        tx_count: u64,
        range: ReferenceRange,
    ) -> Result<VolumetricLayout, PackError>;
}

#[derive(Resource)]
pub struct RendererResource(pub Box<dyn BlockRenderer>);

impl RendererResource {
    pub fn new(renderer: impl BlockRenderer) -> Self {
        Self(Box::new(renderer))
    }
}
