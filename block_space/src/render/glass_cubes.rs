use bevy::prelude::*;

use crate::data::BlockSummary;
use crate::error::{GeometryError, PackError};
use crate::geometry::BoundingVolume;
use crate::layout::{
    PackStrategy, PackableSet, PackerSettings, ReferenceRange, VolumetricLayout, DEFAULT_CELL_EDGE,
};
use crate::render::BlockRenderer;
use crate::scene::materials::{tx_cell_material, BlockMaterials};
use crate::scene::TxCell;

#[derive(Clone, Debug)]
pub struct GlassCubeSettings {
    pub block_edge: f32,
    /// Largest cell edge; exact packing may shrink cells below this.
    pub cell_edge: f32,
    pub strategy: PackStrategy,
    pub packer: PackerSettings,
}

impl Default for GlassCubeSettings {
    fn default() -> Self {
        Self {
            block_edge: 0.18,
            cell_edge: DEFAULT_CELL_EDGE,
            strategy: PackStrategy::default(),
            packer: PackerSettings::default(),
        }
    }
}

/// Translucent block cubes with their transactions packed inside as small
/// opaque cells, coloured by layer.
#[derive(Default)]
pub struct GlassCubeRenderer {
    pub settings: GlassCubeSettings,
}

impl GlassCubeRenderer {
    pub fn new(settings: GlassCubeSettings) -> Self {
        Self { settings }
    }

    pub fn pack(&self, tx_count: u64, range: ReferenceRange) -> Result<VolumetricLayout, PackError> {
        let set = PackableSet::new(tx_count, self.settings.block_edge, range)
            .with_cell_edge(self.settings.cell_edge);
        self.settings.strategy.pack(&set, &self.settings.packer)
    }
}

impl BlockRenderer for GlassCubeRenderer {
    fn block_edge(&self) -> f32 {
        self.settings.block_edge
    }

    fn spawn_block(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        block: &BlockSummary,
        position: Vec3,
    ) -> Result<Entity, GeometryError> {
        BoundingVolume::from_edge(position, self.settings.block_edge)?;

        let block_materials = BlockMaterials::new(materials);
        let entity = commands
            .spawn((
                Mesh3d(meshes.add(Cuboid::from_length(self.settings.block_edge))),
                MeshMaterial3d(block_materials.base.clone()),
                Transform::from_translation(position),
                Visibility::Visible,
                block_materials,
                Name::new(format!("block {}", block.number)),
            ))
            .id();
        Ok(entity)
    }

    fn fill_block(
        &self,
        commands: &mut Commands,
        meshes: &mut Assets<Mesh>,
        materials: &mut Assets<StandardMaterial>,
        block: Entity,
        tx_count: u64,
        range: ReferenceRange,
    ) -> Result<VolumetricLayout, PackError> {
        let layout = self.pack(tx_count, range)?;

        let mut block_commands = commands.entity(block);
        block_commands.despawn_descendants();
        if layout.cells.is_empty() {
            return Ok(layout);
        }

        let per_layer = layout.grid.per_layer().max(1);
        let layers_used = layout.cells.len().div_ceil(per_layer);
        let cell_mesh = meshes.add(Cuboid::from_length(layout.cell_edge));
        let layer_materials: Vec<_> = (0..layers_used)
            .map(|layer| tx_cell_material(materials, layer, layout.layers_to_fill))
            .collect();

        block_commands.with_children(|parent| {
            for (index, cell) in layout.cells.iter().enumerate() {
                parent.spawn((
                    Mesh3d(cell_mesh.clone()),
                    MeshMaterial3d(layer_materials[index / per_layer].clone()),
                    Transform::from_translation(*cell),
                    TxCell { index },
                ));
            }
        });

        Ok(layout)
    }
}
