pub(crate) mod blocks;
pub(crate) mod materials;

use bevy::prelude::*;

use crate::data::BlockChannel;

pub use blocks::{
    ingest_blocks, relayout_blocks, setup_scene, ActiveLayout, BlockCube, BlockEntry,
    BlockRegistry, SceneRoot, TxCell, MAX_BLOCKS,
};
pub use materials::BlockMaterials;

/// Expects `RendererResource` and a `BlockChannel`; the SDK builder inserts
/// both, and `ActiveLayout` when a layout was chosen.
pub fn scene_plugin(app: &mut App) {
    app.init_resource::<BlockRegistry>()
        .init_resource::<ActiveLayout>()
        .add_systems(Startup, setup_scene)
        .add_systems(
            Update,
            (
                ingest_blocks.run_if(resource_exists::<BlockChannel>),
                relayout_blocks,
            )
                .chain(),
        )
        .add_systems(Update, blocks::cycle_layout_system);
}
