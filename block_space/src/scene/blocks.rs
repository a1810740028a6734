//! Block cubes: the scene root, the registry of blocks in view, and the
//! ingest and layout systems.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::data::BlockChannel;
use crate::geometry::BoundingVolume;
use crate::layout::{LayoutStrategy, ReferenceRange};
use crate::picking::{GazeState, Selection};
use crate::render::RendererResource;

/// Blocks kept in the scene; older ones are evicted as new ones arrive.
pub const MAX_BLOCKS: usize = 12;
const MAX_BLOCKS_PER_FRAME: usize = 5;
const EYE_HEIGHT: f32 = 1.6;
/// Where layouts without an origin of their own are placed.
const STAGE_ANCHOR: Vec3 = Vec3::new(-0.9, 1.0, -1.4);

/// Parent of every block. Navigation moves the scene by translating this.
#[derive(Component, Debug, Default)]
pub struct SceneRoot;

#[derive(Component, Clone, Debug)]
pub struct BlockCube {
    pub number: u64,
    pub tx_count: u64,
    pub timestamp: u64,
    /// Bounds relative to the scene root.
    pub volume: BoundingVolume,
    /// Range the current cells were packed against.
    pub packed_with: Option<ReferenceRange>,
}

#[derive(Component, Debug)]
pub struct TxCell {
    pub index: usize,
}

#[derive(Debug)]
pub struct BlockEntry {
    pub entity: Entity,
    pub tx_count: u64,
    pub timestamp: u64,
    pub hash: Option<String>,
}

/// Blocks currently in the scene, keyed by height.
#[derive(Resource, Debug, Default)]
pub struct BlockRegistry {
    entries: BTreeMap<u64, BlockEntry>,
}

impl BlockRegistry {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, number: u64) -> Option<&BlockEntry> {
        self.entries.get(&number)
    }

    pub fn latest(&self) -> Option<(u64, &BlockEntry)> {
        self.entries.iter().next_back().map(|(n, e)| (*n, e))
    }

    pub fn newest_first(&self) -> impl Iterator<Item = (u64, &BlockEntry)> {
        self.entries.iter().rev().map(|(n, e)| (*n, e))
    }

    /// Transaction-count range across every block in view.
    pub fn reference_range(&self) -> Option<ReferenceRange> {
        ReferenceRange::from_counts(self.entries.values().map(|e| e.tx_count))
    }

    /// Adds a block, returning the entry it replaced if the height was
    /// already present.
    pub fn insert(&mut self, number: u64, entry: BlockEntry) -> Option<BlockEntry> {
        self.entries.insert(number, entry)
    }

    /// Removes the lowest heights until at most `max` remain.
    pub fn evict_oldest(&mut self, max: usize) -> Vec<(u64, BlockEntry)> {
        let mut evicted = Vec::new();
        while self.entries.len() > max {
            match self.entries.pop_first() {
                Some(oldest) => evicted.push(oldest),
                None => break,
            }
        }
        evicted
    }
}

/// Active block placement mode. `L` cycles through the presets.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct ActiveLayout(pub LayoutStrategy);

impl ActiveLayout {
    pub fn position(&self, index: usize, total: usize, weight: f32) -> Vec3 {
        let anchor = if self.0.has_origin() {
            Vec3::ZERO
        } else {
            STAGE_ANCHOR
        };
        anchor + self.0.position(index, total, weight)
    }
}

pub fn setup_scene(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0., EYE_HEIGHT, 0.).looking_at(Vec3::new(0., EYE_HEIGHT, -1.), Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(2., 6., 3.).looking_at(Vec3::new(0., EYE_HEIGHT, -1.), Vec3::Y),
    ));
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
    });
    commands.spawn((
        SceneRoot,
        Transform::default(),
        Visibility::default(),
        Name::new("scene root"),
    ));
}

#[allow(clippy::too_many_arguments)]
pub fn ingest_blocks(
    mut commands: Commands,
    channel: Res<BlockChannel>,
    renderer: Res<RendererResource>,
    mut registry: ResMut<BlockRegistry>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut gaze: ResMut<GazeState>,
    mut selection: ResMut<Selection>,
    roots: Query<Entity, With<SceneRoot>>,
) {
    let Ok(root) = roots.get_single() else {
        return;
    };

    let mut received = 0usize;
    while received < MAX_BLOCKS_PER_FRAME {
        let Ok(block) = channel.0.try_recv() else {
            break;
        };
        received += 1;

        // Placed properly by relayout_blocks once the registry settles.
        let entity = match renderer.0.spawn_block(
            &mut commands,
            &mut meshes,
            &mut materials,
            &block,
            Vec3::ZERO,
        ) {
            Ok(entity) => entity,
            Err(err) => {
                warn!("strata: skipping block {}: {err}", block.number);
                continue;
            }
        };
        let volume = match BoundingVolume::from_edge(Vec3::ZERO, renderer.0.block_edge()) {
            Ok(volume) => volume,
            Err(err) => {
                warn!("strata: skipping block {}: {err}", block.number);
                commands.entity(entity).despawn_recursive();
                continue;
            }
        };

        commands.entity(entity).insert(BlockCube {
            number: block.number,
            tx_count: block.tx_count,
            timestamp: block.timestamp,
            volume,
            packed_with: None,
        });
        commands.entity(root).add_child(entity);

        let replaced = registry.insert(
            block.number,
            BlockEntry {
                entity,
                tx_count: block.tx_count,
                timestamp: block.timestamp,
                hash: block.hash,
            },
        );
        if let Some(old) = replaced {
            debug!("strata: block {} replaced", block.number);
            commands.entity(old.entity).despawn_recursive();
        }
        info!("strata: block {} ({} txs)", block.number, block.tx_count);
    }

    if registry.len() > MAX_BLOCKS {
        for (number, entry) in registry.evict_oldest(MAX_BLOCKS) {
            commands.entity(entry.entity).despawn_recursive();
            gaze.forget(number);
            selection.forget(number);
        }
    }
}

/// Positions every block for the active layout and repacks any block whose
/// cells were packed against a different reference range.
pub fn relayout_blocks(
    mut commands: Commands,
    renderer: Res<RendererResource>,
    registry: Res<BlockRegistry>,
    layout: Res<ActiveLayout>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut cubes: Query<(&mut Transform, &mut BlockCube)>,
) {
    if !registry.is_changed() && !layout.is_changed() {
        return;
    }
    let Some(range) = registry.reference_range() else {
        return;
    };

    let total = registry.len();
    let edge = renderer.0.block_edge();
    for (index, (number, entry)) in registry.newest_first().enumerate() {
        let Ok((mut transform, mut cube)) = cubes.get_mut(entry.entity) else {
            continue;
        };

        let position = layout.position(index, total, entry.tx_count as f32 / 1000.0);
        match BoundingVolume::from_edge(position, edge) {
            Ok(volume) => {
                transform.translation = position;
                cube.volume = volume;
            }
            Err(err) => {
                warn!("strata: cannot place block {number}: {err}");
                continue;
            }
        }

        if cube.packed_with == Some(range) {
            continue;
        }
        match renderer.0.fill_block(
            &mut commands,
            &mut meshes,
            &mut materials,
            entry.entity,
            entry.tx_count,
            range,
        ) {
            Ok(packed) => {
                debug!(
                    "strata: block {number} packed {} cells in {}/{} layers",
                    packed.cells.len(),
                    packed.layers_to_fill,
                    packed.max_layers
                );
                cube.packed_with = Some(range);
            }
            Err(err) => warn!("strata: cannot pack block {number}: {err}"),
        }
    }
}

pub(crate) fn cycle_layout_system(keys: Res<ButtonInput<KeyCode>>, mut layout: ResMut<ActiveLayout>) {
    if keys.just_pressed(KeyCode::KeyL) {
        layout.0 = layout.0.next();
        info!("strata: layout {:?}", layout.0);
    }
}
