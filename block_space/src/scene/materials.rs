//! Shared material and color helpers for block cubes and transaction cells.

use bevy::prelude::*;

/// The three looks a block cube can take. `highlight_system` swaps between
/// them; the handles are created once per block.
#[derive(Component, Clone, Debug)]
pub struct BlockMaterials {
    pub base: Handle<StandardMaterial>,
    pub gazed: Handle<StandardMaterial>,
    pub selected: Handle<StandardMaterial>,
}

impl BlockMaterials {
    pub fn new(materials: &mut Assets<StandardMaterial>) -> Self {
        Self {
            base: materials.add(glass(Color::srgba(0.55, 0.75, 0.95, 0.18), LinearRgba::BLACK)),
            gazed: materials.add(glass(
                Color::srgba(0.6, 0.85, 1.0, 0.3),
                LinearRgba::rgb(0.1, 0.35, 0.6),
            )),
            selected: materials.add(glass(
                Color::srgba(1.0, 0.8, 0.35, 0.35),
                LinearRgba::rgb(0.9, 0.55, 0.1),
            )),
        }
    }

    pub fn for_state(&self, gazed: bool, selected: bool) -> &Handle<StandardMaterial> {
        if selected {
            &self.selected
        } else if gazed {
            &self.gazed
        } else {
            &self.base
        }
    }
}

fn glass(base_color: Color, emissive: LinearRgba) -> StandardMaterial {
    StandardMaterial {
        base_color,
        emissive,
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.1,
        reflectance: 0.6,
        ..default()
    }
}

pub fn tx_cell_material(
    materials: &mut Assets<StandardMaterial>,
    layer: usize,
    layers: usize,
) -> Handle<StandardMaterial> {
    let color = layer_color(layer, layers);
    materials.add(StandardMaterial {
        base_color: color,
        emissive: color.to_linear() * 0.3,
        ..default()
    })
}

/// Teal → Amber → Red from the bottom layer to the top.
fn layer_color(layer: usize, layers: usize) -> Color {
    let t = if layers > 1 {
        (layer as f32 / (layers - 1) as f32).clamp(0.0, 1.0)
    } else {
        0.0
    };

    if t < 0.5 {
        let s = t / 0.5;
        Color::srgb(0.1 + 0.9 * s, 0.8 - 0.1 * s, 0.7 - 0.5 * s)
    } else {
        let s = (t - 0.5) / 0.5;
        Color::srgb(1.0, 0.7 - 0.5 * s, 0.2 - 0.1 * s)
    }
}
