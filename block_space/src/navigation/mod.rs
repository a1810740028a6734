//! Scene navigation: the momentum controller and the systems that feed it
//! input, tick it at a fixed rate, and push its offset onto the scene root.

pub mod controller;
pub mod gestures;

use bevy::prelude::*;

use crate::scene::SceneRoot;

pub use controller::{NavigationController, NavigationSettings, NavigationState, Phase};
pub use gestures::{DragRelease, DragTracker, PinchRelease, PinchTracker, Tap};

/// Expects a `NavigationController` resource and a `Time<Fixed>` rate; the
/// SDK builder inserts both.
pub fn navigation_plugin(app: &mut App) {
    app.init_resource::<NavigationState>()
        .init_resource::<DragTracker>()
        .init_resource::<PinchTracker>()
        .add_event::<Tap>()
        .add_systems(FixedUpdate, momentum_system)
        .add_systems(
            Update,
            (
                gestures::drag_input_system,
                gestures::pinch_input_system,
                gestures::navigation_keys_system,
                apply_scene_offset,
            )
                .chain(),
        );
}

fn momentum_system(controller: Res<NavigationController>, mut state: ResMut<NavigationState>) {
    if state.phase() != Phase::Decelerating {
        return;
    }
    if controller.tick(&mut state) == Phase::Idle {
        debug!("scene at rest, offset {:?}", state.offset);
    }
}

fn apply_scene_offset(
    state: Res<NavigationState>,
    mut roots: Query<&mut Transform, With<SceneRoot>>,
) {
    if !state.is_changed() {
        return;
    }
    for mut transform in &mut roots {
        transform.translation = state.offset;
    }
}
