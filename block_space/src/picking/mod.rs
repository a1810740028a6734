//! Gaze and tap selection over block cubes.
//!
//! Both use the ray-box test in `geometry` against each block's fixed edge
//! rather than Bevy's mesh picking, so egui and the drag gesture keep the
//! pointer.

pub mod gaze;

use bevy::prelude::*;

use crate::geometry::Ray;
use crate::navigation::{NavigationState, Tap};
use crate::scene::{BlockCube, BlockMaterials};

pub use gaze::{GazeChange, GazePoller, GazeState};
pub use hit_test::{resolve, Hit};

/// Block chosen by the last tap, if any.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    selected: Option<u64>,
}

impl Selection {
    pub fn selected(&self) -> Option<u64> {
        self.selected
    }

    /// Selects `number`, or clears the selection if it was already selected.
    pub fn toggle(&mut self, number: u64) -> Option<u64> {
        self.selected = if self.selected == Some(number) {
            None
        } else {
            Some(number)
        };
        self.selected
    }

    pub fn select(&mut self, number: u64) {
        self.selected = Some(number);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Drops a block that left the scene.
    pub fn forget(&mut self, number: u64) {
        if self.selected == Some(number) {
            self.selected = None;
        }
    }
}

/// Gaze polling only runs while a `GazePoller` resource exists; the SDK
/// builder inserts one unless gaze is disabled.
pub fn picking_plugin(app: &mut App) {
    app.init_resource::<GazeState>()
        .init_resource::<Selection>()
        .add_event::<Tap>()
        .add_systems(
            Update,
            (
                gaze_poll_system.run_if(resource_exists::<GazePoller>),
                tap_select_system,
                dismiss_selection_system,
                highlight_system,
            )
                .chain(),
        )
        .add_systems(Last, stop_gaze_on_exit);
}

fn gaze_poll_system(
    time: Res<Time>,
    mut poller: ResMut<GazePoller>,
    cameras: Query<&GlobalTransform, With<Camera3d>>,
    nav: Res<NavigationState>,
    cubes: Query<&BlockCube>,
    mut gaze: ResMut<GazeState>,
) {
    if !poller.poll_due(time.delta()) {
        return;
    }
    let Ok(camera) = cameras.get_single() else {
        return;
    };
    let Ok(ray) = Ray::new(camera.translation(), *camera.forward()) else {
        return;
    };

    let hit = resolve(&ray, cubes.iter().map(|c| (c.number, c.volume)), nav.offset).map(|h| h.id);
    // Avoid touching the resource when nothing changed.
    if hit == gaze.looked_at() {
        return;
    }
    if let Some(change) = gaze.observe(hit) {
        debug!("strata: gaze {change:?}");
    }
}

fn tap_select_system(
    mut taps: EventReader<Tap>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    nav: Res<NavigationState>,
    cubes: Query<&BlockCube>,
    gaze: Res<GazeState>,
    mut selection: ResMut<Selection>,
) {
    for tap in taps.read() {
        let pointer_hit = tap
            .cursor
            .and_then(|cursor| pointer_ray(&cameras, cursor))
            .and_then(|ray| {
                resolve(&ray, cubes.iter().map(|c| (c.number, c.volume)), nav.offset)
            })
            .map(|hit| hit.id);

        match pointer_hit.or(gaze.looked_at()) {
            Some(number) => match selection.toggle(number) {
                Some(selected) => info!("strata: selected block {selected}"),
                None => info!("strata: deselected block {number}"),
            },
            None => debug!("strata: tap hit nothing"),
        }
    }
}

fn pointer_ray(
    cameras: &Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    cursor: Vec2,
) -> Option<Ray> {
    let (camera, transform) = cameras.get_single().ok()?;
    let ray = camera.viewport_to_world(transform, cursor).ok()?;
    Ray::new(ray.origin, *ray.direction).ok()
}

fn dismiss_selection_system(keys: Res<ButtonInput<KeyCode>>, mut selection: ResMut<Selection>) {
    if keys.just_pressed(KeyCode::Escape) && selection.selected().is_some() {
        selection.clear();
    }
}

fn highlight_system(
    gaze: Res<GazeState>,
    selection: Res<Selection>,
    mut cubes: Query<(
        &BlockCube,
        &BlockMaterials,
        &mut MeshMaterial3d<StandardMaterial>,
    )>,
) {
    for (cube, materials, mut current) in &mut cubes {
        let wanted = materials.for_state(
            gaze.looked_at() == Some(cube.number),
            selection.selected() == Some(cube.number),
        );
        if current.0 != *wanted {
            current.0 = wanted.clone();
        }
    }
}

/// Gaze polling ends with the app: stop the poller and drop it on `AppExit`.
fn stop_gaze_on_exit(
    mut commands: Commands,
    mut exits: EventReader<AppExit>,
    poller: Option<ResMut<GazePoller>>,
) {
    if exits.read().next().is_none() {
        return;
    }
    if let Some(mut poller) = poller {
        poller.stop();
        commands.remove_resource::<GazePoller>();
        info!("strata: gaze polling stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::geometry::BoundingVolume;

    #[test]
    fn reselecting_clears_selection() {
        let mut selection = Selection::default();
        assert_eq!(selection.toggle(4), Some(4));
        assert_eq!(selection.toggle(5), Some(5));
        assert_eq!(selection.toggle(5), None);
        assert_eq!(selection.selected(), None);
    }

    #[test]
    fn forgetting_other_blocks_keeps_selection() {
        let mut selection = Selection::default();
        selection.toggle(2);
        selection.forget(3);
        assert_eq!(selection.selected(), Some(2));
        selection.forget(2);
        assert_eq!(selection.selected(), None);
    }

    fn gaze_app() -> App {
        let mut app = App::new();
        app.insert_resource(Time::<()>::default())
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<NavigationState>()
            .insert_resource(GazePoller::from_hz(10.0).unwrap())
            .add_plugins(picking_plugin);

        let eye = Vec3::new(0.0, 1.6, 0.0);
        app.world_mut().spawn((
            Camera3d::default(),
            GlobalTransform::from(
                Transform::from_translation(eye).looking_at(eye - Vec3::Z, Vec3::Y),
            ),
        ));
        app.world_mut().spawn(BlockCube {
            number: 42,
            tx_count: 10,
            timestamp: 0,
            volume: BoundingVolume::from_edge(Vec3::new(0.0, 1.6, -0.6), 0.18).unwrap(),
            packed_with: None,
        });
        app
    }

    fn step(app: &mut App, millis: u64) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(millis));
        app.update();
    }

    #[test]
    fn gaze_follows_scene_offset() {
        let mut app = gaze_app();
        step(&mut app, 150);
        assert_eq!(app.world().resource::<GazeState>().looked_at(), Some(42));

        app.world_mut().resource_mut::<NavigationState>().offset = Vec3::new(1.0, 0.0, 0.0);
        step(&mut app, 150);
        assert_eq!(app.world().resource::<GazeState>().looked_at(), None);
    }

    #[test]
    fn pinch_tap_selects_gazed_block_and_toggles() {
        let mut app = gaze_app();
        step(&mut app, 150);

        app.world_mut().send_event(Tap { cursor: None });
        step(&mut app, 10);
        assert_eq!(app.world().resource::<Selection>().selected(), Some(42));

        app.world_mut().send_event(Tap { cursor: None });
        step(&mut app, 10);
        assert_eq!(app.world().resource::<Selection>().selected(), None);
    }

    #[test]
    fn exit_stops_and_removes_poller() {
        let mut app = gaze_app();
        app.world_mut().send_event(AppExit::Success);
        app.update();
        assert!(app.world().get_resource::<GazePoller>().is_none());

        // Gaze stays put once polling is gone.
        step(&mut app, 500);
        assert_eq!(app.world().resource::<GazeState>().looked_at(), None);
    }
}
