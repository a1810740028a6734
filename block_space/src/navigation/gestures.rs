//! Desktop gesture adapters: left-drag pans, wheel or trackpad pinch moves in
//! depth, and a click without travel is a tap. `Home`/`R` return the scene
//! home and `N` jumps to the newest block.

use bevy::input::gestures::PinchGesture;
use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::navigation::controller::{NavigationController, NavigationState};
use crate::picking::Selection;
use crate::scene::BlockCube;

/// Pointer travel (logical pixels) below which a press-release is a tap.
const TAP_SLOP: f32 = 4.0;
const VELOCITY_SMOOTHING: f32 = 0.5;
/// Magnification change per wheel line; wheel forward pulls the scene closer.
const WHEEL_STEP: f32 = 0.1;
const PIXELS_PER_LINE: f32 = 100.0;
/// A pinch ends once no input has arrived for this long.
const PINCH_IDLE_SECS: f64 = 0.15;
/// Pinches ending this close to their starting magnification count as taps.
const PINCH_TAP_TOLERANCE: f32 = 0.1;

/// A discrete selection gesture. `cursor` is the pointer position when the
/// tap came from the mouse; pinch taps carry none and fall back to gaze.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub cursor: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelease {
    Tap,
    Fling(Vec2),
}

/// Turns raw cursor samples into the cumulative translation and release
/// velocity a drag gesture reports.
#[derive(Resource, Debug, Default)]
pub struct DragTracker {
    anchor: Option<Vec2>,
    last_cursor: Vec2,
    velocity: Vec2,
    travelled: f32,
}

impl DragTracker {
    pub fn press(&mut self, cursor: Vec2) {
        self.anchor = Some(cursor);
        self.last_cursor = cursor;
        self.velocity = Vec2::ZERO;
        self.travelled = 0.0;
    }

    pub fn is_pressed(&self) -> bool {
        self.anchor.is_some()
    }

    /// Feeds a cursor sample taken `dt` seconds after the previous one and
    /// returns the translation since the press.
    pub fn motion(&mut self, cursor: Vec2, dt: f32) -> Option<Vec2> {
        let anchor = self.anchor?;
        let step = cursor - self.last_cursor;
        self.travelled += step.length();
        if dt > 0.0 {
            self.velocity = self.velocity.lerp(step / dt, VELOCITY_SMOOTHING);
        }
        self.last_cursor = cursor;
        Some(cursor - anchor)
    }

    pub fn release(&mut self) -> Option<DragRelease> {
        self.anchor.take()?;
        if self.travelled < TAP_SLOP {
            Some(DragRelease::Tap)
        } else {
            Some(DragRelease::Fling(self.velocity))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchRelease {
    pub is_tap: bool,
}

/// Accumulates wheel and pinch deltas into a gesture magnification that
/// starts at 1.0, and decides when the gesture is over.
#[derive(Resource, Debug)]
pub struct PinchTracker {
    magnification: f32,
    last_input: Option<f64>,
}

impl Default for PinchTracker {
    fn default() -> Self {
        Self {
            magnification: 1.0,
            last_input: None,
        }
    }
}

impl PinchTracker {
    pub fn accumulate(&mut self, delta: f32, now: f64) -> f32 {
        self.magnification += delta;
        self.last_input = Some(now);
        self.magnification
    }

    pub fn finish(&mut self, now: f64) -> Option<PinchRelease> {
        let last = self.last_input?;
        if now - last < PINCH_IDLE_SECS {
            return None;
        }
        let is_tap = (self.magnification - 1.0).abs() < PINCH_TAP_TOLERANCE;
        *self = Self::default();
        Some(PinchRelease { is_tap })
    }
}

pub(crate) fn drag_input_system(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    time: Res<Time>,
    controller: Res<NavigationController>,
    mut state: ResMut<NavigationState>,
    mut tracker: ResMut<DragTracker>,
    mut taps: EventWriter<Tap>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let cursor = window.cursor_position();

    if mouse.just_pressed(MouseButton::Left) {
        if let Some(cursor) = cursor {
            tracker.press(cursor);
        }
    }

    if mouse.pressed(MouseButton::Left) {
        let cumulative = cursor.and_then(|c| tracker.motion(c, time.delta_secs()));
        if let Some(cumulative) = cumulative {
            controller.drag(&mut state, cumulative);
        }
    }

    if mouse.just_released(MouseButton::Left) {
        match tracker.release() {
            Some(DragRelease::Tap) => {
                controller.end_drag(&mut state, Vec2::ZERO);
                taps.send(Tap { cursor });
            }
            Some(DragRelease::Fling(velocity)) => {
                debug!("drag released at {velocity:?} px/s");
                controller.end_drag(&mut state, velocity);
            }
            None => {}
        }
    }
}

pub(crate) fn pinch_input_system(
    mut wheel: EventReader<MouseWheel>,
    mut pinches: EventReader<PinchGesture>,
    time: Res<Time>,
    controller: Res<NavigationController>,
    mut state: ResMut<NavigationState>,
    mut tracker: ResMut<PinchTracker>,
    mut taps: EventWriter<Tap>,
) {
    let now = time.elapsed_secs_f64();

    let mut delta = 0.0;
    for event in wheel.read() {
        let lines = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / PIXELS_PER_LINE,
        };
        delta -= lines * WHEEL_STEP;
    }
    for PinchGesture(amount) in pinches.read() {
        delta += *amount;
    }

    if delta != 0.0 {
        let magnification = tracker.accumulate(delta, now);
        controller.pinch(&mut state, magnification, now);
    } else if let Some(release) = tracker.finish(now) {
        controller.end_pinch(&mut state, now);
        if release.is_tap {
            taps.send(Tap { cursor: None });
        }
    }
}

pub(crate) fn navigation_keys_system(
    keys: Res<ButtonInput<KeyCode>>,
    controller: Res<NavigationController>,
    mut state: ResMut<NavigationState>,
    cubes: Query<&BlockCube>,
    selection: Option<ResMut<Selection>>,
) {
    if keys.any_just_pressed([KeyCode::Home, KeyCode::KeyR]) {
        controller.reset(&mut state);
        info!("strata: navigation reset");
    }
    if keys.just_pressed(KeyCode::KeyN) {
        let Some(newest) = cubes.iter().max_by_key(|cube| cube.number) else {
            return;
        };
        controller.focus_on(&mut state, newest.volume.center);
        if let Some(mut selection) = selection {
            selection.select(newest.number);
        }
        info!("strata: focused block {}", newest.number);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::geometry::BoundingVolume;
    use crate::navigation::{navigation_plugin, Phase};

    #[test]
    fn short_press_is_a_tap() {
        let mut tracker = DragTracker::default();
        tracker.press(Vec2::new(100.0, 100.0));
        tracker.motion(Vec2::new(101.0, 101.0), 0.016);
        assert_eq!(tracker.release(), Some(DragRelease::Tap));
        assert!(!tracker.is_pressed());
    }

    #[test]
    fn drag_reports_cumulative_translation_and_velocity() {
        let mut tracker = DragTracker::default();
        tracker.press(Vec2::ZERO);
        assert_eq!(
            tracker.motion(Vec2::new(10.0, 0.0), 0.01),
            Some(Vec2::new(10.0, 0.0))
        );
        assert_eq!(
            tracker.motion(Vec2::new(25.0, 0.0), 0.01),
            Some(Vec2::new(25.0, 0.0))
        );
        match tracker.release() {
            Some(DragRelease::Fling(velocity)) => assert!(velocity.x > 0.0),
            other => panic!("expected fling, got {other:?}"),
        }
    }

    #[test]
    fn motion_without_press_is_ignored() {
        let mut tracker = DragTracker::default();
        assert_eq!(tracker.motion(Vec2::ONE, 0.016), None);
        assert_eq!(tracker.release(), None);
    }

    #[test]
    fn pinch_finishes_after_idle_gap() {
        let mut tracker = PinchTracker::default();
        assert_eq!(tracker.accumulate(-0.5, 1.0), 0.5);
        assert_eq!(tracker.finish(1.05), None);
        assert_eq!(tracker.finish(1.2), Some(PinchRelease { is_tap: false }));
        assert_eq!(tracker.finish(2.0), None);
    }

    #[test]
    fn barely_moved_pinch_is_a_tap() {
        let mut tracker = PinchTracker::default();
        tracker.accumulate(0.05, 0.0);
        assert_eq!(tracker.finish(0.5), Some(PinchRelease { is_tap: true }));
    }

    #[derive(Resource, Default)]
    struct SeenTaps(Vec<Tap>);

    fn record_taps(mut taps: EventReader<Tap>, mut seen: ResMut<SeenTaps>) {
        seen.0.extend(taps.read().copied());
    }

    fn input_app() -> App {
        let mut app = App::new();
        app.insert_resource(Time::<()>::default())
            .init_resource::<ButtonInput<MouseButton>>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<NavigationController>()
            .init_resource::<Selection>()
            .init_resource::<SeenTaps>()
            .add_event::<MouseWheel>()
            .add_event::<PinchGesture>()
            .add_plugins(navigation_plugin)
            .add_systems(PostUpdate, record_taps);
        app.world_mut().spawn((Window::default(), PrimaryWindow));
        app
    }

    fn step(app: &mut App, millis: u64) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(millis));
        app.update();
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .clear();
        app.world_mut().resource_mut::<ButtonInput<KeyCode>>().clear();
    }

    fn move_cursor(app: &mut App, position: Vec2) {
        let mut windows = app
            .world_mut()
            .query_filtered::<&mut Window, With<PrimaryWindow>>();
        windows
            .single_mut(app.world_mut())
            .set_cursor_position(Some(position));
    }

    fn press(app: &mut App) {
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
    }

    fn release(app: &mut App) {
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .release(MouseButton::Left);
    }

    fn nav(app: &App) -> &NavigationState {
        app.world().resource::<NavigationState>()
    }

    #[test]
    fn click_without_travel_sends_a_tap_and_settles() {
        let mut app = input_app();
        move_cursor(&mut app, Vec2::new(100.0, 100.0));
        press(&mut app);
        step(&mut app, 16);
        release(&mut app);
        step(&mut app, 16);

        let taps = &app.world().resource::<SeenTaps>().0;
        assert_eq!(
            taps.as_slice(),
            &[Tap {
                cursor: Some(Vec2::new(100.0, 100.0))
            }]
        );
        assert_eq!(nav(&app).velocity, Vec3::ZERO);

        app.world_mut().run_schedule(FixedUpdate);
        assert_eq!(nav(&app).phase(), Phase::Idle);
        assert_eq!(nav(&app).offset, Vec3::ZERO);
    }

    #[test]
    fn fling_moves_the_scene_and_coasts() {
        let mut app = input_app();
        move_cursor(&mut app, Vec2::new(100.0, 100.0));
        press(&mut app);
        step(&mut app, 16);
        for x in [140.0, 180.0, 220.0] {
            move_cursor(&mut app, Vec2::new(x, 100.0));
            step(&mut app, 16);
        }
        assert_eq!(nav(&app).phase(), Phase::Active);
        assert!(nav(&app).offset.x > 0.0);

        release(&mut app);
        step(&mut app, 16);
        assert!(app.world().resource::<SeenTaps>().0.is_empty());
        assert_eq!(nav(&app).phase(), Phase::Decelerating);
        assert!(nav(&app).velocity.x > 0.0);
    }

    #[test]
    fn wheel_then_idle_gap_ends_the_pinch() {
        let mut app = input_app();
        step(&mut app, 16);
        app.world_mut().send_event(MouseWheel {
            unit: MouseScrollUnit::Line,
            x: 0.0,
            y: 3.0,
            window: Entity::PLACEHOLDER,
        });
        step(&mut app, 16);
        assert_eq!(nav(&app).phase(), Phase::Active);
        // Wheel forward pulls the scene closer.
        assert!(nav(&app).offset.z > 0.0);

        step(&mut app, 50);
        assert_eq!(nav(&app).phase(), Phase::Active);
        step(&mut app, 200);
        assert_eq!(nav(&app).phase(), Phase::Decelerating);
        assert!(app.world().resource::<SeenTaps>().0.is_empty());
    }

    #[test]
    fn home_key_resets_and_n_focuses_newest_block() {
        let mut app = input_app();
        let blocks = [
            (7u64, Vec3::new(0.5, 1.0, -1.4)),
            (9, Vec3::new(1.1, 1.0, -1.4)),
        ];
        for (number, center) in blocks {
            app.world_mut().spawn(BlockCube {
                number,
                tx_count: 1,
                timestamp: 0,
                volume: BoundingVolume::from_edge(center, 0.18).unwrap(),
                packed_with: None,
            });
        }
        {
            let controller = app.world().resource::<NavigationController>().clone();
            let mut state = app.world_mut().resource_mut::<NavigationState>();
            controller.start_momentum(&mut state, Vec3::new(0.4, 0.0, 0.0));
        }

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyN);
        step(&mut app, 16);
        let focus = app.world().resource::<NavigationController>().settings().focus_point;
        assert_eq!(nav(&app).phase(), Phase::Idle);
        assert!((Vec3::new(1.1, 1.0, -1.4) + nav(&app).offset - focus).length() < 1e-6);
        assert_eq!(app.world().resource::<Selection>().selected(), Some(9));

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Home);
        step(&mut app, 16);
        assert_eq!(nav(&app).offset, Vec3::ZERO);
        assert_eq!(nav(&app).phase(), Phase::Idle);
    }
}
