//! Momentum scene translation: drag moves the scene in x/y, pinch moves it in
//! depth, and releasing either lets it coast to rest under exponential
//! friction.
//!
//! The controller holds only tuning; every call takes the `NavigationState`
//! it mutates, so the same logic drives the ECS systems and plain unit tests.

use bevy::math::{Vec2, Vec3};
use bevy::prelude::Resource;

use crate::error::NavigationError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    /// A drag or pinch is in progress.
    Active,
    /// Coasting on release velocity.
    Decelerating,
}

/// Scene navigation for one session. `offset` is the scene-root translation.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct NavigationState {
    pub offset: Vec3,
    pub velocity: Vec3,
    phase: Phase,
    last_drag: Vec2,
    last_magnification: f32,
    last_depth_delta: f32,
    last_depth_time: f64,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            velocity: Vec3::ZERO,
            phase: Phase::Idle,
            last_drag: Vec2::ZERO,
            last_magnification: 1.0,
            last_depth_delta: 0.0,
            last_depth_time: 0.0,
        }
    }
}

impl NavigationState {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_interacting(&self) -> bool {
        self.phase != Phase::Idle
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NavigationSettings {
    /// World units per pointer unit of drag.
    pub drag_scale: f32,
    /// World units/s per pointer unit/s of drag release velocity.
    pub release_velocity_scale: f32,
    /// Depth per unit of magnification change.
    pub pinch_scale: f32,
    /// Gain applied to the last pinch sample's velocity at release.
    pub pinch_release_gain: f32,
    pub max_depth_velocity: f32,
    /// Floor on the time between the last pinch sample and release, seconds.
    pub min_release_interval: f64,
    pub friction_per_tick: f32,
    pub tick_interval: f32,
    /// Coasting stops once |vx| + |vy| + |vz| falls below this.
    pub stop_epsilon: f32,
    /// Resting offsets are rounded to multiples of this.
    pub snap_step: f32,
    /// World point a focused block is brought to, on the default gaze ray.
    pub focus_point: Vec3,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            drag_scale: 0.0016,
            release_velocity_scale: 0.0005,
            pinch_scale: 1.5,
            pinch_release_gain: 1.5,
            max_depth_velocity: 0.8,
            min_release_interval: 0.008,
            friction_per_tick: 0.992,
            tick_interval: 1.0 / 120.0,
            stop_epsilon: 1e-6,
            snap_step: 1e-4,
            focus_point: Vec3::new(0.0, 1.6, -0.8),
        }
    }
}

impl NavigationSettings {
    pub fn with_tick_hz(mut self, hz: f32) -> Self {
        self.tick_interval = 1.0 / hz;
        self
    }

    pub fn validate(&self) -> Result<(), NavigationError> {
        if !(self.friction_per_tick > 0.0 && self.friction_per_tick < 1.0) {
            return Err(NavigationError::Friction(self.friction_per_tick));
        }
        if !(self.tick_interval > 0.0) {
            return Err(NavigationError::TickInterval(self.tick_interval));
        }
        if !(self.snap_step > 0.0) {
            return Err(NavigationError::SnapStep(self.snap_step));
        }
        if !self.focus_point.is_finite() {
            return Err(NavigationError::FocusPoint(self.focus_point.to_array()));
        }
        Ok(())
    }
}

#[derive(Resource, Clone, Debug, Default)]
pub struct NavigationController {
    settings: NavigationSettings,
}

impl NavigationController {
    pub fn new(settings: NavigationSettings) -> Result<Self, NavigationError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    /// Drag update carrying the gesture's cumulative translation since it
    /// began. Only the change since the previous update is applied.
    pub fn drag(&self, state: &mut NavigationState, cumulative: Vec2) {
        self.preempt(state);

        let delta = cumulative - state.last_drag;
        state.last_drag = cumulative;

        state.offset.x += delta.x * self.settings.drag_scale;
        // Screen y grows downward; world y grows upward.
        state.offset.y -= delta.y * self.settings.drag_scale;
    }

    /// Drag release with the platform-reported velocity in pointer units/s.
    pub fn end_drag(&self, state: &mut NavigationState, release_velocity: Vec2) {
        state.last_drag = Vec2::ZERO;
        let scale = self.settings.release_velocity_scale;
        self.start_momentum(
            state,
            Vec3::new(release_velocity.x * scale, -release_velocity.y * scale, 0.0),
        );
    }

    /// Pinch update with the gesture's current magnification (1.0 at start).
    /// Pinching in (magnification falling) pulls the scene closer.
    pub fn pinch(&self, state: &mut NavigationState, magnification: f32, now: f64) {
        self.preempt(state);

        let delta = (state.last_magnification - magnification) * self.settings.pinch_scale;
        state.last_magnification = magnification;

        state.offset.z += delta;
        state.last_depth_delta = delta;
        state.last_depth_time = now;
    }

    /// Pinch release: coast in depth at the last sample's velocity, bounded
    /// so a single noisy sample cannot fling the scene.
    pub fn end_pinch(&self, state: &mut NavigationState, now: f64) {
        state.last_magnification = 1.0;

        let s = &self.settings;
        let elapsed = (now - state.last_depth_time).max(s.min_release_interval) as f32;
        let vz = (state.last_depth_delta / elapsed * s.pinch_release_gain)
            .clamp(-s.max_depth_velocity, s.max_depth_velocity);
        state.last_depth_delta = 0.0;

        let velocity = Vec3::new(state.velocity.x, state.velocity.y, vz);
        self.start_momentum(state, velocity);
    }

    pub fn start_momentum(&self, state: &mut NavigationState, velocity: Vec3) {
        state.velocity = velocity;
        state.phase = Phase::Decelerating;
    }

    /// One fixed-rate momentum step. Does nothing unless coasting.
    pub fn tick(&self, state: &mut NavigationState) -> Phase {
        if state.phase != Phase::Decelerating {
            return state.phase;
        }

        let s = &self.settings;
        state.offset += state.velocity * s.tick_interval;
        state.velocity *= s.friction_per_tick;

        if state.velocity.abs().element_sum() < s.stop_epsilon {
            state.offset = snap(state.offset, s.snap_step);
            state.velocity = Vec3::ZERO;
            state.phase = Phase::Idle;
        }
        state.phase
    }

    /// Returns the scene to its home offset, dropping any momentum.
    pub fn reset(&self, state: &mut NavigationState) {
        self.settle(state, Vec3::ZERO);
    }

    /// Moves the scene so `target`, in scene-root space, lands on the focus
    /// point.
    pub fn focus_on(&self, state: &mut NavigationState, target: Vec3) {
        self.settle(state, self.settings.focus_point - target);
    }

    fn settle(&self, state: &mut NavigationState, offset: Vec3) {
        state.offset = offset;
        state.velocity = Vec3::ZERO;
        state.last_depth_delta = 0.0;
        state.phase = Phase::Idle;
    }

    /// User input always wins over momentum.
    fn preempt(&self, state: &mut NavigationState) {
        state.velocity = Vec3::ZERO;
        state.phase = Phase::Active;
    }
}

fn snap(v: Vec3, step: f32) -> Vec3 {
    (v / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> NavigationController {
        NavigationController::default()
    }

    fn run_to_rest(controller: &NavigationController, state: &mut NavigationState) -> usize {
        let mut ticks = 0;
        while controller.tick(state) == Phase::Decelerating {
            ticks += 1;
            assert!(ticks < 100_000, "momentum never converged");
        }
        ticks
    }

    #[test]
    fn drag_applies_per_update_deltas() {
        let c = controller();
        let mut state = NavigationState::default();

        c.drag(&mut state, Vec2::new(10.0, 0.0));
        assert!((state.offset.x - 10.0 * 0.0016).abs() < 1e-7);

        c.drag(&mut state, Vec2::new(25.0, 0.0));
        assert!((state.offset.x - 25.0 * 0.0016).abs() < 1e-7);
        assert_eq!(state.phase(), Phase::Active);
    }

    #[test]
    fn upward_drag_moves_scene_up_and_never_in_depth() {
        let c = controller();
        let mut state = NavigationState::default();
        c.drag(&mut state, Vec2::new(0.0, -100.0));
        assert!(state.offset.y > 0.0);
        assert_eq!(state.offset.z, 0.0);
    }

    #[test]
    fn drag_release_flips_y_velocity() {
        let c = controller();
        let mut state = NavigationState::default();
        c.drag(&mut state, Vec2::new(5.0, 5.0));
        c.end_drag(&mut state, Vec2::new(400.0, 200.0));

        assert_eq!(state.phase(), Phase::Decelerating);
        assert!((state.velocity - Vec3::new(0.2, -0.1, 0.0)).length() < 1e-6);

        // A fresh drag starts from zero again rather than the old cumulative value.
        c.drag(&mut state, Vec2::new(1.0, 0.0));
        assert!((state.offset.x - 6.0 * 0.0016).abs() < 1e-6);
    }

    #[test]
    fn pinch_in_pulls_scene_closer() {
        let c = controller();
        let mut state = NavigationState::default();
        c.pinch(&mut state, 0.8, 0.0);
        assert!((state.offset.z - 0.3).abs() < 1e-6);
        c.pinch(&mut state, 0.7, 0.016);
        assert!((state.offset.z - 0.45).abs() < 1e-6);
    }

    #[test]
    fn pinch_release_velocity_is_clamped() {
        let c = controller();
        let mut state = NavigationState::default();
        c.pinch(&mut state, 0.2, 1.0);
        c.end_pinch(&mut state, 1.0);
        assert_eq!(state.velocity.z, 0.8);

        let mut state = NavigationState::default();
        c.pinch(&mut state, 1.01, 2.0);
        c.end_pinch(&mut state, 2.1);
        // -0.015 over 0.1 s with gain 1.5.
        assert!((state.velocity.z + 0.225).abs() < 1e-5);
    }

    #[test]
    fn pinch_release_resets_baseline() {
        let c = controller();
        let mut state = NavigationState::default();
        c.pinch(&mut state, 1.5, 0.0);
        c.end_pinch(&mut state, 0.1);
        let z = state.offset.z;
        c.pinch(&mut state, 1.0, 0.2);
        assert_eq!(state.offset.z, z);
    }

    #[test]
    fn momentum_converges_and_snaps() {
        let settings = NavigationSettings {
            friction_per_tick: 0.99,
            ..NavigationSettings::default()
        };
        let c = NavigationController::new(settings.clone()).unwrap();
        let mut state = NavigationState::default();
        c.start_momentum(&mut state, Vec3::X);

        run_to_rest(&c, &mut state);

        let expected = 1.0 / (1.0 - 0.99) * settings.tick_interval;
        assert!((state.offset.x - expected).abs() < 1e-3);
        let step = settings.snap_step;
        assert_eq!((state.offset.x / step).round() * step, state.offset.x);
        assert_eq!(state.velocity, Vec3::ZERO);
        assert!(!state.is_interacting());
    }

    #[test]
    fn new_drag_cancels_momentum_before_moving() {
        let c = controller();
        let mut state = NavigationState::default();
        c.start_momentum(&mut state, Vec3::new(1.0, 1.0, 0.0));
        c.tick(&mut state);
        let before = state.offset;

        c.drag(&mut state, Vec2::new(10.0, 0.0));
        assert_eq!(state.velocity, Vec3::ZERO);
        assert_eq!(state.phase(), Phase::Active);
        assert!((state.offset.x - (before.x + 0.016)).abs() < 1e-6);
        assert_eq!(state.offset.y, before.y);

        // Ticks are inert while the user holds the scene.
        assert_eq!(c.tick(&mut state), Phase::Active);
        assert!((state.offset.x - (before.x + 0.016)).abs() < 1e-6);
    }

    #[test]
    fn pinch_cancels_momentum_before_moving() {
        let c = controller();
        let mut state = NavigationState::default();
        c.start_momentum(&mut state, Vec3::new(0.2, 0.0, 0.5));
        c.tick(&mut state);
        let before = state.offset;

        c.pinch(&mut state, 0.9, 1.0);
        assert_eq!(state.velocity, Vec3::ZERO);
        assert_eq!(state.phase(), Phase::Active);
        let expected = 0.1 * c.settings().pinch_scale;
        assert!((state.offset.z - before.z - expected).abs() < 1e-6);
        assert_eq!(state.offset.x, before.x);
        assert_eq!(c.tick(&mut state), Phase::Active);
    }

    #[test]
    fn reset_stops_a_fling_and_returns_home() {
        let c = controller();
        let mut state = NavigationState::default();
        c.drag(&mut state, Vec2::new(300.0, -120.0));
        c.end_drag(&mut state, Vec2::new(2_000.0, 0.0));
        for _ in 0..30 {
            c.tick(&mut state);
        }
        assert_ne!(state.offset, Vec3::ZERO);

        c.reset(&mut state);
        assert_eq!(state.offset, Vec3::ZERO);
        assert_eq!(state.velocity, Vec3::ZERO);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(c.tick(&mut state), Phase::Idle);
        assert_eq!(state.offset, Vec3::ZERO);
    }

    #[test]
    fn focus_brings_target_to_focus_point() {
        let c = controller();
        let mut state = NavigationState::default();
        c.pinch(&mut state, 0.5, 0.0);
        c.end_pinch(&mut state, 0.01);
        assert_eq!(state.phase(), Phase::Decelerating);

        let target = Vec3::new(1.2, 1.0, -1.4);
        c.focus_on(&mut state, target);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.velocity, Vec3::ZERO);
        assert!((target + state.offset - c.settings().focus_point).length() < 1e-6);

        // A later release does not resurrect the pre-focus pinch velocity.
        c.end_pinch(&mut state, 0.5);
        assert_eq!(state.velocity.z, 0.0);
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let c = controller();
        let mut state = NavigationState::default();
        assert_eq!(c.tick(&mut state), Phase::Idle);
        assert_eq!(state, NavigationState::default());
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad = NavigationSettings {
            friction_per_tick: 1.0,
            ..NavigationSettings::default()
        };
        assert_eq!(
            NavigationController::new(bad).unwrap_err(),
            NavigationError::Friction(1.0)
        );
        let bad = NavigationSettings {
            tick_interval: 0.0,
            ..NavigationSettings::default()
        };
        assert!(matches!(
            NavigationController::new(bad),
            Err(NavigationError::TickInterval(_))
        ));
    }
}
