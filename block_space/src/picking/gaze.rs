//! Gaze tracking state and the fixed-rate poll that drives it.

use std::time::Duration;

use bevy::prelude::*;

use crate::config::check_gaze_poll_hz;
use crate::error::ConfigError;

/// Block number currently under the gaze ray, if any.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct GazeState {
    looked_at: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeChange {
    Entered(u64),
    Moved { from: u64, to: u64 },
    Cleared(u64),
}

impl GazeState {
    pub fn looked_at(&self) -> Option<u64> {
        self.looked_at
    }

    /// Records the latest resolved block. Repeated hits on the same block
    /// report nothing so highlights are not re-triggered every poll.
    pub fn observe(&mut self, resolved: Option<u64>) -> Option<GazeChange> {
        let change = match (self.looked_at, resolved) {
            (None, Some(id)) => GazeChange::Entered(id),
            (Some(from), Some(to)) if from != to => GazeChange::Moved { from, to },
            (Some(from), None) => GazeChange::Cleared(from),
            _ => return None,
        };
        self.looked_at = resolved;
        Some(change)
    }

    /// Drops a block that left the scene.
    pub fn forget(&mut self, number: u64) {
        if self.looked_at == Some(number) {
            self.looked_at = None;
        }
    }
}

/// Fixed-interval gaze poll with an explicit lifecycle. A stopped poller never
/// fires until it is started again.
#[derive(Resource, Debug)]
pub struct GazePoller {
    timer: Timer,
    running: bool,
}

impl GazePoller {
    pub fn from_hz(hz: f32) -> Result<Self, ConfigError> {
        let hz = check_gaze_poll_hz(hz)?;
        Ok(Self {
            timer: Timer::from_seconds(1.0 / hz, TimerMode::Repeating),
            running: true,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start(&mut self) {
        self.timer.reset();
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.timer.reset();
    }

    /// Advances the timer and reports whether a poll is due. Several missed
    /// intervals still collapse into one poll.
    pub fn poll_due(&mut self, delta: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.timer.tick(delta).just_finished()
    }
}
