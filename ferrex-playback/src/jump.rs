use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;
use tracing::debug;

use crate::timer::{PokeTimer, TimerFired, TimerKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpDirection {
    Forward,
    Backward,
}

/// Current accumulation burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JumpState {
    pub pending_count: u32,
    pub direction: JumpDirection,
    pub window_deadline: Instant,
}

impl JumpState {
    fn idle(direction: JumpDirection, window_deadline: Instant) -> Self {
        Self {
            pending_count: 0,
            direction,
            window_deadline,
        }
    }

    pub fn is_active(&self) -> bool {
        self.pending_count > 0
    }

    /// Total seek distance represented by the burst.
    pub fn total(&self, per_jump: Duration) -> Duration {
        per_jump.saturating_mul(self.pending_count)
    }
}

/// Merges repeated jumps in one direction into a single running count.
///
/// A burst closes when its window elapses without another jump, or
/// immediately when the direction flips. The accumulator has no idea how far
/// a jump seeks; callers multiply `pending_count` by their own interval.
#[derive(Debug)]
pub struct JumpAccumulator {
    state: JumpState,
    default_window: Duration,
    timer: PokeTimer,
}

impl JumpAccumulator {
    pub fn new(default_window: Duration, fired_tx: UnboundedSender<TimerFired>) -> Self {
        Self {
            state: JumpState::idle(JumpDirection::Forward, Instant::now() + default_window),
            default_window,
            timer: PokeTimer::new(TimerKind::JumpWindow, default_window, fired_tx),
        }
    }

    pub fn state(&self) -> JumpState {
        self.state
    }

    pub fn pending_count(&self) -> u32 {
        self.state.pending_count
    }

    pub fn direction(&self) -> JumpDirection {
        self.state.direction
    }

    pub fn jump_forward(&mut self) -> JumpState {
        self.jump(JumpDirection::Forward, self.default_window)
    }

    pub fn jump_backward(&mut self) -> JumpState {
        self.jump(JumpDirection::Backward, self.default_window)
    }

    pub fn jump_forward_within(&mut self, window: Duration) -> JumpState {
        self.jump(JumpDirection::Forward, window)
    }

    pub fn jump_backward_within(&mut self, window: Duration) -> JumpState {
        self.jump(JumpDirection::Backward, window)
    }

    pub fn jump(&mut self, direction: JumpDirection, window: Duration) -> JumpState {
        let now = Instant::now();
        let continues = self.state.is_active()
            && self.state.direction == direction
            && now < self.state.window_deadline;

        if continues {
            self.state.pending_count = self.state.pending_count.saturating_add(1);
        } else {
            self.state.pending_count = 1;
            self.state.direction = direction;
        }
        self.state.window_deadline = now + window;
        self.timer.poke_with(window);

        self.state
    }

    /// Close the burst when its window timer fires. Returns `false` for fires
    /// that belong to an older window.
    pub fn on_timer_fired(&mut self, fired: TimerFired) -> bool {
        if !self.timer.acknowledge(fired) {
            return false;
        }
        debug!(
            direction = ?self.state.direction,
            count = self.state.pending_count,
            "jump burst closed"
        );
        self.state = JumpState::idle(self.state.direction, Instant::now() + self.default_window);
        true
    }

    /// Drop the current burst without waiting for the window.
    pub fn reset(&mut self) {
        self.timer.stop();
        self.state = JumpState::idle(self.state.direction, Instant::now() + self.default_window);
    }
}
