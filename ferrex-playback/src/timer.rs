//! Restartable single-shot timers.
//!
//! A [`PokeTimer`] never calls back into its owner directly. Each poke spawns
//! a sleeping task that posts a [`TimerFired`] message onto the owner's
//! channel; the owner hands that message back through
//! [`PokeTimer::acknowledge`], which only accepts the fire belonging to the
//! currently armed generation. A fire that was already queued when the timer
//! got re-poked or stopped is therefore dropped instead of hiding UI early.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Identifies which timer a fire message belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKind {
    OverlayAutoHide,
    JumpWindow,
}

/// Message posted when an armed timer expires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerFired {
    pub timer: TimerKind,
    pub generation: u64,
}

/// Cancellable token for one scheduled fire. Dropping it aborts the
/// sleeping task.
pub struct TimerHandle {
    generation: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

impl TimerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("generation", &self.generation)
            .field("deadline", &self.deadline)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Single-shot countdown that can be re-armed ("poked") at any time.
///
/// Must be driven from inside a tokio runtime.
#[derive(Debug)]
pub struct PokeTimer {
    kind: TimerKind,
    default_interval: Duration,
    armed: Option<TimerHandle>,
    generation: u64,
    fired_tx: UnboundedSender<TimerFired>,
}

impl PokeTimer {
    pub fn new(
        kind: TimerKind,
        default_interval: Duration,
        fired_tx: UnboundedSender<TimerFired>,
    ) -> Self {
        Self {
            kind,
            default_interval,
            armed: None,
            generation: 0,
            fired_tx,
        }
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    pub fn default_interval(&self) -> Duration {
        self.default_interval
    }

    /// Re-arm with the default interval.
    pub fn poke(&mut self) {
        self.poke_with(self.default_interval);
    }

    /// Cancel any pending fire and schedule a new one `interval` from now.
    pub fn poke_with(&mut self, interval: Duration) {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let deadline = Instant::now() + interval;
        let fired = TimerFired {
            timer: self.kind,
            generation,
        };
        let tx = self.fired_tx.clone();

        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            // Owner gone means the session ended; nothing to notify.
            let _ = tx.send(fired);
        });

        trace!(timer = ?self.kind, generation, ?interval, "timer poked");
        // Replacing the handle aborts the previous sleeper.
        self.armed = Some(TimerHandle {
            generation,
            deadline,
            task,
        });
    }

    /// Cancel the pending fire, if any. No notification is delivered.
    pub fn stop(&mut self) {
        if let Some(handle) = self.armed.take() {
            trace!(
                timer = ?self.kind,
                generation = handle.generation,
                "timer stopped"
            );
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed.as_ref().map(TimerHandle::deadline)
    }

    /// Accept a fire message. Returns `true` exactly once per armed
    /// generation; stale or foreign fires return `false`.
    pub fn acknowledge(&mut self, fired: TimerFired) -> bool {
        if fired.timer != self.kind {
            return false;
        }
        match &self.armed {
            Some(handle) if handle.generation == fired.generation => {
                self.armed = None;
                true
            }
            _ => {
                trace!(
                    timer = ?self.kind,
                    generation = fired.generation,
                    "discarding stale timer fire"
                );
                false
            }
        }
    }
}
