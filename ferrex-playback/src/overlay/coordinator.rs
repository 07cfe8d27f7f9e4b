use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc::UnboundedSender, watch};
use tracing::{debug, trace};

use super::state::{Presentation, PresentationState, SupplementId};
use crate::config::OverlayConfig;
use crate::timer::{PokeTimer, TimerFired, TimerKind};

/// Result of handing an auto-hide timer fire to the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoHideOutcome {
    /// The fire belonged to a timer generation that was already replaced.
    Stale,
    /// Scrubbing, a drawer, or a paused player kept the overlay up.
    Held,
    Hidden { fade: Duration },
}

/// Owns [`PresentationState`] and the overlay auto-hide timer.
///
/// All transitions are idempotent; invalid ones are silent no-ops. Each
/// mutator returns whether the state changed.
pub struct OverlayCoordinator {
    state: PresentationState,
    timer: PokeTimer,
    fade_out: Duration,
    /// Continuous gestures currently holding auto-hide.
    interactions: u32,
    snapshots: watch::Sender<Presentation>,
}

impl fmt::Debug for OverlayCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlayCoordinator")
            .field("state", &self.state)
            .field("auto_hide_armed", &self.timer.is_armed())
            .field("interactions", &self.interactions)
            .field("observers", &self.snapshots.receiver_count())
            .finish()
    }
}

impl OverlayCoordinator {
    pub fn new(config: &OverlayConfig, fired_tx: UnboundedSender<TimerFired>) -> Self {
        let state = PresentationState::default();
        let (snapshots, _) = watch::channel(Presentation::new(state.clone(), None));
        Self {
            state,
            timer: PokeTimer::new(TimerKind::OverlayAutoHide, config.auto_hide(), fired_tx),
            fade_out: config.fade_out(),
            interactions: 0,
            snapshots,
        }
    }

    pub fn state(&self) -> &PresentationState {
        &self.state
    }

    pub fn presentation(&self) -> Presentation {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Presentation> {
        self.snapshots.subscribe()
    }

    pub fn controls_visible(&self) -> bool {
        self.state.controls_visible()
    }

    pub fn is_auto_hide_armed(&self) -> bool {
        self.timer.is_armed()
    }

    pub fn set_overlay_visible(&mut self, visible: bool) -> bool {
        if visible && self.state.is_gesture_locked {
            trace!("overlay stays hidden while gestures are locked");
            return false;
        }

        let changed = self.state.overlay_visible != visible;
        self.state.overlay_visible = visible;
        if visible {
            self.rearm();
        } else {
            self.timer.stop();
        }
        self.publish(changed, None)
    }

    /// Single-tap behaviour. With a drawer open on a regular layout the tap
    /// closes the drawer; otherwise overlay visibility flips.
    pub fn toggle_overlay(&mut self) -> bool {
        if self.state.is_presenting_supplement() && !self.state.is_compact_layout {
            return self.select_supplement(None);
        }
        self.set_overlay_visible(!self.state.overlay_visible)
    }

    /// Selecting the drawer that is already open closes it.
    pub fn select_supplement(&mut self, supplement: Option<SupplementId>) -> bool {
        let next = match supplement {
            Some(id) if self.state.supplement_selection.as_ref() == Some(&id) => None,
            other => other,
        };
        let changed = self.state.supplement_selection != next;
        self.state.supplement_selection = next;

        if self.state.is_presenting_supplement() {
            self.timer.stop();
        } else if changed {
            self.rearm();
        }
        debug!(supplement = ?self.state.supplement_selection, "supplement selection");
        self.publish(changed, None)
    }

    /// Locking hides the overlay. The auto-hide timer is left alone.
    pub fn set_gesture_locked(&mut self, locked: bool) -> bool {
        let changed = self.state.is_gesture_locked != locked
            || (locked && self.state.overlay_visible);
        self.state.is_gesture_locked = locked;
        if locked {
            self.state.overlay_visible = false;
        }
        self.publish(changed, None)
    }

    pub fn set_scrubbing(&mut self, scrubbing: bool) -> bool {
        let changed = self.state.is_scrubbing != scrubbing;
        self.state.is_scrubbing = scrubbing;
        if scrubbing {
            self.timer.stop();
        } else if changed {
            self.rearm();
        }
        self.publish(changed, None)
    }

    pub fn set_compact_layout(&mut self, compact: bool) -> bool {
        let changed = self.state.is_compact_layout != compact;
        self.state.is_compact_layout = compact;
        self.publish(changed, None)
    }

    /// A drag started; hold auto-hide until the matching
    /// [`end_interaction`](Self::end_interaction).
    pub fn begin_interaction(&mut self) {
        self.interactions = self.interactions.saturating_add(1);
        self.timer.stop();
    }

    pub fn end_interaction(&mut self) {
        self.interactions = self.interactions.saturating_sub(1);
        self.rearm();
    }

    /// The pause that held auto-hide ended; start counting down again.
    pub fn playback_resumed(&mut self) {
        if self.state.overlay_visible {
            self.rearm();
        }
    }

    pub fn on_timer_fired(&mut self, fired: TimerFired, is_paused: bool) -> AutoHideOutcome {
        if !self.timer.acknowledge(fired) {
            return AutoHideOutcome::Stale;
        }

        if self.state.is_scrubbing || self.state.is_presenting_supplement() || is_paused {
            debug!(
                scrubbing = self.state.is_scrubbing,
                supplement = self.state.is_presenting_supplement(),
                paused = is_paused,
                "auto-hide held"
            );
            return AutoHideOutcome::Held;
        }

        let changed = self.state.overlay_visible;
        self.state.overlay_visible = false;
        self.publish(changed, Some(self.fade_out));
        debug!(fade_ms = self.fade_out.as_millis() as u64, "overlay auto-hidden");
        AutoHideOutcome::Hidden {
            fade: self.fade_out,
        }
    }

    fn rearm(&mut self) {
        if self.state.is_scrubbing
            || self.state.is_presenting_supplement()
            || self.interactions > 0
        {
            return;
        }
        self.timer.poke();
    }

    fn publish(&self, changed: bool, fade: Option<Duration>) -> bool {
        if changed {
            self.snapshots
                .send_replace(Presentation::new(self.state.clone(), fade));
        }
        changed
    }
}
