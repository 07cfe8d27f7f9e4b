use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, trace, warn};

use super::command::{KeyCommand, SessionCommand};
use super::event::{SessionEvent, Toast};
use crate::config::PlaybackConfig;
use crate::engine::{MAX_RATE, MIN_RATE, MediaEngine, RATE_STEP};
use crate::error::{ApiError, PlaybackError, Result};
use crate::gesture::{
    Axis, GestureActionRouter, GestureIntent, GestureSample, RouteContext, Routing,
};
use crate::jump::{JumpAccumulator, JumpDirection};
use crate::mutation::{MutationCompleted, MutationOutcome, SingleFlightMutator};
use crate::overlay::{AutoHideOutcome, OverlayCoordinator, Presentation};
use crate::timer::{TimerFired, TimerKind};
use crate::user_data::{ItemId, UserDataApi, UserDataBus, UserDataUpdate, UserItemData};

const COMMAND_BUFFER: usize = 64;

type UserDataMutator = SingleFlightMutator<ItemId, UserItemData, ApiError>;
type UserDataCompletion = MutationCompleted<ItemId, UserItemData, ApiError>;

#[derive(Clone, Copy, Debug)]
struct ScrubAnchor {
    start: Duration,
    preview: Option<Duration>,
}

/// Levels controlled by vertical pans, `0.0..=1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Levels {
    brightness: f64,
    volume: f64,
}

impl Default for Levels {
    fn default() -> Self {
        Self {
            brightness: 0.5,
            volume: 1.0,
        }
    }
}

/// One playback screen's interaction state, driven from a single task.
///
/// Owns the overlay coordinator, gesture router, jump accumulator and user
/// data mutator, and wires them to the media engine and the user data API.
/// Input arrives as [`SessionCommand`]s; timer fires and mutation results
/// come back over internal channels and are applied in arrival order.
pub struct PlaybackSession<E> {
    config: PlaybackConfig,
    engine: E,
    api: Arc<dyn UserDataApi>,
    overlay: OverlayCoordinator,
    router: GestureActionRouter,
    jumps: JumpAccumulator,
    mutator: UserDataMutator,
    bus: UserDataBus,
    timers_rx: mpsc::UnboundedReceiver<TimerFired>,
    completions_rx: mpsc::UnboundedReceiver<UserDataCompletion>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    scrub: Option<ScrubAnchor>,
    levels: Levels,
    pan_start_levels: Levels,
    aspect_fill: bool,
}

impl<E> fmt::Debug for PlaybackSession<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("engine", &std::any::type_name::<E>())
            .field("overlay", &self.overlay)
            .field("router", &self.router)
            .field("jumps", &self.jumps)
            .field("mutator", &self.mutator)
            .field("bus", &self.bus)
            .field("scrub", &self.scrub)
            .field("levels", &self.levels)
            .field("aspect_fill", &self.aspect_fill)
            .finish()
    }
}

impl<E: MediaEngine> PlaybackSession<E> {
    /// Build a session. Must be called from inside a tokio runtime.
    pub fn new(
        config: PlaybackConfig,
        engine: E,
        api: Arc<dyn UserDataApi>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (timers_tx, timers_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let bus = UserDataBus::new(config.bus.capacity, config.cache.user_data_capacity);
        let mutator = SingleFlightMutator::new(completions_tx, bus.sender());
        let overlay = OverlayCoordinator::new(&config.overlay, timers_tx.clone());
        let jumps = JumpAccumulator::new(config.jump.window(), timers_tx);
        let router = GestureActionRouter::new(
            config.gestures.policy.clone(),
            config.gestures.pan_direction,
            config.jump.tap_window(),
        );

        let session = Self {
            config,
            engine,
            api,
            overlay,
            router,
            jumps,
            mutator,
            bus,
            timers_rx,
            completions_rx,
            events_tx,
            scrub: None,
            levels: Levels::default(),
            pan_start_levels: Levels::default(),
            aspect_fill: false,
        };
        (session, events_rx)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn overlay(&self) -> &OverlayCoordinator {
        &self.overlay
    }

    pub fn jumps(&self) -> &JumpAccumulator {
        &self.jumps
    }

    pub fn is_aspect_filled(&self) -> bool {
        self.aspect_fill
    }

    pub fn is_mutation_in_flight(&self, item: &ItemId) -> bool {
        self.mutator.is_in_flight(item)
    }

    pub fn subscribe_presentation(&self) -> watch::Receiver<Presentation> {
        self.overlay.subscribe()
    }

    pub fn subscribe_user_data(&self) -> broadcast::Receiver<UserDataUpdate> {
        self.bus.subscribe()
    }

    /// Apply one command. Returns `false` once the session should stop.
    pub fn handle(&mut self, command: SessionCommand) -> bool {
        trace!(?command, "session command");
        match command {
            SessionCommand::Gesture { gesture } => {
                let ctx = self.route_context();
                match self.router.route(&gesture, &ctx) {
                    Routing::Rejected => self.emit(SessionEvent::GestureRejected),
                    Routing::Accepted(intents) => {
                        for intent in intents {
                            self.apply_intent(intent);
                        }
                    }
                }
            }
            SessionCommand::Key { key } => self.handle_key(key),
            SessionCommand::SetOverlayVisible { visible } => {
                self.overlay.set_overlay_visible(visible);
            }
            SessionCommand::ToggleOverlay => {
                self.overlay.toggle_overlay();
            }
            SessionCommand::SelectSupplement { supplement } => {
                self.overlay.select_supplement(supplement);
            }
            SessionCommand::SetCompactLayout { compact } => {
                self.overlay.set_compact_layout(compact);
            }
            SessionCommand::SetGestureLocked { locked } => {
                self.overlay.set_gesture_locked(locked);
            }
            SessionCommand::SetScrubbing { scrubbing } => {
                self.overlay.set_scrubbing(scrubbing);
            }
            SessionCommand::PlaybackStateChanged { paused } => {
                if !paused {
                    self.overlay.playback_resumed();
                }
                self.emit(SessionEvent::PlaybackPaused { paused });
            }
            SessionCommand::SetFavorite { item, is_favorite } => {
                let api = Arc::clone(&self.api);
                let key = item.clone();
                self.mutator.mutate(key, async move {
                    api.set_favorite(&item, is_favorite).await
                });
            }
            SessionCommand::SetPlayed { item, played } => {
                let api = Arc::clone(&self.api);
                let key = item.clone();
                self.mutator
                    .mutate(key, async move { api.set_played(&item, played).await });
            }
            SessionCommand::RefreshUserData { items } => {
                for data in items {
                    self.bus.notify_if_changed(data);
                }
            }
            SessionCommand::Shutdown => return false,
        }
        true
    }

    pub fn on_timer_fired(&mut self, fired: TimerFired) {
        trace!(timer = ?fired.timer, generation = fired.generation, "timer fired");
        match fired.timer {
            TimerKind::OverlayAutoHide => {
                let outcome = self.overlay.on_timer_fired(fired, self.engine.is_paused());
                if outcome == AutoHideOutcome::Stale {
                    trace!("stale auto-hide fire");
                }
            }
            TimerKind::JumpWindow => {
                self.jumps.on_timer_fired(fired);
            }
        }
    }

    pub fn on_mutation_completed(&mut self, completed: UserDataCompletion) {
        if let Some(MutationOutcome::Succeeded { value, .. }) = self.mutator.complete(completed) {
            self.bus.remember(&value);
        }
    }

    /// Drive the session until `commands` closes or a
    /// [`SessionCommand::Shutdown`] arrives. Returns the engine.
    #[instrument(skip_all, name = "playback_session")]
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) -> E {
        info!("playback session started");
        loop {
            tokio::select! {
                command = commands.recv() => {
                    let Some(command) = command else {
                        debug!("command channel closed");
                        break;
                    };
                    if !self.handle(command) {
                        break;
                    }
                }
                Some(fired) = self.timers_rx.recv() => self.on_timer_fired(fired),
                Some(done) = self.completions_rx.recv() => self.on_mutation_completed(done),
            }
        }
        self.shutdown();
        info!("playback session stopped");
        self.engine
    }

    /// Spawn [`run`](Self::run) onto the runtime.
    pub fn spawn(self) -> SessionHandle<E>
    where
        E: 'static,
    {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let presentation = self.overlay.subscribe();
        let user_data = self.bus.sender();
        let task = tokio::spawn(self.run(commands_rx));
        SessionHandle {
            commands: commands_tx,
            presentation,
            user_data,
            task,
        }
    }

    fn shutdown(&mut self) {
        self.mutator.cancel_all();
        self.jumps.reset();
        self.overlay.set_scrubbing(false);
    }

    fn route_context(&self) -> RouteContext {
        let state = self.overlay.state();
        RouteContext {
            overlay_visible: state.overlay_visible,
            supplement_presented: state.is_presenting_supplement(),
            is_compact_layout: state.is_compact_layout,
            is_gesture_locked: state.is_gesture_locked,
            is_scrubbing: state.is_scrubbing,
            is_live_stream: self.engine.is_live_stream(),
        }
    }

    fn apply_intent(&mut self, intent: GestureIntent) {
        match intent {
            GestureIntent::ToggleOverlay => {
                self.overlay.toggle_overlay();
            }
            GestureIntent::HideOverlay => {
                self.overlay.set_overlay_visible(false);
            }
            GestureIntent::InteractionBegan => {
                self.pan_start_levels = self.levels;
                self.overlay.begin_interaction();
            }
            GestureIntent::InteractionEnded => self.overlay.end_interaction(),
            GestureIntent::Jump { direction, window } => self.jump(direction, window),
            GestureIntent::ScrubBegan { .. } => {
                self.scrub = Some(ScrubAnchor {
                    start: self.engine.position(),
                    preview: None,
                });
            }
            GestureIntent::ScrubMoved {
                axis,
                sample,
                damping,
            } => self.scrub_moved(axis, &sample, damping),
            GestureIntent::ScrubEnded {
                started_with_overlay,
            } => self.scrub_ended(started_with_overlay),
            GestureIntent::AdjustBrightness { delta } => {
                let level = (self.pan_start_levels.brightness + delta).clamp(0.0, 1.0);
                self.levels.brightness = level;
                self.emit(SessionEvent::Brightness { level });
                self.emit(SessionEvent::Toast(Toast::Brightness { level }));
            }
            GestureIntent::AdjustVolume { delta } => {
                let level = (self.pan_start_levels.volume + delta).clamp(0.0, 1.0);
                self.levels.volume = level;
                self.emit(SessionEvent::Volume { level });
            }
            GestureIntent::SupplementDrag { sample } => {
                self.emit(SessionEvent::SupplementDrag { sample });
            }
            GestureIntent::SetAspectFill(filled) => {
                if self.aspect_fill != filled {
                    self.aspect_fill = filled;
                    self.emit(SessionEvent::AspectFill { filled });
                }
            }
            GestureIntent::ToggleAspectFill => {
                self.aspect_fill = !self.aspect_fill;
                self.emit(SessionEvent::AspectFill {
                    filled: self.aspect_fill,
                });
            }
            GestureIntent::ToggleGestureLock => {
                let locked = !self.overlay.state().is_gesture_locked;
                self.overlay.set_gesture_locked(locked);
                let toast = if locked {
                    Toast::GesturesLocked
                } else {
                    Toast::GesturesUnlocked
                };
                self.emit(SessionEvent::Toast(toast));
            }
            GestureIntent::TogglePlayPause => {
                self.toggle_play_pause();
            }
            GestureIntent::GesturesLocked => {
                self.emit(SessionEvent::Toast(Toast::GesturesLocked));
            }
        }
    }

    fn handle_key(&mut self, key: KeyCommand) {
        match key {
            KeyCommand::JumpForward => self.jump(JumpDirection::Forward, None),
            KeyCommand::JumpBackward => self.jump(JumpDirection::Backward, None),
            KeyCommand::PlayPause => {
                let paused = self.toggle_play_pause();
                if !self.overlay.state().overlay_visible {
                    let toast = if paused { Toast::Paused } else { Toast::Playing };
                    self.emit(SessionEvent::Toast(toast));
                }
            }
            KeyCommand::ToggleAspectFill => {
                self.apply_intent(GestureIntent::ToggleAspectFill);
            }
            KeyCommand::DecreaseRate => self.set_rate(self.engine.rate() - RATE_STEP),
            KeyCommand::IncreaseRate => self.set_rate(self.engine.rate() + RATE_STEP),
            KeyCommand::ResetRate => self.set_rate(1.0),
        }
    }

    fn jump(&mut self, direction: JumpDirection, window: Option<Duration>) {
        if self.engine.is_live_stream() {
            debug!("ignoring jump on live stream");
            return;
        }

        let state = match window {
            Some(window) => self.jumps.jump(direction, window),
            None => self.jumps.jump(direction, self.config.jump.window()),
        };
        let per_jump = match direction {
            JumpDirection::Forward => self.config.jump.forward(),
            JumpDirection::Backward => self.config.jump.backward(),
        };

        let position = self.engine.position();
        let target = match direction {
            JumpDirection::Forward => position.saturating_add(per_jump),
            JumpDirection::Backward => position.saturating_sub(per_jump),
        };
        self.seek(target);

        self.emit(SessionEvent::Toast(Toast::Jump {
            direction,
            total: state.total(per_jump),
        }));
    }

    fn scrub_moved(&mut self, axis: Axis, sample: &GestureSample, damping: f64) {
        let Some(anchor) = self.scrub.as_mut() else {
            return;
        };
        let Some(runtime) = self.engine.duration() else {
            return;
        };
        let Some(extent) = sample.extent(axis).filter(|extent| *extent > 0.0) else {
            return;
        };

        let offset = sample.signed_translation(axis) / extent * runtime.as_secs_f64() * damping;
        let seconds = (anchor.start.as_secs_f64() + offset).clamp(0.0, runtime.as_secs_f64());
        let Ok(position) = Duration::try_from_secs_f64(seconds) else {
            warn!(offset, "dropping scrub sample with a non-finite position");
            return;
        };
        anchor.preview = Some(position);

        self.overlay.set_scrubbing(true);
        self.overlay.set_overlay_visible(true);
        self.emit(SessionEvent::ScrubPreview { position });
    }

    fn scrub_ended(&mut self, started_with_overlay: bool) {
        if let Some(ScrubAnchor {
            preview: Some(position),
            ..
        }) = self.scrub.take()
        {
            self.seek(position);
        }
        self.overlay.set_scrubbing(false);
        if !started_with_overlay {
            self.overlay.set_overlay_visible(false);
        }
    }

    /// Returns the new paused state.
    fn toggle_play_pause(&mut self) -> bool {
        let paused = !self.engine.is_paused();
        self.engine.set_paused(paused);
        if !paused {
            self.overlay.playback_resumed();
        }
        self.emit(SessionEvent::PlaybackPaused { paused });
        paused
    }

    fn set_rate(&mut self, rate: f32) {
        let rate = rate.clamp(MIN_RATE, MAX_RATE);
        self.engine.set_rate(rate);
        self.emit(SessionEvent::RateChanged { rate });
        self.emit(SessionEvent::Toast(Toast::Rate { rate }));
    }

    fn seek(&mut self, target: Duration) {
        match self.engine.seek(target) {
            Ok(()) => self.emit(SessionEvent::Seeked { position: target }),
            Err(err) => error!(error = %err, target_ms = target.as_millis() as u64, "seek failed"),
        }
    }

    fn emit(&self, event: SessionEvent) {
        if self.events_tx.send(event).is_err() {
            trace!("no session event listener");
        }
    }
}

/// Handle to a spawned [`PlaybackSession`].
pub struct SessionHandle<E> {
    commands: mpsc::Sender<SessionCommand>,
    presentation: watch::Receiver<Presentation>,
    user_data: broadcast::Sender<UserDataUpdate>,
    task: JoinHandle<E>,
}

impl<E> fmt::Debug for SessionHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("closed", &self.commands.is_closed())
            .field("presentation", &*self.presentation.borrow())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl<E> SessionHandle<E> {
    pub async fn send(&self, command: SessionCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| PlaybackError::SessionClosed)
    }

    pub fn presentation(&self) -> watch::Receiver<Presentation> {
        self.presentation.clone()
    }

    pub fn subscribe_user_data(&self) -> broadcast::Receiver<UserDataUpdate> {
        self.user_data.subscribe()
    }

    /// Stop the session and get the engine back.
    pub async fn shutdown(self) -> Result<E> {
        if self.commands.send(SessionCommand::Shutdown).await.is_err() {
            warn!("session already stopped");
        }
        self.task.await.map_err(|err| {
            error!(error = %err, "session task failed");
            PlaybackError::SessionClosed
        })
    }
}
