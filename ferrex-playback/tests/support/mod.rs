//! Shared harness for driving a spawned playback session under a paused
//! tokio clock.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use ferrex_playback::gesture::{GesturePhase, Point, UnitPoint, Vector};
use ferrex_playback::{
    PlaybackConfig, PlaybackSession, Presentation, RawGesture, SessionCommand, SessionEvent,
    SessionHandle, SimulatedEngine, UserDataApi,
};
use tokio::sync::{mpsc, watch};

/// Width of the simulated player view in points.
pub const VIEW_WIDTH: f64 = 1000.0;
pub const VIEW_HEIGHT: f64 = 600.0;

pub struct SessionHarness {
    pub handle: SessionHandle<SimulatedEngine>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub presentation: watch::Receiver<Presentation>,
}

impl SessionHarness {
    pub fn start(
        config: PlaybackConfig,
        engine: SimulatedEngine,
        api: Arc<dyn UserDataApi>,
    ) -> Self {
        let (session, events) = PlaybackSession::new(config, engine, api);
        let handle = session.spawn();
        let presentation = handle.presentation();
        Self {
            handle,
            events,
            presentation,
        }
    }

    /// Send a command and let the session task process it.
    pub async fn send(&self, command: SessionCommand) -> anyhow::Result<()> {
        self.handle.send(command).await?;
        settle().await;
        Ok(())
    }

    pub async fn gesture(&self, gesture: RawGesture) -> anyhow::Result<()> {
        self.send(SessionCommand::Gesture { gesture }).await
    }

    pub fn overlay_visible(&self) -> bool {
        self.presentation.borrow().state.overlay_visible
    }

    pub fn current(&self) -> Presentation {
        self.presentation.borrow().clone()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }

    pub async fn finish(self) -> anyhow::Result<SimulatedEngine> {
        Ok(self.handle.shutdown().await?)
    }
}

/// Yield long enough for every ready task to run. With a paused clock the
/// runtime only advances time once all tasks are idle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

pub fn movie() -> SimulatedEngine {
    SimulatedEngine::new(Duration::from_secs(5_400)).with_position(Duration::from_secs(600))
}

fn unit(x: f64, y: f64) -> (Point, UnitPoint) {
    (
        Point::new(x * VIEW_WIDTH, y * VIEW_HEIGHT),
        UnitPoint::new(x, y),
    )
}

pub fn tap_at(x: f64) -> RawGesture {
    let (location, unit_point) = unit(x, 0.5);
    RawGesture::Tap {
        count: 1,
        location,
        unit_point,
    }
}

pub fn double_touch() -> RawGesture {
    let (location, unit_point) = unit(0.5, 0.5);
    RawGesture::Tap {
        count: 2,
        location,
        unit_point,
    }
}

pub fn long_press(phase: GesturePhase) -> RawGesture {
    let (location, unit_point) = unit(0.5, 0.5);
    RawGesture::LongPress {
        phase,
        location,
        unit_point,
    }
}

/// Horizontal pan starting at the view center.
pub fn horizontal_pan(phase: GesturePhase, dx: f64) -> RawGesture {
    let (location, unit_point) = unit(0.5 + dx / VIEW_WIDTH, 0.5);
    RawGesture::Pan {
        phase,
        translation: Vector::new(dx, 0.0),
        velocity: Vector::new(if phase == GesturePhase::Began { 300.0 } else { 0.0 }, 5.0),
        location,
        unit_point,
    }
}

/// Vertical pan starting at `start_x` (unit) with an upward translation of
/// `up` points.
pub fn vertical_pan(phase: GesturePhase, start_x: f64, up: f64) -> RawGesture {
    let (location, unit_point) = unit(start_x, 0.5 - up / VIEW_HEIGHT);
    RawGesture::Pan {
        phase,
        translation: Vector::new(0.0, -up),
        velocity: Vector::new(5.0, if phase == GesturePhase::Began { -300.0 } else { 0.0 }),
        location,
        unit_point,
    }
}

pub fn toasts(events: &[SessionEvent]) -> Vec<ferrex_playback::Toast> {
    events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Toast(toast) => Some(toast.clone()),
            _ => None,
        })
        .collect()
}
