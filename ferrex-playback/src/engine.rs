//! Media engine seam.
//!
//! Decoding and rendering live behind [`MediaEngine`]; the interaction core
//! only asks about transport state and issues seeks.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::{PlaybackError, Result};

pub const MIN_RATE: f32 = 0.25;
pub const MAX_RATE: f32 = 4.0;
pub const RATE_STEP: f32 = 0.25;

pub trait MediaEngine: Send {
    fn is_paused(&self) -> bool;

    fn set_paused(&mut self, paused: bool);

    fn position(&self) -> Duration;

    /// Total runtime; `None` while unknown or for live streams.
    fn duration(&self) -> Option<Duration>;

    fn seek(&mut self, to: Duration) -> Result<()>;

    fn rate(&self) -> f32;

    fn set_rate(&mut self, rate: f32);

    fn is_live_stream(&self) -> bool;
}

/// Clock-driven engine without any media behind it.
///
/// Position advances with tokio time while playing, so it follows paused
/// test clocks.
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    runtime: Option<Duration>,
    position: Duration,
    playing_since: Option<Instant>,
    rate: f32,
    live: bool,
    fail_seeks: bool,
    seeks: Vec<Duration>,
}

impl SimulatedEngine {
    /// Paused at zero.
    pub fn new(runtime: Duration) -> Self {
        Self {
            runtime: Some(runtime),
            position: Duration::ZERO,
            playing_since: None,
            rate: 1.0,
            live: false,
            fail_seeks: false,
            seeks: Vec::new(),
        }
    }

    pub fn live() -> Self {
        Self {
            runtime: None,
            live: true,
            ..Self::new(Duration::ZERO)
        }
    }

    pub fn with_position(mut self, position: Duration) -> Self {
        self.position = self.clamp(position);
        self
    }

    pub fn playing(mut self) -> Self {
        self.set_paused(false);
        self
    }

    /// Make every seek fail, for exercising error paths.
    pub fn failing_seeks(mut self) -> Self {
        self.fail_seeks = true;
        self
    }

    /// Seek targets received so far, in order.
    pub fn seeks(&self) -> &[Duration] {
        &self.seeks
    }

    fn clamp(&self, position: Duration) -> Duration {
        match self.runtime {
            Some(runtime) if !self.live => position.min(runtime),
            _ => position,
        }
    }

    fn settle(&mut self) {
        if let Some(since) = self.playing_since {
            let now = Instant::now();
            let played = (now - since).mul_f64(f64::from(self.rate));
            self.position = self.clamp(self.position + played);
            self.playing_since = Some(now);
        }
    }
}

impl MediaEngine for SimulatedEngine {
    fn is_paused(&self) -> bool {
        self.playing_since.is_none()
    }

    fn set_paused(&mut self, paused: bool) {
        self.settle();
        self.playing_since = if paused { None } else { Some(Instant::now()) };
    }

    fn position(&self) -> Duration {
        match self.playing_since {
            Some(since) => {
                self.clamp(self.position + since.elapsed().mul_f64(f64::from(self.rate)))
            }
            None => self.position,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.runtime
    }

    fn seek(&mut self, to: Duration) -> Result<()> {
        if self.fail_seeks {
            return Err(PlaybackError::Engine("seek rejected".into()));
        }
        if self.live {
            return Err(PlaybackError::Engine("live streams cannot seek".into()));
        }
        self.settle();
        self.position = self.clamp(to);
        self.seeks.push(self.position);
        Ok(())
    }

    fn rate(&self) -> f32 {
        self.rate
    }

    fn set_rate(&mut self, rate: f32) {
        self.settle();
        self.rate = rate.clamp(MIN_RATE, MAX_RATE);
    }

    fn is_live_stream(&self) -> bool {
        self.live
    }
}
