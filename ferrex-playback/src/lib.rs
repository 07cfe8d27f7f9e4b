//! # Ferrex Playback
//!
//! Interaction core for the Ferrex video player: decides when transport
//! controls and drawers are visible, turns raw gestures into playback
//! actions, and issues per-item user data mutations without letting stale
//! requests race each other.
//!
//! ## Overview
//!
//! - **Overlay**: [`OverlayCoordinator`] owns the presentation state and its
//!   auto-hide timer
//! - **Gestures**: [`GestureActionRouter`] classifies pans, pinches, taps and
//!   long presses against a configurable [`GesturePolicy`]
//! - **Jumps**: [`JumpAccumulator`] merges rapid repeated jumps into one burst
//! - **User data**: [`SingleFlightMutator`] keeps at most one request in
//!   flight per item; [`UserDataBus`] fans results out, deduplicated by a
//!   [`HashCache`]
//! - **Session**: [`PlaybackSession`] runs all of the above on one task
//!   against a [`MediaEngine`] and a [`UserDataApi`]
//!
//! Everything is driven from a single tokio task; timers and mutations
//! report back over channels and stale reports are discarded by generation.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use ferrex_playback::{
//!     InMemoryUserDataApi, PlaybackConfig, PlaybackSession, SessionCommand, SimulatedEngine,
//! };
//!
//! # async fn demo() -> ferrex_playback::Result<()> {
//! let engine = SimulatedEngine::new(Duration::from_secs(5400)).playing();
//! let api = Arc::new(InMemoryUserDataApi::new());
//! let (session, _events) = PlaybackSession::new(PlaybackConfig::default(), engine, api);
//!
//! let handle = session.spawn();
//! handle
//!     .send(SessionCommand::SetOverlayVisible { visible: true })
//!     .await?;
//! let _engine = handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod gesture;
pub mod hash_cache;
pub mod jump;
pub mod mutation;
pub mod overlay;
pub mod session;
pub mod timer;
pub mod user_data;

pub use config::PlaybackConfig;
pub use engine::{MediaEngine, SimulatedEngine};
pub use error::{ApiError, PlaybackError, Result};
pub use gesture::{GestureActionRouter, GestureIntent, GesturePolicy, RawGesture, Routing};
pub use hash_cache::HashCache;
pub use jump::{JumpAccumulator, JumpDirection, JumpState};
pub use mutation::{MutationOutcome, SingleFlightMutator};
pub use overlay::{OverlayCoordinator, Presentation, PresentationState, SupplementId};
pub use session::{KeyCommand, PlaybackSession, SessionCommand, SessionEvent, SessionHandle, Toast};
pub use timer::{PokeTimer, TimerFired, TimerKind};
pub use user_data::{
    InMemoryUserDataApi, ItemId, UserDataApi, UserDataBus, UserDataUpdate, UserItemData,
};
