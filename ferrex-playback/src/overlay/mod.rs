//! Overlay and drawer presentation.

pub mod coordinator;
pub mod state;

pub use coordinator::{AutoHideOutcome, OverlayCoordinator};
pub use state::{Presentation, PresentationState, SupplementId};
