use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Drawer identifier, e.g. `"info"`, `"chapters"`, `"episodes"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplementId(String);

impl SupplementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SupplementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SupplementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// What the player is currently showing on top of the video.
///
/// Holds `!overlay_visible` whenever `is_gesture_locked` is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationState {
    pub overlay_visible: bool,
    pub supplement_selection: Option<SupplementId>,
    pub is_compact_layout: bool,
    pub is_gesture_locked: bool,
    pub is_scrubbing: bool,
}

impl PresentationState {
    pub fn is_presenting_supplement(&self) -> bool {
        self.supplement_selection.is_some()
    }

    /// Transport controls are hidden behind a drawer on regular layouts; on
    /// compact layouts the drawer sits below them.
    pub fn controls_visible(&self) -> bool {
        self.overlay_visible && (self.supplement_selection.is_none() || self.is_compact_layout)
    }
}

/// Snapshot published to observers after every change.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub state: PresentationState,
    pub controls_visible: bool,
    /// Animation to use for this transition, if any.
    pub fade: Option<Duration>,
}

impl Presentation {
    pub fn new(state: PresentationState, fade: Option<Duration>) -> Self {
        Self {
            controls_visible: state.controls_visible(),
            state,
            fade,
        }
    }
}
