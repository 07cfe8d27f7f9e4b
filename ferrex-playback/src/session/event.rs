use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::gesture::GestureSample;
use crate::jump::JumpDirection;

/// Transient on-screen notice.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "toast", rename_all = "snake_case")]
pub enum Toast {
    GesturesLocked,
    GesturesUnlocked,
    Jump {
        direction: JumpDirection,
        total: Duration,
    },
    Paused,
    Playing,
    /// Level in `0.0..=1.0`.
    Brightness { level: f64 },
    Rate { rate: f32 },
    AspectFill { filled: bool },
}

impl fmt::Display for Toast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Toast::GesturesLocked => f.write_str("Gestures locked"),
            Toast::GesturesUnlocked => f.write_str("Gestures unlocked"),
            Toast::Jump { direction, total } => {
                let sign = match direction {
                    JumpDirection::Forward => '+',
                    JumpDirection::Backward => '-',
                };
                let secs = total.as_secs();
                if secs >= 60 {
                    write!(f, "{sign}{}m {}s", secs / 60, secs % 60)
                } else {
                    write!(f, "{sign}{secs}s")
                }
            }
            Toast::Paused => f.write_str("Pause"),
            Toast::Playing => f.write_str("Play"),
            Toast::Brightness { level } => write!(f, "{:.0}%", level * 100.0),
            Toast::Rate { rate } => write!(f, "{rate}x"),
            Toast::AspectFill { filled: true } => f.write_str("Aspect fill"),
            Toast::AspectFill { filled: false } => f.write_str("Aspect fit"),
        }
    }
}

/// Output of a session for the host UI and the media layer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Toast(Toast),
    /// Live scrub position; committed with a seek when the scrub ends.
    ScrubPreview { position: Duration },
    Seeked { position: Duration },
    Brightness { level: f64 },
    Volume { level: f64 },
    AspectFill { filled: bool },
    SupplementDrag { sample: GestureSample },
    PlaybackPaused { paused: bool },
    RateChanged { rate: f32 },
    /// A gesture was handed back to the host recognizer.
    GestureRejected,
}
