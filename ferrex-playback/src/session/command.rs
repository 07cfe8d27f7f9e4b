use serde::{Deserialize, Serialize};

use crate::gesture::RawGesture;
use crate::overlay::SupplementId;
use crate::user_data::{ItemId, UserItemData};

/// Hardware keyboard shortcuts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCommand {
    JumpForward,
    JumpBackward,
    PlayPause,
    ToggleAspectFill,
    DecreaseRate,
    IncreaseRate,
    ResetRate,
}

/// Input accepted by a running session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    Gesture { gesture: RawGesture },
    Key { key: KeyCommand },
    SetOverlayVisible { visible: bool },
    ToggleOverlay,
    SelectSupplement { supplement: Option<SupplementId> },
    SetCompactLayout { compact: bool },
    SetGestureLocked { locked: bool },
    SetScrubbing { scrubbing: bool },
    /// The media engine reports a transport change it made on its own.
    PlaybackStateChanged { paused: bool },
    SetFavorite { item: ItemId, is_favorite: bool },
    SetPlayed { item: ItemId, played: bool },
    /// Fresh values from the server; only real changes are re-published.
    RefreshUserData { items: Vec<UserItemData> },
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_are_tagged_by_type() {
        let command: SessionCommand = toml::from_str(
            r#"
                type = "select_supplement"
                supplement = "chapters"
            "#,
        )
        .unwrap();
        assert_eq!(
            command,
            SessionCommand::SelectSupplement {
                supplement: Some(SupplementId::new("chapters"))
            }
        );

        let key: SessionCommand =
            serde_json::from_str(r#"{"type":"key","key":"jump_forward"}"#).unwrap();
        assert_eq!(
            key,
            SessionCommand::Key {
                key: KeyCommand::JumpForward
            }
        );
    }
}
