//! Session host tying the interaction components to the media engine and
//! the user data API.

pub mod command;
pub mod event;
pub mod host;

pub use command::{KeyCommand, SessionCommand};
pub use event::{SessionEvent, Toast};
pub use host::{PlaybackSession, SessionHandle};
