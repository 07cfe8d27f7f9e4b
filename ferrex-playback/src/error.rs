use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Media engine error: {0}")]
    Engine(String),

    #[error("Session closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, PlaybackError>;

/// Failures reported by the user data API collaborator.
///
/// These never escape the core; the mutator logs them and leaves the
/// previously displayed value in place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Server returned status {0}")]
    Status(u16),
}
