use thiserror::Error;

/// Run-level failures. Per-recipient failures never surface here; they are
/// absorbed into the counts of a [`BroadcastResult`](crate::types::BroadcastResult).
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Recipient directory unavailable: {0}")]
    Directory(String),
}

impl BroadcastError {
    /// Short error code string, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            BroadcastError::InvalidArgument(_) => "INVALID_ARGUMENT",
            BroadcastError::Config(_) => "CONFIG_ERROR",
            BroadcastError::Directory(_) => "DIRECTORY_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, BroadcastError>;
