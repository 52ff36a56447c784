use std::time::Duration;

use thiserror::Error;

use gcast_core::{BroadcastError, DeliveryOutcome, FailureReason};

/// Everything a transport adapter may report for a single call.
///
/// Adapters map their platform-specific errors onto these variants so the
/// engine never inspects foreign error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The platform asked us to back off for `wait` before retrying.
    #[error("rate limited, retry after {}s", .wait.as_secs_f64())]
    RateLimited { wait: Duration },

    #[error("recipient is deactivated")]
    RecipientDeactivated,

    #[error("recipient blocked the bot")]
    RecipientBlocked,

    #[error("recipient does not exist or cannot be contacted")]
    RecipientInvalid,

    #[error("transport error: {0}")]
    Other(String),
}

impl From<TransportError> for DeliveryOutcome {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::RateLimited { wait } => DeliveryOutcome::RetryableFailure(wait),
            TransportError::RecipientDeactivated => {
                DeliveryOutcome::PermanentFailure(FailureReason::RecipientDeactivated)
            }
            TransportError::RecipientBlocked => {
                DeliveryOutcome::PermanentFailure(FailureReason::RecipientBlocked)
            }
            TransportError::RecipientInvalid => {
                DeliveryOutcome::PermanentFailure(FailureReason::RecipientInvalid)
            }
            TransportError::Other(detail) => {
                DeliveryOutcome::PermanentFailure(FailureReason::Unknown(detail))
            }
        }
    }
}

/// Errors raised while fetching the recipient snapshot.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed recipient on line {line}: {value:?}")]
    Malformed { line: usize, value: String },

    #[error("{0}")]
    Unavailable(String),
}

impl From<DirectoryError> for BroadcastError {
    fn from(err: DirectoryError) -> Self {
        BroadcastError::Directory(err.to_string())
    }
}
