use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Platform-native identifier of a delivery target (a Telegram chat/user ID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(pub i64);

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecipientId {
    fn from(id: i64) -> Self {
        RecipientId(id)
    }
}

impl FromStr for RecipientId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(RecipientId)
    }
}

/// Locator of a message on the platform: the chat it lives in plus its ID within that chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

impl MessageRef {
    pub fn new(chat_id: i64, message_id: i32) -> Self {
        Self {
            chat_id,
            message_id,
        }
    }
}

/// What a broadcast delivers to every recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Duplicate an existing message into each recipient's chat.
    ///
    /// When `pin` is set the copy is pinned afterwards; pin failures are ignored.
    Copy { source: MessageRef, pin: bool },

    /// Forward an existing message, keeping the "forwarded from" header.
    Forward { source: MessageRef },

    /// Send a freeform text body.
    Text { body: String },
}

impl Payload {
    /// Stable lowercase label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Copy { .. } => "copy",
            Payload::Forward { .. } => "forward",
            Payload::Text { .. } => "text",
        }
    }
}

/// Why a recipient could not be reached. All variants are terminal for that recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    RecipientDeactivated,
    RecipientBlocked,
    RecipientInvalid,
    /// The transport kept signalling a rate limit past the configured retry cap.
    RateLimitExhausted { attempts: u32 },
    /// Anything the transport adapter could not classify.
    Unknown(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::RecipientDeactivated => f.write_str("deactivated"),
            FailureReason::RecipientBlocked => f.write_str("blocked the bot"),
            FailureReason::RecipientInvalid => f.write_str("invalid user ID"),
            FailureReason::RateLimitExhausted { attempts } => {
                write!(f, "still rate limited after {attempts} attempts")
            }
            FailureReason::Unknown(detail) => write!(f, "unknown error: {detail}"),
        }
    }
}

/// Result of one delivery attempt for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success,
    /// The transport asked for this wait before the recipient is tried again.
    RetryableFailure(Duration),
    PermanentFailure(FailureReason),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Success)
    }
}

/// Aggregate statistics of one broadcast run.
///
/// `delivered + failed <= total_recipients` always holds; the two sides are
/// equal unless the run was cancelled before every batch was attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastResult {
    /// Correlates log lines belonging to the same run.
    pub run_id: Uuid,

    /// Wall-clock time the run started.
    pub started_at: DateTime<Utc>,

    /// Size of the deduplicated recipient snapshot.
    pub total_recipients: usize,

    pub delivered: usize,

    pub failed: usize,

    /// Serialized as `elapsed_secs`, seconds rounded to two decimal places.
    #[serde(rename = "elapsed_secs", with = "rounded_secs")]
    pub elapsed: Duration,

    /// True when a cancellation stopped the run before the final batch.
    #[serde(default)]
    pub cancelled: bool,
}

impl BroadcastResult {
    /// Number of recipients an attempt was made for.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }

    /// Elapsed wall time in seconds, rounded to two decimal places.
    pub fn elapsed_secs(&self) -> f64 {
        rounded_secs::round(self.elapsed)
    }
}

mod rounded_secs {
    use std::time::Duration;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(super) fn round(elapsed: Duration) -> f64 {
        (elapsed.as_secs_f64() * 100.0).round() / 100.0
    }

    pub fn serialize<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(round(*elapsed))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(de::Error::custom)
    }
}
