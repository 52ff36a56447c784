pub mod config;
pub mod error;
pub mod report;
pub mod types;

pub use error::{BroadcastError, Result};
pub use report::BroadcastReport;
pub use types::{
    BroadcastResult, DeliveryOutcome, FailureReason, MessageRef, Payload, RecipientId,
};
