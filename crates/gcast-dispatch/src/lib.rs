//! `gcast-dispatch`: batched, rate-limit-aware broadcast delivery.
//!
//! # Overview
//!
//! A [`DispatchEngine`] takes one recipient snapshot from a
//! [`RecipientDirectory`], splits it into batches, and pushes a
//! [`Payload`](gcast_core::Payload) to every recipient through a
//! [`MessageTransport`]. Per-recipient failures are classified and counted;
//! only a failed directory fetch aborts a run.
//!
//! | Transport signal       | Engine reaction                              |
//! |------------------------|----------------------------------------------|
//! | `RateLimited(wait)`    | Sleep `wait`, retry the same recipient       |
//! | `RecipientDeactivated` | Count as failed, no retry                    |
//! | `RecipientBlocked`     | Count as failed, no retry                    |
//! | `RecipientInvalid`     | Count as failed, no retry                    |
//! | `Other(detail)`        | Log detail, count as failed, no retry        |

pub mod batcher;
pub mod directory;
pub mod engine;
pub mod error;
pub mod transport;

pub use batcher::{batched, Batched};
pub use directory::{dedupe, RecipientDirectory, StaticDirectory};
pub use engine::DispatchEngine;
pub use error::{DirectoryError, TransportError};
pub use transport::MessageTransport;
