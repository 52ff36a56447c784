use async_trait::async_trait;

use gcast_core::{MessageRef, RecipientId};

use crate::error::TransportError;

/// Outbound side of a messaging platform, as seen by the dispatch engine.
///
/// One transport is shared by every delivery of a run and by concurrent runs,
/// so all methods take `&self`.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Copy `source` into the chat of `recipient`. Returns the locator of the new copy.
    async fn duplicate(
        &self,
        source: &MessageRef,
        recipient: RecipientId,
    ) -> Result<MessageRef, TransportError>;

    /// Pin a message previously returned by [`duplicate`](MessageTransport::duplicate).
    async fn pin(&self, message: &MessageRef) -> Result<(), TransportError>;

    /// Fallback pin used when [`pin`](MessageTransport::pin) fails; pins for both
    /// participants of a private chat where the platform distinguishes them.
    async fn pin_both_sides(&self, message: &MessageRef) -> Result<(), TransportError>;

    /// Forward `source` to `recipient`.
    async fn forward(
        &self,
        recipient: RecipientId,
        source: &MessageRef,
    ) -> Result<(), TransportError>;

    /// Send a plain text message to `recipient`.
    async fn send_text(&self, recipient: RecipientId, text: &str) -> Result<(), TransportError>;
}
