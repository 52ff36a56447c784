//! Telegram implementation of [`MessageTransport`] over the Bot API.
//!
//! The Bot API has no per-side pin flag, so `pin` pins silently and the
//! `pin_both_sides` fallback repeats the pin with notification enabled.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use teloxide::{ApiError, RequestError};
use tracing::debug;

use gcast_core::config::TelegramConfig;
use gcast_core::{MessageRef, RecipientId};
use gcast_dispatch::{MessageTransport, TransportError};

use crate::error::TelegramError;

/// Bot API transport. Cheap to clone; all clones share one HTTP client.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(config: &TelegramConfig) -> Result<Self, TelegramError> {
        if config.bot_token.trim().is_empty() {
            return Err(TelegramError::NoToken);
        }
        Ok(Self {
            bot: Bot::new(&config.bot_token),
        })
    }
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    async fn duplicate(
        &self,
        source: &MessageRef,
        recipient: RecipientId,
    ) -> Result<MessageRef, TransportError> {
        let copied = self
            .bot
            .copy_message(
                ChatId(recipient.0),
                ChatId(source.chat_id),
                MessageId(source.message_id),
            )
            .await
            .map_err(classify_request_error)?;
        Ok(MessageRef::new(recipient.0, copied.0))
    }

    async fn pin(&self, message: &MessageRef) -> Result<(), TransportError> {
        self.bot
            .pin_chat_message(ChatId(message.chat_id), MessageId(message.message_id))
            .disable_notification(true)
            .await
            .map(|_| ())
            .map_err(classify_request_error)
    }

    async fn pin_both_sides(&self, message: &MessageRef) -> Result<(), TransportError> {
        self.bot
            .pin_chat_message(ChatId(message.chat_id), MessageId(message.message_id))
            .await
            .map(|_| ())
            .map_err(classify_request_error)
    }

    async fn forward(
        &self,
        recipient: RecipientId,
        source: &MessageRef,
    ) -> Result<(), TransportError> {
        self.bot
            .forward_message(
                ChatId(recipient.0),
                ChatId(source.chat_id),
                MessageId(source.message_id),
            )
            .await
            .map(|_| ())
            .map_err(classify_request_error)
    }

    async fn send_text(&self, recipient: RecipientId, text: &str) -> Result<(), TransportError> {
        self.bot
            .send_message(ChatId(recipient.0), text)
            .await
            .map(|_| ())
            .map_err(classify_request_error)
    }
}

/// Map a teloxide request error onto the engine's transport taxonomy.
pub fn classify_request_error(err: RequestError) -> TransportError {
    match err {
        RequestError::RetryAfter(wait) => TransportError::RateLimited {
            wait: wait.duration(),
        },
        RequestError::Api(api) => classify_api_error(api),
        other => {
            debug!(error = %other, "telegram: unclassified request error");
            TransportError::Other(other.to_string())
        }
    }
}

fn classify_api_error(err: ApiError) -> TransportError {
    match err {
        ApiError::BotBlocked | ApiError::BotKicked => TransportError::RecipientBlocked,
        ApiError::UserDeactivated => TransportError::RecipientDeactivated,
        ApiError::ChatNotFound | ApiError::UserNotFound | ApiError::CantInitiateConversation => {
            TransportError::RecipientInvalid
        }
        other => TransportError::Other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use teloxide::types::Seconds;

    use super::*;

    #[test]
    fn retry_after_becomes_rate_limit_with_same_wait() {
        let err = RequestError::RetryAfter(Seconds::from_seconds(3));
        assert_eq!(
            classify_request_error(err),
            TransportError::RateLimited {
                wait: Duration::from_secs(3)
            }
        );
    }

    #[test]
    fn blocked_and_kicked_are_blocked() {
        for api in [ApiError::BotBlocked, ApiError::BotKicked] {
            assert_eq!(
                classify_request_error(RequestError::Api(api)),
                TransportError::RecipientBlocked
            );
        }
    }

    #[test]
    fn deactivated_user_is_deactivated() {
        assert_eq!(
            classify_request_error(RequestError::Api(ApiError::UserDeactivated)),
            TransportError::RecipientDeactivated
        );
    }

    #[test]
    fn unknown_chats_are_invalid() {
        for api in [
            ApiError::ChatNotFound,
            ApiError::UserNotFound,
            ApiError::CantInitiateConversation,
        ] {
            assert_eq!(
                classify_request_error(RequestError::Api(api)),
                TransportError::RecipientInvalid
            );
        }
    }

    #[test]
    fn other_api_errors_keep_their_text() {
        let api = ApiError::Unknown("Bad Request: message to copy not found".to_string());
        match classify_request_error(RequestError::Api(api)) {
            TransportError::Other(detail) => assert!(detail.contains("message to copy not found")),
            other => panic!("expected Other, got {other:?}"),
        }
    }

    #[test]
    fn empty_token_is_rejected() {
        let config = TelegramConfig {
            bot_token: "  ".to_string(),
        };
        assert!(matches!(
            TelegramTransport::new(&config),
            Err(TelegramError::NoToken)
        ));
    }
}
