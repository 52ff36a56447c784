/// Errors produced while setting up the Telegram transport.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("no bot token configured")]
    NoToken,
}
