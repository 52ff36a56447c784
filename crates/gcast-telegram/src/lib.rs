pub mod error;
pub mod transport;

pub use error::TelegramError;
pub use transport::{classify_request_error, TelegramTransport};
