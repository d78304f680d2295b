//! Outbound message model and the delivery seam.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ParseMode` values.
pub enum ParseMode {
    Html,
    Markdown,
}

impl ParseMode {
    /// Telegram `parse_mode` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::Markdown => "Markdown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `BotMessage` used across Herald components.
///
/// `mutable` messages are notifications that the mute gate may drop; replies
/// to operator commands are never mutable.
pub struct BotMessage {
    pub chat_id: i64,
    pub text: String,
    pub parse_mode: ParseMode,
    pub mutable: bool,
}

impl BotMessage {
    /// A mutable HTML notification for the relay chat.
    pub fn notification(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: ParseMode::Html,
            mutable: true,
        }
    }

    /// A non-mutable reply to an operator.
    pub fn reply(chat_id: i64, text: impl Into<String>, parse_mode: ParseMode) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode,
            mutable: false,
        }
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `DeliveryError` values.
pub enum DeliveryError {
    #[error("telegram http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("telegram api error: {0}")]
    Api(String),
    #[error("failed to decode telegram response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("outbound queue is closed")]
    QueueClosed,
}

#[async_trait]
/// Trait contract for `MessageSink` behavior.
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, message: &BotMessage) -> Result<(), DeliveryError>;
}
