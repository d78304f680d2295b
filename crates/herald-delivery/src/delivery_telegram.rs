//! Telegram Bot API client: `sendMessage`, `getUpdates` and `getMe`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::delivery_message::{BotMessage, DeliveryError, MessageSink};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `TelegramConfig` used across Herald components.
pub struct TelegramConfig {
    pub api_base: String,
    pub token: String,
    pub http_timeout_ms: u64,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            token: token.into(),
            http_timeout_ms: 70_000,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TelegramMessage {
    pub message_id: i64,
    /// Unix seconds.
    #[serde(default)]
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramEnvelope<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Clone)]
/// Public struct `TelegramClient` used across Herald components.
pub struct TelegramClient {
    config: TelegramConfig,
    http: Client,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, DeliveryError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .build()?;
        Ok(Self { config, http })
    }

    pub fn endpoint(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim().trim_end_matches('/'),
            self.config.token.trim(),
            method
        )
    }

    pub async fn send_message(&self, message: &BotMessage) -> Result<(), DeliveryError> {
        let body = json!({
            "chat_id": message.chat_id,
            "text": message.text,
            "parse_mode": message.parse_mode.as_str(),
            "disable_web_page_preview": true,
        });
        let response = self
            .http
            .post(self.endpoint("sendMessage"))
            .json(&body)
            .send()
            .await?;
        let _: Value = decode_envelope(response).await?;
        tracing::debug!(chat_id = message.chat_id, "telegram message sent");
        Ok(())
    }

    /// Long-polls for updates starting at `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, DeliveryError> {
        let response = self
            .http
            .get(self.endpoint("getUpdates"))
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", timeout_secs.to_string()),
                ("allowed_updates", r#"["message"]"#.to_string()),
            ])
            .send()
            .await?;
        decode_envelope(response).await
    }

    pub async fn get_me(&self) -> Result<TelegramUser, DeliveryError> {
        let response = self.http.get(self.endpoint("getMe")).send().await?;
        decode_envelope(response).await
    }
}

#[async_trait]
impl MessageSink for TelegramClient {
    async fn deliver(&self, message: &BotMessage) -> Result<(), DeliveryError> {
        self.send_message(message).await
    }
}

async fn decode_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, DeliveryError> {
    let status = response.status();
    let body = response.text().await?;
    let envelope = serde_json::from_str::<TelegramEnvelope<T>>(&body);
    match envelope {
        Ok(envelope) if envelope.ok => envelope
            .result
            .ok_or_else(|| DeliveryError::Api("response missing result".to_string())),
        Ok(envelope) => Err(DeliveryError::Api(
            envelope
                .description
                .unwrap_or_else(|| format!("request failed with status {}", status.as_u16())),
        )),
        Err(_) if !status.is_success() => Err(DeliveryError::HttpStatus {
            status: status.as_u16(),
            body,
        }),
        Err(error) => Err(DeliveryError::Decode(error)),
    }
}
