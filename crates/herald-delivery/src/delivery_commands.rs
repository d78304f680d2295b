//! Operator chat commands: `/mute`, `/unmute`, `/alerts`, `/uid`, `/start`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use herald_alerts::{compose_active_alerts_digest, AlertTemplates, DEFAULT_ALERT_TEMPLATE};
use reqwest::Client;

use crate::delivery_dispatcher::OutboundQueue;
use crate::delivery_i18n::{translation_for, ChatTranslation};
use crate::delivery_message::{BotMessage, DeliveryError, ParseMode};
use crate::delivery_mute::{parse_mute_duration, MuteGate};
use crate::delivery_telegram::{TelegramClient, TelegramMessage};

pub const DEFAULT_MUTE_DURATION: &str = "5m";
pub const UPDATE_POLL_TIMEOUT_SECS: u64 = 30;
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Enumerates supported `OperatorCommand` values.
pub enum OperatorCommand {
    Mute { duration: String },
    Unmute,
    Alerts,
    Uid,
    Start,
}

impl OperatorCommand {
    /// Parses `/command[@bot] [args]`. Returns `None` for plain text and
    /// unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head);
        match name {
            "mute" => Some(Self::Mute {
                duration: if args.is_empty() {
                    DEFAULT_MUTE_DURATION.to_string()
                } else {
                    args.to_string()
                },
            }),
            "unmute" => Some(Self::Unmute),
            "alerts" => Some(Self::Alerts),
            "uid" => Some(Self::Uid),
            "start" => Some(Self::Start),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mute { .. } => "mute",
            Self::Unmute => "unmute",
            Self::Alerts => "alerts",
            Self::Uid => "uid",
            Self::Start => "start",
        }
    }
}

#[derive(Debug, Clone)]
/// Public struct `ActiveAlertsSource` used across Herald components.
pub struct ActiveAlertsSource {
    pub client: Client,
    pub endpoint: String,
    pub templates: Arc<AlertTemplates>,
}

#[derive(Debug, Clone)]
/// Public struct `OperatorCommandRuntime` used across Herald components.
pub struct OperatorCommandRuntime {
    pub mute: Arc<MuteGate>,
    pub outbound: OutboundQueue,
    pub alerts: Option<ActiveAlertsSource>,
    pub started_at: DateTime<Utc>,
}

impl OperatorCommandRuntime {
    /// Builds the reply for one chat message, applying its side effects.
    pub async fn reply_to(&self, message: &TelegramMessage) -> Option<BotMessage> {
        if message.date < self.started_at.timestamp() {
            tracing::debug!(message_id = message.message_id, "ignoring message sent before startup");
            return None;
        }
        let command = OperatorCommand::parse(message.text.as_deref()?)?;
        let chat_id = message.chat.id;
        let language = message
            .from
            .as_ref()
            .and_then(|user| user.language_code.as_deref());
        let strings = translation_for(language);
        tracing::info!(chat_id, command = command.as_str(), "operator command");

        let reply = match command {
            OperatorCommand::Mute { duration } => match parse_mute_duration(&duration) {
                Ok(duration) => {
                    let ticket = self.mute.mute(duration, Utc::now());
                    self.schedule_auto_unmute(duration, ticket.generation);
                    BotMessage::reply(
                        chat_id,
                        format!(
                            "<b>{} {} UTC</b>",
                            strings.muted_until,
                            ticket.until.format("%d.%m.%Y %H:%M:%S")
                        ),
                        ParseMode::Html,
                    )
                }
                Err(error) => BotMessage::reply(chat_id, format!("<b>{error}</b>"), ParseMode::Html),
            },
            OperatorCommand::Unmute => {
                let text = if self.mute.unmute() {
                    strings.unmuted
                } else {
                    strings.not_muted
                };
                BotMessage::reply(chat_id, format!("<b>{text}</b>"), ParseMode::Html)
            }
            OperatorCommand::Alerts => {
                BotMessage::reply(chat_id, self.alerts_digest(strings).await, ParseMode::Html)
            }
            OperatorCommand::Uid => {
                let user_id = message.from.as_ref().map_or(0, |user| user.id);
                BotMessage::reply(
                    chat_id,
                    format!("{} {user_id}", strings.your_user_id),
                    ParseMode::Html,
                )
            }
            OperatorCommand::Start => {
                BotMessage::reply(chat_id, strings.greeting, ParseMode::Markdown)
            }
        };
        Some(reply)
    }

    /// Replies to one chat message through the outbound queue.
    pub async fn handle_operator_message(
        &self,
        message: &TelegramMessage,
    ) -> Result<(), DeliveryError> {
        match self.reply_to(message).await {
            Some(reply) => self.outbound.enqueue(reply).await,
            None => Ok(()),
        }
    }

    async fn alerts_digest(&self, strings: &ChatTranslation) -> String {
        let Some(source) = self.alerts.as_ref() else {
            return format!("<b>{}</b>", strings.alerts_not_configured);
        };
        match compose_active_alerts_digest(
            &source.client,
            &source.endpoint,
            &source.templates,
            DEFAULT_ALERT_TEMPLATE,
        )
        .await
        {
            Ok(digest) if digest.is_empty() => format!("<b>{}</b>", strings.no_active_alerts),
            Ok(digest) => digest,
            Err(error) => {
                tracing::warn!(error = %error, "active alerts digest failed");
                format!("<b>{error}</b>")
            }
        }
    }

    fn schedule_auto_unmute(&self, duration: Duration, generation: u64) {
        let mute = Arc::clone(&self.mute);
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if mute.unmute_if_current(generation) {
                tracing::info!(generation, "mute expired");
            }
        });
    }
}

/// Polls one batch of updates and handles their messages. Returns the next
/// update offset.
pub async fn poll_operator_updates_once(
    client: &TelegramClient,
    runtime: &OperatorCommandRuntime,
    offset: i64,
    timeout_secs: u64,
) -> Result<i64, DeliveryError> {
    let updates = client.get_updates(offset, timeout_secs).await?;
    let mut next_offset = offset;
    for update in updates {
        next_offset = next_offset.max(update.update_id.saturating_add(1));
        if let Some(message) = update.message.as_ref() {
            runtime.handle_operator_message(message).await?;
        }
    }
    Ok(next_offset)
}

/// Long-polls Telegram for operator commands until the outbound queue closes.
pub async fn run_operator_command_loop(client: TelegramClient, runtime: OperatorCommandRuntime) {
    let mut offset = 0;
    tracing::info!("operator command polling started");
    loop {
        match poll_operator_updates_once(&client, &runtime, offset, UPDATE_POLL_TIMEOUT_SECS).await
        {
            Ok(next_offset) => offset = next_offset,
            Err(DeliveryError::QueueClosed) => {
                tracing::info!("outbound queue closed; stopping operator command polling");
                return;
            }
            Err(error) => {
                tracing::warn!(error = %error, "telegram update polling failed");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
            }
        }
    }
}
