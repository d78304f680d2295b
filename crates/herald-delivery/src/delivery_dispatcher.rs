//! Bounded outbound queue and its dispatcher task.
//!
//! Producers (HTTP ingress, operator commands) enqueue [`BotMessage`]s; a
//! single dispatcher drains the queue into a [`MessageSink`]. Delivery is
//! best-effort: failures are logged and the message is dropped.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::delivery_message::{BotMessage, DeliveryError, MessageSink};
use crate::delivery_mute::MuteGate;

pub const OUTBOUND_QUEUE_CAPACITY: usize = 10;

#[derive(Debug, Clone)]
/// Public struct `OutboundQueue` used across Herald components.
pub struct OutboundQueue {
    sender: mpsc::Sender<BotMessage>,
}

impl OutboundQueue {
    pub async fn enqueue(&self, message: BotMessage) -> Result<(), DeliveryError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| DeliveryError::QueueClosed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub delivered: u64,
    pub dropped_muted: u64,
    pub failed: u64,
}

pub struct OutboundDispatcher {
    receiver: mpsc::Receiver<BotMessage>,
    sink: Arc<dyn MessageSink>,
    mute: Arc<MuteGate>,
}

/// Creates the queue handle and the dispatcher draining it.
pub fn outbound_channel(
    sink: Arc<dyn MessageSink>,
    mute: Arc<MuteGate>,
) -> (OutboundQueue, OutboundDispatcher) {
    let (sender, receiver) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    (
        OutboundQueue { sender },
        OutboundDispatcher {
            receiver,
            sink,
            mute,
        },
    )
}

impl OutboundDispatcher {
    /// Drains the queue until every [`OutboundQueue`] handle is dropped.
    pub async fn run(mut self) -> DispatchSummary {
        let mut summary = DispatchSummary::default();
        while let Some(message) = self.receiver.recv().await {
            if message.mutable && self.mute.is_muted(Utc::now()) {
                tracing::debug!(chat_id = message.chat_id, "dropping notification while muted");
                summary.dropped_muted += 1;
                continue;
            }
            match self.sink.deliver(&message).await {
                Ok(()) => summary.delivered += 1,
                Err(error) => {
                    tracing::warn!(
                        chat_id = message.chat_id,
                        error = %error,
                        "outbound delivery failed"
                    );
                    summary.failed += 1;
                }
            }
        }
        summary
    }
}
