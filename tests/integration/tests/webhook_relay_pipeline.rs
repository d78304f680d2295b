use std::{net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use herald_alerts::AlertTemplates;
use herald_delivery::{
    outbound_channel, BotMessage, DeliveryError, MessageSink, MuteGate, OperatorCommandRuntime,
    TelegramChat, TelegramMessage, TelegramUser,
};
use herald_gateway::{build_herald_router, GatewayState};
use herald_jira::strike;
use serde_json::json;
use tempfile::TempDir;
use tokio::{net::TcpListener, sync::Mutex as AsyncMutex};

const RELAY_CHAT_ID: i64 = -100_555;

#[derive(Default)]
struct RecordingSink {
    delivered: AsyncMutex<Vec<BotMessage>>,
}

impl RecordingSink {
    async fn texts(&self) -> Vec<String> {
        self.delivered
            .lock()
            .await
            .iter()
            .map(|message| message.text.clone())
            .collect()
    }

    async fn wait_for(&self, expected: usize) -> Vec<String> {
        for _ in 0..200 {
            let texts = self.texts().await;
            if texts.len() >= expected {
                return texts;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {expected} delivered messages");
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn deliver(&self, message: &BotMessage) -> Result<(), DeliveryError> {
        self.delivered.lock().await.push(message.clone());
        Ok(())
    }
}

struct RelayHarness {
    addr: SocketAddr,
    sink: Arc<RecordingSink>,
    commands: OperatorCommandRuntime,
    _templates: TempDir,
}

impl RelayHarness {
    async fn start() -> Self {
        let templates = tempfile::tempdir().expect("templates dir");
        std::fs::write(
            templates.path().join("alert.html"),
            "{{ name }} ({{ label(labels, \"severity\") }})",
        )
        .expect("write alert template");
        let alert_templates =
            Arc::new(AlertTemplates::from_dir(templates.path()).expect("load templates"));

        let sink = Arc::new(RecordingSink::default());
        let mute = Arc::new(MuteGate::new());
        let (outbound, dispatcher) = outbound_channel(sink.clone(), Arc::clone(&mute));
        tokio::spawn(dispatcher.run());

        let commands = OperatorCommandRuntime {
            mute,
            outbound: outbound.clone(),
            alerts: None,
            started_at: Utc::now() - chrono::Duration::minutes(1),
        };
        let state = Arc::new(GatewayState {
            chat_id: RELAY_CHAT_ID,
            outbound,
            templates: alert_templates,
        });
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral listener");
        let addr = listener.local_addr().expect("listener addr");
        let app = build_herald_router(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        tokio::time::sleep(Duration::from_millis(25)).await;

        Self {
            addr,
            sink,
            commands,
            _templates: templates,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn operator(&self, text: &str) -> String {
        let message = TelegramMessage {
            message_id: 1,
            date: Utc::now().timestamp(),
            text: Some(text.to_string()),
            chat: TelegramChat { id: 7 },
            from: Some(TelegramUser {
                id: 7,
                username: None,
                language_code: Some("en".to_string()),
            }),
        };
        let reply = self
            .commands
            .reply_to(&message)
            .await
            .expect("command reply");
        self.commands
            .outbound
            .enqueue(reply.clone())
            .await
            .expect("enqueue reply");
        reply.text
    }
}

fn multi_field_update() -> serde_json::Value {
    json!({
        "webhookEvent": "jira:issue_updated",
        "issue_event_type_name": "issue_updated",
        "user": {"displayName": "Dana"},
        "issue": {
            "key": "OPS-12",
            "self": "https://jira.example.com/rest/api/2/issue/12",
            "fields": {"summary": "Rotate keys"}
        },
        "changelog": {"items": [
            {"field": "summary", "from": null, "fromString": "Rotate key", "to": null, "toString": "Rotate keys"},
            {"field": "priority", "from": "3", "fromString": "Low", "to": "2", "toString": "High"}
        ]}
    })
}

#[tokio::test]
async fn integration_multi_field_jira_update_arrives_as_one_split_message() {
    let harness = RelayHarness::start().await;
    let response = reqwest::Client::new()
        .post(harness.url("/api/v1/jira"))
        .body(multi_field_update().to_string())
        .send()
        .await
        .expect("post jira webhook");
    assert_eq!(response.status().as_u16(), 200);

    let texts = harness.sink.wait_for(1).await;
    let link = "<a href=\"https://jira.example.com/browse/OPS-12\">";
    let expected = format!(
        "Dana renamed {link}{}</a> to {link}Rotate keys</a>\n\n{link}Rotate keys</a>. Dana changed <b>priority</b> from \"{}\" to \"High\"",
        strike("Rotate key"),
        strike("Low"),
    );
    assert_eq!(texts, vec![expected]);
}

#[tokio::test]
async fn integration_mute_drops_notifications_but_not_operator_replies() {
    let harness = RelayHarness::start().await;
    let mute_reply = harness.operator("/mute 10m").await;
    assert!(mute_reply.starts_with("<b>Muted until "));

    let client = reqwest::Client::new();
    let response = client
        .post(harness.url("/api/v1/alert"))
        .body(
            json!({"alerts": [{"status": "firing", "labels": {"alertname": "Down", "severity": "critical"}}]})
                .to_string(),
        )
        .send()
        .await
        .expect("post alert webhook");
    assert_eq!(response.status().as_u16(), 200);
    harness.sink.wait_for(1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(harness.operator("/unmute").await, "<b>Unmuted</b>");
    let response = client
        .post(harness.url("/api/v1/message"))
        .form(&[("message", "back online")])
        .send()
        .await
        .expect("post message");
    assert_eq!(response.status().as_u16(), 200);

    let texts = harness.sink.wait_for(3).await;
    assert_eq!(texts[0], mute_reply);
    assert_eq!(texts[1], "<b>Unmuted</b>");
    assert_eq!(texts[2], "back online");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.sink.texts().await.len(), 3);
}

#[tokio::test]
async fn integration_alert_webhook_renders_labels_in_relay_chat() {
    let harness = RelayHarness::start().await;
    let response = reqwest::Client::new()
        .post(harness.url("/api/v1/alert?template=alert.html"))
        .body(
            json!({"alerts": [
                {"status": "firing", "labels": {"alertname": "DiskFull", "severity": "warning"}},
                {"status": "firing", "labels": {"alertname": "Down"}}
            ]})
            .to_string(),
        )
        .send()
        .await
        .expect("post alert webhook");
    assert_eq!(response.status().as_u16(), 200);

    let texts = harness.sink.wait_for(2).await;
    assert_eq!(texts, vec!["DiskFull (warning)", "Down ()"]);
    let delivered = harness.sink.delivered.lock().await;
    assert!(delivered
        .iter()
        .all(|message| message.chat_id == RELAY_CHAT_ID && message.mutable));
}
