//! HTTP ingress routes and handlers.

use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use herald_alerts::{AlertTemplates, AlertmanagerWebhook, DEFAULT_ALERT_TEMPLATE};
use herald_delivery::{BotMessage, OutboundQueue};
use herald_jira::{compose_jira_message, parse_jira_webhook_event};
use serde::Deserialize;
use serde_json::json;

pub const JIRA_WEBHOOK_ENDPOINT: &str = "/api/v1/jira";
pub const ALERT_WEBHOOK_ENDPOINT: &str = "/api/v1/alert";
pub const MESSAGE_ENDPOINT: &str = "/api/v1/message";
pub const HEALTH_ENDPOINT: &str = "/healthz";

#[derive(Debug, Clone)]
/// Public struct `GatewayState` used across Herald components.
pub struct GatewayState {
    pub chat_id: i64,
    pub outbound: OutboundQueue,
    pub templates: Arc<AlertTemplates>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AlertWebhookQuery {
    #[serde(default)]
    pub template: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageForm {
    #[serde(default)]
    pub message: String,
}

pub fn build_herald_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route(JIRA_WEBHOOK_ENDPOINT, post(handle_jira_webhook))
        .route(ALERT_WEBHOOK_ENDPOINT, post(handle_alert_webhook))
        .route(MESSAGE_ENDPOINT, post(handle_message))
        .route(HEALTH_ENDPOINT, get(handle_health))
        .with_state(state)
}

async fn handle_health() -> Response {
    (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
}

async fn handle_jira_webhook(State(state): State<Arc<GatewayState>>, body: String) -> Response {
    let event = match parse_jira_webhook_event(&body) {
        Ok(event) => event,
        Err(error) => {
            tracing::warn!(error = %error, "rejecting malformed jira webhook");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "rejected", "error": error.to_string()})),
            )
                .into_response();
        }
    };
    let text = compose_jira_message(&event);
    if text.is_empty() {
        tracing::debug!(
            webhook_event = event.webhook_event.as_str(),
            issue = event.issue.key.as_str(),
            "jira event produced no message"
        );
        return (StatusCode::OK, Json(json!({"status": "skipped"}))).into_response();
    }
    tracing::info!(
        webhook_event = event.webhook_event.as_str(),
        issue = event.issue.key.as_str(),
        "relaying jira event"
    );
    match enqueue(&state, text).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "queued", "messages": 1}))).into_response(),
        Err(response) => response,
    }
}

async fn handle_alert_webhook(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<AlertWebhookQuery>,
    body: String,
) -> Response {
    let webhook = match serde_json::from_str::<AlertmanagerWebhook>(&body) {
        Ok(webhook) => webhook,
        Err(error) => {
            tracing::warn!(error = %error, "rejecting malformed alertmanager webhook");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "rejected", "error": error.to_string()})),
            )
                .into_response();
        }
    };
    let template_name = query
        .template
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_ALERT_TEMPLATE);

    let mut queued = 0usize;
    let mut failed = 0usize;
    for alert in &webhook.alerts {
        let text = match state.templates.render(template_name, alert) {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(
                    alert = alert.name(),
                    template = template_name,
                    error = %error,
                    "alert render failed"
                );
                failed += 1;
                continue;
            }
        };
        if let Err(response) = enqueue(&state, text).await {
            return response;
        }
        queued += 1;
    }
    tracing::info!(
        alerts = webhook.alerts.len(),
        queued,
        failed,
        template = template_name,
        "relayed alertmanager webhook"
    );
    (
        StatusCode::OK,
        Json(json!({"status": "queued", "messages": queued, "render_failures": failed})),
    )
        .into_response()
}

async fn handle_message(
    State(state): State<Arc<GatewayState>>,
    Form(form): Form<MessageForm>,
) -> Response {
    if form.message.is_empty() {
        return (StatusCode::OK, Json(json!({"status": "skipped"}))).into_response();
    }
    match enqueue(&state, form.message).await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "queued", "messages": 1}))).into_response(),
        Err(response) => response,
    }
}

async fn enqueue(state: &GatewayState, text: String) -> Result<(), Response> {
    state
        .outbound
        .enqueue(BotMessage::notification(state.chat_id, text))
        .await
        .map_err(|error| {
            tracing::error!(error = %error, "outbound queue unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable", "error": error.to_string()})),
            )
                .into_response()
        })
}
