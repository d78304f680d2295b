use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use herald_alerts::AlertTemplates;
use herald_delivery::{
    outbound_channel, run_operator_command_loop, ActiveAlertsSource, MuteGate,
    OperatorCommandRuntime, TelegramClient, TelegramConfig,
};
use herald_gateway::{run_herald_gateway, GatewayServerConfig, GatewayState};

use crate::bootstrap_helpers::shutdown_signal;
use crate::cli_args::Cli;

const TELEGRAM_HTTP_TIMEOUT_MS: u64 = 70_000;
const ALERTMANAGER_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) async fn run_herald(cli: Cli) -> Result<()> {
    let templates = Arc::new(AlertTemplates::from_dir(&cli.templates_path).with_context(|| {
        format!(
            "failed to load templates from {}",
            cli.templates_path.display()
        )
    })?);

    let telegram = TelegramClient::new(TelegramConfig {
        api_base: cli.telegram_api_base.clone(),
        token: cli.token.clone(),
        http_timeout_ms: TELEGRAM_HTTP_TIMEOUT_MS,
    })
    .context("failed to build telegram client")?;
    let me = telegram
        .get_me()
        .await
        .context("telegram rejected the bot token")?;
    tracing::info!(
        bot_id = me.id,
        username = me.username.as_deref().unwrap_or(""),
        "telegram bot authorized"
    );

    let mute = Arc::new(MuteGate::new());
    let (outbound, dispatcher) = outbound_channel(Arc::new(telegram.clone()), Arc::clone(&mute));
    let dispatcher_handle = tokio::spawn(dispatcher.run());

    let poll_handle = if cli.poll {
        let alerts = match cli.alert_manager.as_ref() {
            Some(endpoint) => Some(ActiveAlertsSource {
                client: reqwest::Client::builder()
                    .timeout(ALERTMANAGER_HTTP_TIMEOUT)
                    .build()
                    .context("failed to build alertmanager http client")?,
                endpoint: endpoint.clone(),
                templates: Arc::clone(&templates),
            }),
            None => None,
        };
        let runtime = OperatorCommandRuntime {
            mute: Arc::clone(&mute),
            outbound: outbound.clone(),
            alerts,
            started_at: Utc::now(),
        };
        Some(tokio::spawn(run_operator_command_loop(telegram, runtime)))
    } else {
        None
    };

    let state = Arc::new(GatewayState {
        chat_id: cli.chat,
        outbound,
        templates,
    });
    let gateway_config = GatewayServerConfig {
        host: cli.host.clone(),
        port: cli.port,
    };
    let served = run_herald_gateway(&gateway_config, state, shutdown_signal()).await;

    if let Some(handle) = poll_handle {
        handle.abort();
        let _ = handle.await;
    }
    let summary = dispatcher_handle
        .await
        .context("outbound dispatcher task failed")?;
    tracing::info!(
        delivered = summary.delivered,
        dropped_muted = summary.dropped_muted,
        failed = summary.failed,
        "outbound dispatcher drained"
    );
    served
}
