//! Active-alert digests grouped by `job` label.

use std::collections::BTreeMap;

use reqwest::Client;

use crate::alert_model::{ActiveAlertsResponse, Alert};
use crate::alert_template::AlertTemplates;
use crate::AlertError;

/// Fetches currently active alerts from an Alertmanager instance.
pub async fn fetch_active_alerts(
    client: &Client,
    endpoint: &str,
) -> Result<Vec<Alert>, AlertError> {
    let url = format!("{}/api/v1/alerts", endpoint.trim().trim_end_matches('/'));
    tracing::debug!(url = url.as_str(), "fetching active alerts");
    let response = client.get(&url).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(AlertError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }
    let parsed: ActiveAlertsResponse = serde_json::from_str(&body).map_err(AlertError::Decode)?;
    Ok(parsed.data)
}

/// Renders every alert and groups the texts under per-job headers.
///
/// Groups are ordered by job name; alerts keep their input order inside a
/// group. A failed render contributes its error text in place of the alert.
pub fn group_alerts_by_job(
    alerts: &[Alert],
    templates: &AlertTemplates,
    template_name: &str,
) -> String {
    let mut by_job: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for alert in alerts {
        let text = templates
            .render(template_name, alert)
            .unwrap_or_else(|error| error.to_string());
        by_job.entry(alert.job()).or_default().push(text);
    }

    let mut lines = Vec::new();
    for (job, texts) in by_job {
        lines.push(format!("\n<b>{}:</b>", job_header(job)));
        lines.extend(texts);
    }
    lines.join("\n")
}

/// Fetches active alerts and renders them as one grouped digest message.
pub async fn compose_active_alerts_digest(
    client: &Client,
    endpoint: &str,
    templates: &AlertTemplates,
    template_name: &str,
) -> Result<String, AlertError> {
    let alerts = fetch_active_alerts(client, endpoint).await?;
    tracing::info!(alerts = alerts.len(), "composing active alerts digest");
    Ok(group_alerts_by_job(&alerts, templates, template_name))
}

fn job_header(job: &str) -> String {
    job.to_uppercase().replace('_', " ")
}
