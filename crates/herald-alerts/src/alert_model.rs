//! Alertmanager payload model.
//!
//! Covers both the webhook body Alertmanager pushes and the `/api/v1/alerts`
//! response used for on-demand digests.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ALERT_JOB_LABEL: &str = "job";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
/// Public struct `AlertmanagerWebhook` used across Herald components.
pub struct AlertmanagerWebhook {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActiveAlertsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Vec<Alert>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
/// Public struct `Alert` used across Herald components.
pub struct Alert {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Webhook alerts carry `"firing"`/`"resolved"`; the v1 API returns an
    /// object here instead.
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(rename = "startsAt", default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(rename = "endsAt", default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(rename = "generatorURL", default)]
    pub generator_url: String,
}

impl Alert {
    pub fn label(&self, name: &str) -> &str {
        self.labels.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn name(&self) -> &str {
        self.label("alertname")
    }

    pub fn job(&self) -> &str {
        self.label(ALERT_JOB_LABEL)
    }

    /// `firing` or `resolved`.
    pub fn status_at(&self, now: DateTime<Utc>) -> &'static str {
        if let Some(Value::String(status)) = self.status.as_ref() {
            if status.eq_ignore_ascii_case("resolved") {
                return "resolved";
            }
            if status.eq_ignore_ascii_case("firing") {
                return "firing";
            }
        }
        // Alertmanager reports unresolved alerts with a zero-year end time.
        match self.ends_at {
            Some(ends_at) if ends_at.year() > 1 && ends_at <= now => "resolved",
            _ => "firing",
        }
    }

    pub fn template_view(&self, now: DateTime<Utc>) -> AlertTemplateView {
        AlertTemplateView {
            name: self.name().to_string(),
            status: self.status_at(now).to_string(),
            labels: self.labels.clone(),
            annotations: self.annotations.clone(),
            starts_at: self.starts_at.map(|at| at.to_rfc3339()).unwrap_or_default(),
            ends_at: self.ends_at.map(|at| at.to_rfc3339()).unwrap_or_default(),
            generator_url: self.generator_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
/// Context handed to alert templates.
pub struct AlertTemplateView {
    pub name: String,
    pub status: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
    pub starts_at: String,
    pub ends_at: String,
    pub generator_url: String,
}
