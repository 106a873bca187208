// [libs/domain/alerting/src/notification/chat_webhook.rs]
//! =================================================================
//! APARATO: CHAT WEBHOOK NOTIFICATION CHANNEL
//! RESPONSABILIDAD: ENTREGA DE ALERTAS A PLATAFORMAS DE CHAT (SLACK/DISCORD)
//!
//! Generaliza `WebhookChannel`: la forma del payload la esperan Slack y
//! Discord (campo `text`/`content` de texto libre), no el JSON estructural
//! de un webhook genérico.
//! =================================================================

use async_trait::async_trait;
use chrono::{Duration, Utc};
use netarchon_models::{Alert, NotificationChannelKind};
use reqwest::Client;
use serde_json::json;

use crate::rate_limiter::RateLimiter;

use super::{NotificationChannel, NotificationOutcome};

pub struct ChatWebhookChannel {
    client: Client,
    endpoint: String,
    rate_limiter: RateLimiter,
}

impl ChatWebhookChannel {
    pub fn new(client: Client, endpoint: impl Into<String>, rate_limit_window: Duration, max_per_window: u32) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            rate_limiter: RateLimiter::new(rate_limit_window, max_per_window),
        }
    }

    fn render_text(alert: &Alert) -> String {
        let rule_name = alert
            .metadata
            .get("rule_name")
            .and_then(|v| v.as_str())
            .unwrap_or(alert.rule_id.as_str());
        let device_name = alert
            .metadata
            .get("device_name")
            .and_then(|v| v.as_str())
            .unwrap_or(alert.device_id.as_str());
        format!(
            ":rotating_light: [{:?}] {rule_name} on {device_name} -- value {:.2} (threshold {:?})",
            alert.severity, alert.current_value, alert.threshold_value
        )
    }
}

#[async_trait]
impl NotificationChannel for ChatWebhookChannel {
    fn kind(&self) -> NotificationChannelKind {
        NotificationChannelKind::ChatWebhook
    }

    async fn send(&self, alert: &Alert) -> NotificationOutcome {
        let now = Utc::now();
        if !self.rate_limiter.allows(&alert.rule_id, &alert.device_id, now) {
            return NotificationOutcome::failed("suppressed by rate limiter");
        }

        let text = Self::render_text(alert);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "text": text, "content": text }))
            .send()
            .await;
        self.rate_limiter.record(&alert.rule_id, &alert.device_id, now);

        match response {
            Ok(resp) if resp.status().is_success() => NotificationOutcome::ok(),
            Ok(resp) => NotificationOutcome::failed(format!("chat webhook responded with status {}", resp.status())),
            Err(e) => NotificationOutcome::failed(format!("chat webhook delivery fault: {e}")),
        }
    }
}
