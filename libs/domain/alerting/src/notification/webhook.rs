// [libs/domain/alerting/src/notification/webhook.rs]
//! =================================================================
//! APARATO: GENERIC WEBHOOK NOTIFICATION CHANNEL
//! RESPONSABILIDAD: ENTREGA DE ALERTAS COMO JSON POR HTTP POST
//! =================================================================

use async_trait::async_trait;
use chrono::{Duration, Utc};
use netarchon_models::{Alert, NotificationChannelKind};
use reqwest::Client;
use serde_json::json;

use crate::rate_limiter::RateLimiter;

use super::{NotificationChannel, NotificationOutcome};

pub struct WebhookChannel {
    client: Client,
    endpoint: String,
    rate_limiter: RateLimiter,
}

impl WebhookChannel {
    pub fn new(client: Client, endpoint: impl Into<String>, rate_limit_window: Duration, max_per_window: u32) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            rate_limiter: RateLimiter::new(rate_limit_window, max_per_window),
        }
    }

    fn payload(alert: &Alert) -> serde_json::Value {
        json!({
            "alert_id": alert.id,
            "rule_id": alert.rule_id,
            "device_id": alert.device_id.as_str(),
            "severity": alert.severity,
            "status": alert.status,
            "current_value": alert.current_value,
            "threshold_value": alert.threshold_value,
            "triggered_at": alert.triggered_at,
            "metadata": alert.metadata,
        })
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn kind(&self) -> NotificationChannelKind {
        NotificationChannelKind::Webhook
    }

    async fn send(&self, alert: &Alert) -> NotificationOutcome {
        let now = Utc::now();
        if !self.rate_limiter.allows(&alert.rule_id, &alert.device_id, now) {
            return NotificationOutcome::failed("suppressed by rate limiter");
        }

        let response = self.client.post(&self.endpoint).json(&Self::payload(alert)).send().await;
        self.rate_limiter.record(&alert.rule_id, &alert.device_id, now);

        match response {
            Ok(resp) if resp.status().is_success() => NotificationOutcome::ok(),
            Ok(resp) => NotificationOutcome::failed(format!("webhook responded with status {}", resp.status())),
            Err(e) => NotificationOutcome::failed(format!("webhook delivery fault: {e}")),
        }
    }
}
