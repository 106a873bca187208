// [libs/domain/alerting/src/notification/email.rs]
//! =================================================================
//! APARATO: EMAIL NOTIFICATION CHANNEL
//! RESPONSABILIDAD: ENVÍO DE ALERTAS POR SMTP
//! =================================================================

use async_trait::async_trait;
use chrono::{Duration, Utc};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use netarchon_models::{Alert, NotificationChannelKind};

use crate::rate_limiter::RateLimiter;

use super::{NotificationChannel, NotificationOutcome};

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub relay_host: String,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub to_address: String,
}

pub struct EmailChannel {
    settings: SmtpSettings,
    rate_limiter: RateLimiter,
}

impl EmailChannel {
    pub fn new(settings: SmtpSettings, rate_limit_window: Duration, max_per_window: u32) -> Self {
        Self {
            settings,
            rate_limiter: RateLimiter::new(rate_limit_window, max_per_window),
        }
    }

    fn render_body(alert: &Alert) -> String {
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
            "Rule {rule_name} breached on {device_name}: current value {:.2}, threshold {:?}, severity {:?}",
            alert.current_value, alert.threshold_value, alert.severity
        )
    }
}

/// Envía el mensaje de forma síncrona dentro de `spawn_blocking` --
/// ninguna crate SMTP del ecosistema ofrece un transporte `async`
/// nativo sin tirar de un runtime distinto al ya elegido para el resto
/// del motor.
fn send_blocking(settings: SmtpSettings, subject: String, body: String) -> Result<(), String> {
    let email = Message::builder()
        .from(settings.from_address.parse().map_err(|e| format!("{e}"))?)
        .to(settings.to_address.parse().map_err(|e| format!("{e}"))?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|e| format!("{e}"))?;

    let credentials = Credentials::new(settings.username.clone(), settings.password.clone());
    let transport = SmtpTransport::relay(&settings.relay_host)
        .map_err(|e| format!("{e}"))?
        .credentials(credentials)
        .build();

    transport.send(&email).map_err(|e| format!("{e}")).map(|_| ())
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn kind(&self) -> NotificationChannelKind {
        NotificationChannelKind::Email
    }

    async fn send(&self, alert: &Alert) -> NotificationOutcome {
        let now = Utc::now();
        if !self.rate_limiter.allows(&alert.rule_id, &alert.device_id, now) {
            return NotificationOutcome::failed("suppressed by rate limiter");
        }

        let settings = self.settings.clone();
        let subject = format!("[{:?}] NetArchon alert {}", alert.severity, alert.rule_id);
        let body = Self::render_body(alert);

        let result = tokio::task::spawn_blocking(move || send_blocking(settings, subject, body)).await;
        self.rate_limiter.record(&alert.rule_id, &alert.device_id, now);

        match result {
            Ok(Ok(())) => NotificationOutcome::ok(),
            Ok(Err(e)) => NotificationOutcome::failed(e),
            Err(join_fault) => NotificationOutcome::failed(format!("email task panicked: {join_fault}")),
        }
    }
}
