// [apps/sentinel/src/alert_engine.rs]
//! =================================================================
//! APARATO: ALERT ENGINE WIRING
//! RESPONSABILIDAD: COMPOSICIÓN DEL MOTOR DE ALERTAS Y SUS CANALES
//! =================================================================

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use netarchon_alerting::{AlertEngine, ChatWebhookChannel, EmailChannel, InAppStreamChannel, SmtpSettings, WebhookChannel};
use netarchon_models::NotificationChannelKind;
use netarchon_storage::MetricsStore;
use netarchon_support::TelemetryConfig;
use tracing::info;

/// Construye el motor de alertas y registra únicamente los canales de
/// notificación para los que el despliegue aportó configuración --
/// un daemon sin SMTP ni webhooks configurados sigue siendo capaz de
/// evaluar reglas y dejar alertas disponibles vía `InAppStreamChannel`.
pub fn build_alert_engine(config: &TelemetryConfig, store: MetricsStore) -> Arc<AlertEngine> {
    let engine = Arc::new(AlertEngine::new(store));

    let rate_limit_window = ChronoDuration::minutes(config.notification_rate_limit_minutes);
    let max_per_window = config.notification_rate_limit_max_per_window;

    engine.register_channel(Arc::new(InAppStreamChannel::new(rate_limit_window, max_per_window)));
    info!(channel = ?NotificationChannelKind::InAppStream, "🔔 [ALERT_ENGINE]: channel registered");

    if let (Some(host), Some(username), Some(password), Some(from), Some(to)) = (
        config.smtp_host.clone(),
        config.smtp_username.clone(),
        config.smtp_password.clone(),
        config.smtp_from_address.clone(),
        config.smtp_to_address.clone(),
    ) {
        let settings = SmtpSettings {
            relay_host: host,
            username,
            password,
            from_address: from,
            to_address: to,
        };
        engine.register_channel(Arc::new(EmailChannel::new(settings, rate_limit_window, max_per_window)));
        info!(channel = ?NotificationChannelKind::Email, "🔔 [ALERT_ENGINE]: channel registered");
    }

    let http_client = reqwest::Client::new();

    if let Some(endpoint) = config.webhook_endpoint.clone() {
        engine.register_channel(Arc::new(WebhookChannel::new(
            http_client.clone(),
            endpoint,
            rate_limit_window,
            max_per_window,
        )));
        info!(channel = ?NotificationChannelKind::Webhook, "🔔 [ALERT_ENGINE]: channel registered");
    }

    if let Some(endpoint) = config.chat_webhook_endpoint.clone() {
        engine.register_channel(Arc::new(ChatWebhookChannel::new(
            http_client,
            endpoint,
            rate_limit_window,
            max_per_window,
        )));
        info!(channel = ?NotificationChannelKind::ChatWebhook, "🔔 [ALERT_ENGINE]: channel registered");
    }

    engine
}
