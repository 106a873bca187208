// [libs/domain/alerting/src/notification/mod.rs]
//! =================================================================
//! APARATO: NOTIFICATION CHANNEL REGISTRY
//! RESPONSABILIDAD: CONTRATO COMÚN DE DESPACHO MULTICANAL
//! =================================================================

mod chat_webhook;
mod email;
mod in_app;
mod webhook;

pub use chat_webhook::ChatWebhookChannel;
pub use email::{EmailChannel, SmtpSettings};
pub use in_app::InAppStreamChannel;
pub use webhook::WebhookChannel;

use async_trait::async_trait;
use netarchon_models::{Alert, NotificationChannelKind};

#[derive(Debug, Clone)]
pub struct NotificationOutcome {
    pub success: bool,
    pub error: Option<String>,
}

impl NotificationOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Puerto de despacho de una alerta a un medio externo. Cada
/// implementación gestiona su propio límite de tasa; el motor nunca
/// asume que un canal concreto es "barato" de invocar.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn kind(&self) -> NotificationChannelKind;
    async fn send(&self, alert: &Alert) -> NotificationOutcome;
}
