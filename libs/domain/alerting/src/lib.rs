// [libs/domain/alerting/src/lib.rs]
/*!
 * =================================================================
 * APARATO: NETARCHON ALERT ENGINE (V1.0)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: EVALUACIÓN DE REGLAS, BASELINES Y NOTIFICACIÓN
 * =================================================================
 */

mod baseline;
mod engine;
mod errors;
mod notification;
mod predicate;
mod rate_limiter;

pub use baseline::compute_baseline;
pub use engine::AlertEngine;
pub use errors::AlertingError;
pub use notification::{
    ChatWebhookChannel, EmailChannel, InAppStreamChannel, NotificationChannel, NotificationOutcome, SmtpSettings,
    WebhookChannel,
};
pub use predicate::{evaluate as evaluate_predicate, NumericCoercion};
pub use rate_limiter::RateLimiter;
