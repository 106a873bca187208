// [libs/domain/alerting/src/errors.rs]
//! =================================================================
//! APARATO: ALERT ENGINE ERROR CATALOG
//! RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE EVALUACIÓN Y AVISO
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlertingError {
    #[error("[L2_ALERT_NUMERIC_FAULT]: value cannot be coerced to a number: {0}")]
    NotNumeric(String),

    #[error("[L2_ALERT_PATTERN_FAULT]: invalid regular expression in rule: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("[L2_ALERT_RULE_FAULT]: unknown rule id: {0}")]
    UnknownRule(String),

    #[error("[L2_ALERT_ALERT_FAULT]: unknown alert id: {0}")]
    UnknownAlert(String),

    #[error("[L2_ALERT_STORAGE_FAULT]: {0}")]
    StorageFault(#[from] netarchon_storage::StorageError),

    #[error("[L2_ALERT_NOTIFY_FAULT]: {0}")]
    NotifyFault(String),

    #[error("[L2_ALERT_RATE_LIMITED]: channel suppressed by rate limiter")]
    RateLimited,
}
