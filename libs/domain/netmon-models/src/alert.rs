// [libs/domain/netmon-models/src/alert.rs]
/*!
 * =================================================================
 * APARATO: ALERT RULE & INSTANCE MODEL (V1.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN DE REGLAS, SEVERIDAD Y CICLO DE VIDA
 *
 * # State Machine:
 *   (none) --trigger--> Active --ack--> Acknowledged
 *                          |                  |
 *                          +---resolve--------+---> Resolved (terminal)
 * =================================================================
 */

use crate::device::DeviceId;
use crate::metric::MetricFamily;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
    Emergency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationChannelKind {
    Email,
    Webhook,
    InAppStream,
    ChatWebhook,
}

/// Operador del predicado de una regla. `AnomalyDetection` delega en el
/// motor de baselines en lugar de comparar contra un umbral fijo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleOperator {
    GreaterThan(f64),
    LessThan(f64),
    Equals(f64),
    NotEquals(f64),
    Contains(String),
    RegexMatch(String),
    AnomalyDetection { sensitivity: f64 },
}

/// Configuración inmutable de una regla de alerta. Evaluada por el
/// motor sobre un filtro de dispositivo/familia/nombre y una ventana.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub device_filter: Option<Vec<DeviceId>>,
    pub family_filter: Option<Vec<MetricFamily>>,
    pub metric_name_filter: Option<Vec<String>>,
    pub operator: RuleOperator,
    pub severity: AlertSeverity,
    pub enabled: bool,
    pub evaluation_window: std::time::Duration,
    pub consecutive_breaches_required: u32,
    pub cooldown_minutes: i64,
    pub auto_resolve: bool,
    pub auto_resolve_minutes: i64,
    pub correlation_group: Option<String>,
    pub notification_channels: Vec<NotificationChannelKind>,
    pub custom_message_template: Option<String>,
}

impl AlertRule {
    pub fn matches_device(&self, device_id: &DeviceId) -> bool {
        match &self.device_filter {
            None => true,
            Some(ids) => ids.contains(device_id),
        }
    }

    pub fn matches_family(&self, family: MetricFamily) -> bool {
        match &self.family_filter {
            None => true,
            Some(families) => families.contains(&family),
        }
    }

    pub fn matches_metric_name(&self, name: &str) -> bool {
        match &self.metric_name_filter {
            None => true,
            Some(names) => names.iter().any(|n| n == name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationAttempt {
    pub channel: NotificationChannelKind,
    pub attempted_at: DateTime<Utc>,
    pub success: bool,
    pub error: Option<String>,
}

/// Instancia viva (o resuelta) de una alerta para un (rule, device).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub rule_id: String,
    pub device_id: DeviceId,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub triggered_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub current_value: f64,
    pub threshold_value: Option<f64>,
    pub breach_count: u32,
    pub notification_history: Vec<NotificationAttempt>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Alert {
    pub fn new(
        id: impl Into<String>,
        rule_id: impl Into<String>,
        device_id: DeviceId,
        severity: AlertSeverity,
        current_value: f64,
        threshold_value: Option<f64>,
        triggered_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            rule_id: rule_id.into(),
            device_id,
            severity,
            status: AlertStatus::Active,
            triggered_at,
            acknowledged_at: None,
            resolved_at: None,
            current_value,
            threshold_value,
            breach_count: 1,
            notification_history: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn acknowledge(&mut self, who: &str, at: DateTime<Utc>) {
        self.status = AlertStatus::Acknowledged;
        self.acknowledged_at = Some(at);
        self.metadata
            .insert("acknowledged_by".to_string(), serde_json::Value::String(who.to_string()));
    }

    pub fn resolve(&mut self, reason: &str, at: DateTime<Utc>) {
        self.status = AlertStatus::Resolved;
        self.resolved_at = Some(at);
        self.metadata.insert(
            "resolution_reason".to_string(),
            serde_json::Value::String(reason.to_string()),
        );
    }

    pub fn is_live(&self) -> bool {
        matches!(self.status, AlertStatus::Active | AlertStatus::Acknowledged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn new_alert_starts_active_with_breach_count_one() {
        let alert = Alert::new("a1", "r1", DeviceId::from("d1"), AlertSeverity::Warning, 90.0, Some(85.0), ts());
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.breach_count, 1);
        assert!(alert.is_live());
    }

    #[test]
    fn resolve_sets_terminal_status_and_reason() {
        let mut alert = Alert::new("a1", "r1", DeviceId::from("d1"), AlertSeverity::Warning, 90.0, Some(85.0), ts());
        alert.resolve("auto_resolve_timeout", ts());
        assert_eq!(alert.status, AlertStatus::Resolved);
        assert!(!alert.is_live());
        assert_eq!(
            alert.metadata.get("resolution_reason").and_then(|v| v.as_str()),
            Some("auto_resolve_timeout")
        );
    }
}
