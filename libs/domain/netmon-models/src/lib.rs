// [libs/domain/netmon-models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: NETMON DOMAIN MODEL BARREL (V1.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: EXPOSICIÓN DE ENTIDADES DEL DOMINIO DE TELEMETRÍA
 *
 * VISION HIPER-HOLÍSTICA:
 * Single Source of Truth para los tipos que cruzan las fronteras
 * Collector -> Coordinator -> Storage -> AlertEngine. Ninguna otra
 * crate define su propia forma de MetricPoint, Device o Alert.
 * =================================================================
 */

pub mod device;
pub mod errors;
pub mod metric;
pub mod rollup;
pub mod baseline;
pub mod alert;

pub use device::{Device, DeviceId, DeviceKind};
pub use errors::ModelError;
pub use metric::{MetricFamily, MetricPoint, MetricUnit, MetricValue};
pub use rollup::HourlyRollup;
pub use baseline::Baseline;
pub use alert::{
    Alert, AlertRule, AlertSeverity, AlertStatus, NotificationAttempt, NotificationChannelKind,
    RuleOperator,
};
