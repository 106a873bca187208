// [apps/sentinel/src/coordinator/registry.rs]
//! =================================================================
//! APARATO: DEVICE REGISTRY ENTRY
//! RESPONSABILIDAD: ESTADO DE PROGRAMACIÓN POR DISPOSITIVO
//! =================================================================

use chrono::{DateTime, Utc};
use netarchon_models::Device;

/// Entrada de la flota registrada en el coordinador. `last_attempt`
/// marca el instante del último despacho, no el de finalización --
/// ver `Coordinator::collect_due_devices`.
pub struct DeviceEntry {
    pub device: Device,
    pub last_attempt: Option<DateTime<Utc>>,
}
