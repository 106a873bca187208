// [libs/domain/netmon-models/src/rollup.rs]
/*!
 * =================================================================
 * APARATO: HOURLY ROLLUP RECORD (V1.0)
 * RESPONSABILIDAD: RESUMEN ESTADÍSTICO POR HORA DE UNA SERIE
 * =================================================================
 */

use crate::device::DeviceId;
use crate::metric::MetricFamily;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resumen de una hora cerrada o en curso para (device, family, name).
/// Uno por clave y hora; recalculado en cada lote que toque la hora.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRollup {
    pub device_id: DeviceId,
    pub family: MetricFamily,
    pub metric_name: String,
    pub hour_start: DateTime<Utc>,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub count: u64,
    pub sum: f64,
}

impl HourlyRollup {
    /// Invariante testeable §8.2: min <= mean <= max siempre que count > 0.
    pub fn is_internally_consistent(&self) -> bool {
        if self.count == 0 {
            return self.min == 0.0 && self.max == 0.0 && self.mean == 0.0;
        }
        self.min <= self.mean && self.mean <= self.max
    }
}
