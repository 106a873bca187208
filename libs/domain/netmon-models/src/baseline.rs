// [libs/domain/netmon-models/src/baseline.rs]
/*!
 * =================================================================
 * APARATO: STATISTICAL BASELINE RECORD (V1.0)
 * RESPONSABILIDAD: PERFIL DE COMPORTAMIENTO PARA DETECCIÓN DE ANOMALÍAS
 *
 * Vive únicamente en memoria; se reconstruye cada hora a partir de los
 * últimos 7 días de datos crudos y se reemplaza de forma atómica para
 * que ningún lector observe un baseline a medio escribir.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
    /// Media esperada por hora del día, slots 0..23.
    pub hourly_profile: [f64; 24],
    /// Media esperada por día de la semana, slots 0=domingo..6=sábado
    /// (convención de `chrono::Weekday::num_days_from_sunday`).
    pub daily_profile: [f64; 7],
    pub sample_count: u64,
    pub last_updated: DateTime<Utc>,
    /// Proxy de calidad del baseline en [0,1], escala con el tamaño
    /// de muestra: min(1.0, sample_count / 100).
    pub confidence: f64,
}

impl Baseline {
    pub fn confidence_for(sample_count: u64) -> f64 {
        (sample_count as f64 / 100.0).min(1.0)
    }
}
