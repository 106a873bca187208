// [libs/core/stats-engine/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DESCRIPTIVE STATISTICS ENGINE (V1.0 - SOBERANO)
 * CLASIFICACIÓN: CORE UTILITY (ESTRATO L1)
 * RESPONSABILIDAD: CÁLCULO DE MEDIA, DESVIACIÓN, PERCENTILES Y Z-SCORE
 *
 * VISION HIPER-HOLÍSTICA:
 * Aislado de cualquier noción de dispositivo o familia de métrica:
 * el motor opera sobre `&[f64]` puros para que tanto el agregador
 * horario (netarchon-storage) como el lazo de baselines
 * (netarchon-alerting) compartan una única implementación auditable.
 * =================================================================
 */

pub mod descriptive;
pub mod percentile;
pub mod anomaly;

pub use descriptive::DescriptiveSummary;
pub use anomaly::{anomaly_z_score, is_anomalous};
pub use percentile::percentile;
