// [libs/shared/telemetry-support/src/lib.rs]
/*!
 * =================================================================
 * APARATO: TELEMETRY SUPPORT (V1.0)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4)
 * RESPONSABILIDAD: CONFIGURACIÓN Y OBSERVABILIDAD COMPARTIDAS
 * =================================================================
 */

mod config;
mod logging;

pub use config::{ConfigError, TelemetryConfig};
pub use logging::init_tracing;
