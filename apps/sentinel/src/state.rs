// [apps/sentinel/src/state.rs]
//! =================================================================
//! APARATO: APPLICATION STATE
//! RESPONSABILIDAD: RAÍZ DE COMPOSICIÓN COMPARTIDA DEL DAEMON
//! =================================================================

use std::sync::Arc;

use netarchon_alerting::AlertEngine;
use netarchon_storage::MetricsStore;
use netarchon_support::TelemetryConfig;

use crate::coordinator::Coordinator;

/// Agrupa las tres fachadas de dominio que el daemon expone como
/// llamadas de método Rust -- no existe un límite de protocolo (HTTP,
/// GraphQL) por delante de estas; el único consumidor es este mismo
/// binario.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TelemetryConfig>,
    pub store: MetricsStore,
    pub coordinator: Arc<Coordinator>,
    pub alert_engine: Arc<AlertEngine>,
}
