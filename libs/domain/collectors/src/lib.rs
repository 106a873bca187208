// [libs/domain/collectors/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DEVICE COLLECTOR FLEET (V1.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: EXTRACCIÓN DE MÉTRICAS POR TIPO DE DISPOSITIVO
 *
 * VISION HIPER-HOLÍSTICA:
 * Cada tipo de dispositivo es un módulo hoja que compone funciones
 * libres compartidas (`connectivity`, `performance`) en vez de heredar
 * de una clase base -- no existe jerarquía de herencia en Rust y no
 * se simula una con traits de marcador vacíos. Ningún coleccionista
 * devuelve `Err`: toda falla se repliega en un `MetricPoint` sintético
 * de error para que una sola sonda caída nunca tumbe el resto de la
 * ronda de recolección del dispositivo.
 * =================================================================
 */

mod collector;
mod connectivity;
mod context;
mod errors;
mod kinds;
mod performance;

pub use collector::{collector_for, Collector};
pub use context::CollectionContext;
pub use errors::CollectorError;

pub use kinds::cable_modem::CableModemCollector;
pub use kinds::gateway::GatewayCollector;
pub use kinds::generic::GenericCollector;
pub use kinds::linux_server::LinuxServerCollector;
pub use kinds::mesh_router::MeshRouterCollector;
pub use kinds::mesh_satellite::MeshSatelliteCollector;
