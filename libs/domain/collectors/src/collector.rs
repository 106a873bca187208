// [libs/domain/collectors/src/collector.rs]
//! =================================================================
//! APARATO: COLLECTOR CONTRACT & FACTORY
//! RESPONSABILIDAD: PUERTO SOBERANO DE RECOLECCIÓN + REGISTRO DE TIPOS
//! =================================================================

use async_trait::async_trait;
use netarchon_models::{DeviceKind, MetricPoint};

use crate::context::CollectionContext;
use crate::kinds::{
    cable_modem::CableModemCollector, gateway::GatewayCollector, generic::GenericCollector,
    linux_server::LinuxServerCollector, mesh_router::MeshRouterCollector,
    mesh_satellite::MeshSatelliteCollector,
};

#[async_trait]
pub trait Collector: Send + Sync {
    /// Nunca devuelve `Err`. Toda falla interna se repliega en un punto
    /// `collection_error` dentro del vector devuelto.
    async fn collect(&self, ctx: &CollectionContext) -> Vec<MetricPoint>;
}

/// Selecciona la implementación concreta para un `DeviceKind`, igual
/// que el registro de repositorios del dominio original resuelve un
/// tipo de activo a su manejador concreto detrás de una única matriz
/// de acceso.
pub fn collector_for(kind: DeviceKind) -> Box<dyn Collector + Send + Sync> {
    match kind {
        DeviceKind::CableModem => Box::new(CableModemCollector),
        DeviceKind::MeshRouter => Box::new(MeshRouterCollector),
        DeviceKind::MeshSatellite => Box::new(MeshSatelliteCollector),
        DeviceKind::Gateway => Box::new(GatewayCollector),
        DeviceKind::LinuxServer => Box::new(LinuxServerCollector),
        DeviceKind::Generic => Box::new(GenericCollector),
    }
}
