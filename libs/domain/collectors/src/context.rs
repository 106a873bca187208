// [libs/domain/collectors/src/context.rs]
//! =================================================================
//! APARATO: COLLECTION CONTEXT
//! RESPONSABILIDAD: ENTORNO DE EJECUCIÓN INYECTADO A CADA COLECCIONISTA
//! =================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use netarchon_credentials::Credentials;
use netarchon_models::Device;
use netarchon_probe::{Prober, ShellExecutor};
use reqwest::Client;
use tokio_util::sync::CancellationToken;

/// Todo lo que un `Collector` necesita para una única ronda de
/// recolección, inyectado por el coordinador. Ningún coleccionista
/// construye sus propios adaptadores de red -- todos llegan por aquí.
pub struct CollectionContext {
    pub device: Device,
    pub credentials: Option<Credentials>,
    pub http_client: Client,
    pub prober: Arc<dyn Prober>,
    pub shell: Arc<dyn ShellExecutor>,
    pub deadline: Instant,
    pub cancellation: CancellationToken,
}

impl CollectionContext {
    pub fn policy_flagged(&self) -> bool {
        self.device.policy_flagged
    }

    /// Presupuesto de tiempo restante antes del `deadline` duro. Nunca
    /// negativo -- satura a cero una vez vencido.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
