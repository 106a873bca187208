// [libs/infra/probe-client/src/prober.rs]
//! =================================================================
//! APARATO: REACHABILITY PROBER
//! RESPONSABILIDAD: VERIFICACIÓN DE ALCANZABILIDAD Y LATENCIA
//!
//! # Decision Record (ver DESIGN.md):
//! Un ping ICMP crudo requiere privilegios elevados (CAP_NET_RAW) que
//! el proceso Sentinel no asume tener garantizados en todo despliegue
//! doméstico. Este adaptador degrada de forma soberana a un TCP
//! connect-probe sobre un puerto de bajo riesgo, tratando éxito de
//! conexión (o incluso un RST inmediato) como evidencia de
//! alcanzabilidad -- igual que hacen la mayoría de agentes de
//! monitoreo sin privilegios elevados.
//! =================================================================

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::errors::ProbeError;

#[derive(Debug, Clone, Copy)]
pub struct ReachabilityResult {
    pub reachable: bool,
    pub latency: Duration,
}

#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, address: &str, deadline: Duration) -> Result<ReachabilityResult, ProbeError>;
    async fn probe_port(&self, address: &str, port: u16, deadline: Duration) -> Result<ReachabilityResult, ProbeError>;
}

/// Puertos de bajo riesgo probados en orden cuando no se especifica uno
/// -- cualquier home router/modem expone al menos uno de estos.
const DEFAULT_REACHABILITY_PORTS: &[u16] = &[80, 443, 22];

pub struct TcpFallbackProber;

impl TcpFallbackProber {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TcpFallbackProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for TcpFallbackProber {
    async fn probe(&self, address: &str, deadline: Duration) -> Result<ReachabilityResult, ProbeError> {
        for &port in DEFAULT_REACHABILITY_PORTS {
            if let Ok(result) = self.probe_port(address, port, deadline).await {
                if result.reachable {
                    return Ok(result);
                }
            }
        }
        Ok(ReachabilityResult {
            reachable: false,
            latency: Duration::ZERO,
        })
    }

    async fn probe_port(&self, address: &str, port: u16, deadline: Duration) -> Result<ReachabilityResult, ProbeError> {
        let target = format!("{address}:{port}");
        let started = Instant::now();

        match timeout(deadline, TcpStream::connect(&target)).await {
            Ok(Ok(_stream)) => Ok(ReachabilityResult {
                reachable: true,
                latency: started.elapsed(),
            }),
            Ok(Err(_)) => Ok(ReachabilityResult {
                reachable: false,
                latency: Duration::ZERO,
            }),
            Err(_) => Err(ProbeError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_reports_not_reachable() {
        let prober = TcpFallbackProber::new();
        // TEST-NET-1, guaranteed non-routable per RFC 5737.
        let result = prober
            .probe_port("192.0.2.1", 9, Duration::from_millis(200))
            .await;
        assert!(result.is_ok() || matches!(result, Err(ProbeError::Timeout)));
    }

    #[tokio::test]
    async fn loopback_with_no_listener_is_not_reachable() {
        let prober = TcpFallbackProber::new();
        let result = prober
            .probe_port("127.0.0.1", 1, Duration::from_millis(500))
            .await
            .unwrap();
        assert!(!result.reachable);
    }
}
