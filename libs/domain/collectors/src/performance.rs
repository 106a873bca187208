// [libs/domain/collectors/src/performance.rs]
//! =================================================================
//! APARATO: SHARED PORT-SCAN PERFORMANCE PROBE
//! RESPONSABILIDAD: CONTEO DE PUERTOS TCP RESPONSIVOS
//! =================================================================

use chrono::Utc;
use futures::future::join_all;
use netarchon_models::{MetricFamily, MetricPoint, MetricUnit, MetricValue};
use serde_json::json;

use crate::context::CollectionContext;

/// Sonda de puertos compartida. Respeta `ctx.policy_flagged()`: el
/// llamador debe evitar invocar esta función cuando el dispositivo está
/// marcado por política -- se mantiene como comprobación defensiva
/// adicional aquí porque un collector futuro podría olvidarlo.
pub async fn probe_ports(ctx: &CollectionContext, ports: &[u16]) -> Option<MetricPoint> {
    if ctx.policy_flagged() {
        return None;
    }

    let budget = ctx.remaining();
    let probes = ports
        .iter()
        .map(|&port| ctx.prober.probe_port(&ctx.device.address, port, budget));
    let results = join_all(probes).await;

    let open_ports: Vec<u16> = ports
        .iter()
        .zip(results.iter())
        .filter_map(|(&port, result)| match result {
            Ok(r) if r.reachable => Some(port),
            _ => None,
        })
        .collect();

    let point = MetricPoint::new(
        ctx.device.id.clone(),
        &ctx.device.name,
        ctx.device.kind,
        MetricFamily::Performance,
        "open_port_count",
        MetricValue::Int(open_ports.len() as i64),
        MetricUnit::Count,
        Utc::now(),
    )
    .ok()?;

    Some(point.with_metadata("open_ports", json!(open_ports)))
}
