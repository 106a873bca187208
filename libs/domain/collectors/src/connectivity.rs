// [libs/domain/collectors/src/connectivity.rs]
//! =================================================================
//! APARATO: SHARED CONNECTIVITY PROBE
//! RESPONSABILIDAD: ALCANZABILIDAD Y LATENCIA COMUNES A TODA LA FLOTA
//! =================================================================

use chrono::Utc;
use netarchon_models::{MetricFamily, MetricPoint, MetricUnit, MetricValue};
use serde_json::json;

use crate::context::CollectionContext;

/// Sonda de alcanzabilidad compartida por los seis tipos de
/// dispositivo. Siempre produce un punto -- un dispositivo caído es
/// información, no una falla de recolección.
pub async fn probe(ctx: &CollectionContext) -> Option<MetricPoint> {
    let result = ctx
        .prober
        .probe(&ctx.device.address, ctx.remaining())
        .await
        .ok()?;

    let point = MetricPoint::new(
        ctx.device.id.clone(),
        &ctx.device.name,
        ctx.device.kind,
        MetricFamily::Connectivity,
        "reachable",
        MetricValue::Bool(result.reachable),
        MetricUnit::Boolean,
        Utc::now(),
    )
    .ok()?;

    Some(point.with_metadata(
        "latency_ms",
        json!(result.latency.as_secs_f64() * 1000.0),
    ))
}
