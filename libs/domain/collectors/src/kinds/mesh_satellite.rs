// [libs/domain/collectors/src/kinds/mesh_satellite.rs]
//! =================================================================
//! APARATO: MESH SATELLITE COLLECTOR
//! RESPONSABILIDAD: ESTADO DE MALLA + RSSI DE BACKHAUL
//! =================================================================

use async_trait::async_trait;
use chrono::Utc;
use netarchon_models::{MetricFamily, MetricPoint, MetricUnit, MetricValue};
use serde::Deserialize;

use crate::collector::Collector;
use crate::connectivity;
use crate::context::CollectionContext;
use crate::errors::CollectorError;
use crate::performance;

const PROBE_PORTS: &[u16] = &[80, 443];

#[derive(Debug, Deserialize)]
struct SatelliteStatusPayload {
    connected_clients: u32,
    mesh_health: String,
    backhaul_rssi_dbm: Option<f64>,
}

pub struct MeshSatelliteCollector;

#[async_trait]
impl Collector for MeshSatelliteCollector {
    async fn collect(&self, ctx: &CollectionContext) -> Vec<MetricPoint> {
        let mut points = Vec::new();
        points.extend(connectivity::probe(ctx).await);
        if !ctx.policy_flagged() {
            points.extend(performance::probe_ports(ctx, PROBE_PORTS).await);
        }

        match fetch_satellite_status(ctx).await {
            Ok(status) => {
                points.extend(client_count_point(ctx, &status));
                points.extend(mesh_health_point(ctx, &status));
                points.extend(backhaul_rssi_point(ctx, &status));
            }
            Err(error) => points.push(error_point(ctx, &error)),
        }

        points
    }
}

async fn fetch_satellite_status(
    ctx: &CollectionContext,
) -> Result<SatelliteStatusPayload, CollectorError> {
    let url = format!("http://{}/api/status/mesh", ctx.device.address);
    let response = ctx
        .http_client
        .get(&url)
        .timeout(ctx.remaining())
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                CollectorError::Timeout
            } else {
                CollectorError::Unreachable
            }
        })?;

    response
        .json::<SatelliteStatusPayload>()
        .await
        .map_err(|e| CollectorError::ParseFailure(e.to_string()))
}

fn client_count_point(ctx: &CollectionContext, status: &SatelliteStatusPayload) -> Option<MetricPoint> {
    MetricPoint::new(
        ctx.device.id.clone(),
        &ctx.device.name,
        ctx.device.kind,
        MetricFamily::WifiMesh,
        "connected_clients",
        MetricValue::Int(status.connected_clients as i64),
        MetricUnit::Count,
        Utc::now(),
    )
    .ok()
}

fn mesh_health_point(ctx: &CollectionContext, status: &SatelliteStatusPayload) -> Option<MetricPoint> {
    MetricPoint::new(
        ctx.device.id.clone(),
        &ctx.device.name,
        ctx.device.kind,
        MetricFamily::WifiMesh,
        "mesh_health",
        MetricValue::Str(status.mesh_health.clone()),
        MetricUnit::None,
        Utc::now(),
    )
    .ok()
}

/// Ausente en dispositivos que aún no completaron el handshake de
/// backhaul -- se omite el punto en vez de sintetizar un cero engañoso.
fn backhaul_rssi_point(ctx: &CollectionContext, status: &SatelliteStatusPayload) -> Option<MetricPoint> {
    let rssi = status.backhaul_rssi_dbm?;
    MetricPoint::new(
        ctx.device.id.clone(),
        &ctx.device.name,
        ctx.device.kind,
        MetricFamily::WifiMesh,
        "backhaul_rssi",
        MetricValue::Float(rssi),
        MetricUnit::Dbm,
        Utc::now(),
    )
    .ok()
}

fn error_point(ctx: &CollectionContext, error: &CollectorError) -> MetricPoint {
    MetricPoint::collection_error(
        ctx.device.id.clone(),
        &ctx.device.name,
        ctx.device.kind,
        MetricFamily::WifiMesh,
        error.classify(),
        error.to_string(),
        Utc::now(),
    )
}
