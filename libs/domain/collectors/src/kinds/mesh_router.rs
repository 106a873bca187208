// [libs/domain/collectors/src/kinds/mesh_router.rs]
//! =================================================================
//! APARATO: MESH ROUTER COLLECTOR
//! RESPONSABILIDAD: ESTADO DE MALLA WI-FI VÍA ENDPOINT JSON
//! =================================================================

use async_trait::async_trait;
use chrono::Utc;
use netarchon_models::{DeviceKind, MetricFamily, MetricPoint, MetricUnit, MetricValue};
use serde::Deserialize;

use crate::collector::Collector;
use crate::connectivity;
use crate::context::CollectionContext;
use crate::errors::CollectorError;
use crate::performance;

const PROBE_PORTS: &[u16] = &[80, 443];

#[derive(Debug, Deserialize)]
pub(crate) struct MeshStatusPayload {
    pub connected_clients: u32,
    pub mesh_health: String,
}

pub struct MeshRouterCollector;

#[async_trait]
impl Collector for MeshRouterCollector {
    async fn collect(&self, ctx: &CollectionContext) -> Vec<MetricPoint> {
        let mut points = Vec::new();
        points.extend(connectivity::probe(ctx).await);
        if !ctx.policy_flagged() {
            points.extend(performance::probe_ports(ctx, PROBE_PORTS).await);
        }

        match fetch_mesh_status(ctx).await {
            Ok(status) => {
                points.extend(client_count_point(ctx, &status));
                points.extend(mesh_health_point(ctx, &status));
            }
            Err(error) => points.push(error_point(ctx, &error)),
        }

        points
    }
}

pub(crate) async fn fetch_mesh_status(
    ctx: &CollectionContext,
) -> Result<MeshStatusPayload, CollectorError> {
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
        .json::<MeshStatusPayload>()
        .await
        .map_err(|e| CollectorError::ParseFailure(e.to_string()))
}

pub(crate) fn client_count_point(
    ctx: &CollectionContext,
    status: &MeshStatusPayload,
) -> Option<MetricPoint> {
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

pub(crate) fn mesh_health_point(
    ctx: &CollectionContext,
    status: &MeshStatusPayload,
) -> Option<MetricPoint> {
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

pub(crate) fn error_point(ctx: &CollectionContext, error: &CollectorError) -> MetricPoint {
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
