// [libs/domain/collectors/src/kinds/gateway.rs]
//! =================================================================
//! APARATO: GATEWAY COLLECTOR
//! RESPONSABILIDAD: USO DE ANCHO DE BANDA Y ESTADO DE SEGURIDAD PERIMETRAL
//! =================================================================

use async_trait::async_trait;
use chrono::Utc;
use netarchon_models::{DeviceKind, MetricFamily, MetricPoint, MetricUnit, MetricValue};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::collector::Collector;
use crate::connectivity;
use crate::context::CollectionContext;
use crate::errors::CollectorError;
use crate::performance;

const PROBE_PORTS: &[u16] = &[80, 443, 22];
const MB_PER_GB: f64 = 1024.0;

static USAGE_MB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)total\s+usage[^0-9]{0,40}(\d+(?:\.\d+)?)\s*MB").unwrap());
static SECURITY_STATUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)firewall[^"<]{0,20}["']?(enabled|disabled)"#).unwrap());

pub struct GatewayCollector;

#[async_trait]
impl Collector for GatewayCollector {
    async fn collect(&self, ctx: &CollectionContext) -> Vec<MetricPoint> {
        let mut points = Vec::new();
        points.extend(connectivity::probe(ctx).await);
        if !ctx.policy_flagged() {
            points.extend(performance::probe_ports(ctx, PROBE_PORTS).await);
        }

        match fetch_usage_page(ctx).await {
            Ok(body) => {
                points.extend(usage_point(ctx, &body));
                points.extend(security_status_point(ctx, &body));
            }
            Err(error) => points.push(error_point(ctx, &error)),
        }

        points
    }
}

async fn fetch_usage_page(ctx: &CollectionContext) -> Result<String, CollectorError> {
    let url = format!("http://{}/usage.htm", ctx.device.address);
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
        .text()
        .await
        .map_err(|e| CollectorError::ParseFailure(e.to_string()))
}

fn usage_point(ctx: &CollectionContext, body: &str) -> Option<MetricPoint> {
    let captured = USAGE_MB_RE.captures(body)?;
    let megabytes: f64 = captured.get(1)?.as_str().parse().ok()?;

    MetricPoint::new(
        ctx.device.id.clone(),
        &ctx.device.name,
        DeviceKind::Gateway,
        MetricFamily::Bandwidth,
        "total_usage",
        MetricValue::Float(megabytes / MB_PER_GB),
        MetricUnit::Gigabytes,
        Utc::now(),
    )
    .ok()
}

fn security_status_point(ctx: &CollectionContext, body: &str) -> Option<MetricPoint> {
    let captured = SECURITY_STATUS_RE.captures(body)?;
    let enabled = captured.get(1)?.as_str().eq_ignore_ascii_case("enabled");

    MetricPoint::new(
        ctx.device.id.clone(),
        &ctx.device.name,
        DeviceKind::Gateway,
        MetricFamily::Security,
        "firewall_enabled",
        MetricValue::Bool(enabled),
        MetricUnit::Boolean,
        Utc::now(),
    )
    .ok()
}

fn error_point(ctx: &CollectionContext, error: &CollectorError) -> MetricPoint {
    MetricPoint::collection_error(
        ctx.device.id.clone(),
        &ctx.device.name,
        DeviceKind::Gateway,
        MetricFamily::Bandwidth,
        error.classify(),
        error.to_string(),
        Utc::now(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_megabytes_to_gigabytes() {
        let body = "Total Usage: 2048 MB this month";
        let captured = USAGE_MB_RE.captures(body).unwrap();
        let mb: f64 = captured.get(1).unwrap().as_str().parse().unwrap();
        assert_eq!(mb / MB_PER_GB, 2.0);
    }

    #[test]
    fn detects_disabled_firewall_status() {
        let body = r#"<span class="firewall-state">Firewall status: "disabled"</span>"#;
        let captured = SECURITY_STATUS_RE.captures(body).unwrap();
        assert!(captured.get(1).unwrap().as_str().eq_ignore_ascii_case("disabled"));
    }
}
