// [libs/domain/collectors/src/kinds/cable_modem.rs]
//! =================================================================
//! APARATO: CABLE MODEM (DOCSIS) COLLECTOR
//! RESPONSABILIDAD: SCRAPING DE LA PÁGINA DE ESTADO DE SEÑAL DOCSIS
//!
//! # Error Policy:
//! Cada campo extraído por su propia expresión regular es independiente:
//! si una no coincide (firmware distinto, layout de página cambiado) el
//! campo simplemente se omite -- nunca se descarta la ronda completa por
//! un solo campo ausente (`Vec<Option<MetricPoint>>` aplanado).
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

static DOWNSTREAM_POWER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)downstream[^0-9\-]{0,40}(-?\d+(?:\.\d+)?)\s*dBmV").unwrap());
static UPSTREAM_POWER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)upstream[^0-9\-]{0,40}(-?\d+(?:\.\d+)?)\s*dBmV").unwrap());
static SNR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SNR[^0-9\-]{0,40}(-?\d+(?:\.\d+)?)\s*dB\b").unwrap());

pub struct CableModemCollector;

#[async_trait]
impl Collector for CableModemCollector {
    async fn collect(&self, ctx: &CollectionContext) -> Vec<MetricPoint> {
        let mut points = Vec::new();
        points.extend(connectivity::probe(ctx).await);

        match fetch_status_page(ctx).await {
            Ok(body) => {
                points.extend(extract_field(
                    ctx,
                    &DOWNSTREAM_POWER_RE,
                    "downstream_power",
                    MetricUnit::Dbmv,
                    &body,
                ));
                points.extend(extract_field(
                    ctx,
                    &UPSTREAM_POWER_RE,
                    "upstream_power",
                    MetricUnit::Dbmv,
                    &body,
                ));
                points.extend(extract_field(
                    ctx,
                    &SNR_RE,
                    "signal_to_noise_ratio",
                    MetricUnit::Db,
                    &body,
                ));
            }
            Err(error) => points.push(error_point(ctx, &error)),
        }

        points
    }
}

async fn fetch_status_page(ctx: &CollectionContext) -> Result<String, CollectorError> {
    let url = format!("http://{}/cmSignalData.htm", ctx.device.address);
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

fn extract_field(
    ctx: &CollectionContext,
    pattern: &Regex,
    metric_name: &str,
    unit: MetricUnit,
    body: &str,
) -> Option<MetricPoint> {
    let captured = pattern.captures(body)?;
    let value: f64 = captured.get(1)?.as_str().parse().ok()?;

    MetricPoint::new(
        ctx.device.id.clone(),
        &ctx.device.name,
        DeviceKind::CableModem,
        MetricFamily::Docsis,
        metric_name,
        MetricValue::Float(value),
        unit,
        Utc::now(),
    )
    .ok()
}

fn error_point(ctx: &CollectionContext, error: &CollectorError) -> MetricPoint {
    MetricPoint::collection_error(
        ctx.device.id.clone(),
        &ctx.device.name,
        DeviceKind::CableModem,
        MetricFamily::Docsis,
        error.classify(),
        error.to_string(),
        Utc::now(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = r#"
        <tr><td>Downstream Power</td><td>-3.4 dBmV</td></tr>
        <tr><td>Upstream Power</td><td>44.0 dBmV</td></tr>
        <tr><td>SNR</td><td>38.6 dB</td></tr>
    "#;

    #[test]
    fn extracts_all_three_docsis_fields_from_a_well_formed_page() {
        assert!(DOWNSTREAM_POWER_RE.is_match(SAMPLE_PAGE));
        assert!(UPSTREAM_POWER_RE.is_match(SAMPLE_PAGE));
        assert!(SNR_RE.is_match(SAMPLE_PAGE));
    }

    #[test]
    fn a_missing_field_does_not_panic_the_matcher() {
        let partial = "<tr><td>Downstream Power</td><td>-3.4 dBmV</td></tr>";
        assert!(DOWNSTREAM_POWER_RE.is_match(partial));
        assert!(!UPSTREAM_POWER_RE.is_match(partial));
        assert!(!SNR_RE.is_match(partial));
    }
}
