// [libs/domain/collectors/src/kinds/generic.rs]
//! =================================================================
//! APARATO: GENERIC DEVICE COLLECTOR
//! RESPONSABILIDAD: ALCANZABILIDAD Y PUERTOS PARA HARDWARE NO CLASIFICADO
//! =================================================================

use async_trait::async_trait;
use netarchon_models::MetricPoint;

use crate::collector::Collector;
use crate::connectivity;
use crate::context::CollectionContext;
use crate::performance;

const PROBE_PORTS: &[u16] = &[80, 443, 22];

pub struct GenericCollector;

#[async_trait]
impl Collector for GenericCollector {
    async fn collect(&self, ctx: &CollectionContext) -> Vec<MetricPoint> {
        let mut points = Vec::new();
        points.extend(connectivity::probe(ctx).await);
        if !ctx.policy_flagged() {
            points.extend(performance::probe_ports(ctx, PROBE_PORTS).await);
        }
        points
    }
}
