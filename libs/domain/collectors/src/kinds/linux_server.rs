// [libs/domain/collectors/src/kinds/linux_server.rs]
//! =================================================================
//! APARATO: LINUX SERVER COLLECTOR
//! RESPONSABILIDAD: MÉTRICAS DE SISTEMA VÍA SESIÓN DE SHELL AUTENTICADA
//!
//! # Concurrency:
//! Cada comando tiene su propio presupuesto de 10s y se ejecuta junto a
//! los demás vía `join_all` -- generaliza el patrón de descarga paralela
//! por fragmentos del worker original a "un comando, un resultado
//! independiente": la falla de `df` nunca cancela la lectura de `uptime`.
//! =================================================================

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use netarchon_models::{DeviceKind, MetricFamily, MetricPoint, MetricUnit, MetricValue};

use crate::collector::Collector;
use crate::connectivity;
use crate::context::CollectionContext;
use crate::errors::CollectorError;

const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

struct ServerCommand {
    metric_name: &'static str,
    family: MetricFamily,
    unit: MetricUnit,
    shell: &'static str,
}

const COMMANDS: &[ServerCommand] = &[
    ServerCommand {
        metric_name: "cpu_usage",
        family: MetricFamily::SystemResources,
        unit: MetricUnit::Percentage,
        shell: "top -bn1 | grep 'Cpu(s)' | awk '{print $2}'",
    },
    ServerCommand {
        metric_name: "memory_usage",
        family: MetricFamily::SystemResources,
        unit: MetricUnit::Percentage,
        shell: "free | awk '/Mem:/ {printf \"%.1f\", $3/$2*100}'",
    },
    ServerCommand {
        metric_name: "disk_usage",
        family: MetricFamily::SystemResources,
        unit: MetricUnit::Percentage,
        shell: "df / | awk 'NR==2 {gsub(\"%\",\"\",$5); print $5}'",
    },
    ServerCommand {
        metric_name: "load_average_1m",
        family: MetricFamily::SystemResources,
        unit: MetricUnit::None,
        shell: "uptime | awk -F'load average: ' '{print $2}' | awk -F, '{print $1}'",
    },
    ServerCommand {
        metric_name: "container_count",
        family: MetricFamily::SystemResources,
        unit: MetricUnit::Count,
        shell: "docker ps -q | wc -l",
    },
];

pub struct LinuxServerCollector;

#[async_trait]
impl Collector for LinuxServerCollector {
    async fn collect(&self, ctx: &CollectionContext) -> Vec<MetricPoint> {
        let mut points = Vec::new();
        points.extend(connectivity::probe(ctx).await);

        let Some(credential) = ctx.credentials.as_ref() else {
            points.push(error_point(
                ctx,
                &CollectorError::AuthUnavailable("no credential resolved for this device".into()),
            ));
            return points;
        };

        let futures = COMMANDS.iter().map(|command| {
            run_command(ctx, credential, command)
        });

        for result in join_all(futures).await {
            match result {
                Ok(point) => points.push(point),
                Err(error) => points.push(error_point(ctx, &error)),
            }
        }

        points
    }
}

async fn run_command(
    ctx: &CollectionContext,
    credential: &netarchon_credentials::Credentials,
    command: &ServerCommand,
) -> Result<MetricPoint, CollectorError> {
    let output = ctx
        .shell
        .exec(&ctx.device.address, credential, command.shell, COMMAND_TIMEOUT)
        .await
        .map_err(|_| CollectorError::Timeout)?;

    if !output.success() {
        return Err(CollectorError::Other(format!(
            "command exited with code {}",
            output.exit_code
        )));
    }

    let raw = output.stdout.trim();
    let value: f64 = raw
        .parse()
        .map_err(|_| CollectorError::ParseFailure(format!("unexpected output: '{raw}'")))?;

    MetricPoint::new(
        ctx.device.id.clone(),
        &ctx.device.name,
        DeviceKind::LinuxServer,
        command.family,
        command.metric_name,
        MetricValue::Float(value),
        command.unit,
        Utc::now(),
    )
    .map_err(|e| CollectorError::Other(e.to_string()))
}

fn error_point(ctx: &CollectionContext, error: &CollectorError) -> MetricPoint {
    MetricPoint::collection_error(
        ctx.device.id.clone(),
        &ctx.device.name,
        DeviceKind::LinuxServer,
        MetricFamily::SystemResources,
        error.classify(),
        error.to_string(),
        Utc::now(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_commands_cover_the_spec_required_system_metrics() {
        let names: Vec<&str> = COMMANDS.iter().map(|c| c.metric_name).collect();
        assert!(names.contains(&"cpu_usage"));
        assert!(names.contains(&"memory_usage"));
        assert!(names.contains(&"disk_usage"));
        assert!(names.contains(&"load_average_1m"));
        assert!(names.contains(&"container_count"));
    }
}
