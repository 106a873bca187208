// [libs/infra/netmon-storage/src/repositories/aggregate.rs]
/*!
 * =================================================================
 * APARATO: HOURLY ROLLUP AGGREGATION REPOSITORY (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CONSOLIDACIÓN HORARIA DE SERIES TEMPORALES CRUDAS
 *
 * Recompute, not increment: cada ráfaga de escritura dispara un
 * recálculo completo de la hora corriente a partir de las filas crudas
 * ya persistidas, nunca un incremento aritmético sobre el agregado
 * anterior -- así una fila corrupta nunca contamina el promedio de
 * forma irreversible.
 * =================================================================
 */

use std::collections::HashSet;

use aes_gcm::Aes256Gcm;
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use libsql::params;
use netarchon_models::{DeviceId, MetricFamily};
use tracing::{debug, instrument};

use crate::client::MetricsStoreClient;
use crate::errors::StorageError;
use crate::query::QueryFilter;
use crate::repositories::query::query;

const UPSERT_HOURLY_SQL: &str = r#"
    INSERT INTO metrics_hourly (
        device_id, family, metric_name, hour_start,
        min_value, max_value, mean_value, count, sum_value
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
    ON CONFLICT(device_id, family, metric_name, hour_start) DO UPDATE SET
        min_value = excluded.min_value,
        max_value = excluded.max_value,
        mean_value = excluded.mean_value,
        count = excluded.count,
        sum_value = excluded.sum_value
"#;

pub(crate) fn current_hour_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// Recalcula el renglón de `metrics_hourly` para cada clave
/// `(device_id, family, metric_name)` tocada por una ráfaga de
/// escritura reciente, usando únicamente las muestras numéricas de la
/// hora en curso.
#[instrument(skip(client, key, touched), fields(keys = touched.len()))]
pub async fn upsert_hourly(
    client: &MetricsStoreClient,
    key: Option<&Aes256Gcm>,
    touched: &HashSet<(DeviceId, MetricFamily, String)>,
) -> Result<usize, StorageError> {
    if touched.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    let hour_start = current_hour_start(now);
    let hour_end = hour_start + ChronoDuration::hours(1);

    let connection = client.get_connection()?;
    let mut updated = 0usize;

    for (device_id, family, metric_name) in touched {
        let filter = QueryFilter {
            device_ids: vec![device_id.clone()],
            families: vec![*family],
            metric_names: vec![metric_name.clone()],
            since: Some(hour_start),
            until: Some(hour_end),
            ..Default::default()
        };

        let points = query(client, key, &filter).await?;
        let samples: Vec<f64> = points.iter().filter_map(|p| p.value.as_numeric()).collect();

        if samples.is_empty() {
            continue;
        }

        let count = samples.len();
        let sum: f64 = samples.iter().sum();
        let mean = sum / count as f64;
        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        connection
            .execute(
                UPSERT_HOURLY_SQL,
                params![
                    device_id.as_str().to_string(),
                    family.as_str().to_string(),
                    metric_name.clone(),
                    hour_start.to_rfc3339(),
                    min,
                    max,
                    mean,
                    count as i64,
                    sum,
                ],
            )
            .await
            .map_err(StorageError::QueryError)?;

        updated += 1;
    }

    debug!("📊 [AGGREGATE_SYNC]: {} hourly rollups refreshed for hour {}", updated, hour_start);

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::store::store;
    use netarchon_models::{DeviceKind, MetricPoint, MetricUnit, MetricValue};

    async fn memory_client() -> MetricsStoreClient {
        MetricsStoreClient::connect(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn recomputes_mean_and_count_for_touched_keys() {
        let client = memory_client().await;
        let mut touched = HashSet::new();

        for value in [10.0, 20.0, 30.0] {
            let point = MetricPoint::new(
                DeviceId::from("dev-a"),
                "Device A",
                DeviceKind::LinuxServer,
                MetricFamily::SystemResources,
                "cpu_usage",
                MetricValue::Float(value),
                MetricUnit::Percentage,
                Utc::now(),
            )
            .unwrap();
            let (_, t) = store(&client, None, 1024, false, vec![point]).await.unwrap();
            touched.extend(t);
        }

        let updated = upsert_hourly(&client, None, &touched).await.unwrap();
        assert_eq!(updated, 1);

        let connection = client.get_connection().unwrap();
        let mut rows = connection
            .query("SELECT count, mean_value, min_value, max_value FROM metrics_hourly", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 3);
        assert_eq!(row.get::<f64>(1).unwrap(), 20.0);
        assert_eq!(row.get::<f64>(2).unwrap(), 10.0);
        assert_eq!(row.get::<f64>(3).unwrap(), 30.0);
    }

    #[tokio::test]
    async fn empty_touched_set_is_a_no_op() {
        let client = memory_client().await;
        let updated = upsert_hourly(&client, None, &HashSet::new()).await.unwrap();
        assert_eq!(updated, 0);
    }
}
