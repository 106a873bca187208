// [libs/infra/netmon-storage/src/repositories/store.rs]
/*!
 * =================================================================
 * APARATO: METRIC POINT STORE REPOSITORY (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA TRANSACCIONAL DE PUNTOS DE TELEMETRÍA
 *
 * # Mathematical Proof (Bulk Efficiency):
 * Encapsular N inserciones en una sola ráfaga ACID amortiza el coste de
 * sincronización de disco de O(N) a O(1) transacciones.
 * =================================================================
 */

use std::collections::HashSet;

use aes_gcm::Aes256Gcm;
use libsql::params;
use netarchon_models::{DeviceId, MetricFamily, MetricPoint};
use tracing::{debug, error, instrument, warn};

use crate::client::MetricsStoreClient;
use crate::encoding::{self, retention_policy_for};
use crate::errors::StorageError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreResult {
    pub stored: usize,
    pub errors: usize,
    pub total: usize,
}

/// Inserta un lote de puntos en una única transacción. Un fallo de
/// codificación en un punto individual se captura dentro del bucle y
/// solo incrementa `errors` -- nunca aborta la transacción completa,
/// igual que el repositorio de telemetría del enjambre original trata
/// cada fila de su ráfaga de forma independiente.
#[instrument(skip(client, key, points), fields(count = points.len()))]
pub async fn store(
    client: &MetricsStoreClient,
    key: Option<&Aes256Gcm>,
    compression_threshold: usize,
    encryption_enabled: bool,
    points: Vec<MetricPoint>,
) -> Result<(StoreResult, HashSet<(DeviceId, MetricFamily, String)>), StorageError> {
    let total = points.len();
    if points.is_empty() {
        return Ok((StoreResult::default(), HashSet::new()));
    }

    let connection = client.get_connection()?;
    let transaction = connection.transaction().await.map_err(StorageError::QueryError)?;

    let mut stored = 0usize;
    let mut errors = 0usize;
    let mut touched = HashSet::new();

    const INSERT_SQL: &str = r#"
        INSERT INTO metrics (
            device_id, device_name, device_kind, family, metric_name,
            value_type, value_data, unit, timestamp,
            compression_type, encryption_level, retention_policy, metadata_json
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
    "#;

    for point in &points {
        let raw_json = match serde_json::to_vec(&point.value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("⚠️ [STORE_FAULT]: failed to serialize value for {}: {}", point.device_id, e);
                errors += 1;
                continue;
            }
        };

        let encoded = match encoding::encode(raw_json, point.family, compression_threshold, encryption_enabled, key) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("⚠️ [STORE_FAULT]: failed to encode value for {}: {}", point.device_id, e);
                errors += 1;
                continue;
            }
        };

        let metadata_json = serde_json::to_string(&point.metadata).unwrap_or_default();
        let retention_policy = retention_policy_for(point.family);

        let result = transaction
            .execute(
                INSERT_SQL,
                params![
                    point.device_id.as_str().to_string(),
                    point.device_name.clone(),
                    point.device_kind.as_str().to_string(),
                    point.family.as_str().to_string(),
                    point.metric_name.clone(),
                    point.value.type_tag().to_string(),
                    encoded.bytes,
                    point.unit.as_str().to_string(),
                    point.timestamp.to_rfc3339(),
                    encoded.compression.as_str().to_string(),
                    encoded.encryption.as_str().to_string(),
                    retention_policy.as_str().to_string(),
                    metadata_json,
                ],
            )
            .await;

        match result {
            Ok(_) => {
                stored += 1;
                touched.insert((point.device_id.clone(), point.family, point.metric_name.clone()));
            }
            Err(e) => {
                error!("❌ [STORE_FAULT]: insert failed for {}: {}", point.device_id, e);
                errors += 1;
            }
        }
    }

    transaction.commit().await.map_err(StorageError::QueryError)?;

    debug!("✅ [STORE_SYNC]: {}/{} points committed ({} errors)", stored, total, errors);

    Ok((
        StoreResult {
            stored,
            errors,
            total,
        },
        touched,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MetricsStoreClient;
    use chrono::Utc;
    use netarchon_models::{DeviceKind, MetricUnit, MetricValue};

    async fn memory_client() -> MetricsStoreClient {
        MetricsStoreClient::connect(":memory:").await.unwrap()
    }

    fn sample_point(name: &str) -> MetricPoint {
        MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::Generic,
            MetricFamily::Connectivity,
            name,
            MetricValue::Bool(true),
            MetricUnit::Boolean,
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn stores_every_point_in_a_small_batch() {
        let client = memory_client().await;
        let points = vec![sample_point("reachable"), sample_point("reachable")];
        let (result, touched) = store(&client, None, 1024, false, points).await.unwrap();
        assert_eq!(result.stored, 2);
        assert_eq!(result.errors, 0);
        assert_eq!(touched.len(), 1);
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let client = memory_client().await;
        let (result, touched) = store(&client, None, 1024, false, vec![]).await.unwrap();
        assert_eq!(result.total, 0);
        assert!(touched.is_empty());
    }
}
