// [libs/infra/netmon-storage/src/repositories/query.rs]
/*!
 * =================================================================
 * APARATO: METRIC POINT QUERY REPOSITORY (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: RECUPERACIÓN Y DECODIFICACIÓN DE PUNTOS PERSISTIDOS
 * =================================================================
 */

use aes_gcm::Aes256Gcm;
use chrono::{DateTime, Utc};
use netarchon_models::{DeviceId, DeviceKind, MetricFamily, MetricPoint, MetricUnit, MetricValue};
use tracing::instrument;

use crate::client::MetricsStoreClient;
use crate::encoding::{self, CompressionType, EncryptionLevel};
use crate::errors::StorageError;
use crate::query::QueryFilter;

struct MetricRow {
    device_id: String,
    device_name: String,
    device_kind: String,
    family: String,
    metric_name: String,
    value_type: String,
    value_data: Vec<u8>,
    unit: String,
    timestamp: String,
    compression_type: String,
    encryption_level: String,
    metadata_json: String,
}

/// Ejecuta un filtro compilado y decodifica cada fila devuelta a su
/// `MetricPoint` de dominio. Una fila individualmente corrupta se
/// descarta y se registra, sin abortar el resto del resultado -- igual
/// que el repositorio de archivo original tolera filas parcialmente
/// ilegibles sin hundir la consulta completa.
#[instrument(skip(client, key, filter))]
pub async fn query(
    client: &MetricsStoreClient,
    key: Option<&Aes256Gcm>,
    filter: &QueryFilter,
) -> Result<Vec<MetricPoint>, StorageError> {
    let (sql, bound_params) = filter.compile();
    let connection = client.get_connection()?;
    let mut rows = connection
        .query(&sql, bound_params)
        .await
        .map_err(StorageError::QueryError)?;

    let mut points = Vec::new();
    while let Some(row) = rows.next().await.map_err(StorageError::QueryError)? {
        let raw = MetricRow {
            device_id: row.get::<String>(0).map_err(StorageError::QueryError)?,
            device_name: row.get::<String>(1).map_err(StorageError::QueryError)?,
            device_kind: row.get::<String>(2).map_err(StorageError::QueryError)?,
            family: row.get::<String>(3).map_err(StorageError::QueryError)?,
            metric_name: row.get::<String>(4).map_err(StorageError::QueryError)?,
            value_type: row.get::<String>(5).map_err(StorageError::QueryError)?,
            value_data: row.get::<Vec<u8>>(6).map_err(StorageError::QueryError)?,
            unit: row.get::<String>(7).map_err(StorageError::QueryError)?,
            timestamp: row.get::<String>(8).map_err(StorageError::QueryError)?,
            compression_type: row.get::<String>(9).map_err(StorageError::QueryError)?,
            encryption_level: row.get::<String>(10).map_err(StorageError::QueryError)?,
            metadata_json: row.get::<String>(11).map_err(StorageError::QueryError)?,
        };
        match decode_row(raw, key) {
            Ok(point) => points.push(point),
            Err(e) => {
                tracing::warn!("⚠️ [QUERY_FAULT]: dropping unreadable row: {}", e);
            }
        }
    }

    Ok(points)
}

fn decode_row(raw: MetricRow, key: Option<&Aes256Gcm>) -> Result<MetricPoint, StorageError> {
    let compression = CompressionType::from_str(&raw.compression_type);
    let encryption = EncryptionLevel::from_str(&raw.encryption_level);

    let decoded_bytes = encoding::decode(&raw.value_data, compression, encryption, key)?;
    let value: MetricValue = serde_json::from_slice(&decoded_bytes)
        .map_err(|e| StorageError::EncodingError(format!("value decode fault: {e}")))?;

    let device_kind = DeviceKind::from_str(&raw.device_kind)
        .ok_or_else(|| StorageError::EncodingError(format!("unknown device kind: {}", raw.device_kind)))?;
    let family = MetricFamily::from_str(&raw.family)
        .ok_or_else(|| StorageError::EncodingError(format!("unknown family: {}", raw.family)))?;
    let unit = unit_from_str(&raw.unit)
        .ok_or_else(|| StorageError::EncodingError(format!("unknown unit: {}", raw.unit)))?;
    let timestamp: DateTime<Utc> = raw
        .timestamp
        .parse()
        .map_err(|e| StorageError::EncodingError(format!("timestamp decode fault: {e}")))?;
    let metadata = serde_json::from_str(&raw.metadata_json).unwrap_or_default();

    let _ = &raw.value_type;

    Ok(MetricPoint {
        device_id: DeviceId::from(raw.device_id),
        device_name: raw.device_name,
        device_kind,
        family,
        metric_name: raw.metric_name,
        value,
        unit,
        timestamp,
        metadata,
    })
}

fn unit_from_str(value: &str) -> Option<MetricUnit> {
    match value {
        "percentage" => Some(MetricUnit::Percentage),
        "dbmv" => Some(MetricUnit::Dbmv),
        "db" => Some(MetricUnit::Db),
        "dbm" => Some(MetricUnit::Dbm),
        "count" => Some(MetricUnit::Count),
        "bytes" => Some(MetricUnit::Bytes),
        "gigabytes" => Some(MetricUnit::Gigabytes),
        "milliseconds" => Some(MetricUnit::Milliseconds),
        "boolean" => Some(MetricUnit::Boolean),
        "none" => Some(MetricUnit::None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::store::store;
    use chrono::Utc;

    async fn memory_client() -> MetricsStoreClient {
        MetricsStoreClient::connect(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn round_trips_a_stored_point_through_query() {
        let client = memory_client().await;
        let point = MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::Generic,
            MetricFamily::Connectivity,
            "reachable",
            MetricValue::Bool(true),
            MetricUnit::Boolean,
            Utc::now(),
        )
        .unwrap();

        store(&client, None, 1024, false, vec![point]).await.unwrap();

        let results = query(&client, None, &QueryFilter::new()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].device_id, DeviceId::from("dev-a"));
        assert_eq!(results[0].value, MetricValue::Bool(true));
    }

    #[tokio::test]
    async fn filters_by_family() {
        let client = memory_client().await;
        let a = MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::Generic,
            MetricFamily::Connectivity,
            "reachable",
            MetricValue::Bool(true),
            MetricUnit::Boolean,
            Utc::now(),
        )
        .unwrap();
        let b = MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::LinuxServer,
            MetricFamily::SystemResources,
            "cpu_usage",
            MetricValue::Float(12.5),
            MetricUnit::Percentage,
            Utc::now(),
        )
        .unwrap();
        store(&client, None, 1024, false, vec![a, b]).await.unwrap();

        let filter = QueryFilter {
            families: vec![MetricFamily::SystemResources],
            ..Default::default()
        };
        let results = query(&client, None, &filter).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metric_name, "cpu_usage");
    }
}
