// [libs/infra/netmon-storage/src/store.rs]
/*!
 * =================================================================
 * APARATO: METRICS STORE FACADE (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE COMPOSITION ROOT (ESTRATO L3)
 * RESPONSABILIDAD: SUPERFICIE PÚBLICA ÚNICA DEL MOTOR DE PERSISTENCIA
 * =================================================================
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aes_gcm::Aes256Gcm;
use chrono::{Duration as ChronoDuration, Utc};
use netarchon_models::{DeviceId, HourlyRollup, MetricPoint};
use tracing::instrument;

use crate::client::MetricsStoreClient;
use crate::encoding::KeyManager;
use crate::errors::StorageError;
use crate::query::QueryFilter;
use crate::repositories::aggregate::current_hour_start;
use crate::repositories::{aggregate, query as query_repo, store as store_repo};
use crate::repositories::store::StoreResult;

#[derive(Debug, Clone)]
pub struct StorageOpenOptions {
    pub database_path: String,
    pub encryption_key_path: PathBuf,
    pub compression_threshold_bytes: usize,
    pub enable_encryption: bool,
    pub enable_compression: bool,
    pub data_dir: PathBuf,
    pub backup_interval_hours: u64,
    pub vacuum_interval_hours: u64,
    pub retention_sweep_interval_hours: u64,
}

impl Default for StorageOpenOptions {
    fn default() -> Self {
        Self {
            database_path: "metrics.db".to_string(),
            encryption_key_path: PathBuf::from(".storage_key"),
            compression_threshold_bytes: crate::encoding::DEFAULT_COMPRESSION_THRESHOLD_BYTES,
            enable_encryption: true,
            enable_compression: true,
            data_dir: PathBuf::from("."),
            backup_interval_hours: 6,
            vacuum_interval_hours: 24,
            retention_sweep_interval_hours: 1,
        }
    }
}

/// Punto de entrada único del motor de persistencia. Envuelve el
/// cliente libSQL, la llave de cifrado (si aplica) y la configuración
/// de codificación que cada repositorio necesita.
#[derive(Clone)]
pub struct MetricsStore {
    client: MetricsStoreClient,
    key: Option<Arc<Aes256Gcm>>,
    options: Arc<StorageOpenOptions>,
}

impl MetricsStore {
    /// Abre (o crea) el almacén. Si el cifrado está habilitado y la
    /// llave del fichero es ilegible o está corrupta, esto falla --
    /// el binario que lo invoca debe tratarlo como una condición fatal
    /// de arranque.
    #[instrument(skip(options))]
    pub async fn open(options: StorageOpenOptions) -> Result<Self, StorageError> {
        let client = MetricsStoreClient::connect(&options.database_path).await?;

        let key = if options.enable_encryption {
            Some(Arc::new(KeyManager::load_or_create(&options.encryption_key_path)?))
        } else {
            None
        };

        Ok(Self {
            client,
            key,
            options: Arc::new(options),
        })
    }

    fn compression_threshold(&self) -> usize {
        if self.options.enable_compression {
            self.options.compression_threshold_bytes
        } else {
            usize::MAX
        }
    }

    /// Persiste un lote y recalcula los renglones horarios de cada
    /// clave tocada. Un fallo de agregación se registra pero no revierte
    /// la escritura ya comprometida -- los puntos crudos son la fuente
    /// de verdad, el agregado es una vista derivada y reconstruible.
    pub async fn store(&self, points: Vec<MetricPoint>) -> Result<StoreResult, StorageError> {
        let (result, touched) = store_repo::store(
            &self.client,
            self.key.as_deref(),
            self.compression_threshold(),
            self.options.enable_encryption,
            points,
        )
        .await?;

        if let Err(e) = aggregate::upsert_hourly(&self.client, self.key.as_deref(), &touched).await {
            tracing::error!("❌ [AGGREGATE_FAULT]: hourly rollup refresh failed: {}", e);
        }

        Ok(result)
    }

    /// Consulta puntos crudos. Igual que el motor original, un fallo de
    /// consulta se registra y se devuelve una lista vacía en lugar de
    /// propagar el error al llamador.
    pub async fn query(&self, filter: &QueryFilter) -> Vec<MetricPoint> {
        match query_repo::query(&self.client, self.key.as_deref(), filter).await {
            Ok(points) => points,
            Err(e) => {
                tracing::error!("❌ [QUERY_FAULT]: query failed, returning empty result: {}", e);
                Vec::new()
            }
        }
    }

    /// Lee los renglones ya agregados por hora directamente, sin pasar
    /// por la capa de descompresión/descifrado que protege los valores
    /// crudos (los agregados nunca se cifran). `hours_back` acota el
    /// resultado a las últimas `hours_back` horas (incluida la hora
    /// corriente): `hours_back=1` devuelve solo el cubo de la hora en
    /// curso, igual que el escenario de rollup horario.
    pub async fn aggregated_query(
        &self,
        device_id: &str,
        family: netarchon_models::MetricFamily,
        metric_name: &str,
        hours_back: u32,
    ) -> Result<Vec<HourlyRollup>, StorageError> {
        let since = current_hour_start(Utc::now()) - ChronoDuration::hours(hours_back.saturating_sub(1) as i64);

        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query(
                "SELECT hour_start, min_value, max_value, mean_value, count, sum_value \
                 FROM metrics_hourly WHERE device_id = ?1 AND family = ?2 AND metric_name = ?3 \
                 AND hour_start >= ?4 ORDER BY hour_start ASC",
                libsql::params![
                    device_id.to_string(),
                    family.as_str().to_string(),
                    metric_name.to_string(),
                    since.to_rfc3339(),
                ],
            )
            .await
            .map_err(StorageError::QueryError)?;

        let mut rollups = Vec::new();
        while let Some(row) = rows.next().await.map_err(StorageError::QueryError)? {
            let hour_start: String = row.get::<String>(0).map_err(StorageError::QueryError)?;
            let hour_start = hour_start
                .parse()
                .map_err(|e| StorageError::EncodingError(format!("hour_start decode fault: {e}")))?;
            rollups.push(HourlyRollup {
                device_id: DeviceId::from(device_id),
                family,
                metric_name: metric_name.to_string(),
                hour_start,
                min: row.get::<f64>(1).map_err(StorageError::QueryError)?,
                max: row.get::<f64>(2).map_err(StorageError::QueryError)?,
                mean: row.get::<f64>(3).map_err(StorageError::QueryError)?,
                count: row.get::<i64>(4).map_err(StorageError::QueryError)? as u64,
                sum: row.get::<f64>(5).map_err(StorageError::QueryError)?,
            });
        }

        Ok(rollups)
    }

    /// Estadísticas de ocupación del almacén, usadas por el panel de
    /// observabilidad y registradas en `storage_stats`.
    pub async fn statistics(&self) -> Result<StorageStatistics, StorageError> {
        let connection = self.client.get_connection()?;
        let mut rows = connection
            .query("SELECT COUNT(*) FROM metrics", ())
            .await
            .map_err(StorageError::QueryError)?;
        let total_rows = match rows.next().await.map_err(StorageError::QueryError)? {
            Some(row) => row.get::<i64>(0).map_err(StorageError::QueryError)?,
            None => 0,
        };

        let mut encrypted_rows = connection
            .query(
                "SELECT COUNT(*) FROM metrics WHERE encryption_level != 'none'",
                (),
            )
            .await
            .map_err(StorageError::QueryError)?;
        let encrypted_count = match encrypted_rows.next().await.map_err(StorageError::QueryError)? {
            Some(row) => row.get::<i64>(0).map_err(StorageError::QueryError)?,
            None => 0,
        };

        Ok(StorageStatistics {
            total_rows,
            encrypted_count,
        })
    }

    pub async fn apply_retention(&self) -> Result<usize, StorageError> {
        crate::retention::apply_retention(&self.client).await
    }

    pub async fn optimize(&self) -> Result<(), StorageError> {
        crate::optimize::optimize(&self.client).await
    }

    pub fn backup(&self, gzip: bool) -> Result<PathBuf, StorageError> {
        let database_path = Path::new(&self.options.database_path);
        crate::backup::snapshot(database_path, &self.options.data_dir, gzip)
    }

    /// Lanza los tres daemons de mantenimiento de fondo (retención,
    /// respaldo, optimización) como tareas tokio independientes.
    pub fn spawn_maintenance_loops(&self) {
        let retention_client = self.client.clone();
        let retention_interval = std::time::Duration::from_secs(self.options.retention_sweep_interval_hours * 3600);
        tokio::spawn(crate::retention::run_retention_loop(retention_client, retention_interval));

        let backup_db_path = PathBuf::from(&self.options.database_path);
        let backup_data_dir = self.options.data_dir.clone();
        let backup_interval = std::time::Duration::from_secs(self.options.backup_interval_hours * 3600);
        tokio::spawn(crate::backup::run_backup_loop(
            backup_db_path,
            backup_data_dir,
            self.options.enable_compression,
            backup_interval,
        ));

        let optimize_client = self.client.clone();
        let optimize_interval = std::time::Duration::from_secs(self.options.vacuum_interval_hours * 3600);
        tokio::spawn(crate::optimize::run_optimize_loop(optimize_client, optimize_interval));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageStatistics {
    pub total_rows: i64,
    pub encrypted_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use netarchon_models::{DeviceId, DeviceKind, MetricFamily, MetricUnit, MetricValue};

    async fn memory_store() -> MetricsStore {
        MetricsStore::open(StorageOpenOptions {
            database_path: ":memory:".to_string(),
            enable_encryption: false,
            ..Default::default()
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn store_then_query_round_trips() {
        let store = memory_store().await;
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

        let result = store.store(vec![point]).await.unwrap();
        assert_eq!(result.stored, 1);

        let points = store.query(&QueryFilter::new()).await;
        assert_eq!(points.len(), 1);
    }

    #[tokio::test]
    async fn store_refreshes_hourly_rollup_for_numeric_families() {
        let store = memory_store().await;
        let point = MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::LinuxServer,
            MetricFamily::SystemResources,
            "cpu_usage",
            MetricValue::Float(50.0),
            MetricUnit::Percentage,
            Utc::now(),
        )
        .unwrap();
        store.store(vec![point]).await.unwrap();

        let rollups = store
            .aggregated_query("dev-a", MetricFamily::SystemResources, "cpu_usage", 1)
            .await
            .unwrap();
        assert_eq!(rollups.len(), 1);
        assert_eq!(rollups[0].mean, 50.0);
    }

    #[tokio::test]
    async fn aggregated_query_bounds_the_result_to_hours_back() {
        let store = memory_store().await;

        // A rollup row from three hours ago, written directly since the
        // only public write path always refreshes the *current* hour.
        let stale_hour = aggregate::current_hour_start(Utc::now()) - ChronoDuration::hours(3);
        let connection = store.client.get_connection().unwrap();
        connection
            .execute(
                "INSERT INTO metrics_hourly (device_id, family, metric_name, hour_start, \
                 min_value, max_value, mean_value, count, sum_value) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                libsql::params![
                    "dev-a".to_string(),
                    MetricFamily::SystemResources.as_str().to_string(),
                    "cpu_usage".to_string(),
                    stale_hour.to_rfc3339(),
                    10.0,
                    10.0,
                    10.0,
                    1_i64,
                    10.0,
                ],
            )
            .await
            .unwrap();

        let point = MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::LinuxServer,
            MetricFamily::SystemResources,
            "cpu_usage",
            MetricValue::Float(50.0),
            MetricUnit::Percentage,
            Utc::now(),
        )
        .unwrap();
        store.store(vec![point]).await.unwrap();

        let current_hour_only = store
            .aggregated_query("dev-a", MetricFamily::SystemResources, "cpu_usage", 1)
            .await
            .unwrap();
        assert_eq!(current_hour_only.len(), 1, "hours_back=1 must exclude the three-hour-old rollup");
        assert_eq!(current_hour_only[0].mean, 50.0);

        let last_four_hours = store
            .aggregated_query("dev-a", MetricFamily::SystemResources, "cpu_usage", 4)
            .await
            .unwrap();
        assert_eq!(last_four_hours.len(), 2, "hours_back=4 must include both rollups");
    }

    #[tokio::test]
    async fn statistics_reports_total_row_count() {
        let store = memory_store().await;
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
        store.store(vec![point]).await.unwrap();

        let stats = store.statistics().await.unwrap();
        assert_eq!(stats.total_rows, 1);
    }
}
