// [libs/infra/netmon-storage/src/retention.rs]
/*!
 * =================================================================
 * APARATO: RETENTION SWEEP DAEMON (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE BACKGROUND TASK (ESTRATO L3)
 * RESPONSABILIDAD: PURGA HORARIA DE MUESTRAS EXPIRADAS POR POLÍTICA
 * =================================================================
 */

use chrono::{Duration as ChronoDuration, Utc};
use libsql::params;
use tracing::{debug, error, info, instrument};

use crate::client::MetricsStoreClient;
use crate::encoding::RetentionPolicy;
use crate::errors::StorageError;

const FINITE_HORIZON_POLICIES: &[RetentionPolicy] = &[
    RetentionPolicy::Realtime,
    RetentionPolicy::Short,
    RetentionPolicy::Medium,
    RetentionPolicy::Long,
    RetentionPolicy::Archive,
];

/// Aplica una pasada de retención: una política a la vez, nunca
/// `permanent`. Cada DELETE se registra en `retention_log`; `VACUUM`
/// solo se ejecuta si alguna política purgó filas, igual que la
/// purga original solo compacta el fichero cuando hubo trabajo real.
#[instrument(skip(client))]
pub async fn apply_retention(client: &MetricsStoreClient) -> Result<usize, StorageError> {
    let connection = client.get_connection()?;
    let now = Utc::now();
    let mut total_deleted = 0usize;

    for policy in FINITE_HORIZON_POLICIES {
        let horizon_hours = match policy.horizon_hours() {
            Some(h) => h,
            None => continue,
        };
        let cutoff = now - ChronoDuration::hours(horizon_hours);
        let cutoff_str = cutoff.to_rfc3339();

        let metrics_deleted = connection
            .execute(
                "DELETE FROM metrics WHERE retention_policy = ?1 AND timestamp < ?2",
                params![policy.as_str().to_string(), cutoff_str.clone()],
            )
            .await
            .map_err(StorageError::QueryError)?;

        let hourly_deleted = connection
            .execute(
                "DELETE FROM metrics_hourly WHERE hour_start < ?1",
                params![cutoff_str.clone()],
            )
            .await
            .map_err(StorageError::QueryError)?;

        let rows_deleted = metrics_deleted + hourly_deleted;

        connection
            .execute(
                "INSERT INTO retention_log (retention_policy, run_at, rows_deleted, bytes_freed) VALUES (?1, ?2, ?3, NULL)",
                params![policy.as_str().to_string(), now.to_rfc3339(), rows_deleted as i64],
            )
            .await
            .map_err(StorageError::QueryError)?;

        if rows_deleted > 0 {
            debug!("🧹 [RETENTION]: policy={} purged {} rows older than {}", policy.as_str(), rows_deleted, cutoff_str);
        }

        total_deleted += rows_deleted as usize;
    }

    if total_deleted > 0 {
        connection
            .execute("VACUUM;", ())
            .await
            .map_err(StorageError::QueryError)?;
        info!("🧹 [RETENTION]: sweep complete, {} rows purged, vacuum run", total_deleted);
    }

    Ok(total_deleted)
}

/// Bucle de fondo de retención horaria. Cualquier fallo se registra y
/// el bucle continúa en la siguiente marca, salvo un candado envenenado
/// que termina el daemon por completo.
pub async fn run_retention_loop(client: MetricsStoreClient, interval: std::time::Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if let Err(e) = apply_retention(&client).await {
            error!("❌ [RETENTION_FAULT]: sweep failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::store::store;
    use chrono::{Duration as ChronoDuration, Utc};
    use netarchon_models::{DeviceId, DeviceKind, MetricFamily, MetricPoint, MetricUnit, MetricValue};

    #[tokio::test]
    async fn purges_rows_older_than_their_policy_horizon() {
        let client = MetricsStoreClient::connect(":memory:").await.unwrap();

        let stale_timestamp = Utc::now() - ChronoDuration::hours(2000);
        let point = MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::CableModem,
            MetricFamily::Security,
            "firewall_enabled",
            MetricValue::Bool(true),
            MetricUnit::Boolean,
            stale_timestamp,
        )
        .unwrap();

        store(&client, None, 1024, false, vec![point]).await.unwrap();

        let deleted = apply_retention(&client).await.unwrap();
        assert_eq!(deleted, 1);
    }

    #[tokio::test]
    async fn fresh_rows_survive_a_sweep() {
        let client = MetricsStoreClient::connect(":memory:").await.unwrap();
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

        let deleted = apply_retention(&client).await.unwrap();
        assert_eq!(deleted, 0);
    }
}
