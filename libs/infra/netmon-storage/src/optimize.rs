// [libs/infra/netmon-storage/src/optimize.rs]
/*!
 * =================================================================
 * APARATO: MAINTENANCE OPTIMIZER DAEMON (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE BACKGROUND TASK (ESTRATO L3)
 * RESPONSABILIDAD: REHABILITACIÓN PERIÓDICA DE ÍNDICES Y FICHERO FÍSICO
 * =================================================================
 */

use tracing::{error, info, instrument};

use crate::client::MetricsStoreClient;
use crate::errors::StorageError;

/// Ejecuta `ANALYZE`, `REINDEX` y `VACUUM` en secuencia. Mejor
/// esfuerzo: un fallo intermedio se propaga al llamador, que decide
/// si lo registra y continúa.
#[instrument(skip(client))]
pub async fn optimize(client: &MetricsStoreClient) -> Result<(), StorageError> {
    let connection = client.get_connection()?;

    connection.execute("ANALYZE;", ()).await.map_err(StorageError::QueryError)?;
    connection.execute("REINDEX;", ()).await.map_err(StorageError::QueryError)?;
    connection.execute("VACUUM;", ()).await.map_err(StorageError::QueryError)?;

    info!("🛠️ [OPTIMIZE]: ANALYZE/REINDEX/VACUUM cycle complete");
    Ok(())
}

/// Bucle de fondo de optimización periódica. Igual que el resto de
/// los daemons de mantenimiento: registra y continúa.
pub async fn run_optimize_loop(client: MetricsStoreClient, interval: std::time::Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        if let Err(e) = optimize(&client).await {
            error!("❌ [OPTIMIZE_FAULT]: maintenance cycle failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn optimize_succeeds_against_a_fresh_schema() {
        let client = MetricsStoreClient::connect(":memory:").await.unwrap();
        optimize(&client).await.unwrap();
    }
}
