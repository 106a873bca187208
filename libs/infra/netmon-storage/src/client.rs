// [libs/infra/netmon-storage/src/client.rs]
/*!
 * =================================================================
 * APARATO: METRICS STORE CLIENT (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DE ENLACES LOCALES Y PERSISTENCIA ACID
 *
 * # Mathematical Proof (In-Memory Consistency):
 * En modo `:memory:` (usado exclusivamente por la batería de pruebas),
 * se ancla una conexión dedicada antes de cualquier otra operación para
 * que el esquema permanezca visible entre hilos mientras el proceso
 * viva, igual que el cliente original ancla su enlace RAM.
 * =================================================================
 */

use std::sync::Arc;

use libsql::{Builder, Connection, Database};
use tracing::{info, instrument};

use crate::errors::StorageError;
use crate::schema::apply_full_sovereign_schema;

#[derive(Clone)]
pub struct MetricsStoreClient {
    internal_database_driver: Arc<Database>,
    _memory_persistence_anchor: Option<Arc<Connection>>,
}

impl MetricsStoreClient {
    #[instrument]
    pub async fn connect(database_path: &str) -> Result<Self, StorageError> {
        if database_path.is_empty() {
            return Err(StorageError::ConnectionError(
                "DATABASE_PATH_UNDEFINED".into(),
            ));
        }

        info!("🔌 [STORAGE]: opening local metrics store at [{}]", database_path);

        let is_memory = database_path.contains(":memory:");

        let database_driver = Builder::new_local(database_path)
            .build()
            .await
            .map_err(|e| StorageError::ConnectionError(format!("DRIVER_IGNITION_FAILURE: {e}")))?;

        let shared_driver = Arc::new(database_driver);
        let mut anchor = None;

        if is_memory {
            let anchor_conn = shared_driver
                .connect()
                .map_err(|e| StorageError::ConnectionError(format!("ANCHOR_FAULT: {e}")))?;
            apply_bootstrap_pragmas(&anchor_conn).await?;
            apply_full_sovereign_schema(&anchor_conn)
                .await
                .map_err(|e| StorageError::ConnectionError(format!("SCHEMA_SYNC_FAULT: {e}")))?;
            anchor = Some(Arc::new(anchor_conn));
        } else {
            let bootstrap_conn = shared_driver
                .connect()
                .map_err(|e| StorageError::ConnectionError(format!("BOOTSTRAP_LINK_FAULT: {e}")))?;
            apply_bootstrap_pragmas(&bootstrap_conn).await?;
            apply_full_sovereign_schema(&bootstrap_conn)
                .await
                .map_err(|e| StorageError::ConnectionError(format!("SCHEMA_SYNC_FAULT: {e}")))?;
        }

        Ok(Self {
            internal_database_driver: shared_driver,
            _memory_persistence_anchor: anchor,
        })
    }

    pub fn get_connection(&self) -> Result<Connection, StorageError> {
        self.internal_database_driver
            .connect()
            .map_err(|e| StorageError::ConnectionError(e.to_string()))
    }
}

async fn apply_bootstrap_pragmas(connection: &Connection) -> Result<(), StorageError> {
    connection
        .execute("PRAGMA journal_mode = WAL;", ())
        .await
        .map_err(StorageError::QueryError)?;
    connection
        .execute("PRAGMA synchronous = NORMAL;", ())
        .await
        .map_err(StorageError::QueryError)?;
    connection
        .execute("PRAGMA temp_store = MEMORY;", ())
        .await
        .map_err(StorageError::QueryError)?;
    connection
        .execute("PRAGMA cache_size = -16000;", ())
        .await
        .map_err(StorageError::QueryError)?;
    Ok(())
}
