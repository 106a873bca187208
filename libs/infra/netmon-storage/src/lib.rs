// [libs/infra/netmon-storage/src/lib.rs]
/*!
 * =================================================================
 * APARATO: NETARCHON STORAGE ENGINE (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: PERSISTENCIA LOCAL CIFRADA DE SERIES TEMPORALES
 * =================================================================
 */

mod backup;
mod client;
mod encoding;
mod errors;
mod optimize;
mod query;
mod repositories;
mod retention;
mod store;

pub use backup::snapshot as backup_snapshot;
pub use client::MetricsStoreClient;
pub use encoding::{
    encryption_level_for, retention_policy_for, CompressionType, EncryptionLevel, KeyManager, RetentionPolicy,
    DEFAULT_COMPRESSION_THRESHOLD_BYTES,
};
pub use errors::StorageError;
pub use query::{OrderDirection, OrderField, QueryFilter};
pub use repositories::store::StoreResult;
pub use store::{MetricsStore, StorageOpenOptions, StorageStatistics};
