// [libs/infra/netmon-storage/src/errors.rs]
//! =================================================================
//! APARATO: STORAGE ERROR CATALOG
//! RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("[L3_DB_NET_FAULT]: connection to the local store failed: {0}")]
    ConnectionError(String),

    #[error("[L3_DB_QUERY_FAULT]: {0}")]
    QueryError(#[from] libsql::Error),

    #[error("[L3_DB_ENCODING_FAULT]: {0}")]
    EncodingError(String),

    #[error("[L3_DB_KEY_FAULT]: storage key unreadable or unwritable: {0}")]
    KeyFault(String),

    #[error("[L3_DB_IO_FAULT]: {0}")]
    IoFault(#[from] std::io::Error),
}
