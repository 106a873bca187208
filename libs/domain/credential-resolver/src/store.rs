// [libs/domain/credential-resolver/src/store.rs]
//! =================================================================
//! APARATO: SECRET STORE CONTRACT
//! RESPONSABILIDAD: PUERTO SOBERANO HACIA EL BACKEND DE SECRETOS
//! =================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
    pub private_key: Option<String>,
}

/// Distingue una ausencia definitiva (`NotFound`, no reintentar) de un
/// fallo transitorio del backend (`Unavailable`, reintentable).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    #[error("[L2_CRED_NOT_FOUND]: no credential registered for reference '{0}'")]
    NotFound(String),
    #[error("[L2_CRED_BACKEND_FAULT]: secret backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Credentials, LookupOutcome>;
}
