// [libs/domain/credential-resolver/src/cache.rs]
//! =================================================================
//! APARATO: TTL CREDENTIAL CACHE
//! RESPONSABILIDAD: MEMOIZACIÓN TEMPORAL DE CREDENCIALES RESUELTAS
//! =================================================================

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::store::Credentials;

pub(crate) const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

pub(crate) struct CacheEntry {
    pub(crate) credentials: Credentials,
    pub(crate) cached_at: Instant,
}

/// Mapa en memoria protegido por el mutex del llamador (`tokio::sync::Mutex`
/// en `CredentialResolver`). Esta estructura en sí no es thread-safe por
/// construcción -- solo encapsula la lógica de expiración.
pub(crate) struct TtlCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl TtlCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub(crate) fn get(&self, reference: &str) -> Option<Credentials> {
        self.entries.get(reference).and_then(|entry| {
            if entry.cached_at.elapsed() < self.ttl {
                Some(entry.credentials.clone())
            } else {
                None
            }
        })
    }

    pub(crate) fn insert(&mut self, reference: String, credentials: Credentials) {
        self.entries.insert(
            reference,
            CacheEntry {
                credentials,
                cached_at: Instant::now(),
            },
        );
    }
}
