// [libs/domain/credential-resolver/src/resolver.rs]
//! =================================================================
//! APARATO: CREDENTIAL RESOLVER ENGINE
//! RESPONSABILIDAD: CACHE TTL + COALESCENCIA DE VUELO SOBRE UN SECRETSTORE
//! =================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tracing::{instrument, trace};

use crate::cache::{TtlCache, DEFAULT_TTL};
use crate::store::{Credentials, LookupOutcome, SecretStore};

/// Resuelve referencias de credenciales contra un `SecretStore`
/// compartido, memoizando resultados durante `ttl` y garantizando que
/// llamadas concurrentes por la misma referencia produzcan una única
/// invocación al backend.
pub struct CredentialResolver {
    store: Arc<dyn SecretStore>,
    cache: Mutex<TtlCache>,
    in_flight: Mutex<HashMap<String, Arc<Notify>>>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    pub fn with_ttl(store: Arc<dyn SecretStore>, ttl: Duration) -> Self {
        Self {
            store,
            cache: Mutex::new(TtlCache::new(ttl)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    #[instrument(skip(self), fields(reference = %reference))]
    pub async fn lookup(&self, reference: &str) -> Result<Credentials, LookupOutcome> {
        loop {
            if let Some(hit) = self.cache.lock().await.get(reference) {
                return Ok(hit);
            }

            let (should_fetch, waiter) = {
                let mut in_flight = self.in_flight.lock().await;
                if let Some(existing) = in_flight.get(reference) {
                    (false, Some(existing.clone()))
                } else {
                    let notify = Arc::new(Notify::new());
                    in_flight.insert(reference.to_string(), notify);
                    (true, None)
                }
            };

            if !should_fetch {
                trace!("coalescing onto in-flight credential lookup");
                waiter.expect("waiter present when not fetching").notified().await;
                continue;
            }

            let outcome = self.store.fetch(reference).await;

            if let Ok(ref credentials) = outcome {
                self.cache
                    .lock()
                    .await
                    .insert(reference.to_string(), credentials.clone());
            }

            let notify = self.in_flight.lock().await.remove(reference);
            if let Some(notify) = notify {
                notify.notify_waiters();
            }

            return outcome;
        }
    }
}
