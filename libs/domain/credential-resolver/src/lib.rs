// [libs/domain/credential-resolver/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL RESOLVER (V1.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN SERVICE (ESTRATO L2)
 * RESPONSABILIDAD: RESOLUCIÓN CACHEADA DE CREDENCIALES POR DISPOSITIVO
 *
 * VISION HIPER-HOLÍSTICA:
 * Ningún coleccionista debe golpear el almacén de secretos subyacente
 * más de una vez por referencia dentro de la ventana TTL, y las
 * ráfagas concurrentes de arranque (todos los dispositivos resolviendo
 * a la vez) nunca deben disparar N llamadas redundantes al mismo
 * secreto -- de ahí la coalescencia de vuelo en espera de `Notify`.
 * =================================================================
 */

mod cache;
mod file_store;
mod resolver;
mod store;

pub use file_store::FileSecretStore;
pub use resolver::CredentialResolver;
pub use store::{Credentials, LookupOutcome, SecretStore};
