// [libs/domain/credential-resolver/src/file_store.rs]
//! =================================================================
//! APARATO: FILE-BACKED SECRET STORE
//! RESPONSABILIDAD: LECTURA DE UN MAPA JSON DE CREDENCIALES EN DISCO
//! =================================================================

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::store::{Credentials, LookupOutcome, SecretStore};

/// Lee `{ "reference": { "username": ..., "secret": ..., "private_key": ... } }`
/// desde un archivo JSON en disco en cada llamada. No cachea nada por sí
/// mismo -- esa responsabilidad vive enteramente en `CredentialResolver`.
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn fetch(&self, reference: &str) -> Result<Credentials, LookupOutcome> {
        let path = self.path.clone();
        let reference_owned = reference.to_string();

        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            LookupOutcome::Unavailable(format!("cannot read secret file {}: {e}", path.display()))
        })?;

        let table: HashMap<String, Credentials> = serde_json::from_str(&raw).map_err(|e| {
            LookupOutcome::Unavailable(format!("malformed secret file {}: {e}", path.display()))
        })?;

        table
            .get(&reference_owned)
            .cloned()
            .ok_or(LookupOutcome::NotFound(reference_owned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[tokio::test]
    async fn fetches_known_reference() {
        let fixture = write_fixture(
            r#"{"modem-1": {"username": "admin", "secret": "hunter2", "private_key": null}}"#,
        );
        let store = FileSecretStore::new(fixture.path());
        let creds = store.fetch("modem-1").await.unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.secret, "hunter2");
    }

    #[tokio::test]
    async fn unknown_reference_is_not_found() {
        let fixture = write_fixture(r#"{}"#);
        let store = FileSecretStore::new(fixture.path());
        let err = store.fetch("ghost").await.unwrap_err();
        assert!(matches!(err, LookupOutcome::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable_not_not_found() {
        let store = FileSecretStore::new("/nonexistent/path/secrets.json");
        let err = store.fetch("modem-1").await.unwrap_err();
        assert!(matches!(err, LookupOutcome::Unavailable(_)));
    }
}
