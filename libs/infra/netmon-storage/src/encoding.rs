// [libs/infra/netmon-storage/src/encoding.rs]
/*!
 * =================================================================
 * APARATO: METRIC ENCODING PIPELINE (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: SERIALIZACIÓN, COMPRESIÓN Y CIFRADO DE VALORES
 *
 * # Pipeline (cuatro pasos, aplicados en orden):
 * 1. Serializar `MetricValue` a bytes UTF-8 (JSON uniforme para las
 *    cinco variantes, incluida `Json` -- generaliza el tratamiento
 *    escalar del original a la unión etiquetada completa).
 * 2. Si `len > compression_threshold`, comprimir con gzip y marcar
 *    `gzip` -- comparación estrictamente `>`, el umbral exacto NO
 *    comprime (ver tests).
 * 3. Seleccionar nivel de cifrado por familia.
 * 4. Si el cifrado está habilitado y el nivel no es `none`, cifrar
 *    con la llave simétrica de proceso.
 * =================================================================
 */

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use netarchon_models::MetricFamily;
use rand::RngCore;
use std::io::{Read, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::errors::StorageError;

pub const DEFAULT_COMPRESSION_THRESHOLD_BYTES: usize = 1024;
const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    None,
    Gzip,
}

impl CompressionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionType::None => "none",
            CompressionType::Gzip => "gzip",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "gzip" => CompressionType::Gzip,
            _ => CompressionType::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionLevel {
    None,
    Basic,
    Advanced,
    Sensitive,
}

impl EncryptionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionLevel::None => "none",
            EncryptionLevel::Basic => "basic",
            EncryptionLevel::Advanced => "advanced",
            EncryptionLevel::Sensitive => "sensitive",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "basic" => EncryptionLevel::Basic,
            "advanced" => EncryptionLevel::Advanced,
            "sensitive" => EncryptionLevel::Sensitive,
            _ => EncryptionLevel::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    Realtime,
    Short,
    Medium,
    Long,
    Archive,
    Permanent,
}

impl RetentionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionPolicy::Realtime => "realtime",
            RetentionPolicy::Short => "short",
            RetentionPolicy::Medium => "medium",
            RetentionPolicy::Long => "long",
            RetentionPolicy::Archive => "archive",
            RetentionPolicy::Permanent => "permanent",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "realtime" => RetentionPolicy::Realtime,
            "short" => RetentionPolicy::Short,
            "long" => RetentionPolicy::Long,
            "archive" => RetentionPolicy::Archive,
            "permanent" => RetentionPolicy::Permanent,
            _ => RetentionPolicy::Medium,
        }
    }

    /// Horizonte finito en horas. `None` para `Permanent` (nunca purgado).
    pub fn horizon_hours(&self) -> Option<i64> {
        match self {
            RetentionPolicy::Realtime => Some(1),
            RetentionPolicy::Short => Some(24),
            RetentionPolicy::Medium => Some(24 * 7),
            RetentionPolicy::Long => Some(24 * 30),
            RetentionPolicy::Archive => Some(24 * 365),
            RetentionPolicy::Permanent => None,
        }
    }
}

/// `Security`, `SystemResources` -> `sensitive`; `Docsis`, `Bandwidth` ->
/// `advanced`; `Performance`, `Connectivity` -> `basic`; el resto -> `none`.
pub fn encryption_level_for(family: MetricFamily) -> EncryptionLevel {
    match family {
        MetricFamily::Security | MetricFamily::SystemResources => EncryptionLevel::Sensitive,
        MetricFamily::Docsis | MetricFamily::Bandwidth => EncryptionLevel::Advanced,
        MetricFamily::Performance | MetricFamily::Connectivity => EncryptionLevel::Basic,
        MetricFamily::Latency | MetricFamily::WifiMesh => EncryptionLevel::None,
    }
}

/// `Security` -> `archive`; `Docsis`, `SystemResources`, `Bandwidth` ->
/// `long`; `Connectivity`, `Performance`, `Latency`, `WifiMesh` -> `medium`.
pub fn retention_policy_for(family: MetricFamily) -> RetentionPolicy {
    match family {
        MetricFamily::Security => RetentionPolicy::Archive,
        MetricFamily::Docsis | MetricFamily::SystemResources | MetricFamily::Bandwidth => {
            RetentionPolicy::Long
        }
        MetricFamily::Connectivity
        | MetricFamily::Performance
        | MetricFamily::Latency
        | MetricFamily::WifiMesh => RetentionPolicy::Medium,
    }
}

pub struct EncodedValue {
    pub bytes: Vec<u8>,
    pub compression: CompressionType,
    pub encryption: EncryptionLevel,
}

/// Ejecuta los cuatro pasos del pipeline sobre el valor ya serializado a
/// JSON por el llamador (`serde_json::to_vec`).
pub fn encode(
    raw_json_bytes: Vec<u8>,
    family: MetricFamily,
    compression_threshold: usize,
    encryption_enabled: bool,
    key: Option<&Aes256Gcm>,
) -> Result<EncodedValue, StorageError> {
    let (bytes, compression) = if raw_json_bytes.len() > compression_threshold {
        (gzip_compress(&raw_json_bytes)?, CompressionType::Gzip)
    } else {
        (raw_json_bytes, CompressionType::None)
    };

    let level = encryption_level_for(family);

    let bytes = if encryption_enabled && level != EncryptionLevel::None {
        let key = key.ok_or_else(|| {
            StorageError::EncodingError("encryption enabled but no key loaded".into())
        })?;
        encrypt(&bytes, key)?
    } else {
        bytes
    };

    Ok(EncodedValue {
        bytes,
        compression,
        encryption: if encryption_enabled {
            level
        } else {
            EncryptionLevel::None
        },
    })
}

pub fn decode(
    bytes: &[u8],
    compression: CompressionType,
    encryption: EncryptionLevel,
    key: Option<&Aes256Gcm>,
) -> Result<Vec<u8>, StorageError> {
    let bytes = if encryption != EncryptionLevel::None {
        let key = key.ok_or_else(|| {
            StorageError::EncodingError("row is encrypted but no key loaded".into())
        })?;
        decrypt(bytes, key)?
    } else {
        bytes.to_vec()
    };

    match compression {
        CompressionType::Gzip => gzip_decompress(&bytes),
        CompressionType::None => Ok(bytes),
    }
}

fn gzip_compress(data: &[u8]) -> Result<Vec<u8>, StorageError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| StorageError::EncodingError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| StorageError::EncodingError(e.to_string()))
}

fn gzip_decompress(data: &[u8]) -> Result<Vec<u8>, StorageError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| StorageError::EncodingError(e.to_string()))?;
    Ok(out)
}

fn encrypt(plaintext: &[u8], key: &Aes256Gcm) -> Result<Vec<u8>, StorageError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = key
        .encrypt(nonce, plaintext)
        .map_err(|_| StorageError::EncodingError("AEAD encryption failed".into()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

fn decrypt(payload: &[u8], key: &Aes256Gcm) -> Result<Vec<u8>, StorageError> {
    if payload.len() < NONCE_LEN {
        return Err(StorageError::EncodingError(
            "ciphertext shorter than nonce".into(),
        ));
    }
    let (nonce_bytes, ciphertext) = payload.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    key.decrypt(nonce, ciphertext)
        .map_err(|_| StorageError::EncodingError("AEAD decryption failed: integrity compromised".into()))
}

/// Ciclo de vida de la llave simétrica de proceso. Generada con `rand`
/// en el primer arranque y persistida con permisos `0600`; en arranques
/// posteriores simplemente se lee y se parsea. Rotación fuera de alcance.
pub struct KeyManager;

impl KeyManager {
    pub fn load_or_create(path: &Path) -> Result<Aes256Gcm, StorageError> {
        if path.exists() {
            let raw = std::fs::read(path).map_err(|e| StorageError::KeyFault(e.to_string()))?;
            if raw.len() != 32 {
                return Err(StorageError::KeyFault(format!(
                    "key file has {} bytes, expected 32",
                    raw.len()
                )));
            }
            let key = Key::<Aes256Gcm>::from_slice(&raw);
            return Ok(Aes256Gcm::new(key));
        }

        let mut key_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut key_bytes);

        std::fs::write(path, key_bytes).map_err(|e| StorageError::KeyFault(e.to_string()))?;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .map_err(|e| StorageError::KeyFault(e.to_string()))?;

        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Ok(Aes256Gcm::new(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_encryption_levels_match_the_table() {
        assert_eq!(encryption_level_for(MetricFamily::Security), EncryptionLevel::Sensitive);
        assert_eq!(encryption_level_for(MetricFamily::SystemResources), EncryptionLevel::Sensitive);
        assert_eq!(encryption_level_for(MetricFamily::Docsis), EncryptionLevel::Advanced);
        assert_eq!(encryption_level_for(MetricFamily::Bandwidth), EncryptionLevel::Advanced);
        assert_eq!(encryption_level_for(MetricFamily::Performance), EncryptionLevel::Basic);
        assert_eq!(encryption_level_for(MetricFamily::Connectivity), EncryptionLevel::Basic);
        assert_eq!(encryption_level_for(MetricFamily::Latency), EncryptionLevel::None);
        assert_eq!(encryption_level_for(MetricFamily::WifiMesh), EncryptionLevel::None);
    }

    #[test]
    fn family_retention_policies_match_the_table() {
        assert_eq!(retention_policy_for(MetricFamily::Security), RetentionPolicy::Archive);
        assert_eq!(retention_policy_for(MetricFamily::Docsis), RetentionPolicy::Long);
        assert_eq!(retention_policy_for(MetricFamily::SystemResources), RetentionPolicy::Long);
        assert_eq!(retention_policy_for(MetricFamily::Bandwidth), RetentionPolicy::Long);
        assert_eq!(retention_policy_for(MetricFamily::Connectivity), RetentionPolicy::Medium);
        assert_eq!(retention_policy_for(MetricFamily::Performance), RetentionPolicy::Medium);
        assert_eq!(retention_policy_for(MetricFamily::Latency), RetentionPolicy::Medium);
        assert_eq!(retention_policy_for(MetricFamily::WifiMesh), RetentionPolicy::Medium);
    }

    #[test]
    fn permanent_policy_has_no_finite_horizon() {
        assert_eq!(RetentionPolicy::Permanent.horizon_hours(), None);
        assert_eq!(RetentionPolicy::Realtime.horizon_hours(), Some(1));
        assert_eq!(RetentionPolicy::Archive.horizon_hours(), Some(24 * 365));
    }

    #[test]
    fn compression_threshold_boundary_is_exclusive() {
        let at_threshold = vec![0u8; DEFAULT_COMPRESSION_THRESHOLD_BYTES];
        let encoded = encode(at_threshold, MetricFamily::Latency, DEFAULT_COMPRESSION_THRESHOLD_BYTES, false, None).unwrap();
        assert_eq!(encoded.compression, CompressionType::None);

        let over_threshold = vec![0u8; DEFAULT_COMPRESSION_THRESHOLD_BYTES + 1];
        let encoded = encode(over_threshold, MetricFamily::Latency, DEFAULT_COMPRESSION_THRESHOLD_BYTES, false, None).unwrap();
        assert_eq!(encoded.compression, CompressionType::Gzip);
    }

    #[test]
    fn encrypt_then_decrypt_round_trips() {
        let key_bytes = [7u8; 32];
        let key = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key_bytes));
        let plaintext = b"sensitive telemetry payload".to_vec();

        let ciphertext = encrypt(&plaintext, &key).unwrap();
        assert_ne!(ciphertext, plaintext);

        let decrypted = decrypt(&ciphertext, &key).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn gzip_round_trips() {
        let data = b"x".repeat(4096);
        let compressed = gzip_compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        let decompressed = gzip_decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }
}
