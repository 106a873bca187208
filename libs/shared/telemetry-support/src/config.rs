// [libs/shared/telemetry-support/src/config.rs]
//! =================================================================
//! APARATO: TELEMETRY ENGINE CONFIGURATION SURFACE
//! RESPONSABILIDAD: CARGA DE OPCIONES DESDE ENTORNO/.env
//! =================================================================

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("[L4_CONFIG_MISSING]: required environment variable '{0}' is not set")]
    Missing(String),
    #[error("[L4_CONFIG_MALFORMED]: environment variable '{0}' has an invalid value: {1}")]
    Malformed(String, String),
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Malformed(key.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Superficie de configuración completa del daemon, reunida desde
/// variables de entorno (`dotenvy::dotenv()` ya debe haberse llamado
/// antes de `TelemetryConfig::load`). Cada campo tiene un valor por
/// defecto sensato; solo `secrets_file_path` y `data_dir` suelen
/// necesitar ajuste real en despliegue.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,

    // --- Motor de persistencia ---
    pub data_dir: PathBuf,
    pub database_path: String,
    pub encryption_key_path: PathBuf,
    pub max_db_size_mb: u64,
    pub compression_threshold_bytes: usize,
    pub batch_size: usize,
    pub vacuum_interval_hours: u64,
    pub backup_interval_hours: u64,
    pub retention_sweep_interval_hours: u64,
    pub enable_encryption: bool,
    pub enable_compression: bool,

    // --- Coordinador de recolección ---
    pub max_workers: usize,
    pub collection_interval_seconds: u64,
    pub flush_interval_seconds: u64,
    pub shutdown_drain_timeout_seconds: u64,
    pub buffer_high_water_mark_per_device: usize,
    pub secrets_file_path: PathBuf,
    pub http_request_timeout_seconds: u64,

    // --- Motor de alertas ---
    pub evaluation_tick_seconds: u64,
    pub baseline_rebuild_hours: u64,
    pub default_anomaly_sensitivity: f64,
    pub notification_rate_limit_minutes: i64,
    pub notification_rate_limit_max_per_window: u32,

    // --- Canales de notificación (opcionales) ---
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from_address: Option<String>,
    pub smtp_to_address: Option<String>,
    pub webhook_endpoint: Option<String>,
    pub chat_webhook_endpoint: Option<String>,
}

impl TelemetryConfig {
    /// Carga la configuración desde el entorno del proceso. Ningún
    /// campo es estrictamente obligatorio -- un despliegue mínimo de
    /// prueba arranca con solo los valores por defecto.
    pub fn load() -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(env_or("NETARCHON_DATA_DIR", "."));

        Ok(Self {
            service_name: env_or("NETARCHON_SERVICE_NAME", "netarchon-sentinel"),

            database_path: env_or("NETARCHON_DATABASE_PATH", "metrics.db"),
            encryption_key_path: PathBuf::from(env_or("NETARCHON_KEY_PATH", ".storage_key")),
            max_db_size_mb: parse_env("NETARCHON_MAX_DB_SIZE_MB", 4096)?,
            compression_threshold_bytes: parse_env("NETARCHON_COMPRESSION_THRESHOLD_BYTES", 512)?,
            batch_size: parse_env("NETARCHON_BATCH_SIZE", 1000)?,
            vacuum_interval_hours: parse_env("NETARCHON_VACUUM_INTERVAL_HOURS", 24)?,
            backup_interval_hours: parse_env("NETARCHON_BACKUP_INTERVAL_HOURS", 6)?,
            retention_sweep_interval_hours: parse_env("NETARCHON_RETENTION_SWEEP_INTERVAL_HOURS", 1)?,
            enable_encryption: parse_env("NETARCHON_ENABLE_ENCRYPTION", true)?,
            enable_compression: parse_env("NETARCHON_ENABLE_COMPRESSION", true)?,

            max_workers: parse_env("NETARCHON_MAX_WORKERS", 10)?,
            collection_interval_seconds: parse_env("NETARCHON_COLLECTION_INTERVAL_SECONDS", 60)?,
            flush_interval_seconds: parse_env("NETARCHON_FLUSH_INTERVAL_SECONDS", 30)?,
            shutdown_drain_timeout_seconds: parse_env("NETARCHON_SHUTDOWN_DRAIN_TIMEOUT_SECONDS", 10)?,
            buffer_high_water_mark_per_device: parse_env("NETARCHON_BUFFER_HIGH_WATER_MARK_PER_DEVICE", 100)?,
            secrets_file_path: PathBuf::from(env_or("NETARCHON_SECRETS_FILE", "secrets.json")),
            http_request_timeout_seconds: parse_env("NETARCHON_HTTP_REQUEST_TIMEOUT_SECONDS", 10)?,

            evaluation_tick_seconds: parse_env("NETARCHON_EVALUATION_TICK_SECONDS", 30)?,
            baseline_rebuild_hours: parse_env("NETARCHON_BASELINE_REBUILD_HOURS", 1)?,
            default_anomaly_sensitivity: parse_env("NETARCHON_ANOMALY_SENSITIVITY", 2.0)?,
            notification_rate_limit_minutes: parse_env("NETARCHON_NOTIFICATION_RATE_LIMIT_MINUTES", 15)?,
            notification_rate_limit_max_per_window: parse_env("NETARCHON_NOTIFICATION_RATE_LIMIT_MAX", 3)?,

            smtp_host: std::env::var("NETARCHON_SMTP_HOST").ok(),
            smtp_port: parse_env("NETARCHON_SMTP_PORT", 587)?,
            smtp_username: std::env::var("NETARCHON_SMTP_USERNAME").ok(),
            smtp_password: std::env::var("NETARCHON_SMTP_PASSWORD").ok(),
            smtp_from_address: std::env::var("NETARCHON_SMTP_FROM").ok(),
            smtp_to_address: std::env::var("NETARCHON_SMTP_TO").ok(),
            webhook_endpoint: std::env::var("NETARCHON_WEBHOOK_URL").ok(),
            chat_webhook_endpoint: std::env::var("NETARCHON_CHAT_WEBHOOK_URL").ok(),

            data_dir,
        })
    }

    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(self.collection_interval_seconds)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_seconds)
    }

    pub fn shutdown_drain_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_drain_timeout_seconds)
    }

    pub fn evaluation_tick(&self) -> Duration {
        Duration::from_secs(self.evaluation_tick_seconds)
    }

    pub fn baseline_rebuild_interval(&self) -> Duration {
        Duration::from_secs(self.baseline_rebuild_hours * 3600)
    }

    pub fn http_request_timeout(&self) -> Duration {
        Duration::from_secs(self.http_request_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("NETARCHON_MAX_WORKERS");
        let config = TelemetryConfig::load().unwrap();
        assert_eq!(config.max_workers, 10);
        assert_eq!(config.evaluation_tick_seconds, 30);
    }

    #[test]
    fn malformed_numeric_override_is_reported() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("NETARCHON_MAX_WORKERS", "not-a-number");
        let result = TelemetryConfig::load();
        std::env::remove_var("NETARCHON_MAX_WORKERS");
        assert!(matches!(result, Err(ConfigError::Malformed(_, _))));
    }
}
