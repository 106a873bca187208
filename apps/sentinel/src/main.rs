// [apps/sentinel/src/main.rs]
/*!
 * =================================================================
 * APARATO: SENTINEL DAEMON SHELL
 * CLASIFICACIÓN: APPLICATION LAYER (ENTRY POINT)
 * RESPONSABILIDAD: BOOTSTRAP DE ENTORNO E IGNICIÓN DEL COORDINADOR
 *
 * Compone el motor de persistencia, el coordinador de recolección y
 * el motor de alertas, carga la flota y el catálogo de reglas desde
 * disco, lanza los bucles de fondo y espera la señal de apagado del
 * sistema operativo antes de drenar el estado en vuelo.
 * =================================================================
 */

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use netarchon_credentials::{CredentialResolver, FileSecretStore};
use netarchon_sentinel::{alert_engine, devices, AppState, Coordinator};
use netarchon_storage::{MetricsStore, StorageOpenOptions};
use netarchon_support::TelemetryConfig;
use tracing::{info, warn};

/// Directivas de arranque opcionales; toda configuración sustantiva
/// vive en variables de entorno (ver `netarchon_support::TelemetryConfig`),
/// estos argumentos solo cubren las rutas de los catálogos de flota.
#[derive(Parser, Debug)]
#[command(
    author = "Raz Podesta <metaShark Tech>",
    version,
    about = "NetArchon Sentinel -- daemon de telemetría de red doméstica"
)]
struct SentinelDirectives {
    /// Ruta al inventario JSON de dispositivos monitoreados.
    #[arg(long, env = "NETARCHON_DEVICES_FILE", default_value = "devices.json")]
    devices_file: String,

    /// Ruta al catálogo JSON de reglas de alerta.
    #[arg(long, env = "NETARCHON_RULES_FILE", default_value = "rules.json")]
    rules_file: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Arc::new(TelemetryConfig::load().context("failed to load telemetry configuration")?);
    netarchon_support::init_tracing(&config.service_name);

    info!("🛰️  [SENTINEL]: starting {}", config.service_name);

    let directives = SentinelDirectives::parse();

    let storage_options = StorageOpenOptions {
        database_path: config.database_path.clone(),
        encryption_key_path: config.encryption_key_path.clone(),
        compression_threshold_bytes: config.compression_threshold_bytes,
        enable_encryption: config.enable_encryption,
        enable_compression: config.enable_compression,
        data_dir: config.data_dir.clone(),
        backup_interval_hours: config.backup_interval_hours,
        vacuum_interval_hours: config.vacuum_interval_hours,
        retention_sweep_interval_hours: config.retention_sweep_interval_hours,
    };

    // Una llave de cifrado ilegible o corrupta es la única condición
    // fatal de arranque del motor de persistencia; se propaga aquí
    // como el resto de fallos de composición del binario.
    let store = MetricsStore::open(storage_options)
        .await
        .context("failed to open metrics store")?;

    let secret_store = Arc::new(FileSecretStore::new(config.secrets_file_path.clone()));
    let credentials = Arc::new(CredentialResolver::new(secret_store));

    let coordinator = Arc::new(Coordinator::new(config.clone(), store.clone(), credentials));

    match devices::load_fleet(&directives.devices_file).await {
        Ok(fleet) => {
            info!("📋 [SENTINEL]: loaded {} device(s) from {}", fleet.len(), directives.devices_file);
            for device in fleet {
                coordinator.register_device(device).await;
            }
        }
        Err(e) => warn!("📋 [SENTINEL]: no device fleet loaded ({e}), starting with an empty registry"),
    }

    let alert_engine = alert_engine::build_alert_engine(&config, store.clone());

    match devices::load_rules(&directives.rules_file).await {
        Ok(rules) => {
            info!("📏 [SENTINEL]: loaded {} alert rule(s) from {}", rules.len(), directives.rules_file);
            for rule in rules {
                alert_engine.add_rule(rule);
            }
        }
        Err(e) => warn!("📏 [SENTINEL]: no alert rules loaded ({e})"),
    }

    let state = AppState {
        config: config.clone(),
        store: store.clone(),
        coordinator: coordinator.clone(),
        alert_engine: alert_engine.clone(),
    };

    store.spawn_maintenance_loops();
    tokio::spawn(state.coordinator.clone().run_collection_loop());
    tokio::spawn(state.coordinator.clone().run_flush_loop());
    tokio::spawn(state.alert_engine.clone().run_evaluation_loop(config.evaluation_tick()));
    tokio::spawn(
        state
            .alert_engine
            .clone()
            .run_baseline_loop(config.baseline_rebuild_interval()),
    );

    info!("🛰️  [SENTINEL]: all background loops started, awaiting shutdown signal");

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    warn!("🛑 [SENTINEL]: shutdown signal received, draining in-flight work");

    state.coordinator.shutdown().await;

    info!("🛰️  [SENTINEL]: shutdown complete");
    Ok(())
}
