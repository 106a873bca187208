// [tests/mirror/apps/sentinel/coordinator/graceful_shutdown.test.rs]
//! Cubre el apagado de dos fases: sin tareas en vuelo, `shutdown`
//! debe completar de inmediato y aun así ejecutar el volcado final del
//! buffer restante.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use netarchon_credentials::{CredentialResolver, FileSecretStore};
use netarchon_models::{Device, DeviceKind, MetricFamily, MetricPoint, MetricUnit, MetricValue};
use netarchon_sentinel::Coordinator;
use netarchon_storage::{MetricsStore, StorageOpenOptions};
use netarchon_support::TelemetryConfig;

async fn build_coordinator() -> Coordinator {
    let config = Arc::new(TelemetryConfig::load().expect("config loads with defaults"));
    let store = MetricsStore::open(StorageOpenOptions {
        database_path: ":memory:".to_string(),
        enable_encryption: false,
        ..Default::default()
    })
    .await
    .expect("in-memory store opens");
    let credentials = Arc::new(CredentialResolver::new(Arc::new(FileSecretStore::new(
        "/nonexistent/secrets.json",
    ))));
    Coordinator::new(config, store, credentials)
}

#[tokio::test]
async fn shutdown_with_no_in_flight_work_completes_immediately() {
    let coordinator = build_coordinator().await;

    let outcome = tokio::time::timeout(Duration::from_secs(2), coordinator.shutdown()).await;

    assert!(outcome.is_ok(), "shutdown must not block when nothing is in flight");
}

#[tokio::test]
async fn shutdown_performs_a_best_effort_final_flush() {
    let coordinator = build_coordinator().await;
    let device = Device::new(
        "modem-1",
        "Living Room Modem",
        DeviceKind::CableModem,
        "192.168.1.1",
        Duration::from_secs(30),
    )
    .unwrap();

    let point = MetricPoint::new(
        device.id.clone(),
        device.name.clone(),
        device.kind,
        MetricFamily::Connectivity,
        "reachable",
        MetricValue::Bool(true),
        MetricUnit::Boolean,
        Utc::now(),
    )
    .unwrap();
    coordinator.push_points(vec![point]);
    assert_eq!(coordinator.buffered_len(), 1);

    coordinator.shutdown().await;

    assert_eq!(coordinator.buffered_len(), 0, "shutdown must drain whatever remained buffered");
}
