// [tests/mirror/apps/sentinel/coordinator/flush_triggers.test.rs]
//! Cubre el disparador dual de volcado: por tamaño de lote (`push_points`
//! señala cuándo el lote alcanzó `batch_size`) y por drenaje manual
//! (`flush`, el mismo método que usa el bucle de intervalo).

use std::sync::Arc;

use chrono::Utc;
use netarchon_credentials::{CredentialResolver, FileSecretStore};
use netarchon_models::{Device, DeviceKind, MetricFamily, MetricPoint, MetricUnit, MetricValue};
use netarchon_sentinel::Coordinator;
use netarchon_storage::{MetricsStore, StorageOpenOptions};
use netarchon_support::TelemetryConfig;

async fn build_coordinator() -> (Coordinator, usize) {
    let config = Arc::new(TelemetryConfig::load().expect("config loads with defaults"));
    let batch_size = config.batch_size;
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
    (Coordinator::new(config, store, credentials), batch_size)
}

fn sample_points(device: &Device, count: usize) -> Vec<MetricPoint> {
    (0..count)
        .map(|i| {
            MetricPoint::new(
                device.id.clone(),
                device.name.clone(),
                device.kind,
                MetricFamily::SystemResources,
                "cpu_usage",
                MetricValue::Float(42.0),
                MetricUnit::Percentage,
                Utc::now(),
            )
            .unwrap()
            .with_metadata("seq", serde_json::json!(i))
        })
        .collect()
}

#[tokio::test]
async fn push_points_signals_flush_once_batch_size_is_reached() {
    let (coordinator, batch_size) = build_coordinator().await;
    let device = Device::new(
        "server-1",
        "Home Server",
        DeviceKind::LinuxServer,
        "10.0.0.5",
        std::time::Duration::from_secs(60),
    )
    .unwrap();

    let below_threshold = coordinator.push_points(sample_points(&device, batch_size - 1));
    assert!(!below_threshold, "a batch short of batch_size must not request an immediate flush");

    let at_threshold = coordinator.push_points(sample_points(&device, 1));
    assert!(at_threshold, "crossing batch_size must request an immediate flush");
}

#[tokio::test]
async fn flush_drains_the_buffer_regardless_of_how_it_was_filled() {
    let (coordinator, _batch_size) = build_coordinator().await;
    let device = Device::new(
        "server-1",
        "Home Server",
        DeviceKind::LinuxServer,
        "10.0.0.5",
        std::time::Duration::from_secs(60),
    )
    .unwrap();

    coordinator.push_points(sample_points(&device, 3));
    assert_eq!(coordinator.buffered_len(), 3);

    coordinator.flush().await;
    assert_eq!(coordinator.buffered_len(), 0);
}

#[tokio::test]
async fn flushing_twice_in_a_row_is_harmless() {
    let (coordinator, _batch_size) = build_coordinator().await;
    coordinator.flush().await;
    coordinator.flush().await;
    assert_eq!(coordinator.buffered_len(), 0);
}
