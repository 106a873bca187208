// [tests/mirror/apps/sentinel/coordinator/backpressure.test.rs]
//! Cubre el desalojo del buffer de escritura diferida al cruzar la
//! marca de agua alta por dispositivo.

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

fn sample_point(device: &Device, seq: usize) -> MetricPoint {
    MetricPoint::new(
        device.id.clone(),
        device.name.clone(),
        device.kind,
        MetricFamily::Connectivity,
        "reachable",
        MetricValue::Bool(true),
        MetricUnit::Boolean,
        Utc::now(),
    )
    .unwrap()
    .with_metadata("seq", serde_json::json!(seq))
}

#[tokio::test]
async fn freshly_registered_device_starts_with_no_dropped_points() {
    let coordinator = build_coordinator().await;
    let device = Device::new(
        "modem-1",
        "Living Room Modem",
        DeviceKind::CableModem,
        "192.168.1.1",
        Duration::from_secs(30),
    )
    .unwrap();

    coordinator.register_device(device).await;

    assert_eq!(coordinator.dropped_points(), 0);
    assert_eq!(coordinator.buffered_len(), 0);
}

#[tokio::test]
async fn pushing_past_the_high_water_mark_evicts_the_oldest_points() {
    let coordinator = build_coordinator().await;
    let device = Device::new(
        "modem-1",
        "Living Room Modem",
        DeviceKind::CableModem,
        "192.168.1.1",
        Duration::from_secs(30),
    )
    .unwrap();
    coordinator.register_device(device.clone()).await;

    let high_water_mark = TelemetryConfig::load().unwrap().buffer_high_water_mark_per_device;
    let overflow = 7;
    let points: Vec<MetricPoint> = (0..(high_water_mark + overflow))
        .map(|i| sample_point(&device, i))
        .collect();

    coordinator.push_points(points);

    assert_eq!(coordinator.buffered_len(), high_water_mark);
    assert_eq!(coordinator.dropped_points(), overflow as u64);
}

#[tokio::test]
async fn removing_an_unregistered_device_is_a_no_op() {
    let coordinator = build_coordinator().await;
    coordinator
        .remove_device(&netarchon_models::DeviceId::from("ghost"))
        .await;
    assert_eq!(coordinator.buffered_len(), 0);
}
