// [tests/mirror/apps/sentinel/alert_engine/cooldown_and_anomaly.test.rs]
//! Cubre dos invariantes que `libs/domain/alerting`'s own `#[cfg(test)]`
//! module no ejercita directamente: la supresión durante cooldown (un
//! breach repetido no debe generar una segunda notificación mientras la
//! alerta sigue activa) y el disparo por detección de anomalías contra
//! un baseline ya calculado.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use netarchon_alerting::AlertEngine;
use netarchon_models::{
    AlertRule, AlertSeverity, DeviceId, DeviceKind, MetricFamily, MetricPoint, MetricUnit, MetricValue, RuleOperator,
};
use netarchon_storage::{MetricsStore, StorageOpenOptions};

async fn memory_store() -> MetricsStore {
    MetricsStore::open(StorageOpenOptions {
        database_path: ":memory:".to_string(),
        enable_encryption: false,
        ..Default::default()
    })
    .await
    .unwrap()
}

fn cpu_point(value: f64, at: DateTime<Utc>) -> MetricPoint {
    MetricPoint::new(
        DeviceId::from("dev-a"),
        "Device A",
        DeviceKind::LinuxServer,
        MetricFamily::SystemResources,
        "cpu_usage",
        MetricValue::Float(value),
        MetricUnit::Percentage,
        at,
    )
    .unwrap()
}

fn cpu_rule(operator: RuleOperator, consecutive: u32) -> AlertRule {
    AlertRule {
        id: "cpu-rule".to_string(),
        name: "CPU rule".to_string(),
        description: String::new(),
        device_filter: None,
        family_filter: Some(vec![MetricFamily::SystemResources]),
        metric_name_filter: Some(vec!["cpu_usage".to_string()]),
        operator,
        severity: AlertSeverity::Warning,
        enabled: true,
        evaluation_window: std::time::Duration::from_secs(300),
        consecutive_breaches_required: consecutive,
        cooldown_minutes: 30,
        auto_resolve: false,
        auto_resolve_minutes: 10,
        correlation_group: None,
        notification_channels: vec![],
        custom_message_template: None,
    }
}

#[tokio::test]
async fn breaches_within_cooldown_update_the_existing_alert_without_creating_a_new_one() {
    let store = memory_store().await;
    let engine = AlertEngine::new(store.clone());
    let rule = cpu_rule(RuleOperator::GreaterThan(85.0), 2);
    engine.add_rule(rule.clone());

    let t0 = Utc::now() - ChronoDuration::minutes(10);
    store.store(vec![cpu_point(80.0, t0)]).await.unwrap();
    engine.evaluate_rule(&rule, t0 + ChronoDuration::seconds(1)).await.unwrap();
    assert!(engine.get_active_alerts().is_empty());

    let t1 = t0 + ChronoDuration::seconds(30);
    store.store(vec![cpu_point(90.0, t1)]).await.unwrap();
    engine.evaluate_rule(&rule, t1 + ChronoDuration::seconds(1)).await.unwrap();
    let alerts = engine.get_active_alerts();
    assert_eq!(alerts.len(), 1, "second consecutive breach must create exactly one alert");
    assert_eq!(alerts[0].breach_count, 2);

    // Five more breaching points within the 30 minute cooldown window.
    let mut last = t1;
    for _ in 0..5 {
        last += ChronoDuration::minutes(1);
        store.store(vec![cpu_point(90.0, last)]).await.unwrap();
        engine.evaluate_rule(&rule, last + ChronoDuration::seconds(1)).await.unwrap();
    }

    let alerts = engine.get_active_alerts();
    assert_eq!(alerts.len(), 1, "cooldown must suppress creation of a second alert");
    assert_eq!(alerts[0].breach_count, 7);
    assert_eq!(alerts[0].current_value, 90.0);
}

#[tokio::test]
async fn anomaly_rule_trips_on_a_clear_outlier_once_a_baseline_exists() {
    let store = memory_store().await;
    let engine = AlertEngine::new(store.clone());
    let rule = cpu_rule(RuleOperator::AnomalyDetection { sensitivity: 2.0 }, 1);
    engine.add_rule(rule.clone());

    // Seed a stable history clustered around 30 so the computed baseline's
    // mean/stddev resemble a quiet system; spread across distinct hours so
    // no single hourly/daily bucket dominates the temporal profile.
    let base = Utc::now() - ChronoDuration::days(2);
    let mut history = Vec::new();
    for i in 0..30 {
        let value = if i % 2 == 0 { 27.0 } else { 33.0 };
        history.push(cpu_point(value, base + ChronoDuration::hours(i)));
    }
    store.store(history).await.unwrap();

    let now = Utc::now();
    engine.update_baselines(now).await;

    store.store(vec![cpu_point(90.0, now)]).await.unwrap();
    engine.evaluate_rule(&rule, now + ChronoDuration::seconds(1)).await.unwrap();
    assert_eq!(
        engine.get_active_alerts().len(),
        1,
        "a value far outside the baseline's spread must trip the anomaly rule"
    );
}

#[tokio::test]
async fn anomaly_rule_never_trips_without_a_baseline() {
    let store = memory_store().await;
    let engine = AlertEngine::new(store.clone());
    let rule = cpu_rule(RuleOperator::AnomalyDetection { sensitivity: 2.0 }, 1);
    engine.add_rule(rule.clone());

    let now = Utc::now();
    store.store(vec![cpu_point(1000.0, now)]).await.unwrap();
    engine.evaluate_rule(&rule, now + ChronoDuration::seconds(1)).await.unwrap();

    assert!(engine.get_active_alerts().is_empty());
}
