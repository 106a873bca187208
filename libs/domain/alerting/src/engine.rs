// [libs/domain/alerting/src/engine.rs]
//! =================================================================
//! APARATO: ALERT ENGINE (V1.0)
//! CLASIFICACIÓN: DOMAIN COMPOSITION ROOT (ESTRATO L2)
//! RESPONSABILIDAD: EVALUACIÓN DE REGLAS, BASELINES Y DESPACHO DE AVISOS
//!
//! Estado compartido protegido por `std::sync::RwLock`/`Mutex` simples,
//! no los equivalentes async de tokio -- cada sección crítica es corta
//! y nunca retiene el candado a través de un punto de espera, igual que
//! `SwarmTelemetryManager`/`OperationalNexusManager` en el composition
//! root del daemon original.
//! =================================================================

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::future::join_all;
use netarchon_models::{Alert, AlertRule, Baseline, DeviceId, MetricFamily, MetricPoint, NotificationAttempt, NotificationChannelKind};
use netarchon_storage::{MetricsStore, OrderDirection, OrderField, QueryFilter};
use tracing::{error, info, instrument, warn};

use crate::baseline::compute_baseline;
use crate::errors::AlertingError;
use crate::notification::NotificationChannel;
use crate::predicate;

type RuleDeviceKey = (String, DeviceId);

const BASELINE_WINDOW_DAYS: i64 = 7;

/// Motor vivo: mantiene reglas, baselines, alertas en curso y el
/// registro de canales de notificación. Una única instancia se
/// envuelve en `Arc` en el punto de composición y se comparte entre
/// el bucle de evaluación, el bucle de baselines y cualquier consumidor
/// HTTP/CLI que quiera leer el estado actual.
pub struct AlertEngine {
    store: MetricsStore,
    rules: RwLock<HashMap<String, AlertRule>>,
    last_evaluated: Mutex<HashMap<String, DateTime<Utc>>>,
    live_alerts: RwLock<HashMap<RuleDeviceKey, Alert>>,
    breach_counters: Mutex<HashMap<RuleDeviceKey, u32>>,
    correlation_index: RwLock<HashMap<String, Vec<RuleDeviceKey>>>,
    alert_history: RwLock<Vec<Alert>>,
    baselines: RwLock<HashMap<(DeviceId, MetricFamily, String), Baseline>>,
    channels: RwLock<HashMap<NotificationChannelKind, Arc<dyn NotificationChannel>>>,
}

impl AlertEngine {
    pub fn new(store: MetricsStore) -> Self {
        Self {
            store,
            rules: RwLock::new(HashMap::new()),
            last_evaluated: Mutex::new(HashMap::new()),
            live_alerts: RwLock::new(HashMap::new()),
            breach_counters: Mutex::new(HashMap::new()),
            correlation_index: RwLock::new(HashMap::new()),
            alert_history: RwLock::new(Vec::new()),
            baselines: RwLock::new(HashMap::new()),
            channels: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_rule(&self, rule: AlertRule) {
        self.rules.write().unwrap().insert(rule.id.clone(), rule);
    }

    pub fn remove_rule(&self, rule_id: &str) {
        self.rules.write().unwrap().remove(rule_id);
        self.last_evaluated.lock().unwrap().remove(rule_id);
    }

    pub fn register_channel(&self, channel: Arc<dyn NotificationChannel>) {
        self.channels.write().unwrap().insert(channel.kind(), channel);
    }

    pub fn get_active_alerts(&self) -> Vec<Alert> {
        self.live_alerts.read().unwrap().values().cloned().collect()
    }

    pub fn get_alerts_by_correlation_group(&self, group: &str) -> Vec<Alert> {
        let index = self.correlation_index.read().unwrap();
        let Some(keys) = index.get(group) else {
            return Vec::new();
        };
        let live = self.live_alerts.read().unwrap();
        keys.iter().filter_map(|key| live.get(key).cloned()).collect()
    }

    pub fn get_history(&self) -> Vec<Alert> {
        self.alert_history.read().unwrap().clone()
    }

    /// Reconcilia tanto el mapa de alertas vivas como el historial --
    /// ambos se mutan de forma explícita por id, nunca por simple
    /// `push`, ya que un clon en Rust es un valor independiente y un
    /// `push` ciego produciría entradas de historial obsoletas.
    pub fn acknowledge(&self, alert_id: &str, who: &str, now: DateTime<Utc>) -> Result<(), AlertingError> {
        let mut live = self.live_alerts.write().unwrap();
        let key = live
            .iter()
            .find(|(_, alert)| alert.id == alert_id)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| AlertingError::UnknownAlert(alert_id.to_string()))?;

        let alert = live.get_mut(&key).unwrap();
        alert.acknowledge(who, now);
        self.sync_history(alert);
        Ok(())
    }

    fn sync_history(&self, alert: &Alert) {
        let mut history = self.alert_history.write().unwrap();
        match history.iter_mut().find(|existing| existing.id == alert.id) {
            Some(existing) => *existing = alert.clone(),
            None => history.push(alert.clone()),
        }
    }

    /// Bucle de evaluación: cada `tick` recorre las reglas habilitadas
    /// cuya ventana individual ya venció desde su última evaluación.
    pub async fn run_evaluation_loop(self: Arc<Self>, tick: StdDuration) {
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.evaluate_all(Utc::now()).await;
        }
    }

    #[instrument(skip(self))]
    pub async fn evaluate_all(&self, now: DateTime<Utc>) {
        let due_rules: Vec<AlertRule> = {
            let rules = self.rules.read().unwrap();
            let last_evaluated = self.last_evaluated.lock().unwrap();
            rules
                .values()
                .filter(|rule| rule.enabled)
                .filter(|rule| {
                    last_evaluated
                        .get(&rule.id)
                        .map(|last| now - *last >= ChronoDuration::from_std(rule.evaluation_window).unwrap_or(ChronoDuration::zero()))
                        .unwrap_or(true)
                })
                .cloned()
                .collect()
        };

        for rule in due_rules {
            if let Err(e) = self.evaluate_rule(&rule, now).await {
                error!("❌ [ALERT_EVAL_FAULT]: rule {} evaluation failed: {}", rule.id, e);
            }
            self.last_evaluated.lock().unwrap().insert(rule.id.clone(), now);
        }
    }

    /// Evalúa una única regla: consulta, agrupa por dispositivo, toma
    /// el punto más reciente por dispositivo y aplica el predicado.
    pub async fn evaluate_rule(&self, rule: &AlertRule, now: DateTime<Utc>) -> Result<(), AlertingError> {
        let since = now - ChronoDuration::from_std(rule.evaluation_window).unwrap_or(ChronoDuration::minutes(5));
        let filter = QueryFilter {
            device_ids: rule.device_filter.clone().unwrap_or_default(),
            families: rule.family_filter.clone().unwrap_or_default(),
            metric_names: rule.metric_name_filter.clone().unwrap_or_default(),
            since: Some(since),
            until: Some(now),
            order_by: Some(OrderField::Timestamp),
            order_dir: Some(OrderDirection::Ascending),
            ..QueryFilter::new()
        };

        let points = self.store.query(&filter).await;
        let latest_per_device = latest_point_per_device(points);
        let mut touched: HashSet<DeviceId> = HashSet::new();

        for (device_id, point) in latest_per_device {
            touched.insert(device_id.clone());

            let baseline_key = (device_id.clone(), point.family, point.metric_name.clone());
            let baseline = self.baselines.read().unwrap().get(&baseline_key).cloned();

            let breached = match predicate::evaluate(&rule.operator, &point, baseline.as_ref(), now) {
                Ok(result) => result,
                Err(e) => {
                    warn!("⚠️ [ALERT_PREDICATE_FAULT]: rule {} device {}: {}", rule.id, device_id, e);
                    continue;
                }
            };

            if breached {
                self.handle_breach(rule, &device_id, &point, now).await;
            } else {
                self.handle_normal(rule, &device_id);
            }

            self.check_auto_resolution(rule, &device_id, Some(breached), now);
        }

        // Un dispositivo que dejó de reportar no aparece en
        // `latest_per_device` y por lo tanto nunca pasa por el bucle de
        // arriba -- su alerta viva quedaría activa para siempre si el
        // único camino a `check_auto_resolution` fuera ese bucle. La
        // rama de edad no depende de un punto fresco, así que se aplica
        // aquí también, sin tocar la rama de "ya no rompe".
        if rule.auto_resolve {
            let silent_devices: Vec<DeviceId> = {
                let live = self.live_alerts.read().unwrap();
                live.keys()
                    .filter(|(rule_id, device_id)| rule_id == &rule.id && !touched.contains(device_id))
                    .map(|(_, device_id)| device_id.clone())
                    .collect()
            };
            for device_id in silent_devices {
                self.check_auto_resolution(rule, &device_id, None, now);
            }
        }

        Ok(())
    }

    async fn handle_breach(&self, rule: &AlertRule, device_id: &DeviceId, point: &MetricPoint, now: DateTime<Utc>) {
        let key = (rule.id.clone(), device_id.clone());
        let counter = {
            let mut counters = self.breach_counters.lock().unwrap();
            let count = counters.entry(key.clone()).or_insert(0);
            *count += 1;
            *count
        };

        if counter < rule.consecutive_breaches_required {
            return;
        }

        let current_value = point.value.as_numeric().unwrap_or(0.0);
        let threshold_value = threshold_of(rule);

        let already_live = self.live_alerts.read().unwrap().contains_key(&key);

        if !already_live {
            let mut alert = Alert::new(
                uuid_like(rule, device_id, now),
                rule.id.clone(),
                device_id.clone(),
                rule.severity,
                current_value,
                threshold_value,
                now,
            );
            alert.breach_count = counter;
            alert.metadata.insert("rule_name".to_string(), serde_json::Value::String(rule.name.clone()));
            alert.metadata.insert("device_name".to_string(), serde_json::Value::String(point.device_name.clone()));
            alert.metadata.insert("metric_name".to_string(), serde_json::Value::String(point.metric_name.clone()));
            if let Some(template) = &rule.custom_message_template {
                alert.metadata.insert("message".to_string(), serde_json::Value::String(template.clone()));
            }
            alert.metadata.insert("last_notified_at".to_string(), serde_json::Value::String(now.to_rfc3339()));

            if let Some(group) = &rule.correlation_group {
                self.correlation_index.write().unwrap().entry(group.clone()).or_default().push(key.clone());
            }

            let attempts = self.dispatch_notifications(rule, &alert).await;
            alert.notification_history.extend(attempts);

            self.live_alerts.write().unwrap().insert(key, alert.clone());
            self.sync_history(&alert);
            return;
        }

        let mut live = self.live_alerts.write().unwrap();
        let alert = live.get_mut(&key).unwrap();
        alert.breach_count = counter;
        alert.current_value = current_value;

        let last_notified: DateTime<Utc> = alert
            .metadata
            .get("last_notified_at")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or(alert.triggered_at);

        let cooldown = ChronoDuration::minutes(rule.cooldown_minutes);
        let should_renotify = now - last_notified >= cooldown;
        let mut snapshot = alert.clone();
        drop(live);

        if should_renotify {
            let attempts = self.dispatch_notifications(rule, &snapshot).await;
            let mut live = self.live_alerts.write().unwrap();
            if let Some(alert) = live.get_mut(&key) {
                alert.notification_history.extend(attempts);
                alert
                    .metadata
                    .insert("last_notified_at".to_string(), serde_json::Value::String(now.to_rfc3339()));
                snapshot = alert.clone();
            }
        }

        self.sync_history(&snapshot);
    }

    fn handle_normal(&self, rule: &AlertRule, device_id: &DeviceId) {
        let key = (rule.id.clone(), device_id.clone());
        self.breach_counters.lock().unwrap().insert(key, 0);
    }

    /// Resuelve automáticamente una alerta viva cuando su regla ya no
    /// rompe, o cuando su edad supera `auto_resolve_minutes` -- esta
    /// última condición se aplica sin importar si la regla sigue
    /// rompiendo en el mismo instante. `breached` es `None` cuando el
    /// dispositivo no produjo un punto fresco en este ciclo (dejó de
    /// reportar); en ese caso solo se evalúa la edad, nunca la rama de
    /// "ya no rompe", porque no hay evidencia de que haya dejado de
    /// romper.
    fn check_auto_resolution(&self, rule: &AlertRule, device_id: &DeviceId, breached: Option<bool>, now: DateTime<Utc>) {
        if !rule.auto_resolve {
            return;
        }
        let key = (rule.id.clone(), device_id.clone());
        let triggered_at = match self.live_alerts.read().unwrap().get(&key) {
            Some(alert) if alert.is_live() => alert.triggered_at,
            _ => return,
        };

        let age = now - triggered_at;
        let timed_out = age >= ChronoDuration::minutes(rule.auto_resolve_minutes);

        match breached {
            Some(false) => self.resolve_alert(&key, "non_breaching", now),
            Some(true) if timed_out => self.resolve_alert(&key, "auto_resolve_timeout", now),
            None if timed_out => self.resolve_alert(&key, "auto_resolve_timeout", now),
            _ => {}
        }
    }

    fn resolve_alert(&self, key: &RuleDeviceKey, reason: &str, now: DateTime<Utc>) {
        let resolved = {
            let mut live = self.live_alerts.write().unwrap();
            live.remove(key)
        };
        let Some(mut alert) = resolved else {
            return;
        };
        alert.resolve(reason, now);
        self.sync_history(&alert);

        let mut index = self.correlation_index.write().unwrap();
        for group_keys in index.values_mut() {
            group_keys.retain(|candidate| candidate != key);
        }
    }

    /// Despacha una alerta a todos los canales configurados en la
    /// regla, en paralelo -- cada canal aplica su propio límite de
    /// tasa internamente.
    async fn dispatch_notifications(&self, rule: &AlertRule, alert: &Alert) -> Vec<NotificationAttempt> {
        let channels = self.channels.read().unwrap();
        let tasks: Vec<_> = rule
            .notification_channels
            .iter()
            .filter_map(|kind| channels.get(kind).cloned())
            .map(|channel| {
                let alert = alert.clone();
                async move {
                    let attempted_at = Utc::now();
                    let outcome = channel.send(&alert).await;
                    NotificationAttempt {
                        channel: channel.kind(),
                        attempted_at,
                        success: outcome.success,
                        error: outcome.error,
                    }
                }
            })
            .collect();
        drop(channels);

        join_all(tasks).await
    }

    /// Bucle de baselines: recomputa cada hora el perfil estadístico
    /// de cada (device, family, metric_name) visto en los últimos 7
    /// días, y reemplaza el mapa entero de una sola vez -- ningún
    /// lector observa jamás un baseline a medio construir.
    pub async fn run_baseline_loop(self: Arc<Self>, tick: StdDuration) {
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            self.update_baselines(Utc::now()).await;
        }
    }

    #[instrument(skip(self))]
    pub async fn update_baselines(&self, now: DateTime<Utc>) {
        let since = now - ChronoDuration::days(BASELINE_WINDOW_DAYS);
        let filter = QueryFilter {
            since: Some(since),
            until: Some(now),
            order_by: Some(OrderField::Timestamp),
            order_dir: Some(OrderDirection::Ascending),
            ..QueryFilter::new()
        };

        let points = self.store.query(&filter).await;
        let mut grouped: HashMap<(DeviceId, MetricFamily, String), Vec<MetricPoint>> = HashMap::new();
        for point in points {
            let key = (point.device_id.clone(), point.family, point.metric_name.clone());
            grouped.entry(key).or_default().push(point);
        }

        let mut fresh = HashMap::new();
        for (key, series) in grouped {
            if let Some(baseline) = compute_baseline(&series, now) {
                fresh.insert(key, baseline);
            }
        }

        let computed_count = fresh.len();
        *self.baselines.write().unwrap() = fresh;
        info!("📈 [BASELINE_REFRESH]: {} series recomputed", computed_count);
    }
}

fn threshold_of(rule: &AlertRule) -> Option<f64> {
    match &rule.operator {
        netarchon_models::RuleOperator::GreaterThan(v)
        | netarchon_models::RuleOperator::LessThan(v)
        | netarchon_models::RuleOperator::Equals(v)
        | netarchon_models::RuleOperator::NotEquals(v) => Some(*v),
        netarchon_models::RuleOperator::AnomalyDetection { sensitivity } => Some(*sensitivity),
        netarchon_models::RuleOperator::Contains(_) | netarchon_models::RuleOperator::RegexMatch(_) => None,
    }
}

/// Identificador estable y legible para una alerta nueva. No se usa
/// `uuid` para evitar una dependencia adicional cuando la tupla
/// (rule, device, instante de disparo) ya es única por construcción.
fn uuid_like(rule: &AlertRule, device_id: &DeviceId, now: DateTime<Utc>) -> String {
    format!("{}::{}::{}", rule.id, device_id.as_str(), now.timestamp_nanos_opt().unwrap_or_default())
}

fn latest_point_per_device(points: Vec<MetricPoint>) -> HashMap<DeviceId, MetricPoint> {
    let mut latest: HashMap<DeviceId, MetricPoint> = HashMap::new();
    for point in points {
        match latest.get(&point.device_id) {
            Some(existing) if existing.timestamp >= point.timestamp => {}
            _ => {
                latest.insert(point.device_id.clone(), point);
            }
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;
    use netarchon_models::{AlertSeverity, DeviceKind, MetricUnit, MetricValue, RuleOperator};
    use netarchon_storage::StorageOpenOptions;

    async fn memory_store() -> MetricsStore {
        MetricsStore::open(StorageOpenOptions {
            database_path: ":memory:".to_string(),
            enable_encryption: false,
            ..Default::default()
        })
        .await
        .unwrap()
    }

    fn cpu_rule(consecutive: u32) -> AlertRule {
        AlertRule {
            id: "cpu-high".to_string(),
            name: "High CPU".to_string(),
            description: String::new(),
            device_filter: None,
            family_filter: Some(vec![MetricFamily::SystemResources]),
            metric_name_filter: Some(vec!["cpu_usage".to_string()]),
            operator: RuleOperator::GreaterThan(85.0),
            severity: AlertSeverity::Warning,
            enabled: true,
            evaluation_window: std::time::Duration::from_secs(300),
            consecutive_breaches_required: consecutive,
            cooldown_minutes: 30,
            auto_resolve: true,
            auto_resolve_minutes: 10,
            correlation_group: None,
            notification_channels: vec![],
            custom_message_template: None,
        }
    }

    async fn push_point(store: &MetricsStore, value: f64, at: DateTime<Utc>) {
        let point = MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::LinuxServer,
            MetricFamily::SystemResources,
            "cpu_usage",
            MetricValue::Float(value),
            MetricUnit::Percentage,
            at,
        )
        .unwrap();
        store.store(vec![point]).await.unwrap();
    }

    #[tokio::test]
    async fn consecutive_breaches_create_exactly_one_alert() {
        let store = memory_store().await;
        let engine = AlertEngine::new(store.clone());
        let rule = cpu_rule(2);
        engine.add_rule(rule.clone());

        let t0 = Utc::now() - ChronoDuration::minutes(2);
        push_point(&store, 80.0, t0).await;
        engine.evaluate_rule(&rule, t0 + ChronoDuration::seconds(1)).await.unwrap();
        assert!(engine.get_active_alerts().is_empty());

        let t1 = t0 + ChronoDuration::seconds(30);
        push_point(&store, 90.0, t1).await;
        engine.evaluate_rule(&rule, t1 + ChronoDuration::seconds(1)).await.unwrap();
        assert!(engine.get_active_alerts().is_empty());

        let t2 = t1 + ChronoDuration::seconds(30);
        push_point(&store, 90.0, t2).await;
        engine.evaluate_rule(&rule, t2 + ChronoDuration::seconds(1)).await.unwrap();
        assert_eq!(engine.get_active_alerts().len(), 1);
    }

    #[tokio::test]
    async fn auto_resolves_once_a_non_breaching_point_arrives() {
        let store = memory_store().await;
        let engine = AlertEngine::new(store.clone());
        let rule = cpu_rule(1);
        engine.add_rule(rule.clone());

        let t0 = Utc::now() - ChronoDuration::minutes(5);
        push_point(&store, 90.0, t0).await;
        engine.evaluate_rule(&rule, t0 + ChronoDuration::seconds(1)).await.unwrap();
        assert_eq!(engine.get_active_alerts().len(), 1);

        let t1 = t0 + ChronoDuration::minutes(1);
        push_point(&store, 50.0, t1).await;
        engine.evaluate_rule(&rule, t1 + ChronoDuration::seconds(1)).await.unwrap();
        assert!(engine.get_active_alerts().is_empty());
        assert_eq!(engine.get_history().len(), 1);
        assert_eq!(engine.get_history()[0].status, netarchon_models::AlertStatus::Resolved);
    }

    #[tokio::test]
    async fn auto_resolves_a_silent_device_once_its_age_exceeds_auto_resolve_minutes() {
        let store = memory_store().await;
        let engine = AlertEngine::new(store.clone());
        let rule = cpu_rule(1);
        engine.add_rule(rule.clone());

        let t0 = Utc::now() - ChronoDuration::minutes(20);
        push_point(&store, 90.0, t0).await;
        engine.evaluate_rule(&rule, t0 + ChronoDuration::seconds(1)).await.unwrap();
        assert_eq!(engine.get_active_alerts().len(), 1);

        // The device goes silent from here on -- no further points are
        // stored, so the next evaluation never sees it in
        // `latest_per_device`. Eleven minutes later the alert's age
        // alone must resolve it.
        let t1 = t0 + ChronoDuration::minutes(11);
        engine.evaluate_rule(&rule, t1).await.unwrap();

        assert!(engine.get_active_alerts().is_empty());
        assert_eq!(engine.get_history().len(), 1);
        assert_eq!(engine.get_history()[0].status, netarchon_models::AlertStatus::Resolved);
        assert_eq!(
            engine.get_history()[0]
                .metadata
                .get("resolution_reason")
                .and_then(|v| v.as_str()),
            Some("auto_resolve_timeout")
        );
    }

    #[tokio::test]
    async fn acknowledge_unknown_alert_errors() {
        let store = memory_store().await;
        let engine = AlertEngine::new(store);
        let result = engine.acknowledge("missing", "operator", Utc::now());
        assert!(matches!(result, Err(AlertingError::UnknownAlert(_))));
    }
}
