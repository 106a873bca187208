// [libs/domain/alerting/src/predicate.rs]
//! =================================================================
//! APARATO: RULE PREDICATE EVALUATOR
//! RESPONSABILIDAD: PROYECCIÓN NUMÉRICA Y DESPACHO DE OPERADORES DE REGLA
//! =================================================================

use chrono::{DateTime, Datelike, Timelike, Utc};
use netarchon_models::{Baseline, MetricPoint, MetricValue, RuleOperator};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::AlertingError;

/// Proyección de un `MetricValue` ajeno a `f64`. La coherencia de Rust
/// impide escribir `TryFrom<&MetricValue> for f64` dentro de esta crate
/// (ni el tipo ni el trait son locales a la vez); este trait local
/// logra el mismo contrato delegando en `MetricValue::as_numeric()`.
pub trait NumericCoercion {
    fn coerce_numeric(&self) -> Result<f64, AlertingError>;
}

impl NumericCoercion for MetricValue {
    fn coerce_numeric(&self) -> Result<f64, AlertingError> {
        self.as_numeric()
            .ok_or_else(|| AlertingError::NotNumeric(self.as_display_string()))
    }
}

static PATTERN_CACHE: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn compiled_pattern(pattern: &str) -> Result<Regex, AlertingError> {
    let mut cache = PATTERN_CACHE.lock().unwrap();
    if let Some(existing) = cache.get(pattern) {
        return Ok(existing.clone());
    }
    let compiled = Regex::new(pattern)?;
    cache.insert(pattern.to_string(), compiled.clone());
    Ok(compiled)
}

/// Perfil temporal esperado para el instante `now`, tomado de los
/// arreglos de franja horaria/día de semana del baseline.
fn temporal_expectations(baseline: &Baseline, now: DateTime<Utc>) -> (f64, f64) {
    let hour = now.hour() as usize;
    let weekday = now.weekday().num_days_from_sunday() as usize;
    (baseline.hourly_profile[hour], baseline.daily_profile[weekday])
}

/// Evalúa el operador de una regla contra el punto crudo más reciente.
/// `baseline` es `None` cuando aún no existe suficiente historia --
/// `AnomalyDetection` nunca dispara sobre un dispositivo sin baseline.
pub fn evaluate(
    operator: &RuleOperator,
    point: &MetricPoint,
    baseline: Option<&Baseline>,
    now: DateTime<Utc>,
) -> Result<bool, AlertingError> {
    match operator {
        RuleOperator::GreaterThan(threshold) => Ok(point.value.coerce_numeric()? > *threshold),
        RuleOperator::LessThan(threshold) => Ok(point.value.coerce_numeric()? < *threshold),
        RuleOperator::Equals(expected) => Ok((point.value.coerce_numeric()? - *expected).abs() < f64::EPSILON),
        RuleOperator::NotEquals(expected) => Ok((point.value.coerce_numeric()? - *expected).abs() >= f64::EPSILON),
        RuleOperator::Contains(needle) => Ok(point.value.as_display_string().contains(needle.as_str())),
        RuleOperator::RegexMatch(pattern) => {
            let compiled = compiled_pattern(pattern)?;
            Ok(compiled.is_match(&point.value.as_display_string()))
        }
        RuleOperator::AnomalyDetection { sensitivity } => {
            let Some(baseline) = baseline else {
                return Ok(false);
            };
            let value = point.value.coerce_numeric()?;
            let (hourly_expected, daily_expected) = temporal_expectations(baseline, now);
            let z = netarchon_stats::anomaly_z_score(
                value,
                baseline.mean,
                baseline.stddev,
                Some(hourly_expected),
                Some(daily_expected),
            );
            Ok(netarchon_stats::is_anomalous(z, *sensitivity))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netarchon_models::{DeviceId, DeviceKind, MetricFamily, MetricUnit};

    fn point(value: MetricValue) -> MetricPoint {
        MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::LinuxServer,
            MetricFamily::SystemResources,
            "cpu_usage",
            value,
            MetricUnit::Percentage,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn greater_than_trips_above_threshold() {
        let p = point(MetricValue::Float(92.0));
        assert!(evaluate(&RuleOperator::GreaterThan(85.0), &p, None, Utc::now()).unwrap());
    }

    #[test]
    fn string_operator_rejects_non_numeric_coercion_for_comparisons() {
        let p = point(MetricValue::Float(92.0));
        let matched = evaluate(&RuleOperator::Contains("9".to_string()), &p, None, Utc::now()).unwrap();
        assert!(matched);
    }

    #[test]
    fn anomaly_detection_without_baseline_never_trips() {
        let p = point(MetricValue::Float(92.0));
        assert!(!evaluate(&RuleOperator::AnomalyDetection { sensitivity: 2.0 }, &p, None, Utc::now()).unwrap());
    }

    #[test]
    fn not_numeric_value_rejects_numeric_operators() {
        let p = point(MetricValue::Str("oops".to_string()));
        let result = evaluate(&RuleOperator::GreaterThan(1.0), &p, None, Utc::now());
        assert!(matches!(result, Err(AlertingError::NotNumeric(_))));
    }
}
