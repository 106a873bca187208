// [libs/domain/alerting/src/baseline.rs]
//! =================================================================
//! APARATO: BASELINE BUILDER
//! RESPONSABILIDAD: SÍNTESIS DE UN PERFIL ESTADÍSTICO A PARTIR DE PUNTOS CRUDOS
//!
//! Los arreglos de franja horaria/día de semana del `Baseline` canónico
//! no tienen marcador de "franja nunca vista" -- a diferencia del diccionario
//! disperso del perfilador original. Convención adoptada: cada slot arranca
//! en la media global de toda la serie y sólo se sobrescribe cuando esa
//! franja concreta reúne el mínimo de muestras exigido. Esto preserva el
//! struct `Baseline` tal cual ya existe, sin volverlo `Option`-envuelto.
//! =================================================================

use chrono::{DateTime, Datelike, Timelike, Utc};
use netarchon_models::{Baseline, MetricPoint};

const MIN_TOTAL_POINTS: usize = 10;
const MIN_NUMERIC_VALUES: usize = 5;
const MIN_SAMPLES_PER_HOUR: usize = 3;
const MIN_SAMPLES_PER_WEEKDAY: usize = 5;

/// Construye un baseline a partir de la ventana de puntos crudos
/// provista. `None` si la serie no alcanza el mínimo de muestras
/// (10 puntos totales, 5 de ellos numéricos) para ser confiable.
pub fn compute_baseline(points: &[MetricPoint], now: DateTime<Utc>) -> Option<Baseline> {
    if points.len() < MIN_TOTAL_POINTS {
        return None;
    }

    let numeric_values: Vec<f64> = points.iter().filter_map(|p| p.value.as_numeric()).collect();
    if numeric_values.len() < MIN_NUMERIC_VALUES {
        return None;
    }

    let summary = netarchon_stats::DescriptiveSummary::compute(&numeric_values)?;

    let mut hourly_buckets: Vec<Vec<f64>> = vec![Vec::new(); 24];
    let mut daily_buckets: Vec<Vec<f64>> = vec![Vec::new(); 7];

    for point in points {
        if let Some(value) = point.value.as_numeric() {
            let hour = point.timestamp.hour() as usize;
            let weekday = point.timestamp.weekday().num_days_from_sunday() as usize;
            hourly_buckets[hour].push(value);
            daily_buckets[weekday].push(value);
        }
    }

    let mut hourly_profile = [summary.mean; 24];
    for (hour, bucket) in hourly_buckets.iter().enumerate() {
        if bucket.len() >= MIN_SAMPLES_PER_HOUR {
            hourly_profile[hour] = bucket.iter().sum::<f64>() / bucket.len() as f64;
        }
    }

    let mut daily_profile = [summary.mean; 7];
    for (weekday, bucket) in daily_buckets.iter().enumerate() {
        if bucket.len() >= MIN_SAMPLES_PER_WEEKDAY {
            daily_profile[weekday] = bucket.iter().sum::<f64>() / bucket.len() as f64;
        }
    }

    Some(Baseline {
        mean: summary.mean,
        stddev: summary.stddev,
        min: summary.min,
        max: summary.max,
        p95: summary.p95,
        p99: summary.p99,
        hourly_profile,
        daily_profile,
        sample_count: numeric_values.len() as u64,
        last_updated: now,
        confidence: Baseline::confidence_for(numeric_values.len() as u64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use netarchon_models::{DeviceId, DeviceKind, MetricFamily, MetricUnit, MetricValue};

    fn make_point(value: f64, timestamp: DateTime<Utc>) -> MetricPoint {
        MetricPoint::new(
            DeviceId::from("dev-a"),
            "Device A",
            DeviceKind::LinuxServer,
            MetricFamily::SystemResources,
            "cpu_usage",
            MetricValue::Float(value),
            MetricUnit::Percentage,
            timestamp,
        )
        .unwrap()
    }

    #[test]
    fn fewer_than_ten_points_produces_no_baseline() {
        let now = Utc::now();
        let points: Vec<MetricPoint> = (0..9).map(|i| make_point(10.0 + i as f64, now)).collect();
        assert!(compute_baseline(&points, now).is_none());
    }

    #[test]
    fn ten_points_with_enough_numeric_values_builds_a_baseline() {
        let now = Utc::now();
        let points: Vec<MetricPoint> = (0..10).map(|i| make_point(10.0 + i as f64, now)).collect();
        let baseline = compute_baseline(&points, now).unwrap();
        assert_eq!(baseline.sample_count, 10);
        assert!((baseline.mean - 14.5).abs() < 1e-9);
    }

    #[test]
    fn hourly_slot_without_enough_samples_defaults_to_the_overall_mean() {
        let now = Utc::now();
        let points: Vec<MetricPoint> = (0..10).map(|i| make_point(10.0 + i as f64, now)).collect();
        let baseline = compute_baseline(&points, now).unwrap();
        for hour in 0..24 {
            if hour != now.hour() as usize {
                assert!((baseline.hourly_profile[hour] - baseline.mean).abs() < 1e-9);
            }
        }
    }
}
