// [libs/core/stats-engine/src/descriptive.rs]
/*!
 * =================================================================
 * APARATO: DESCRIPTIVE SUMMARY CALCULATOR (V1.0)
 * RESPONSABILIDAD: MEDIA, DESVIACIÓN MUESTRAL, MIN/MAX Y PERCENTILES
 *
 * # Mathematical Proof (Sample Standard Deviation):
 * Se usa el divisor N-1 (desviación muestral, no poblacional) para que
 * el baseline generalice correctamente a partir de una muestra finita
 * de los últimos 7 días, igual que `statistics.stdev` en la
 * implementación original de referencia.
 * =================================================================
 */

use crate::percentile::percentile;
use tracing::instrument;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DescriptiveSummary {
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
    pub count: usize,
}

impl DescriptiveSummary {
    /// Calcula el resumen completo de una serie de valores numéricos.
    /// Devuelve `None` si la serie está vacía; una serie de un solo
    /// elemento produce stddev=0 por convención (sin muestra suficiente
    /// para estimar dispersión).
    #[instrument(skip(values), fields(count = values.len()))]
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let sum: f64 = values.iter().sum();
        let mean = sum / count as f64;

        let stddev = if count > 1 {
            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        Some(Self {
            mean,
            stddev,
            min: sorted[0],
            max: sorted[count - 1],
            p95: percentile(&sorted, 95.0),
            p99: percentile(&sorted, 99.0),
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_has_no_summary() {
        assert!(DescriptiveSummary::compute(&[]).is_none());
    }

    #[test]
    fn single_value_series_has_zero_stddev() {
        let summary = DescriptiveSummary::compute(&[42.0]).unwrap();
        assert_eq!(summary.stddev, 0.0);
        assert_eq!(summary.mean, 42.0);
    }

    #[test]
    fn five_point_rollup_series_matches_scenario_two() {
        // Scenario 2 of the testable properties: 10, 20, 30, 40, 50.
        let summary = DescriptiveSummary::compute(&[10.0, 20.0, 30.0, 40.0, 50.0]).unwrap();
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 50.0);
        assert_eq!(summary.mean, 30.0);
        assert_eq!(summary.count, 5);
    }

    #[test]
    fn sample_stddev_matches_reference_within_tolerance() {
        // Reference: population {2,4,4,4,5,5,7,9}, sample stddev = 2.13809...
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let summary = DescriptiveSummary::compute(&values).unwrap();
        assert!((summary.stddev - 2.138_089_935).abs() < 1e-6);
    }

    proptest::proptest! {
        #[test]
        fn mean_is_always_between_min_and_max(values in proptest::collection::vec(-1000.0f64..1000.0, 2..50)) {
            let summary = DescriptiveSummary::compute(&values).unwrap();
            proptest::prop_assert!(summary.mean >= summary.min - 1e-9);
            proptest::prop_assert!(summary.mean <= summary.max + 1e-9);
        }
    }
}
