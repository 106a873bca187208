// [libs/core/stats-engine/src/percentile.rs]
/*!
 * =================================================================
 * APARATO: PERCENTILE CALCULATOR (V1.0)
 * RESPONSABILIDAD: INTERPOLACIÓN LINEAL SOBRE SERIES ORDENADAS
 * =================================================================
 */

/// Percentil por interpolación lineal (método "R-7" / numpy default)
/// sobre un slice ya ordenado ascendentemente. `p` en [0, 100].
///
/// # Performance:
/// O(1) una vez ordenado el slice; el ordenamiento es responsabilidad
/// del llamador para evitar ordenar repetidamente en bucles de percentiles
/// múltiples (p95 y p99 sobre la misma serie).
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    if sorted_values.len() == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (sorted_values.len() - 1) as f64;
    let lower_index = rank.floor() as usize;
    let upper_index = rank.ceil() as usize;

    if lower_index == upper_index {
        return sorted_values[lower_index];
    }

    let fraction = rank - lower_index as f64;
    sorted_values[lower_index] + fraction * (sorted_values[upper_index] - sorted_values[lower_index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_of_empty_slice_is_zero() {
        assert_eq!(percentile(&[], 95.0), 0.0);
    }

    #[test]
    fn percentile_of_single_value_is_itself() {
        assert_eq!(percentile(&[42.0], 99.0), 42.0);
    }

    #[test]
    fn p50_of_five_linear_values_is_the_middle() {
        let values = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(percentile(&values, 50.0), 30.0);
    }

    #[test]
    fn p95_and_p99_interpolate_toward_the_max() {
        let values = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let p95 = percentile(&values, 95.0);
        let p99 = percentile(&values, 99.0);
        assert!(p95 > 40.0 && p95 < 50.0);
        assert!(p99 > p95 && p99 <= 50.0);
    }
}
