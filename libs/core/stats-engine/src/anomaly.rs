// [libs/core/stats-engine/src/anomaly.rs]
/*!
 * =================================================================
 * APARATO: ANOMALY Z-SCORE CALCULATOR (V1.0)
 * RESPONSABILIDAD: DETECCIÓN DE DESVIACIÓN RESPECTO A UN BASELINE
 *
 * # Mathematical Proof (Maximum Wins):
 * El modelo combina tres señales de desviación -- global, por hora del
 * día, por día de la semana -- y toma el máximo. El perfil temporal
 * original no especifica una mezcla ponderada; esta implementación
 * congela "el máximo gana" como la semántica soberana (ver DESIGN.md).
 * El z-score global usa el denominador `stddev` sin relleno; los dos
 * perfiles temporales usan `stddev + 0.001` para evitar división por
 * cero cuando el perfil nunca vio esa hora/día todavía.
 * =================================================================
 */

/// Calcula el z-score máximo entre la señal global y los dos perfiles
/// temporales. `stddev == 0` hace que la señal global sea siempre 0
/// (nunca hay anomalía por esa vía), por convención explícita del §8.
pub fn anomaly_z_score(
    value: f64,
    mean: f64,
    stddev: f64,
    hourly_expected: Option<f64>,
    daily_expected: Option<f64>,
) -> f64 {
    let global_z = if stddev == 0.0 {
        0.0
    } else {
        (value - mean).abs() / stddev
    };

    let mut z = global_z;

    if let Some(expected_hourly) = hourly_expected {
        let hourly_z = (value - expected_hourly).abs() / (stddev + 0.001);
        z = z.max(hourly_z);
    }

    if let Some(expected_daily) = daily_expected {
        let daily_z = (value - expected_daily).abs() / (stddev + 0.001);
        z = z.max(daily_z);
    }

    z
}

/// Breach iff z > sensitivity (default histórico: 2.0 desviaciones).
pub fn is_anomalous(z_score: f64, sensitivity: f64) -> bool {
    z_score > sensitivity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stddev_never_trips_the_global_signal() {
        let z = anomaly_z_score(1000.0, 30.0, 0.0, None, None);
        assert_eq!(z, 0.0);
        assert!(!is_anomalous(z, 2.0));
    }

    #[test]
    fn scenario_six_z_equals_three_trips_default_sensitivity() {
        // Baseline mean=30, stddev=5; value=45 => z=3 > 2.0.
        let z = anomaly_z_score(45.0, 30.0, 5.0, None, None);
        assert!((z - 3.0).abs() < 1e-9);
        assert!(is_anomalous(z, 2.0));
    }

    #[test]
    fn scenario_six_z_equals_one_does_not_trip() {
        let z = anomaly_z_score(35.0, 30.0, 5.0, None, None);
        assert!((z - 1.0).abs() < 1e-9);
        assert!(!is_anomalous(z, 2.0));
    }

    #[test]
    fn temporal_profile_can_win_over_global_signal() {
        // Global z is small, but the hourly profile is far from the value.
        let z = anomaly_z_score(50.0, 48.0, 10.0, Some(5.0), None);
        let global = (50.0f64 - 48.0).abs() / 10.0;
        let hourly = (50.0f64 - 5.0).abs() / (10.0 + 0.001);
        assert!(hourly > global);
        assert!((z - hourly).abs() < 1e-6);
    }
}
