// [libs/domain/netmon-models/src/errors.rs]
//! =================================================================
//! APARATO: MODEL VALIDATION ERRORS (V1.0)
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE CONSTRUCCIÓN DE ENTIDADES
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("[L2_MODEL_FAULT]: DEVICE_ID_EMPTY -> a device id cannot be the empty string")]
    EmptyDeviceId,

    #[error("[L2_MODEL_FAULT]: METRIC_NAME_EMPTY -> a metric name cannot be the empty string")]
    EmptyMetricName,

    #[error("[L2_MODEL_FAULT]: PERCENTAGE_OUT_OF_RANGE -> value {0} is not within [0, 100]")]
    PercentageOutOfRange(f64),
}
