// [libs/infra/probe-client/src/errors.rs]
//! =================================================================
//! APARATO: PROBE CLIENT ERRORS
//! RESPONSABILIDAD: CATALOGACIÓN DE FALLOS DE SONDEO Y TRANSPORTE
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("[L3_PROBE_NETWORK_FAULT]: {0}")]
    NetworkFault(#[from] reqwest::Error),

    #[error("[L3_PROBE_IO_FAULT]: {0}")]
    IoFault(#[from] std::io::Error),

    #[error("[L3_PROBE_TIMEOUT]: operation exceeded its deadline")]
    Timeout,

    #[error("[L3_PROBE_AUTH_FAULT]: credential rejected by remote host")]
    AuthRejected,

    #[error("[L3_PROBE_PARSE_FAULT]: {0}")]
    ParseFault(String),

    #[error("[L3_PROBE_UNREACHABLE]: host did not respond")]
    Unreachable,
}
