// [libs/domain/collectors/src/errors.rs]
//! =================================================================
//! APARATO: COLLECTOR ERROR TAXONOMY
//! RESPONSABILIDAD: CLASIFICACIÓN DE FALLOS INTERNOS DE RECOLECCIÓN
//!
//! Generaliza la taxonomía `ClientError` del worker original: cada
//! variante se reduce a un único token de `metadata["error_kind"]`
//! sobre el punto `collection_error` sintético que produce, nunca a
//! una propagación de `Err` fuera del `Collector`.
//! =================================================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("[L2_COLLECT_TIMEOUT]: probe exceeded its allotted deadline")]
    Timeout,

    #[error("[L2_COLLECT_AUTH_FAULT]: credential unavailable or rejected: {0}")]
    AuthUnavailable(String),

    #[error("[L2_COLLECT_PARSE_FAULT]: failed to extract field: {0}")]
    ParseFailure(String),

    #[error("[L2_COLLECT_UNREACHABLE]: device did not respond")]
    Unreachable,

    #[error("[L2_COLLECT_OTHER]: {0}")]
    Other(String),
}

impl CollectorError {
    /// Token estable persistido en `metadata["error_kind"]` de un punto
    /// `collection_error` sintético.
    pub fn classify(&self) -> &'static str {
        match self {
            CollectorError::Timeout => "Timeout",
            CollectorError::AuthUnavailable(_) => "AuthUnavailable",
            CollectorError::ParseFailure(_) => "ParseFailure",
            CollectorError::Unreachable => "Unreachable",
            CollectorError::Other(_) => "Other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_classifies_to_a_stable_token() {
        assert_eq!(CollectorError::Timeout.classify(), "Timeout");
        assert_eq!(
            CollectorError::AuthUnavailable("x".into()).classify(),
            "AuthUnavailable"
        );
        assert_eq!(
            CollectorError::ParseFailure("x".into()).classify(),
            "ParseFailure"
        );
        assert_eq!(CollectorError::Unreachable.classify(), "Unreachable");
        assert_eq!(CollectorError::Other("x".into()).classify(), "Other");
    }
}
