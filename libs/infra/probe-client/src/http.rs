// [libs/infra/probe-client/src/http.rs]
//! =================================================================
//! APARATO: HTTP CLIENT FACTORY
//! RESPONSABILIDAD: CLIENTE REQWEST COMPARTIDO PARA SCRAPERS HTTP
//! =================================================================

use std::time::Duration;

use reqwest::Client;

/// Construye el cliente HTTP compartido por los coleccionistas basados
/// en scraping (cable modem, gateway, mesh). Un único cliente se
/// reutiliza entre invocaciones para beneficiarse del pool de
/// conexiones de `reqwest`.
pub fn build_http_client(request_timeout: Duration) -> Client {
    Client::builder()
        .user_agent("NetArchon-Sentinel/1.0")
        .timeout(request_timeout)
        .build()
        .expect("FATAL: probe HTTP client initialization failed")
}
