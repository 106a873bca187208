// [libs/infra/probe-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PROBE CLIENT (V1.0 - SOBERANO)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: SONDEO DE RED, SHELL REMOTO Y TRANSPORTE HTTP
 *
 * VISION HIPER-HOLÍSTICA:
 * Generaliza el túnel de comunicación del worker original (antes atado
 * a un único orquestador) a tres puertos independientes: reachability
 * (`Prober`), ejecución remota (`ShellExecutor`) y scraping HTTP
 * (`reqwest::Client` inyectado). Ningún coleccionista habla TCP crudo
 * directamente -- todos pasan por estos adaptadores.
 * =================================================================
 */

mod errors;
mod http;
mod prober;
mod shell;

pub use errors::ProbeError;
pub use http::build_http_client;
pub use prober::{Prober, TcpFallbackProber};
pub use shell::{ShellExecutor, ShellOutput, SshShellExecutor};
