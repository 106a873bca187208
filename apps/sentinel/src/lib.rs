// [apps/sentinel/src/lib.rs]
/*!
 * =================================================================
 * APARATO: SENTINEL DAEMON LIBRARY
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L1)
 * RESPONSABILIDAD: COMPOSICIÓN DEL COORDINADOR, ALERTAMIENTO Y ESTADO
 *
 * El binario (`main.rs`) es un switchboard delgado sobre esta
 * biblioteca -- toda la lógica de composición vive aquí para que las
 * pruebas de integración bajo `tests/mirror/apps/sentinel/` puedan
 * ejercerla sin levantar el proceso completo.
 * =================================================================
 */

pub mod alert_engine;
pub mod coordinator;
pub mod devices;
pub mod state;

pub use coordinator::Coordinator;
pub use state::AppState;
