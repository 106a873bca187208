// [libs/shared/telemetry-support/src/logging.rs]
//! =================================================================
//! APARATO: STRUCTURED LOGGING BOOTSTRAP
//! RESPONSABILIDAD: INICIALIZACIÓN DEL SUSCRIPTOR GLOBAL DE TRAZAS
//! =================================================================

use std::panic;

use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Instala el suscriptor global de `tracing` y un hook de pánico que
/// registra el hilo caído antes de que el proceso termine. Modo
/// compacto con colores en desarrollo, JSON plano en producción --
/// distinguido por `debug_assertions`, igual que el resto del pack.
///
/// # Panics
/// Entra en pánico si ya existe un suscriptor global instalado.
pub fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if cfg!(debug_assertions) { "debug" } else { "info" };
        format!("{service_name}={level},tower_http=warn,hyper=warn,libsql=error").into()
    });

    if cfg!(debug_assertions) {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().flatten_event(true))
            .init();
    }

    let service = service_name.to_string();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<no message>");
        error!(target: "panic", service = %service, location = %location, "💥 [PANIC]: {}", payload);
    }));
}
