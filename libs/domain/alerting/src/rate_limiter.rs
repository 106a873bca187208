// [libs/domain/alerting/src/rate_limiter.rs]
//! =================================================================
//! APARATO: NOTIFICATION RATE LIMITER
//! RESPONSABILIDAD: VENTANA DESLIZANTE DE AVISOS POR (REGLA, DISPOSITIVO)
//!
//! El chequeo y el registro son dos pasos deliberadamente separados:
//! `allows()` poda la ventana y decide sin contar el intento, `record()`
//! se invoca siempre después de un intento de envío -- exitoso o no --
//! mientras el chequeo original haya pasado. Fusionar ambos pasos en un
//! solo `try_acquire()` perdería ese matiz: el original cuenta cada
//! intento realizado, no cada entrega exitosa.
//! =================================================================

use chrono::{DateTime, Duration, Utc};
use netarchon_models::DeviceId;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_per_window: u32,
    history: Mutex<HashMap<(String, DeviceId), Vec<DateTime<Utc>>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_per_window: u32) -> Self {
        Self {
            window,
            max_per_window,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Poda la ventana y responde si un nuevo intento está permitido,
    /// sin registrar nada todavía.
    pub fn allows(&self, rule_id: &str, device_id: &DeviceId, now: DateTime<Utc>) -> bool {
        let mut history = self.history.lock().unwrap();
        let key = (rule_id.to_string(), device_id.clone());
        let cutoff = now - self.window;
        let entries = history.entry(key).or_default();
        entries.retain(|ts| *ts > cutoff);
        (entries.len() as u32) < self.max_per_window
    }

    /// Registra un intento realizado. Se llama siempre tras un envío,
    /// independientemente de si `NotificationOutcome::success` fue true.
    pub fn record(&self, rule_id: &str, device_id: &DeviceId, now: DateTime<Utc>) {
        let mut history = self.history.lock().unwrap();
        let key = (rule_id.to_string(), device_id.clone());
        history.entry(key).or_default().push(now);
    }
}
