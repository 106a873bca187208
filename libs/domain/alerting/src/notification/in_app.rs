// [libs/domain/alerting/src/notification/in_app.rs]
//! =================================================================
//! APARATO: IN-APP STREAM NOTIFICATION CHANNEL
//! RESPONSABILIDAD: BUFFER ANULAR EN MEMORIA PARA EL PANEL DE OBSERVABILIDAD
//! =================================================================

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use netarchon_models::{Alert, NotificationChannelKind};
use tokio::sync::broadcast;

use crate::rate_limiter::RateLimiter;

use super::NotificationChannel;

const RING_BUFFER_CAPACITY: usize = 200;

/// Canal interno sin transporte de red: mantiene las últimas N alertas
/// para que el panel las recupere por polling, y además las retransmite
/// por un canal `broadcast` para cualquier suscriptor en vivo (websocket,
/// SSE). A diferencia de los otros tres canales esto nunca falla por red
/// -- pero el límite de tasa se aplica igual, sin excepción, por fidelidad
/// al manejador base del notificador original.
pub struct InAppStreamChannel {
    ring: Mutex<VecDeque<Alert>>,
    sender: broadcast::Sender<Alert>,
    rate_limiter: RateLimiter,
}

impl InAppStreamChannel {
    pub fn new(rate_limit_window: Duration, max_per_window: u32) -> Self {
        let (sender, _receiver) = broadcast::channel(RING_BUFFER_CAPACITY);
        Self {
            ring: Mutex::new(VecDeque::with_capacity(RING_BUFFER_CAPACITY)),
            sender,
            rate_limiter: RateLimiter::new(rate_limit_window, max_per_window),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Alert> {
        self.sender.subscribe()
    }

    pub fn recent(&self, limit: usize) -> Vec<Alert> {
        let ring = self.ring.lock().unwrap();
        ring.iter().rev().take(limit).cloned().collect()
    }
}

#[async_trait]
impl NotificationChannel for InAppStreamChannel {
    fn kind(&self) -> NotificationChannelKind {
        NotificationChannelKind::InAppStream
    }

    async fn send(&self, alert: &Alert) -> super::NotificationOutcome {
        let now = Utc::now();
        if !self.rate_limiter.allows(&alert.rule_id, &alert.device_id, now) {
            return super::NotificationOutcome::failed("suppressed by rate limiter");
        }

        {
            let mut ring = self.ring.lock().unwrap();
            if ring.len() == RING_BUFFER_CAPACITY {
                ring.pop_front();
            }
            ring.push_back(alert.clone());
        }
        let _ = self.sender.send(alert.clone());
        self.rate_limiter.record(&alert.rule_id, &alert.device_id, now);
        super::NotificationOutcome::ok()
    }
}
