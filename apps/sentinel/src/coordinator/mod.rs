// [apps/sentinel/src/coordinator/mod.rs]
/*!
 * =================================================================
 * APARATO: COLLECTION COORDINATOR
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L1)
 * RESPONSABILIDAD: ORQUESTACIÓN DE RONDAS DE RECOLECCIÓN Y BUFFERING
 *
 * Mantiene la flota registrada, decide qué dispositivo está vencido
 * para sondeo, despacha una tarea por dispositivo vencido acotada por
 * un semáforo de concurrencia, acumula los puntos resultantes en un
 * buffer en memoria y los vuelca al motor de persistencia cuando se
 * cruza un disparador de tamaño o de intervalo, lo que ocurra primero.
 * =================================================================
 */

mod registry;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, Utc};
use netarchon_collectors::{collector_for, CollectionContext};
use netarchon_credentials::{CredentialResolver, LookupOutcome};
use netarchon_models::{Device, DeviceId, MetricPoint};
use netarchon_probe::{build_http_client, Prober, ShellExecutor, SshShellExecutor, TcpFallbackProber};
use netarchon_storage::MetricsStore;
use netarchon_support::TelemetryConfig;
use reqwest::Client;
use tokio::sync::{Mutex as AsyncMutex, RwLock, Semaphore};
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use registry::DeviceEntry;

/// Presupuesto de tiempo duro concedido a una sola ronda de
/// recolección de un dispositivo, independiente del `poll_interval`
/// que rige cuándo la siguiente ronda se vuelve elegible.
const COLLECTION_DEADLINE: Duration = Duration::from_secs(30);

pub struct Coordinator {
    devices: RwLock<HashMap<DeviceId, DeviceEntry>>,
    buffer: std::sync::Mutex<VecDeque<MetricPoint>>,
    dropped_points: AtomicU64,
    store: MetricsStore,
    credentials: Arc<CredentialResolver>,
    http_client: Client,
    prober: Arc<dyn Prober>,
    shell: Arc<dyn ShellExecutor>,
    running: AtomicBool,
    config: Arc<TelemetryConfig>,
    active_tasks: AsyncMutex<JoinSet<()>>,
    worker_semaphore: Arc<Semaphore>,
}

impl Coordinator {
    pub fn new(config: Arc<TelemetryConfig>, store: MetricsStore, credentials: Arc<CredentialResolver>) -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
            buffer: std::sync::Mutex::new(VecDeque::new()),
            dropped_points: AtomicU64::new(0),
            http_client: build_http_client(config.http_request_timeout()),
            prober: Arc::new(TcpFallbackProber::new()),
            shell: Arc::new(SshShellExecutor::new()),
            running: AtomicBool::new(true),
            worker_semaphore: Arc::new(Semaphore::new(config.max_workers.max(1))),
            active_tasks: AsyncMutex::new(JoinSet::new()),
            store,
            credentials,
            config,
        }
    }

    pub async fn register_device(&self, device: Device) {
        let mut devices = self.devices.write().await;
        devices.insert(
            device.id.clone(),
            DeviceEntry {
                device,
                last_attempt: None,
            },
        );
    }

    pub async fn remove_device(&self, id: &DeviceId) {
        self.devices.write().await.remove(id);
    }

    pub fn dropped_points(&self) -> u64 {
        self.dropped_points.load(Ordering::Relaxed)
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.lock().expect("buffer lock poisoned").len()
    }

    /// Bucle de fondo que despacha una ronda de `collect_due_devices`
    /// cada `collection_interval`. No espera a que las tareas
    /// despachadas terminen antes del siguiente tick -- cada una corre
    /// de forma independiente, acotada únicamente por el semáforo de
    /// trabajadores.
    pub async fn run_collection_loop(self: Arc<Self>) {
        let mut ticker = interval(self.config.collection_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("📡 [COORDINATOR]: collection loop started");

        while self.running.load(Ordering::Relaxed) {
            ticker.tick().await;
            self.clone().collect_due_devices().await;
        }

        info!("📡 [COORDINATOR]: collection loop stopped");
    }

    /// Examina la flota registrada y despacha una tarea por cada
    /// dispositivo cuyo `last_attempt + poll_interval` ya venció.
    /// `last_attempt` se actualiza aquí mismo, en el momento de
    /// despacho, no al terminar la recolección -- un dispositivo que
    /// cuelga nunca monopoliza su propio turno.
    #[instrument(skip(self))]
    async fn collect_due_devices(self: Arc<Self>) {
        let now = Utc::now();
        let mut due = Vec::new();

        {
            let mut devices = self.devices.write().await;
            for entry in devices.values_mut() {
                let is_due = match entry.last_attempt {
                    None => true,
                    Some(last) => {
                        let interval = ChronoDuration::from_std(entry.device.poll_interval)
                            .unwrap_or(ChronoDuration::zero());
                        now - last >= interval
                    }
                };
                if is_due {
                    entry.last_attempt = Some(now);
                    due.push(entry.device.clone());
                }
            }
        }

        if due.is_empty() {
            return;
        }

        debug!("📡 [COORDINATOR]: {} device(s) due for collection", due.len());

        let mut tasks = self.active_tasks.lock().await;
        for device in due {
            let coordinator = self.clone();
            let permit = self.worker_semaphore.clone();
            tasks.spawn(async move {
                let _permit = match permit.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                coordinator.collect_one(device).await;
            });
        }
    }

    /// Ejecuta una única ronda de recolección para un dispositivo:
    /// resuelve credenciales (si la referencia existe), construye el
    /// contexto de ejecución y corre el collector bajo un deadline
    /// duro. Jamás propaga un error -- toda falla se vuelve un punto
    /// sintético o, en el caso de una credencial permanentemente
    /// ausente, un ciclo saltado sin emitir nada.
    async fn collect_one(self: Arc<Self>, device: Device) {
        let credentials = match &device.credential_ref {
            None => None,
            Some(reference) => match self.credentials.lookup(reference).await {
                Ok(credentials) => Some(credentials),
                Err(LookupOutcome::NotFound(reference)) => {
                    warn!(
                        device_id = %device.id,
                        reference = %reference,
                        "🔒 [COORDINATOR]: credential permanently absent, skipping device this cycle"
                    );
                    return;
                }
                Err(LookupOutcome::Unavailable(detail)) => {
                    warn!(device_id = %device.id, "🔒 [COORDINATOR]: credential backend unavailable: {detail}");
                    let point = MetricPoint::collection_error(
                        device.id.clone(),
                        device.name.clone(),
                        device.kind,
                        netarchon_models::MetricFamily::SystemResources,
                        "CredentialUnavailable",
                        detail,
                        Utc::now(),
                    );
                    if self.push_points(vec![point]) {
                        let flusher = self.clone();
                        tokio::spawn(async move { flusher.flush().await });
                    }
                    return;
                }
            },
        };

        let cancellation = CancellationToken::new();
        let ctx = CollectionContext {
            device: device.clone(),
            credentials,
            http_client: self.http_client.clone(),
            prober: self.prober.clone(),
            shell: self.shell.clone(),
            deadline: Instant::now() + COLLECTION_DEADLINE,
            cancellation: cancellation.clone(),
        };

        let collector = collector_for(device.kind);
        let points = match tokio::time::timeout(COLLECTION_DEADLINE, collector.collect(&ctx)).await {
            Ok(points) => points,
            Err(_) => {
                cancellation.cancel();
                warn!(device_id = %device.id, "⏱️ [COORDINATOR]: collection round timed out");
                vec![MetricPoint::collection_error(
                    device.id.clone(),
                    device.name.clone(),
                    device.kind,
                    netarchon_models::MetricFamily::SystemResources,
                    "Timeout",
                    format!("collection exceeded {COLLECTION_DEADLINE:?}"),
                    Utc::now(),
                )]
            }
        };

        if !points.is_empty() && self.push_points(points) {
            let flusher = self.clone();
            tokio::spawn(async move { flusher.flush().await });
        }
    }

    /// Encola puntos en el buffer de escritura diferida, desalojando
    /// las entradas más viejas si la marca de agua alta se cruza.
    /// Devuelve `true` si el lote ya alcanzó `batch_size`, señal para
    /// que el llamador dispare un volcado inmediato en lugar de
    /// esperar al siguiente tick de `run_flush_loop`. Público porque
    /// también sirve como puerta de ingestión directa para pruebas de
    /// integración y para un futuro productor externo (p. ej. un
    /// receptor push de un agente remoto).
    pub fn push_points(&self, points: Vec<MetricPoint>) -> bool {
        let device_count = {
            let len = self.devices.try_read().map(|d| d.len()).unwrap_or(1);
            len.max(1)
        };
        let high_water_mark = self.config.buffer_high_water_mark_per_device * device_count;

        let mut buffer = self.buffer.lock().expect("buffer lock poisoned");
        for point in points {
            if buffer.len() >= high_water_mark {
                buffer.pop_front();
                self.dropped_points.fetch_add(1, Ordering::Relaxed);
            }
            buffer.push_back(point);
        }
        buffer.len() >= self.config.batch_size
    }

    /// Drena el buffer bajo un cerrojo estrecho y persiste el lote
    /// resultante fuera del cerrojo. Un fallo de persistencia se
    /// registra; los puntos ya drenados se pierden -- el buffer en
    /// memoria no es un log de reintento duradero.
    pub async fn flush(&self) {
        let drained: Vec<MetricPoint> = {
            let mut buffer = self.buffer.lock().expect("buffer lock poisoned");
            if buffer.is_empty() {
                return;
            }
            buffer.drain(..).collect()
        };

        let count = drained.len();
        match self.store.store(drained).await {
            Ok(result) => debug!("💾 [COORDINATOR]: flushed {} point(s), {} stored", count, result.stored),
            Err(e) => error!("❌ [COORDINATOR]: flush failed, {} point(s) lost: {}", count, e),
        }
    }

    /// Bucle de fondo que vuelca el buffer cada `flush_interval`,
    /// independientemente de si `push_points` ya disparó un volcado
    /// inmediato por cruce de `batch_size` -- ambos disparadores
    /// coexisten sin conflicto porque `flush` sobre un buffer vacío
    /// simplemente no hace nada.
    pub async fn run_flush_loop(self: Arc<Self>) {
        let mut ticker = interval(self.config.flush_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("💾 [COORDINATOR]: flush loop started");

        while self.running.load(Ordering::Relaxed) {
            ticker.tick().await;
            self.flush().await;
        }

        info!("💾 [COORDINATOR]: flush loop stopped");
    }

    /// Apagado ordenado de dos fases: (1) deja de aceptar nuevos
    /// despachos desde los bucles de fondo, (2) espera hasta
    /// `shutdown_drain_timeout` a que las tareas ya en vuelo terminen,
    /// abandonando las que no lo hagan, y finalmente intenta un último
    /// volcado del buffer restante.
    pub async fn shutdown(&self) {
        self.running.store(false, Ordering::Relaxed);
        info!("🛑 [COORDINATOR]: shutdown initiated, draining in-flight collections");

        let mut tasks = self.active_tasks.lock().await;
        let drain = async {
            while tasks.join_next().await.is_some() {}
        };

        if tokio::time::timeout(self.config.shutdown_drain_timeout(), drain).await.is_err() {
            warn!("🛑 [COORDINATOR]: drain timeout exceeded, abandoning stragglers");
            tasks.abort_all();
        }
        drop(tasks);

        self.flush().await;
        info!("🛑 [COORDINATOR]: shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netarchon_storage::StorageOpenOptions;

    async fn test_coordinator() -> Coordinator {
        let config = Arc::new(TelemetryConfig::load().unwrap());
        let store = MetricsStore::open(StorageOpenOptions {
            database_path: ":memory:".to_string(),
            enable_encryption: false,
            ..Default::default()
        })
        .await
        .unwrap();
        let credentials = Arc::new(CredentialResolver::new(Arc::new(
            netarchon_credentials::FileSecretStore::new("/nonexistent/secrets.json"),
        )));
        Coordinator::new(config, store, credentials)
    }

    #[tokio::test]
    async fn flush_on_empty_buffer_is_a_no_op() {
        let coordinator = test_coordinator().await;
        coordinator.flush().await;
        assert_eq!(coordinator.buffered_len(), 0);
    }
}
