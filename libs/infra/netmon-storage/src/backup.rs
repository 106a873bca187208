// [libs/infra/netmon-storage/src/backup.rs]
/*!
 * =================================================================
 * APARATO: SNAPSHOT BACKUP DAEMON (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE BACKGROUND TASK (ESTRATO L3)
 * RESPONSABILIDAD: RESPALDO PERIÓDICO DEL FICHERO DE BASE DE DATOS
 * =================================================================
 */

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{error, info, instrument};

use crate::errors::StorageError;

/// Copia el fichero de base de datos a una instantánea con marca de
/// tiempo, opcionalmente comprimida con gzip. Mejor esfuerzo: el
/// llamador decide si un fallo detiene el proceso o solo se registra.
#[instrument(skip(database_path, data_dir))]
pub fn snapshot(database_path: &Path, data_dir: &Path, gzip: bool) -> Result<PathBuf, StorageError> {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let file_name = if gzip {
        format!("metrics_backup_{stamp}.db.gz")
    } else {
        format!("metrics_backup_{stamp}.db")
    };
    let destination = data_dir.join(file_name);

    if gzip {
        let source = File::open(database_path).map_err(StorageError::IoFault)?;
        let mut reader = BufReader::new(source);
        let target = File::create(&destination).map_err(StorageError::IoFault)?;
        let mut encoder = GzEncoder::new(BufWriter::new(target), Compression::default());
        std::io::copy(&mut reader, &mut encoder).map_err(StorageError::IoFault)?;
        encoder.finish().map_err(StorageError::IoFault)?;
    } else {
        std::fs::copy(database_path, &destination).map_err(StorageError::IoFault)?;
    }

    info!("💾 [BACKUP]: snapshot written to {}", destination.display());
    Ok(destination)
}

/// Bucle de fondo de respaldo periódico. Un fallo de instantánea se
/// registra y el bucle sigue en la siguiente marca.
pub async fn run_backup_loop(database_path: PathBuf, data_dir: PathBuf, gzip: bool, interval: std::time::Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let database_path = database_path.clone();
        let data_dir = data_dir.clone();
        let result = tokio::task::spawn_blocking(move || snapshot(&database_path, &data_dir, gzip)).await;
        match result {
            Ok(Ok(path)) => info!("💾 [BACKUP]: {} complete", path.display()),
            Ok(Err(e)) => error!("❌ [BACKUP_FAULT]: snapshot failed: {}", e),
            Err(e) => error!("❌ [BACKUP_FAULT]: snapshot task panicked: {}", e),
        }
    }
}
