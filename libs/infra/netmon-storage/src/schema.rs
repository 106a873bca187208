// [libs/infra/netmon-storage/src/schema.rs]
/*!
 * =================================================================
 * APARATO: SOVEREIGN DATABASE SCHEMA (V1.0)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

const TACTICAL_TABLES: &[(&str, &str)] = &[
    (
        "TABLE_METRICS",
        r#"
        CREATE TABLE IF NOT EXISTS metrics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            device_id TEXT NOT NULL,
            device_name TEXT NOT NULL,
            device_kind TEXT NOT NULL,
            family TEXT NOT NULL,
            metric_name TEXT NOT NULL,
            value_type TEXT NOT NULL,
            value_data BLOB NOT NULL,
            unit TEXT NOT NULL,
            timestamp DATETIME NOT NULL,
            compression_type TEXT NOT NULL DEFAULT 'none',
            encryption_level TEXT NOT NULL DEFAULT 'none',
            retention_policy TEXT NOT NULL DEFAULT 'medium',
            metadata_json TEXT
        );
    "#,
    ),
    (
        "TABLE_METRICS_HOURLY",
        r#"
        CREATE TABLE IF NOT EXISTS metrics_hourly (
            device_id TEXT NOT NULL,
            family TEXT NOT NULL,
            metric_name TEXT NOT NULL,
            hour_start DATETIME NOT NULL,
            min_value REAL NOT NULL,
            max_value REAL NOT NULL,
            mean_value REAL NOT NULL,
            count INTEGER NOT NULL,
            sum_value REAL NOT NULL,
            UNIQUE(device_id, family, metric_name, hour_start)
        );
    "#,
    ),
    (
        "TABLE_RETENTION_LOG",
        r#"
        CREATE TABLE IF NOT EXISTS retention_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            retention_policy TEXT NOT NULL,
            run_at DATETIME NOT NULL,
            rows_deleted INTEGER NOT NULL,
            bytes_freed INTEGER
        );
    "#,
    ),
    (
        "TABLE_STORAGE_STATS",
        r#"
        CREATE TABLE IF NOT EXISTS storage_stats (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            snapshot_at DATETIME NOT NULL,
            total_rows INTEGER NOT NULL,
            db_size_bytes INTEGER NOT NULL,
            compression_ratio REAL,
            encrypted_count INTEGER
        );
    "#,
    ),
];

const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    (
        "IDX_METRICS_TIMESTAMP",
        "CREATE INDEX IF NOT EXISTS idx_metrics_timestamp ON metrics(timestamp);",
    ),
    (
        "IDX_METRICS_DEVICE",
        "CREATE INDEX IF NOT EXISTS idx_metrics_device ON metrics(device_id);",
    ),
    (
        "IDX_METRICS_FAMILY",
        "CREATE INDEX IF NOT EXISTS idx_metrics_family ON metrics(family);",
    ),
    (
        "IDX_METRICS_NAME",
        "CREATE INDEX IF NOT EXISTS idx_metrics_name ON metrics(metric_name);",
    ),
    (
        "IDX_METRICS_RETENTION",
        "CREATE INDEX IF NOT EXISTS idx_metrics_retention ON metrics(retention_policy);",
    ),
    (
        "IDX_METRICS_DEVICE_FAMILY_TIME",
        "CREATE INDEX IF NOT EXISTS idx_metrics_device_family_time ON metrics(device_id, family, timestamp);",
    ),
];

#[instrument(skip(connection))]
pub async fn apply_full_sovereign_schema(connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization...");

    solidify_base_strata(connection).await?;
    harden_access_layer(connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Tactical ledger level and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {identifier}"))?;
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {identifier}"))?;
    }
    Ok(())
}
