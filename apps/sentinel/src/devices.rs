// [apps/sentinel/src/devices.rs]
//! =================================================================
//! APARATO: DEVICE FLEET LOADER
//! RESPONSABILIDAD: LECTURA DEL INVENTARIO DE DISPOSITIVOS DESDE DISCO
//! =================================================================

use std::path::Path;

use netarchon_models::Device;

/// Lee un inventario de dispositivos desde un archivo JSON
/// (`[{"id": ..., "name": ..., "kind": ..., ...}, ...]`). No valida
/// duplicados -- el `Coordinator` sobrescribe silenciosamente una
/// entrada previa con el mismo `DeviceId` al registrar.
pub async fn load_fleet(path: impl AsRef<Path>) -> anyhow::Result<Vec<Device>> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("cannot read device fleet file {}: {e}", path.display()))?;
    let devices: Vec<Device> = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("malformed device fleet file {}: {e}", path.display()))?;
    Ok(devices)
}

/// Lee un conjunto de reglas de alerta desde un archivo JSON, con la
/// misma tolerancia que `load_fleet`: un archivo ausente no es fatal,
/// el daemon simplemente arranca sin reglas precargadas.
pub async fn load_rules(path: impl AsRef<Path>) -> anyhow::Result<Vec<netarchon_models::AlertRule>> {
    let path = path.as_ref();
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => {
            let rules = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("malformed alert rule file {}: {e}", path.display()))?;
            Ok(rules)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(anyhow::anyhow!("cannot read alert rule file {}: {e}", path.display())),
    }
}
