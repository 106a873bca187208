// [libs/domain/netmon-models/src/device.rs]
/*!
 * =================================================================
 * APARATO: DEVICE DESCRIPTOR (V1.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN DE LA FLOTA MONITOREADA
 * =================================================================
 */

use crate::errors::ModelError;
use crate::metric::MetricFamily;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Identificador estable y opaco de un dispositivo en la flota.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DeviceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Clasificación cerrada del hardware monitoreado. Los nombres de cadena
/// son estables en disco; nunca reordenar ni reutilizar variantes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    CableModem,
    MeshRouter,
    MeshSatellite,
    Gateway,
    LinuxServer,
    Generic,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::CableModem => "cable_modem",
            DeviceKind::MeshRouter => "mesh_router",
            DeviceKind::MeshSatellite => "mesh_satellite",
            DeviceKind::Gateway => "gateway",
            DeviceKind::LinuxServer => "linux_server",
            DeviceKind::Generic => "generic",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "cable_modem" => Some(DeviceKind::CableModem),
            "mesh_router" => Some(DeviceKind::MeshRouter),
            "mesh_satellite" => Some(DeviceKind::MeshSatellite),
            "gateway" => Some(DeviceKind::Gateway),
            "linux_server" => Some(DeviceKind::LinuxServer),
            "generic" => Some(DeviceKind::Generic),
            _ => None,
        }
    }
}

/// Descriptor estable de un nodo de la flota monitoreada.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub kind: DeviceKind,
    pub address: String,
    pub credential_ref: Option<String>,
    #[serde(with = "duration_seconds")]
    pub poll_interval: Duration,
    pub enabled_families: HashSet<MetricFamily>,
    /// Dispositivos marcados por política quedan excluidos de escaneo
    /// activo de puertos; solo se registra alcanzabilidad pasiva.
    pub policy_flagged: bool,
}

impl Device {
    pub fn new(
        id: impl Into<DeviceId>,
        name: impl Into<String>,
        kind: DeviceKind,
        address: impl Into<String>,
        poll_interval: Duration,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        if id.as_str().is_empty() {
            return Err(ModelError::EmptyDeviceId);
        }

        Ok(Self {
            id,
            name: name.into(),
            kind,
            address: address.into(),
            credential_ref: None,
            poll_interval,
            enabled_families: HashSet::new(),
            policy_flagged: false,
        })
    }

    pub fn with_credential(mut self, credential_ref: impl Into<String>) -> Self {
        self.credential_ref = Some(credential_ref.into());
        self
    }

    pub fn with_families(mut self, families: impl IntoIterator<Item = MetricFamily>) -> Self {
        self.enabled_families = families.into_iter().collect();
        self
    }

    pub fn flagged(mut self) -> Self {
        self.policy_flagged = true;
        self
    }
}

mod duration_seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_device_id() {
        let result = Device::new("", "n", DeviceKind::Generic, "1.2.3.4", Duration::from_secs(60));
        assert_eq!(result.unwrap_err(), ModelError::EmptyDeviceId);
    }

    #[test]
    fn kind_round_trips_through_its_stable_string() {
        for kind in [
            DeviceKind::CableModem,
            DeviceKind::MeshRouter,
            DeviceKind::MeshSatellite,
            DeviceKind::Gateway,
            DeviceKind::LinuxServer,
            DeviceKind::Generic,
        ] {
            assert_eq!(DeviceKind::from_str(kind.as_str()), Some(kind));
        }
    }
}
