// [libs/domain/netmon-models/src/metric.rs]
/*!
 * =================================================================
 * APARATO: METRIC POINT & VALUE MODEL (V1.0 - SOBERANO)
 * CLASIFICACIÓN: DOMAIN LOGIC (ESTRATO L2)
 * RESPONSABILIDAD: REPRESENTACIÓN INMUTABLE DE UNA MUESTRA DE TELEMETRÍA
 *
 * # Mathematical Proof (Append-Only Integrity):
 * Un MetricPoint, una vez construido, no expone ningún método de
 * mutación: todos sus campos son `pub` de solo lectura estructural.
 * La única forma de "cambiar" un punto es construir uno nuevo.
 * =================================================================
 */

use crate::device::{DeviceId, DeviceKind};
use crate::errors::ModelError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Categoría de primer nivel de una métrica. Enumeración cerrada: los
/// nombres de cadena son estables en disco, nunca reordenar ni reutilizar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricFamily {
    Connectivity,
    Performance,
    Latency,
    Docsis,
    WifiMesh,
    Bandwidth,
    SystemResources,
    Security,
}

impl MetricFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricFamily::Connectivity => "connectivity",
            MetricFamily::Performance => "performance",
            MetricFamily::Latency => "latency",
            MetricFamily::Docsis => "docsis",
            MetricFamily::WifiMesh => "wifi_mesh",
            MetricFamily::Bandwidth => "bandwidth",
            MetricFamily::SystemResources => "system_resources",
            MetricFamily::Security => "security",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "connectivity" => Some(MetricFamily::Connectivity),
            "performance" => Some(MetricFamily::Performance),
            "latency" => Some(MetricFamily::Latency),
            "docsis" => Some(MetricFamily::Docsis),
            "wifi_mesh" => Some(MetricFamily::WifiMesh),
            "bandwidth" => Some(MetricFamily::Bandwidth),
            "system_resources" => Some(MetricFamily::SystemResources),
            "security" => Some(MetricFamily::Security),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricUnit {
    Percentage,
    Dbmv,
    Db,
    Dbm,
    Count,
    Bytes,
    Gigabytes,
    Milliseconds,
    Boolean,
    None,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Percentage => "percentage",
            MetricUnit::Dbmv => "dbmv",
            MetricUnit::Db => "db",
            MetricUnit::Dbm => "dbm",
            MetricUnit::Count => "count",
            MetricUnit::Bytes => "bytes",
            MetricUnit::Gigabytes => "gigabytes",
            MetricUnit::Milliseconds => "milliseconds",
            MetricUnit::Boolean => "boolean",
            MetricUnit::None => "none",
        }
    }
}

/// Unión etiquetada para el valor dinámico de una métrica. El tag de
/// tipo viaja junto a los bytes serializados en el motor de persistencia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "value_type", content = "value_data")]
pub enum MetricValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Json(serde_json::Value),
}

impl MetricValue {
    pub fn type_tag(&self) -> &'static str {
        match self {
            MetricValue::Int(_) => "int",
            MetricValue::Float(_) => "float",
            MetricValue::Bool(_) => "bool",
            MetricValue::Str(_) => "str",
            MetricValue::Json(_) => "json",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, MetricValue::Int(_) | MetricValue::Float(_))
    }

    /// Proyecta el valor a `f64` cuando es numéricamente interpretable,
    /// incluyendo el booleano como 0.0/1.0 para soportar predicados
    /// numéricos sobre métricas de tipo "is_reachable".
    pub fn as_numeric(&self) -> Option<f64> {
        match self {
            MetricValue::Int(v) => Some(*v as f64),
            MetricValue::Float(v) => Some(*v),
            MetricValue::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            MetricValue::Str(_) | MetricValue::Json(_) => None,
        }
    }

    pub fn as_display_string(&self) -> String {
        match self {
            MetricValue::Int(v) => v.to_string(),
            MetricValue::Float(v) => v.to_string(),
            MetricValue::Bool(v) => v.to_string(),
            MetricValue::Str(v) => v.clone(),
            MetricValue::Json(v) => v.to_string(),
        }
    }
}

/// Muestra inmutable de una métrica. Construida por un collector en el
/// instante en que su sonda subyacente completa la medición; jamás
/// mutada tras ser entregada al motor de almacenamiento.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPoint {
    pub device_id: DeviceId,
    pub device_name: String,
    pub device_kind: DeviceKind,
    pub family: MetricFamily,
    pub metric_name: String,
    pub value: MetricValue,
    pub unit: MetricUnit,
    pub timestamp: DateTime<Utc>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl MetricPoint {
    /// Constructor validante usado por los collectors en la frontera
    /// pública. El decodificador de lectura de almacenamiento construye
    /// el struct literal directamente y no pasa por esta validación,
    /// igual que el resto del dominio confía en los datos que ya cruzaron
    /// la frontera una vez.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device_id: DeviceId,
        device_name: impl Into<String>,
        device_kind: DeviceKind,
        family: MetricFamily,
        metric_name: impl Into<String>,
        value: MetricValue,
        unit: MetricUnit,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        if device_id.as_str().is_empty() {
            return Err(ModelError::EmptyDeviceId);
        }
        let metric_name = metric_name.into();
        if metric_name.is_empty() {
            return Err(ModelError::EmptyMetricName);
        }
        if unit == MetricUnit::Percentage {
            if let Some(numeric) = value.as_numeric() {
                if !(0.0..=100.0).contains(&numeric) {
                    return Err(ModelError::PercentageOutOfRange(numeric));
                }
            }
        }

        Ok(Self {
            device_id,
            device_name: device_name.into(),
            device_kind,
            family,
            metric_name,
            value,
            unit,
            timestamp,
            metadata: HashMap::new(),
        })
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Crea el punto sintético que el policy de errores del §4.B exige:
    /// cualquier excepción de un collector se vuelve un dato de primera
    /// clase en lugar de silencio.
    pub fn collection_error(
        device_id: DeviceId,
        device_name: impl Into<String>,
        device_kind: DeviceKind,
        family: MetricFamily,
        error_kind: &str,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            device_id,
            device_name: device_name.into(),
            device_kind,
            family,
            metric_name: "collection_error".to_string(),
            value: MetricValue::Str(description.into()),
            unit: MetricUnit::None,
            timestamp,
            metadata: HashMap::from([(
                "error_kind".to_string(),
                serde_json::Value::String(error_kind.to_string()),
            )]),
        }
    }
}
