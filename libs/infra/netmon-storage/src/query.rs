// [libs/infra/netmon-storage/src/query.rs]
//! =================================================================
//! APARATO: QUERY FILTER COMPILER
//! RESPONSABILIDAD: TRADUCCIÓN DE UN FILTRO DE DOMINIO A SQL PARAMETRIZADO
//! =================================================================

use chrono::{DateTime, Utc};
use libsql::Value as SqlValue;
use netarchon_models::{DeviceId, DeviceKind, MetricFamily};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Timestamp,
    DeviceId,
    Family,
}

impl OrderField {
    fn column(&self) -> &'static str {
        match self {
            OrderField::Timestamp => "timestamp",
            OrderField::DeviceId => "device_id",
            OrderField::Family => "family",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    fn sql(&self) -> &'static str {
        match self {
            OrderDirection::Ascending => "ASC",
            OrderDirection::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub device_ids: Vec<DeviceId>,
    pub device_kinds: Vec<DeviceKind>,
    pub families: Vec<MetricFamily>,
    pub metric_names: Vec<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub order_by: Option<OrderField>,
    pub order_dir: Option<OrderDirection>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compone el `SELECT ... WHERE ...` parametrizado y su lista de
    /// parámetros, igual que los constructores de filtros del motor de
    /// persistencia original componen sus cláusulas `WHERE` a partir de
    /// un conjunto de criterios opcionales.
    pub fn compile(&self) -> (String, Vec<SqlValue>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<SqlValue> = Vec::new();

        if !self.device_ids.is_empty() {
            let placeholders = join_placeholders(self.device_ids.len(), params.len());
            clauses.push(format!("device_id IN ({placeholders})"));
            params.extend(self.device_ids.iter().map(|id| SqlValue::from(id.as_str().to_string())));
        }

        if !self.device_kinds.is_empty() {
            let placeholders = join_placeholders(self.device_kinds.len(), params.len());
            clauses.push(format!("device_kind IN ({placeholders})"));
            params.extend(
                self.device_kinds
                    .iter()
                    .map(|k| SqlValue::from(k.as_str().to_string())),
            );
        }

        if !self.families.is_empty() {
            let placeholders = join_placeholders(self.families.len(), params.len());
            clauses.push(format!("family IN ({placeholders})"));
            params.extend(self.families.iter().map(|f| SqlValue::from(f.as_str().to_string())));
        }

        if !self.metric_names.is_empty() {
            let placeholders = join_placeholders(self.metric_names.len(), params.len());
            clauses.push(format!("metric_name IN ({placeholders})"));
            params.extend(self.metric_names.iter().map(|n| SqlValue::from(n.clone())));
        }

        if let Some(since) = self.since {
            params.push(SqlValue::from(since.to_rfc3339()));
            clauses.push(format!("timestamp >= ?{}", params.len()));
        }

        if let Some(until) = self.until {
            params.push(SqlValue::from(until.to_rfc3339()));
            clauses.push(format!("timestamp <= ?{}", params.len()));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let order_field = self.order_by.unwrap_or(OrderField::Timestamp);
        let order_dir = self.order_dir.unwrap_or(OrderDirection::Descending);
        let order_clause = format!("ORDER BY {} {}", order_field.column(), order_dir.sql());

        let limit_clause = self
            .limit
            .map(|limit| format!("LIMIT {limit}"))
            .unwrap_or_default();

        let sql = format!(
            "SELECT device_id, device_name, device_kind, family, metric_name, value_type, \
             value_data, unit, timestamp, compression_type, encryption_level, metadata_json \
             FROM metrics {where_clause} {order_clause} {limit_clause}"
        );

        (sql, params)
    }
}

fn join_placeholders(count: usize, already_bound: usize) -> String {
    (1..=count)
        .map(|i| format!("?{}", already_bound + i))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_compiles_to_an_unconditioned_select() {
        let (sql, params) = QueryFilter::new().compile();
        assert!(sql.contains("FROM metrics"));
        assert!(!sql.contains("WHERE"));
        assert!(params.is_empty());
    }

    #[test]
    fn device_id_filter_produces_an_in_clause() {
        let filter = QueryFilter {
            device_ids: vec![DeviceId::from("modem-1"), DeviceId::from("router-1")],
            ..Default::default()
        };
        let (sql, params) = filter.compile();
        assert!(sql.contains("device_id IN (?1, ?2)"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn combined_filters_bind_parameters_in_order() {
        let filter = QueryFilter {
            device_ids: vec![DeviceId::from("modem-1")],
            families: vec![MetricFamily::Docsis],
            limit: Some(50),
            ..Default::default()
        };
        let (sql, params) = filter.compile();
        assert!(sql.contains("device_id IN (?1)"));
        assert!(sql.contains("family IN (?2)"));
        assert!(sql.contains("LIMIT 50"));
        assert_eq!(params.len(), 2);
    }
}
