// [libs/domain/netmon-models/src/tests_serialization.rs]
/**
 * =================================================================
 * APARATO: DOMAIN SERIALIZATION TEST (V1.0 - INTEGRATION LEVEL)
 * CLASIFICACIÓN: TRINITY EVIDENCE (ESTRATO L2-MODELS)
 * RESPONSABILIDAD: CERTIFICACIÓN DE PARIDAD JSON PARA VALORES DINÁMICOS
 *
 * # Mathematical Proof (Tagged Union Roundtrip):
 * El invariante testeable #1 exige Decode(Encode(value)) == value para
 * todo escalar y blob JSON. Este test certifica la mitad de serde del
 * viaje completo (el resto lo certifica el pipeline de encoding en
 * netarchon-storage, que añade compresión/cifrado sobre estos bytes).
 * =================================================================
 */

#[cfg(test)]
mod tests {
    use netarchon_models::{DeviceId, DeviceKind, MetricFamily, MetricPoint, MetricUnit, MetricValue};

    fn ts() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn certify_metric_value_tagged_union_roundtrip() {
        println!("\n[PROVING_GROUNDS]: Validating MetricValue tagged-union parity...");

        let values = vec![
            MetricValue::Int(-42),
            MetricValue::Float(12.5),
            MetricValue::Bool(true),
            MetricValue::Str("up".to_string()),
            MetricValue::Json(serde_json::json!({"clients": 12, "health": "good"})),
        ];

        for value in values {
            let serialized = serde_json::to_string(&value).expect("serialization must not fail");
            let recovered: MetricValue =
                serde_json::from_str(&serialized).expect("deserialization must not fail");
            assert_eq!(recovered, value, "tagged union roundtrip mismatch for {:?}", value);
        }
    }

    #[test]
    fn certify_metric_point_roundtrip_preserves_metadata() {
        let point = MetricPoint::new(
            DeviceId::from("modem-1"),
            "Basement Modem",
            DeviceKind::CableModem,
            MetricFamily::Docsis,
            "downstream_power",
            MetricValue::Float(-3.2),
            MetricUnit::Dbmv,
            ts(),
        )
        .expect("valid point construction")
        .with_metadata("channel", serde_json::json!(12));

        let serialized = serde_json::to_string(&point).expect("serialization must not fail");
        let recovered: MetricPoint =
            serde_json::from_str(&serialized).expect("deserialization must not fail");

        assert_eq!(recovered.device_id, point.device_id);
        assert_eq!(recovered.value, point.value);
        assert_eq!(recovered.metadata.get("channel"), point.metadata.get("channel"));
    }
}
