use chrono::{DateTime, Utc};
use domain::DomainError;
use domain::measurement::{MeasurementFact, MeasurementValue, RawMeasurement};
use domain::schema::{FieldSchema, SensorSchema};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::schema::SchemaRegistry;

/// Identity and timing shared by every fact of one reading
#[derive(Debug, Clone)]
pub struct ReadingContext {
    pub tenant_id: Option<Uuid>,
    pub asset_sensor_id: Uuid,
    pub sensor_type_id: Uuid,
    pub mac_address: Option<String>,
    pub reading_time: DateTime<Utc>,
}

/// Facts that survived validation, plus one warning per skipped field
#[derive(Debug, Clone, Default)]
pub struct NormalizedReading {
    pub facts: Vec<MeasurementFact>,
    pub warnings: Vec<String>,
}

/// Validates raw payload fields against a sensor type's schema and turns
/// them into typed measurement facts.
pub struct ReadingNormalizer {
    registry: Arc<SchemaRegistry>,
}

impl ReadingNormalizer {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub async fn normalize(
        &self,
        ctx: &ReadingContext,
        raw: &BTreeMap<String, RawMeasurement>,
    ) -> Result<NormalizedReading, DomainError> {
        let schema = self.registry.resolve_fields(ctx.sensor_type_id).await?;
        normalize_with_schema(&schema, ctx, raw)
    }
}

/// Schema-driven part of normalization.
///
/// Unknown fields, unsupported values, type mismatches and out-of-range
/// numbers are skipped with a warning. Fails with `NoValidMeasurements`
/// when nothing is left.
pub fn normalize_with_schema(
    schema: &SensorSchema,
    ctx: &ReadingContext,
    raw: &BTreeMap<String, RawMeasurement>,
) -> Result<NormalizedReading, DomainError> {
    if raw.is_empty() {
        return Err(DomainError::NoValidMeasurements(
            "measurement_data is empty".to_string(),
        ));
    }

    let created_at = Utc::now();
    let mut out = NormalizedReading::default();

    for (key, measurement) in raw {
        let Some(field) = schema.get(key) else {
            out.warnings.push(format!("invalid measurement field: {key}"));
            continue;
        };

        match typed_value(key, field, measurement) {
            Ok(value) => out.facts.push(MeasurementFact {
                id: Uuid::new_v4(),
                tenant_id: ctx.tenant_id,
                asset_sensor_id: ctx.asset_sensor_id,
                sensor_type_id: ctx.sensor_type_id,
                mac_address: ctx.mac_address.clone(),
                field_name: field.name.clone(),
                label: measurement
                    .explicit_label()
                    .map_or_else(|| field.label.clone(), str::to_string),
                unit: measurement
                    .explicit_unit()
                    .map_or_else(|| field.unit.clone(), str::to_string),
                value: Some(value),
                reading_time: ctx.reading_time,
                created_at,
            }),
            Err(warning) => out.warnings.push(warning),
        }
    }

    if out.facts.is_empty() {
        return Err(DomainError::NoValidMeasurements(out.warnings.join("; ")));
    }

    Ok(out)
}

fn typed_value(
    key: &str,
    field: &FieldSchema,
    measurement: &RawMeasurement,
) -> Result<MeasurementValue, String> {
    let value = MeasurementValue::from_json(&measurement.value).ok_or_else(|| {
        format!(
            "unsupported value type for field {key}: {}",
            json_kind(&measurement.value)
        )
    })?;

    if value.data_type() != field.data_type {
        return Err(format!(
            "type mismatch for field {key}: expected {}, got {}",
            field.data_type,
            value.data_type()
        ));
    }

    if let Some(v) = value.as_f64() {
        if !field.accepts(v) {
            return Err(format!(
                "value {v} for field {key} is outside range [{}, {}]",
                field.min.map_or_else(|| "-inf".to_string(), |m| m.to_string()),
                field.max.map_or_else(|| "inf".to_string(), |m| m.to_string()),
            ));
        }
    }

    Ok(value)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
