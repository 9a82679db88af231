use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::infer_unit;
use crate::catalog::{FieldDataType, MeasurementField, MeasurementType};

/// Resolved constraints for one measurement field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    pub label: String,
    pub data_type: FieldDataType,
    /// Stored unit, or the one inferred from the label; empty when unknown
    pub unit: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub required: bool,
    pub schema_version: i32,
}

impl FieldSchema {
    fn resolve(field: &MeasurementField, owner: &MeasurementType) -> Self {
        let unit = field
            .unit
            .clone()
            .or_else(|| infer_unit(&field.label).map(str::to_string))
            .or_else(|| infer_unit(&field.name).map(str::to_string))
            .unwrap_or_default();

        // Fields without their own bounds fall back to the type's accepted range
        let (min, max) = if field.min.is_none() && field.max.is_none() {
            (owner.min_value, owner.max_value)
        } else {
            (field.min, field.max)
        };

        let label = if field.label.trim().is_empty() {
            field.name.clone()
        } else {
            field.label.clone()
        };

        Self {
            name: field.name.clone(),
            label,
            data_type: field.data_type,
            unit,
            min,
            max,
            required: field.required,
            schema_version: owner.schema_version,
        }
    }

    /// Inclusive range check; non-numeric fields and unbounded sides always pass
    pub fn accepts(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// The set of valid measurement fields for one sensor type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSchema {
    pub sensor_type_id: Uuid,
    pub fields: BTreeMap<String, FieldSchema>,
}

impl SensorSchema {
    /// Merge the fields of every active measurement type.
    ///
    /// When two active types declare the same field name, the higher schema
    /// version wins.
    pub fn from_measurement_types(sensor_type_id: Uuid, types: &[MeasurementType]) -> Self {
        let mut fields: BTreeMap<String, FieldSchema> = BTreeMap::new();

        for mt in types.iter().filter(|mt| mt.active) {
            for field in &mt.fields {
                let resolved = FieldSchema::resolve(field, mt);
                match fields.get(&resolved.name) {
                    Some(existing) if existing.schema_version >= resolved.schema_version => {}
                    _ => {
                        fields.insert(resolved.name.clone(), resolved);
                    }
                }
            }
        }

        Self {
            sensor_type_id,
            fields,
        }
    }

    pub fn get(&self, field_name: &str) -> Option<&FieldSchema> {
        self.fields.get(field_name)
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.fields.contains_key(field_name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
