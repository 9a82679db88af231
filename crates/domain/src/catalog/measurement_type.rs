use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FieldDataType;
use crate::error::{DomainError, Result};

/// One named field within a measurement type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementField {
    pub id: Uuid,
    pub measurement_type_id: Uuid,
    pub name: String,
    pub label: String,
    pub data_type: FieldDataType,
    pub required: bool,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl MeasurementField {
    /// Create a field, rejecting empty names and inverted bounds
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Uuid,
        measurement_type_id: Uuid,
        name: impl Into<String>,
        label: impl Into<String>,
        data_type: FieldDataType,
        required: bool,
        unit: Option<String>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "Measurement field name cannot be empty".to_string(),
            ));
        }
        check_bounds(&name, min, max)?;

        Ok(Self {
            id,
            measurement_type_id,
            name,
            label: label.into(),
            data_type,
            required,
            unit: unit.filter(|u| !u.trim().is_empty()),
            min,
            max,
        })
    }

    /// Shorthand for a numeric field with no unit and no bounds
    pub fn numeric(measurement_type_id: Uuid, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::new(
            Uuid::new_v4(),
            measurement_type_id,
            name.clone(),
            name,
            FieldDataType::Numeric,
            false,
            None,
            None,
            None,
        )
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        self.unit = if unit.trim().is_empty() { None } else { Some(unit) };
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Result<Self> {
        check_bounds(&self.name, min, max)?;
        self.min = min;
        self.max = max;
        Ok(self)
    }
}

/// Versioned definition of a class of measurement for a sensor type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementType {
    pub id: Uuid,
    pub sensor_type_id: Uuid,
    pub name: String,
    /// Accepted range applied to numeric fields that declare no bounds of their own
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub schema_version: i32,
    pub active: bool,
    pub fields: Vec<MeasurementField>,
}

impl MeasurementType {
    pub fn new(
        id: Uuid,
        sensor_type_id: Uuid,
        name: impl Into<String>,
        schema_version: i32,
    ) -> Self {
        Self {
            id,
            sensor_type_id,
            name: name.into(),
            min_value: None,
            max_value: None,
            schema_version,
            active: true,
            fields: Vec::new(),
        }
    }

    pub fn with_accepted_range(mut self, min: Option<f64>, max: Option<f64>) -> Result<Self> {
        check_bounds(&self.name, min, max)?;
        self.min_value = min;
        self.max_value = max;
        Ok(self)
    }

    pub fn with_field(mut self, field: MeasurementField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }
}

fn check_bounds(name: &str, min: Option<f64>, max: Option<f64>) -> Result<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min >= max {
            return Err(DomainError::InvalidConfiguration(format!(
                "{name}: min ({min}) must be lower than max ({max})"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_rejects_inverted_bounds() {
        let result = MeasurementField::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "temperature",
            "Temperature",
            FieldDataType::Numeric,
            true,
            None,
            Some(50.0),
            Some(-10.0),
        );
        assert!(matches!(result, Err(DomainError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_field_rejects_equal_bounds() {
        let field = MeasurementField::numeric(Uuid::new_v4(), "humidity").unwrap();
        assert!(field.with_bounds(Some(5.0), Some(5.0)).is_err());
    }

    #[test]
    fn test_field_rejects_empty_name() {
        assert!(MeasurementField::numeric(Uuid::new_v4(), "  ").is_err());
    }

    #[test]
    fn test_blank_unit_is_dropped() {
        let field = MeasurementField::numeric(Uuid::new_v4(), "rssi")
            .unwrap()
            .with_unit(" ");
        assert_eq!(field.unit, None);
    }

    #[test]
    fn test_measurement_type_builder() {
        let mt_id = Uuid::new_v4();
        let mt = MeasurementType::new(mt_id, Uuid::new_v4(), "climate", 2)
            .with_accepted_range(Some(-40.0), Some(125.0))
            .unwrap()
            .with_field(MeasurementField::numeric(mt_id, "temperature").unwrap());

        assert!(mt.active);
        assert_eq!(mt.schema_version, 2);
        assert_eq!(mt.fields.len(), 1);
        assert_eq!(mt.min_value, Some(-40.0));
        assert!(!mt.deactivated().active);
    }
}
