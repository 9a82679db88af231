use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Severity;
use crate::alert::AlertType;
use crate::error::{DomainError, Result};

/// Acceptable value range for one sensor's one measurement field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorThreshold {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub asset_sensor_id: Uuid,
    pub sensor_type_id: Uuid,
    pub measurement_field: String,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub severity: Severity,
    /// Template with optional `{value}`, `{min}`, `{max}` and `{field}` placeholders
    pub alert_message: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SensorThreshold {
    /// Which side of the range a value falls off, if any.
    ///
    /// A missing bound is unbounded on that side.
    pub fn classify(&self, value: f64) -> Option<AlertType> {
        if self.min_value.is_some_and(|min| value < min) {
            Some(AlertType::MinBreach)
        } else if self.max_value.is_some_and(|max| value > max) {
            Some(AlertType::MaxBreach)
        } else {
            None
        }
    }

    pub fn is_breached_by(&self, value: f64) -> bool {
        self.classify(value).is_some()
    }

    /// Alert text for a breaching value
    pub fn render_message(&self, value: f64) -> String {
        let min = format_bound(self.min_value, "-inf");
        let max = format_bound(self.max_value, "inf");

        match self.alert_message.as_deref().map(str::trim) {
            Some(template) if !template.is_empty() => template
                .replace("{value}", &value.to_string())
                .replace("{min}", &min)
                .replace("{max}", &max)
                .replace("{field}", &self.measurement_field),
            _ => format!("Threshold breached: value {value} is outside range [{min}, {max}]"),
        }
    }
}

fn format_bound(bound: Option<f64>, unbounded: &str) -> String {
    bound.map_or_else(|| unbounded.to_string(), |b| b.to_string())
}

/// Request to create a threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewThreshold {
    pub asset_sensor_id: Uuid,
    pub measurement_field: String,
    #[serde(default)]
    pub min_value: Option<f64>,
    #[serde(default)]
    pub max_value: Option<f64>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub alert_message: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewThreshold {
    pub fn new(asset_sensor_id: Uuid, measurement_field: impl Into<String>) -> Self {
        Self {
            asset_sensor_id,
            measurement_field: measurement_field.into(),
            min_value: None,
            max_value: None,
            severity: Severity::Warning,
            alert_message: None,
            is_active: true,
        }
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_message(mut self, template: impl Into<String>) -> Self {
        self.alert_message = Some(template.into());
        self
    }

    /// Check the request's own invariants (field present, sane bounds)
    pub fn validate(&self) -> Result<()> {
        if self.measurement_field.trim().is_empty() {
            return Err(DomainError::Validation(
                "measurement_field is required".to_string(),
            ));
        }
        match (self.min_value, self.max_value) {
            (None, None) => Err(DomainError::Validation(
                "a threshold needs at least one of min_value or max_value".to_string(),
            )),
            (Some(min), Some(max)) if min >= max => Err(DomainError::Validation(format!(
                "min_value ({min}) must be lower than max_value ({max})"
            ))),
            (min, max) if min.is_some_and(|v| !v.is_finite())
                || max.is_some_and(|v| !v.is_finite()) =>
            {
                Err(DomainError::Validation(
                    "threshold bounds must be finite numbers".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Build the threshold, copying tenant and sensor type from the owning sensor
    pub fn into_threshold(
        self,
        tenant_id: Option<Uuid>,
        sensor_type_id: Uuid,
    ) -> Result<SensorThreshold> {
        self.validate()?;
        let now = Utc::now();

        Ok(SensorThreshold {
            id: Uuid::new_v4(),
            tenant_id,
            asset_sensor_id: self.asset_sensor_id,
            sensor_type_id,
            measurement_field: self.measurement_field.trim().to_string(),
            min_value: self.min_value,
            max_value: self.max_value,
            severity: self.severity,
            alert_message: self.alert_message.filter(|m| !m.trim().is_empty()),
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        })
    }
}
