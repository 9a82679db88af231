use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One untyped entry of an ingestion payload.
///
/// Accepts either the detailed form `{"value": 21.5, "label": "Temperature", "unit": "°C"}`
/// or a bare scalar such as `21.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawMeasurement {
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl RawMeasurement {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            label: None,
            unit: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Caller-supplied unit, ignoring blanks
    pub fn explicit_unit(&self) -> Option<&str> {
        self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Caller-supplied label, ignoring blanks
    pub fn explicit_label(&self) -> Option<&str> {
        self.label.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }
}

impl From<Value> for RawMeasurement {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut map) if map.contains_key("value") => {
                let text = |v: Option<Value>| match v {
                    Some(Value::String(s)) => Some(s),
                    _ => None,
                };
                let label = text(map.remove("label"));
                let unit = text(map.remove("unit"));
                Self {
                    value: map.remove("value").unwrap_or(Value::Null),
                    label,
                    unit,
                }
            }
            other => Self::new(other),
        }
    }
}
