use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::FieldDataType;
use crate::error::{DomainError, Result};

/// A typed measurement value. Exactly one slot per fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Boolean(bool),
    Numeric(f64),
    Text(String),
}

impl MeasurementValue {
    /// Map a dynamically typed JSON value onto a slot.
    ///
    /// Null, arrays, objects and numbers that do not fit a finite `f64` have
    /// no slot and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(Self::Numeric),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn data_type(&self) -> FieldDataType {
        match self {
            Self::Numeric(_) => FieldDataType::Numeric,
            Self::Text(_) => FieldDataType::Text,
            Self::Boolean(_) => FieldDataType::Boolean,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Numeric(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Text(s) => Value::String(s.clone()),
            Self::Boolean(b) => Value::Bool(*b),
        }
    }

    /// Split into the (numeric, text, boolean) storage slots
    pub fn into_slots(value: Option<&Self>) -> (Option<f64>, Option<String>, Option<bool>) {
        match value {
            Some(Self::Numeric(v)) => (Some(*v), None, None),
            Some(Self::Text(s)) => (None, Some(s.clone()), None),
            Some(Self::Boolean(b)) => (None, None, Some(*b)),
            None => (None, None, None),
        }
    }

    /// Rebuild from storage slots; more than one populated slot is corrupt data
    pub fn from_slots(
        numeric: Option<f64>,
        text: Option<String>,
        boolean: Option<bool>,
    ) -> Result<Option<Self>> {
        match (numeric, text, boolean) {
            (Some(v), None, None) => Ok(Some(Self::Numeric(v))),
            (None, Some(s), None) => Ok(Some(Self::Text(s))),
            (None, None, Some(b)) => Ok(Some(Self::Boolean(b))),
            (None, None, None) => Ok(None),
            _ => Err(DomainError::Store(
                "measurement row has more than one value slot populated".to_string(),
            )),
        }
    }
}

impl std::fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        assert_eq!(
            MeasurementValue::from_json(&json!(21.5)),
            Some(MeasurementValue::Numeric(21.5))
        );
        assert_eq!(
            MeasurementValue::from_json(&json!(3)),
            Some(MeasurementValue::Numeric(3.0))
        );
        assert_eq!(
            MeasurementValue::from_json(&json!("open")),
            Some(MeasurementValue::Text("open".into()))
        );
        assert_eq!(
            MeasurementValue::from_json(&json!(true)),
            Some(MeasurementValue::Boolean(true))
        );
    }

    #[test]
    fn test_unsupported_json_has_no_slot() {
        assert_eq!(MeasurementValue::from_json(&json!(null)), None);
        assert_eq!(MeasurementValue::from_json(&json!([1, 2])), None);
        assert_eq!(MeasurementValue::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_slots() {
        let v = MeasurementValue::Text("ok".into());
        let (n, t, b) = MeasurementValue::into_slots(Some(&v));
        assert_eq!((n, t.as_deref(), b), (None, Some("ok"), None));

        assert_eq!(
            MeasurementValue::from_slots(Some(1.5), None, None).unwrap(),
            Some(MeasurementValue::Numeric(1.5))
        );
        assert_eq!(MeasurementValue::from_slots(None, None, None).unwrap(), None);
        assert!(MeasurementValue::from_slots(Some(1.0), None, Some(true)).is_err());
    }

    #[test]
    fn test_serialization_is_bare() {
        let v = MeasurementValue::Numeric(35.0);
        assert_eq!(serde_json::to_value(&v).unwrap(), json!(35.0));
        let b: MeasurementValue = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(b, MeasurementValue::Boolean(false));
    }
}
