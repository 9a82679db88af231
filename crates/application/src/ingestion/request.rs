use chrono::{DateTime, Utc};
use domain::DomainError;
use domain::measurement::{MeasurementFact, MeasurementValue, RawMeasurement};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use uuid::Uuid;

static MAC_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}(?:[:-][0-9A-Fa-f]{2}){5}$")
        .unwrap_or_else(|e| panic!("invalid MAC address pattern: {e}"))
});

/// One sensor reading as submitted by a device or gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestionRequest {
    pub asset_sensor_id: Option<Uuid>,
    pub sensor_type_id: Option<Uuid>,
    #[serde(default)]
    pub mac_address: Option<String>,
    /// Defaults to the time of ingestion
    #[serde(default)]
    pub reading_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub measurement_data: BTreeMap<String, RawMeasurement>,
}

/// Top-level fields of a request after validation
#[derive(Debug, Clone)]
pub(crate) struct ValidatedRequest {
    pub asset_sensor_id: Uuid,
    pub sensor_type_id: Uuid,
    pub mac_address: Option<String>,
}

impl IngestionRequest {
    pub fn new(asset_sensor_id: Uuid, sensor_type_id: Uuid) -> Self {
        Self {
            asset_sensor_id: Some(asset_sensor_id),
            sensor_type_id: Some(sensor_type_id),
            ..Self::default()
        }
    }

    pub fn with_measurement(mut self, field: impl Into<String>, raw: RawMeasurement) -> Self {
        self.measurement_data.insert(field.into(), raw);
        self
    }

    pub fn with_reading_time(mut self, at: DateTime<Utc>) -> Self {
        self.reading_time = Some(at);
        self
    }

    pub fn with_mac_address(mut self, mac: impl Into<String>) -> Self {
        self.mac_address = Some(mac.into());
        self
    }

    pub(crate) fn validate(&self) -> Result<ValidatedRequest, DomainError> {
        let asset_sensor_id = self
            .asset_sensor_id
            .ok_or_else(|| DomainError::Validation("asset_sensor_id is required".to_string()))?;
        let sensor_type_id = self
            .sensor_type_id
            .ok_or_else(|| DomainError::Validation("sensor_type_id is required".to_string()))?;

        if self.measurement_data.is_empty() {
            return Err(DomainError::Validation(
                "measurement_data must contain at least one field".to_string(),
            ));
        }

        let mac_address = match self.mac_address.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(mac) if is_valid_mac(mac) => Some(mac.to_string()),
            Some(mac) => {
                return Err(DomainError::Validation(format!(
                    "mac_address is not a valid MAC address: {mac}"
                )));
            }
        };

        Ok(ValidatedRequest {
            asset_sensor_id,
            sensor_type_id,
            mac_address,
        })
    }
}

/// Six hex pairs separated consistently by ':' or '-'
pub fn is_valid_mac(mac: &str) -> bool {
    MAC_ADDRESS.is_match(mac) && {
        let sep = if mac.contains(':') { ':' } else { '-' };
        mac.split(sep).count() == 6
    }
}

/// Several readings in one call
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchIngestionRequest {
    #[serde(default)]
    pub readings: Vec<BatchReading>,
}

impl BatchIngestionRequest {
    pub fn new(readings: impl IntoIterator<Item = IngestionRequest>) -> Self {
        Self {
            readings: readings.into_iter().map(BatchReading::from).collect(),
        }
    }
}

/// One entry of a batch.
///
/// Entries arrive as raw JSON so a malformed reading is rejected on its
/// own instead of failing the whole body.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum BatchReading {
    Parsed(IngestionRequest),
    Raw(serde_json::Value),
}

impl BatchReading {
    pub fn into_request(self) -> Result<IngestionRequest, DomainError> {
        match self {
            Self::Parsed(request) => Ok(request),
            Self::Raw(value) => serde_json::from_value(value)
                .map_err(|e| DomainError::Validation(format!("malformed reading: {e}"))),
        }
    }
}

impl From<serde_json::Value> for BatchReading {
    fn from(value: serde_json::Value) -> Self {
        Self::Raw(value)
    }
}

impl From<IngestionRequest> for BatchReading {
    fn from(request: IngestionRequest) -> Self {
        Self::Parsed(request)
    }
}

/// Normalized view of one stored field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMeasurement {
    pub value: Option<MeasurementValue>,
    pub label: String,
    pub unit: String,
}

impl From<&MeasurementFact> for NormalizedMeasurement {
    fn from(fact: &MeasurementFact) -> Self {
        Self {
            value: fact.value.clone(),
            label: fact.label.clone(),
            unit: fact.unit.clone(),
        }
    }
}

/// Result of an accepted reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionReceipt {
    pub asset_sensor_id: Uuid,
    pub sensor_type_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub asset_id: Uuid,
    pub location_id: Option<Uuid>,
    pub location_name: Option<String>,
    pub reading_time: DateTime<Utc>,
    pub measurements: BTreeMap<String, NormalizedMeasurement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl IngestionReceipt {
    /// Measurement map as stored on the sensor's last-reading cache
    pub fn last_value(&self) -> serde_json::Value {
        let map = self
            .measurements
            .iter()
            .map(|(field, m)| {
                let value = m
                    .value
                    .as_ref()
                    .map_or(serde_json::Value::Null, MeasurementValue::to_json);
                (field.clone(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

/// A reading of a batch that was not accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedReading {
    pub index: usize,
    pub error: String,
    pub message: String,
}

impl RejectedReading {
    pub fn new(index: usize, err: &DomainError) -> Self {
        Self {
            index,
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReceipt {
    pub accepted: Vec<IngestionReceipt>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedReading>,
    pub fact_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mac_address_formats() {
        assert!(is_valid_mac("AA:BB:CC:DD:EE:FF"));
        assert!(is_valid_mac("aa-bb-cc-dd-ee-01"));
        assert!(!is_valid_mac("AA:BB:CC:DD:EE"));
        assert!(!is_valid_mac("AA:BB-CC:DD:EE:FF"));
        assert!(!is_valid_mac("GG:BB:CC:DD:EE:FF"));
        assert!(!is_valid_mac("AABBCCDDEEFF"));
    }

    #[test]
    fn test_missing_ids_are_rejected() {
        let req: IngestionRequest =
            serde_json::from_value(json!({"measurement_data": {"temperature": 20}})).unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err, DomainError::Validation("asset_sensor_id is required".into()));
    }

    #[test]
    fn test_empty_measurement_data_is_rejected() {
        let req = IngestionRequest::new(Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(req.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_blank_mac_is_ignored() {
        let req = IngestionRequest::new(Uuid::new_v4(), Uuid::new_v4())
            .with_measurement("temperature", RawMeasurement::new(json!(20)))
            .with_mac_address("  ");
        assert_eq!(req.validate().unwrap().mac_address, None);

        let bad = req.with_mac_address("not-a-mac");
        assert!(matches!(bad.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_malformed_batch_entry_is_isolated() {
        let batch: BatchIngestionRequest = serde_json::from_value(json!({
            "readings": [
                {"asset_sensor_id": Uuid::new_v4(), "sensor_type_id": Uuid::new_v4(),
                 "measurement_data": {"temperature": 20}},
                {"asset_sensor_id": "not-a-uuid", "measurement_data": {"temperature": 20}},
                {"reading_time": "yesterday"}
            ]
        }))
        .unwrap();
        assert_eq!(batch.readings.len(), 3);

        let mut results = batch.readings.into_iter().map(BatchReading::into_request);
        assert!(results.next().unwrap().is_ok());
        assert!(matches!(results.next().unwrap(), Err(DomainError::Validation(_))));
        assert!(matches!(results.next().unwrap(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_request_deserialization() {
        let sensor = Uuid::new_v4();
        let st = Uuid::new_v4();
        let req: IngestionRequest = serde_json::from_value(json!({
            "asset_sensor_id": sensor,
            "sensor_type_id": st,
            "reading_time": "2024-05-01T12:00:00Z",
            "measurement_data": {
                "temperature": {"value": 21.5, "label": "Temperature", "unit": "°C"},
                "door_open": true
            }
        }))
        .unwrap();

        let v = req.validate().unwrap();
        assert_eq!(v.asset_sensor_id, sensor);
        assert_eq!(req.measurement_data.len(), 2);
        assert_eq!(req.measurement_data["door_open"].value, json!(true));
    }
}
