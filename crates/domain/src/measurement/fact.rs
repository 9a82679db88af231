use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MeasurementValue;

/// One (field, value, timestamp) observation derived from a raw reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementFact {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub asset_sensor_id: Uuid,
    pub sensor_type_id: Uuid,
    pub mac_address: Option<String>,
    pub field_name: String,
    pub label: String,
    pub unit: String,
    /// `None` is an explicit "no value" fact
    pub value: Option<MeasurementValue>,
    pub reading_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl MeasurementFact {
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_ref().and_then(MeasurementValue::as_f64)
    }
}

/// Filter for reading back stored facts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementQuery {
    pub asset_sensor_id: Option<Uuid>,
    pub sensor_type_id: Option<Uuid>,
    pub mac_address: Option<String>,
    pub field_name: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

impl MeasurementQuery {
    pub const DEFAULT_LIMIT: u32 = 1000;
    pub const MAX_LIMIT: u32 = 10_000;

    pub fn for_sensor(asset_sensor_id: Uuid) -> Self {
        Self {
            asset_sensor_id: Some(asset_sensor_id),
            ..Self::default()
        }
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    /// In-process filter matching the SQL implementation (bounds inclusive)
    pub fn matches(&self, fact: &MeasurementFact) -> bool {
        self.asset_sensor_id.is_none_or(|id| fact.asset_sensor_id == id)
            && self.sensor_type_id.is_none_or(|id| fact.sensor_type_id == id)
            && self.mac_address.as_deref().is_none_or(|mac| {
                fact.mac_address
                    .as_deref()
                    .is_some_and(|m| m.eq_ignore_ascii_case(mac))
            })
            && self
                .field_name
                .as_deref()
                .is_none_or(|f| fact.field_name == f)
            && self.from.is_none_or(|from| fact.reading_time >= from)
            && self.to.is_none_or(|to| fact.reading_time <= to)
    }
}
