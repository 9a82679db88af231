use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SensorStatus;

/// A physical sensor attached to an asset. Tenant is inherited from the asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSensor {
    pub id: Uuid,
    pub asset_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub sensor_type_id: Uuid,
    pub name: String,
    pub mac_address: Option<String>,
    pub status: SensorStatus,
    /// Last-known reading cache for fast status display
    pub last_value: Option<serde_json::Value>,
    pub last_reading_time: Option<DateTime<Utc>>,
}

impl AssetSensor {
    pub fn new(
        id: Uuid,
        asset_id: Uuid,
        tenant_id: Option<Uuid>,
        sensor_type_id: Uuid,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            asset_id,
            tenant_id,
            sensor_type_id,
            name: name.into(),
            mac_address: None,
            status: SensorStatus::Active,
            last_value: None,
            last_reading_time: None,
        }
    }

    pub fn with_mac_address(mut self, mac: impl Into<String>) -> Self {
        self.mac_address = Some(mac.into());
        self
    }

    pub fn with_status(mut self, status: SensorStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
}

/// An asset as seen by ingestion: it exists, and may sit at a location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLocation {
    pub asset_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub location: Option<Location>,
}
