use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AssetLocation, AssetSensor};
use crate::DomainError;

/// Lookups into the asset / sensor registry owned by the CRUD side of the system
#[async_trait]
pub trait AssetDirectory: Send + Sync {
    async fn find_sensor(&self, asset_sensor_id: Uuid) -> Result<Option<AssetSensor>, DomainError>;

    /// `None` when the asset does not exist
    async fn find_asset_location(&self, asset_id: Uuid)
    -> Result<Option<AssetLocation>, DomainError>;

    /// Refresh the sensor's last-known reading cache
    async fn record_last_reading(
        &self,
        asset_sensor_id: Uuid,
        value: serde_json::Value,
        reading_time: DateTime<Utc>,
    ) -> Result<(), DomainError>;
}
