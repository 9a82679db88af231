use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::DomainError;
use domain::asset::{AssetDirectory, AssetLocation, AssetSensor};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryAssetDirectory {
    sensors: RwLock<HashMap<Uuid, AssetSensor>>,
    assets: RwLock<HashMap<Uuid, AssetLocation>>,
}

impl InMemoryAssetDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_asset(&self, asset: AssetLocation) {
        self.assets.write().await.insert(asset.asset_id, asset);
    }

    pub async fn insert_sensor(&self, sensor: AssetSensor) {
        self.sensors.write().await.insert(sensor.id, sensor);
    }
}

#[async_trait]
impl AssetDirectory for InMemoryAssetDirectory {
    async fn find_sensor(&self, asset_sensor_id: Uuid) -> Result<Option<AssetSensor>, DomainError> {
        Ok(self.sensors.read().await.get(&asset_sensor_id).cloned())
    }

    async fn find_asset_location(
        &self,
        asset_id: Uuid,
    ) -> Result<Option<AssetLocation>, DomainError> {
        Ok(self.assets.read().await.get(&asset_id).cloned())
    }

    async fn record_last_reading(
        &self,
        asset_sensor_id: Uuid,
        value: serde_json::Value,
        reading_time: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut sensors = self.sensors.write().await;
        let sensor = sensors
            .get_mut(&asset_sensor_id)
            .ok_or_else(|| DomainError::not_found("AssetSensor", asset_sensor_id))?;

        // Out-of-order readings must not roll the cache back
        if sensor.last_reading_time.is_none_or(|t| t <= reading_time) {
            sensor.last_value = Some(value);
            sensor.last_reading_time = Some(reading_time);
        }
        Ok(())
    }
}
