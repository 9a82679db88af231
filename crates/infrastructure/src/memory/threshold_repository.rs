use async_trait::async_trait;
use chrono::Utc;
use domain::DomainError;
use domain::threshold::{SensorThreshold, ThresholdRepository};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Checks and writes happen under one lock, mirroring the partial unique
/// index on active thresholds in PostgreSQL.
#[derive(Default)]
pub struct InMemoryThresholdRepository {
    thresholds: Mutex<HashMap<Uuid, SensorThreshold>>,
}

impl InMemoryThresholdRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn has_other_active(
    thresholds: &HashMap<Uuid, SensorThreshold>,
    candidate: &SensorThreshold,
) -> bool {
    thresholds.values().any(|t| {
        t.id != candidate.id
            && t.is_active
            && t.asset_sensor_id == candidate.asset_sensor_id
            && t.measurement_field == candidate.measurement_field
    })
}

#[async_trait]
impl ThresholdRepository for InMemoryThresholdRepository {
    async fn create(&self, threshold: &SensorThreshold) -> Result<(), DomainError> {
        let mut thresholds = self.thresholds.lock().await;
        if thresholds.contains_key(&threshold.id) {
            return Err(DomainError::Conflict(format!(
                "threshold {} already exists",
                threshold.id
            )));
        }
        if threshold.is_active && has_other_active(&thresholds, threshold) {
            return Err(DomainError::Conflict(format!(
                "sensor {} already has an active threshold for {}",
                threshold.asset_sensor_id, threshold.measurement_field
            )));
        }
        thresholds.insert(threshold.id, threshold.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SensorThreshold>, DomainError> {
        Ok(self.thresholds.lock().await.get(&id).cloned())
    }

    async fn find_active(
        &self,
        asset_sensor_id: Uuid,
        measurement_field: &str,
    ) -> Result<Vec<SensorThreshold>, DomainError> {
        Ok(self
            .thresholds
            .lock()
            .await
            .values()
            .filter(|t| {
                t.is_active
                    && t.asset_sensor_id == asset_sensor_id
                    && t.measurement_field == measurement_field
            })
            .cloned()
            .collect())
    }

    async fn find_by_sensor(
        &self,
        asset_sensor_id: Uuid,
    ) -> Result<Vec<SensorThreshold>, DomainError> {
        let mut found: Vec<SensorThreshold> = self
            .thresholds
            .lock()
            .await
            .values()
            .filter(|t| t.asset_sensor_id == asset_sensor_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<SensorThreshold, DomainError> {
        let mut thresholds = self.thresholds.lock().await;
        let current = thresholds
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("SensorThreshold", id))?;

        if active && !current.is_active && has_other_active(&thresholds, &current) {
            return Err(DomainError::Conflict(format!(
                "sensor {} already has an active threshold for {}",
                current.asset_sensor_id, current.measurement_field
            )));
        }

        let updated = SensorThreshold {
            is_active: active,
            updated_at: Utc::now(),
            ..current
        };
        thresholds.insert(id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.thresholds.lock().await.remove(&id).is_some())
    }
}
