use async_trait::async_trait;
use uuid::Uuid;

use super::SensorThreshold;
use crate::DomainError;

/// Persistence of sensor thresholds
#[async_trait]
pub trait ThresholdRepository: Send + Sync {
    /// Insert a threshold. Fails with `Conflict` when it is active and another
    /// active threshold already covers the same (sensor, field) pair.
    async fn create(&self, threshold: &SensorThreshold) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SensorThreshold>, DomainError>;

    /// Active thresholds for one sensor field
    async fn find_active(
        &self,
        asset_sensor_id: Uuid,
        measurement_field: &str,
    ) -> Result<Vec<SensorThreshold>, DomainError>;

    /// Every threshold of a sensor, active or not
    async fn find_by_sensor(&self, asset_sensor_id: Uuid)
    -> Result<Vec<SensorThreshold>, DomainError>;

    /// Flip the activation flag. `Conflict` when activating would create a
    /// second active threshold for the pair.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<SensorThreshold, DomainError>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
