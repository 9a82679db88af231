use async_trait::async_trait;
use uuid::Uuid;

use super::{MeasurementType, SensorType};
use crate::DomainError;

/// Read-only access to the sensor type / measurement type catalog
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Find a sensor type by ID, active or not
    async fn find_sensor_type(&self, id: Uuid) -> Result<Option<SensorType>, DomainError>;

    /// All measurement types (with their fields) registered for a sensor type,
    /// including inactive ones
    async fn find_measurement_types(
        &self,
        sensor_type_id: Uuid,
    ) -> Result<Vec<MeasurementType>, DomainError>;
}
