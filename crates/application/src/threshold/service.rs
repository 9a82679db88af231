use domain::DomainError;
use domain::asset::AssetDirectory;
use domain::catalog::FieldDataType;
use domain::threshold::{NewThreshold, SensorThreshold, ThresholdRepository};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::schema::SchemaRegistry;

/// Threshold administration
pub struct ThresholdService {
    thresholds: Arc<dyn ThresholdRepository>,
    assets: Arc<dyn AssetDirectory>,
    registry: Arc<SchemaRegistry>,
}

impl ThresholdService {
    pub fn new(
        thresholds: Arc<dyn ThresholdRepository>,
        assets: Arc<dyn AssetDirectory>,
        registry: Arc<SchemaRegistry>,
    ) -> Self {
        Self {
            thresholds,
            assets,
            registry,
        }
    }

    /// Create a threshold for a numeric field of an existing sensor.
    ///
    /// Tenant and sensor type are copied from the sensor.
    pub async fn create(&self, request: NewThreshold) -> Result<SensorThreshold, DomainError> {
        request.validate()?;

        let sensor = self
            .assets
            .find_sensor(request.asset_sensor_id)
            .await?
            .ok_or_else(|| DomainError::not_found("AssetSensor", request.asset_sensor_id))?;

        let field_name = request.measurement_field.trim().to_string();
        let schema = self.registry.resolve_fields(sensor.sensor_type_id).await?;
        let field = schema.get(&field_name).ok_or_else(|| {
            DomainError::Validation(format!(
                "{field_name} is not a measurement field of sensor type {}",
                sensor.sensor_type_id
            ))
        })?;
        if field.data_type != FieldDataType::Numeric {
            return Err(DomainError::Validation(format!(
                "thresholds apply to numeric fields only; {field_name} is {}",
                field.data_type
            )));
        }

        if request.is_active
            && !self
                .thresholds
                .find_active(sensor.id, &field_name)
                .await?
                .is_empty()
        {
            return Err(active_conflict(sensor.id, &field_name));
        }

        let threshold = request.into_threshold(sensor.tenant_id, sensor.sensor_type_id)?;
        self.thresholds.create(&threshold).await?;

        info!(
            threshold_id = %threshold.id,
            asset_sensor_id = %threshold.asset_sensor_id,
            field = %threshold.measurement_field,
            "Threshold created"
        );
        Ok(threshold)
    }

    pub async fn get(&self, id: Uuid) -> Result<SensorThreshold, DomainError> {
        self.thresholds
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("SensorThreshold", id))
    }

    pub async fn list_for_sensor(
        &self,
        asset_sensor_id: Uuid,
    ) -> Result<Vec<SensorThreshold>, DomainError> {
        self.thresholds.find_by_sensor(asset_sensor_id).await
    }

    /// `Conflict` when the pair already has another active threshold
    pub async fn activate(&self, id: Uuid) -> Result<SensorThreshold, DomainError> {
        let threshold = self.get(id).await?;
        if threshold.is_active {
            return Ok(threshold);
        }

        let others = self
            .thresholds
            .find_active(threshold.asset_sensor_id, &threshold.measurement_field)
            .await?;
        if others.iter().any(|t| t.id != id) {
            return Err(active_conflict(
                threshold.asset_sensor_id,
                &threshold.measurement_field,
            ));
        }

        let updated = self.thresholds.set_active(id, true).await?;
        info!(threshold_id = %id, "Threshold activated");
        Ok(updated)
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<SensorThreshold, DomainError> {
        let updated = self.thresholds.set_active(id, false).await?;
        info!(threshold_id = %id, "Threshold deactivated");
        Ok(updated)
    }

    /// Alerts raised by the threshold are kept
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        if !self.thresholds.delete(id).await? {
            return Err(DomainError::not_found("SensorThreshold", id));
        }
        info!(threshold_id = %id, "Threshold deleted");
        Ok(())
    }
}

fn active_conflict(asset_sensor_id: Uuid, field: &str) -> DomainError {
    DomainError::Conflict(format!(
        "sensor {asset_sensor_id} already has an active threshold for {field}"
    ))
}
