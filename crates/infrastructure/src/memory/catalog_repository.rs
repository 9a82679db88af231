use async_trait::async_trait;
use domain::DomainError;
use domain::catalog::{CatalogRepository, MeasurementType, SensorType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    sensor_types: RwLock<HashMap<Uuid, SensorType>>,
    measurement_types: RwLock<HashMap<Uuid, Vec<MeasurementType>>>,
    lookups: AtomicUsize,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_sensor_type(&self, sensor_type: SensorType) {
        self.sensor_types
            .write()
            .await
            .insert(sensor_type.id(), sensor_type);
    }

    /// Adds or replaces a measurement type by id
    pub async fn upsert_measurement_type(&self, measurement_type: MeasurementType) {
        let mut types = self.measurement_types.write().await;
        let entry = types.entry(measurement_type.sensor_type_id).or_default();
        entry.retain(|mt| mt.id != measurement_type.id);
        entry.push(measurement_type);
    }

    /// Number of `find_measurement_types` calls served
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn find_sensor_type(&self, id: Uuid) -> Result<Option<SensorType>, DomainError> {
        Ok(self.sensor_types.read().await.get(&id).cloned())
    }

    async fn find_measurement_types(
        &self,
        sensor_type_id: Uuid,
    ) -> Result<Vec<MeasurementType>, DomainError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .measurement_types
            .read()
            .await
            .get(&sensor_type_id)
            .cloned()
            .unwrap_or_default())
    }
}
