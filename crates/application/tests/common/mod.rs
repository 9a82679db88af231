//! Shared fixtures: an in-memory catalog with one climate sensor type, one
//! asset at a location and one sensor on it.
#![allow(dead_code)]

use application::{IngestionEngine, Repositories};
use domain::asset::{AssetLocation, AssetSensor, Location};
use domain::catalog::{FieldDataType, MeasurementField, MeasurementType, SensorType};
use domain::measurement::RawMeasurement;
use infrastructure::config::ServiceConfig;
use infrastructure::{
    BroadcastEventPublisher, InMemoryAlertRepository, InMemoryAssetDirectory,
    InMemoryCatalogRepository, InMemoryMeasurementRepository, InMemoryThresholdRepository,
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct Fixture {
    pub catalog: Arc<InMemoryCatalogRepository>,
    pub assets: Arc<InMemoryAssetDirectory>,
    pub measurements: Arc<InMemoryMeasurementRepository>,
    pub thresholds: Arc<InMemoryThresholdRepository>,
    pub alerts: Arc<InMemoryAlertRepository>,
    pub events: BroadcastEventPublisher,
    pub sensor_type_id: Uuid,
    pub asset_id: Uuid,
    pub asset_sensor_id: Uuid,
    pub tenant_id: Uuid,
    pub location_id: Uuid,
}

impl Fixture {
    pub async fn new() -> Self {
        let catalog = Arc::new(InMemoryCatalogRepository::new());
        let assets = Arc::new(InMemoryAssetDirectory::new());

        let sensor_type_id = Uuid::new_v4();
        catalog
            .insert_sensor_type(SensorType::new(
                sensor_type_id,
                "EnviroSense",
                Some("Acme".into()),
                None,
            ))
            .await;

        let mt_id = Uuid::new_v4();
        catalog
            .upsert_measurement_type(
                MeasurementType::new(mt_id, sensor_type_id, "climate", 1)
                    .with_field(
                        MeasurementField::numeric(mt_id, "temperature")
                            .unwrap()
                            .with_bounds(Some(-40.0), Some(85.0))
                            .unwrap(),
                    )
                    .with_field(MeasurementField::numeric(mt_id, "humidity").unwrap())
                    .with_field(
                        MeasurementField::new(
                            Uuid::new_v4(),
                            mt_id,
                            "status",
                            "Status",
                            FieldDataType::Text,
                            false,
                            None,
                            None,
                            None,
                        )
                        .unwrap(),
                    ),
            )
            .await;

        let tenant_id = Uuid::new_v4();
        let asset_id = Uuid::new_v4();
        let location_id = Uuid::new_v4();
        assets
            .insert_asset(AssetLocation {
                asset_id,
                tenant_id: Some(tenant_id),
                location: Some(Location {
                    id: location_id,
                    name: "Cold room".into(),
                }),
            })
            .await;

        let asset_sensor_id = Uuid::new_v4();
        assets
            .insert_sensor(
                AssetSensor::new(asset_sensor_id, asset_id, Some(tenant_id), sensor_type_id, "thermometer")
                    .with_mac_address("AA:BB:CC:DD:EE:FF"),
            )
            .await;

        Self {
            catalog,
            assets,
            measurements: Arc::new(InMemoryMeasurementRepository::new()),
            thresholds: Arc::new(InMemoryThresholdRepository::new()),
            alerts: Arc::new(InMemoryAlertRepository::new()),
            events: BroadcastEventPublisher::new(256),
            sensor_type_id,
            asset_id,
            asset_sensor_id,
            tenant_id,
            location_id,
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            catalog: self.catalog.clone(),
            assets: self.assets.clone(),
            measurements: self.measurements.clone(),
            thresholds: self.thresholds.clone(),
            alerts: self.alerts.clone(),
        }
    }

    pub fn engine(&self) -> IngestionEngine {
        self.engine_with(ServiceConfig::default())
    }

    pub fn engine_with(&self, config: ServiceConfig) -> IngestionEngine {
        IngestionEngine::build(self.repositories(), Arc::new(self.events.clone()), &config)
    }
}

pub fn raw(value: serde_json::Value) -> RawMeasurement {
    RawMeasurement::new(value)
}

/// Poll until `check` holds or a second has passed
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
