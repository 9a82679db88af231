mod common;

use async_trait::async_trait;
use common::{Fixture, raw};
use domain::asset::{AssetDirectory, AssetSensor, SensorStatus};
use domain::measurement::{MeasurementFact, MeasurementQuery, MeasurementRepository, MeasurementValue};
use domain::{DomainError, DomainEvent};
use application::ingestion::{BatchIngestionRequest, IngestionRequest};
use application::IngestionEngine;
use infrastructure::config::ServiceConfig;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

// --- Measurement store with fault injection ---

struct FaultyMeasurements {
    delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl FaultyMeasurements {
    fn slow(delay: Duration) -> Self {
        Self {
            delay,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            delay: Duration::ZERO,
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MeasurementRepository for FaultyMeasurements {
    async fn create_batch(&self, _facts: &[MeasurementFact]) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(DomainError::Store("connection reset".into()));
        }
        Ok(())
    }

    async fn query(&self, _query: &MeasurementQuery) -> Result<Vec<MeasurementFact>, DomainError> {
        Ok(Vec::new())
    }
}

fn engine_with_store(fx: &Fixture, store: Arc<dyn MeasurementRepository>) -> IngestionEngine {
    let mut repos = fx.repositories();
    repos.measurements = store;
    IngestionEngine::build(repos, Arc::new(fx.events.clone()), &ServiceConfig::default())
}

fn reading(fx: &Fixture) -> IngestionRequest {
    IngestionRequest::new(fx.asset_sensor_id, fx.sensor_type_id)
}

#[tokio::test]
async fn test_ingest_echoes_tenant_location_and_measurements() {
    let fx = Fixture::new().await;
    let engine = fx.engine();

    let request: IngestionRequest = serde_json::from_value(json!({
        "asset_sensor_id": fx.asset_sensor_id,
        "sensor_type_id": fx.sensor_type_id,
        "measurement_data": {
            "temperature": {"value": 21.5, "label": "Temperature"},
            "status": {"value": "ok"}
        }
    }))
    .unwrap();

    let receipt = engine
        .ingestion
        .ingest(request, &CancellationToken::new(), None)
        .await
        .unwrap();

    assert_eq!(receipt.tenant_id, Some(fx.tenant_id));
    assert_eq!(receipt.asset_id, fx.asset_id);
    assert_eq!(receipt.location_id, Some(fx.location_id));
    assert_eq!(receipt.location_name.as_deref(), Some("Cold room"));
    assert!(receipt.warnings.is_empty());
    assert_eq!(receipt.measurements["temperature"].unit, "°C");
    assert_eq!(
        receipt.measurements["status"].value,
        Some(MeasurementValue::Text("ok".into()))
    );

    let stored = fx
        .measurements
        .query(&MeasurementQuery::for_sensor(fx.asset_sensor_id))
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|f| f.tenant_id == Some(fx.tenant_id)));
    assert!(stored.iter().all(|f| f.mac_address.as_deref() == Some("AA:BB:CC:DD:EE:FF")));

    let warnings_json = serde_json::to_value(&receipt).unwrap();
    assert!(warnings_json.get("warnings").is_none());
}

#[tokio::test]
async fn test_unknown_field_yields_warning() {
    let fx = Fixture::new().await;
    let engine = fx.engine();

    let request = reading(&fx)
        .with_measurement("temperature", raw(json!(25)))
        .with_measurement("bogus_field", raw(json!(1)));
    let receipt = engine
        .ingestion
        .ingest(request, &CancellationToken::new(), None)
        .await
        .unwrap();

    assert_eq!(receipt.measurements.len(), 1);
    assert_eq!(receipt.warnings.len(), 1);
    assert!(receipt.warnings[0].contains("bogus_field"));
    assert_eq!(fx.measurements.len().await, 1);
}

#[tokio::test]
async fn test_request_level_rejections() {
    let fx = Fixture::new().await;
    let engine = fx.engine();
    let cancel = CancellationToken::new();

    let unknown = IngestionRequest::new(Uuid::new_v4(), fx.sensor_type_id)
        .with_measurement("temperature", raw(json!(20)));
    assert!(matches!(
        engine.ingestion.ingest(unknown, &cancel, None).await,
        Err(DomainError::NotFound { entity: "AssetSensor", .. })
    ));

    let mismatch = IngestionRequest::new(fx.asset_sensor_id, Uuid::new_v4())
        .with_measurement("temperature", raw(json!(20)));
    assert!(matches!(
        engine.ingestion.ingest(mismatch, &cancel, None).await,
        Err(DomainError::Validation(_))
    ));

    let nothing_valid = reading(&fx).with_measurement("bogus", raw(json!(1)));
    assert!(matches!(
        engine.ingestion.ingest(nothing_valid, &cancel, None).await,
        Err(DomainError::NoValidMeasurements(_))
    ));

    let bad_mac = reading(&fx)
        .with_measurement("temperature", raw(json!(20)))
        .with_mac_address("zz:zz");
    assert!(matches!(
        engine.ingestion.ingest(bad_mac, &cancel, None).await,
        Err(DomainError::Validation(_))
    ));

    assert!(fx.measurements.is_empty().await);
}

#[tokio::test]
async fn test_inactive_sensor_is_rejected() {
    let fx = Fixture::new().await;
    let retired = AssetSensor::new(
        Uuid::new_v4(),
        fx.asset_id,
        Some(fx.tenant_id),
        fx.sensor_type_id,
        "old thermometer",
    )
    .with_status(SensorStatus::Inactive);
    fx.assets.insert_sensor(retired.clone()).await;

    let engine = fx.engine();
    let request = IngestionRequest::new(retired.id, fx.sensor_type_id)
        .with_measurement("temperature", raw(json!(20)));
    let err = engine
        .ingestion
        .ingest(request, &CancellationToken::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_last_reading_and_event_after_write() {
    let fx = Fixture::new().await;
    let mut events = fx.events.subscribe();
    let engine = fx.engine();

    let at = chrono::Utc::now();
    let request = reading(&fx)
        .with_measurement("temperature", raw(json!(22.0)))
        .with_reading_time(at);
    engine
        .ingestion
        .ingest(request, &CancellationToken::new(), None)
        .await
        .unwrap();

    let sensor = fx
        .assets
        .find_sensor(fx.asset_sensor_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sensor.last_value, Some(json!({"temperature": 22.0})));
    assert_eq!(sensor.last_reading_time, Some(at));

    match events.recv().await.unwrap() {
        DomainEvent::MeasurementsRecorded {
            asset_sensor_id,
            fact_count,
            ..
        } => {
            assert_eq!(asset_sensor_id, fx.asset_sensor_id);
            assert_eq!(fact_count, 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_batch_over_limit_is_rejected_before_any_write() {
    let fx = Fixture::new().await;
    let engine = fx.engine();

    let readings: Vec<_> = (0..1001)
        .map(|_| reading(&fx).with_measurement("temperature", raw(json!(20))))
        .collect();
    let err = engine
        .ingestion
        .ingest_batch(
            BatchIngestionRequest::new(readings),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap_err();

    assert_eq!(err, DomainError::BatchTooLarge { size: 1001, max: 1000 });
    assert!(fx.measurements.is_empty().await);
    assert_eq!(fx.catalog.lookup_count(), 0);
}

#[tokio::test]
async fn test_batch_reports_rejected_readings_by_index() {
    let fx = Fixture::new().await;
    let engine = fx.engine();

    let readings = vec![
        reading(&fx).with_measurement("temperature", raw(json!(20))),
        IngestionRequest::new(Uuid::new_v4(), fx.sensor_type_id)
            .with_measurement("temperature", raw(json!(20))),
        reading(&fx)
            .with_measurement("temperature", raw(json!(21)))
            .with_measurement("humidity", raw(json!(40))),
    ];
    let receipt = engine
        .ingestion
        .ingest_batch(
            BatchIngestionRequest::new(readings),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(receipt.accepted.len(), 2);
    assert_eq!(receipt.rejected.len(), 1);
    assert_eq!(receipt.rejected[0].index, 1);
    assert_eq!(receipt.rejected[0].error, "not_found");
    assert_eq!(receipt.fact_count, 3);
    assert_eq!(fx.measurements.len().await, 3);
}

#[tokio::test]
async fn test_batch_rejects_malformed_entries_individually() {
    let fx = Fixture::new().await;
    let engine = fx.engine();

    let batch: BatchIngestionRequest = serde_json::from_value(json!({
        "readings": [
            {
                "asset_sensor_id": fx.asset_sensor_id,
                "sensor_type_id": fx.sensor_type_id,
                "measurement_data": {"temperature": 22}
            },
            {
                "asset_sensor_id": "not-a-uuid",
                "sensor_type_id": fx.sensor_type_id,
                "measurement_data": {"temperature": 22}
            },
            {
                "asset_sensor_id": fx.asset_sensor_id,
                "sensor_type_id": fx.sensor_type_id,
                "reading_time": "yesterday",
                "measurement_data": {"temperature": 22}
            }
        ]
    }))
    .unwrap();

    let receipt = engine
        .ingestion
        .ingest_batch(batch, &CancellationToken::new(), None)
        .await
        .unwrap();

    assert_eq!(receipt.accepted.len(), 1);
    let rejected: Vec<_> = receipt.rejected.iter().map(|r| (r.index, r.error.as_str())).collect();
    assert_eq!(rejected, vec![(1, "validation_error"), (2, "validation_error")]);
    assert_eq!(fx.measurements.len().await, 1);
}

#[tokio::test]
async fn test_batch_with_no_valid_reading_fails() {
    let fx = Fixture::new().await;
    let engine = fx.engine();

    let readings = vec![reading(&fx).with_measurement("bogus", raw(json!(1)))];
    let err = engine
        .ingestion
        .ingest_batch(
            BatchIngestionRequest::new(readings),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NoValidMeasurements(msg) if msg.contains("reading 0")));

    let empty = engine
        .ingestion
        .ingest_batch(BatchIngestionRequest::default(), &CancellationToken::new(), None)
        .await
        .unwrap_err();
    assert!(matches!(empty, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_store_failure_is_reported() {
    let fx = Fixture::new().await;
    let store = Arc::new(FaultyMeasurements::failing());
    let engine = engine_with_store(&fx, store.clone());
    let mut events = fx.events.subscribe();

    let err = engine
        .ingestion
        .ingest(
            reading(&fx).with_measurement("temperature", raw(json!(20))),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Store(_)));
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    // Nothing happens after a failed write
    assert!(events.try_recv().is_err());
    assert_eq!(engine.dispatcher.stats().submitted, 0);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_exceeded() {
    let fx = Fixture::new().await;
    let engine = engine_with_store(&fx, Arc::new(FaultyMeasurements::slow(Duration::from_secs(10))));

    let err = engine
        .ingestion
        .ingest(
            reading(&fx).with_measurement("temperature", raw(json!(20))),
            &CancellationToken::new(),
            Some(Duration::from_millis(250)),
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::DeadlineExceeded(250));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_write() {
    let fx = Fixture::new().await;
    let engine = engine_with_store(&fx, Arc::new(FaultyMeasurements::slow(Duration::from_secs(1))));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = engine
        .ingestion
        .ingest(
            reading(&fx).with_measurement("temperature", raw(json!(20))),
            &cancel,
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::Cancelled);
}
