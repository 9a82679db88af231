use chrono::{Duration, Utc};
use domain::alert::{AlertQuery, AlertRepository, AlertType, AssetAlert};
use domain::asset::{AssetDirectory, AssetLocation, AssetSensor};
use domain::measurement::{MeasurementFact, MeasurementQuery, MeasurementRepository, MeasurementValue};
use domain::threshold::{NewThreshold, SensorThreshold, Severity, ThresholdRepository};
use domain::DomainError;
use infrastructure::{
    InMemoryAlertRepository, InMemoryAssetDirectory, InMemoryMeasurementRepository,
    InMemoryThresholdRepository,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

fn threshold(sensor: Uuid, field: &str) -> SensorThreshold {
    NewThreshold::new(sensor, field)
        .with_range(Some(10.0), Some(30.0))
        .with_severity(Severity::Critical)
        .into_threshold(None, Uuid::new_v4())
        .unwrap()
}

fn fact(sensor: Uuid, field: &str, value: f64, minutes_ago: i64) -> MeasurementFact {
    let at = Utc::now() - Duration::minutes(minutes_ago);
    MeasurementFact {
        id: Uuid::new_v4(),
        tenant_id: None,
        asset_sensor_id: sensor,
        sensor_type_id: Uuid::new_v4(),
        mac_address: Some("AA:BB:CC:DD:EE:FF".into()),
        field_name: field.into(),
        label: field.into(),
        unit: "°C".into(),
        value: Some(MeasurementValue::Numeric(value)),
        reading_time: at,
        created_at: at,
    }
}

#[tokio::test]
async fn test_measurements_round_trip_newest_first() {
    let repo = InMemoryMeasurementRepository::new();
    let sensor = Uuid::new_v4();

    let older = fact(sensor, "temperature", 20.5, 10);
    let newer = fact(sensor, "temperature", 21.0, 1);
    repo.create_batch(&[older.clone(), newer.clone()]).await.unwrap();
    repo.create(&fact(Uuid::new_v4(), "temperature", 99.0, 0))
        .await
        .unwrap();

    let found = repo.query(&MeasurementQuery::for_sensor(sensor)).await.unwrap();
    assert_eq!(found, vec![newer, older.clone()]);
    assert_eq!(found[1].unit, "°C");
    assert_eq!(found[1].numeric_value(), Some(20.5));
}

#[tokio::test]
async fn test_duplicate_facts_are_allowed() {
    let repo = InMemoryMeasurementRepository::new();
    let f = fact(Uuid::new_v4(), "temperature", 20.0, 0);
    repo.create(&f).await.unwrap();
    repo.create(&f).await.unwrap();
    assert_eq!(repo.len().await, 2);
}

#[tokio::test]
async fn test_second_active_threshold_conflicts() {
    let repo = InMemoryThresholdRepository::new();
    let sensor = Uuid::new_v4();

    repo.create(&threshold(sensor, "temperature")).await.unwrap();
    let err = repo.create(&threshold(sensor, "temperature")).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));

    // Other fields and inactive thresholds do not conflict
    repo.create(&threshold(sensor, "humidity")).await.unwrap();
    let mut inactive = threshold(sensor, "temperature");
    inactive.is_active = false;
    repo.create(&inactive).await.unwrap();

    let err = repo.set_active(inactive.id, true).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(repo.find_by_sensor(sensor).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_threshold_set_active_and_delete() {
    let repo = InMemoryThresholdRepository::new();
    let t = threshold(Uuid::new_v4(), "temperature");
    repo.create(&t).await.unwrap();

    let updated = repo.set_active(t.id, false).await.unwrap();
    assert!(!updated.is_active);
    assert!(repo.find_active(t.asset_sensor_id, "temperature").await.unwrap().is_empty());

    assert!(repo.delete(t.id).await.unwrap());
    assert!(!repo.delete(t.id).await.unwrap());
    assert!(matches!(
        repo.set_active(t.id, true).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_open_if_absent_is_atomic() {
    let repo = Arc::new(InMemoryAlertRepository::new());
    let t = threshold(Uuid::new_v4(), "temperature");
    let asset = Uuid::new_v4();

    let mut handles = Vec::new();
    for i in 0..16 {
        let repo = repo.clone();
        let alert = AssetAlert::open(&t, asset, AlertType::MaxBreach, 31.0 + i as f64, Utc::now());
        handles.push(tokio::spawn(async move { repo.open_if_absent(&alert).await.unwrap() }));
    }

    let mut inserted = 0;
    for h in handles {
        if h.await.unwrap() {
            inserted += 1;
        }
    }
    assert_eq!(inserted, 1);

    let open = repo
        .query(&AlertQuery {
            open_only: true,
            ..AlertQuery::for_pair(t.asset_sensor_id, t.id)
        })
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
}

#[tokio::test]
async fn test_resolve_open_closes_and_allows_new_alert() {
    let repo = InMemoryAlertRepository::new();
    let t = threshold(Uuid::new_v4(), "temperature");
    let asset = Uuid::new_v4();

    let first = AssetAlert::open(&t, asset, AlertType::MaxBreach, 35.0, Utc::now());
    assert!(repo.open_if_absent(&first).await.unwrap());

    let resolved = repo
        .resolve_open(t.asset_sensor_id, t.id, Utc::now())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, first.id);
    assert!(resolved.is_resolved);
    assert!(repo.find_open(t.asset_sensor_id, t.id).await.unwrap().is_none());
    assert!(repo
        .resolve_open(t.asset_sensor_id, t.id, Utc::now())
        .await
        .unwrap()
        .is_none());

    let second = AssetAlert::open(&t, asset, AlertType::MinBreach, 5.0, Utc::now());
    assert!(repo.open_if_absent(&second).await.unwrap());
    assert_eq!(repo.all().await.len(), 2);
}

#[tokio::test]
async fn test_alert_query_by_sensor_type_and_mac() {
    let repo = InMemoryAlertRepository::new();
    let hot = threshold(Uuid::new_v4(), "temperature");
    let cold = threshold(Uuid::new_v4(), "temperature");
    let asset = Uuid::new_v4();

    let a = AssetAlert::open(&hot, asset, AlertType::MaxBreach, 35.0, Utc::now())
        .with_mac_address(Some("AA:BB:CC:DD:EE:01".into()));
    let b = AssetAlert::open(&cold, asset, AlertType::MinBreach, 2.0, Utc::now());
    assert!(repo.open_if_absent(&a).await.unwrap());
    assert!(repo.open_if_absent(&b).await.unwrap());

    let by_type = repo
        .query(&AlertQuery {
            sensor_type_id: Some(cold.sensor_type_id),
            ..AlertQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0].id, b.id);

    let by_mac = repo
        .query(&AlertQuery {
            mac_address: Some("aa:bb:cc:dd:ee:01".into()),
            ..AlertQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(by_mac.len(), 1);
    assert_eq!(by_mac[0].id, a.id);
}

#[tokio::test]
async fn test_last_reading_cache_ignores_older_readings() {
    let directory = InMemoryAssetDirectory::new();
    let asset_id = Uuid::new_v4();
    directory
        .insert_asset(AssetLocation {
            asset_id,
            tenant_id: None,
            location: None,
        })
        .await;
    let sensor = AssetSensor::new(Uuid::new_v4(), asset_id, None, Uuid::new_v4(), "thermometer");
    directory.insert_sensor(sensor.clone()).await;

    let now = Utc::now();
    directory
        .record_last_reading(sensor.id, json!({"temperature": 21.0}), now)
        .await
        .unwrap();
    directory
        .record_last_reading(sensor.id, json!({"temperature": 5.0}), now - Duration::hours(1))
        .await
        .unwrap();

    let stored = directory.find_sensor(sensor.id).await.unwrap().unwrap();
    assert_eq!(stored.last_value, Some(json!({"temperature": 21.0})));
    assert_eq!(stored.last_reading_time, Some(now));

    let missing = directory
        .record_last_reading(Uuid::new_v4(), json!({}), now)
        .await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));
}
