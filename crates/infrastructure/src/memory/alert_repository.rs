use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::DomainError;
use domain::alert::{AlertQuery, AlertRepository, AssetAlert};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Alert history in insertion order. `open_if_absent` checks and inserts
/// under one lock, so at most one alert per pair is ever open.
#[derive(Default)]
pub struct InMemoryAlertRepository {
    alerts: Mutex<Vec<AssetAlert>>,
}

impl InMemoryAlertRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn all(&self) -> Vec<AssetAlert> {
        self.alerts.lock().await.clone()
    }
}

#[async_trait]
impl AlertRepository for InMemoryAlertRepository {
    async fn find_open(
        &self,
        asset_sensor_id: Uuid,
        threshold_id: Uuid,
    ) -> Result<Option<AssetAlert>, DomainError> {
        Ok(self
            .alerts
            .lock()
            .await
            .iter()
            .find(|a| {
                a.is_open() && a.asset_sensor_id == asset_sensor_id && a.threshold_id == threshold_id
            })
            .cloned())
    }

    async fn open_if_absent(&self, alert: &AssetAlert) -> Result<bool, DomainError> {
        let mut alerts = self.alerts.lock().await;
        let exists = alerts.iter().any(|a| {
            a.is_open()
                && a.asset_sensor_id == alert.asset_sensor_id
                && a.threshold_id == alert.threshold_id
        });
        if exists {
            return Ok(false);
        }
        alerts.push(alert.clone());
        Ok(true)
    }

    async fn resolve_open(
        &self,
        asset_sensor_id: Uuid,
        threshold_id: Uuid,
        resolved_time: DateTime<Utc>,
    ) -> Result<Option<AssetAlert>, DomainError> {
        let mut alerts = self.alerts.lock().await;
        let open = alerts.iter_mut().find(|a| {
            a.is_open() && a.asset_sensor_id == asset_sensor_id && a.threshold_id == threshold_id
        });
        Ok(open.map(|alert| {
            alert.resolve(resolved_time);
            alert.clone()
        }))
    }

    async fn query(&self, query: &AlertQuery) -> Result<Vec<AssetAlert>, DomainError> {
        let mut found: Vec<AssetAlert> = self
            .alerts
            .lock()
            .await
            .iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.alert_time.cmp(&a.alert_time));
        found.truncate(query.effective_limit() as usize);
        Ok(found)
    }
}
