use async_trait::async_trait;
use chrono::Utc;
use domain::alert::{AlertRepository, AssetAlert};
use domain::event::EventPublisher;
use domain::{DomainError, DomainEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::threshold::ThresholdEvaluator;

/// One numeric value waiting to be checked against its threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertJob {
    pub asset_sensor_id: Uuid,
    pub asset_id: Uuid,
    pub measurement_field: String,
    pub value: f64,
    /// MAC address the reading arrived with, copied onto any alert it opens
    #[serde(default)]
    pub mac_address: Option<String>,
}

/// What processing a job did to the (sensor, threshold) pair
#[derive(Debug, Clone, PartialEq)]
pub enum AlertTransition {
    /// No active threshold for the field
    NotApplicable,
    /// Normal -> Breached
    Opened(AssetAlert),
    /// Breached -> Breached
    AlreadyOpen { threshold_id: Uuid },
    /// Breached -> Normal
    Resolved(AssetAlert),
    /// Normal -> Normal
    Unchanged { threshold_id: Uuid },
}

/// Work done by the dispatcher's workers
#[async_trait]
pub trait AlertJobHandler: Send + Sync {
    async fn handle(&self, job: &AlertJob) -> Result<AlertTransition, DomainError>;
}

/// Drives the open/resolve state machine of alerts per (sensor, threshold).
///
/// Deduplication relies on `AlertRepository::open_if_absent` being atomic,
/// so concurrent breaches of the same pair open exactly one alert.
pub struct AlertLifecycleManager {
    evaluator: ThresholdEvaluator,
    alerts: Arc<dyn AlertRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl AlertLifecycleManager {
    pub fn new(
        evaluator: ThresholdEvaluator,
        alerts: Arc<dyn AlertRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            evaluator,
            alerts,
            event_publisher,
        }
    }

    pub async fn process(&self, job: &AlertJob) -> Result<AlertTransition, DomainError> {
        let Some(threshold) = self
            .evaluator
            .governing_threshold(job.asset_sensor_id, &job.measurement_field)
            .await?
        else {
            return Ok(AlertTransition::NotApplicable);
        };

        match threshold.classify(job.value) {
            Some(alert_type) => {
                let alert =
                    AssetAlert::open(&threshold, job.asset_id, alert_type, job.value, Utc::now())
                        .with_mac_address(job.mac_address.clone());

                if self.alerts.open_if_absent(&alert).await? {
                    info!(
                        alert_id = %alert.id,
                        asset_sensor_id = %alert.asset_sensor_id,
                        field = %alert.measurement_field,
                        severity = %alert.severity,
                        value = job.value,
                        "🚨 Alert opened"
                    );
                    self.publish(DomainEvent::alert_opened(alert.clone())).await;
                    Ok(AlertTransition::Opened(alert))
                } else {
                    debug!(
                        asset_sensor_id = %job.asset_sensor_id,
                        threshold_id = %threshold.id,
                        "Alert already open, skipping"
                    );
                    Ok(AlertTransition::AlreadyOpen {
                        threshold_id: threshold.id,
                    })
                }
            }
            None => {
                match self
                    .alerts
                    .resolve_open(job.asset_sensor_id, threshold.id, Utc::now())
                    .await?
                {
                    Some(alert) => {
                        info!(
                            alert_id = %alert.id,
                            asset_sensor_id = %alert.asset_sensor_id,
                            value = job.value,
                            "✅ Alert resolved"
                        );
                        self.publish(DomainEvent::alert_resolved(alert.clone())).await;
                        Ok(AlertTransition::Resolved(alert))
                    }
                    None => Ok(AlertTransition::Unchanged {
                        threshold_id: threshold.id,
                    }),
                }
            }
        }
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(e) = self.event_publisher.publish(event).await {
            warn!(error = %e, "Failed to publish alert event");
        }
    }
}

#[async_trait]
impl AlertJobHandler for AlertLifecycleManager {
    async fn handle(&self, job: &AlertJob) -> Result<AlertTransition, DomainError> {
        self.process(job).await
    }
}
