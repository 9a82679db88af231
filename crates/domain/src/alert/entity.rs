use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AlertType;
use crate::threshold::{SensorThreshold, Severity};

/// A recorded threshold breach with an open/resolved lifecycle.
///
/// Keeps a snapshot of the field name and trigger value so it stays
/// meaningful after its threshold is deactivated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAlert {
    pub id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub asset_id: Uuid,
    pub asset_sensor_id: Uuid,
    pub sensor_type_id: Uuid,
    pub mac_address: Option<String>,
    pub threshold_id: Uuid,
    pub measurement_field: String,
    pub alert_time: DateTime<Utc>,
    pub resolved_time: Option<DateTime<Utc>>,
    pub severity: Severity,
    pub trigger_value: f64,
    pub alert_type: AlertType,
    pub message: String,
    pub is_resolved: bool,
}

impl AssetAlert {
    /// Open a new alert for a value that breached `threshold`
    pub fn open(
        threshold: &SensorThreshold,
        asset_id: Uuid,
        alert_type: AlertType,
        trigger_value: f64,
        alert_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id: threshold.tenant_id,
            asset_id,
            asset_sensor_id: threshold.asset_sensor_id,
            sensor_type_id: threshold.sensor_type_id,
            mac_address: None,
            threshold_id: threshold.id,
            measurement_field: threshold.measurement_field.clone(),
            alert_time,
            resolved_time: None,
            severity: threshold.severity,
            trigger_value,
            alert_type,
            message: threshold.render_message(trigger_value),
            is_resolved: false,
        }
    }

    /// MAC address the breaching reading arrived with
    pub fn with_mac_address(mut self, mac_address: Option<String>) -> Self {
        self.mac_address = mac_address;
        self
    }

    pub fn is_open(&self) -> bool {
        self.resolved_time.is_none()
    }

    /// Close the alert. Already resolved alerts keep their original time.
    pub fn resolve(&mut self, at: DateTime<Utc>) {
        if self.resolved_time.is_none() {
            self.resolved_time = Some(at);
            self.is_resolved = true;
        }
    }
}

/// Filter for reading back alert history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertQuery {
    pub asset_sensor_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub sensor_type_id: Option<Uuid>,
    pub mac_address: Option<String>,
    pub threshold_id: Option<Uuid>,
    #[serde(default)]
    pub open_only: bool,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

impl AlertQuery {
    pub const DEFAULT_LIMIT: u32 = 500;
    pub const MAX_LIMIT: u32 = 5_000;

    pub fn for_pair(asset_sensor_id: Uuid, threshold_id: Uuid) -> Self {
        Self {
            asset_sensor_id: Some(asset_sensor_id),
            threshold_id: Some(threshold_id),
            ..Self::default()
        }
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }

    pub fn matches(&self, alert: &AssetAlert) -> bool {
        self.asset_sensor_id.is_none_or(|id| alert.asset_sensor_id == id)
            && self.asset_id.is_none_or(|id| alert.asset_id == id)
            && self.sensor_type_id.is_none_or(|id| alert.sensor_type_id == id)
            && self.mac_address.as_deref().is_none_or(|mac| {
                alert
                    .mac_address
                    .as_deref()
                    .is_some_and(|m| m.eq_ignore_ascii_case(mac))
            })
            && self.threshold_id.is_none_or(|id| alert.threshold_id == id)
            && (!self.open_only || alert.is_open())
            && self.from.is_none_or(|from| alert.alert_time >= from)
            && self.to.is_none_or(|to| alert.alert_time <= to)
    }
}
