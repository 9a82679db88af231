use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod publisher;
pub use publisher::EventPublisher;

use crate::alert::AssetAlert;

/// Domain events that can occur in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// A reading was persisted as one or more measurement facts
    MeasurementsRecorded {
        asset_sensor_id: Uuid,
        tenant_id: Option<Uuid>,
        fact_count: usize,
        reading_time: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    /// A value breached a threshold with no alert open for the pair
    AlertOpened {
        alert: AssetAlert,
        timestamp: DateTime<Utc>,
    },

    /// A value came back within bounds and closed the open alert
    AlertResolved {
        alert: AssetAlert,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Create a MeasurementsRecorded event
    pub fn measurements_recorded(
        asset_sensor_id: Uuid,
        tenant_id: Option<Uuid>,
        fact_count: usize,
        reading_time: DateTime<Utc>,
    ) -> Self {
        Self::MeasurementsRecorded {
            asset_sensor_id,
            tenant_id,
            fact_count,
            reading_time,
            timestamp: Utc::now(),
        }
    }

    /// Create an AlertOpened event
    pub fn alert_opened(alert: AssetAlert) -> Self {
        Self::AlertOpened {
            alert,
            timestamp: Utc::now(),
        }
    }

    /// Create an AlertResolved event
    pub fn alert_resolved(alert: AssetAlert) -> Self {
        Self::AlertResolved {
            alert,
            timestamp: Utc::now(),
        }
    }

    /// Get the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::MeasurementsRecorded { timestamp, .. } => *timestamp,
            Self::AlertOpened { timestamp, .. } => *timestamp,
            Self::AlertResolved { timestamp, .. } => *timestamp,
        }
    }

    /// Get the event type as string
    pub fn event_type(&self) -> &str {
        match self {
            Self::MeasurementsRecorded { .. } => "MeasurementsRecorded",
            Self::AlertOpened { .. } => "AlertOpened",
            Self::AlertResolved { .. } => "AlertResolved",
        }
    }

    /// Tenant the event belongs to, when known
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            Self::MeasurementsRecorded { tenant_id, .. } => *tenant_id,
            Self::AlertOpened { alert, .. } | Self::AlertResolved { alert, .. } => alert.tenant_id,
        }
    }
}
