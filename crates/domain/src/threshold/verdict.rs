use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SensorThreshold, Severity};
use crate::alert::AlertType;

/// Outcome of evaluating one value against a sensor field's active threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    /// No active threshold, or a non-numeric value
    NotApplicable,
    Normal {
        threshold_id: Uuid,
        severity: Severity,
        min_value: Option<f64>,
        max_value: Option<f64>,
    },
    Breached {
        threshold_id: Uuid,
        severity: Severity,
        min_value: Option<f64>,
        max_value: Option<f64>,
        alert_type: AlertType,
        message: String,
    },
}

impl Verdict {
    pub fn for_threshold(threshold: &SensorThreshold, value: f64) -> Self {
        match threshold.classify(value) {
            Some(alert_type) => Self::Breached {
                threshold_id: threshold.id,
                severity: threshold.severity,
                min_value: threshold.min_value,
                max_value: threshold.max_value,
                alert_type,
                message: threshold.render_message(value),
            },
            None => Self::Normal {
                threshold_id: threshold.id,
                severity: threshold.severity,
                min_value: threshold.min_value,
                max_value: threshold.max_value,
            },
        }
    }

    pub fn is_breached(&self) -> bool {
        matches!(self, Self::Breached { .. })
    }

    pub fn is_applicable(&self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    pub fn threshold_id(&self) -> Option<Uuid> {
        match self {
            Self::NotApplicable => None,
            Self::Normal { threshold_id, .. } | Self::Breached { threshold_id, .. } => {
                Some(*threshold_id)
            }
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::NotApplicable => None,
            Self::Normal { severity, .. } | Self::Breached { severity, .. } => Some(*severity),
        }
    }

    pub fn min_value(&self) -> Option<f64> {
        match self {
            Self::NotApplicable => None,
            Self::Normal { min_value, .. } | Self::Breached { min_value, .. } => *min_value,
        }
    }

    pub fn max_value(&self) -> Option<f64> {
        match self {
            Self::NotApplicable => None,
            Self::Normal { max_value, .. } | Self::Breached { max_value, .. } => *max_value,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Breached { message, .. } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::NewThreshold;

    fn threshold() -> SensorThreshold {
        NewThreshold::new(Uuid::new_v4(), "temperature")
            .with_range(Some(10.0), Some(30.0))
            .with_severity(Severity::Critical)
            .into_threshold(None, Uuid::new_v4())
            .unwrap()
    }

    #[test]
    fn test_breached_verdict() {
        let t = threshold();
        let v = Verdict::for_threshold(&t, 35.0);
        assert!(v.is_breached());
        assert_eq!(v.threshold_id(), Some(t.id));
        assert_eq!(v.severity(), Some(Severity::Critical));
        assert_eq!((v.min_value(), v.max_value()), (Some(10.0), Some(30.0)));
        assert!(v.message().unwrap().contains("35"));
    }

    #[test]
    fn test_normal_verdict() {
        let t = threshold();
        let v = Verdict::for_threshold(&t, 20.0);
        assert!(!v.is_breached());
        assert!(v.is_applicable());
        assert_eq!(v.message(), None);
    }

    #[test]
    fn test_not_applicable() {
        let v = Verdict::NotApplicable;
        assert!(!v.is_breached());
        assert!(!v.is_applicable());
        assert_eq!(v.threshold_id(), None);
        assert_eq!(v.severity(), None);
    }
}
