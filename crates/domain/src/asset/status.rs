use serde::{Deserialize, Serialize};

/// Operational status of an installed sensor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

impl SensorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Maintenance => "maintenance",
        }
    }

    /// Inactive sensors are decommissioned and must not report
    pub fn accepts_readings(&self) -> bool {
        !matches!(self, Self::Inactive)
    }

    /// Lenient parse for stored values; anything unknown is treated as active
    pub fn from_db(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "inactive" => Self::Inactive,
            "maintenance" => Self::Maintenance,
            _ => Self::Active,
        }
    }
}
