use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::DomainError;

/// Which bound a breaching value crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    MinBreach,
    MaxBreach,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MinBreach => "min_breach",
            Self::MaxBreach => "max_breach",
        }
    }
}

impl FromStr for AlertType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min_breach" => Ok(Self::MinBreach),
            "max_breach" => Ok(Self::MaxBreach),
            other => Err(DomainError::Store(format!("Unknown alert type: {other}"))),
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_type_strings() {
        assert_eq!(AlertType::MinBreach.as_str(), "min_breach");
        assert_eq!("max_breach".parse::<AlertType>().unwrap(), AlertType::MaxBreach);
        assert!("over".parse::<AlertType>().is_err());
        assert_eq!(
            serde_json::to_string(&AlertType::MaxBreach).unwrap(),
            "\"max_breach\""
        );
    }
}
