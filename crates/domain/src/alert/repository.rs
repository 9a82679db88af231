use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{AlertQuery, AssetAlert};
use crate::DomainError;

/// Persistence of alert history
///
/// Implementations must keep at most one unresolved alert per
/// (asset sensor, threshold) pair, atomically.
#[async_trait]
pub trait AlertRepository: Send + Sync {
    async fn find_open(
        &self,
        asset_sensor_id: Uuid,
        threshold_id: Uuid,
    ) -> Result<Option<AssetAlert>, DomainError>;

    /// Insert the alert unless an unresolved one already exists for its pair.
    /// Returns true when the alert was inserted.
    async fn open_if_absent(&self, alert: &AssetAlert) -> Result<bool, DomainError>;

    /// Close the pair's unresolved alert, if any, and return it
    async fn resolve_open(
        &self,
        asset_sensor_id: Uuid,
        threshold_id: Uuid,
        resolved_time: DateTime<Utc>,
    ) -> Result<Option<AssetAlert>, DomainError>;

    /// Newest first
    async fn query(&self, query: &AlertQuery) -> Result<Vec<AssetAlert>, DomainError>;
}
