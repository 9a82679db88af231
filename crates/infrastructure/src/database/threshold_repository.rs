use async_trait::async_trait;
use domain::DomainError;
use domain::threshold::{SensorThreshold, Severity, ThresholdRepository};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{corrupt, map_sqlx_error};

const THRESHOLD_COLUMNS: &str = "id, tenant_id, asset_sensor_id, sensor_type_id, measurement_field, \
     min_value, max_value, severity, alert_message, is_active, created_at, updated_at";

/// The partial unique index `uq_sensor_thresholds_active_field` turns a
/// second active threshold for a pair into a `Conflict`.
pub struct PostgresThresholdRepository {
    pool: PgPool,
}

impl PostgresThresholdRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn threshold_from_row(row: &PgRow) -> Result<SensorThreshold, DomainError> {
        let severity: String = row.try_get("severity").map_err(map_sqlx_error)?;
        Ok(SensorThreshold {
            id: row.try_get("id").map_err(map_sqlx_error)?,
            tenant_id: row.try_get("tenant_id").map_err(map_sqlx_error)?,
            asset_sensor_id: row.try_get("asset_sensor_id").map_err(map_sqlx_error)?,
            sensor_type_id: row.try_get("sensor_type_id").map_err(map_sqlx_error)?,
            measurement_field: row.try_get("measurement_field").map_err(map_sqlx_error)?,
            min_value: row.try_get("min_value").map_err(map_sqlx_error)?,
            max_value: row.try_get("max_value").map_err(map_sqlx_error)?,
            severity: severity.parse::<Severity>().map_err(corrupt)?,
            alert_message: row.try_get("alert_message").map_err(map_sqlx_error)?,
            is_active: row.try_get("is_active").map_err(map_sqlx_error)?,
            created_at: row.try_get("created_at").map_err(map_sqlx_error)?,
            updated_at: row.try_get("updated_at").map_err(map_sqlx_error)?,
        })
    }
}

#[async_trait]
impl ThresholdRepository for PostgresThresholdRepository {
    async fn create(&self, threshold: &SensorThreshold) -> Result<(), DomainError> {
        sqlx::query(&format!(
            "INSERT INTO sensor_thresholds ({THRESHOLD_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(threshold.id)
        .bind(threshold.tenant_id)
        .bind(threshold.asset_sensor_id)
        .bind(threshold.sensor_type_id)
        .bind(&threshold.measurement_field)
        .bind(threshold.min_value)
        .bind(threshold.max_value)
        .bind(threshold.severity.as_str())
        .bind(&threshold.alert_message)
        .bind(threshold.is_active)
        .bind(threshold.created_at)
        .bind(threshold.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<SensorThreshold>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {THRESHOLD_COLUMNS} FROM sensor_thresholds WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(Self::threshold_from_row).transpose()
    }

    async fn find_active(
        &self,
        asset_sensor_id: Uuid,
        measurement_field: &str,
    ) -> Result<Vec<SensorThreshold>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {THRESHOLD_COLUMNS} FROM sensor_thresholds \
             WHERE asset_sensor_id = $1 AND measurement_field = $2 AND is_active \
             ORDER BY created_at"
        ))
        .bind(asset_sensor_id)
        .bind(measurement_field)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(Self::threshold_from_row).collect()
    }

    async fn find_by_sensor(
        &self,
        asset_sensor_id: Uuid,
    ) -> Result<Vec<SensorThreshold>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {THRESHOLD_COLUMNS} FROM sensor_thresholds \
             WHERE asset_sensor_id = $1 ORDER BY created_at"
        ))
        .bind(asset_sensor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(Self::threshold_from_row).collect()
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<SensorThreshold, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE sensor_thresholds SET is_active = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {THRESHOLD_COLUMNS}"
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Self::threshold_from_row(&row),
            None => Err(DomainError::not_found("SensorThreshold", id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM sensor_thresholds WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
