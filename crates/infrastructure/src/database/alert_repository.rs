use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::DomainError;
use domain::alert::{AlertQuery, AlertRepository, AlertType, AssetAlert};
use domain::threshold::Severity;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{corrupt, map_sqlx_error};

const ALERT_COLUMNS: &str = "id, tenant_id, asset_id, asset_sensor_id, sensor_type_id, \
     mac_address, threshold_id, measurement_field, alert_time, resolved_time, severity, \
     trigger_value, alert_type, message, is_resolved";

/// Alert history. The partial unique index `uq_asset_alerts_open_pair`
/// keeps at most one unresolved alert per (sensor, threshold).
pub struct PostgresAlertRepository {
    pool: PgPool,
}

impl PostgresAlertRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn alert_from_row(row: &PgRow) -> Result<AssetAlert, DomainError> {
        let severity: String = row.try_get("severity").map_err(map_sqlx_error)?;
        let alert_type: String = row.try_get("alert_type").map_err(map_sqlx_error)?;
        Ok(AssetAlert {
            id: row.try_get("id").map_err(map_sqlx_error)?,
            tenant_id: row.try_get("tenant_id").map_err(map_sqlx_error)?,
            asset_id: row.try_get("asset_id").map_err(map_sqlx_error)?,
            asset_sensor_id: row.try_get("asset_sensor_id").map_err(map_sqlx_error)?,
            sensor_type_id: row.try_get("sensor_type_id").map_err(map_sqlx_error)?,
            mac_address: row.try_get("mac_address").map_err(map_sqlx_error)?,
            threshold_id: row.try_get("threshold_id").map_err(map_sqlx_error)?,
            measurement_field: row.try_get("measurement_field").map_err(map_sqlx_error)?,
            alert_time: row.try_get("alert_time").map_err(map_sqlx_error)?,
            resolved_time: row.try_get("resolved_time").map_err(map_sqlx_error)?,
            severity: severity.parse::<Severity>().map_err(corrupt)?,
            trigger_value: row.try_get("trigger_value").map_err(map_sqlx_error)?,
            alert_type: alert_type.parse::<AlertType>().map_err(corrupt)?,
            message: row.try_get("message").map_err(map_sqlx_error)?,
            is_resolved: row.try_get("is_resolved").map_err(map_sqlx_error)?,
        })
    }
}

#[async_trait]
impl AlertRepository for PostgresAlertRepository {
    async fn find_open(
        &self,
        asset_sensor_id: Uuid,
        threshold_id: Uuid,
    ) -> Result<Option<AssetAlert>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {ALERT_COLUMNS} FROM asset_alerts \
             WHERE asset_sensor_id = $1 AND threshold_id = $2 AND resolved_time IS NULL"
        ))
        .bind(asset_sensor_id)
        .bind(threshold_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(Self::alert_from_row).transpose()
    }

    async fn open_if_absent(&self, alert: &AssetAlert) -> Result<bool, DomainError> {
        let result = sqlx::query(&format!(
            "INSERT INTO asset_alerts ({ALERT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             ON CONFLICT (asset_sensor_id, threshold_id) WHERE resolved_time IS NULL DO NOTHING"
        ))
        .bind(alert.id)
        .bind(alert.tenant_id)
        .bind(alert.asset_id)
        .bind(alert.asset_sensor_id)
        .bind(alert.sensor_type_id)
        .bind(&alert.mac_address)
        .bind(alert.threshold_id)
        .bind(&alert.measurement_field)
        .bind(alert.alert_time)
        .bind(alert.resolved_time)
        .bind(alert.severity.as_str())
        .bind(alert.trigger_value)
        .bind(alert.alert_type.as_str())
        .bind(&alert.message)
        .bind(alert.is_resolved)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn resolve_open(
        &self,
        asset_sensor_id: Uuid,
        threshold_id: Uuid,
        resolved_time: DateTime<Utc>,
    ) -> Result<Option<AssetAlert>, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE asset_alerts SET resolved_time = $3, is_resolved = TRUE \
             WHERE asset_sensor_id = $1 AND threshold_id = $2 AND resolved_time IS NULL \
             RETURNING {ALERT_COLUMNS}"
        ))
        .bind(asset_sensor_id)
        .bind(threshold_id)
        .bind(resolved_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(Self::alert_from_row).transpose()
    }

    async fn query(&self, query: &AlertQuery) -> Result<Vec<AssetAlert>, DomainError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ALERT_COLUMNS} FROM asset_alerts WHERE TRUE"));

        if let Some(id) = query.asset_sensor_id {
            builder.push(" AND asset_sensor_id = ").push_bind(id);
        }
        if let Some(id) = query.asset_id {
            builder.push(" AND asset_id = ").push_bind(id);
        }
        if let Some(id) = query.sensor_type_id {
            builder.push(" AND sensor_type_id = ").push_bind(id);
        }
        if let Some(mac) = &query.mac_address {
            builder
                .push(" AND lower(mac_address) = lower(")
                .push_bind(mac.clone())
                .push(")");
        }
        if let Some(id) = query.threshold_id {
            builder.push(" AND threshold_id = ").push_bind(id);
        }
        if query.open_only {
            builder.push(" AND resolved_time IS NULL");
        }
        if let Some(from) = query.from {
            builder.push(" AND alert_time >= ").push_bind(from);
        }
        if let Some(to) = query.to {
            builder.push(" AND alert_time <= ").push_bind(to);
        }
        builder
            .push(" ORDER BY alert_time DESC LIMIT ")
            .push_bind(i64::from(query.effective_limit()));

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(Self::alert_from_row).collect()
    }
}
