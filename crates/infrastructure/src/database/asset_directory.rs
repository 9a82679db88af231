use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::DomainError;
use domain::asset::{AssetDirectory, AssetLocation, AssetSensor, Location, SensorStatus};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::map_sqlx_error;

/// Asset registry lookups against the CRUD tables
pub struct PostgresAssetDirectory {
    pool: PgPool,
}

impl PostgresAssetDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetDirectory for PostgresAssetDirectory {
    async fn find_sensor(&self, asset_sensor_id: Uuid) -> Result<Option<AssetSensor>, DomainError> {
        // Tenant comes from the owning asset
        let row = sqlx::query(
            r#"
            SELECT s.id, s.asset_id, a.tenant_id, s.sensor_type_id, s.name, s.mac_address,
                   s.status, s.last_value, s.last_reading_time
            FROM asset_sensors s
            JOIN assets a ON a.id = s.asset_id
            WHERE s.id = $1
            "#,
        )
        .bind(asset_sensor_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let status: String = row.try_get("status").map_err(map_sqlx_error)?;
        Ok(Some(AssetSensor {
            id: row.try_get("id").map_err(map_sqlx_error)?,
            asset_id: row.try_get("asset_id").map_err(map_sqlx_error)?,
            tenant_id: row.try_get("tenant_id").map_err(map_sqlx_error)?,
            sensor_type_id: row.try_get("sensor_type_id").map_err(map_sqlx_error)?,
            name: row.try_get("name").map_err(map_sqlx_error)?,
            mac_address: row.try_get("mac_address").map_err(map_sqlx_error)?,
            status: SensorStatus::from_db(&status),
            last_value: row.try_get("last_value").map_err(map_sqlx_error)?,
            last_reading_time: row.try_get("last_reading_time").map_err(map_sqlx_error)?,
        }))
    }

    async fn find_asset_location(
        &self,
        asset_id: Uuid,
    ) -> Result<Option<AssetLocation>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT a.id, a.tenant_id, l.id AS location_id, l.name AS location_name
            FROM assets a
            LEFT JOIN locations l ON l.id = a.location_id
            WHERE a.id = $1
            "#,
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let location_id: Option<Uuid> = row.try_get("location_id").map_err(map_sqlx_error)?;
        let location_name: Option<String> =
            row.try_get("location_name").map_err(map_sqlx_error)?;

        Ok(Some(AssetLocation {
            asset_id: row.try_get("id").map_err(map_sqlx_error)?,
            tenant_id: row.try_get("tenant_id").map_err(map_sqlx_error)?,
            location: location_id.map(|id| Location {
                id,
                name: location_name.unwrap_or_default(),
            }),
        }))
    }

    async fn record_last_reading(
        &self,
        asset_sensor_id: Uuid,
        value: serde_json::Value,
        reading_time: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        // Older readings arriving late must not roll the cache back
        sqlx::query(
            r#"
            UPDATE asset_sensors
            SET last_value = $2, last_reading_time = $3
            WHERE id = $1 AND (last_reading_time IS NULL OR last_reading_time <= $3)
            "#,
        )
        .bind(asset_sensor_id)
        .bind(value)
        .bind(reading_time)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
