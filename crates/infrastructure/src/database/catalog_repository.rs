use async_trait::async_trait;
use domain::DomainError;
use domain::catalog::{CatalogRepository, FieldDataType, MeasurementField, MeasurementType, SensorType};
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

use super::{corrupt, map_sqlx_error};

/// Read-only catalog queries
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn find_sensor_type(&self, id: Uuid) -> Result<Option<SensorType>, DomainError> {
        let row = sqlx::query(
            "SELECT id, name, manufacturer, model, active FROM sensor_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut sensor_type = SensorType::new(
            row.try_get("id").map_err(map_sqlx_error)?,
            row.try_get::<String, _>("name").map_err(map_sqlx_error)?,
            row.try_get("manufacturer").map_err(map_sqlx_error)?,
            row.try_get("model").map_err(map_sqlx_error)?,
        );
        if !row.try_get::<bool, _>("active").map_err(map_sqlx_error)? {
            sensor_type.deactivate();
        }
        Ok(Some(sensor_type))
    }

    async fn find_measurement_types(
        &self,
        sensor_type_id: Uuid,
    ) -> Result<Vec<MeasurementType>, DomainError> {
        let type_rows = sqlx::query(
            r#"
            SELECT id, sensor_type_id, name, min_value, max_value, schema_version, active
            FROM measurement_types
            WHERE sensor_type_id = $1
            ORDER BY schema_version, name
            "#,
        )
        .bind(sensor_type_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut types = Vec::with_capacity(type_rows.len());
        for row in &type_rows {
            let mut mt = MeasurementType::new(
                row.try_get("id").map_err(map_sqlx_error)?,
                row.try_get("sensor_type_id").map_err(map_sqlx_error)?,
                row.try_get::<String, _>("name").map_err(map_sqlx_error)?,
                row.try_get("schema_version").map_err(map_sqlx_error)?,
            );
            mt.min_value = row.try_get("min_value").map_err(map_sqlx_error)?;
            mt.max_value = row.try_get("max_value").map_err(map_sqlx_error)?;
            mt.active = row.try_get("active").map_err(map_sqlx_error)?;
            types.push(mt);
        }

        if types.is_empty() {
            return Ok(types);
        }

        let ids: Vec<Uuid> = types.iter().map(|mt| mt.id).collect();
        let field_rows = sqlx::query(
            r#"
            SELECT id, measurement_type_id, name, label, data_type, required, unit, min_value, max_value
            FROM measurement_fields
            WHERE measurement_type_id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut fields: HashMap<Uuid, Vec<MeasurementField>> = HashMap::new();
        for row in &field_rows {
            let data_type: String = row.try_get("data_type").map_err(map_sqlx_error)?;
            let field = MeasurementField {
                id: row.try_get("id").map_err(map_sqlx_error)?,
                measurement_type_id: row.try_get("measurement_type_id").map_err(map_sqlx_error)?,
                name: row.try_get("name").map_err(map_sqlx_error)?,
                label: row.try_get("label").map_err(map_sqlx_error)?,
                data_type: data_type.parse::<FieldDataType>().map_err(corrupt)?,
                required: row.try_get("required").map_err(map_sqlx_error)?,
                unit: row
                    .try_get::<Option<String>, _>("unit")
                    .map_err(map_sqlx_error)?
                    .filter(|u| !u.trim().is_empty()),
                min: row.try_get("min_value").map_err(map_sqlx_error)?,
                max: row.try_get("max_value").map_err(map_sqlx_error)?,
            };
            fields.entry(field.measurement_type_id).or_default().push(field);
        }

        for mt in &mut types {
            mt.fields = fields.remove(&mt.id).unwrap_or_default();
        }
        Ok(types)
    }
}
