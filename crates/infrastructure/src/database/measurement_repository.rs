use async_trait::async_trait;
use domain::DomainError;
use domain::measurement::{MeasurementFact, MeasurementQuery, MeasurementRepository, MeasurementValue};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use super::{corrupt, map_sqlx_error};

/// Rows per INSERT statement, well under the 65535 bind parameter limit
const INSERT_CHUNK: usize = 2_000;

const FACT_COLUMNS: &str = "id, tenant_id, asset_sensor_id, sensor_type_id, mac_address, \
     measurement_field_name, label, unit, numeric_value, text_value, boolean_value, \
     reading_time, created_at";

pub struct PostgresMeasurementRepository {
    pool: PgPool,
}

impl PostgresMeasurementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn fact_from_row(row: &PgRow) -> Result<MeasurementFact, DomainError> {
        let value = MeasurementValue::from_slots(
            row.try_get("numeric_value").map_err(map_sqlx_error)?,
            row.try_get("text_value").map_err(map_sqlx_error)?,
            row.try_get("boolean_value").map_err(map_sqlx_error)?,
        )
        .map_err(corrupt)?;

        Ok(MeasurementFact {
            id: row.try_get("id").map_err(map_sqlx_error)?,
            tenant_id: row.try_get("tenant_id").map_err(map_sqlx_error)?,
            asset_sensor_id: row.try_get("asset_sensor_id").map_err(map_sqlx_error)?,
            sensor_type_id: row.try_get("sensor_type_id").map_err(map_sqlx_error)?,
            mac_address: row.try_get("mac_address").map_err(map_sqlx_error)?,
            field_name: row.try_get("measurement_field_name").map_err(map_sqlx_error)?,
            label: row.try_get("label").map_err(map_sqlx_error)?,
            unit: row.try_get("unit").map_err(map_sqlx_error)?,
            value,
            reading_time: row.try_get("reading_time").map_err(map_sqlx_error)?,
            created_at: row.try_get("created_at").map_err(map_sqlx_error)?,
        })
    }
}

#[async_trait]
impl MeasurementRepository for PostgresMeasurementRepository {
    async fn create_batch(&self, facts: &[MeasurementFact]) -> Result<(), DomainError> {
        if facts.is_empty() {
            return Ok(());
        }

        // One transaction for the whole batch; an early return rolls it back
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        for chunk in facts.chunks(INSERT_CHUNK) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO measurement_facts ({FACT_COLUMNS}) "));

            builder.push_values(chunk, |mut b, fact| {
                let (numeric, text, boolean) = MeasurementValue::into_slots(fact.value.as_ref());
                b.push_bind(fact.id)
                    .push_bind(fact.tenant_id)
                    .push_bind(fact.asset_sensor_id)
                    .push_bind(fact.sensor_type_id)
                    .push_bind(fact.mac_address.clone())
                    .push_bind(fact.field_name.clone())
                    .push_bind(fact.label.clone())
                    .push_bind(fact.unit.clone())
                    .push_bind(numeric)
                    .push_bind(text)
                    .push_bind(boolean)
                    .push_bind(fact.reading_time)
                    .push_bind(fact.created_at);
            });

            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        tracing::debug!(facts = facts.len(), "💾 Measurement facts stored");
        Ok(())
    }

    async fn query(&self, query: &MeasurementQuery) -> Result<Vec<MeasurementFact>, DomainError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {FACT_COLUMNS} FROM measurement_facts WHERE TRUE"));

        if let Some(id) = query.asset_sensor_id {
            builder.push(" AND asset_sensor_id = ").push_bind(id);
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
        if let Some(field) = &query.field_name {
            builder
                .push(" AND measurement_field_name = ")
                .push_bind(field.clone());
        }
        if let Some(from) = query.from {
            builder.push(" AND reading_time >= ").push_bind(from);
        }
        if let Some(to) = query.to {
            builder.push(" AND reading_time <= ").push_bind(to);
        }
        builder
            .push(" ORDER BY reading_time DESC LIMIT ")
            .push_bind(i64::from(query.effective_limit()));

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.iter().map(Self::fact_from_row).collect()
    }
}
