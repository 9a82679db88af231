use async_trait::async_trait;
use domain::DomainEvent;
use domain::event::EventPublisher;
use sqlx::PgPool;

/// Appends domain events to the `events` table
pub struct PostgresEventPublisher {
    pool: PgPool,
}

impl PostgresEventPublisher {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reading notifications are high-volume and already stored as facts
    fn should_persist(event: &DomainEvent) -> bool {
        !matches!(event, DomainEvent::MeasurementsRecorded { .. })
    }
}

#[async_trait]
impl EventPublisher for PostgresEventPublisher {
    async fn publish(
        &self,
        event: DomainEvent,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if !Self::should_persist(&event) {
            return Ok(());
        }

        let payload = serde_json::to_value(&event)?;

        sqlx::query(
            r#"
            INSERT INTO events (event_type, payload, occurred_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(event.event_type())
        .bind(payload)
        .bind(event.timestamp())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn publish_batch(
        &self,
        events: Vec<DomainEvent>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if events.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;

        for event in events.iter().filter(|e| Self::should_persist(e)) {
            let payload = serde_json::to_value(event)?;

            sqlx::query(
                r#"
                INSERT INTO events (event_type, payload, occurred_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(event.event_type())
            .bind(payload)
            .bind(event.timestamp())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
