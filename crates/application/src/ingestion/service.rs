use chrono::Utc;
use domain::asset::AssetDirectory;
use domain::event::EventPublisher;
use domain::measurement::{MeasurementFact, MeasurementRepository};
use domain::{DomainError, DomainEvent};
use infrastructure::config::IngestionConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::normalizer::{ReadingContext, ReadingNormalizer};
use super::request::{
    BatchIngestionRequest, BatchReceipt, IngestionReceipt, IngestionRequest,
    NormalizedMeasurement, RejectedReading,
};
use crate::alert::{AlertDispatcher, AlertJob};

/// A reading that passed validation and normalization, not yet stored
struct PreparedReading {
    receipt: IngestionReceipt,
    facts: Vec<MeasurementFact>,
}

/// Accepts sensor readings, stores them as measurement facts and hands
/// numeric values to the alert dispatcher once the write is acknowledged.
pub struct IngestionService {
    assets: Arc<dyn AssetDirectory>,
    normalizer: ReadingNormalizer,
    measurements: Arc<dyn MeasurementRepository>,
    dispatcher: Arc<AlertDispatcher>,
    event_publisher: Arc<dyn EventPublisher>,
    config: IngestionConfig,
}

impl IngestionService {
    pub fn new(
        assets: Arc<dyn AssetDirectory>,
        normalizer: ReadingNormalizer,
        measurements: Arc<dyn MeasurementRepository>,
        dispatcher: Arc<AlertDispatcher>,
        event_publisher: Arc<dyn EventPublisher>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            assets,
            normalizer,
            measurements,
            dispatcher,
            event_publisher,
            config,
        }
    }

    pub fn config(&self) -> &IngestionConfig {
        &self.config
    }

    /// Validate, normalize and store one reading.
    ///
    /// The write honours `cancel` and `deadline` (falling back to the
    /// configured write timeout). Alerting happens afterwards and never
    /// affects the result.
    pub async fn ingest(
        &self,
        request: IngestionRequest,
        cancel: &CancellationToken,
        deadline: Option<Duration>,
    ) -> Result<IngestionReceipt, DomainError> {
        let prepared = self.prepare(&request).await?;
        self.write(&prepared.facts, cancel, deadline).await?;

        info!(
            asset_sensor_id = %prepared.receipt.asset_sensor_id,
            facts = prepared.facts.len(),
            warnings = prepared.receipt.warnings.len(),
            "Reading ingested"
        );
        self.after_write(&prepared).await;
        Ok(prepared.receipt)
    }

    /// Ingest several readings with one all-or-nothing write.
    ///
    /// Readings that fail validation are reported by index and do not
    /// block the others.
    pub async fn ingest_batch(
        &self,
        batch: BatchIngestionRequest,
        cancel: &CancellationToken,
        deadline: Option<Duration>,
    ) -> Result<BatchReceipt, DomainError> {
        let size = batch.readings.len();
        if size > self.config.max_batch_size {
            return Err(DomainError::BatchTooLarge {
                size,
                max: self.config.max_batch_size,
            });
        }
        if size == 0 {
            return Err(DomainError::Validation(
                "readings must contain at least one reading".to_string(),
            ));
        }

        let mut prepared = Vec::with_capacity(size);
        let mut rejected = Vec::new();
        for (index, entry) in batch.readings.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(DomainError::Cancelled);
            }
            let outcome = match entry.into_request() {
                Ok(request) => self.prepare(&request).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(reading) => prepared.push(reading),
                Err(e) => {
                    debug!(index, error = %e, "Batch reading rejected");
                    rejected.push(RejectedReading::new(index, &e));
                }
            }
        }

        if prepared.is_empty() {
            let summary = rejected
                .iter()
                .map(|r| format!("reading {}: {}", r.index, r.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DomainError::NoValidMeasurements(summary));
        }

        let facts: Vec<MeasurementFact> = prepared
            .iter()
            .flat_map(|p| p.facts.iter().cloned())
            .collect();
        self.write(&facts, cancel, deadline).await?;

        info!(
            readings = size,
            accepted = prepared.len(),
            rejected = rejected.len(),
            facts = facts.len(),
            "Batch ingested"
        );

        for reading in &prepared {
            self.after_write(reading).await;
        }

        Ok(BatchReceipt {
            accepted: prepared.into_iter().map(|p| p.receipt).collect(),
            rejected,
            fact_count: facts.len(),
        })
    }

    async fn prepare(&self, request: &IngestionRequest) -> Result<PreparedReading, DomainError> {
        let validated = request.validate()?;

        let sensor = self
            .assets
            .find_sensor(validated.asset_sensor_id)
            .await?
            .ok_or_else(|| DomainError::not_found("AssetSensor", validated.asset_sensor_id))?;

        if !sensor.status.accepts_readings() {
            return Err(DomainError::Validation(format!(
                "asset sensor {} is {} and does not accept readings",
                sensor.id,
                sensor.status.as_str()
            )));
        }
        if sensor.sensor_type_id != validated.sensor_type_id {
            return Err(DomainError::Validation(format!(
                "sensor_type_id {} does not match the sensor's registered type {}",
                validated.sensor_type_id, sensor.sensor_type_id
            )));
        }

        let asset = self
            .assets
            .find_asset_location(sensor.asset_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Asset", sensor.asset_id))?;

        let ctx = ReadingContext {
            tenant_id: sensor.tenant_id.or(asset.tenant_id),
            asset_sensor_id: sensor.id,
            sensor_type_id: sensor.sensor_type_id,
            mac_address: validated.mac_address.or_else(|| sensor.mac_address.clone()),
            reading_time: request.reading_time.unwrap_or_else(Utc::now),
        };

        let normalized = self
            .normalizer
            .normalize(&ctx, &request.measurement_data)
            .await?;
        for warning in &normalized.warnings {
            debug!(asset_sensor_id = %sensor.id, warning = %warning, "Measurement field skipped");
        }

        let receipt = IngestionReceipt {
            asset_sensor_id: sensor.id,
            sensor_type_id: sensor.sensor_type_id,
            tenant_id: ctx.tenant_id,
            asset_id: sensor.asset_id,
            location_id: asset.location.as_ref().map(|l| l.id),
            location_name: asset.location.map(|l| l.name),
            reading_time: ctx.reading_time,
            measurements: normalized
                .facts
                .iter()
                .map(|f| (f.field_name.clone(), NormalizedMeasurement::from(f)))
                .collect(),
            warnings: normalized.warnings,
        };

        Ok(PreparedReading {
            receipt,
            facts: normalized.facts,
        })
    }

    async fn write(
        &self,
        facts: &[MeasurementFact],
        cancel: &CancellationToken,
        deadline: Option<Duration>,
    ) -> Result<(), DomainError> {
        let budget = deadline.unwrap_or_else(|| self.config.write_timeout());

        // Losing either race drops the write future, which rolls back its transaction
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(DomainError::Cancelled),
            result = tokio::time::timeout(budget, self.measurements.create_batch(facts)) => {
                result.map_err(|_| DomainError::DeadlineExceeded(budget.as_millis() as u64))?
            }
        }
    }

    /// Best-effort follow-up work; failures are logged only
    async fn after_write(&self, reading: &PreparedReading) {
        let receipt = &reading.receipt;

        if let Err(e) = self
            .assets
            .record_last_reading(
                receipt.asset_sensor_id,
                receipt.last_value(),
                receipt.reading_time,
            )
            .await
        {
            warn!(asset_sensor_id = %receipt.asset_sensor_id, error = %e, "Failed to update last reading");
        }

        for fact in &reading.facts {
            let Some(value) = fact.numeric_value() else {
                continue;
            };
            let job = AlertJob {
                asset_sensor_id: fact.asset_sensor_id,
                asset_id: receipt.asset_id,
                measurement_field: fact.field_name.clone(),
                value,
                mac_address: fact.mac_address.clone(),
            };
            if let Err(e) = self.dispatcher.submit(job) {
                warn!(
                    asset_sensor_id = %fact.asset_sensor_id,
                    field = %fact.field_name,
                    error = %e,
                    "Alert evaluation skipped"
                );
            }
        }

        let event = DomainEvent::measurements_recorded(
            receipt.asset_sensor_id,
            receipt.tenant_id,
            reading.facts.len(),
            receipt.reading_time,
        );
        if let Err(e) = self.event_publisher.publish(event).await {
            warn!(error = %e, "Failed to publish MeasurementsRecorded event");
        }
    }
}
