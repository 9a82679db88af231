use domain::DomainError;
use domain::measurement::MeasurementFact;
use domain::threshold::{SensorThreshold, ThresholdRepository, Verdict};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Classifies measurement values against a sensor field's active threshold
pub struct ThresholdEvaluator {
    thresholds: Arc<dyn ThresholdRepository>,
}

impl ThresholdEvaluator {
    pub fn new(thresholds: Arc<dyn ThresholdRepository>) -> Self {
        Self { thresholds }
    }

    /// The threshold that governs a sensor field, if any.
    ///
    /// Storage keeps at most one active threshold per pair; should more come
    /// back, the first active one wins.
    pub async fn governing_threshold(
        &self,
        asset_sensor_id: Uuid,
        measurement_field: &str,
    ) -> Result<Option<SensorThreshold>, DomainError> {
        let candidates = self
            .thresholds
            .find_active(asset_sensor_id, measurement_field)
            .await?;

        if candidates.len() > 1 {
            warn!(
                asset_sensor_id = %asset_sensor_id,
                field = measurement_field,
                count = candidates.len(),
                "More than one active threshold for sensor field"
            );
        }

        Ok(candidates.into_iter().find(|t| t.is_active))
    }

    pub async fn evaluate(
        &self,
        asset_sensor_id: Uuid,
        measurement_field: &str,
        value: f64,
    ) -> Result<Verdict, DomainError> {
        Ok(self
            .governing_threshold(asset_sensor_id, measurement_field)
            .await?
            .map_or(Verdict::NotApplicable, |t| Verdict::for_threshold(&t, value)))
    }

    /// Text and boolean facts are never evaluated
    pub async fn evaluate_fact(&self, fact: &MeasurementFact) -> Result<Verdict, DomainError> {
        match fact.numeric_value() {
            Some(value) => {
                self.evaluate(fact.asset_sensor_id, &fact.field_name, value)
                    .await
            }
            None => Ok(Verdict::NotApplicable),
        }
    }
}
