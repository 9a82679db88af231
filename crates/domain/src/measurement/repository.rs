use async_trait::async_trait;

use super::{MeasurementFact, MeasurementQuery};
use crate::DomainError;

/// Persistence of measurement facts
#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// Write all facts or none of them
    async fn create_batch(&self, facts: &[MeasurementFact]) -> Result<(), DomainError>;

    /// Single-fact convenience wrapper around `create_batch`
    async fn create(&self, fact: &MeasurementFact) -> Result<(), DomainError> {
        self.create_batch(std::slice::from_ref(fact)).await
    }

    /// Newest first, bounded by `query.effective_limit()`
    async fn query(&self, query: &MeasurementQuery) -> Result<Vec<MeasurementFact>, DomainError>;
}
