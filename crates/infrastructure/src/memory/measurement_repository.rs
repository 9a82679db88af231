use async_trait::async_trait;
use domain::DomainError;
use domain::measurement::{MeasurementFact, MeasurementQuery, MeasurementRepository};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryMeasurementRepository {
    facts: RwLock<Vec<MeasurementFact>>,
}

impl InMemoryMeasurementRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.facts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.facts.read().await.is_empty()
    }
}

#[async_trait]
impl MeasurementRepository for InMemoryMeasurementRepository {
    async fn create_batch(&self, facts: &[MeasurementFact]) -> Result<(), DomainError> {
        self.facts.write().await.extend_from_slice(facts);
        Ok(())
    }

    async fn query(&self, query: &MeasurementQuery) -> Result<Vec<MeasurementFact>, DomainError> {
        let mut found: Vec<MeasurementFact> = self
            .facts
            .read()
            .await
            .iter()
            .filter(|f| query.matches(f))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.reading_time.cmp(&a.reading_time));
        found.truncate(query.effective_limit() as usize);
        Ok(found)
    }
}
