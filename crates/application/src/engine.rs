use domain::alert::AlertRepository;
use domain::asset::AssetDirectory;
use domain::catalog::CatalogRepository;
use domain::event::EventPublisher;
use domain::measurement::MeasurementRepository;
use domain::threshold::ThresholdRepository;
use infrastructure::config::ServiceConfig;
use std::sync::Arc;

use crate::alert::{AlertDispatcher, AlertLifecycleManager};
use crate::ingestion::{IngestionService, ReadingNormalizer};
use crate::schema::SchemaRegistry;
use crate::threshold::{ThresholdEvaluator, ThresholdService};

/// Storage backends the engine runs against
#[derive(Clone)]
pub struct Repositories {
    pub catalog: Arc<dyn CatalogRepository>,
    pub assets: Arc<dyn AssetDirectory>,
    pub measurements: Arc<dyn MeasurementRepository>,
    pub thresholds: Arc<dyn ThresholdRepository>,
    pub alerts: Arc<dyn AlertRepository>,
}

/// Ingestion, threshold administration and background alerting wired together
pub struct IngestionEngine {
    pub registry: Arc<SchemaRegistry>,
    pub ingestion: IngestionService,
    pub thresholds: ThresholdService,
    pub dispatcher: Arc<AlertDispatcher>,
    pub repositories: Repositories,
}

impl IngestionEngine {
    /// Spawns the alert workers, so it must run inside a tokio runtime
    pub fn build(
        repositories: Repositories,
        event_publisher: Arc<dyn EventPublisher>,
        config: &ServiceConfig,
    ) -> Self {
        let registry = Arc::new(SchemaRegistry::from_config(
            repositories.catalog.clone(),
            &config.schema,
        ));

        let lifecycle = AlertLifecycleManager::new(
            ThresholdEvaluator::new(repositories.thresholds.clone()),
            repositories.alerts.clone(),
            event_publisher.clone(),
        );
        let dispatcher = Arc::new(AlertDispatcher::new(Arc::new(lifecycle), &config.alerting));

        let ingestion = IngestionService::new(
            repositories.assets.clone(),
            ReadingNormalizer::new(registry.clone()),
            repositories.measurements.clone(),
            dispatcher.clone(),
            event_publisher,
            config.ingestion.clone(),
        );

        let thresholds = ThresholdService::new(
            repositories.thresholds.clone(),
            repositories.assets.clone(),
            registry.clone(),
        );

        Self {
            registry,
            ingestion,
            thresholds,
            dispatcher,
            repositories,
        }
    }

    /// Drain background alerting
    pub async fn shutdown(&self) -> bool {
        self.dispatcher.shutdown().await
    }
}
