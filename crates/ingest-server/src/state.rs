use application::{IngestionEngine, Repositories};
use infrastructure::config::ServiceConfig;
use infrastructure::database;
use infrastructure::{
    BroadcastEventPublisher, CompositeEventPublisher, InMemoryAlertRepository,
    InMemoryAssetDirectory, InMemoryCatalogRepository, InMemoryMeasurementRepository,
    InMemoryThresholdRepository, PostgresAlertRepository, PostgresAssetDirectory,
    PostgresCatalogRepository, PostgresEventPublisher, PostgresMeasurementRepository,
    PostgresThresholdRepository,
};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

pub struct AppState {
    pub engine: IngestionEngine,
    /// Live domain events for SSE subscribers
    pub events: BroadcastEventPublisher,
    /// Cancelled when the server begins shutting down
    pub shutdown: CancellationToken,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(engine: IngestionEngine, events: BroadcastEventPublisher) -> Self {
        Self {
            engine,
            events,
            shutdown: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    /// Wire the engine to PostgreSQL, running migrations when configured
    pub async fn postgres(config: &ServiceConfig) -> anyhow::Result<Self> {
        let pool = database::connect(&config.database).await?;
        info!("✅ Connected to PostgreSQL");

        let repositories = Repositories {
            catalog: Arc::new(PostgresCatalogRepository::new(pool.clone())),
            assets: Arc::new(PostgresAssetDirectory::new(pool.clone())),
            measurements: Arc::new(PostgresMeasurementRepository::new(pool.clone())),
            thresholds: Arc::new(PostgresThresholdRepository::new(pool.clone())),
            alerts: Arc::new(PostgresAlertRepository::new(pool.clone())),
        };

        let events = BroadcastEventPublisher::new(EVENT_CHANNEL_CAPACITY);
        let publisher = Arc::new(
            CompositeEventPublisher::new()
                .with_sink("event_log", Arc::new(PostgresEventPublisher::new(pool)))
                .with_sink("live", Arc::new(events.clone())),
        );

        Ok(Self::new(
            IngestionEngine::build(repositories, publisher, config),
            events,
        ))
    }

    /// Wire the engine to the given in-process stores
    pub fn in_memory(config: &ServiceConfig, stores: &InMemoryStores) -> Self {
        let events = BroadcastEventPublisher::new(EVENT_CHANNEL_CAPACITY);
        let engine =
            IngestionEngine::build(stores.repositories(), Arc::new(events.clone()), config);
        Self::new(engine, events)
    }
}

/// In-process storage, used with `--in-memory` and by tests
#[derive(Clone, Default)]
pub struct InMemoryStores {
    pub catalog: Arc<InMemoryCatalogRepository>,
    pub assets: Arc<InMemoryAssetDirectory>,
    pub measurements: Arc<InMemoryMeasurementRepository>,
    pub thresholds: Arc<InMemoryThresholdRepository>,
    pub alerts: Arc<InMemoryAlertRepository>,
}

impl InMemoryStores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            catalog: self.catalog.clone(),
            assets: self.assets.clone(),
            measurements: self.measurements.clone(),
            thresholds: self.thresholds.clone(),
            alerts: self.alerts.clone(),
        }
    }
}
