//! Infrastructure layer - External integrations
//!
//! - `config`: layered service configuration
//! - `database`: PostgreSQL repositories, event log and migration runner
//! - `memory`: in-process repositories
//! - `messaging`: event fan-out

pub mod config;
pub mod database;
pub mod memory;
pub mod messaging;

pub use config::ServiceConfig;
pub use database::{
    PostgresAlertRepository, PostgresAssetDirectory, PostgresCatalogRepository,
    PostgresEventPublisher, PostgresMeasurementRepository, PostgresThresholdRepository,
};
pub use memory::{
    InMemoryAlertRepository, InMemoryAssetDirectory, InMemoryCatalogRepository,
    InMemoryMeasurementRepository, InMemoryThresholdRepository,
};
pub use messaging::{BroadcastEventPublisher, CompositeEventPublisher};
