//! In-process repositories for tests, demos and `--in-memory` runs

mod alert_repository;
mod asset_directory;
mod catalog_repository;
mod measurement_repository;
mod threshold_repository;

pub use alert_repository::InMemoryAlertRepository;
pub use asset_directory::InMemoryAssetDirectory;
pub use catalog_repository::InMemoryCatalogRepository;
pub use measurement_repository::InMemoryMeasurementRepository;
pub use threshold_repository::InMemoryThresholdRepository;
