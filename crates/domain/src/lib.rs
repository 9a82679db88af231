//! Domain layer - Pure business logic with no external dependencies
//!
//! This crate contains:
//! - Catalog entities (SensorType, MeasurementType, MeasurementField)
//! - Resolved measurement schemas and unit inference
//! - Measurement facts and their tagged value type
//! - Thresholds, verdicts and alerts
//! - Domain Events
//! - Repository / collaborator interfaces (traits)
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Invariants enforced at construction
//! - Testable in isolation

pub mod alert;
pub mod asset;
pub mod catalog;
pub mod error;
pub mod event;
pub mod measurement;
pub mod schema;
pub mod threshold;

// Re-export commonly used types
pub use alert::{AlertType, AssetAlert};
pub use error::DomainError;
pub use event::DomainEvent;
pub use measurement::{MeasurementFact, MeasurementValue, RawMeasurement};
pub use schema::SensorSchema;
pub use threshold::{SensorThreshold, Severity, Verdict};
