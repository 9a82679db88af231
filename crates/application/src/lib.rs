//! Application layer - Use cases and business workflows
//!
//! - `schema`: TTL-cached schema registry over the measurement catalog
//! - `ingestion`: reading normalization and the ingestion service
//! - `threshold`: threshold evaluation and administration
//! - `alert`: alert lifecycle and the bounded background dispatcher

pub mod alert;
pub mod engine;
pub mod ingestion;
pub mod schema;
pub mod threshold;

pub use alert::{AlertDispatcher, AlertJob, AlertLifecycleManager, AlertTransition};
pub use engine::{IngestionEngine, Repositories};
pub use ingestion::{IngestionService, ReadingNormalizer};
pub use schema::SchemaRegistry;
pub use threshold::{ThresholdEvaluator, ThresholdService};
