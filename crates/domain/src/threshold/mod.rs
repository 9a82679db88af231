mod entity;
mod repository;
mod severity;
mod verdict;

pub use entity::{NewThreshold, SensorThreshold};
pub use repository::ThresholdRepository;
pub use severity::Severity;
pub use verdict::Verdict;
