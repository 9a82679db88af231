pub mod evaluator;
pub mod service;

pub use evaluator::ThresholdEvaluator;
pub use service::ThresholdService;
