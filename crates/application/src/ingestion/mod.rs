pub mod normalizer;
pub mod request;
pub mod service;

pub use normalizer::{NormalizedReading, ReadingContext, ReadingNormalizer};
pub use request::{
    BatchIngestionRequest, BatchReading, BatchReceipt, IngestionReceipt, IngestionRequest,
    NormalizedMeasurement, RejectedReading,
};
pub use service::IngestionService;
