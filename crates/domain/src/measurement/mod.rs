mod fact;
mod raw;
mod repository;
mod value;

pub use fact::{MeasurementFact, MeasurementQuery};
pub use raw::RawMeasurement;
pub use repository::MeasurementRepository;
pub use value::MeasurementValue;
