mod data_type;
mod measurement_type;
mod repository;
mod sensor_type;

pub use data_type::FieldDataType;
pub use measurement_type::{MeasurementField, MeasurementType};
pub use repository::CatalogRepository;
pub use sensor_type::SensorType;
