mod sensor_schema;
mod units;

pub use sensor_schema::{FieldSchema, SensorSchema};
pub use units::infer_unit;
