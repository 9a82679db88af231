mod directory;
mod entity;
mod status;

pub use directory::AssetDirectory;
pub use entity::{AssetLocation, AssetSensor, Location};
pub use status::SensorStatus;
