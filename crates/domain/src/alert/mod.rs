mod alert_type;
mod entity;
mod repository;

pub use alert_type::AlertType;
pub use entity::{AlertQuery, AssetAlert};
pub use repository::AlertRepository;
