use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog entry describing a model of sensor.
///
/// Immutable after creation except for the activation flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorType {
    id: Uuid,
    name: String,
    manufacturer: Option<String>,
    model: Option<String>,
    active: bool,
}

impl SensorType {
    pub fn new(
        id: Uuid,
        name: impl Into<String>,
        manufacturer: Option<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            manufacturer,
            model,
            active: true,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}
