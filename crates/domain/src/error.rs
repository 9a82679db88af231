use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("No measurement schema for sensor type {0}")]
    SchemaNotFound(Uuid),

    #[error("No valid measurements: {0}")]
    NoValidMeasurements(String),

    #[error("Batch of {size} readings exceeds the maximum of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Store failure: {0}")]
    Store(String),

    #[error("Deadline of {0} ms exceeded")]
    DeadlineExceeded(u64),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True when the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound { .. }
                | Self::SchemaNotFound(_)
                | Self::NoValidMeasurements(_)
                | Self::BatchTooLarge { .. }
                | Self::Conflict(_)
        )
    }

    /// Short machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::SchemaNotFound(_) => "schema_not_found",
            Self::NoValidMeasurements(_) => "no_valid_measurements",
            Self::BatchTooLarge { .. } => "batch_too_large",
            Self::Conflict(_) => "conflict",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::Store(_) => "store_failure",
            Self::DeadlineExceeded(_) => "deadline_exceeded",
            Self::Cancelled => "cancelled",
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
