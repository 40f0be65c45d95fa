use crate::types::EntityId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemosaicError>;

#[derive(Debug, Error)]
pub enum DemosaicError {
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("Enumeration failed: {0}")]
    Enumeration(String),

    #[error("Introspection failed for {entity}: {reason}")]
    Introspection { entity: EntityId, reason: String },

    #[error("Unknown remove strategy: {0}")]
    UnknownStrategy(String),

    #[error("Scene error: {0}")]
    Scene(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
