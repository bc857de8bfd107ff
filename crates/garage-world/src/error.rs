//! Error types for world operations.

use garage_types::EntityId;
use thiserror::Error;

/// Errors reported by a [`World`](crate::World) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The entity does not exist (or no longer exists).
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    /// No template with this reference can be instantiated.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// The entity lacks a component the operation needs.
    #[error("entity {entity} has no {capability}")]
    MissingCapability {
        entity: EntityId,
        capability: &'static str,
    },

    /// The item is not inside the given container.
    #[error("entity {item} is not stored in {container}")]
    NotInContainer { container: EntityId, item: EntityId },
}

/// Convenience type alias for world operations.
pub type WorldResult<T> = std::result::Result<T, WorldError>;
