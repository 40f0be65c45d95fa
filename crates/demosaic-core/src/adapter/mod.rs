//! Boundary to the host object model.
//!
//! The core never touches host objects directly. An [`EntityAdapter`]
//! projects them into [`AttributeSnapshot`] values and exposes the
//! mutation surface the mutator drives. [`memory::InMemoryWorld`] is a
//! complete implementation over an in-process entity tree.

pub mod memory;

use crate::error::Result;
use crate::types::{AttributeSnapshot, Capabilities, EntityId, MaterialHandle};

/// Host collaborator seen by the scheduler and mutator.
///
/// Every mutation entry point must be a safe no-op when the handle is no
/// longer valid; the mutator may call them on entities destroyed since the
/// last snapshot.
pub trait EntityAdapter: Send + Sync {
    // === Introspection ===

    /// Capture a fresh attribute snapshot of an entity
    fn snapshot(&self, id: EntityId) -> Result<AttributeSnapshot>;

    /// Every currently known entity, in scan order
    fn all_entity_ids(&self) -> Result<Vec<EntityId>>;

    /// All descendants of an entity (depth-first, excluding the entity itself)
    fn descendants(&self, id: EntityId) -> Result<Vec<EntityId>>;

    /// What can currently be done to an entity
    fn capability(&self, id: EntityId) -> Capabilities;

    // === Mutation ===

    /// Deactivate the entity's root object
    fn deactivate(&self, id: EntityId);

    /// Remove the renderable part (mesh holder / skinned renderer)
    fn destroy_renderable_part(&self, id: EntityId);

    /// Remove the whole entity and its subtree
    fn destroy_entity(&self, id: EntityId);

    /// Replace every material slot with a shared material
    fn substitute_materials(&self, id: EntityId, material: &MaterialHandle);

    /// Switch the existing materials to a fully transparent blend mode
    fn fade_materials_in_place(&self, id: EntityId);
}
