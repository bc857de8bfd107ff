//! The [`World`] trait: the only path from the garage to live entities.

use std::ops::ControlFlow;

use garage_codec::ContainedItem;
use garage_types::{EntityId, KeyCredential, Transform, Vec3};

use crate::error::WorldResult;

/// Closed set of entity classes the garage distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Vehicle,
    Item,
    Character,
    Static,
}

/// A resolved vehicle capability: the entity is of the vehicle class and has
/// a non-empty template reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VehicleHandle {
    pub entity: EntityId,
    pub template_ref: String,
}

/// Snapshot of one item inside a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemInfo {
    pub entity: EntityId,
    pub template_ref: String,
    /// The item carries a weapon component.
    pub weapon: bool,
    /// Key-lock credential, for items that have one (keys).
    pub key: Option<KeyCredential>,
}

impl ContainedItem for ItemInfo {
    fn template_ref(&self) -> &str {
        &self.template_ref
    }

    fn is_weapon(&self) -> bool {
        self.weapon
    }
}

/// Authoritative world the garage operates on.
///
/// Implementations must be thread-safe (`Send + Sync`). Every call is
/// synchronous and bounded; none of them retries internally.
pub trait World: Send + Sync {
    /// Visit free-standing entities whose origin lies within `radius` of
    /// `center`, stopping early when `visit` breaks. Visit order is up to the
    /// implementation and is not sorted by distance. Entities held inside a
    /// container are never visited.
    fn query_sphere(
        &self,
        center: Vec3,
        radius: f32,
        visit: &mut dyn FnMut(EntityId) -> ControlFlow<()>,
    );

    /// Vehicle capability of `entity`, if it is a vehicle with a template.
    fn vehicle(&self, entity: EntityId) -> Option<VehicleHandle>;

    /// Lock credential of `entity`, if it has a key-lock component.
    fn lock(&self, entity: EntityId) -> Option<KeyCredential>;

    /// Overwrite the lock credential of `entity`.
    fn set_credential(&self, entity: EntityId, credential: &KeyCredential) -> WorldResult<()>;

    /// Lock or unlock `entity`.
    fn set_locked(&self, entity: EntityId, locked: bool) -> WorldResult<()>;

    /// Whether any seat or compartment of `vehicle` is occupied.
    fn is_occupied(&self, vehicle: EntityId) -> WorldResult<bool>;

    /// Items held in `container`'s inventory, in storage order.
    fn items(&self, container: EntityId) -> WorldResult<Vec<ItemInfo>>;

    /// Spawn one instance of `template_ref` into `container`'s inventory.
    fn spawn_item(&self, container: EntityId, template_ref: &str) -> WorldResult<EntityId>;

    /// Delete `item` from `container`'s inventory.
    fn remove_item(&self, container: EntityId, item: EntityId) -> WorldResult<()>;

    /// Spawn a new free-standing entity from `template_ref` at `transform`.
    fn instantiate(&self, template_ref: &str, transform: &Transform) -> WorldResult<EntityId>;

    /// Delete `entity` together with everything it contains.
    fn destroy(&self, entity: EntityId) -> WorldResult<()>;

    /// Current world transform of `entity`.
    fn transform(&self, entity: EntityId) -> WorldResult<Transform>;
}
