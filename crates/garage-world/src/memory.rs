//! In-memory world for testing and tooling.
//!
//! [`InMemoryWorld`] keeps every entity in a `BTreeMap` behind a `RwLock` and
//! implements the full [`World`] trait. Entities are created from registered
//! [`TemplateSpec`]s, so a template can come with default contents, seats, a
//! lock, or a preconfigured key credential, just like a real prefab.

use std::collections::{BTreeMap, HashMap};
use std::ops::ControlFlow;
use std::sync::RwLock;

use garage_types::{EntityId, KeyCredential, Transform, Vec3};

use crate::error::{WorldError, WorldResult};
use crate::world::{EntityKind, ItemInfo, VehicleHandle, World};

/// Blueprint for entities spawned from one template reference.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateSpec {
    pub kind: EntityKind,
    /// Carries a weapon component.
    pub weapon: bool,
    /// Carries a key-lock component.
    pub lockable: bool,
    /// Has an inventory.
    pub container: bool,
    /// Number of seats/compartments.
    pub seats: usize,
    /// Items spawned into the inventory on instantiation.
    pub default_contents: Vec<String>,
    /// Credential the lock starts with.
    pub preset_key: Option<KeyCredential>,
}

impl TemplateSpec {
    fn base(kind: EntityKind) -> Self {
        Self {
            kind,
            weapon: false,
            lockable: false,
            container: false,
            seats: 0,
            default_contents: Vec::new(),
            preset_key: None,
        }
    }

    /// Lockable vehicle with four seats and a cargo inventory.
    pub fn vehicle() -> Self {
        Self {
            lockable: true,
            container: true,
            seats: 4,
            ..Self::base(EntityKind::Vehicle)
        }
    }

    /// Plain inventory item.
    pub fn item() -> Self {
        Self::base(EntityKind::Item)
    }

    /// Weapon-capable inventory item.
    pub fn weapon() -> Self {
        Self {
            weapon: true,
            ..Self::base(EntityKind::Item)
        }
    }

    /// Inventory item carrying a key-lock credential.
    pub fn key() -> Self {
        Self {
            lockable: true,
            ..Self::base(EntityKind::Item)
        }
    }

    /// Character with an inventory.
    pub fn character() -> Self {
        Self {
            container: true,
            ..Self::base(EntityKind::Character)
        }
    }

    /// Static scenery (garage signs, barrels).
    pub fn prop() -> Self {
        Self::base(EntityKind::Static)
    }

    pub fn with_contents<I, S>(mut self, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_contents = contents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_seats(mut self, seats: usize) -> Self {
        self.seats = seats;
        self
    }

    pub fn with_preset_key(mut self, key: KeyCredential) -> Self {
        self.lockable = true;
        self.preset_key = Some(key);
        self
    }

    pub fn without_lock(mut self) -> Self {
        self.lockable = false;
        self.preset_key = None;
        self
    }
}

#[derive(Clone, Debug)]
struct LockState {
    credential: KeyCredential,
    locked: bool,
}

#[derive(Clone, Debug)]
struct EntityState {
    template_ref: String,
    kind: EntityKind,
    weapon: bool,
    transform: Transform,
    lock: Option<LockState>,
    seats: Vec<bool>,
    inventory: Option<Vec<EntityId>>,
    parent: Option<EntityId>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    templates: HashMap<String, TemplateSpec>,
    entities: BTreeMap<EntityId, EntityState>,
}

impl State {
    fn get(&self, id: EntityId) -> WorldResult<&EntityState> {
        self.entities.get(&id).ok_or(WorldError::UnknownEntity(id))
    }

    fn get_mut(&mut self, id: EntityId) -> WorldResult<&mut EntityState> {
        self.entities.get_mut(&id).ok_or(WorldError::UnknownEntity(id))
    }

    fn create(
        &mut self,
        template_ref: &str,
        transform: Transform,
        parent: Option<EntityId>,
    ) -> WorldResult<EntityId> {
        let spec = self
            .templates
            .get(template_ref)
            .cloned()
            .ok_or_else(|| WorldError::UnknownTemplate(template_ref.to_string()))?;

        self.next_id += 1;
        let id = EntityId(self.next_id);
        self.entities.insert(
            id,
            EntityState {
                template_ref: template_ref.to_string(),
                kind: spec.kind,
                weapon: spec.weapon,
                transform,
                lock: spec.lockable.then(|| LockState {
                    credential: spec.preset_key.clone().unwrap_or_default(),
                    locked: false,
                }),
                seats: vec![false; spec.seats],
                inventory: spec.container.then(Vec::new),
                parent,
            },
        );

        let contents: &[String] = if spec.container {
            &spec.default_contents
        } else {
            &[]
        };
        for child in contents {
            let child_id = match self.create(child, transform, Some(id)) {
                Ok(child_id) => child_id,
                Err(e) => {
                    self.remove_tree(id);
                    return Err(e);
                }
            };
            if let Some(inventory) = self.get_mut(id)?.inventory.as_mut() {
                inventory.push(child_id);
            }
        }
        Ok(id)
    }

    fn remove_tree(&mut self, id: EntityId) {
        if let Some(state) = self.entities.remove(&id) {
            for child in state.inventory.unwrap_or_default() {
                self.remove_tree(child);
            }
        }
    }

    fn inventory_mut(&mut self, container: EntityId) -> WorldResult<&mut Vec<EntityId>> {
        self.get_mut(container)?
            .inventory
            .as_mut()
            .ok_or(WorldError::MissingCapability {
                entity: container,
                capability: "inventory",
            })
    }

    fn lock_mut(&mut self, entity: EntityId) -> WorldResult<&mut LockState> {
        self.get_mut(entity)?
            .lock
            .as_mut()
            .ok_or(WorldError::MissingCapability {
                entity,
                capability: "key lock",
            })
    }
}

/// An in-memory implementation of [`World`].
///
/// Sphere queries visit entities in creation order. Data is lost when the
/// world is dropped.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    state: RwLock<State>,
}

impl InMemoryWorld {
    /// Create an empty world with no templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the blueprint for `template_ref`.
    pub fn register_template(&self, template_ref: impl Into<String>, spec: TemplateSpec) {
        self.state
            .write()
            .expect("lock poisoned")
            .templates
            .insert(template_ref.into(), spec);
    }

    /// Mark a seat of `vehicle` as occupied or free.
    pub fn set_seat(&self, vehicle: EntityId, seat: usize, occupied: bool) -> WorldResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        let entity = state.get_mut(vehicle)?;
        match entity.seats.get_mut(seat) {
            Some(slot) => {
                *slot = occupied;
                Ok(())
            }
            None => Err(WorldError::MissingCapability {
                entity: vehicle,
                capability: "seat",
            }),
        }
    }

    /// Whether `entity`'s lock is engaged.
    pub fn is_locked(&self, entity: EntityId) -> WorldResult<bool> {
        let state = self.state.read().expect("lock poisoned");
        state
            .get(entity)?
            .lock
            .as_ref()
            .map(|l| l.locked)
            .ok_or(WorldError::MissingCapability {
                entity,
                capability: "key lock",
            })
    }

    /// Whether `entity` currently exists.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.state
            .read()
            .expect("lock poisoned")
            .entities
            .contains_key(&entity)
    }

    /// Total number of live entities, including those inside inventories.
    pub fn entity_count(&self) -> usize {
        self.state.read().expect("lock poisoned").entities.len()
    }

    /// Free-standing entities spawned from `template_ref`.
    pub fn find_by_template(&self, template_ref: &str) -> Vec<EntityId> {
        self.state
            .read()
            .expect("lock poisoned")
            .entities
            .iter()
            .filter(|(_, e)| e.parent.is_none() && e.template_ref == template_ref)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl World for InMemoryWorld {
    fn query_sphere(
        &self,
        center: Vec3,
        radius: f32,
        visit: &mut dyn FnMut(EntityId) -> ControlFlow<()>,
    ) {
        // Snapshot first: visitors call back into the world.
        let hits: Vec<EntityId> = {
            let state = self.state.read().expect("lock poisoned");
            state
                .entities
                .iter()
                .filter(|(_, e)| e.parent.is_none() && center.within(&e.transform.position, radius))
                .map(|(id, _)| *id)
                .collect()
        };
        for id in hits {
            if visit(id).is_break() {
                break;
            }
        }
    }

    fn vehicle(&self, entity: EntityId) -> Option<VehicleHandle> {
        let state = self.state.read().expect("lock poisoned");
        let e = state.entities.get(&entity)?;
        (e.kind == EntityKind::Vehicle && !e.template_ref.is_empty()).then(|| VehicleHandle {
            entity,
            template_ref: e.template_ref.clone(),
        })
    }

    fn lock(&self, entity: EntityId) -> Option<KeyCredential> {
        let state = self.state.read().expect("lock poisoned");
        state
            .entities
            .get(&entity)?
            .lock
            .as_ref()
            .map(|l| l.credential.clone())
    }

    fn set_credential(&self, entity: EntityId, credential: &KeyCredential) -> WorldResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        state.lock_mut(entity)?.credential = credential.clone();
        Ok(())
    }

    fn set_locked(&self, entity: EntityId, locked: bool) -> WorldResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        state.lock_mut(entity)?.locked = locked;
        Ok(())
    }

    fn is_occupied(&self, vehicle: EntityId) -> WorldResult<bool> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.get(vehicle)?.seats.iter().any(|s| *s))
    }

    fn items(&self, container: EntityId) -> WorldResult<Vec<ItemInfo>> {
        let state = self.state.read().expect("lock poisoned");
        let inventory = state
            .get(container)?
            .inventory
            .as_ref()
            .ok_or(WorldError::MissingCapability {
                entity: container,
                capability: "inventory",
            })?;
        inventory
            .iter()
            .map(|id| -> WorldResult<ItemInfo> {
                let e = state.get(*id)?;
                Ok(ItemInfo {
                    entity: *id,
                    template_ref: e.template_ref.clone(),
                    weapon: e.weapon,
                    key: e.lock.as_ref().map(|l| l.credential.clone()),
                })
            })
            .collect()
    }

    fn spawn_item(&self, container: EntityId, template_ref: &str) -> WorldResult<EntityId> {
        let mut state = self.state.write().expect("lock poisoned");
        let transform = state.get(container)?.transform;
        state.inventory_mut(container)?;
        let id = state.create(template_ref, transform, Some(container))?;
        state.inventory_mut(container)?.push(id);
        Ok(id)
    }

    fn remove_item(&self, container: EntityId, item: EntityId) -> WorldResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        let inventory = state.inventory_mut(container)?;
        let pos = inventory
            .iter()
            .position(|id| *id == item)
            .ok_or(WorldError::NotInContainer { container, item })?;
        inventory.remove(pos);
        state.remove_tree(item);
        Ok(())
    }

    fn instantiate(&self, template_ref: &str, transform: &Transform) -> WorldResult<EntityId> {
        let mut state = self.state.write().expect("lock poisoned");
        state.create(template_ref, *transform, None)
    }

    fn destroy(&self, entity: EntityId) -> WorldResult<()> {
        let mut state = self.state.write().expect("lock poisoned");
        let parent = state.get(entity)?.parent;
        if let Some(parent) = parent {
            if let Ok(inventory) = state.inventory_mut(parent) {
                inventory.retain(|id| *id != entity);
            }
        }
        state.remove_tree(entity);
        Ok(())
    }

    fn transform(&self, entity: EntityId) -> WorldResult<Transform> {
        let state = self.state.read().expect("lock poisoned");
        Ok(state.get(entity)?.transform)
    }
}
