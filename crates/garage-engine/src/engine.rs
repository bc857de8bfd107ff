use std::sync::{Mutex, PoisonError};

use garage_codec::{capture, restore, CodecError};
use garage_store::RecordStore;
use garage_types::{EntityId, KeyCredential, OwnerId, StoredAssetRecord, Transform};
use garage_world::{
    find_first, held_key_ids, AnyVehicle, DepositMatch, ItemInfo, SpatialLocator, World,
    WorldError, WorldResult,
};
use tracing::{debug, error, info, warn};

use crate::config::GarageConfig;
use crate::error::EngineResult;
use crate::outcome::{DepositOutcome, DiscardOutcome, RetrieveOutcome, Unchanged};
use crate::records::RecordBook;

// ---------------------------------------------------------------------------
// GarageEngine
// ---------------------------------------------------------------------------

/// One garage controller placed in the world.
///
/// The engine owns no vehicle state of its own: live vehicles belong to the
/// [`World`], stored ones to the [`RecordStore`]. Every operation on an owner
/// runs under that owner's lock, so a load/modify/save cycle is never
/// interleaved with another one for the same owner. Retrievals additionally
/// hold the spawn point from the clear check until the record is saved, so
/// two owners never spawn onto the same spot.
pub struct GarageEngine<W, S> {
    world: W,
    records: RecordBook<S>,
    config: GarageConfig,
    site: EntityId,
    spawn_point: Mutex<()>,
}

impl<W: World, S: RecordStore> GarageEngine<W, S> {
    /// Create an engine for the controller entity `site`.
    pub fn new(world: W, store: S, config: GarageConfig, site: EntityId) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            world,
            records: RecordBook::new(store),
            config,
            site,
            spawn_point: Mutex::new(()),
        })
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn store(&self) -> &S {
        self.records.store()
    }

    pub fn records(&self) -> &RecordBook<S> {
        &self.records
    }

    pub fn config(&self) -> &GarageConfig {
        &self.config
    }

    /// The garage controller entity.
    pub fn site(&self) -> EntityId {
        self.site
    }

    /// Where retrieved vehicles are placed: the spawn anchor composed onto
    /// the controller's transform, or the controller itself.
    pub fn spawn_transform(&self) -> EngineResult<Transform> {
        let site = self.world.transform(self.site)?;
        Ok(match &self.config.spawn_anchor {
            Some(local) => site.compose(local),
            None => site,
        })
    }

    // -----------------------------------------------------------------------
    // Deposit
    // -----------------------------------------------------------------------

    /// Store the vehicle `requester` holds a key for, if one is parked within
    /// the storage radius.
    ///
    /// Checks run in order: range, occupancy, weapons, capacity. The record is
    /// saved before the vehicle leaves the world; if the save fails nothing
    /// has changed.
    pub fn deposit(&self, owner: &OwnerId, requester: EntityId) -> EngineResult<DepositOutcome> {
        self.records
            .with_owner(owner, |store| self.deposit_locked(store, owner, requester))
    }

    fn deposit_locked(
        &self,
        store: &S,
        owner: &OwnerId,
        requester: EntityId,
    ) -> EngineResult<DepositOutcome> {
        let held = held_key_ids(&self.world, requester, &self.config.key_template)?;
        let anchor = self.world.transform(self.site)?.position;

        let locator = SpatialLocator::new(&self.world);
        let Some(candidate) =
            locator.find_nearest(anchor, self.config.store_radius, &DepositMatch::new(&held))
        else {
            debug!(owner = %owner, held = held.len(), "no keyed vehicle in range");
            return Ok(DepositOutcome::OutOfRange);
        };
        let vehicle = candidate.entity();

        if self.world.is_occupied(vehicle)? {
            return Ok(DepositOutcome::Occupied);
        }

        let manifest = match capture(self.cargo(vehicle)?.unwrap_or_default()) {
            Ok(manifest) => manifest,
            Err(CodecError::WeaponPresent { template }) => {
                debug!(owner = %owner, vehicle = %vehicle, weapon = %template, "weapon in cargo");
                return Ok(DepositOutcome::WeaponsPresent { template });
            }
        };

        let mut collection = match store.load(owner) {
            Ok(collection) => collection,
            Err(e) => {
                warn!(owner = %owner, error = %e, "cannot read garage records");
                return Ok(DepositOutcome::RecordsUnavailable);
            }
        };
        if collection.len() >= self.config.max_per_owner {
            return Ok(DepositOutcome::CapacityExceeded);
        }

        let key = candidate.matched_key.unwrap_or_default();
        let index = collection.len();
        collection.records.push(StoredAssetRecord::new(
            candidate.vehicle.template_ref.as_str(),
            manifest,
            key.clone(),
        ));
        if let Err(e) = store.save(&collection) {
            warn!(owner = %owner, error = %e, "cannot write garage records");
            return Ok(DepositOutcome::PersistFailed);
        }

        if let Err(e) = self.world.destroy(vehicle) {
            // The vehicle is still out there: take the record back.
            collection.records.pop();
            if let Err(undo) = store.save(&collection) {
                error!(
                    owner = %owner,
                    vehicle = %vehicle,
                    error = %undo,
                    "record kept for a vehicle that could not be removed"
                );
            }
            return Err(e.into());
        }

        self.consume_key(requester, &key);

        info!(
            owner = %owner,
            vehicle = %vehicle,
            template = %candidate.vehicle.template_ref,
            index,
            "vehicle stored"
        );
        Ok(DepositOutcome::Stored { index })
    }

    /// Remove one key for `key` from the requester. The vehicle is already
    /// stored at this point, so failures are only logged.
    fn consume_key(&self, requester: EntityId, key: &KeyCredential) {
        let template = self.config.key_template.as_str();
        let found = find_first(&self.world, requester, |item| {
            item.template_ref == template
                && item.key.as_ref().is_some_and(|k| k.key_id == key.key_id)
        });
        match found {
            Ok(Some(item)) => {
                if let Err(e) = self.world.remove_item(requester, item.entity) {
                    warn!(requester = %requester, error = %e, "could not take vehicle key");
                }
            }
            Ok(None) => debug!(requester = %requester, "no matching key left to take"),
            Err(e) => warn!(requester = %requester, error = %e, "could not read inventory"),
        }
    }

    // -----------------------------------------------------------------------
    // Retrieve
    // -----------------------------------------------------------------------

    /// Rebuild the owner's vehicle at `index` on the spawn point.
    ///
    /// The vehicle is fully rebuilt (contents, lock, fresh key) before the
    /// shortened record list is saved. A failure after instantiation removes
    /// the new vehicle again and keeps the record.
    pub fn retrieve(
        &self,
        owner: &OwnerId,
        index: usize,
        requester: EntityId,
    ) -> EngineResult<RetrieveOutcome> {
        self.records
            .with_owner(owner, |store| self.retrieve_locked(store, owner, index, requester))
    }

    fn retrieve_locked(
        &self,
        store: &S,
        owner: &OwnerId,
        index: usize,
        requester: EntityId,
    ) -> EngineResult<RetrieveOutcome> {
        let mut collection = match store.load(owner) {
            Ok(collection) => collection,
            Err(e) => {
                warn!(owner = %owner, error = %e, "cannot read garage records");
                return Ok(RetrieveOutcome::Unchanged(Unchanged::RecordsUnavailable));
            }
        };
        if collection.is_empty() {
            return Ok(RetrieveOutcome::Unchanged(Unchanged::NoRecords));
        }
        if index >= collection.len() {
            debug!(owner = %owner, index, records = collection.len(), "index out of range");
            return Ok(RetrieveOutcome::Unchanged(Unchanged::IndexOutOfRange));
        }

        let spawn = self.spawn_transform()?;
        // Held until the outcome is final: a vehicle spawned by another owner
        // must be visible to this clear check.
        let _spawn_point = self
            .spawn_point
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let locator = SpatialLocator::new(&self.world);
        if let Some(blocker) =
            locator.find_nearest(spawn.position, self.config.site_clear_radius, &AnyVehicle)
        {
            debug!(owner = %owner, blocker = %blocker.entity(), "spawn point blocked");
            return Ok(RetrieveOutcome::SiteBlocked);
        }

        let record = collection.records[index].clone();
        let vehicle = match self.world.instantiate(&record.template_ref, &spawn) {
            Ok(vehicle) => vehicle,
            Err(e) => {
                warn!(
                    owner = %owner,
                    template = %record.template_ref,
                    error = %e,
                    "cannot spawn vehicle"
                );
                return Ok(RetrieveOutcome::Unchanged(Unchanged::SpawnFailed));
            }
        };

        if let Err(e) = self.rebuild(vehicle, &record) {
            warn!(owner = %owner, vehicle = %vehicle, error = %e, "cannot rebuild vehicle");
            self.despawn(vehicle);
            return Ok(RetrieveOutcome::Unchanged(Unchanged::SpawnFailed));
        }

        collection.records.remove(index);
        if let Err(e) = store.save(&collection) {
            warn!(owner = %owner, error = %e, "cannot write garage records");
            self.despawn(vehicle);
            return Ok(RetrieveOutcome::PersistFailed);
        }

        info!(
            owner = %owner,
            requester = %requester,
            vehicle = %vehicle,
            template = %record.template_ref,
            "vehicle retrieved"
        );
        Ok(RetrieveOutcome::Retrieved { vehicle })
    }

    /// Items in `vehicle`'s cargo, or `None` if it has no inventory.
    fn cargo(&self, vehicle: EntityId) -> WorldResult<Option<Vec<ItemInfo>>> {
        match self.world.items(vehicle) {
            Ok(items) => Ok(Some(items)),
            Err(WorldError::MissingCapability {
                capability: "inventory",
                ..
            }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Replace default contents with the stored manifest, restore the lock
    /// credential, unlock, and put one key in the cargo.
    fn rebuild(&self, vehicle: EntityId, record: &StoredAssetRecord) -> WorldResult<()> {
        let cargo = self.cargo(vehicle)?;
        match &cargo {
            Some(items) => {
                for item in items {
                    self.world.remove_item(vehicle, item.entity)?;
                }
            }
            None if !record.contents.is_empty() => {
                return Err(WorldError::MissingCapability {
                    entity: vehicle,
                    capability: "inventory",
                });
            }
            None => {}
        }
        for instruction in restore(&record.contents) {
            self.world.spawn_item(vehicle, &instruction.template_ref)?;
        }

        let credential = record.key();
        self.world.set_credential(vehicle, &credential)?;
        self.world.set_locked(vehicle, false)?;

        if cargo.is_none() {
            warn!(vehicle = %vehicle, "vehicle has no cargo space for a key");
            return Ok(());
        }
        let key = self.world.spawn_item(vehicle, &self.config.key_template)?;
        match self.world.lock(key) {
            Some(existing) if existing.is_unassigned() => {
                self.world.set_credential(key, &credential)?;
            }
            Some(_) => {}
            None => warn!(key = %key, "key template has no lock component"),
        }
        Ok(())
    }

    fn despawn(&self, vehicle: EntityId) {
        if let Err(e) = self.world.destroy(vehicle) {
            error!(vehicle = %vehicle, error = %e, "cannot remove half-built vehicle");
        }
    }

    // -----------------------------------------------------------------------
    // Maintenance
    // -----------------------------------------------------------------------

    /// The owner's stored vehicles, in storage order.
    pub fn list_records(&self, owner: &OwnerId) -> EngineResult<Vec<StoredAssetRecord>> {
        self.records.list(owner)
    }

    /// Delete the record at `index` without spawning anything.
    pub fn discard(&self, owner: &OwnerId, index: usize) -> EngineResult<DiscardOutcome> {
        self.records.discard(owner, index)
    }
}

impl<W, S> std::fmt::Debug for GarageEngine<W, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GarageEngine")
            .field("site", &self.site)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
