//! Owner-locked access to stored records, usable without a world.

use garage_store::RecordStore;
use garage_types::{OwnerId, StoredAssetRecord};
use tracing::info;

use crate::error::EngineResult;
use crate::locks::OwnerLocks;
use crate::outcome::DiscardOutcome;

/// A [`RecordStore`] plus the per-owner lock table every read-modify-write
/// goes through.
#[derive(Debug)]
pub struct RecordBook<S> {
    store: S,
    locks: OwnerLocks,
}

impl<S: RecordStore> RecordBook<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: OwnerLocks::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `f` against the store while holding `owner`'s lock.
    pub fn with_owner<R>(&self, owner: &OwnerId, f: impl FnOnce(&S) -> R) -> R {
        self.locks.with_owner(owner, || f(&self.store))
    }

    /// The owner's stored vehicles, in storage order.
    pub fn list(&self, owner: &OwnerId) -> EngineResult<Vec<StoredAssetRecord>> {
        self.with_owner(owner, |store| -> EngineResult<_> {
            Ok(store.load(owner)?.records)
        })
    }

    /// Delete the record at `index` without spawning anything.
    pub fn discard(&self, owner: &OwnerId, index: usize) -> EngineResult<DiscardOutcome> {
        self.with_owner(owner, |store| -> EngineResult<_> {
            let mut collection = store.load(owner)?;
            if index >= collection.len() {
                return Ok(DiscardOutcome::IndexOutOfRange);
            }
            let removed = collection.records.remove(index);
            store.save(&collection)?;
            info!(owner = %owner, index, template = %removed.template_ref, "record discarded");
            Ok(DiscardOutcome::Discarded(removed))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_store::InMemoryRecordStore;
    use garage_types::{KeyCredential, Manifest, OwnerRecordCollection};

    fn owner() -> OwnerId {
        OwnerId::new("P1").unwrap()
    }

    fn book_with(templates: &[&str]) -> RecordBook<InMemoryRecordStore> {
        let store = InMemoryRecordStore::new();
        let mut c = OwnerRecordCollection::empty(owner());
        for t in templates {
            c.records.push(StoredAssetRecord::new(
                *t,
                Manifest::new(),
                KeyCredential::new("K", "C"),
            ));
        }
        store.save(&c).unwrap();
        RecordBook::new(store)
    }

    #[test]
    fn list_unknown_owner_is_empty() {
        let book = RecordBook::new(InMemoryRecordStore::new());
        assert!(book.list(&owner()).unwrap().is_empty());
    }

    #[test]
    fn discard_middle_record_keeps_order() {
        let book = book_with(&["a.et", "b.et", "c.et"]);
        let outcome = book.discard(&owner(), 1).unwrap();
        assert!(matches!(outcome, DiscardOutcome::Discarded(ref r) if r.template_ref == "b.et"));
        let left: Vec<_> = book
            .list(&owner())
            .unwrap()
            .into_iter()
            .map(|r| r.template_ref)
            .collect();
        assert_eq!(left, vec!["a.et", "c.et"]);
    }

    #[test]
    fn discard_out_of_range_does_not_save() {
        let book = book_with(&["a.et"]);
        let saves = book.store().save_count();
        assert_eq!(
            book.discard(&owner(), 1).unwrap(),
            DiscardOutcome::IndexOutOfRange
        );
        assert_eq!(book.store().save_count(), saves);
    }
}
