use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use garage_types::{OwnerId, OwnerRecordCollection};

use crate::document;
use crate::error::{StoreError, StoreResult};
use crate::traits::RecordStore;

/// In-memory record store.
///
/// Holds encoded documents rather than live collections so loads go through
/// the same decode path as the file store: a raw document planted with
/// [`Self::put_raw`] is reported as corrupt exactly as a damaged file would
/// be. Intended for tests and embedding.
pub struct InMemoryRecordStore {
    documents: RwLock<HashMap<OwnerId, Vec<u8>>>,
    read_only: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryRecordStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            read_only: AtomicBool::new(false),
            saves: AtomicUsize::new(0),
        }
    }

    /// Make every subsequent `save` fail with [`StoreError::ReadOnly`].
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Store raw document bytes for `owner`, bypassing encoding.
    pub fn put_raw(&self, owner: OwnerId, bytes: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(owner, bytes.into());
    }

    /// Number of owners with a document.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }

    /// Number of successful saves since creation.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn load(&self, owner: &OwnerId) -> StoreResult<OwnerRecordCollection> {
        let documents = self.documents.read().expect("lock poisoned");
        match documents.get(owner) {
            Some(bytes) => document::decode(owner, bytes),
            None => Ok(OwnerRecordCollection::empty(owner.clone())),
        }
    }

    fn save(&self, collection: &OwnerRecordCollection) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::ReadOnly);
        }
        let bytes = document::encode(collection)?;
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(collection.owner.clone(), bytes);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn exists(&self, owner: &OwnerId) -> StoreResult<bool> {
        Ok(self
            .documents
            .read()
            .expect("lock poisoned")
            .contains_key(owner))
    }
}

impl std::fmt::Debug for InMemoryRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecordStore")
            .field("document_count", &self.len())
            .field("read_only", &self.read_only.load(Ordering::SeqCst))
            .finish()
    }
}
