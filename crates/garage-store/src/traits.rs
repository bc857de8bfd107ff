use garage_types::{OwnerId, OwnerRecordCollection};

use crate::error::StoreResult;

/// Durable storage for per-owner record collections.
///
/// All implementations must satisfy these invariants:
/// - `load` of an owner with no document returns an empty collection keyed
///   to that owner.
/// - `load` of a damaged document returns [`StoreError::Corrupt`](crate::StoreError::Corrupt).
/// - `save` fully replaces the prior document; there is no merge.
/// - A single call performs at most one read or one write. Retries are the
///   caller's decision.
pub trait RecordStore: Send + Sync {
    /// Load the owner's collection, or a fresh empty one if none exists.
    fn load(&self, owner: &OwnerId) -> StoreResult<OwnerRecordCollection>;

    /// Replace the stored collection for `collection.owner`.
    fn save(&self, collection: &OwnerRecordCollection) -> StoreResult<()>;

    /// Check whether a document exists for `owner`.
    fn exists(&self, owner: &OwnerId) -> StoreResult<bool>;
}
