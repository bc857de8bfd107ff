//! Encoding and decoding of record documents.
//!
//! Shared by every backend so they agree on what counts as corrupt.

use garage_types::{OwnerId, OwnerRecordCollection};

use crate::error::{StoreError, StoreResult};

/// Encode a collection as pretty-printed JSON, refusing collections that
/// break record invariants.
pub fn encode(collection: &OwnerRecordCollection) -> StoreResult<Vec<u8>> {
    collection.validate().map_err(|e| StoreError::Invalid {
        owner: collection.owner.clone(),
        reason: e.to_string(),
    })?;
    serde_json::to_vec_pretty(collection).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode a document that was stored under `owner`'s key.
///
/// Parse failures, a `player_uid` belonging to someone else, and records that
/// break invariants are all reported as [`StoreError::Corrupt`].
pub fn decode(owner: &OwnerId, bytes: &[u8]) -> StoreResult<OwnerRecordCollection> {
    let collection = decode_any(bytes).map_err(|reason| StoreError::Corrupt {
        owner: owner.to_string(),
        reason,
    })?;
    if collection.owner != *owner {
        return Err(StoreError::Corrupt {
            owner: owner.to_string(),
            reason: format!("document belongs to {}", collection.owner),
        });
    }
    Ok(collection)
}

/// Decode a document without knowing whose it is.
pub(crate) fn decode_any(bytes: &[u8]) -> Result<OwnerRecordCollection, String> {
    let collection: OwnerRecordCollection =
        serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
    collection.validate().map_err(|e| e.to_string())?;
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_types::{KeyCredential, Manifest, ManifestEntry, StoredAssetRecord};

    fn owner(raw: &str) -> OwnerId {
        OwnerId::new(raw).unwrap()
    }

    #[test]
    fn encode_then_decode() {
        let mut c = OwnerRecordCollection::empty(owner("P1"));
        c.records.push(StoredAssetRecord::new(
            "veh/A.et",
            Manifest::from_entries(vec![ManifestEntry::new("item/x.et", 3)]).unwrap(),
            KeyCredential::new("k1", "0000"),
        ));
        let bytes = encode(&c).unwrap();
        assert_eq!(decode(&owner("P1"), &bytes).unwrap(), c);
    }

    #[test]
    fn garbage_is_corrupt() {
        let err = decode(&owner("P1"), b"{not json").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn foreign_owner_is_corrupt() {
        let c = OwnerRecordCollection::empty(owner("P2"));
        let bytes = encode(&c).unwrap();
        let err = decode(&owner("P1"), &bytes).unwrap_err();
        match err {
            StoreError::Corrupt { reason, .. } => assert!(reason.contains("P2")),
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn zero_count_on_disk_is_corrupt() {
        let raw = br#"{"player_uid":"P1","vehicles":[{"prefab":"veh/A.et","inventory":[{"prefab":"i","count":0}],"key_id":"","key_code":""}]}"#;
        assert!(matches!(
            decode(&owner("P1"), raw).unwrap_err(),
            StoreError::Corrupt { .. }
        ));
    }

    #[test]
    fn encode_refuses_empty_template() {
        let mut c = OwnerRecordCollection::empty(owner("P1"));
        c.records.push(StoredAssetRecord::new(
            "",
            Manifest::new(),
            KeyCredential::default(),
        ));
        assert!(matches!(encode(&c).unwrap_err(), StoreError::Invalid { .. }));
    }
}
