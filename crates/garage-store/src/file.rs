use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use garage_types::{OwnerId, OwnerRecordCollection};
use tracing::{debug, warn};

use crate::document;
use crate::error::{StoreError, StoreResult};
use crate::keys::{storage_key, DOCUMENT_EXTENSION};
use crate::traits::RecordStore;

/// Default data directory, relative to the server profile.
pub const DEFAULT_DATA_DIR: &str = "BLG";

/// Result of checking one document during [`FileRecordStore::scan`].
#[derive(Debug)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub result: StoreResult<OwnerRecordCollection>,
}

/// File-backed record store: one JSON document per owner in a flat
/// directory.
///
/// Saves are staged in a temporary file in the same directory, synced, and
/// renamed over the previous document, so a crash mid-save leaves either the
/// old or the new document in place.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    root: PathBuf,
}

impl FileRecordStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        debug!(root = %root.display(), "record store opened");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of `owner`'s document.
    pub fn path_for(&self, owner: &OwnerId) -> PathBuf {
        self.root.join(storage_key(owner))
    }

    /// Check every document in the data directory.
    ///
    /// Each document must parse, satisfy record invariants, and sit under the
    /// key derived from its own `player_uid`. Files without the document
    /// extension and leftover temporary files are ignored. Entries are sorted
    /// by path.
    pub fn scan(&self) -> StoreResult<Vec<ScanEntry>> {
        let mut entries = Vec::new();
        for dirent in fs::read_dir(&self.root)? {
            let path = dirent?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION)
            {
                continue;
            }
            let result = self.check_document(&path);
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "damaged record document");
            }
            entries.push(ScanEntry { path, result });
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn check_document(&self, path: &Path) -> StoreResult<OwnerRecordCollection> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let bytes = fs::read(path)?;
        let collection = document::decode_any(&bytes).map_err(|reason| StoreError::Corrupt {
            owner: name.clone(),
            reason,
        })?;
        let expected = storage_key(&collection.owner);
        if expected != name {
            return Err(StoreError::Corrupt {
                owner: collection.owner.to_string(),
                reason: format!("stored as {name}, expected {expected}"),
            });
        }
        Ok(collection)
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self, owner: &OwnerId) -> StoreResult<OwnerRecordCollection> {
        let path = self.path_for(owner);
        match fs::read(&path) {
            Ok(bytes) => {
                let collection = document::decode(owner, &bytes).inspect_err(|e| {
                    warn!(
                        owner = %owner,
                        path = %path.display(),
                        error = %e,
                        "record document unreadable"
                    );
                })?;
                debug!(owner = %owner, records = collection.len(), "records loaded");
                Ok(collection)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(owner = %owner, "no record document; starting empty");
                Ok(OwnerRecordCollection::empty(owner.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, collection: &OwnerRecordCollection) -> StoreResult<()> {
        let bytes = document::encode(collection)?;
        let path = self.path_for(&collection.owner);

        let mut staged = tempfile::NamedTempFile::new_in(&self.root)?;
        staged.write_all(&bytes)?;
        staged.as_file().sync_all()?;
        staged.persist(&path).map_err(|e| StoreError::Persist {
            path: path.clone(),
            source: e.error,
        })?;

        debug!(
            owner = %collection.owner,
            records = collection.len(),
            path = %path.display(),
            "records saved"
        );
        Ok(())
    }

    fn exists(&self, owner: &OwnerId) -> StoreResult<bool> {
        Ok(self.path_for(owner).try_exists()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garage_types::{KeyCredential, Manifest, ManifestEntry, StoredAssetRecord};

    fn owner(raw: &str) -> OwnerId {
        OwnerId::new(raw).unwrap()
    }

    fn record(template: &str) -> StoredAssetRecord {
        StoredAssetRecord::new(
            template,
            Manifest::from_entries(vec![ManifestEntry::new("item/jerrycan.et", 2)]).unwrap(),
            KeyCredential::new(format!("key-{template}"), "1111"),
        )
    }

    fn temp_store() -> (tempfile::TempDir, FileRecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileRecordStore::open(dir.path().join("BLG")).unwrap();
        (dir, store)
    }

    // ---- Test 1: Missing document loads empty ----
    #[test]
    fn load_missing_is_empty() {
        let (_dir, store) = temp_store();
        let c = store.load(&owner("P1")).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.owner, owner("P1"));
        assert!(!store.exists(&owner("P1")).unwrap());
    }

    // ---- Test 2: Save then load ----
    #[test]
    fn save_then_load() {
        let (_dir, store) = temp_store();
        let mut c = OwnerRecordCollection::empty(owner("P1"));
        c.records.push(record("veh/A.et"));
        c.records.push(record("veh/B.et"));
        store.save(&c).unwrap();

        assert!(store.exists(&owner("P1")).unwrap());
        assert!(store.path_for(&owner("P1")).ends_with("P1.json"));
        assert_eq!(store.load(&owner("P1")).unwrap(), c);
    }

    // ---- Test 3: Save replaces, never merges ----
    #[test]
    fn save_replaces_prior_content() {
        let (_dir, store) = temp_store();
        let mut c = OwnerRecordCollection::empty(owner("P1"));
        c.records.push(record("veh/A.et"));
        c.records.push(record("veh/B.et"));
        store.save(&c).unwrap();

        c.records.remove(0);
        store.save(&c).unwrap();

        let loaded = store.load(&owner("P1")).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.records[0].template_ref, "veh/B.et");
    }

    // ---- Test 4: Corrupt document is an error, not empty ----
    #[test]
    fn corrupt_document_is_error() {
        let (_dir, store) = temp_store();
        fs::write(store.path_for(&owner("P1")), b"{\"player_uid\": ").unwrap();
        let err = store.load(&owner("P1")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }), "got {err}");
    }

    // ---- Test 5: Owners are isolated, including hashed keys ----
    #[test]
    fn owners_do_not_collide() {
        let (_dir, store) = temp_store();
        let a = owner("a/b");
        let b = owner("a_b");

        let mut ca = OwnerRecordCollection::empty(a.clone());
        ca.records.push(record("veh/A.et"));
        store.save(&ca).unwrap();
        store.save(&OwnerRecordCollection::empty(b.clone())).unwrap();

        assert_eq!(store.load(&a).unwrap().len(), 1);
        assert_eq!(store.load(&b).unwrap().len(), 0);
        assert_ne!(store.path_for(&a), store.path_for(&b));
    }

    // ---- Test 6: Failed write surfaces as an error ----
    #[test]
    fn save_into_missing_directory_fails() {
        let (dir, store) = temp_store();
        fs::remove_dir_all(dir.path().join("BLG")).unwrap();
        let err = store
            .save(&OwnerRecordCollection::empty(owner("P1")))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_) | StoreError::Persist { .. }));
    }

    // ---- Test 7: Scan reports damaged and misplaced documents ----
    #[test]
    fn scan_flags_bad_documents() {
        let (_dir, store) = temp_store();
        store
            .save(&OwnerRecordCollection::empty(owner("good")))
            .unwrap();
        fs::write(store.root().join("broken.json"), b"[]").unwrap();
        let misplaced = document::encode(&OwnerRecordCollection::empty(owner("other"))).unwrap();
        fs::write(store.root().join("moved.json"), misplaced).unwrap();
        fs::write(store.root().join("notes.txt"), b"ignored").unwrap();

        let entries = store.scan().unwrap();
        assert_eq!(entries.len(), 3);
        let ok: Vec<_> = entries.iter().filter(|e| e.result.is_ok()).collect();
        assert_eq!(ok.len(), 1);
        assert!(ok[0].path.ends_with("good.json"));
    }
}
