use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::OwnerId;
use crate::manifest::Manifest;

/// Identifier/code pair correlating a physical key item with a vehicle lock.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCredential {
    pub key_id: String,
    pub key_code: String,
}

impl KeyCredential {
    pub fn new(key_id: impl Into<String>, key_code: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_code: key_code.into(),
        }
    }

    /// Returns `true` if no key id has been assigned.
    pub fn is_unassigned(&self) -> bool {
        self.key_id.is_empty()
    }
}

/// One vehicle held in a garage.
///
/// On disk:
///
/// ```json
/// {
///   "prefab": "{...}Prefabs/Vehicles/Car/MyCar.et",
///   "inventory": [ { "prefab": "{...}FuelCan.et", "count": 2 } ],
///   "key_id": "1234-5678-90",
///   "key_code": "ABCD"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAssetRecord {
    /// Template (prefab) the vehicle is rebuilt from.
    #[serde(rename = "prefab")]
    pub template_ref: String,
    /// Container contents at the time the vehicle was stored.
    #[serde(rename = "inventory", default)]
    pub contents: Manifest,
    /// Lock id; also the id given to the key item issued on retrieval.
    #[serde(default)]
    pub key_id: String,
    /// Lock code (PIN) copied onto the vehicle and its key.
    #[serde(default)]
    pub key_code: String,
}

impl StoredAssetRecord {
    pub fn new(template_ref: impl Into<String>, contents: Manifest, key: KeyCredential) -> Self {
        Self {
            template_ref: template_ref.into(),
            contents,
            key_id: key.key_id,
            key_code: key.key_code,
        }
    }

    /// The record's lock credential.
    pub fn key(&self) -> KeyCredential {
        KeyCredential::new(self.key_id.clone(), self.key_code.clone())
    }

    /// Short name for menus: the path segment between the last `/` and the
    /// last `.` of the template reference.
    ///
    /// ```
    /// use garage_types::{KeyCredential, Manifest, StoredAssetRecord};
    ///
    /// let r = StoredAssetRecord::new(
    ///     "{ABC}Prefabs/Vehicles/Wheeled/UAZ469.et",
    ///     Manifest::new(),
    ///     KeyCredential::default(),
    /// );
    /// assert_eq!(r.display_name(), "UAZ469");
    /// ```
    pub fn display_name(&self) -> &str {
        let path = self.template_ref.as_str();
        match (path.rfind('/'), path.rfind('.')) {
            (Some(slash), Some(dot)) if dot > slash => &path[slash + 1..dot],
            _ => path,
        }
    }

    /// Check the persisted-record invariants: a non-empty template and a
    /// coalesced manifest with no zero counts.
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.template_ref.is_empty() {
            return Err(TypeError::EmptyTemplate);
        }
        self.contents.validate()
    }
}

/// Everything persisted for one owner.
///
/// Record order is load-bearing: retrieval and discard address records by
/// index, and menus list them in this order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRecordCollection {
    #[serde(rename = "player_uid")]
    pub owner: OwnerId,
    #[serde(rename = "vehicles", default)]
    pub records: Vec<StoredAssetRecord>,
}

impl OwnerRecordCollection {
    /// A fresh, empty collection for `owner`.
    pub fn empty(owner: OwnerId) -> Self {
        Self {
            owner,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Validate every record, reporting the first offending index.
    pub fn validate(&self) -> Result<(), TypeError> {
        for (index, record) in self.records.iter().enumerate() {
            record.validate().map_err(|e| TypeError::InvalidRecord {
                index,
                source: Box::new(e),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;

    fn sample_record() -> StoredAssetRecord {
        StoredAssetRecord::new(
            "{A1}Prefabs/Vehicles/Car/MyCar.et",
            Manifest::from_entries(vec![
                ManifestEntry::new("{B2}Prefabs/Items/Fuel/FuelCan.et", 2),
                ManifestEntry::new("{C3}Prefabs/Items/Toolkit/Toolkit.et", 1),
            ])
            .unwrap(),
            KeyCredential::new("1234-5678-90", "ABCD"),
        )
    }

    #[test]
    fn collection_matches_file_layout() {
        let mut c = OwnerRecordCollection::empty(OwnerId::new("P1").unwrap());
        c.records.push(sample_record());

        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "player_uid": "P1",
                "vehicles": [{
                    "prefab": "{A1}Prefabs/Vehicles/Car/MyCar.et",
                    "inventory": [
                        { "prefab": "{B2}Prefabs/Items/Fuel/FuelCan.et", "count": 2 },
                        { "prefab": "{C3}Prefabs/Items/Toolkit/Toolkit.et", "count": 1 }
                    ],
                    "key_id": "1234-5678-90",
                    "key_code": "ABCD"
                }]
            })
        );

        let back: OwnerRecordCollection = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn missing_vehicles_defaults_to_empty() {
        let c: OwnerRecordCollection = serde_json::from_str(r#"{"player_uid":"P9"}"#).unwrap();
        assert!(c.is_empty());
        assert_eq!(c.owner.as_str(), "P9");
    }

    #[test]
    fn display_name_strips_path_and_extension() {
        assert_eq!(sample_record().display_name(), "MyCar");

        let mut bare = sample_record();
        bare.template_ref = "NoPathHere".into();
        assert_eq!(bare.display_name(), "NoPathHere");

        bare.template_ref = "dir.v2/NoExtension".into();
        assert_eq!(bare.display_name(), "dir.v2/NoExtension");
    }

    #[test]
    fn validate_reports_offending_index() {
        let mut c = OwnerRecordCollection::empty(OwnerId::new("P1").unwrap());
        c.records.push(sample_record());
        let mut bad = sample_record();
        bad.template_ref.clear();
        c.records.push(bad);

        match c.validate().unwrap_err() {
            TypeError::InvalidRecord { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(*source, TypeError::EmptyTemplate);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn key_round_trips_through_record() {
        let r = sample_record();
        assert_eq!(r.key(), KeyCredential::new("1234-5678-90", "ABCD"));
        assert!(!r.key().is_unassigned());
        assert!(KeyCredential::default().is_unassigned());
    }
}
