use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// One coalesced line of a container manifest: a template and how many
/// instances of it the container held.
///
/// Serialized as `{ "prefab": "...", "count": n }`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Template (prefab) reference of the item.
    #[serde(rename = "prefab")]
    pub template_ref: String,
    /// Number of instances. Always at least one in a valid manifest.
    pub count: u32,
}

impl ManifestEntry {
    pub fn new(template_ref: impl Into<String>, count: u32) -> Self {
        Self {
            template_ref: template_ref.into(),
            count,
        }
    }
}

/// The coalesced `template -> count` contents of a container.
///
/// Entry order is preserved exactly as stored; restoring a manifest walks the
/// entries in this order. A valid manifest never lists the same template
/// twice and never carries a zero count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Vec<ManifestEntry>);

impl Manifest {
    /// An empty manifest.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a manifest from entries, rejecting zero counts and duplicate
    /// templates.
    pub fn from_entries(entries: Vec<ManifestEntry>) -> Result<Self, TypeError> {
        let manifest = Self(entries);
        manifest.validate()?;
        Ok(manifest)
    }

    /// Build a manifest from `(template, count)` pairs, summing repeated
    /// templates into their first position and dropping zero counts. The
    /// result always satisfies the coalescing invariants.
    pub fn from_counts<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut entries: Vec<ManifestEntry> = Vec::new();
        for (template, count) in pairs {
            if count == 0 {
                continue;
            }
            let template = template.into();
            match entries.iter_mut().find(|e| e.template_ref == template) {
                Some(entry) => entry.count = entry.count.saturating_add(count),
                None => entries.push(ManifestEntry::new(template, count)),
            }
        }
        Self(entries)
    }

    /// Check the coalescing invariants.
    pub fn validate(&self) -> Result<(), TypeError> {
        let mut seen = HashSet::with_capacity(self.0.len());
        for entry in &self.0 {
            if entry.count == 0 {
                return Err(TypeError::ZeroCount {
                    template: entry.template_ref.clone(),
                });
            }
            if !seen.insert(entry.template_ref.as_str()) {
                return Err(TypeError::DuplicateTemplate {
                    template: entry.template_ref.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestEntry> {
        self.0.iter()
    }

    /// Number of distinct templates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of item instances across all entries.
    pub fn total_items(&self) -> u64 {
        self.0.iter().map(|e| u64::from(e.count)).sum()
    }

    /// Count recorded for `template_ref`, or zero when absent.
    pub fn count_of(&self, template_ref: &str) -> u32 {
        self.0
            .iter()
            .find(|e| e.template_ref == template_ref)
            .map(|e| e.count)
            .unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = std::slice::Iter<'a, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_entries_accepts_coalesced() {
        let m = Manifest::from_entries(vec![
            ManifestEntry::new("items/FuelCan.et", 2),
            ManifestEntry::new("items/Toolkit.et", 1),
        ])
        .unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.total_items(), 3);
        assert_eq!(m.count_of("items/FuelCan.et"), 2);
        assert_eq!(m.count_of("items/Missing.et"), 0);
    }

    #[test]
    fn rejects_zero_count() {
        let err = Manifest::from_entries(vec![ManifestEntry::new("items/FuelCan.et", 0)])
            .unwrap_err();
        assert!(matches!(err, TypeError::ZeroCount { .. }));
    }

    #[test]
    fn rejects_duplicate_template() {
        let err = Manifest::from_entries(vec![
            ManifestEntry::new("items/FuelCan.et", 1),
            ManifestEntry::new("items/FuelCan.et", 1),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            TypeError::DuplicateTemplate {
                template: "items/FuelCan.et".into()
            }
        );
    }

    #[test]
    fn from_counts_coalesces_and_drops_zero() {
        let m = Manifest::from_counts([("b", 1), ("a", 0), ("b", 2), ("c", 1)]);
        assert_eq!(
            m.entries(),
            &[ManifestEntry::new("b", 3), ManifestEntry::new("c", 1)]
        );
        assert!(m.validate().is_ok());
    }

    #[test]
    fn serializes_as_slot_array() {
        let m = Manifest::from_entries(vec![ManifestEntry::new("items/FuelCan.et", 2)]).unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "prefab": "items/FuelCan.et", "count": 2 }])
        );
    }

    #[test]
    fn negative_count_does_not_parse() {
        let parsed = serde_json::from_str::<Manifest>(r#"[{"prefab":"x","count":-1}]"#);
        assert!(parsed.is_err());
    }
}
