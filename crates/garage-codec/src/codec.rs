use std::collections::BTreeMap;

use garage_types::Manifest;
use tracing::warn;

use crate::error::CodecError;

/// An item sitting in a container, as far as the codec is concerned.
pub trait ContainedItem {
    /// Template (prefab) reference the item was spawned from.
    fn template_ref(&self) -> &str;

    /// Whether the item carries a weapon capability.
    fn is_weapon(&self) -> bool;
}

impl<T: ContainedItem + ?Sized> ContainedItem for &T {
    fn template_ref(&self) -> &str {
        (**self).template_ref()
    }

    fn is_weapon(&self) -> bool {
        (**self).is_weapon()
    }
}

/// Request to spawn one instance of a template into a container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnInstruction {
    pub template_ref: String,
}

/// Coalesce container contents into a manifest.
///
/// The whole container is checked for weapons before anything is counted.
/// Items without a template reference cannot be rebuilt and are skipped.
/// The resulting entries are sorted by template reference.
pub fn capture<I>(items: I) -> Result<Manifest, CodecError>
where
    I: IntoIterator,
    I::Item: ContainedItem,
{
    let items: Vec<I::Item> = items.into_iter().collect();

    if let Some(weapon) = items.iter().find(|item| item.is_weapon()) {
        return Err(CodecError::WeaponPresent {
            template: weapon.template_ref().to_string(),
        });
    }

    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for item in &items {
        let template = item.template_ref();
        if template.is_empty() {
            warn!("skipping container item without a template reference");
            continue;
        }
        let count = counts.entry(template).or_insert(0);
        *count = count.saturating_add(1);
    }

    Ok(Manifest::from_counts(counts))
}

/// Expand a manifest into spawn instructions, `count` per entry, in the
/// manifest's stored order.
pub fn restore(manifest: &Manifest) -> Vec<SpawnInstruction> {
    let total = usize::try_from(manifest.total_items()).unwrap_or(usize::MAX);
    let mut out = Vec::with_capacity(total);
    for entry in manifest {
        for _ in 0..entry.count {
            out.push(SpawnInstruction {
                template_ref: entry.template_ref.clone(),
            });
        }
    }
    out
}
