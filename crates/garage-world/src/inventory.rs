//! Inventory queries shared by deposit and retrieval.

use std::collections::HashSet;

use garage_types::EntityId;

use crate::error::WorldResult;
use crate::world::{ItemInfo, World};

/// First item in `container` (storage order) matching `predicate`.
pub fn find_first<F>(
    world: &dyn World,
    container: EntityId,
    predicate: F,
) -> WorldResult<Option<ItemInfo>>
where
    F: Fn(&ItemInfo) -> bool,
{
    Ok(world.items(container)?.into_iter().find(|item| predicate(item)))
}

/// Ids of the keys `holder` is carrying: items spawned from `key_template`
/// whose lock credential has a non-empty id.
pub fn held_key_ids(
    world: &dyn World,
    holder: EntityId,
    key_template: &str,
) -> WorldResult<HashSet<String>> {
    Ok(world
        .items(holder)?
        .into_iter()
        .filter(|item| item.template_ref == key_template)
        .filter_map(|item| item.key)
        .filter(|key| !key.key_id.is_empty())
        .map(|key| key.key_id)
        .collect())
}
