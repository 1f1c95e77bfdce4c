//! Item Ability Index - resolve an item's stored IDs against the registry

use crate::definition::{AbilityDefinition, RuneDefinition};
use crate::item::ItemState;
use crate::registry::DefinitionLookup;
use std::collections::BTreeSet;

/// Definitions present on one item, with that item's own levels
#[derive(Debug, Clone, Default)]
pub struct ItemAbilities<'a> {
    /// Abilities on the item with the level stored on this item
    pub abilities: Vec<(&'a AbilityDefinition, u32)>,
    /// Socketed runes, in slot order (duplicates kept)
    pub runes: Vec<&'a RuneDefinition>,
}

impl<'a> ItemAbilities<'a> {
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty() && self.runes.is_empty()
    }
}

/// Resolve the abilities and socketed runes of an item
///
/// IDs that no longer resolve (e.g. removed from config) are skipped.
pub fn index_item<'a>(item: &ItemState, definitions: &'a dyn DefinitionLookup) -> ItemAbilities<'a> {
    let mut indexed = ItemAbilities::default();

    for (id, level) in &item.abilities {
        match definitions.ability(id) {
            Some(ability) => indexed.abilities.push((ability, *level)),
            None => tracing::debug!(ability = %id, "Ignoring unknown ability on item"),
        }
    }

    for rune_id in item.socketed_runes() {
        match definitions.rune(rune_id) {
            Some(rune) => indexed.runes.push(rune),
            None => tracing::debug!(rune = %rune_id, "Ignoring unknown rune in socket"),
        }
    }

    indexed
}

/// Distinct ability IDs known to the registry across a set of items
///
/// IDs are returned in the registry's canonical (lower-cased) form, whatever
/// case the item map used.
pub fn equipped_ability_ids(items: &[ItemState], definitions: &dyn DefinitionLookup) -> BTreeSet<String> {
    items
        .iter()
        .flat_map(|item| item.abilities.keys())
        .filter_map(|id| definitions.ability(id).map(|ability| ability.id.clone()))
        .collect()
}
