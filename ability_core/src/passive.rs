//! Passive Aggregator and Reconciler
//!
//! Every tick each entity's steady-state bonuses are recomputed from its
//! socketed runes plus its active set bonus tier, then pushed to the world:
//!
//! - Potions: types that were active last tick but not this one are
//!   removed; every active type is refreshed with a short ambient grant, so
//!   a bonus lapses on its own if the refresh stops.
//! - Attributes: every modifier carrying the engine's tag prefix is
//!   cleared, then one modifier per attribute is installed with the summed
//!   value. Modifiers are replaced wholesale, never diffed.

use crate::config::EngineConfig;
use crate::host::{AttributeModifier, EntityId, PotionGrant, World};
use crate::set_bonus::select_set_bonus;
use forge_core::{equipped_ability_ids, index_item, AttributeKind, DefinitionLookup, ItemState, PassiveEffect, PotionType};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const SHARD_COUNT: usize = 16;

/// Aggregated passive bonuses of one entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassiveBonuses {
    /// Highest amplifier per potion type
    pub potions: BTreeMap<PotionType, u32>,
    /// Summed additive value per attribute
    pub attributes: BTreeMap<AttributeKind, f64>,
}

impl PassiveBonuses {
    pub fn add(&mut self, effect: &PassiveEffect) {
        match *effect {
            PassiveEffect::Potion { potion, amplifier } => {
                let current = self.potions.entry(potion).or_insert(amplifier);
                *current = (*current).max(amplifier);
            }
            PassiveEffect::Attribute { attribute, value } => {
                *self.attributes.entry(attribute).or_insert(0.0) += value;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.potions.is_empty() && self.attributes.is_empty()
    }
}

/// Aggregate runes across all equipped items plus the active set bonus tier
pub fn aggregate(items: &[ItemState], definitions: &dyn DefinitionLookup) -> PassiveBonuses {
    let mut bonuses = PassiveBonuses::default();

    for item in items {
        for rune in index_item(item, definitions).runes {
            rune.effects.iter().for_each(|effect| bonuses.add(effect));
        }
    }

    let equipped = equipped_ability_ids(items, definitions);
    if let Some(active) = select_set_bonus(definitions.set_bonuses(), &equipped) {
        active.tier.passive_effects.iter().for_each(|effect| bonuses.add(effect));
    }

    bonuses
}

/// What one reconcile pushed to the world
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub potions_applied: usize,
    pub potions_removed: usize,
    pub modifiers_installed: usize,
}

/// Per-entity memory of the potion types applied last tick
#[derive(Debug)]
pub struct Reconciler {
    shards: Vec<Mutex<HashMap<EntityId, BTreeSet<PotionType>>>>,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Reconciler {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, entity: EntityId) -> &Mutex<HashMap<EntityId, BTreeSet<PotionType>>> {
        &self.shards[(entity.0 % SHARD_COUNT as u64) as usize]
    }

    /// Bring the entity's passive potions and modifiers in line with `bonuses`
    pub fn reconcile(
        &self,
        entity: EntityId,
        bonuses: &PassiveBonuses,
        world: &mut dyn World,
        config: &EngineConfig,
    ) -> ReconcileOutcome {
        let mut outcome = ReconcileOutcome::default();
        let active: BTreeSet<PotionType> = bonuses.potions.keys().copied().collect();

        let previous = {
            let mut shard = self.shard(entity).lock();
            if active.is_empty() {
                shard.remove(&entity)
            } else {
                shard.insert(entity, active.clone())
            }
        }
        .unwrap_or_default();

        for potion in previous.difference(&active) {
            world.remove_potion_effect(entity, *potion);
            outcome.potions_removed += 1;
        }

        for (potion, amplifier) in &bonuses.potions {
            let grant = PotionGrant::passive(*potion, *amplifier, config.passive_potion_duration_ticks);
            world.add_potion_effect(entity, grant);
            outcome.potions_applied += 1;
        }

        world.clear_tagged_attribute_modifiers(entity, &config.attribute_tag_prefix);
        for (attribute, value) in &bonuses.attributes {
            world.set_attribute_modifier(
                entity,
                AttributeModifier {
                    attribute: *attribute,
                    tag: config.attribute_tag(*attribute),
                    value: *value,
                },
            );
            outcome.modifiers_installed += 1;
        }

        tracing::trace!(
            %entity,
            applied = outcome.potions_applied,
            removed = outcome.potions_removed,
            modifiers = outcome.modifiers_installed,
            "Reconciled passives"
        );
        outcome
    }

    /// Potion types applied to the entity on its last reconcile
    pub fn applied_potions(&self, entity: EntityId) -> BTreeSet<PotionType> {
        self.shard(entity).lock().get(&entity).cloned().unwrap_or_default()
    }

    pub fn forget(&self, entity: EntityId) {
        self.shard(entity).lock().remove(&entity);
    }
}
