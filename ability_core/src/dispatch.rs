//! Trigger Dispatcher - run every eligible effect group for a combat event
//!
//! Each side of the event is handled independently: the attacker's gear
//! fires its ATTACK groups, then the defender's gear fires its DEFEND
//! groups. A group contributes from every equipped item that carries its
//! ability, evaluated at that item's own level; the entity's active set
//! bonus tier adds its triggered groups at level 1.
//!
//! For each group: conditions are checked in order, then a group that
//! declares a cooldown atomically claims its window, then its effects run.
//! A group whose claim loses a race (or whose conditions fail) has no
//! effect and starts no cooldown.

use crate::condition::{conditions_pass, ConditionContext};
use crate::config::EngineConfig;
use crate::cooldown::CooldownStore;
use crate::executor::execute_effects;
use crate::host::{CombatEvent, EntityId, World};
use crate::set_bonus::select_set_bonus;
use crate::EngineError;
use forge_core::{equipped_ability_ids, index_item, DefinitionLookup, EffectGroup, ItemState, TriggerKind};
use rand::Rng;
use std::time::Duration;

/// Who a group runs for and against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerScope {
    pub trigger: TriggerKind,
    /// Entity whose gear owns the group
    pub owner: EntityId,
    /// Defender on ATTACK, attacker on DEFEND
    pub opposing: EntityId,
    /// Ability level on the contributing item (1 for set bonus groups)
    pub level: u32,
}

impl TriggerScope {
    pub fn for_side(event: &CombatEvent, trigger: TriggerKind, level: u32) -> Self {
        let (owner, opposing) = match trigger {
            TriggerKind::Attack => (event.attacker, event.defender),
            TriggerKind::Defend => (event.defender, event.attacker),
        };
        TriggerScope { trigger, owner, opposing, level }
    }
}

/// Counters from one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Groups whose trigger matched their side
    pub groups_considered: usize,
    /// Groups that passed conditions and claimed their cooldown
    pub groups_fired: usize,
    pub effects_applied: usize,
    /// Sides abandoned because the entity's equipment could not be read
    pub sides_skipped: usize,
}

/// Effect groups of one side, each with the level it evaluates at
pub fn collect_groups<'a>(
    items: &[ItemState],
    definitions: &'a dyn DefinitionLookup,
    trigger: TriggerKind,
) -> Vec<(&'a EffectGroup, u32)> {
    let mut groups = Vec::new();

    for item in items {
        for (ability, level) in index_item(item, definitions).abilities {
            groups.extend(ability.groups_for(trigger).map(|group| (group, level)));
        }
    }

    let equipped = equipped_ability_ids(items, definitions);
    if let Some(active) = select_set_bonus(definitions.set_bonuses(), &equipped) {
        groups.extend(
            active
                .tier
                .triggered
                .iter()
                .filter(|group| group.trigger == trigger)
                .map(|group| (group, 1)),
        );
    }

    groups
}

/// One dispatch over shared engine state at a fixed instant
pub struct Dispatcher<'a> {
    pub definitions: &'a dyn DefinitionLookup,
    pub cooldowns: &'a CooldownStore,
    pub config: &'a EngineConfig,
    pub now: Duration,
}

impl Dispatcher<'_> {
    /// Evaluate both sides of a combat event, mutating its damage in place
    pub fn dispatch<R: Rng + ?Sized>(
        &self,
        event: &mut CombatEvent,
        world: &mut dyn World,
        rng: &mut R,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for trigger in [TriggerKind::Attack, TriggerKind::Defend] {
            if let Err(error) = self.dispatch_side(trigger, event, world, rng, &mut report) {
                tracing::warn!(%trigger, %error, "Skipping side of combat event");
                report.sides_skipped += 1;
            }
        }

        report
    }

    fn dispatch_side<R: Rng + ?Sized>(
        &self,
        trigger: TriggerKind,
        event: &mut CombatEvent,
        world: &mut dyn World,
        rng: &mut R,
        report: &mut DispatchReport,
    ) -> Result<(), EngineError> {
        let owner = TriggerScope::for_side(event, trigger, 0).owner;
        let items = world
            .equipment(owner)
            .map_err(|source| EngineError::Equipment { entity: owner, source })?;

        for (group, level) in collect_groups(&items, self.definitions, trigger) {
            report.groups_considered += 1;
            let scope = TriggerScope::for_side(event, trigger, level);

            let ctx = ConditionContext {
                scope: &scope,
                damage: event.damage,
                cause: &event.cause,
                world: &*world,
                cooldowns: self.cooldowns,
                now: self.now,
            };
            if !conditions_pass(group, &ctx, rng) {
                continue;
            }

            let window = group.cooldown();
            if !window.is_zero() && !self.cooldowns.try_start(owner, &group.key, window, self.now) {
                tracing::debug!(group = %group.key, %owner, "Lost cooldown claim");
                continue;
            }

            report.groups_fired += 1;
            report.effects_applied += execute_effects(&group.effects, &scope, event, world, self.config);
        }

        Ok(())
    }
}
