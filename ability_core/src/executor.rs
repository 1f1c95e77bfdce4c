//! Effect Executor - apply decoded effects to the event and the world

use crate::config::EngineConfig;
use crate::dispatch::TriggerScope;
use crate::expr::{evaluate_or_zero, ExprContext};
use crate::host::{CombatEvent, EntityId, PotionGrant, World};
use forge_core::{AoeCenter, Effect};
use thiserror::Error;

/// Why a single effect was skipped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EffectError {
    #[error("Entity {0} has no health to heal")]
    NoHealth(EntityId),
    #[error("Invalid area radius {0}")]
    InvalidRadius(f64),
}

/// Execute a group's effects in order; returns how many were applied
///
/// A failing effect is logged and skipped, the rest still run.
pub fn execute_effects(
    effects: &[Effect],
    scope: &TriggerScope,
    event: &mut CombatEvent,
    world: &mut dyn World,
    config: &EngineConfig,
) -> usize {
    let mut applied = 0;
    for effect in effects {
        match execute_effect(effect, scope, event, world, config) {
            Ok(()) => applied += 1,
            Err(error) => {
                tracing::warn!(%effect, owner = %scope.owner, %error, "Could not execute effect");
            }
        }
    }
    applied
}

fn execute_effect(
    effect: &Effect,
    scope: &TriggerScope,
    event: &mut CombatEvent,
    world: &mut dyn World,
    config: &EngineConfig,
) -> Result<(), EffectError> {
    let ctx = ExprContext::new(scope.level, event.damage);

    match effect {
        Effect::DealDamage(formula) => {
            event.add_damage(evaluate_or_zero(formula, &ctx));
        }
        Effect::Heal(formula) => {
            let health = world.health(scope.owner).ok_or(EffectError::NoHealth(scope.owner))?;
            let amount = evaluate_or_zero(formula, &ctx).min(health.missing());
            if amount > 0.0 {
                world.heal(scope.owner, amount);
            }
        }
        Effect::TargetPotion(spec) => {
            world.add_potion_effect(scope.opposing, PotionGrant::triggered(spec));
        }
        Effect::AttackerPotion(spec) => {
            world.add_potion_effect(event.attacker, PotionGrant::triggered(spec));
        }
        Effect::AttackerFire { ticks } => {
            world.ignite_for_ticks(event.attacker, *ticks);
        }
        Effect::Sound { name, pitch } => {
            world.play_sound(scope.owner, name, *pitch);
        }
        Effect::Particle { name } => {
            let at = if world.is_alive(scope.opposing) { scope.opposing } else { scope.owner };
            world.spawn_particle(at, name, config.particle_count);
        }
        Effect::AreaPotion { center, radius, potion } => {
            if !(radius.is_finite() && *radius > 0.0) {
                return Err(EffectError::InvalidRadius(*radius));
            }
            let origin = match center {
                AoeCenter::Owner => scope.owner,
                AoeCenter::Target => scope.opposing,
            };
            let radius = radius.min(config.aoe_max_radius);
            let grant = PotionGrant::triggered(potion);
            for entity in world.nearby_living(origin, radius) {
                if entity != scope.owner {
                    world.add_potion_effect(entity, grant);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::{Call, MockWorld};
    use crate::host::{DamageCause, Health};
    use forge_core::{Formula, PotionSpec, PotionType, TriggerKind};

    const ATTACKER: EntityId = EntityId(1);
    const DEFENDER: EntityId = EntityId(2);

    fn world() -> MockWorld {
        let mut world = MockWorld::new();
        world.spawn(ATTACKER, 0.0, 20.0);
        world.spawn(DEFENDER, 2.0, 20.0);
        world
    }

    fn event() -> CombatEvent {
        CombatEvent::new(ATTACKER, DEFENDER, 5.0, DamageCause::Melee)
    }

    fn run(effects: &[Effect], trigger: TriggerKind, level: u32, world: &mut MockWorld) -> (CombatEvent, usize) {
        let mut event = event();
        let scope = TriggerScope::for_side(&event, trigger, level);
        let applied = execute_effects(effects, &scope, &mut event, world, &EngineConfig::default());
        (event, applied)
    }

    fn slow() -> PotionSpec {
        PotionSpec { potion: PotionType::Slowness, amplifier: 1, duration_ticks: 60 }
    }

    #[test]
    fn test_deal_damage_uses_level() {
        let mut world = world();
        let effects = [Effect::DealDamage(Formula::new("{level_number}*2"))];
        let (event, applied) = run(&effects, TriggerKind::Defend, 3, &mut world);
        assert_eq!(applied, 1);
        assert_eq!(event.damage, 11.0);
    }

    #[test]
    fn test_damage_sees_earlier_deltas() {
        let mut world = world();
        let effects = [
            Effect::DealDamage(Formula::new("5")),
            Effect::DealDamage(Formula::new("{damage} * 0.5")),
        ];
        let (event, _) = run(&effects, TriggerKind::Attack, 1, &mut world);
        assert_eq!(event.damage, 15.0);
    }

    #[test]
    fn test_heal_capped_at_max() {
        let mut world = world();
        world.health.insert(DEFENDER, Health::new(17.0, 20.0));
        let effects = [Effect::Heal(Formula::new("10"))];
        run(&effects, TriggerKind::Defend, 1, &mut world);

        assert_eq!(world.take_calls(), vec![Call::Heal(DEFENDER, 3.0)]);
        assert_eq!(world.health[&DEFENDER].current, 20.0);
    }

    #[test]
    fn test_heal_without_health_is_skipped() {
        let mut world = world();
        world.health.remove(&ATTACKER);
        let effects = [Effect::Heal(Formula::new("2")), Effect::AttackerFire { ticks: 40 }];
        let (_, applied) = run(&effects, TriggerKind::Attack, 1, &mut world);

        assert_eq!(applied, 1);
        assert_eq!(world.take_calls(), vec![Call::Ignite(ATTACKER, 40)]);
    }

    #[test]
    fn test_potion_targets() {
        let mut world = world();
        let effects = [Effect::TargetPotion(slow()), Effect::AttackerPotion(slow())];

        run(&effects, TriggerKind::Attack, 1, &mut world);
        assert_eq!(world.potions_added(DEFENDER).len(), 1);
        assert_eq!(world.potions_added(ATTACKER).len(), 1);
        world.take_calls();

        // On DEFEND the opposing entity is the attacker
        run(&effects, TriggerKind::Defend, 1, &mut world);
        assert_eq!(world.potions_added(ATTACKER).len(), 2);
        assert!(world.potions_added(DEFENDER).is_empty());

        let grant = world.potions_added(ATTACKER)[0];
        assert_eq!(grant, PotionGrant::triggered(&slow()));
        assert!(grant.particles && !grant.ambient);
    }

    #[test]
    fn test_attacker_fire_on_defend() {
        let mut world = world();
        run(&[Effect::AttackerFire { ticks: 80 }], TriggerKind::Defend, 1, &mut world);
        assert_eq!(world.take_calls(), vec![Call::Ignite(ATTACKER, 80)]);
    }

    #[test]
    fn test_sound_and_particle() {
        let mut world = world();
        let effects = [
            Effect::Sound { name: "ENTITY_BLAZE_SHOOT".into(), pitch: 1.5 },
            Effect::Particle { name: "FLAME".into() },
        ];
        run(&effects, TriggerKind::Attack, 1, &mut world);
        assert_eq!(world.take_calls(), vec![
            Call::Sound(ATTACKER, "ENTITY_BLAZE_SHOOT".into(), 1.5),
            Call::Particle(DEFENDER, "FLAME".into(), 10),
        ]);

        // Dead target: burst falls back to the owner
        world.health.insert(DEFENDER, Health::new(0.0, 20.0));
        run(&effects[1..], TriggerKind::Attack, 1, &mut world);
        assert_eq!(world.take_calls(), vec![Call::Particle(ATTACKER, "FLAME".into(), 10)]);
    }

    #[test]
    fn test_area_potion_excludes_owner() {
        let mut world = world();
        world.spawn(EntityId(3), 4.0, 10.0);
        world.spawn(EntityId(4), 50.0, 10.0);

        let effects = [Effect::AreaPotion { center: AoeCenter::Target, radius: 3.0, potion: slow() }];
        run(&effects, TriggerKind::Attack, 1, &mut world);

        // Centred on the defender at 2.0: attacker (owner) and #3 are in range, #4 is not
        assert!(world.potions_added(ATTACKER).is_empty());
        assert_eq!(world.potions_added(DEFENDER).len(), 1);
        assert_eq!(world.potions_added(EntityId(3)).len(), 1);
        assert!(world.potions_added(EntityId(4)).is_empty());
    }

    #[test]
    fn test_area_potion_radius_clamped() {
        let mut world = world();
        world.spawn(EntityId(4), 50.0, 10.0);

        let effects = [Effect::AreaPotion { center: AoeCenter::Owner, radius: 1000.0, potion: slow() }];
        run(&effects, TriggerKind::Attack, 1, &mut world);
        assert_eq!(world.potions_added(DEFENDER).len(), 1);
        assert!(world.potions_added(EntityId(4)).is_empty());
    }

    #[test]
    fn test_invalid_radius_skipped() {
        let mut world = world();
        let effects = [
            Effect::AreaPotion { center: AoeCenter::Owner, radius: -2.0, potion: slow() },
            Effect::DealDamage(Formula::new("1")),
        ];
        let (event, applied) = run(&effects, TriggerKind::Attack, 1, &mut world);
        assert_eq!(applied, 1);
        assert_eq!(event.damage, 6.0);
        assert!(world.take_calls().is_empty());
    }
}
