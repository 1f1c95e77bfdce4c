//! Condition evaluation for effect groups

use crate::cooldown::CooldownStore;
use crate::dispatch::TriggerScope;
use crate::expr::{evaluate_or_zero, ExprContext};
use crate::host::{DamageCause, World};
use forge_core::{Condition, EffectGroup};
use rand::Rng;
use std::time::Duration;

/// Read-only state a condition may look at
pub struct ConditionContext<'a> {
    pub scope: &'a TriggerScope,
    /// In-flight damage of the triggering event
    pub damage: f64,
    pub cause: &'a DamageCause,
    pub world: &'a dyn World,
    pub cooldowns: &'a CooldownStore,
    pub now: Duration,
}

/// True iff every condition of the group passes
///
/// Conditions are checked in order and the first failure stops evaluation.
/// A `cooldown` condition only checks readiness; claiming the window is
/// left to the caller.
pub fn conditions_pass<R: Rng + ?Sized>(group: &EffectGroup, ctx: &ConditionContext<'_>, rng: &mut R) -> bool {
    for condition in &group.conditions {
        if !condition_passes(condition, group, ctx, rng) {
            tracing::trace!(group = %group.key, %condition, owner = %ctx.scope.owner, "Condition failed");
            return false;
        }
    }
    true
}

fn condition_passes<R: Rng + ?Sized>(
    condition: &Condition,
    group: &EffectGroup,
    ctx: &ConditionContext<'_>,
    rng: &mut R,
) -> bool {
    match condition {
        Condition::Chance(formula) => {
            let threshold = evaluate_or_zero(formula, &ExprContext::new(ctx.scope.level, ctx.damage));
            rng.gen_range(0.0..100.0) < threshold
        }
        Condition::HealthBelowPercent(limit) => ctx
            .world
            .health(ctx.scope.owner)
            .and_then(|health| health.percent())
            .is_some_and(|percent| percent <= *limit),
        Condition::IsProjectile => ctx.cause.is_projectile(),
        Condition::Cooldown { .. } => {
            let ready = ctx.cooldowns.is_ready(ctx.scope.owner, &group.key, group.cooldown(), ctx.now);
            if !ready {
                tracing::debug!(group = %group.key, owner = %ctx.scope.owner, "On cooldown");
            }
            ready
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::mock::MockWorld;
    use crate::host::{EntityId, Health};
    use forge_core::{Formula, GroupKey, TriggerKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const OWNER: EntityId = EntityId(1);
    const ENEMY: EntityId = EntityId(2);

    fn group(conditions: Vec<Condition>) -> EffectGroup {
        EffectGroup::new(GroupKey::ability("test", 0), TriggerKind::Attack, conditions, Vec::new())
    }

    fn world() -> MockWorld {
        let mut world = MockWorld::new();
        world.spawn(OWNER, 0.0, 20.0);
        world.spawn(ENEMY, 1.0, 20.0);
        world
    }

    fn scope(level: u32) -> TriggerScope {
        TriggerScope { trigger: TriggerKind::Attack, owner: OWNER, opposing: ENEMY, level }
    }

    fn check(group: &EffectGroup, world: &MockWorld, cause: DamageCause, cooldowns: &CooldownStore, now: Duration) -> bool {
        let scope = scope(1);
        let ctx = ConditionContext {
            scope: &scope,
            damage: 4.0,
            cause: &cause,
            world,
            cooldowns,
            now,
        };
        conditions_pass(group, &ctx, &mut ChaCha8Rng::seed_from_u64(9))
    }

    #[test]
    fn test_empty_conditions_always_pass() {
        let cooldowns = CooldownStore::new();
        let mut world = world();
        assert!(check(&group(vec![]), &world, DamageCause::Melee, &cooldowns, Duration::ZERO));

        // Regardless of entity state
        world.health.clear();
        assert!(check(&group(vec![]), &world, DamageCause::Magic, &cooldowns, Duration::ZERO));
    }

    #[test]
    fn test_chance_bounds() {
        let world = world();
        let cooldowns = CooldownStore::new();
        let scope = scope(1);
        let cause = DamageCause::Melee;
        let ctx = ConditionContext {
            scope: &scope,
            damage: 0.0,
            cause: &cause,
            world: &world,
            cooldowns: &cooldowns,
            now: Duration::ZERO,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let always = group(vec![Condition::Chance(Formula::new("100"))]);
        let never = group(vec![Condition::Chance(Formula::new("0"))]);
        for _ in 0..1000 {
            assert!(conditions_pass(&always, &ctx, &mut rng));
            assert!(!conditions_pass(&never, &ctx, &mut rng));
        }
    }

    #[test]
    fn test_chance_uses_level() {
        let world = world();
        let cooldowns = CooldownStore::new();
        let scope = scope(20);
        let cause = DamageCause::Melee;
        let ctx = ConditionContext {
            scope: &scope,
            damage: 0.0,
            cause: &cause,
            world: &world,
            cooldowns: &cooldowns,
            now: Duration::ZERO,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        // 20 * 5 = 100%
        let scaled = group(vec![Condition::Chance(Formula::new("{level_number} * 5"))]);
        assert!((0..200).all(|_| conditions_pass(&scaled, &ctx, &mut rng)));

        // Malformed chance fails soft to 0%
        let broken = group(vec![Condition::Chance(Formula::new("lots"))]);
        assert!(!(0..200).any(|_| conditions_pass(&broken, &ctx, &mut rng)));
    }

    #[test]
    fn test_health_below_percent() {
        let cooldowns = CooldownStore::new();
        let mut world = world();
        let low = group(vec![Condition::HealthBelowPercent(30.0)]);

        assert!(!check(&low, &world, DamageCause::Melee, &cooldowns, Duration::ZERO));

        world.health.insert(OWNER, Health::new(6.0, 20.0));
        assert!(check(&low, &world, DamageCause::Melee, &cooldowns, Duration::ZERO));

        world.health.insert(OWNER, Health::new(6.0, 0.0));
        assert!(!check(&low, &world, DamageCause::Melee, &cooldowns, Duration::ZERO));
    }

    #[test]
    fn test_is_projectile() {
        let cooldowns = CooldownStore::new();
        let world = world();
        let ranged = group(vec![Condition::IsProjectile]);
        assert!(check(&ranged, &world, DamageCause::Projectile, &cooldowns, Duration::ZERO));
        assert!(!check(&ranged, &world, DamageCause::Melee, &cooldowns, Duration::ZERO));
    }

    #[test]
    fn test_cooldown_checks_without_starting() {
        let cooldowns = CooldownStore::new();
        let world = world();
        let gated = group(vec![Condition::Cooldown { seconds: 5 }]);

        assert!(check(&gated, &world, DamageCause::Melee, &cooldowns, Duration::ZERO));
        assert!(cooldowns.is_empty());

        cooldowns.start(OWNER, &gated.key, Duration::ZERO);
        assert!(!check(&gated, &world, DamageCause::Melee, &cooldowns, Duration::from_secs(2)));
        assert!(check(&gated, &world, DamageCause::Melee, &cooldowns, Duration::from_secs(6)));
    }

    #[test]
    fn test_first_failure_short_circuits() {
        let world = world();
        let cooldowns = CooldownStore::new();
        let scope = scope(1);
        let mixed = group(vec![
            Condition::IsProjectile,
            Condition::Chance(Formula::new("100")),
        ]);

        // A chance roll consumes RNG output; a skipped one leaves the stream untouched
        let melee = DamageCause::Melee;
        let ctx = ConditionContext {
            scope: &scope,
            damage: 0.0,
            cause: &melee,
            world: &world,
            cooldowns: &cooldowns,
            now: Duration::ZERO,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        assert!(!conditions_pass(&mixed, &ctx, &mut rng));
        assert_eq!(rng.get_word_pos(), 0);

        let projectile = DamageCause::Projectile;
        let ctx = ConditionContext { cause: &projectile, ..ctx };
        assert!(conditions_pass(&mixed, &ctx, &mut rng));
        assert!(rng.get_word_pos() > 0);
    }
}
