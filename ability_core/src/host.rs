//! Host-facing types: the combat event, the world seam and the clock
//!
//! The engine never touches game state directly. Everything it reads or
//! changes goes through [`World`], which the host implements over its own
//! entity and item storage.

use forge_core::{AttributeKind, ItemState, ItemStateError, PotionSpec, PotionType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Host identifier of a living entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What dealt the triggering damage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageCause {
    Melee,
    Projectile,
    Magic,
    Other(String),
}

impl DamageCause {
    /// Classify a host cause tag such as `ENTITY_ATTACK` or `PROJECTILE`
    pub fn from_tag(tag: &str) -> Self {
        let upper = tag.to_ascii_uppercase();
        if upper.contains("PROJECTILE") {
            DamageCause::Projectile
        } else if upper.starts_with("ENTITY_") && upper.contains("ATTACK") {
            DamageCause::Melee
        } else if upper.contains("MAGIC") {
            DamageCause::Magic
        } else {
            DamageCause::Other(upper)
        }
    }

    pub fn is_projectile(&self) -> bool {
        matches!(self, DamageCause::Projectile)
    }
}

/// One entity-hits-entity event, with its in-flight damage total
#[derive(Debug, Clone, PartialEq)]
pub struct CombatEvent {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub damage: f64,
    pub cause: DamageCause,
}

impl CombatEvent {
    pub fn new(attacker: EntityId, defender: EntityId, damage: f64, cause: DamageCause) -> Self {
        CombatEvent { attacker, defender, damage, cause }
    }

    pub fn add_damage(&mut self, delta: f64) {
        self.damage += delta;
    }
}

/// Current and maximum health of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f64,
    pub max: f64,
}

impl Health {
    pub fn new(current: f64, max: f64) -> Self {
        Health { current, max }
    }

    /// Health as 0-100 (None if max health is not positive)
    pub fn percent(&self) -> Option<f64> {
        (self.max > 0.0).then(|| 100.0 * self.current / self.max)
    }

    /// Room left below max health
    pub fn missing(&self) -> f64 {
        (self.max - self.current).max(0.0)
    }
}

/// A potion application request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotionGrant {
    pub potion: PotionType,
    pub amplifier: u32,
    pub duration_ticks: u32,
    pub ambient: bool,
    pub particles: bool,
}

impl PotionGrant {
    /// Grant fired by a triggered effect
    pub fn triggered(spec: &PotionSpec) -> Self {
        PotionGrant {
            potion: spec.potion,
            amplifier: spec.amplifier,
            duration_ticks: spec.duration_ticks,
            ambient: false,
            particles: true,
        }
    }

    /// Quiet refresh used by the passive pass
    pub fn passive(potion: PotionType, amplifier: u32, duration_ticks: u32) -> Self {
        PotionGrant {
            potion,
            amplifier,
            duration_ticks,
            ambient: true,
            particles: false,
        }
    }
}

/// An additive attribute modifier identified by its tag
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeModifier {
    pub attribute: AttributeKind,
    pub tag: String,
    pub value: f64,
}

/// Game-state access the engine needs from the host
pub trait World {
    /// Entities the passive pass should visit
    fn active_entities(&self) -> Vec<EntityId>;

    /// Snapshot of the entity's equipped items (armour plus main hand)
    fn equipment(&self, entity: EntityId) -> Result<Vec<ItemState>, ItemStateError>;

    /// None for entities without health (or unknown entities)
    fn health(&self, entity: EntityId) -> Option<Health>;

    /// Living entities within `radius` of `center`, possibly including it
    fn nearby_living(&self, center: EntityId, radius: f64) -> Vec<EntityId>;

    fn is_alive(&self, entity: EntityId) -> bool {
        self.health(entity).is_some_and(|h| h.current > 0.0)
    }

    fn add_potion_effect(&mut self, entity: EntityId, grant: PotionGrant);

    fn remove_potion_effect(&mut self, entity: EntityId, potion: PotionType);

    fn set_attribute_modifier(&mut self, entity: EntityId, modifier: AttributeModifier);

    /// Remove every modifier whose tag starts with `tag_prefix`
    fn clear_tagged_attribute_modifiers(&mut self, entity: EntityId, tag_prefix: &str);

    fn heal(&mut self, entity: EntityId, amount: f64);

    fn ignite_for_ticks(&mut self, entity: EntityId, ticks: u32);

    fn play_sound(&mut self, at: EntityId, sound: &str, pitch: f32);

    fn spawn_particle(&mut self, at: EntityId, particle: &str, count: u32);
}

/// Monotonic time source for cooldowns
pub trait Clock: Send + Sync {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Wall-clock time measured from construction
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Externally driven clock, for hosts on simulation time and for tests
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, to: Duration) {
        self.millis.store(to.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_classification() {
        assert!(DamageCause::from_tag("PROJECTILE").is_projectile());
        assert!(DamageCause::from_tag("projectile_arrow").is_projectile());
        assert_eq!(DamageCause::from_tag("ENTITY_ATTACK"), DamageCause::Melee);
        assert_eq!(DamageCause::from_tag("ENTITY_SWEEP_ATTACK"), DamageCause::Melee);
        assert_eq!(DamageCause::from_tag("magic"), DamageCause::Magic);
        assert_eq!(DamageCause::from_tag("lava"), DamageCause::Other("LAVA".to_string()));
    }

    #[test]
    fn test_health_percent() {
        assert_eq!(Health::new(5.0, 20.0).percent(), Some(25.0));
        assert_eq!(Health::new(5.0, 0.0).percent(), None);
        assert_eq!(Health::new(18.0, 20.0).missing(), 2.0);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.advance(Duration::from_secs(2));
        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.now(), Duration::from_millis(2500));
        clock.set(Duration::from_secs(10));
        assert_eq!(clock.now(), Duration::from_secs(10));
    }
}
