//! ability_core - Rule engine for item abilities, runes and set bonuses
//!
//! This library provides:
//! - AbilityEngine: entry point for combat events and the passive tick
//! - Trigger dispatch: conditions, cooldowns and effects per effect group
//! - Passive aggregation: rune and set bonus potions/attributes, reconciled each tick
//! - World / Clock: the seams a host implements over its own game state
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use ability_core::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = DefinitionRegistry::load(Path::new("definitions/"))?;
//! let engine = AbilityEngine::new(Arc::new(registry), EngineConfig::default())?;
//!
//! // From the host's damage callback
//! let mut event = CombatEvent::new(attacker, defender, 6.0, DamageCause::from_tag("ENTITY_ATTACK"));
//! engine.on_combat_event(&mut event, &mut world);
//! host.set_damage(event.damage);
//!
//! // From the host's frame loop
//! let mut timer = engine.tick_timer();
//! for _ in 0..timer.advance(frame_delta) {
//!     engine.on_tick(&mut world);
//! }
//! ```

pub mod condition;
pub mod config;
pub mod cooldown;
pub mod dispatch;
pub mod engine;
pub mod executor;
pub mod expr;
pub mod host;
pub mod passive;
pub mod prelude;
pub mod set_bonus;
pub mod tick;

pub use config::EngineConfig;
pub use cooldown::CooldownStore;
pub use dispatch::{DispatchReport, Dispatcher, TriggerScope};
pub use engine::{AbilityEngine, TickReport};
pub use expr::{evaluate, ExprContext, ExprError};
pub use host::{
    AttributeModifier, Clock, CombatEvent, DamageCause, EntityId, Health, ManualClock, PotionGrant,
    SystemClock, World,
};
pub use passive::{aggregate, PassiveBonuses, ReconcileOutcome, Reconciler};
pub use set_bonus::{select_set_bonus, ActiveSetBonus};
pub use tick::TickTimer;

use forge_core::ItemStateError;
use thiserror::Error;

/// Fault that aborts one entity's share of a dispatch or passive pass
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Could not read equipment of {entity}: {source}")]
    Equipment {
        entity: EntityId,
        #[source]
        source: ItemStateError,
    },
    #[error("Invalid engine configuration: {0}")]
    Config(#[from] config::ConfigError),
}
