//! Prelude module for convenient imports
//!
//! ```rust
//! use ability_core::prelude::*;
//! ```

// Engine
pub use crate::engine::{AbilityEngine, TickReport};
pub use crate::config::EngineConfig;
pub use crate::tick::TickTimer;

// Host seams
pub use crate::host::{
    AttributeModifier, Clock, CombatEvent, DamageCause, EntityId, Health, ManualClock, PotionGrant,
    SystemClock, World,
};

// Reports
pub use crate::dispatch::DispatchReport;
pub use crate::passive::ReconcileOutcome;

// Re-exports from forge_core
pub use forge_core::{DefinitionLookup, DefinitionRegistry, ItemState, PotionType, AttributeKind, TriggerKind};
