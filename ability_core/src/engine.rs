//! The engine facade hosts call into from their event bus and scheduler

use crate::config::EngineConfig;
use crate::cooldown::CooldownStore;
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::host::{Clock, CombatEvent, EntityId, SystemClock, World};
use crate::passive::{aggregate, ReconcileOutcome, Reconciler};
use crate::tick::TickTimer;
use crate::EngineError;
use forge_core::DefinitionLookup;
use rand::Rng;
use std::sync::Arc;

/// Counters from one passive pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub entities_visited: usize,
    /// Entities skipped because their equipment could not be read
    pub entities_failed: usize,
    pub potions_applied: usize,
    pub potions_removed: usize,
    pub modifiers_installed: usize,
}

impl TickReport {
    fn record(&mut self, outcome: ReconcileOutcome) {
        self.potions_applied += outcome.potions_applied;
        self.potions_removed += outcome.potions_removed;
        self.modifiers_installed += outcome.modifiers_installed;
    }
}

/// Ability rule engine: trigger dispatch plus the passive pass
///
/// Holds its own cooldown and reconciliation state, so independent
/// instances never interfere. All methods take `&self`; the engine can be
/// shared across the combat-event thread and a scheduler thread.
pub struct AbilityEngine {
    definitions: Arc<dyn DefinitionLookup>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    cooldowns: CooldownStore,
    reconciler: Reconciler,
}

impl AbilityEngine {
    /// Create an engine on wall-clock time
    pub fn new(definitions: Arc<dyn DefinitionLookup>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(AbilityEngine {
            definitions,
            config,
            clock: Arc::new(SystemClock::new()),
            cooldowns: CooldownStore::new(),
            reconciler: Reconciler::new(),
        })
    }

    /// Replace the cooldown time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn definitions(&self) -> &dyn DefinitionLookup {
        self.definitions.as_ref()
    }

    pub fn cooldowns(&self) -> &CooldownStore {
        &self.cooldowns
    }

    /// Timer at the configured passive cadence
    pub fn tick_timer(&self) -> TickTimer {
        TickTimer::new(self.config.tick_interval())
    }

    /// Handle one combat event; mutates `event.damage` in place
    pub fn on_combat_event(&self, event: &mut CombatEvent, world: &mut dyn World) -> DispatchReport {
        self.on_combat_event_with_rng(event, world, &mut rand::thread_rng())
    }

    pub fn on_combat_event_with_rng<R: Rng + ?Sized>(
        &self,
        event: &mut CombatEvent,
        world: &mut dyn World,
        rng: &mut R,
    ) -> DispatchReport {
        let dispatcher = Dispatcher {
            definitions: self.definitions.as_ref(),
            cooldowns: &self.cooldowns,
            config: &self.config,
            now: self.clock.now(),
        };
        dispatcher.dispatch(event, world, rng)
    }

    /// Run one passive pass over every active entity
    pub fn on_tick(&self, world: &mut dyn World) -> TickReport {
        let mut report = TickReport::default();

        for entity in world.active_entities() {
            report.entities_visited += 1;
            match self.tick_entity(entity, world) {
                Ok(outcome) => report.record(outcome),
                Err(error) => {
                    tracing::warn!(%entity, %error, "Skipping passive pass for entity");
                    report.entities_failed += 1;
                }
            }
        }

        tracing::debug!(
            visited = report.entities_visited,
            failed = report.entities_failed,
            "Passive pass complete"
        );
        report
    }

    /// Recompute and apply one entity's passive bonuses
    pub fn tick_entity(&self, entity: EntityId, world: &mut dyn World) -> Result<ReconcileOutcome, EngineError> {
        let items = world
            .equipment(entity)
            .map_err(|source| EngineError::Equipment { entity, source })?;
        let bonuses = aggregate(&items, self.definitions.as_ref());
        Ok(self.reconciler.reconcile(entity, &bonuses, world, &self.config))
    }

    /// Drop cooldown and reconciliation state for an entity that left
    pub fn forget_entity(&self, entity: EntityId) {
        self.cooldowns.forget(entity);
        self.reconciler.forget(entity);
    }
}
