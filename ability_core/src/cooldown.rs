//! Per-entity, per-group cooldown tracking
//!
//! State is sharded by entity ID so the trigger path and the passive pass
//! can run on different threads without contending on one lock.

use crate::host::EntityId;
use forge_core::GroupKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

const SHARD_COUNT: usize = 16;

type Shard = HashMap<EntityId, HashMap<GroupKey, Duration>>;

/// Last-fire timestamps keyed by (entity, effect group)
#[derive(Debug)]
pub struct CooldownStore {
    shards: Vec<Mutex<Shard>>,
}

impl Default for CooldownStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CooldownStore {
    pub fn new() -> Self {
        CooldownStore {
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    fn shard(&self, entity: EntityId) -> &Mutex<Shard> {
        &self.shards[(entity.0 % SHARD_COUNT as u64) as usize]
    }

    fn ready_in(shard: &Shard, entity: EntityId, key: &GroupKey, window: Duration, now: Duration) -> bool {
        match shard.get(&entity).and_then(|groups| groups.get(key)) {
            Some(last) => now.saturating_sub(*last) >= window,
            None => true,
        }
    }

    /// True if the group may fire: no record, or `window` has elapsed since the last fire
    pub fn is_ready(&self, entity: EntityId, key: &GroupKey, window: Duration, now: Duration) -> bool {
        let shard = self.shard(entity).lock();
        Self::ready_in(&shard, entity, key, window, now)
    }

    /// Record a fire at `now`
    pub fn start(&self, entity: EntityId, key: &GroupKey, now: Duration) {
        self.shard(entity)
            .lock()
            .entry(entity)
            .or_default()
            .insert(key.clone(), now);
    }

    /// Check and record under one lock; only one concurrent caller per window wins
    pub fn try_start(&self, entity: EntityId, key: &GroupKey, window: Duration, now: Duration) -> bool {
        let mut shard = self.shard(entity).lock();
        if !Self::ready_in(&shard, entity, key, window, now) {
            return false;
        }
        shard.entry(entity).or_default().insert(key.clone(), now);
        true
    }

    /// Drop every record for an entity (e.g. on disconnect)
    pub fn forget(&self, entity: EntityId) {
        self.shard(entity).lock().remove(&entity);
    }

    /// Number of (entity, group) records held
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().values().map(HashMap::len).sum::<usize>())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
