use crate::config::{
    AbilityConfig, DefinitionFileConfig, EffectGroupConfig, RuneConfig, SetBonusConfig,
};
use crate::definition::{
    AbilityDefinition, ApplicabilityRule, BonusTier, EffectGroup, GroupKey, RuneDefinition,
    SetBonusDefinition,
};
use crate::effect::PassiveEffect;
use crate::types::TriggerKind;
use crate::ConfigError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Read-only lookup of definitions by case-insensitive ID
pub trait DefinitionLookup: Send + Sync {
    fn ability(&self, id: &str) -> Option<&AbilityDefinition>;

    fn rune(&self, id: &str) -> Option<&RuneDefinition>;

    /// Every set bonus, ordered by ID
    fn set_bonuses(&self) -> &[SetBonusDefinition];
}

/// Registry of all ability, rune and set bonus definitions
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    abilities: HashMap<String, AbilityDefinition>,
    runes: HashMap<String, RuneDefinition>,
    /// Kept sorted by ID
    sets: Vec<SetBonusDefinition>,
}

impl DefinitionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all definition files from a directory (recursively)
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_dir(dir)?;
        tracing::info!(
            abilities = registry.abilities.len(),
            runes = registry.runes.len(),
            sets = registry.sets.len(),
            dir = %dir.display(),
            "Loaded definitions"
        );
        Ok(registry)
    }

    /// Parse a single definitions document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_str(content, PathBuf::from("<inline>"))?;
        Ok(registry)
    }

    fn load_dir(&mut self, dir: &Path) -> Result<(), ConfigError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
            paths.push(entry.path());
        }
        // Later files override earlier ones, so make the order stable
        paths.sort();

        for path in paths {
            if path.is_dir() {
                self.load_dir(&path)?;
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                self.load_file(&path)?;
            }
        }

        Ok(())
    }

    fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;
        self.load_str(&content, path.to_path_buf())
    }

    fn load_str(&mut self, content: &str, path: PathBuf) -> Result<(), ConfigError> {
        let config: DefinitionFileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            error: e,
            path: path.clone(),
        })?;

        for ability in config.abilities {
            let ability = build_ability(ability).map_err(|message| ConfigError::Validation {
                message,
                path: path.clone(),
            })?;
            self.register_ability(ability);
        }
        for rune in config.runes {
            let rune = build_rune(rune).map_err(|message| ConfigError::Validation {
                message,
                path: path.clone(),
            })?;
            self.register_rune(rune);
        }
        for set in config.sets {
            let set = build_set(set).map_err(|message| ConfigError::Validation {
                message,
                path: path.clone(),
            })?;
            self.register_set(set);
        }

        Ok(())
    }

    /// Add or replace an ability
    pub fn register_ability(&mut self, mut ability: AbilityDefinition) {
        ability.id = ability.id.to_ascii_lowercase();
        if self.abilities.contains_key(&ability.id) {
            tracing::warn!(ability = %ability.id, "Replacing duplicate ability definition");
        }
        self.abilities.insert(ability.id.clone(), ability);
    }

    /// Add or replace a rune
    pub fn register_rune(&mut self, mut rune: RuneDefinition) {
        rune.id = rune.id.to_ascii_lowercase();
        if self.runes.contains_key(&rune.id) {
            tracing::warn!(rune = %rune.id, "Replacing duplicate rune definition");
        }
        self.runes.insert(rune.id.clone(), rune);
    }

    /// Add or replace a set bonus
    pub fn register_set(&mut self, set: SetBonusDefinition) {
        match self.sets.binary_search_by(|s| s.id.cmp(&set.id)) {
            Ok(pos) => {
                tracing::warn!(set = %set.id, "Replacing duplicate set bonus definition");
                self.sets[pos] = set;
            }
            Err(pos) => self.sets.insert(pos, set),
        }
    }

    /// List all ability IDs
    pub fn ability_ids(&self) -> impl Iterator<Item = &str> {
        self.abilities.keys().map(|s| s.as_str())
    }

    /// List all rune IDs
    pub fn rune_ids(&self) -> impl Iterator<Item = &str> {
        self.runes.keys().map(|s| s.as_str())
    }
}

impl DefinitionLookup for DefinitionRegistry {
    fn ability(&self, id: &str) -> Option<&AbilityDefinition> {
        self.abilities.get(&id.to_ascii_lowercase())
    }

    fn rune(&self, id: &str) -> Option<&RuneDefinition> {
        self.runes.get(&id.to_ascii_lowercase())
    }

    fn set_bonuses(&self) -> &[SetBonusDefinition] {
        &self.sets
    }
}

fn require_id(kind: &str, id: &str) -> Result<String, String> {
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("{} is missing an 'id'", kind));
    }
    Ok(id.to_ascii_lowercase())
}

/// Decode raw groups, dropping any whose trigger is not recognised
fn build_groups(
    configs: Vec<EffectGroupConfig>,
    key_for: impl Fn(usize) -> GroupKey,
) -> Vec<EffectGroup> {
    configs
        .into_iter()
        .enumerate()
        .filter_map(|(index, group)| {
            let key = key_for(index);
            match group.trigger.parse::<TriggerKind>() {
                Ok(trigger) => Some(EffectGroup::decode(key, trigger, &group.conditions, &group.effects)),
                Err(trigger) => {
                    tracing::warn!(group = %key, %trigger, "Skipping effect group with unknown trigger");
                    None
                }
            }
        })
        .collect()
}

fn build_passives(owner: &str, raw: &[String]) -> Vec<PassiveEffect> {
    raw.iter()
        .filter_map(|entry| match entry.parse::<PassiveEffect>() {
            Ok(effect) => Some(effect),
            Err(error) => {
                tracing::warn!(owner, effect = %entry, %error, "Skipping malformed passive effect");
                None
            }
        })
        .collect()
}

fn build_ability(config: AbilityConfig) -> Result<AbilityDefinition, String> {
    let id = require_id("ability", &config.id)?;
    let groups = build_groups(config.effects, |index| GroupKey::ability(&id, index));

    Ok(AbilityDefinition {
        display: config.display_name.unwrap_or_else(|| format!("&f{}", id)),
        tier: config.tier,
        max_level: config.max_level.max(1),
        description: config.description,
        applicable_to: ApplicabilityRule::new(config.applicable_to),
        groups,
        id,
    })
}

fn build_rune(config: RuneConfig) -> Result<RuneDefinition, String> {
    let id = require_id("rune", &config.id)?;
    let effects = build_passives(&id, &config.effects);

    Ok(RuneDefinition {
        display: config.display_name.unwrap_or_else(|| id.clone()),
        tier: config.tier,
        lore: config.lore,
        glow: config.glow,
        effects,
        id,
    })
}

fn build_set(config: SetBonusConfig) -> Result<SetBonusDefinition, String> {
    let id = require_id("set", &config.id)?;
    if config.bonuses.is_empty() {
        return Err(format!("set '{}' has no bonus tiers", id));
    }
    let mut thresholds = HashSet::new();
    for tier in &config.bonuses {
        if !thresholds.insert(tier.pieces_required) {
            return Err(format!(
                "set '{}' has more than one tier requiring {} pieces",
                id, tier.pieces_required
            ));
        }
    }

    let tiers = config
        .bonuses
        .into_iter()
        .map(|tier| {
            let pieces = tier.pieces_required;
            BonusTier {
                pieces_required: pieces,
                passive_effects: build_passives(&id, &tier.passive_effects),
                triggered: build_groups(tier.triggered_effects, |index| {
                    GroupKey::set_tier(&id, pieces, index)
                }),
            }
        })
        .collect();

    Ok(SetBonusDefinition::new(
        id.clone(),
        config.display_name.unwrap_or_else(|| id.clone()),
        config.required_abilities,
        tiers,
    ))
}
