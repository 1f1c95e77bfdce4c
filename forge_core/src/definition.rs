//! Immutable ability, rune and set bonus definitions

use crate::effect::{Condition, Effect, PassiveEffect};
use crate::types::TriggerKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Stable identity of an effect group, used to key cooldowns
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey(String);

impl GroupKey {
    /// Key for the `index`th group of an ability
    pub fn ability(ability_id: &str, index: usize) -> Self {
        GroupKey(format!("ability:{}#{}", ability_id, index))
    }

    /// Key for the `index`th triggered group of a set bonus tier
    pub fn set_tier(set_id: &str, pieces_required: u32, index: usize) -> Self {
        GroupKey(format!("set:{}@{}#{}", set_id, pieces_required, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (trigger, conditions, effects) triple evaluated as one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectGroup {
    pub key: GroupKey,
    pub trigger: TriggerKind,
    /// ANDed in order; the first failure short-circuits
    pub conditions: Vec<Condition>,
    /// Executed in order once every condition passes
    pub effects: Vec<Effect>,
}

impl EffectGroup {
    pub fn new(key: GroupKey, trigger: TriggerKind, conditions: Vec<Condition>, effects: Vec<Effect>) -> Self {
        EffectGroup { key, trigger, conditions, effects }
    }

    /// Decode a group from its raw strings
    ///
    /// Malformed condition and effect strings are dropped individually
    /// with a warning; the rest of the group is kept.
    pub fn decode(
        key: GroupKey,
        trigger: TriggerKind,
        conditions: &[String],
        effects: &[String],
    ) -> Self {
        let conditions = conditions
            .iter()
            .filter_map(|raw| match raw.parse::<Condition>() {
                Ok(condition) => Some(condition),
                Err(error) => {
                    tracing::warn!(group = %key, condition = %raw, %error, "Skipping malformed condition");
                    None
                }
            })
            .collect();

        let effects = effects
            .iter()
            .filter_map(|raw| match raw.parse::<Effect>() {
                Ok(effect) => Some(effect),
                Err(error) => {
                    tracing::warn!(group = %key, effect = %raw, %error, "Skipping malformed effect");
                    None
                }
            })
            .collect();

        EffectGroup { key, trigger, conditions, effects }
    }

    /// Cooldown window declared by the group's `cooldown` condition (zero if none)
    pub fn cooldown(&self) -> Duration {
        self.conditions
            .iter()
            .find_map(Condition::cooldown)
            .unwrap_or(Duration::ZERO)
    }
}

/// Which item materials an ability may be applied to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicabilityRule(Vec<String>);

impl ApplicabilityRule {
    pub fn new(entries: Vec<String>) -> Self {
        ApplicabilityRule(entries.into_iter().map(|e| e.trim().to_ascii_uppercase()).collect())
    }

    /// Check a material name (e.g. `DIAMOND_SWORD`) against the rule
    pub fn matches(&self, material: &str) -> bool {
        if self.0.is_empty() || self.0.iter().any(|e| e == "ALL") {
            return true;
        }

        let material = material.to_ascii_uppercase();
        self.0.iter().any(|entry| match entry.as_str() {
            "SWORD" | "SWORDS" => material.ends_with("_SWORD"),
            "AXE" | "AXES" => material.ends_with("_AXE"),
            "PICKAXE" | "PICKAXES" => material.ends_with("_PICKAXE"),
            "ARMOR" => ["_HELMET", "_CHESTPLATE", "_LEGGINGS", "_BOOTS"]
                .iter()
                .any(|suffix| material.ends_with(suffix)),
            "TOOL" | "TOOLS" => ["_AXE", "_PICKAXE", "_SHOVEL", "_HOE"]
                .iter()
                .any(|suffix| material.ends_with(suffix)),
            exact => material == exact,
        })
    }
}

/// A custom enchantment with levelled, triggered effect groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityDefinition {
    /// Lower-cased unique ID
    pub id: String,
    pub tier: String,
    pub max_level: u32,
    /// Lore template; supports `{level_roman}` and `{level_number}`
    pub display: String,
    pub description: Vec<String>,
    pub applicable_to: ApplicabilityRule,
    pub groups: Vec<EffectGroup>,
}

impl AbilityDefinition {
    /// Render the display template for a level
    pub fn display_name(&self, level: u32) -> String {
        self.display
            .replace("{level_roman}", &to_roman(level))
            .replace("{level_number}", &level.to_string())
    }

    /// Groups fired by the given trigger, in definition order
    pub fn groups_for(&self, trigger: TriggerKind) -> impl Iterator<Item = &EffectGroup> {
        self.groups.iter().filter(move |g| g.trigger == trigger)
    }
}

/// A socketable modifier that only contributes passive effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuneDefinition {
    /// Lower-cased unique ID
    pub id: String,
    pub tier: String,
    pub display: String,
    pub lore: Vec<String>,
    pub glow: bool,
    pub effects: Vec<PassiveEffect>,
}

/// One reward threshold of a set bonus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BonusTier {
    pub pieces_required: u32,
    pub passive_effects: Vec<PassiveEffect>,
    pub triggered: Vec<EffectGroup>,
}

/// A multi-piece gear bonus keyed on ability membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetBonusDefinition {
    /// Lower-cased unique ID
    pub id: String,
    pub display_name: String,
    /// Lower-cased ability IDs; membership only, levels are ignored
    pub required_abilities: Vec<String>,
    /// Sorted by `pieces_required`, highest first
    tiers: Vec<BonusTier>,
}

impl SetBonusDefinition {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        required_abilities: Vec<String>,
        mut tiers: Vec<BonusTier>,
    ) -> Self {
        tiers.sort_by(|a, b| b.pieces_required.cmp(&a.pieces_required));
        SetBonusDefinition {
            id: id.into().to_ascii_lowercase(),
            display_name: display_name.into(),
            required_abilities: required_abilities
                .into_iter()
                .map(|a| a.to_ascii_lowercase())
                .collect(),
            tiers,
        }
    }

    /// Tiers, highest `pieces_required` first
    pub fn tiers(&self) -> &[BonusTier] {
        &self.tiers
    }

    /// The best tier unlocked by `pieces` matching abilities
    pub fn tier_for(&self, pieces: u32) -> Option<&BonusTier> {
        self.tiers.iter().find(|t| pieces >= t.pieces_required)
    }

    /// How many required abilities appear among the given ability IDs
    pub fn matching_count(&self, mut has_ability: impl FnMut(&str) -> bool) -> u32 {
        self.required_abilities
            .iter()
            .filter(|id| has_ability(id.as_str()))
            .count() as u32
    }
}

/// Roman numeral for lore lines; falls back to decimal outside 1..=3999
pub fn to_roman(number: u32) -> String {
    if number == 0 || number > 3999 {
        return number.to_string();
    }

    const NUMERALS: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];

    let mut remaining = number;
    let mut out = String::new();
    for (value, symbol) in NUMERALS {
        while remaining >= value {
            out.push_str(symbol);
            remaining -= value;
        }
    }
    out
}
