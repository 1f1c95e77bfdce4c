use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Combat side that makes an effect group eligible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    Attack,
    Defend,
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKind::Attack => write!(f, "ATTACK"),
            TriggerKind::Defend => write!(f, "DEFEND"),
        }
    }
}

impl FromStr for TriggerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ATTACK" => Ok(TriggerKind::Attack),
            "DEFEND" => Ok(TriggerKind::Defend),
            other => Err(other.to_string()),
        }
    }
}

/// Timed potion effect kinds understood by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PotionType {
    Speed,
    Slowness,
    Haste,
    MiningFatigue,
    Strength,
    InstantHealth,
    InstantDamage,
    JumpBoost,
    Nausea,
    Regeneration,
    Resistance,
    FireResistance,
    WaterBreathing,
    Invisibility,
    Blindness,
    NightVision,
    Hunger,
    Weakness,
    Poison,
    Wither,
    HealthBoost,
    Absorption,
    Saturation,
    Glowing,
    Levitation,
    Luck,
    Unluck,
    SlowFalling,
}

impl PotionType {
    /// Get all potion types
    pub fn all() -> &'static [PotionType] {
        &[
            PotionType::Speed,
            PotionType::Slowness,
            PotionType::Haste,
            PotionType::MiningFatigue,
            PotionType::Strength,
            PotionType::InstantHealth,
            PotionType::InstantDamage,
            PotionType::JumpBoost,
            PotionType::Nausea,
            PotionType::Regeneration,
            PotionType::Resistance,
            PotionType::FireResistance,
            PotionType::WaterBreathing,
            PotionType::Invisibility,
            PotionType::Blindness,
            PotionType::NightVision,
            PotionType::Hunger,
            PotionType::Weakness,
            PotionType::Poison,
            PotionType::Wither,
            PotionType::HealthBoost,
            PotionType::Absorption,
            PotionType::Saturation,
            PotionType::Glowing,
            PotionType::Levitation,
            PotionType::Luck,
            PotionType::Unluck,
            PotionType::SlowFalling,
        ]
    }

    /// Canonical upper-case name
    pub fn name(&self) -> &'static str {
        match self {
            PotionType::Speed => "SPEED",
            PotionType::Slowness => "SLOWNESS",
            PotionType::Haste => "HASTE",
            PotionType::MiningFatigue => "MINING_FATIGUE",
            PotionType::Strength => "STRENGTH",
            PotionType::InstantHealth => "INSTANT_HEALTH",
            PotionType::InstantDamage => "INSTANT_DAMAGE",
            PotionType::JumpBoost => "JUMP_BOOST",
            PotionType::Nausea => "NAUSEA",
            PotionType::Regeneration => "REGENERATION",
            PotionType::Resistance => "RESISTANCE",
            PotionType::FireResistance => "FIRE_RESISTANCE",
            PotionType::WaterBreathing => "WATER_BREATHING",
            PotionType::Invisibility => "INVISIBILITY",
            PotionType::Blindness => "BLINDNESS",
            PotionType::NightVision => "NIGHT_VISION",
            PotionType::Hunger => "HUNGER",
            PotionType::Weakness => "WEAKNESS",
            PotionType::Poison => "POISON",
            PotionType::Wither => "WITHER",
            PotionType::HealthBoost => "HEALTH_BOOST",
            PotionType::Absorption => "ABSORPTION",
            PotionType::Saturation => "SATURATION",
            PotionType::Glowing => "GLOWING",
            PotionType::Levitation => "LEVITATION",
            PotionType::Luck => "LUCK",
            PotionType::Unluck => "UNLUCK",
            PotionType::SlowFalling => "SLOW_FALLING",
        }
    }
}

impl fmt::Display for PotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PotionType {
    type Err = String;

    /// Accepts canonical names plus the legacy aliases older configs use
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let canonical = match upper.as_str() {
            "SLOW" => "SLOWNESS",
            "FAST_DIGGING" => "HASTE",
            "SLOW_DIGGING" => "MINING_FATIGUE",
            "INCREASE_DAMAGE" => "STRENGTH",
            "HEAL" => "INSTANT_HEALTH",
            "HARM" => "INSTANT_DAMAGE",
            "JUMP" => "JUMP_BOOST",
            "CONFUSION" => "NAUSEA",
            "DAMAGE_RESISTANCE" => "RESISTANCE",
            other => other,
        };
        PotionType::all()
            .iter()
            .copied()
            .find(|p| p.name() == canonical)
            .ok_or(upper)
    }
}

/// Entity attributes that passive bonuses can modify additively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeKind {
    MaxHealth,
    FollowRange,
    KnockbackResistance,
    MovementSpeed,
    FlyingSpeed,
    AttackDamage,
    AttackKnockback,
    AttackSpeed,
    Armor,
    ArmorToughness,
    Luck,
}

impl AttributeKind {
    /// Get all attribute kinds
    pub fn all() -> &'static [AttributeKind] {
        &[
            AttributeKind::MaxHealth,
            AttributeKind::FollowRange,
            AttributeKind::KnockbackResistance,
            AttributeKind::MovementSpeed,
            AttributeKind::FlyingSpeed,
            AttributeKind::AttackDamage,
            AttributeKind::AttackKnockback,
            AttributeKind::AttackSpeed,
            AttributeKind::Armor,
            AttributeKind::ArmorToughness,
            AttributeKind::Luck,
        ]
    }

    /// Canonical upper-case name
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::MaxHealth => "MAX_HEALTH",
            AttributeKind::FollowRange => "FOLLOW_RANGE",
            AttributeKind::KnockbackResistance => "KNOCKBACK_RESISTANCE",
            AttributeKind::MovementSpeed => "MOVEMENT_SPEED",
            AttributeKind::FlyingSpeed => "FLYING_SPEED",
            AttributeKind::AttackDamage => "ATTACK_DAMAGE",
            AttributeKind::AttackKnockback => "ATTACK_KNOCKBACK",
            AttributeKind::AttackSpeed => "ATTACK_SPEED",
            AttributeKind::Armor => "ARMOR",
            AttributeKind::ArmorToughness => "ARMOR_TOUGHNESS",
            AttributeKind::Luck => "LUCK",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributeKind {
    type Err = String;

    /// Accepts names with or without the `GENERIC_` prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let bare = upper.strip_prefix("GENERIC_").unwrap_or(&upper);
        AttributeKind::all()
            .iter()
            .copied()
            .find(|a| a.name() == bare)
            .ok_or(upper)
    }
}
