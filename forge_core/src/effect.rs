//! Closed condition, effect and passive-effect kinds
//!
//! Definition files carry these as short strings (`"chance 25"`,
//! `"TARGET_POTION:SLOWNESS:1:60"`, `"POTION:SPEED:0"`). They are decoded
//! once when a definition is built; the engine only ever sees the enums.

use crate::types::{AttributeKind, PotionType};
use crate::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Unevaluated arithmetic expression text, e.g. `{level_number} * 2`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Formula(String);

impl Formula {
    pub fn new(source: impl Into<String>) -> Self {
        Formula(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A condition gating an effect group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Passes iff `uniform[0,100) < value`
    Chance(Formula),
    /// Passes iff the owner's health percentage is at or below the value
    HealthBelowPercent(f64),
    /// Passes iff the triggering damage came from a projectile
    IsProjectile,
    /// Passes iff the group is off cooldown for the owner
    Cooldown { seconds: u64 },
}

impl Condition {
    /// Cooldown window declared by this condition, if it is a cooldown
    pub fn cooldown(&self) -> Option<Duration> {
        match self {
            Condition::Cooldown { seconds } => Some(Duration::from_secs(*seconds)),
            _ => None,
        }
    }
}

impl FromStr for Condition {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (keyword, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((k, a)) => (k, a.trim()),
            None => (trimmed, ""),
        };

        match keyword.to_ascii_lowercase().as_str() {
            "chance" => {
                if arg.is_empty() {
                    return Err(DecodeError::MissingField { entry: s.to_string(), field: "chance" });
                }
                Ok(Condition::Chance(Formula::new(arg)))
            }
            "health_below_percent" => Ok(Condition::HealthBelowPercent(parse_number(s, arg)?)),
            "is_projectile" => Ok(Condition::IsProjectile),
            "cooldown" => Ok(Condition::Cooldown { seconds: parse_number(s, arg)? }),
            _ => Err(DecodeError::UnknownKind(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Chance(formula) => write!(f, "chance {}", formula),
            Condition::HealthBelowPercent(value) => write!(f, "health_below_percent {}", value),
            Condition::IsProjectile => write!(f, "is_projectile"),
            Condition::Cooldown { seconds } => write!(f, "cooldown {}", seconds),
        }
    }
}

/// A timed potion grant: `TYPE:amplifier:durationTicks`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotionSpec {
    pub potion: PotionType,
    pub amplifier: u32,
    pub duration_ticks: u32,
}

impl FromStr for PotionSpec {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let name = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DecodeError::MissingField { entry: s.to_string(), field: "potion type" })?;
        let amplifier = parts
            .next()
            .ok_or_else(|| DecodeError::MissingField { entry: s.to_string(), field: "amplifier" })?;
        let duration = parts
            .next()
            .ok_or_else(|| DecodeError::MissingField { entry: s.to_string(), field: "duration" })?;

        Ok(PotionSpec {
            potion: name.parse().map_err(DecodeError::UnknownPotion)?,
            amplifier: parse_number(s, amplifier)?,
            duration_ticks: parse_number(s, duration)?,
        })
    }
}

impl fmt::Display for PotionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.potion, self.amplifier, self.duration_ticks)
    }
}

/// Which entity an area effect is centred on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AoeCenter {
    /// The effect owner
    Owner,
    /// The opposing entity of the event
    Target,
}

/// A single effect instruction inside a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    DealDamage(Formula),
    Heal(Formula),
    TargetPotion(PotionSpec),
    AttackerPotion(PotionSpec),
    AttackerFire { ticks: u32 },
    Sound { name: String, pitch: f32 },
    Particle { name: String },
    AreaPotion {
        center: AoeCenter,
        radius: f64,
        potion: PotionSpec,
    },
}

impl FromStr for Effect {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (kind, args) = trimmed.split_once(':').unwrap_or((trimmed, ""));
        let args = args.trim();

        match kind.trim().to_ascii_lowercase().as_str() {
            "deal_damage" => Ok(Effect::DealDamage(required_formula(s, args)?)),
            "heal" => Ok(Effect::Heal(required_formula(s, args)?)),
            "target_potion" => Ok(Effect::TargetPotion(args.parse()?)),
            "attacker_potion" => Ok(Effect::AttackerPotion(args.parse()?)),
            "attacker_fire" => Ok(Effect::AttackerFire { ticks: parse_number(s, args)? }),
            "sound" => {
                let mut parts = args.split_whitespace();
                let name = parts
                    .next()
                    .ok_or_else(|| DecodeError::MissingField { entry: s.to_string(), field: "sound" })?;
                let pitch = match parts.next() {
                    Some(p) => parse_number(s, p)?,
                    None => 1.0,
                };
                Ok(Effect::Sound { name: name.to_ascii_uppercase(), pitch })
            }
            "particle" => {
                if args.is_empty() {
                    return Err(DecodeError::MissingField { entry: s.to_string(), field: "particle" });
                }
                Ok(Effect::Particle { name: args.to_ascii_uppercase() })
            }
            "aoe_effect" => parse_area_potion(s, args),
            _ => Err(DecodeError::UnknownKind(trimmed.to_string())),
        }
    }
}

/// `target:<owner|self|target> radius:<r> potion:TYPE:amp:ticks`
fn parse_area_potion(entry: &str, args: &str) -> Result<Effect, DecodeError> {
    let mut center = AoeCenter::Target;
    let mut radius = None;
    let mut potion = None;

    for token in args.split_whitespace() {
        let (key, value) = token.split_once(':').unwrap_or((token, ""));
        match key.to_ascii_lowercase().as_str() {
            "target" => {
                center = match value.to_ascii_lowercase().as_str() {
                    "self" | "owner" => AoeCenter::Owner,
                    "target" | "enemy" => AoeCenter::Target,
                    _ => return Err(DecodeError::InvalidValue {
                        entry: entry.to_string(),
                        value: value.to_string(),
                    }),
                }
            }
            "radius" => radius = Some(parse_number::<f64>(entry, value)?),
            "potion" | "target_potion" => potion = Some(value.parse::<PotionSpec>()?),
            _ => return Err(DecodeError::UnknownKind(token.to_string())),
        }
    }

    Ok(Effect::AreaPotion {
        center,
        radius: radius.ok_or_else(|| DecodeError::MissingField { entry: entry.to_string(), field: "radius" })?,
        potion: potion.ok_or_else(|| DecodeError::MissingField { entry: entry.to_string(), field: "inner effect" })?,
    })
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::DealDamage(formula) => write!(f, "DEAL_DAMAGE:{}", formula),
            Effect::Heal(formula) => write!(f, "HEAL:{}", formula),
            Effect::TargetPotion(spec) => write!(f, "TARGET_POTION:{}", spec),
            Effect::AttackerPotion(spec) => write!(f, "ATTACKER_POTION:{}", spec),
            Effect::AttackerFire { ticks } => write!(f, "ATTACKER_FIRE:{}", ticks),
            Effect::Sound { name, pitch } => write!(f, "SOUND:{} {}", name, pitch),
            Effect::Particle { name } => write!(f, "PARTICLE:{}", name),
            Effect::AreaPotion { center, radius, potion } => {
                let center = match center {
                    AoeCenter::Owner => "self",
                    AoeCenter::Target => "target",
                };
                write!(f, "AOE_EFFECT:target:{} radius:{} potion:{}", center, radius, potion)
            }
        }
    }
}

/// A steady-state bonus recomputed every passive pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PassiveEffect {
    /// `POTION:TYPE:amplifier`
    Potion { potion: PotionType, amplifier: u32 },
    /// `ATTRIBUTE:NAME:ADD:value`
    Attribute { attribute: AttributeKind, value: f64 },
}

impl FromStr for PassiveEffect {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();

        match parts[0].to_ascii_uppercase().as_str() {
            "POTION" => {
                let name = parts
                    .get(1)
                    .ok_or_else(|| DecodeError::MissingField { entry: s.to_string(), field: "potion type" })?;
                let amplifier = parts
                    .get(2)
                    .ok_or_else(|| DecodeError::MissingField { entry: s.to_string(), field: "amplifier" })?;
                Ok(PassiveEffect::Potion {
                    potion: name.parse().map_err(DecodeError::UnknownPotion)?,
                    amplifier: parse_number(s, amplifier)?,
                })
            }
            "ATTRIBUTE" => {
                let name = parts
                    .get(1)
                    .ok_or_else(|| DecodeError::MissingField { entry: s.to_string(), field: "attribute" })?;
                let operation = parts
                    .get(2)
                    .ok_or_else(|| DecodeError::MissingField { entry: s.to_string(), field: "operation" })?;
                if !operation.eq_ignore_ascii_case("ADD") && !operation.eq_ignore_ascii_case("ADD_NUMBER") {
                    return Err(DecodeError::UnsupportedOperation(operation.to_string()));
                }
                let value = parts
                    .get(3)
                    .ok_or_else(|| DecodeError::MissingField { entry: s.to_string(), field: "value" })?;
                Ok(PassiveEffect::Attribute {
                    attribute: name.parse().map_err(DecodeError::UnknownAttribute)?,
                    value: parse_number(s, value)?,
                })
            }
            _ => Err(DecodeError::UnknownKind(s.trim().to_string())),
        }
    }
}

impl fmt::Display for PassiveEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassiveEffect::Potion { potion, amplifier } => write!(f, "POTION:{}:{}", potion, amplifier),
            PassiveEffect::Attribute { attribute, value } => {
                write!(f, "ATTRIBUTE:{}:ADD:{}", attribute, value)
            }
        }
    }
}

fn required_formula(entry: &str, args: &str) -> Result<Formula, DecodeError> {
    if args.is_empty() {
        return Err(DecodeError::MissingField { entry: entry.to_string(), field: "expression" });
    }
    Ok(Formula::new(args))
}

fn parse_number<T: FromStr>(entry: &str, value: &str) -> Result<T, DecodeError> {
    value.trim().parse().map_err(|_| DecodeError::InvalidValue {
        entry: entry.to_string(),
        value: value.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_conditions() {
        assert_eq!(
            "chance {level_number} * 5".parse::<Condition>().unwrap(),
            Condition::Chance(Formula::new("{level_number} * 5"))
        );
        assert_eq!(
            "health_below_percent 30".parse::<Condition>().unwrap(),
            Condition::HealthBelowPercent(30.0)
        );
        assert_eq!("IS_PROJECTILE".parse::<Condition>().unwrap(), Condition::IsProjectile);

        let cooldown: Condition = "cooldown 5".parse().unwrap();
        assert_eq!(cooldown.cooldown(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_reject_malformed_conditions() {
        assert!(matches!("chance".parse::<Condition>(), Err(DecodeError::MissingField { .. })));
        assert!(matches!("cooldown soon".parse::<Condition>(), Err(DecodeError::InvalidValue { .. })));
        assert!(matches!("moon_phase full".parse::<Condition>(), Err(DecodeError::UnknownKind(_))));
    }

    #[test]
    fn test_decode_effects() {
        assert_eq!(
            "DEAL_DAMAGE:{level_number}*2".parse::<Effect>().unwrap(),
            Effect::DealDamage(Formula::new("{level_number}*2"))
        );
        assert_eq!(
            "target_potion:SLOW:1:60".parse::<Effect>().unwrap(),
            Effect::TargetPotion(PotionSpec {
                potion: PotionType::Slowness,
                amplifier: 1,
                duration_ticks: 60,
            })
        );
        assert_eq!(
            "SOUND:entity_blaze_shoot 1.5".parse::<Effect>().unwrap(),
            Effect::Sound { name: "ENTITY_BLAZE_SHOOT".to_string(), pitch: 1.5 }
        );
        assert_eq!("ATTACKER_FIRE:80".parse::<Effect>().unwrap(), Effect::AttackerFire { ticks: 80 });
    }

    #[test]
    fn test_decode_area_potion() {
        let effect: Effect = "AOE_EFFECT:target:self radius:4 potion:WEAKNESS:0:100".parse().unwrap();
        assert_eq!(
            effect,
            Effect::AreaPotion {
                center: AoeCenter::Owner,
                radius: 4.0,
                potion: PotionSpec {
                    potion: PotionType::Weakness,
                    amplifier: 0,
                    duration_ticks: 100,
                },
            }
        );

        // Display output decodes back to the same effect
        let again: Effect = effect.to_string().parse().unwrap();
        assert_eq!(again, effect);

        assert!("AOE_EFFECT:target:self potion:WEAKNESS:0:100".parse::<Effect>().is_err());
    }

    #[test]
    fn test_reject_malformed_effects() {
        assert!("TARGET_POTION:SPEED:1".parse::<Effect>().is_err());
        assert!("TARGET_POTION:FLIGHT:1:20".parse::<Effect>().is_err());
        assert!("EXPLODE:4".parse::<Effect>().is_err());
        assert!("HEAL:".parse::<Effect>().is_err());
    }

    #[test]
    fn test_decode_passive_effects() {
        assert_eq!(
            "POTION:SPEED:1".parse::<PassiveEffect>().unwrap(),
            PassiveEffect::Potion { potion: PotionType::Speed, amplifier: 1 }
        );
        assert_eq!(
            "ATTRIBUTE:ATTACK_DAMAGE:ADD:3".parse::<PassiveEffect>().unwrap(),
            PassiveEffect::Attribute { attribute: AttributeKind::AttackDamage, value: 3.0 }
        );
        assert!(matches!(
            "ATTRIBUTE:ARMOR:MULTIPLY:2".parse::<PassiveEffect>(),
            Err(DecodeError::UnsupportedOperation(_))
        ));
        assert!("ATTRIBUTE:ARMOR".parse::<PassiveEffect>().is_err());
    }
}
