use serde::Deserialize;

/// TOML layout of a definitions file; any section may be absent
#[derive(Debug, Default, Deserialize)]
pub struct DefinitionFileConfig {
    #[serde(default)]
    pub abilities: Vec<AbilityConfig>,
    #[serde(default)]
    pub runes: Vec<RuneConfig>,
    #[serde(default)]
    pub sets: Vec<SetBonusConfig>,
}

#[derive(Debug, Deserialize)]
pub struct AbilityConfig {
    pub id: String,
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub applicable_to: Vec<String>,
    #[serde(default)]
    pub effects: Vec<EffectGroupConfig>,
}

/// Raw effect group: strings are decoded when the definition is built
#[derive(Debug, Deserialize)]
pub struct EffectGroupConfig {
    pub trigger: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub effects: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct RuneConfig {
    pub id: String,
    #[serde(default = "default_tier")]
    pub tier: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub glow: bool,
    #[serde(default)]
    pub effects: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetBonusConfig {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub required_abilities: Vec<String>,
    #[serde(default)]
    pub bonuses: Vec<BonusTierConfig>,
}

#[derive(Debug, Deserialize)]
pub struct BonusTierConfig {
    pub pieces_required: u32,
    #[serde(default)]
    pub passive_effects: Vec<String>,
    #[serde(default)]
    pub triggered_effects: Vec<EffectGroupConfig>,
}

fn default_tier() -> String {
    "common".to_string()
}

fn default_max_level() -> u32 {
    1
}
