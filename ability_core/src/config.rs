//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error loading engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Tunables for the trigger path and the passive pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Passive pass cadence
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Duration of each passive potion refresh; must outlast one tick
    #[serde(default = "default_passive_potion_duration_ticks")]
    pub passive_potion_duration_ticks: u32,
    /// Installed modifier tag is this prefix plus the attribute name
    #[serde(default = "default_attribute_tag_prefix")]
    pub attribute_tag_prefix: String,
    #[serde(default = "default_particle_count")]
    pub particle_count: u32,
    /// Upper bound for `aoe_effect` radii
    #[serde(default = "default_aoe_max_radius")]
    pub aoe_max_radius: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tick_interval_ms: default_tick_interval_ms(),
            passive_potion_duration_ticks: default_passive_potion_duration_ticks(),
            attribute_tag_prefix: default_attribute_tag_prefix(),
            particle_count: default_particle_count(),
            aoe_max_radius: default_aoe_max_radius(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationError("tick_interval_ms must be positive".to_string()));
        }
        if self.passive_potion_duration_ticks == 0 {
            return Err(ConfigError::ValidationError(
                "passive_potion_duration_ticks must be positive".to_string(),
            ));
        }
        if self.attribute_tag_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError("attribute_tag_prefix must not be empty".to_string()));
        }
        if !(self.aoe_max_radius.is_finite() && self.aoe_max_radius > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "aoe_max_radius must be a positive number, got {}",
                self.aoe_max_radius
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    /// Tag for the modifier installed on `attribute`
    pub fn attribute_tag(&self, attribute: forge_core::AttributeKind) -> String {
        format!("{}{}", self.attribute_tag_prefix, attribute)
    }
}

fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_passive_potion_duration_ticks() -> u32 {
    60
}
fn default_attribute_tag_prefix() -> String {
    "forge-".to_string()
}
fn default_particle_count() -> u32 {
    10
}
fn default_aoe_max_radius() -> f64 {
    32.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::AttributeKind;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), std::time::Duration::from_secs(1));
        assert_eq!(config.passive_potion_duration_ticks, 60);
        assert_eq!(config.attribute_tag(AttributeKind::AttackDamage), "forge-ATTACK_DAMAGE");
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str("tick_interval_ms = 500\nparticle_count = 4\n").unwrap();
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.particle_count, 4);
        assert_eq!(config.aoe_max_radius, 32.0);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            EngineConfig::from_toml_str("tick_interval_ms = 0"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("aoe_max_radius = -1.0"),
            Err(ConfigError::ValidationError(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("tick_interval_ms = \"fast\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "attribute_tag_prefix = \"relic-\"\n").unwrap();

        let config = EngineConfig::load_from_path(&path).unwrap();
        assert_eq!(config.attribute_tag_prefix, "relic-");

        assert!(matches!(
            EngineConfig::load_from_path(&dir.path().join("missing.toml")),
            Err(ConfigError::IoError(_))
        ));
    }
}
