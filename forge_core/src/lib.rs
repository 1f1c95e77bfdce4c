//! forge_core - Definitions and per-item state for item abilities
//!
//! This library provides:
//! - Ability, rune and set bonus definitions with their effect groups
//! - Closed condition / effect / passive-effect kinds decoded at load time
//! - Per-item ability levels and ordered socket slots, with their JSON form
//! - The item ability index that resolves item state against a registry
//! - A TOML-backed definition registry

mod config;
pub mod definition;
pub mod effect;
pub mod index;
pub mod item;
pub mod registry;
pub mod types;

pub use definition::{
    AbilityDefinition, ApplicabilityRule, BonusTier, EffectGroup, GroupKey, RuneDefinition,
    SetBonusDefinition,
};
pub use effect::{AoeCenter, Condition, Effect, Formula, PassiveEffect, PotionSpec};
pub use index::{equipped_ability_ids, index_item, ItemAbilities};
pub use item::{ItemState, LoreFormat, Socket, EMPTY_SOCKET};
pub use registry::{DefinitionLookup, DefinitionRegistry};
pub use types::{AttributeKind, PotionType, TriggerKind};

use std::path::PathBuf;
use thiserror::Error;

/// Error loading definition files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path}': {error}")]
    Parse {
        error: toml::de::Error,
        path: PathBuf,
    },
    #[error("Validation error in '{path}': {message}")]
    Validation { message: String, path: PathBuf },
}

/// Error decoding a condition, effect or passive-effect string
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Unknown kind: {0}")]
    UnknownKind(String),
    #[error("'{entry}' is missing its {field}")]
    MissingField { entry: String, field: &'static str },
    #[error("Invalid value '{value}' in '{entry}'")]
    InvalidValue { entry: String, value: String },
    #[error("Unknown potion type: {0}")]
    UnknownPotion(String),
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),
    #[error("Unsupported attribute operation: {0}")]
    UnsupportedOperation(String),
}

/// Error reading or changing an item's ability state
#[derive(Debug, Error)]
pub enum ItemStateError {
    #[error("Malformed ability map: {0}")]
    Abilities(serde_json::Error),
    #[error("Malformed socket list: {0}")]
    Sockets(serde_json::Error),
    #[error("Item has no empty socket")]
    NoEmptySocket,
    #[error("Ability '{ability}' cannot be applied to {material}")]
    NotApplicable { ability: String, material: String },
}
