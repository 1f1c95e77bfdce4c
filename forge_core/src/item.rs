use crate::definition::{AbilityDefinition, RuneDefinition};
use crate::registry::DefinitionLookup;
use crate::ItemStateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Persisted sentinel for an unfilled socket
pub const EMPTY_SOCKET: &str = "empty";

/// One ordered socket slot on an item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Socket {
    Empty,
    Rune(String),
}

impl Socket {
    pub fn is_empty(&self) -> bool {
        matches!(self, Socket::Empty)
    }

    pub fn rune_id(&self) -> Option<&str> {
        match self {
            Socket::Empty => None,
            Socket::Rune(id) => Some(id),
        }
    }
}

impl From<String> for Socket {
    fn from(value: String) -> Self {
        if value == EMPTY_SOCKET {
            Socket::Empty
        } else {
            Socket::Rune(value)
        }
    }
}

impl From<Socket> for String {
    fn from(socket: Socket) -> Self {
        match socket {
            Socket::Empty => EMPTY_SOCKET.to_string(),
            Socket::Rune(id) => id,
        }
    }
}

impl fmt::Display for Socket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Socket::Empty => f.write_str(EMPTY_SOCKET),
            Socket::Rune(id) => f.write_str(id),
        }
    }
}

/// Snapshot of one item's ability state
///
/// The engine never writes this back; operations return a new snapshot
/// for the host's item-state writer to persist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    /// Host material name, e.g. `DIAMOND_SWORD`
    #[serde(default)]
    pub material: String,
    /// Ability ID (lower-cased) to level
    #[serde(default)]
    pub abilities: BTreeMap<String, u32>,
    /// Ordered socket slots
    #[serde(default)]
    pub sockets: Vec<Socket>,
}

impl ItemState {
    pub fn new(material: impl Into<String>) -> Self {
        ItemState {
            material: material.into().to_ascii_uppercase(),
            ..Default::default()
        }
    }

    /// Rebuild from the two persisted JSON blobs; missing or blank blobs mean "none"
    pub fn from_persisted(
        material: impl Into<String>,
        abilities_json: Option<&str>,
        sockets_json: Option<&str>,
    ) -> Result<Self, ItemStateError> {
        let mut item = ItemState::new(material);

        if let Some(json) = abilities_json.filter(|j| !j.trim().is_empty()) {
            let raw: BTreeMap<String, u32> =
                serde_json::from_str(json).map_err(ItemStateError::Abilities)?;
            item.abilities = raw
                .into_iter()
                .map(|(id, level)| (id.to_ascii_lowercase(), level))
                .collect();
        }

        if let Some(json) = sockets_json.filter(|j| !j.trim().is_empty()) {
            item.sockets = serde_json::from_str(json).map_err(ItemStateError::Sockets)?;
        }

        Ok(item)
    }

    /// JSON object of ability ID to level
    pub fn abilities_json(&self) -> Result<String, ItemStateError> {
        serde_json::to_string(&self.abilities).map_err(ItemStateError::Abilities)
    }

    /// JSON array of socket slots, with `"empty"` for unfilled ones
    pub fn sockets_json(&self) -> Result<String, ItemStateError> {
        serde_json::to_string(&self.sockets).map_err(ItemStateError::Sockets)
    }

    /// Level stored for an ability, if present
    pub fn level_of(&self, ability_id: &str) -> Option<u32> {
        self.abilities.get(&ability_id.to_ascii_lowercase()).copied()
    }

    /// Non-empty socket contents, in slot order
    pub fn socketed_runes(&self) -> impl Iterator<Item = &str> {
        self.sockets.iter().filter_map(Socket::rune_id)
    }

    pub fn empty_sockets(&self) -> usize {
        self.sockets.iter().filter(|s| s.is_empty()).count()
    }

    /// Set (or replace) an ability's level, checking the item material
    pub fn apply_ability(mut self, ability: &AbilityDefinition, level: u32) -> Result<Self, ItemStateError> {
        if !ability.applicable_to.matches(&self.material) {
            return Err(ItemStateError::NotApplicable {
                ability: ability.id.clone(),
                material: self.material.clone(),
            });
        }
        self.abilities.insert(ability.id.to_ascii_lowercase(), level);
        Ok(self)
    }

    /// Append one empty socket
    pub fn add_socket(mut self) -> Self {
        self.sockets.push(Socket::Empty);
        self
    }

    /// Place a rune in the first empty socket
    pub fn socket_rune(mut self, rune: &RuneDefinition) -> Result<Self, ItemStateError> {
        let slot = self
            .sockets
            .iter_mut()
            .find(|s| s.is_empty())
            .ok_or(ItemStateError::NoEmptySocket)?;
        *slot = Socket::Rune(rune.id.clone());
        Ok(self)
    }

    /// Render lore lines: ability names, a spacer, then one line per socket
    ///
    /// Abilities and runes no longer in the registry are left out.
    pub fn lore_lines(&self, definitions: &dyn DefinitionLookup, format: &LoreFormat) -> Vec<String> {
        let mut lines: Vec<String> = self
            .abilities
            .iter()
            .filter_map(|(id, level)| definitions.ability(id).map(|a| a.display_name(*level)))
            .collect();

        if !self.abilities.is_empty() && !self.sockets.is_empty() {
            lines.push(String::new());
        }

        for socket in &self.sockets {
            match socket {
                Socket::Empty => lines.push(format.empty_socket.clone()),
                Socket::Rune(id) => {
                    if let Some(rune) = definitions.rune(id) {
                        lines.push(format.filled_socket.replace("{rune_name}", &rune.display));
                    }
                }
            }
        }

        lines
    }
}

/// Socket line templates for [`ItemState::lore_lines`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreFormat {
    #[serde(default = "default_empty_socket")]
    pub empty_socket: String,
    /// `{rune_name}` is replaced by the rune's display name
    #[serde(default = "default_filled_socket")]
    pub filled_socket: String,
}

impl Default for LoreFormat {
    fn default() -> Self {
        LoreFormat {
            empty_socket: default_empty_socket(),
            filled_socket: default_filled_socket(),
        }
    }
}

fn default_empty_socket() -> String {
    "&7[ &8Empty Socket &7]".to_string()
}

fn default_filled_socket() -> String {
    "&7[ {rune_name} &7]".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ApplicabilityRule;
    use crate::registry::DefinitionRegistry;
    use proptest::prelude::*;

    fn rune(id: &str) -> RuneDefinition {
        RuneDefinition {
            id: id.to_string(),
            tier: "common".to_string(),
            display: format!("Rune of {}", id),
            lore: Vec::new(),
            glow: false,
            effects: Vec::new(),
        }
    }

    fn ability(id: &str, applicable: &[&str]) -> AbilityDefinition {
        AbilityDefinition {
            id: id.to_string(),
            tier: "common".to_string(),
            max_level: 3,
            display: format!("{} {{level_roman}}", id),
            description: Vec::new(),
            applicable_to: ApplicabilityRule::new(applicable.iter().map(|s| s.to_string()).collect()),
            groups: Vec::new(),
        }
    }

    #[test]
    fn test_socket_json_preserves_order_and_sentinels() {
        let item = ItemState {
            material: "IRON_HELMET".into(),
            abilities: BTreeMap::new(),
            sockets: vec![
                Socket::Rune("swift".into()),
                Socket::Empty,
                Socket::Rune("might".into()),
                Socket::Empty,
            ],
        };

        let json = item.sockets_json().unwrap();
        assert_eq!(json, r#"["swift","empty","might","empty"]"#);

        let restored = ItemState::from_persisted("IRON_HELMET", None, Some(&json)).unwrap();
        assert_eq!(restored.sockets, item.sockets);
    }

    #[test]
    fn test_from_persisted_lowercases_ability_ids() {
        let item = ItemState::from_persisted("bow", Some(r#"{"Frost":2,"VAMPIRE":1}"#), None).unwrap();
        assert_eq!(item.material, "BOW");
        assert_eq!(item.level_of("frost"), Some(2));
        assert_eq!(item.level_of("Vampire"), Some(1));
        assert!(item.sockets.is_empty());
    }

    #[test]
    fn test_from_persisted_rejects_garbage() {
        assert!(matches!(
            ItemState::from_persisted("BOW", Some("{not json"), None),
            Err(ItemStateError::Abilities(_))
        ));
        assert!(matches!(
            ItemState::from_persisted("BOW", None, Some("[1,2]")),
            Err(ItemStateError::Sockets(_))
        ));
    }

    #[test]
    fn test_socket_rune_fills_first_empty() {
        let item = ItemState::new("IRON_SWORD")
            .add_socket()
            .add_socket()
            .socket_rune(&rune("might"))
            .unwrap();
        assert_eq!(item.sockets, vec![Socket::Rune("might".into()), Socket::Empty]);
        assert_eq!(item.empty_sockets(), 1);

        let full = item.socket_rune(&rune("swift")).unwrap();
        assert!(matches!(full.socket_rune(&rune("extra")), Err(ItemStateError::NoEmptySocket)));
    }

    #[test]
    fn test_apply_ability_checks_material() {
        let item = ItemState::new("DIAMOND_SWORD");
        let frost = ability("frost", &["SWORD"]);
        let item = item.apply_ability(&frost, 2).unwrap();
        assert_eq!(item.level_of("frost"), Some(2));

        // Reapplying replaces the level rather than stacking
        let item = item.apply_ability(&frost, 3).unwrap();
        assert_eq!(item.level_of("frost"), Some(3));

        let helm_only = ability("wither_guard", &["ARMOR"]);
        assert!(matches!(
            item.apply_ability(&helm_only, 1),
            Err(ItemStateError::NotApplicable { .. })
        ));
    }

    #[test]
    fn test_lore_lines() {
        let mut registry = DefinitionRegistry::new();
        registry.register_ability(ability("frost", &[]));
        registry.register_rune(rune("might"));

        let item = ItemState::from_persisted(
            "IRON_SWORD",
            Some(r#"{"frost":2,"deleted":1}"#),
            Some(r#"["might","empty","gone"]"#),
        )
        .unwrap();

        let lines = item.lore_lines(&registry, &LoreFormat::default());
        assert_eq!(lines, vec![
            "frost II".to_string(),
            String::new(),
            "&7[ Rune of might &7]".to_string(),
            "&7[ &8Empty Socket &7]".to_string(),
        ]);
    }

    fn socket_strategy() -> impl Strategy<Value = Socket> {
        prop_oneof![
            Just(Socket::Empty),
            "[a-z_]{1,12}".prop_filter("not the sentinel", |s| s != EMPTY_SOCKET).prop_map(Socket::Rune),
        ]
    }

    proptest! {
        #[test]
        fn prop_socket_list_survives_persistence(sockets in prop::collection::vec(socket_strategy(), 0..8)) {
            let item = ItemState { sockets: sockets.clone(), ..ItemState::new("BOW") };
            let json = item.sockets_json().unwrap();
            let restored = ItemState::from_persisted("BOW", None, Some(&json)).unwrap();
            prop_assert_eq!(restored.sockets, sockets);
        }
    }
}
