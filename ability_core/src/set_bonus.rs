//! Set bonus qualification

use forge_core::{BonusTier, SetBonusDefinition};
use std::collections::BTreeSet;

/// The one set bonus tier an entity currently qualifies for
#[derive(Debug, Clone, Copy)]
pub struct ActiveSetBonus<'a> {
    pub set: &'a SetBonusDefinition,
    /// Required abilities present on the entity's gear
    pub pieces: u32,
    pub tier: &'a BonusTier,
}

/// Select the set with the most matching pieces and its best unlocked tier
///
/// Only sets with at least one matching piece compete; equal counts go to
/// the smallest set ID. The winning set's tier is the highest one whose
/// `pieces_required` is met, and if it has none the entity gets nothing
/// (a lower-count set does not take over).
pub fn select_set_bonus<'a>(
    sets: &'a [SetBonusDefinition],
    equipped_abilities: &BTreeSet<String>,
) -> Option<ActiveSetBonus<'a>> {
    let mut best: Option<(&SetBonusDefinition, u32)> = None;

    for set in sets {
        let count = set.matching_count(|id| equipped_abilities.contains(id));
        if count == 0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((current, current_count)) => {
                count > current_count || (count == current_count && set.id < current.id)
            }
        };
        if better {
            best = Some((set, count));
        }
    }

    let (set, pieces) = best?;
    let tier = set.tier_for(pieces);
    tracing::debug!(
        set = %set.id,
        pieces,
        tier = ?tier.map(|t| t.pieces_required),
        "Set bonus selection"
    );
    tier.map(|tier| ActiveSetBonus { set, pieces, tier })
}
