use serde::Serialize;

use crate::types::RewardTier;

/// Name of the floor tier.
pub const FLOOR_TIER: &str = "Grind";

/// Resolved tier of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierStatus {
    /// Tier name.
    pub current_tier: String,
    /// Level, as a string.
    pub current_level: String,
    /// Level. `0` is the floor tier.
    pub level: u32,
}

impl TierStatus {
    fn new(tier: impl ToString, level: u32) -> Self {
        Self {
            current_tier: tier.to_string(),
            current_level: level.to_string(),
            level,
        }
    }

    /// The floor tier.
    pub fn floor() -> Self {
        Self::new(FLOOR_TIER, 0)
    }

    /// Returns `true` if this is the floor tier.
    pub fn is_floor(&self) -> bool {
        self.level == 0
    }
}

/// Resolve the tier reached with `total_xp`.
///
/// `tiers` must be ascending by `xp_required`; the last tier whose threshold
/// is met wins and its 1-based position is the level. Members without XP,
/// members below every threshold and members whose tier is named "grind"
/// (case-insensitive) are on the floor tier with level `0`.
pub fn resolve_tier(total_xp: u64, tiers: &[RewardTier]) -> TierStatus {
    if total_xp == 0 {
        return TierStatus::floor();
    }
    let matched = tiers
        .iter()
        .enumerate()
        .filter(|(_, tier)| total_xp >= tier.xp_required)
        .last();
    match matched {
        Some((_, tier)) if tier.name.eq_ignore_ascii_case(FLOOR_TIER) => TierStatus::floor(),
        Some((idx, tier)) => TierStatus::new(&tier.name, idx as u32 + 1),
        None => TierStatus::floor(),
    }
}
