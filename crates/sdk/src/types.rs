use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named XP threshold of a loyalty program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardTier {
    /// Tier name.
    pub name: String,
    /// XP needed to reach the tier.
    #[serde(default)]
    pub xp_required: u64,
    /// Rewards granted by the tier.
    #[serde(default)]
    pub rewards: Vec<String>,
}

impl RewardTier {
    /// Create a tier without rewards.
    pub fn new(name: impl ToString, xp_required: u64) -> Self {
        Self {
            name: name.to_string(),
            xp_required,
            rewards: Vec::new(),
        }
    }
}

/// State of a loyalty pass as reported by the protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassData {
    /// Accrued XP.
    #[serde(default)]
    pub xp: u64,
    /// Timestamp of the last action, if any.
    #[serde(default)]
    pub last_action: Option<String>,
    /// Tier recorded on the pass.
    #[serde(default)]
    pub current_tier: String,
    /// Tier roster recorded on the pass.
    #[serde(default)]
    pub reward_tiers: Vec<RewardTier>,
    /// Pass name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Pass owner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Metadata uri.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Details of a loyalty program as reported by the protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDetails {
    /// Display name of the program collection.
    #[serde(default)]
    pub name: String,
    /// Metadata uri.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Collection address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_address: Option<String>,
    /// Tier roster, ascending by `xp_required`.
    #[serde(default)]
    pub reward_tiers: Vec<RewardTier>,
    /// Other fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
