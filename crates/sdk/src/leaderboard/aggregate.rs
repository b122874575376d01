use std::cmp::Ordering;

use futures_util::{stream, StreamExt};
use indexmap::IndexMap;
use loyalty_rpc::{Asset, Network};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{
    protocol::LoyaltyProtocol,
    types::{PassData, RewardTier},
};

/// Passes of one owner folded together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerAggregate {
    /// Owner address.
    pub owner: String,
    /// First asset seen for the owner.
    pub asset_address: String,
    /// Sum of XP over the owner's passes.
    pub total_xp: u64,
    /// Most recent last action.
    pub last_action: Option<String>,
    /// First non-empty tier recorded on the owner's passes.
    pub reported_tier: Option<String>,
    /// First non-empty tier roster recorded on the owner's passes.
    pub pass_tiers: Option<Vec<RewardTier>>,
    /// Number of passes whose lookup failed.
    pub failed_lookups: usize,
}

impl OwnerAggregate {
    fn new(owner: &str, asset_address: &str) -> Self {
        Self {
            owner: owner.to_string(),
            asset_address: asset_address.to_string(),
            total_xp: 0,
            last_action: None,
            reported_tier: None,
            pass_tiers: None,
            failed_lookups: 0,
        }
    }

    fn fold(&mut self, pass: PassData) {
        self.total_xp = self.total_xp.saturating_add(pass.xp);
        if let Some(action) = pass.last_action.filter(|a| !a.is_empty()) {
            if is_more_recent(&action, self.last_action.as_deref()) {
                self.last_action = Some(action);
            }
        }
        if self.reported_tier.is_none() && !pass.current_tier.is_empty() {
            self.reported_tier = Some(pass.current_tier);
        }
        if self.pass_tiers.is_none() && !pass.reward_tiers.is_empty() {
            self.pass_tiers = Some(pass.reward_tiers);
        }
    }
}

/// Returns `true` if `candidate` is more recent than `current`.
///
/// Values that both parse as RFC 3339 timestamps are compared as instants,
/// anything else is compared as strings.
pub fn is_more_recent(candidate: &str, current: Option<&str>) -> bool {
    let Some(current) = current else {
        return true;
    };
    let ordering = match (
        OffsetDateTime::parse(candidate, &Rfc3339),
        OffsetDateTime::parse(current, &Rfc3339),
    ) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => candidate.cmp(current),
    };
    ordering == Ordering::Greater
}

/// Fetch pass data for every asset and fold it per owner.
///
/// Lookups run with at most `concurrency` in flight and results are folded in
/// asset order, so owners appear in first-seen order. A failed lookup is
/// logged and contributes nothing to its owner's totals.
pub async fn aggregate_owners(
    protocol: &dyn LoyaltyProtocol,
    network: Network,
    assets: &[Asset],
    concurrency: usize,
) -> Vec<OwnerAggregate> {
    let mut owners: IndexMap<&str, OwnerAggregate> = IndexMap::new();
    for asset in assets {
        owners
            .entry(asset.owner())
            .or_insert_with(|| OwnerAggregate::new(asset.owner(), &asset.id));
    }

    let mut lookups = stream::iter(0..assets.len())
        .map(|idx| {
            let id = assets[idx].id.clone();
            async move { (idx, protocol.get_asset_data(network, &id).await) }
        })
        .buffered(concurrency.max(1));

    while let Some((idx, result)) = lookups.next().await {
        let asset = &assets[idx];
        let Some(aggregate) = owners.get_mut(asset.owner()) else {
            continue;
        };
        match result {
            Ok(Some(pass)) => aggregate.fold(pass),
            Ok(None) => {
                tracing::warn!(asset = %asset.id, owner = asset.owner(), "pass data not found");
                aggregate.failed_lookups += 1;
            }
            Err(err) => {
                tracing::warn!(asset = %asset.id, owner = asset.owner(), %err, "failed to fetch pass data");
                aggregate.failed_lookups += 1;
            }
        }
    }

    owners.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_timestamps_compare_as_instants() {
        assert!(is_more_recent(
            "2025-03-01T10:00:00+02:00",
            Some("2025-03-01T07:30:00Z")
        ));
        assert!(!is_more_recent(
            "2025-03-01T09:00:00+02:00",
            Some("2025-03-01T07:30:00Z")
        ));
        assert!(is_more_recent("2025-03-01T07:30:00.5Z", Some("2025-03-01T07:30:00Z")));
    }

    #[test]
    fn other_values_compare_as_strings() {
        assert!(is_more_recent("b", Some("a")));
        assert!(!is_more_recent("a", Some("a")));
        assert!(is_more_recent("1700000001000", Some("1700000000000")));
        assert!(is_more_recent("anything", None));
    }

    #[test]
    fn fold_keeps_first_tier_data() {
        let mut aggregate = OwnerAggregate::new("owner", "asset-1");
        aggregate.fold(PassData {
            xp: 100,
            last_action: Some("2025-01-01T00:00:00Z".to_string()),
            current_tier: String::new(),
            ..Default::default()
        });
        aggregate.fold(PassData {
            xp: 250,
            last_action: Some("2025-02-01T00:00:00Z".to_string()),
            current_tier: "Silver".to_string(),
            reward_tiers: vec![RewardTier::new("Silver", 300)],
            ..Default::default()
        });
        aggregate.fold(PassData {
            xp: 50,
            last_action: None,
            current_tier: "Gold".to_string(),
            reward_tiers: vec![RewardTier::new("Gold", 1)],
            ..Default::default()
        });

        assert_eq!(aggregate.total_xp, 400);
        assert_eq!(aggregate.last_action.as_deref(), Some("2025-02-01T00:00:00Z"));
        assert_eq!(aggregate.reported_tier.as_deref(), Some("Silver"));
        assert_eq!(
            aggregate.pass_tiers,
            Some(vec![RewardTier::new("Silver", 300)])
        );
    }

    #[test]
    fn xp_saturates() {
        let mut aggregate = OwnerAggregate::new("owner", "asset-1");
        aggregate.fold(PassData {
            xp: u64::MAX,
            ..Default::default()
        });
        aggregate.fold(PassData {
            xp: 1,
            ..Default::default()
        });
        assert_eq!(aggregate.total_xp, u64::MAX);
    }
}
