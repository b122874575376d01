use loyalty_rpc::Network;
use serde::Serialize;

use crate::{
    index::AssetIndex, protocol::LoyaltyProtocol, types::RewardTier, utils::parse_address,
};

mod aggregate;
mod tier;

pub use aggregate::{aggregate_owners, is_more_recent, OwnerAggregate};
pub use tier::{resolve_tier, TierStatus, FLOOR_TIER};

/// Default number of pass lookups in flight.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Options for [`Leaderboard::fetch`].
#[derive(Debug, Clone)]
pub struct LeaderboardOptions {
    /// Maximum number of pass lookups in flight.
    pub concurrency: usize,
}

impl Default for LeaderboardOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// A ranked member of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardMember {
    /// Owner wallet address.
    pub address: String,
    /// First pass found for the owner.
    pub asset_address: String,
    /// Sum of XP over the owner's passes.
    pub total_xp: u64,
    /// Most recent action.
    pub last_action: Option<String>,
    /// Tier name.
    pub current_tier: String,
    /// Level, as a string.
    pub current_level: String,
    /// Level.
    pub level: u32,
    /// 1-based rank.
    pub rank: usize,
}

impl LeaderboardMember {
    fn from_aggregate(aggregate: OwnerAggregate, program_tiers: &[RewardTier]) -> Self {
        let tiers = if program_tiers.is_empty() {
            aggregate.pass_tiers.as_deref().unwrap_or_default()
        } else {
            program_tiers
        };
        let status = match aggregate.reported_tier {
            Some(reported) if tiers.is_empty() && aggregate.total_xp > 0 => TierStatus {
                current_tier: reported,
                current_level: "0".to_string(),
                level: 0,
            },
            _ => resolve_tier(aggregate.total_xp, tiers),
        };
        Self {
            address: aggregate.owner,
            asset_address: aggregate.asset_address,
            total_xp: aggregate.total_xp,
            last_action: aggregate.last_action,
            current_tier: status.current_tier,
            current_level: status.current_level,
            level: status.level,
            rank: 0,
        }
    }
}

/// Ranked members of a loyalty program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    /// Program display name.
    pub program_name: String,
    /// Collection address.
    pub collection_address: String,
    /// Network.
    pub network: Network,
    /// Number of passes minted in the collection.
    pub total_minted: usize,
    /// Number of distinct owners.
    pub total_members: usize,
    /// Members, by rank.
    pub members: Vec<LeaderboardMember>,
}

impl Leaderboard {
    /// Build the leaderboard of a program collection.
    ///
    /// The program's tier roster is read once and applied to every member.
    /// Failures other than a missing program are reported as
    /// [`Error::Leaderboard`](crate::Error::Leaderboard).
    pub async fn fetch(
        index: &dyn AssetIndex,
        protocol: &dyn LoyaltyProtocol,
        network: Network,
        collection: &str,
        options: &LeaderboardOptions,
    ) -> crate::Result<Self> {
        parse_address(collection)?;
        Self::fetch_unchecked(index, protocol, network, collection, options)
            .await
            .map_err(|err| {
                tracing::error!(%network, collection, %err, "failed to fetch leaderboard");
                match err {
                    err @ crate::Error::NotFound(_) => err,
                    err => crate::Error::Leaderboard(Box::new(err)),
                }
            })
    }

    async fn fetch_unchecked(
        index: &dyn AssetIndex,
        protocol: &dyn LoyaltyProtocol,
        network: Network,
        collection: &str,
        options: &LeaderboardOptions,
    ) -> crate::Result<Self> {
        let program = protocol
            .get_program_details(network, collection)
            .await?
            .ok_or_else(|| crate::Error::NotFound(format!("program {collection}")))?;
        let assets = index.collection_assets(network, collection).await?;
        let aggregates = aggregate_owners(protocol, network, &assets, options.concurrency).await;
        let failed_lookups = aggregates
            .iter()
            .map(|aggregate| aggregate.failed_lookups)
            .sum::<usize>();

        let mut members = aggregates
            .into_iter()
            .map(|aggregate| LeaderboardMember::from_aggregate(aggregate, &program.reward_tiers))
            .collect::<Vec<_>>();
        assign_ranks(&mut members);

        tracing::info!(
            %network,
            collection,
            minted = assets.len(),
            members = members.len(),
            failed_lookups,
            "leaderboard built"
        );

        Ok(Self {
            program_name: program.name,
            collection_address: collection.to_string(),
            network,
            total_minted: assets.len(),
            total_members: members.len(),
            members,
        })
    }
}

/// Sort members by descending XP and assign dense 1-based ranks.
///
/// The sort is stable: members with equal XP keep their relative order.
pub fn assign_ranks(members: &mut [LeaderboardMember]) {
    members.sort_by(|a, b| b.total_xp.cmp(&a.total_xp));
    for (idx, member) in members.iter_mut().enumerate() {
        member.rank = idx + 1;
    }
}
