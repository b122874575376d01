//! # Loyalty SDK
//!
//! Client-side building blocks of the loyalty service:
//!
//! - [`protocol`]: the boundary to the loyalty protocol SDK, and the
//!   [`BridgeProtocol`](protocol::BridgeProtocol) that forwards calls to it.
//! - [`index`]: enumeration of the passes minted in a program collection.
//! - [`leaderboard`]: aggregation of pass data into a ranked leaderboard.

/// Error type.
pub mod error;

/// Pass, program and tier types.
pub mod types;

/// Loyalty protocol boundary.
pub mod protocol;

/// Asset index.
pub mod index;

/// Signer.
pub mod signer;

/// Leaderboard.
pub mod leaderboard;

/// Utils.
pub mod utils;

pub use crate::{
    error::Error,
    index::{AssetIndex, DasIndex},
    leaderboard::{Leaderboard, LeaderboardMember, LeaderboardOptions},
    protocol::{BridgeProtocol, LoyaltyProtocol, Operation},
    types::{PassData, ProgramDetails, RewardTier},
};

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;

pub use loyalty_rpc as rpc;
pub use loyalty_rpc::Network;
pub use solana_sdk;
