use futures_util::future::BoxFuture;
use loyalty_rpc::Network;
use serde_json::Value;

use crate::types::{PassData, ProgramDetails};

mod bridge;

pub use bridge::BridgeProtocol;

/// Operations of the loyalty protocol exposed over HTTP.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Operation {
    /// Award points for an action to a pass.
    AwardLoyaltyPoints,
    /// Gift points to a pass.
    GiftLoyaltyPoints,
    /// Revoke points from a pass.
    RevokeLoyaltyPoints,
    /// Issue a new pass to a member.
    IssueLoyaltyPass,
    /// Mint a voucher.
    MintVoucher,
    /// Redeem a voucher.
    RedeemVoucher,
    /// Check whether a voucher is redeemable.
    ValidateVoucher,
    /// Cancel a voucher.
    CancelVoucher,
    /// Extend the expiry of a voucher.
    ExtendVoucherExpiry,
    /// Create a voucher collection.
    CreateVoucherCollection,
    /// Send a message to a pass holder.
    SendMessage,
    /// Send a broadcast to every member of a program.
    SendBroadcast,
    /// Update program tiers or point rules.
    UpdateLoyaltyProgram,
    /// Approve a pass transfer.
    ApproveTransfer,
    /// Read pass data.
    GetAssetData,
    /// Read program details.
    GetProgramDetails,
    /// List the vouchers of a user.
    GetUserVouchers,
}

impl Operation {
    /// Returns `true` if the operation does not change on-chain state.
    ///
    /// Read-only operations are forwarded without a server signature.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::ValidateVoucher | Self::GetAssetData | Self::GetProgramDetails | Self::GetUserVouchers
        )
    }
}

/// Boundary to the loyalty protocol SDK.
///
/// Point accounting, tier progression, voucher logic and transaction signing
/// all live behind this trait.
pub trait LoyaltyProtocol: Send + Sync {
    /// Read the state of a pass. Returns `None` if the pass does not exist.
    fn get_asset_data<'a>(
        &'a self,
        network: Network,
        pass: &'a str,
    ) -> BoxFuture<'a, crate::Result<Option<PassData>>>;

    /// Read the details of a program. Returns `None` if the program does not exist.
    fn get_program_details<'a>(
        &'a self,
        network: Network,
        collection: &'a str,
    ) -> BoxFuture<'a, crate::Result<Option<ProgramDetails>>>;

    /// Invoke an operation with SDK-shaped parameters.
    fn invoke<'a>(
        &'a self,
        network: Network,
        operation: Operation,
        params: Value,
    ) -> BoxFuture<'a, crate::Result<Value>>;
}
