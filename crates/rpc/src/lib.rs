#![deny(missing_docs)]
#![deny(unreachable_pub)]

//! # Loyalty RPC
//!
//! JSON-RPC plumbing used by the loyalty service: a pluggable transport,
//! a typed client and the Digital Asset Standard (DAS) methods needed to
//! enumerate the members of a loyalty program collection.

/// Error type.
pub mod error;

/// Network.
pub mod network;

/// Client traits.
pub mod client_traits;

/// Digital Asset Standard methods.
pub mod das;

pub use crate::{
    client_traits::{GenericRpcClient, RpcClient, RpcSender},
    das::{Asset, DasClientExt, PaginationOptions},
    error::Error,
    network::{Endpoints, Network},
};

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;

pub use solana_rpc_client_api;
