//! RPC client traits.

use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};
use solana_rpc_client_api::request::RpcRequest;

pub mod generic;

/// A RPC client.
pub trait RpcClient {
    /// Send an [`RpcRequest`] with parameters.
    fn send<T>(
        &self,
        request: RpcRequest,
        params: impl Serialize,
    ) -> impl Future<Output = crate::Result<T>>
    where
        T: DeserializeOwned;
}
