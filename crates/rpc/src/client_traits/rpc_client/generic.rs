//! Generic RPC client implementation.

use serde::{de::DeserializeOwned, Serialize};
use solana_rpc_client_api::request::RpcRequest;

use crate::client_traits::{RpcSender, RpcTransportStats};

use super::RpcClient;

#[cfg(http_rpc_sender)]
use crate::client_traits::rpc_sender::HttpRpcSender;

/// Generic RPC client implementation.
#[derive(Debug, Clone)]
pub struct GenericRpcClient<S> {
    sender: S,
}

impl<S> GenericRpcClient<S> {
    /// Create a RPC client with sender.
    pub fn new_with_sender(sender: S) -> Self {
        Self { sender }
    }
}

impl<S: RpcSender> GenericRpcClient<S> {
    /// Get transport statistics of the underlying sender.
    pub fn transport_stats(&self) -> RpcTransportStats {
        self.sender.get_transport_stats()
    }
}

#[cfg(http_rpc_sender)]
impl GenericRpcClient<HttpRpcSender> {
    /// Create a RPC client for the given url, reusing a reqwest client.
    pub fn new_with_client(url: impl ToString, client: reqwest::Client) -> Self {
        Self::new_with_sender(HttpRpcSender::new_with_client(url, client))
    }
}

impl<S: RpcSender> RpcClient for GenericRpcClient<S> {
    /// Send an [`RpcRequest`] with parameters.
    ///
    /// Positional (array), named (object) and empty (null) parameters are accepted.
    async fn send<T>(&self, request: RpcRequest, params: impl Serialize) -> crate::Result<T>
    where
        T: DeserializeOwned,
    {
        let params = serde_json::to_value(params)?;
        if !params.is_array() && !params.is_object() && !params.is_null() {
            return Err(crate::Error::custom(
                "`params` is neither an array, an object nor null",
            ));
        }

        let response = self.sender.send(request, params).await?;
        Ok(serde_json::from_value(response)?)
    }
}
