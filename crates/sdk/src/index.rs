use futures_util::{future::BoxFuture, FutureExt};
use loyalty_rpc::{
    network::Endpoints, Asset, DasClientExt, GenericRpcClient, Network, PaginationOptions,
};

/// Source of the passes minted in a program collection.
pub trait AssetIndex: Send + Sync {
    /// Fetch every asset of `collection`.
    fn collection_assets<'a>(
        &'a self,
        network: Network,
        collection: &'a str,
    ) -> BoxFuture<'a, crate::Result<Vec<Asset>>>;
}

/// [`AssetIndex`] backed by a DAS capable RPC provider.
#[derive(Debug, Clone)]
pub struct DasIndex {
    endpoints: Endpoints,
    pagination: PaginationOptions,
    http: reqwest::Client,
}

impl DasIndex {
    /// Create a DAS index, reusing a reqwest client.
    pub fn new_with_client(
        endpoints: Endpoints,
        pagination: PaginationOptions,
        http: reqwest::Client,
    ) -> Self {
        Self {
            endpoints,
            pagination,
            http,
        }
    }
}

impl AssetIndex for DasIndex {
    fn collection_assets<'a>(
        &'a self,
        network: Network,
        collection: &'a str,
    ) -> BoxFuture<'a, crate::Result<Vec<Asset>>> {
        async move {
            let url = self.endpoints.url(network)?;
            let client = GenericRpcClient::new_with_client(url, self.http.clone());
            let assets = client
                .get_collection_assets(collection, &self.pagination)
                .await?;
            let stats = client.transport_stats();
            tracing::debug!(
                %network,
                collection,
                assets = assets.len(),
                requests = stats.request_count,
                elapsed = ?stats.elapsed_time,
                rate_limited = ?stats.rate_limited_time,
                "indexed collection"
            );
            Ok(assets)
        }
        .boxed()
    }
}
