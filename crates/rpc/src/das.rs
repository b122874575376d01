use std::{future::Future, time::Duration};

use backon::{DefaultSleeper, Sleeper};
use serde::{Deserialize, Serialize};
use serde_json::json;
use solana_rpc_client_api::request::RpcRequest;

use crate::client_traits::RpcClient;

const GET_ASSETS_BY_GROUP: RpcRequest = RpcRequest::Custom {
    method: "getAssetsByGroup",
};

/// Group key used for collection membership.
pub const COLLECTION_GROUP_KEY: &str = "collection";

/// Maximum page size accepted by DAS providers.
pub const DEFAULT_PAGE_LIMIT: u32 = 1000;

/// Default pause between two page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

/// An asset record as returned by the DAS indexer.
///
/// Only the fields the loyalty service reads are kept; everything else in the
/// indexer response is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Mint address of the asset.
    pub id: String,
    /// Ownership information.
    pub ownership: AssetOwnership,
}

impl Asset {
    /// Current owner of the asset.
    pub fn owner(&self) -> &str {
        &self.ownership.owner
    }
}

/// Ownership of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetOwnership {
    /// Owner wallet address.
    pub owner: String,
}

/// A page of assets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetPage {
    /// Total number of items in this page.
    #[serde(default)]
    pub total: Option<u64>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<u64>,
    /// Page number.
    #[serde(default)]
    pub page: Option<u64>,
    /// Items.
    #[serde(default)]
    pub items: Vec<Asset>,
}

/// Options for [`DasClientExt::get_all_assets_by_group`].
#[derive(Debug, Clone)]
pub struct PaginationOptions {
    /// Page size.
    pub limit: u32,
    /// Pause between two consecutive page requests.
    pub page_delay: Duration,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

/// A trait that extends [`RpcClient`] with Digital Asset Standard methods.
pub trait DasClientExt: RpcClient {
    /// Fetch one page of assets belonging to a group. Pages start at `1`.
    fn get_assets_by_group(
        &self,
        group_key: &str,
        group_value: &str,
        page: u32,
        limit: u32,
    ) -> impl Future<Output = crate::Result<AssetPage>> {
        let params = json!({
            "groupKey": group_key,
            "groupValue": group_value,
            "page": page,
            "limit": limit,
        });
        async move {
            let page = self
                .send::<Option<AssetPage>>(GET_ASSETS_BY_GROUP, params)
                .await?;
            Ok(page.unwrap_or_default())
        }
    }

    /// Fetch every asset of a group by walking pages until an empty one
    /// is returned.
    ///
    /// Any failed page request aborts the whole walk.
    fn get_all_assets_by_group(
        &self,
        group_key: &str,
        group_value: &str,
        options: &PaginationOptions,
    ) -> impl Future<Output = crate::Result<Vec<Asset>>> {
        async move {
            let sleeper = DefaultSleeper::default();
            let mut assets = Vec::new();
            let mut page = 1;
            loop {
                let AssetPage { items, .. } = self
                    .get_assets_by_group(group_key, group_value, page, options.limit)
                    .await?;
                if items.is_empty() {
                    break;
                }
                tracing::debug!(
                    group_value,
                    page,
                    count = items.len(),
                    "fetched asset page"
                );
                assets.extend(items);
                page += 1;
                if !options.page_delay.is_zero() {
                    sleeper.sleep(options.page_delay).await;
                }
            }
            tracing::debug!(group_value, total = assets.len(), "fetched all assets");
            Ok(assets)
        }
    }

    /// Fetch every asset of a collection.
    fn get_collection_assets(
        &self,
        collection: &str,
        options: &PaginationOptions,
    ) -> impl Future<Output = crate::Result<Vec<Asset>>> {
        self.get_all_assets_by_group(COLLECTION_GROUP_KEY, collection, options)
    }
}

impl<C: RpcClient + ?Sized> DasClientExt for C {}
