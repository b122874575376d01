use std::sync::Arc;

use loyalty_sdk::{
    signer::load_signer, AssetIndex, BridgeProtocol, DasIndex, LeaderboardOptions,
    LoyaltyProtocol,
};

use crate::config::Config;

/// Shared state of the HTTP service.
#[derive(Clone)]
pub struct AppState {
    /// Collection listing.
    pub index: Arc<dyn AssetIndex>,
    /// Loyalty protocol.
    pub protocol: Arc<dyn LoyaltyProtocol>,
    /// Leaderboard options.
    pub leaderboard: LeaderboardOptions,
    /// HTTP client for card images.
    pub http: reqwest::Client,
}

impl AppState {
    /// Create state from explicit parts.
    pub fn new(
        index: Arc<dyn AssetIndex>,
        protocol: Arc<dyn LoyaltyProtocol>,
        leaderboard: LeaderboardOptions,
    ) -> Self {
        Self {
            index,
            protocol,
            leaderboard,
            http: reqwest::Client::new(),
        }
    }

    /// Create state from config.
    ///
    /// A missing `SECRET_KEY` only disables write operations; a malformed one
    /// is an error.
    pub fn from_config(config: &Config) -> eyre::Result<Self> {
        let signer = match load_signer(config.secret_key.as_deref()) {
            Ok(signer) => {
                use loyalty_sdk::solana_sdk::signer::Signer;
                tracing::info!(signer = %signer.pubkey(), "loaded server signer");
                Some(signer)
            }
            Err(loyalty_sdk::Error::MissingSecretKey) => {
                tracing::warn!("SECRET_KEY is not set, write operations will be rejected");
                None
            }
            Err(err) => return Err(err.into()),
        };
        let http = reqwest::Client::new();
        let protocol = BridgeProtocol::try_new_with_client(&config.bridge_url, signer, http.clone())?;
        let index = DasIndex::new_with_client(config.endpoints(), config.pagination()?, http.clone());
        Ok(Self {
            index: Arc::new(index),
            protocol: Arc::new(protocol),
            leaderboard: config.leaderboard_options(),
            http,
        })
    }
}
