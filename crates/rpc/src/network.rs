use std::str::FromStr;

use url::Url;

/// Solana network a loyalty program lives on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
pub enum Network {
    /// Devnet.
    #[default]
    #[serde(rename = "devnet")]
    #[strum(serialize = "devnet")]
    Devnet,
    /// Mainnet.
    #[serde(rename = "mainnet-beta")]
    #[strum(serialize = "mainnet-beta")]
    MainnetBeta,
}

impl Network {
    /// Parse a network name, as accepted in the `network` query parameter.
    pub fn parse(s: &str) -> crate::Result<Self> {
        Self::from_str(s).map_err(|_| crate::Error::ParseNetwork(s.to_string()))
    }

    /// Helius RPC host for this network.
    pub fn helius_host(&self) -> &'static str {
        match self {
            Self::Devnet => "devnet.helius-rpc.com",
            Self::MainnetBeta => "mainnet.helius-rpc.com",
        }
    }

    /// Build the Helius RPC URL with the given API key.
    pub fn helius_url(&self, api_key: &str) -> crate::Result<Url> {
        let mut url = Url::parse(&format!("https://{}/", self.helius_host()))?;
        url.query_pairs_mut().append_pair("api-key", api_key);
        Ok(url)
    }
}

/// RPC endpoints per network.
///
/// An explicitly configured URL takes precedence over the Helius URL
/// derived from the API key.
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    /// Helius API key.
    pub helius_api_key: Option<String>,
    /// Explicit devnet endpoint.
    pub devnet: Option<Url>,
    /// Explicit mainnet endpoint.
    pub mainnet_beta: Option<Url>,
}

impl Endpoints {
    /// Resolve the RPC URL for `network`.
    pub fn url(&self, network: Network) -> crate::Result<Url> {
        let explicit = match network {
            Network::Devnet => self.devnet.as_ref(),
            Network::MainnetBeta => self.mainnet_beta.as_ref(),
        };
        if let Some(url) = explicit {
            return Ok(url.clone());
        }
        match self.helius_api_key.as_deref() {
            Some(key) if !key.is_empty() => network.helius_url(key),
            _ => Err(crate::Error::MissingEndpoint(network)),
        }
    }
}
