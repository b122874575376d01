use std::{net::SocketAddr, path::Path, time::Duration};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use loyalty_sdk::{
    leaderboard::DEFAULT_CONCURRENCY,
    rpc::{
        das::{DEFAULT_PAGE_DELAY, DEFAULT_PAGE_LIMIT},
        network::Endpoints,
        PaginationOptions,
    },
    LeaderboardOptions,
};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Prefix of environment variables overriding config keys.
pub const ENV_PREFIX: &str = "LOYALTY_";

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to listen on.
    pub listen: SocketAddr,
    /// Helius API key used to derive RPC endpoints.
    pub helius_api_key: Option<String>,
    /// Explicit RPC endpoints.
    pub rpc_url: RpcUrls,
    /// Base URL of the protocol SDK bridge.
    pub bridge_url: String,
    /// Server signing key, base58 or a JSON byte array.
    #[serde(deserialize_with = "deserialize_secret_key")]
    pub secret_key: Option<String>,
    /// Leaderboard settings.
    pub leaderboard: LeaderboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            helius_api_key: None,
            rpc_url: RpcUrls::default(),
            bridge_url: "http://127.0.0.1:8787".to_string(),
            secret_key: None,
            leaderboard: LeaderboardConfig::default(),
        }
    }
}

/// Environment values are parsed, so a `solana-keygen` byte array arrives as a
/// sequence. It is turned back into its JSON text.
fn deserialize_secret_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SecretKey {
        Text(String),
        Bytes(Vec<u8>),
    }

    match Option::<SecretKey>::deserialize(deserializer)? {
        None => Ok(None),
        Some(SecretKey::Text(text)) => Ok(Some(text)),
        Some(SecretKey::Bytes(bytes)) => serde_json::to_string(&bytes)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Explicit RPC endpoints per network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcUrls {
    /// Devnet.
    pub devnet: Option<Url>,
    /// Mainnet.
    pub mainnet_beta: Option<Url>,
}

/// Leaderboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    /// Page size of collection listing.
    pub page_limit: u32,
    /// Pause between pages, e.g. `100ms`.
    pub page_delay: String,
    /// Maximum number of pass lookups in flight.
    pub concurrency: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
            page_delay: humantime::format_duration(DEFAULT_PAGE_DELAY).to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Config {
    /// Load config from defaults, an optional TOML file and the environment.
    ///
    /// `SECRET_KEY`, `HELIUS_API_KEY` and `NEXT_PUBLIC_HELIUS_API_KEY` are
    /// read as is; every other key can be set with a `LOYALTY_` prefixed
    /// variable, using `__` to separate nested keys.
    pub fn load(path: Option<&Path>) -> eyre::Result<Self> {
        Ok(Self::figment(path).extract()?)
    }

    /// The figment this config is extracted from.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&["NEXT_PUBLIC_HELIUS_API_KEY"])
                    .map(|_| "helius_api_key".into()),
            )
            .merge(Env::raw().only(&["HELIUS_API_KEY", "SECRET_KEY"]))
    }

    /// RPC endpoints.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            helius_api_key: self.helius_api_key.clone(),
            devnet: self.rpc_url.devnet.clone(),
            mainnet_beta: self.rpc_url.mainnet_beta.clone(),
        }
    }

    /// Pagination options for collection listing.
    pub fn pagination(&self) -> eyre::Result<PaginationOptions> {
        Ok(PaginationOptions {
            limit: self.leaderboard.page_limit,
            page_delay: self.page_delay()?,
        })
    }

    fn page_delay(&self) -> eyre::Result<Duration> {
        humantime::parse_duration(&self.leaderboard.page_delay).map_err(|err| {
            eyre::eyre!(
                "invalid `leaderboard.page_delay` {:?}: {err}",
                self.leaderboard.page_delay
            )
        })
    }

    /// Leaderboard options.
    pub fn leaderboard_options(&self) -> LeaderboardOptions {
        LeaderboardOptions {
            concurrency: self.leaderboard.concurrency.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load(None).expect("load");
            assert_eq!(config.listen.port(), 3000);
            assert_eq!(config.leaderboard.page_limit, 1000);
            assert_eq!(
                config.pagination().expect("pagination").page_delay,
                Duration::from_millis(100)
            );
            assert_eq!(config.leaderboard_options().concurrency, 8);
            assert!(config.secret_key.is_none());
            Ok(())
        });
    }

    #[test]
    fn file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "loyalty.toml",
                r#"
                    listen = "127.0.0.1:8080"
                    bridge_url = "http://bridge:9000"

                    [rpc_url]
                    devnet = "http://localhost:8899"

                    [leaderboard]
                    page_delay = "250ms"
                    concurrency = 2
                "#,
            )?;
            jail.set_env("LOYALTY_LEADERBOARD__CONCURRENCY", "16");
            jail.set_env("NEXT_PUBLIC_HELIUS_API_KEY", "public-key");
            jail.set_env("HELIUS_API_KEY", "server-key");
            jail.set_env("SECRET_KEY", "base58-secret");

            let config = Config::load(Some(Path::new("loyalty.toml"))).expect("load");
            assert_eq!(config.listen.port(), 8080);
            assert_eq!(config.bridge_url, "http://bridge:9000");
            assert_eq!(config.leaderboard.concurrency, 16);
            assert_eq!(
                config.pagination().expect("pagination").page_delay,
                Duration::from_millis(250)
            );
            assert_eq!(config.helius_api_key.as_deref(), Some("server-key"));
            assert_eq!(config.secret_key.as_deref(), Some("base58-secret"));
            assert_eq!(
                config.rpc_url.devnet.as_ref().map(Url::as_str),
                Some("http://localhost:8899/")
            );
            Ok(())
        });
    }

    #[test]
    fn keypair_byte_array_secret_key() {
        use loyalty_sdk::{
            signer::load_signer,
            solana_sdk::{signature::Keypair, signer::Signer},
        };

        let keypair = Keypair::new();
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        Jail::expect_with(|jail| {
            jail.set_env("SECRET_KEY", &json);
            let config = Config::load(None).expect("load");
            let signer = load_signer(config.secret_key.as_deref()).expect("signer");
            assert_eq!(signer.pubkey(), keypair.pubkey());
            Ok(())
        });
    }

    #[test]
    fn public_helius_key_is_accepted() {
        Jail::expect_with(|jail| {
            jail.set_env("NEXT_PUBLIC_HELIUS_API_KEY", "public-key");
            let config = Config::load(None).expect("load");
            assert_eq!(config.helius_api_key.as_deref(), Some("public-key"));
            Ok(())
        });
    }

    #[test]
    fn invalid_page_delay() {
        Jail::expect_with(|jail| {
            jail.set_env("LOYALTY_LEADERBOARD__PAGE_DELAY", "soon");
            let config = Config::load(None).expect("load");
            assert!(config.pagination().is_err());
            Ok(())
        });
    }
}
