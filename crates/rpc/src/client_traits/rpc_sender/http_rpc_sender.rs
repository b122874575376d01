//! HTTP RPC sender implementation.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
    time::{Duration, Instant},
};

use backon::{DefaultSleeper, Sleeper};
use reqwest::{header, StatusCode};
use solana_rpc_client_api::error_object::RpcErrorObject;

use super::{RpcRequest, RpcSender, RpcTransportStats};

const TOO_MANY_REQUESTS_RETRIES: usize = 5;
const MAX_RETRY_AFTER_SECS: u64 = 120;
const BODY_SNIPPET_LEN: usize = 1024;

/// HTTP RPC sender implementation.
pub struct HttpRpcSender {
    client: Arc<reqwest::Client>,
    url: String,
    request_id: AtomicU64,
    stats: RwLock<RpcTransportStats>,
    sleeper: DefaultSleeper,
}

impl HttpRpcSender {
    /// Create an HTTP RPC sender.
    pub fn new_with_client(url: impl ToString, client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
            url: url.to_string(),
            request_id: Default::default(),
            stats: Default::default(),
            sleeper: DefaultSleeper::default(),
        }
    }

    fn retry_after(response: &reqwest::Response) -> Duration {
        response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs < MAX_RETRY_AFTER_SECS)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_millis(500))
    }
}

struct StatsUpdater<'a> {
    stats: &'a RwLock<RpcTransportStats>,
    request_start_time: Instant,
    rate_limited_time: Duration,
}

impl<'a> StatsUpdater<'a> {
    fn new(stats: &'a RwLock<RpcTransportStats>) -> Self {
        Self {
            stats,
            request_start_time: Instant::now(),
            rate_limited_time: Duration::default(),
        }
    }

    fn add_rate_limited_time(&mut self, duration: Duration) {
        self.rate_limited_time += duration;
    }
}

impl Drop for StatsUpdater<'_> {
    fn drop(&mut self) {
        if let Ok(mut stats) = self.stats.write() {
            stats.request_count += 1;
            stats.elapsed_time += Instant::now().duration_since(self.request_start_time);
            stats.rate_limited_time += self.rate_limited_time;
        }
    }
}

impl RpcSender for HttpRpcSender {
    async fn send(
        &self,
        request: RpcRequest,
        params: serde_json::Value,
    ) -> crate::Result<serde_json::Value> {
        let mut stats_updater = StatsUpdater::new(&self.stats);

        let request_id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let request_json = request.build_request_json(request_id, params).to_string();

        let mut too_many_requests_retries = TOO_MANY_REQUESTS_RETRIES;
        loop {
            let response = self
                .client
                .post(&self.url)
                .header(header::CONTENT_TYPE, "application/json")
                .body(request_json.clone())
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                if status == StatusCode::TOO_MANY_REQUESTS && too_many_requests_retries > 0 {
                    let duration = Self::retry_after(&response);
                    too_many_requests_retries -= 1;
                    tracing::debug!(
                        %request,
                        retries_left = too_many_requests_retries,
                        ?duration,
                        "too many requests, pausing"
                    );
                    self.sleeper.sleep(duration).await;
                    stats_updater.add_rate_limited_time(duration);
                    continue;
                }
                let body = response.text().await.unwrap_or_default();
                return Err(crate::Error::Status {
                    status: status.as_u16(),
                    body: body.chars().take(BODY_SNIPPET_LEN).collect(),
                });
            }

            let mut json = response.json::<serde_json::Value>().await?;
            if json["error"].is_object() {
                return match serde_json::from_value::<RpcErrorObject>(json["error"].clone()) {
                    Ok(object) => Err(crate::Error::Rpc {
                        code: object.code,
                        message: object.message,
                    }),
                    Err(err) => Err(crate::Error::custom(format!(
                        "failed to deserialize RPC error response: {} [{err}]",
                        json["error"]
                    ))),
                };
            }
            return Ok(json["result"].take());
        }
    }

    fn get_transport_stats(&self) -> RpcTransportStats {
        self.stats
            .read()
            .map(|stats| stats.clone())
            .unwrap_or_default()
    }

    fn url(&self) -> String {
        self.url.clone()
    }
}
