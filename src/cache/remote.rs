use super::{ResultCache, ttl_whole_secs};
use super::protocol::{ENDPOINT_GET, ENDPOINT_PUT, GetResponse, PutRequest, PutResponse};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;
use uuid::Uuid;

/// Upper bound for a single HTTP request to the store.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(200);
/// Attempts per operation, including the first one.
const ATTEMPTS: usize = 2;
/// Initial backoff between attempts.
const BACKOFF_MS: u64 = 25;
/// Key used by `ping`; its value is never read.
const PING_KEY: &str = "__ping__";

/// Client for a key-value store reachable over HTTP.
///
/// Speaks the protocol in `cache::protocol`: `GET {base}/get/{key}` and `POST {base}/put`.
pub struct RemoteCache {
    base_url: Url,
    http_client: reqwest::Client,
    request_timeout: Duration,
}

impl RemoteCache {
    /// Parses the connection URL. Only `http` and `https` are accepted.
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(url).with_context(|| format!("invalid cache URL '{}'", url))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            anyhow::bail!("unsupported cache URL scheme '{}'", base_url.scheme());
        }
        if base_url.cannot_be_a_base() {
            anyhow::bail!("cache URL '{}' cannot carry a path", url);
        }

        Ok(Self {
            base_url,
            http_client: reqwest::Client::new(),
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Checks that the store answers at all. Any non-5xx status counts as reachable.
    pub async fn ping(&self) -> Result<()> {
        let url = self.endpoint(&[ENDPOINT_GET, PING_KEY])?;
        let response = self
            .send_with_retry(|| self.http_client.get(url.clone()))
            .await?;
        if response.status().is_server_error() {
            anyhow::bail!("cache ping failed: {}", response.status());
        }
        Ok(())
    }

    /// Builds `{base}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("cache URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends the request built by `build`, rebuilding it for each attempt.
    async fn send_with_retry<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut delay_ms = BACKOFF_MS;

        for attempt in 0..ATTEMPTS {
            match build().timeout(self.request_timeout).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    if attempt + 1 == ATTEMPTS {
                        return Err(anyhow::anyhow!(e));
                    }
                    backoff(&mut delay_ms).await;
                }
            }
        }

        Err(anyhow::anyhow!("Retry attempts exhausted"))
    }
}

/// Per-request timeout such that every attempt and the first backoff fit inside `budget`.
///
/// Never exceeds `DEFAULT_REQUEST_TIMEOUT`.
pub fn request_timeout_within(budget: Duration) -> Duration {
    let worst_backoff = Duration::from_millis(2 * BACKOFF_MS);
    let per_attempt = budget.saturating_sub(worst_backoff) / ATTEMPTS as u32;
    per_attempt.min(DEFAULT_REQUEST_TIMEOUT)
}

async fn backoff(delay_ms: &mut u64) {
    let jitter = rand::random::<u64>() % BACKOFF_MS;
    tokio::time::sleep(Duration::from_millis(*delay_ms + jitter)).await;
    *delay_ms = (*delay_ms * 2).min(200);
}

#[async_trait]
impl ResultCache for RemoteCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let url = self.endpoint(&[ENDPOINT_GET, key])?;
        let response = self
            .send_with_retry(|| self.http_client.get(url.clone()))
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow::anyhow!("GET request failed {}", response.status()));
        }

        let get_response: GetResponse = response.json().await?;
        Ok(get_response.value_json)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let payload = PutRequest {
            op_id: Uuid::new_v4().to_string(),
            key: key.to_string(),
            value_json: value,
            ttl_secs: ttl_whole_secs(ttl),
        };
        let url = self.endpoint(&[ENDPOINT_PUT])?;
        let response = self
            .send_with_retry(|| self.http_client.post(url.clone()).json(&payload))
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("PUT request failed {}", response.status()));
        }

        let put_response: PutResponse = response.json().await?;
        if !put_response.success {
            return Err(anyhow::anyhow!("Cache rejected write for key '{}'", key));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
