//! Ad retrieval.
//!
//! One HTTP request per zone, all zones in a batch issued concurrently and
//! joined; a failing zone never disturbs its siblings. Outbound HTTP goes
//! through the [`AdTransport`] seam so the core stays host-agnostic — native
//! hosts plug in a real client, tests plug in a scripted double.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use futures_util::future::join_all;
use rand::Rng;
use thiserror::Error;
use url::Url;

use crate::shell;
use crate::sign::sign_request;
use crate::zone::ZoneId;

/// Revive-compatible delivery endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://ads.zonestream.net/www/delivery/afr.php";

/// Where ads come from and how requests are authenticated.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Base delivery URL; `zoneid` and `cb` query parameters are appended.
    pub endpoint: Url,
    /// Shared secret for request signing. Absent means unauthenticated
    /// requests (deployments without keyed delivery).
    pub key: Option<String>,
}

impl DeliveryConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn has_key(&self) -> bool {
        self.key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            key: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("response body unreadable: {0}")]
    Body(String),
}

/// One HTTP response, decoded to text.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Outbound HTTP seam.
#[async_trait]
pub trait AdTransport: Send + Sync {
    async fn get(
        &self,
        url: &Url,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: AdTransport + ?Sized> AdTransport for &T {
    async fn get(
        &self,
        url: &Url,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        (**self).get(url, headers).await
    }
}

#[async_trait]
impl<T: AdTransport + ?Sized> AdTransport for Arc<T> {
    async fn get(
        &self,
        url: &Url,
        headers: &[(String, String)],
    ) -> Result<TransportResponse, TransportError> {
        (**self).get(url, headers).await
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("delivery server returned status {0}")]
    Status(u16),
}

/// Fetches ad documents for zones against one delivery configuration.
pub struct AdFetcher<T> {
    transport: T,
    config: DeliveryConfig,
}

impl<T: AdTransport> AdFetcher<T> {
    pub fn new(transport: T, config: DeliveryConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &DeliveryConfig {
        &self.config
    }

    /// Fetch every zone concurrently. The result is positionally aligned with
    /// the input: `out[i]` belongs to `zones[i]` whatever the completion
    /// order, and duplicates are fetched independently. An empty input issues
    /// no requests.
    pub async fn fetch_all(&self, zones: &[ZoneId]) -> Vec<Result<String, FetchError>> {
        if zones.is_empty() {
            return Vec::new();
        }
        let results = join_all(zones.iter().copied().map(|zone| self.fetch_one(zone))).await;
        let resolved = results.iter().filter(|r| r.is_ok()).count();
        log::info!(
            "delivery batch settled: {}/{} zone(s) resolved",
            resolved,
            zones.len()
        );
        results
    }

    /// Fetch a single zone and wrap the returned markup in the document shell.
    pub async fn fetch_one(&self, zone: ZoneId) -> Result<String, FetchError> {
        let url = self.request_url(zone);
        let headers = self.auth_headers();
        let res = match self.transport.get(&url, &headers).await {
            Ok(res) => res,
            Err(err) => {
                log::warn!("zone {}: ad fetch failed: {}", zone, err);
                return Err(err.into());
            }
        };
        if !(200..300).contains(&res.status) {
            log::warn!("zone {}: delivery returned status {}", zone, res.status);
            return Err(FetchError::Status(res.status));
        }
        Ok(shell::wrap_document(&res.body))
    }

    /// Endpoint plus `zoneid` and a random `cb` cache-buster.
    fn request_url(&self, zone: ZoneId) -> Url {
        let mut url = self.config.endpoint.clone();
        let cb: u32 = rand::thread_rng().gen_range(0..1_000_000);
        url.query_pairs_mut()
            .append_pair("zoneid", &zone.to_string())
            .append_pair("cb", &cb.to_string());
        url
    }

    /// Signature headers, recomputed at send time so the timestamp is fresh.
    /// Empty when no key is configured (degraded unauthenticated mode).
    fn auth_headers(&self) -> Vec<(String, String)> {
        match self.config.key.as_deref() {
            Some(key) if !key.is_empty() => sign_request(key, SystemTime::now()).headers(),
            _ => Vec::new(),
        }
    }
}
