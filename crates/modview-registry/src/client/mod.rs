//! HTTP client for registry access through a CORS-forwarding relay
//!
//! Every request is routed through the configured relay. A 403 from the
//! registry means "rate limited": live fetches wait for the server's hint
//! (or a fixed cooldown) and retry exactly once.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use modview_core::error::{ModviewError, DEFAULT_COOLDOWN_SECS};
use modview_core::types::{DEFAULT_REGISTRY_URL, DEFAULT_RELAY};
use modview_core::PackageRef;

use crate::api::PackageMetadata;
use crate::RegistryResult;

pub mod pacing;

pub use pacing::{Sleeper, TokioSleeper};

#[cfg(any(test, feature = "test-util"))]
pub use pacing::RecordingSleeper;

/// Configuration for rate-limit handling
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Wait used when a 403 carries no usable `retry-after`
    pub cooldown: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
        }
    }
}

/// Connection settings for the registry client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Registry base URL, with trailing slash
    pub registry_url: String,
    /// Relay prefix; empty sends requests directly
    pub relay: String,
    /// Bearer token forwarded with every request
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Rate-limit handling
    pub rate_limit: RateLimitConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            relay: DEFAULT_RELAY.to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Registry client
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Rate-limit configuration
    rate_limit: RateLimitConfig,
    /// Base registry URL
    base_url: Url,
    /// Relay prefix
    relay: String,
    /// Timer used for backoff
    sleeper: Arc<dyn Sleeper>,
}

impl RegistryClient {
    /// Create a registry client with default settings
    pub fn new() -> RegistryResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a registry client with custom configuration
    pub fn with_config(config: ClientConfig) -> RegistryResult<Self> {
        let base_url = Url::parse(&config.registry_url).map_err(|e| {
            ModviewError::ConfigValidation {
                field: "registry.url".to_string(),
                reason: format!("'{}' is not a valid URL: {}", config.registry_url, e),
            }
        })?;

        let mut builder = ClientBuilder::new()
            .pool_max_idle_per_host(8)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(config.timeout)
            .gzip(true)
            .user_agent(concat!("modview/", env!("CARGO_PKG_VERSION")));

        if let Some(token) = config.token.as_deref().filter(|t| !t.is_empty()) {
            let mut headers = HeaderMap::new();
            let value = format!("Bearer {}", token).parse().map_err(|_| {
                ModviewError::ConfigValidation {
                    field: "registry.token".to_string(),
                    reason: "Token contains characters not allowed in a header".to_string(),
                }
            })?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|e| ModviewError::Unreachable {
            endpoint: config.registry_url.clone(),
            status: None,
            reason: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
        })?;

        Ok(Self {
            client,
            rate_limit: config.rate_limit,
            base_url,
            relay: config.relay,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replace the timer used for rate-limit backoff
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Registry endpoint serving a profile export
    pub fn profile_endpoint(&self, identifier: &str) -> RegistryResult<String> {
        self.endpoint(&["api", "experimental", "legacyprofile", "get", identifier])
    }

    /// Registry endpoint serving a package's metadata
    pub fn package_endpoint(&self, package: &PackageRef) -> RegistryResult<String> {
        self.endpoint(&[
            "api",
            "experimental",
            "package",
            &package.namespace,
            &package.name,
        ])
    }

    /// Build `<base><segments...>/` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> RegistryResult<String> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ModviewError::ConfigValidation {
                field: "registry.url".to_string(),
                reason: format!("'{}' cannot be a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url.to_string())
    }

    /// Wrap an endpoint in the relay URL
    pub fn request_url(&self, endpoint: &str) -> String {
        if self.relay.is_empty() {
            endpoint.to_string()
        } else {
            let encoded: String = url::form_urlencoded::byte_serialize(endpoint.as_bytes()).collect();
            format!("{}{}", self.relay, encoded)
        }
    }

    /// Send a single GET through the relay
    async fn send(&self, endpoint: &str) -> RegistryResult<Response> {
        let url = self.request_url(endpoint);
        debug!("GET {}", url);

        self.client.get(&url).send().await.map_err(|e| {
            ModviewError::unreachable(endpoint, format!("request failed: {}", e), e)
        })
    }

    /// Fetch an endpoint, waiting out one rate limit before giving up.
    ///
    /// A 403 is treated as rate limiting: the client sleeps for the
    /// `retry-after` hint (seconds) or the configured cooldown, then tries
    /// once more. A second 403 is returned as [`ModviewError::RateLimited`].
    pub async fn fetch_live(&self, endpoint: &str) -> RegistryResult<Response> {
        let response = self.send(endpoint).await?;

        if response.status() != StatusCode::FORBIDDEN {
            return Self::check_status(endpoint, response);
        }

        let delay = self.retry_delay(response.headers());
        warn!("Rate-limit hit, throttling for: {}ms!", delay.as_millis());
        self.sleeper.sleep(delay).await;

        let response = self.send(endpoint).await?;
        if response.status() == StatusCode::FORBIDDEN {
            return Err(ModviewError::RateLimited {
                endpoint: endpoint.to_string(),
                retry_after: parse_retry_after(response.headers()),
            });
        }

        Self::check_status(endpoint, response)
    }

    /// Fetch an endpoint with a single attempt.
    ///
    /// A 403 is reported straight away with the server's retry hint.
    pub async fn fetch_once(&self, endpoint: &str) -> RegistryResult<Response> {
        let response = self.send(endpoint).await?;

        if response.status() == StatusCode::FORBIDDEN {
            return Err(ModviewError::RateLimited {
                endpoint: endpoint.to_string(),
                retry_after: parse_retry_after(response.headers()),
            });
        }

        Self::check_status(endpoint, response)
    }

    /// Fetch and parse package metadata
    pub async fn fetch_package(&self, endpoint: &str) -> RegistryResult<PackageMetadata> {
        let response = self.fetch_live(endpoint).await?;

        response.json::<PackageMetadata>().await.map_err(|e| {
            ModviewError::unreachable(endpoint, format!("Failed to parse metadata: {}", e), e)
        })
    }

    /// Download the raw export for a profile identifier
    pub async fn fetch_profile_payload(&self, identifier: &str) -> RegistryResult<Vec<u8>> {
        let endpoint = self.profile_endpoint(identifier)?;
        let response = self.fetch_once(&endpoint).await?;

        let bytes = response.bytes().await.map_err(|e| {
            ModviewError::unreachable(&endpoint, format!("Failed to read profile: {}", e), e)
        })?;

        Ok(bytes.to_vec())
    }

    /// Delay before retrying a rate-limited request
    pub fn retry_delay(&self, headers: &HeaderMap) -> Duration {
        parse_retry_after(headers)
            .map(|secs| Duration::from_millis(secs.saturating_mul(1000)))
            .unwrap_or(self.rate_limit.cooldown)
    }

    fn check_status(endpoint: &str, response: Response) -> RegistryResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ModviewError::http_status(endpoint, status.as_u16()))
        }
    }
}

/// Read `retry-after` as whole seconds
fn parse_retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

#[cfg(test)]
mod tests;
