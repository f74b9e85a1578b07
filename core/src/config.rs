//! Client configuration and builder.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::location::Location;

/// Which statuses count as success for the request builders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessPolicy {
    /// Only `200 OK`. Matches the backend contract this client was written for.
    #[default]
    Ok,
    /// Any `2xx` status.
    AnySuccess,
}

impl SuccessPolicy {
    pub fn accepts(&self, status: u16) -> bool {
        match self {
            SuccessPolicy::Ok => status == 200,
            SuccessPolicy::AnySuccess => (200..300).contains(&status),
        }
    }
}

/// Serializable client settings, e.g. loaded from a JSON settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub success_policy: SuccessPolicy,
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn from_json(input: &str) -> Result<Self, ApiError> {
        serde_json::from_str(input).map_err(ApiError::Deserialization)
    }

    pub fn builder(&self) -> ApiClientBuilder {
        let mut builder = ApiClientBuilder::new().success_policy(self.success_policy);
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url.clone());
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
    }
}

enum Origin {
    Url(String),
    Location(Location),
}

/// Builder for [`ApiClient`]. The base URL is resolved once, in `build`.
#[derive(Default)]
pub struct ApiClientBuilder {
    origin: Option<Origin>,
    success_policy: SuccessPolicy,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absolute URL whose origin becomes the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.origin = Some(Origin::Url(url.into()));
        self
    }

    pub fn location(mut self, location: Location) -> Self {
        self.origin = Some(Origin::Location(location));
        self
    }

    pub fn success_policy(mut self, policy: SuccessPolicy) -> Self {
        self.success_policy = policy;
        self
    }

    /// Request timeout applied by `build_reqwest`. Other fetch
    /// implementations own their timeouts.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn resolve_location(&self) -> Result<Location, ApiError> {
        match &self.origin {
            Some(Origin::Url(url)) => Location::parse(url),
            Some(Origin::Location(location)) => Ok(location.clone()),
            #[cfg(all(feature = "web", target_arch = "wasm32"))]
            None => Location::current(),
            #[cfg(not(all(feature = "web", target_arch = "wasm32")))]
            None => Err(ApiError::Configuration("base_url is required".into())),
        }
    }

    /// Build a client around `fetch`. A configured timeout is not applied
    /// here; it only takes effect through `build_reqwest`.
    pub fn build<F>(self, fetch: F) -> Result<ApiClient<F>, ApiError> {
        if let Some(timeout) = self.timeout {
            warn!(
                timeout_ms = timeout.as_millis() as u64,
                "timeout ignored: the injected fetch owns its timeouts"
            );
        }
        self.finish(fetch)
    }

    fn finish<F>(self, fetch: F) -> Result<ApiClient<F>, ApiError> {
        let location = self.resolve_location()?;
        Ok(ApiClient::new(&location, fetch).with_success_policy(self.success_policy))
    }

    /// Build a client backed by a fresh `reqwest::Client`.
    #[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
    pub fn build_reqwest(self) -> Result<ApiClient<reqwest::Client>, ApiError> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http
            .build()
            .map_err(|e| ApiError::Configuration(format!("building HTTP client: {e}")))?;
        self.finish(http)
    }
}
