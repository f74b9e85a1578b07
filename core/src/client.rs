//! Request builders for the backend REST API.
//!
//! # Design
//! `ApiClient` holds the base URL, the success policy and the injected
//! fetch capability, and carries no mutable state between calls. Each
//! operation has a pure `build_*` step producing an `HttpRequest`; the async
//! methods run that request through `Fetch` and classify the response.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{ApiClientBuilder, SuccessPolicy};
use crate::error::ApiError;
use crate::fetch::Fetch;
use crate::http::{BodyMethod, HttpMethod, HttpRequest, HttpResponse};
use crate::location::Location;
use crate::query::{build_url, QueryParams};

/// Client for the backend API, generic over the fetch capability.
#[derive(Debug, Clone)]
pub struct ApiClient<F> {
    fetch: F,
    base_url: String,
    success_policy: SuccessPolicy,
}

impl ApiClient<()> {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }
}

impl<F> ApiClient<F> {
    pub fn new(location: &Location, fetch: F) -> Self {
        Self {
            fetch,
            base_url: location.base_url(),
            success_policy: SuccessPolicy::default(),
        }
    }

    pub fn with_success_policy(mut self, policy: SuccessPolicy) -> Self {
        self.success_policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn success_policy(&self) -> SuccessPolicy {
        self.success_policy
    }

    pub fn fetcher(&self) -> &F {
        &self.fetch
    }

    /// Base URL joined with the normalized path and encoded query string.
    pub fn url(&self, path: &str, params: &QueryParams) -> String {
        format!("{}{}", self.base_url, build_url(path, params))
    }

    pub fn build_get(&self, path: &str, params: &QueryParams) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.url(path, params),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Build a POST/PUT/PATCH request. A body is serialized to JSON and
    /// flagged with `content-type: application/json`; without one, neither
    /// is sent. A body that serializes to JSON `null` counts as no body.
    pub fn build_with_body<B: Serialize + ?Sized>(
        &self,
        method: BodyMethod,
        path: &str,
        body: Option<&B>,
        params: &QueryParams,
    ) -> Result<HttpRequest, ApiError> {
        let (headers, body) = match body {
            Some(body) => {
                let body = serde_json::to_string(body).map_err(ApiError::Serialization)?;
                if body == "null" {
                    (Vec::new(), None)
                } else {
                    (
                        vec![("content-type".to_string(), "application/json".to_string())],
                        Some(body),
                    )
                }
            }
            None => (Vec::new(), None),
        };
        Ok(HttpRequest {
            method: method.into(),
            url: self.url(path, params),
            headers,
            body,
        })
    }

    pub fn build_delete(&self, path: &str, params: &QueryParams) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.url(path, params),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Pass accepted responses through; reject everything else with the
    /// untouched response.
    pub fn check_status(&self, response: HttpResponse) -> Result<HttpResponse, ApiError> {
        if self.success_policy.accepts(response.status) {
            Ok(response)
        } else {
            Err(ApiError::Status(response))
        }
    }

    pub fn parse_get<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        self.check_status(response)?.json()
    }
}

impl<F: Fetch> ApiClient<F> {
    /// Fetch `path` and deserialize the JSON body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<T, ApiError> {
        let response = self.execute(self.build_get(path, params)).await?;
        self.parse_get(response)
    }

    /// Send a POST/PUT/PATCH and return the raw accepted response.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: BodyMethod,
        path: &str,
        body: Option<&B>,
        params: &QueryParams,
    ) -> Result<HttpResponse, ApiError> {
        let request = self.build_with_body(method, path, body, params)?;
        let response = self.execute(request).await?;
        self.check_status(response)
    }

    pub async fn send_empty(
        &self,
        method: BodyMethod,
        path: &str,
        params: &QueryParams,
    ) -> Result<HttpResponse, ApiError> {
        self.send::<()>(method, path, None, params).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        params: &QueryParams,
    ) -> Result<HttpResponse, ApiError> {
        self.send(BodyMethod::Post, path, Some(body), params).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        params: &QueryParams,
    ) -> Result<HttpResponse, ApiError> {
        self.send(BodyMethod::Put, path, Some(body), params).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        params: &QueryParams,
    ) -> Result<HttpResponse, ApiError> {
        self.send(BodyMethod::Patch, path, Some(body), params).await
    }

    pub async fn delete(&self, path: &str, params: &QueryParams) -> Result<HttpResponse, ApiError> {
        let response = self.execute(self.build_delete(path, params)).await?;
        self.check_status(response)
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "api request");

        let response = self.fetch.fetch(request).await.map_err(|e| {
            warn!(%method, %url, error = %e, "api transport failed");
            ApiError::Transport(e)
        })?;

        if !self.success_policy.accepts(response.status) {
            debug!(%method, %url, status = response.status, "api request rejected");
        }
        Ok(response)
    }
}
