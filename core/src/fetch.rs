//! The authenticated fetch capability.
//!
//! # Design
//! `ApiClient` never talks to the network itself. It hands each
//! `HttpRequest` to a `Fetch` implementation supplied at construction time,
//! which is expected to attach whatever credentials the session requires.
//! Adapters here cover closures, a static bearer token, and `reqwest`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BoxError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Non-2xx statuses are *not* errors at this layer; they come back as an
/// `HttpResponse` and are classified by the caller. `Err` is reserved for
/// failures to obtain a response at all.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for Arc<F> {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl<F: Fetch + ?Sized> Fetch for &F {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        (**self).fetch(request).await
    }
}

/// Adapter turning an async closure into a `Fetch`. Built by [`fetch_fn`].
#[derive(Clone)]
pub struct FetchFn<C>(C);

/// Wrap a closure `HttpRequest -> impl Future<Output = Result<HttpResponse, BoxError>>`.
pub fn fetch_fn<C, Fut>(f: C) -> FetchFn<C>
where
    C: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse, BoxError>> + Send,
{
    FetchFn(f)
}

#[async_trait]
impl<C, Fut> Fetch for FetchFn<C>
where
    C: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse, BoxError>> + Send,
{
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        (self.0)(request).await
    }
}

/// Decorator adding `Authorization: Bearer <token>` to every request.
#[derive(Clone)]
pub struct BearerAuth<F> {
    inner: F,
    token: String,
}

impl<F> BearerAuth<F> {
    pub fn new(inner: F, token: impl Into<String>) -> Self {
        Self {
            inner,
            token: token.into(),
        }
    }
}

impl<F> fmt::Debug for BearerAuth<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl<F: Fetch> Fetch for BearerAuth<F> {
    async fn fetch(&self, mut request: HttpRequest) -> Result<HttpResponse, BoxError> {
        request
            .headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case("authorization"));
        request
            .headers
            .push(("authorization".to_string(), format!("Bearer {}", self.token)));
        self.inner.fetch(request).await
    }
}

#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
#[async_trait]
impl Fetch for reqwest::Client {
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        use crate::http::HttpMethod;

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::HttpMethod;

    fn request() -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/items".to_string(),
            headers: vec![("Authorization".to_string(), "Basic stale".to_string())],
            body: None,
        }
    }

    #[tokio::test]
    async fn closure_adapter_forwards_the_request() {
        let fetch = fetch_fn(|req: HttpRequest| async move {
            Ok::<_, BoxError>(HttpResponse::new(200, req.url))
        });
        let response = fetch.fetch(request()).await.unwrap();
        assert_eq!(response.body, "http://localhost/items");
    }

    #[tokio::test]
    async fn bearer_auth_replaces_existing_authorization() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let inner = fetch_fn(move |req: HttpRequest| {
            *sink.lock().unwrap() = Some(req);
            async { Ok::<_, BoxError>(HttpResponse::new(200, "")) }
        });

        BearerAuth::new(inner, "secret").fetch(request()).await.unwrap();

        let req = seen.lock().unwrap().take().unwrap();
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("Authorization"), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let fetch = Arc::new(fetch_fn(|_req: HttpRequest| async {
            Err::<HttpResponse, BoxError>("offline".into())
        }));
        let err = fetch.fetch(request()).await.unwrap_err();
        assert_eq!(err.to_string(), "offline");
    }

    #[test]
    fn bearer_auth_debug_hides_token() {
        let auth = BearerAuth::new((), "secret");
        assert!(!format!("{auth:?}").contains("secret"));
    }
}
