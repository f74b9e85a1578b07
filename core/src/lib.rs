//! Client-side helper layer for an authenticated REST backend.
//!
//! # Overview
//! Builds request URLs (origin + normalized path + encoded query), hands
//! requests to an injected authenticated fetch capability, and classifies
//! responses by status. Failures carry the raw response so call sites can
//! choose to surface the server's `message` through a notification sink.
//!
//! # Design
//! - `ApiClient` holds only the base URL, the success policy and the fetch
//!   capability; it has no mutable state.
//! - Each operation has a pure `build_*` step, so URL and body rules are
//!   testable without I/O.
//! - `Fetch` is the single seam for network access and credentials.
//! - `Resource` turns a one-shot GET into an observable pending/ready/failed
//!   state for UI layers.

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod location;
pub mod notify;
pub mod query;
pub mod resource;

pub use client::ApiClient;
pub use config::{ApiClientBuilder, ClientConfig, SuccessPolicy};
pub use error::{ApiError, BoxError};
pub use fetch::{fetch_fn, BearerAuth, Fetch, FetchFn};
pub use http::{BodyMethod, HttpMethod, HttpRequest, HttpResponse};
pub use location::Location;
pub use notify::{ErrorPresenter, Notifier, ToastLevel, ToastOptions, ToastTheme, TracingNotifier};
pub use query::{build_url, encode_component, QueryParams};
pub use resource::{ListResource, Resource, ResourceState};
