//! One-shot GET resources for UI consumers.
//!
//! A `Resource` fetches its path at most once and publishes the outcome as a
//! `ResourceState` through a `watch` channel, so views can render loading
//! and error states instead of an empty placeholder.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::fetch::Fetch;
use crate::query::QueryParams;

/// Observable state of a resource.
#[derive(Debug, Clone)]
pub enum ResourceState<T> {
    Pending,
    Ready(T),
    Failed(Arc<ApiError>),
}

impl<T> ResourceState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, ResourceState::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            ResourceState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            ResourceState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// A GET request that runs once, on first activation.
#[derive(Debug)]
pub struct Resource<T> {
    path: String,
    params: QueryParams,
    activated: AtomicBool,
    state: watch::Sender<ResourceState<T>>,
}

/// Resource whose value is a JSON array; reads as empty until loaded.
pub type ListResource<T> = Resource<Vec<T>>;

impl<T> Resource<T> {
    pub fn new(path: impl Into<String>, params: QueryParams) -> Self {
        let (state, _) = watch::channel(ResourceState::Pending);
        Self {
            path: path.into(),
            params,
            activated: AtomicBool::new(false),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.state.subscribe()
    }

    pub fn is_activated(&self) -> bool {
        self.activated.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ResourceState<T>
    where
        T: Clone,
    {
        self.state.borrow().clone()
    }

    /// The loaded value; `None` while pending or after a failure.
    pub fn value(&self) -> Option<T>
    where
        T: Clone,
    {
        self.state.borrow().value().cloned()
    }
}

impl<T: Clone> Resource<Vec<T>> {
    pub fn items(&self) -> Vec<T> {
        self.value().unwrap_or_default()
    }
}

/// Clears the activation flag unless disarmed, so a fetch whose future is
/// dropped before completing can be retried by the next `activate`.
struct ActivationGuard<'a> {
    flag: &'a AtomicBool,
    armed: bool,
}

impl Drop for ActivationGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.flag.store(false, Ordering::Release);
        }
    }
}

impl<T: DeserializeOwned> Resource<T> {
    /// Issue the GET unless it already ran or is in flight. Returns whether
    /// this call performed the fetch. Dropping the returned future before it
    /// completes leaves the resource `Pending` and activatable again.
    pub async fn activate<F: Fetch>(&self, client: &ApiClient<F>) -> bool {
        if self.activated.swap(true, Ordering::AcqRel) {
            return false;
        }
        let mut guard = ActivationGuard {
            flag: &self.activated,
            armed: true,
        };

        let next = match client.get::<T>(&self.path, &self.params).await {
            Ok(value) => ResourceState::Ready(value),
            Err(err) => {
                debug!(path = %self.path, error = %err, "resource fetch failed");
                ResourceState::Failed(Arc::new(err))
            }
        };
        self.state.send_replace(next);
        guard.armed = false;
        true
    }
}
