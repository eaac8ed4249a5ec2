use std::{
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use serde::de::DeserializeOwned;
use shared::{
    domain::Resource,
    protocol::{Body, Circle, Permission},
};
use tracing::debug;

use crate::{error::RequestError, list_loader::PageParams, OmsClient};

pub const SUGGESTION_LIMIT: usize = 8;

#[derive(Debug, Clone)]
pub struct SuggestOptions {
    pub limit: usize,
    /// Ask for entries outside the caller's own scope (`all=true`).
    pub all: bool,
    pub timeout: Option<Duration>,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            limit: SUGGESTION_LIMIT,
            all: false,
            timeout: None,
        }
    }
}

impl SuggestOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// First page of `endpoint` filtered by `query`. An absent payload yields an
/// empty list.
pub async fn fetch_suggestions<T: DeserializeOwned>(
    client: &OmsClient,
    endpoint: &str,
    query: &str,
    options: &SuggestOptions,
) -> Result<Vec<T>, RequestError> {
    let mut params = PageParams::new(options.limit.max(1), 0).with("query", query);
    if options.all {
        params = params.with("all", true);
    }
    client
        .fetch_page(endpoint, params.into_query(), options.timeout)
        .await
}

pub async fn fetch_bodies(
    client: &OmsClient,
    query: &str,
    timeout: Option<Duration>,
) -> Result<Vec<Body>, RequestError> {
    let options = SuggestOptions {
        timeout,
        ..SuggestOptions::default()
    };
    fetch_suggestions(client, &Resource::Bodies.path(), query, &options).await
}

pub async fn fetch_circles(
    client: &OmsClient,
    query: &str,
    timeout: Option<Duration>,
) -> Result<Vec<Circle>, RequestError> {
    let options = SuggestOptions {
        all: true,
        timeout,
        ..SuggestOptions::default()
    };
    fetch_suggestions(client, &Resource::Circles.path(), query, &options).await
}

pub async fn fetch_permissions(
    client: &OmsClient,
    query: &str,
    timeout: Option<Duration>,
) -> Result<Vec<Permission>, RequestError> {
    let options = SuggestOptions {
        timeout,
        ..SuggestOptions::default()
    };
    fetch_suggestions(client, &Resource::Permissions.path(), query, &options).await
}

/// Keystroke-driven suggestions. Only the answer to the newest query is
/// delivered; older answers resolve to `Ok(None)`.
pub struct Typeahead<T> {
    client: OmsClient,
    endpoint: String,
    options: SuggestOptions,
    latest: AtomicU64,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Typeahead<T> {
    pub fn new(client: OmsClient, endpoint: impl Into<String>, options: SuggestOptions) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            options,
            latest: AtomicU64::new(0),
            _item: PhantomData,
        }
    }

    pub async fn query(&self, query: &str) -> Result<Option<Vec<T>>, RequestError> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let result = fetch_suggestions(&self.client, &self.endpoint, query, &self.options).await;
        if self.latest.load(Ordering::SeqCst) != ticket {
            debug!(endpoint = %self.endpoint, query, "suggestions superseded");
            return Ok(None);
        }
        result.map(Some)
    }
}

#[cfg(test)]
#[path = "tests/typeahead_tests.rs"]
mod tests;
