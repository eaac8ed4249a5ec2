//! Incremental list loading: a growing collection fetched in fixed-size
//! pages, with query-driven resets that invalidate in-flight requests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{error::RequestError, events::Notifier, OmsClient};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Query parameters of one page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageParams {
    pub limit: usize,
    pub offset: usize,
    extra: Vec<(String, String)>,
}

impl PageParams {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit,
            offset,
            extra: Vec::new(),
        }
    }

    /// Adds or replaces one parameter.
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        let value = value.to_string();
        match self.extra.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.extra.push((key, value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "limit" | "offset" => None,
            _ => self
                .extra
                .iter()
                .find(|(existing, _)| existing == key)
                .map(|(_, value)| value.as_str()),
        }
    }

    pub fn into_query(self) -> Vec<(String, String)> {
        let mut query = vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ];
        query.extend(
            self.extra
                .into_iter()
                .filter(|(key, _)| key != "limit" && key != "offset"),
        );
        query
    }
}

/// Extends the base `{limit, offset}` parameters of a page request. Gets the
/// loader's current query string. Runs under the loader's state lock, so it
/// must not call back into the loader.
pub type ParamInjector = Arc<dyn Fn(PageParams, &str) -> PageParams + Send + Sync>;

/// Sends the current query as `query`.
pub fn inject_query() -> ParamInjector {
    Arc::new(|params: PageParams, query: &str| params.with("query", query))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoaderError {
    #[error("page size must be a positive integer")]
    ZeroLimit,
}

#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Loaded { received: usize, exhausted: bool },
    /// A page request is already in flight; nothing was sent.
    Busy,
    /// The last page was already seen; nothing was sent.
    Exhausted,
    /// A reset happened while the request was in flight; the page was dropped.
    Stale,
    /// The request failed and the notifier was told. State is unchanged.
    Failed(RequestError),
}

impl LoadOutcome {
    pub fn issued_request(&self) -> bool {
        !matches!(self, LoadOutcome::Busy | LoadOutcome::Exhausted)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub limit: usize,
    pub exhausted: bool,
    pub loading: bool,
    pub query: String,
    pub request_token: u64,
}

struct ListState<T> {
    items: Vec<T>,
    offset: usize,
    limit: usize,
    exhausted: bool,
    // Token of the request currently counted as loading.
    in_flight: Option<u64>,
    query: String,
    request_token: u64,
}

impl<T> ListState<T> {
    fn reset(&mut self) {
        self.items.clear();
        self.offset = 0;
        self.exhausted = false;
        self.request_token += 1;
        self.in_flight = None;
    }
}

struct LoaderInner<T> {
    client: OmsClient,
    endpoint: String,
    injector: ParamInjector,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ListState<T>>,
}

impl<T> LoaderInner<T> {
    fn lock_state(&self) -> MutexGuard<'_, ListState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears `loading` for its token if the request future is dropped before
/// it settles.
struct InFlightGuard<'a, T> {
    inner: &'a LoaderInner<T>,
    token: u64,
}

impl<T> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        let mut state = self.inner.lock_state();
        if state.in_flight == Some(self.token) {
            state.in_flight = None;
        }
    }
}

/// Cloning yields another handle onto the same list.
pub struct ListLoader<T> {
    inner: Arc<LoaderInner<T>>,
}

impl<T> Clone for ListLoader<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ListLoader<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Creates an idle loader; no request is issued until [`Self::load_more`].
    pub fn new(
        client: OmsClient,
        endpoint: impl Into<String>,
        injector: ParamInjector,
        limit: usize,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, LoaderError> {
        if limit == 0 {
            return Err(LoaderError::ZeroLimit);
        }
        Ok(Self {
            inner: Arc::new(LoaderInner {
                client,
                endpoint: endpoint.into(),
                injector,
                notifier,
                state: Mutex::new(ListState {
                    items: Vec::new(),
                    offset: 0,
                    limit,
                    exhausted: false,
                    in_flight: None,
                    query: String::new(),
                    request_token: 0,
                }),
            }),
        })
    }

    /// Creates a loader and fetches the first page before returning.
    pub async fn attach(
        client: OmsClient,
        endpoint: impl Into<String>,
        injector: ParamInjector,
        limit: usize,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, LoaderError> {
        let loader = Self::new(client, endpoint, injector, limit, notifier)?;
        loader.load_more().await;
        Ok(loader)
    }

    pub async fn load_more(&self) -> LoadOutcome {
        let (token, params) = {
            let mut state = self.inner.lock_state();
            if state.in_flight.is_some() {
                return LoadOutcome::Busy;
            }
            if state.exhausted {
                return LoadOutcome::Exhausted;
            }
            state.in_flight = Some(state.request_token);
            let base = PageParams::new(state.limit, state.items.len());
            (state.request_token, (self.inner.injector)(base, &state.query))
        };
        let _guard = InFlightGuard {
            inner: &self.inner,
            token,
        };

        debug!(
            endpoint = %self.inner.endpoint,
            offset = params.offset,
            limit = params.limit,
            token,
            "requesting page"
        );
        let result = self
            .inner
            .client
            .fetch_page::<T>(&self.inner.endpoint, params.into_query(), None)
            .await;

        let outcome = {
            let mut state = self.inner.lock_state();
            if state.request_token != token {
                debug!(
                    endpoint = %self.inner.endpoint,
                    token,
                    current = state.request_token,
                    "dropping stale page"
                );
                return LoadOutcome::Stale;
            }
            state.in_flight = None;
            match result {
                Ok(page) => {
                    let received = page.len();
                    state.exhausted = received < state.limit;
                    state.items.extend(page);
                    state.offset = state.items.len();
                    LoadOutcome::Loaded {
                        received,
                        exhausted: state.exhausted,
                    }
                }
                Err(err) => LoadOutcome::Failed(err),
            }
        };

        if let LoadOutcome::Failed(err) = &outcome {
            self.inner.notifier.show_error(err);
        }
        outcome
    }

    /// Drops every loaded item, invalidates in-flight requests and reloads
    /// the first page.
    pub async fn reset_data(&self) -> LoadOutcome {
        self.inner.lock_state().reset();
        self.load_more().await
    }

    /// Stores a new filter. Resets the list when it differs from the
    /// current one and returns the outcome of the reload.
    pub async fn set_query(&self, query: impl Into<String>) -> Option<LoadOutcome> {
        let query = query.into();
        {
            let mut state = self.inner.lock_state();
            if state.query == query {
                return None;
            }
            state.query = query;
        }
        Some(self.reset_data().await)
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        let state = self.inner.lock_state();
        ListSnapshot {
            items: state.items.clone(),
            offset: state.offset,
            limit: state.limit,
            exhausted: state.exhausted,
            loading: state.in_flight.is_some(),
            query: state.query.clone(),
            request_token: state.request_token,
        }
    }

    pub fn items(&self) -> Vec<T> {
        self.inner.lock_state().items.clone()
    }

    pub fn query(&self) -> String {
        self.inner.lock_state().query.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock_state().in_flight.is_some()
    }

    pub fn is_exhausted(&self) -> bool {
        self.inner.lock_state().exhausted
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }
}

#[cfg(test)]
#[path = "tests/list_loader_tests.rs"]
mod tests;
