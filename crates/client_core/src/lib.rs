use std::{sync::Arc, time::Duration};

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::protocol::{CollectionEnvelope, DataEnvelope};

pub mod error;
pub mod events;
pub mod flows;
pub mod forms;
pub mod list_loader;
pub mod routes;
pub mod transport;
pub mod typeahead;

#[cfg(test)]
mod test_support;

pub use error::RequestError;
pub use events::{ClientEvent, Collaborators, EventBus, Modal, ModalId, Navigator, Notifier, Route};
pub use list_loader::{
    inject_query, ListLoader, ListSnapshot, LoadOutcome, LoaderError, PageParams, ParamInjector,
    DEFAULT_PAGE_SIZE,
};
pub use transport::{ApiRequest, ApiTransport, HttpTransport};
pub use typeahead::{SuggestOptions, Typeahead};

/// Typed access to the OMS REST API. Cheap to clone.
#[derive(Clone)]
pub struct OmsClient {
    transport: Arc<dyn ApiTransport>,
}

impl OmsClient {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    pub fn connect(api_url: &str, request_timeout: Duration) -> Result<Self, RequestError> {
        Ok(Self::new(Arc::new(HttpTransport::new(
            api_url,
            request_timeout,
        )?)))
    }

    pub async fn execute(
        &self,
        request: ApiRequest,
        timeout: Option<Duration>,
    ) -> Result<Value, RequestError> {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.execute(request))
                .await
                .map_err(|_| RequestError::Timeout)?,
            None => self.transport.execute(request).await,
        }
    }

    /// GET a single entity and unwrap its `data` envelope.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let value = self.execute(ApiRequest::get(path), None).await?;
        unwrap_data(value)
    }

    /// GET a collection page. A response without `data` is an empty page.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(String, String)>,
        timeout: Option<Duration>,
    ) -> Result<Vec<T>, RequestError> {
        let value = self
            .execute(ApiRequest::get(path).with_query(params), timeout)
            .await?;
        unwrap_collection(value)
    }

    pub async fn create<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.send(Method::POST, path, Some(body)).await?;
        unwrap_data(value)
    }

    pub async fn update<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let value = self.send(Method::PUT, path, Some(body)).await?;
        unwrap_data(value)
    }

    /// POST where only success matters and the payload is ignored.
    pub async fn post_action<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), RequestError> {
        self.send(Method::POST, path, body).await?;
        Ok(())
    }

    pub async fn post_empty(&self, path: &str) -> Result<(), RequestError> {
        self.send::<Value>(Method::POST, path, None).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> Result<(), RequestError> {
        self.execute(ApiRequest::delete(path), None).await?;
        Ok(())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Value, RequestError> {
        let mut request = ApiRequest::new(method, path);
        if let Some(body) = body {
            let encoded =
                serde_json::to_value(body).map_err(|err| RequestError::Encode(err.to_string()))?;
            request = request.with_body(encoded);
        }
        self.execute(request, None).await
    }
}

fn unwrap_data<T: DeserializeOwned>(value: Value) -> Result<T, RequestError> {
    let envelope: DataEnvelope<T> = serde_json::from_value(value)?;
    Ok(envelope.data)
}

fn unwrap_collection<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, RequestError> {
    if value.get("data").map_or(true, Value::is_null) {
        return Ok(Vec::new());
    }
    let envelope: CollectionEnvelope<T> = serde_json::from_value(value)?;
    Ok(envelope.data)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
