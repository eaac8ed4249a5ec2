use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use shared::error::ApiErrorBody;
use tracing::{debug, warn};
use url::Url;

use crate::error::RequestError;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Executes one request and yields the decoded JSON body of a 2xx response.
/// An empty success body decodes to `Value::Null`.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, RequestError>;
}

pub struct HttpTransport {
    http: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(api_url: &str, request_timeout: Duration) -> Result<Self, RequestError> {
        let base =
            Url::parse(api_url).map_err(|_| RequestError::InvalidEndpoint(api_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RequestError::InvalidEndpoint(api_url.to_string()));
        }
        let http = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|err| RequestError::Transport(err.to_string()))?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves `path` below the API base. Absolute urls are taken as-is.
    pub fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path).map_err(|_| RequestError::InvalidEndpoint(path.to_string()));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RequestError::InvalidEndpoint(path.to_string()))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<Value, RequestError> {
        let url = self.endpoint(&request.path)?;
        debug!(method = %request.method, url = %url, "oms request");

        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }

        warn!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            "oms request failed"
        );
        Err(error_from_response(status.as_u16(), &bytes))
    }
}

pub(crate) fn error_from_response(status: u16, body: &[u8]) -> RequestError {
    let parsed = serde_json::from_slice::<ApiErrorBody>(body).unwrap_or_default();
    match status {
        422 => RequestError::Validation(parsed.errors.unwrap_or_default()),
        404 => RequestError::NotFound {
            message: parsed.summary().unwrap_or_default().to_string(),
        },
        _ => RequestError::Status {
            status,
            message: parsed.summary().unwrap_or_default().to_string(),
        },
    }
}
