use shared::error::{ErrorCode, FieldErrors};
use thiserror::Error;

/// Terminal failure of one request against the OMS API.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("failed to encode request body: {0}")]
    Encode(String),
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Validation(_) => Some(422),
            RequestError::NotFound { .. } => Some(404),
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self.status() {
            Some(status) => ErrorCode::from_status(status),
            None => ErrorCode::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RequestError::NotFound { .. })
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            RequestError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Message suitable for an error toast.
    pub fn user_message(&self) -> String {
        match self {
            RequestError::Validation(errors) => {
                let fields = errors
                    .iter()
                    .map(|(field, message)| format!("{field} {message}"))
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("Invalid input: {fields}")
            }
            RequestError::NotFound { message } if message.is_empty() => "Not found".to_string(),
            RequestError::NotFound { message } => message.clone(),
            RequestError::Status { status, message } if message.is_empty() => {
                format!("Request failed with status {status}")
            }
            RequestError::Status { message, .. } => message.clone(),
            RequestError::Timeout => "The server took too long to answer".to_string(),
            RequestError::Transport(_) => "Could not reach the server".to_string(),
            RequestError::Decode(_) => "The server sent an unexpected response".to_string(),
            RequestError::Encode(_) => "The form could not be sent".to_string(),
            RequestError::InvalidEndpoint(endpoint) => format!("Invalid endpoint {endpoint}"),
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            RequestError::Timeout
        } else if value.is_decode() {
            RequestError::Decode(value.to_string())
        } else if let Some(status) = value.status() {
            RequestError::Status {
                status: status.as_u16(),
                message: value.to_string(),
            }
        } else {
            RequestError::Transport(value.to_string())
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(value: serde_json::Error) -> Self {
        RequestError::Decode(value.to_string())
    }
}
