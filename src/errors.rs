use reqwest::StatusCode;
use serde_json::Value;
use std::fmt;

/// Message used when a failing response carries no usable body.
const EMPTY_ERROR_BODY: &str = "no error message returned";

/// Errors raised by the MyWater Toronto client.
#[derive(Debug)]
pub enum ClientError {
    /// The `/validate` endpoint rejected the credentials.
    ValidationFailed {
        /// HTTP status returned by the server.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },
    /// The `/accountdetails` or `/consumption` endpoint returned a non-200 status.
    FetchFailed {
        /// HTTP status returned by the server.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },
    /// The request never completed (connection, TLS, timeout, body read).
    Transport(String),
    /// The response body did not have the expected JSON shape.
    Parse(String),
    /// A date or numeric field could not be converted.
    Conversion {
        /// JSON field name as sent by the server.
        field: &'static str,
        /// Offending raw value.
        value: String,
        /// Why the conversion failed.
        reason: String,
    },
    /// Invalid client configuration or credentials.
    Config(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<ClientError>,
        /// Additional context message.
        context: String,
    },
}

impl ClientError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::ValidationFailed { status, .. } | ClientError::FetchFailed { status, .. } => {
                Some(*status)
            }
            ClientError::WithContext { source, .. } => source.status(),
            _ => None,
        }
    }

    /// Builds a `ValidationFailed` from a non-200 status and its raw body.
    pub fn validation_failed(status: StatusCode, body: &str) -> Self {
        ClientError::ValidationFailed {
            status: status.as_u16(),
            message: extract_error_message(status, body),
        }
    }

    /// Builds a `FetchFailed` from a non-200 status and its raw body.
    pub fn fetch_failed(status: StatusCode, body: &str) -> Self {
        ClientError::FetchFailed {
            status: status.as_u16(),
            message: extract_error_message(status, body),
        }
    }
}

/// Pulls the server-supplied message out of an error body.
///
/// A 400 response reports its reason in `error`; every other status uses
/// `message`. Bodies that are not JSON, or lack the field, fall back to the
/// trimmed raw text.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    let field = if status == StatusCode::BAD_REQUEST {
        "error"
    } else {
        "message"
    };

    let from_json = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| json.get(field).cloned())
        .and_then(|value| match value {
            Value::String(text) => Some(text),
            Value::Null => None,
            other => Some(other.to_string()),
        });

    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => EMPTY_ERROR_BODY.to_string(),
        None => body.trim().to_string(),
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::ValidationFailed { status, message } => write!(
                f,
                "Account validation failed: response code {}: {}",
                status, message
            ),
            ClientError::FetchFailed { status, message } => {
                write!(f, "Fetch failed: response code {}: {}", status, message)
            }
            ClientError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ClientError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ClientError::Conversion {
                field,
                value,
                reason,
            } => write!(f, "Invalid value for {} ({:?}): {}", field, value, reason),
            ClientError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ClientError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::WithContext { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    /// Converts a `reqwest::Error` into a `ClientError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Transport(format!("request timed out: {}", err))
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    /// Converts a `serde_json::Error` into a `ClientError`.
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `ClientError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, ClientError>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Arguments
    ///
    /// * `f` - A closure that produces the context message.
    fn with_context<F>(self, f: F) -> Result<T, ClientError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, ClientError> {
    fn context(self, context: impl Into<String>) -> Result<T, ClientError> {
        self.map_err(|e| ClientError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, ClientError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ClientError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
