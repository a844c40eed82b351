//! Errors raised by the backend request client.

/// Fallback message when the backend gives no usable detail.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Message used when a JSON error body cannot be parsed.
pub const UNPARSABLE_ERROR_MESSAGE: &str = "Failed to parse error response";

/// A failed backend call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Backend unreachable: {0}")]
    Transport(String),

    /// A 2xx body did not match the expected shape.
    #[error("Unexpected backend payload: {0}")]
    Decode(String),

    /// A 2xx body had a content type the caller cannot use.
    #[error("Unexpected backend body: {0}")]
    UnexpectedBody(String),
}

impl ApiError {
    /// HTTP status of the backend response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Best-effort human readable detail, suitable for a toast.
    pub fn message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Extract the error detail from a non-2xx response body.
///
/// JSON arrays are joined with `" * "`, JSON objects contribute their
/// `detail` field, anything else is returned as raw text.
pub fn error_message_from_body(content_type: Option<&str>, body: &[u8]) -> String {
    let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));

    if is_json {
        return match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" * "),
            Ok(serde_json::Value::Object(map)) => map
                .get("detail")
                .and_then(|d| d.as_str())
                .filter(|d| !d.is_empty())
                .unwrap_or(GENERIC_ERROR_MESSAGE)
                .to_string(),
            Ok(_) => GENERIC_ERROR_MESSAGE.to_string(),
            Err(_) => UNPARSABLE_ERROR_MESSAGE.to_string(),
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        GENERIC_ERROR_MESSAGE.to_string()
    } else {
        text.to_string()
    }
}
