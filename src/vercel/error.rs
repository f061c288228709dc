//! Error taxonomy for Vercel API calls
//!
//! Every failure surfaces as an [`Error`] whose [`ErrorKind`] tells the caller
//! whether the request never left the process, never reached the server,
//! was refused by the server, or was accepted but answered with garbage.

use super::project::ProjectResponse;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Maximum length of response body to keep (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be built. Fatal, never retry.
    Request,
    /// Network, TLS, timeout or cancellation. Caller may retry.
    Transport,
    /// The server answered with a non-2xx status.
    Api,
    /// The server answered 2xx with a body that does not match the expected shape.
    Decode,
}

/// Error reported by the Vercel API in a non-2xx response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    /// Machine readable error code (e.g. `forbidden`), empty if the body had none
    pub code: String,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    /// Build from a failed response, parsing the `{"error": {...}}` envelope where possible
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => Self {
                status: status.as_u16(),
                code: envelope.error.code.unwrap_or_default(),
                message: envelope.error.message.unwrap_or_else(|| status.to_string()),
            },
            Err(_) => Self {
                status: status.as_u16(),
                code: String::new(),
                message: if body.trim().is_empty() {
                    status.to_string()
                } else {
                    sanitize_for_log(body)
                },
            },
        }
    }

    /// Rate limited or server side failure
    pub fn is_retryable(&self) -> bool {
        self.status == 429 || self.status >= 500
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.code.is_empty() {
            write!(f, "HTTP {}: {}", self.status, self.message)
        } else {
            write!(f, "HTTP {} ({}): {}", self.status, self.code, self.message)
        }
    }
}

/// Errors returned by [`VercelClient`](super::client::VercelClient) operations
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to serialize request payload")]
    Serialize(#[source] serde_json::Error),

    #[error("HTTP transport error")]
    Transport(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("API request failed: {0}")]
    Api(ApiError),

    #[error("failed to decode response body")]
    Decode {
        #[source]
        source: serde_json::Error,
        /// Sanitized, truncated copy of the offending body
        body: String,
    },

    /// The project exists server side; only the follow-up fetch failed.
    #[error("error getting environment variables for created project {}", .project.id)]
    EnvironmentVariablesFetch {
        project: Box<ProjectResponse>,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn decode(source: serde_json::Error, body: &str) -> Self {
        Self::Decode {
            source,
            body: sanitize_for_log(body),
        }
    }

    /// Classification of the error.
    ///
    /// A chained failure reports the kind of the underlying cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidRequest(_) | Error::Serialize(_) => ErrorKind::Request,
            // Builder errors are raised before any I/O
            Error::Transport(e) if e.is_builder() => ErrorKind::Request,
            Error::Transport(_) | Error::Cancelled | Error::DeadlineExceeded => {
                ErrorKind::Transport
            }
            Error::Api(_) => ErrorKind::Api,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::EnvironmentVariablesFetch { source, .. } => source.kind(),
        }
    }

    /// Whether repeating the exact same call can reasonably succeed.
    ///
    /// Never true when the failed call already created a resource.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => !e.is_builder(),
            Error::Cancelled | Error::DeadlineExceeded => true,
            Error::Api(api) => api.is_retryable(),
            _ => false,
        }
    }

    /// True when the server side resource was created even though the call failed
    pub fn resource_created(&self) -> bool {
        matches!(self, Error::EnvironmentVariablesFetch { .. })
    }

    /// The API error, if the server refused the request
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            Error::EnvironmentVariablesFetch { source, .. } => source.api_error(),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_parses_envelope() {
        let body = r#"{"error":{"code":"forbidden","message":"Not authorized"}}"#;
        let err = ApiError::from_response(StatusCode::FORBIDDEN, body);
        assert_eq!(err.status, 403);
        assert_eq!(err.code, "forbidden");
        assert_eq!(err.message, "Not authorized");
        assert_eq!(err.to_string(), "HTTP 403 (forbidden): Not authorized");
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, "upstream\nexploded");
        assert_eq!(err.code, "");
        assert_eq!(err.message, "upstreamexploded");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_api_error_empty_body_uses_status() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, "");
        assert_eq!(err.message, "404 Not Found");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "é".repeat(300);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 600 bytes total]"));
    }

    #[test]
    fn test_kinds_and_retryability() {
        assert_eq!(Error::InvalidRequest("x".into()).kind(), ErrorKind::Request);
        assert!(!Error::InvalidRequest("x".into()).is_retryable());

        assert_eq!(Error::Cancelled.kind(), ErrorKind::Transport);
        assert!(Error::DeadlineExceeded.is_retryable());

        let rate_limited = Error::Api(ApiError::from_response(StatusCode::TOO_MANY_REQUESTS, ""));
        assert_eq!(rate_limited.kind(), ErrorKind::Api);
        assert!(rate_limited.is_retryable());

        let garbage = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let decode = Error::decode(garbage, "{");
        assert_eq!(decode.kind(), ErrorKind::Decode);
        assert!(!decode.is_retryable());
    }

    #[test]
    fn test_reqwest_builder_error_is_request_error() {
        let builder_err = reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err();
        assert!(builder_err.is_builder());

        let err = Error::from(builder_err);
        assert_eq!(err.kind(), ErrorKind::Request);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_chained_error_is_never_retryable() {
        let err = Error::EnvironmentVariablesFetch {
            project: Box::new(ProjectResponse {
                id: "prj_1".to_string(),
                name: "demo".to_string(),
                ..Default::default()
            }),
            source: Box::new(Error::DeadlineExceeded),
        };
        assert!(err.resource_created());
        assert!(!err.is_retryable());
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(
            err.to_string(),
            "error getting environment variables for created project prj_1"
        );
    }
}
