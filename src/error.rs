//! Error types for the trace-epoch cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Error Enum ==
/// Unified error type for the cache backends, the epoch adjuster and the host.
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown endpoint scheme, unparseable endpoint or missing setting
    #[error("{0}")]
    Configuration(String),

    /// Backend unreachable at start or health probe
    #[error("{0}")]
    Connectivity(String),

    /// A get-or-set or delete call failed; the caller may try again later
    #[error("cache call failed: {0}")]
    Transient(String),

    /// A cached epoch could not be decoded
    #[error("malformed epoch value: {0:?}")]
    Decode(String),

    /// Malformed request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Configuration(err.to_string())
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Transient(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Configuration(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Transient(_) | Error::Decode(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_scheme_message_is_verbatim() {
        let err = Error::Configuration("Unknown cache provider scheme: \"memcached\"".into());
        assert_eq!(err.to_string(), "Unknown cache provider scheme: \"memcached\"");
    }

    #[test]
    fn test_redis_error_is_transient() {
        let err: Error = redis::RedisError::from((redis::ErrorKind::IoError, "boom")).into();
        assert!(matches!(err, Error::Transient(_)));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (Error::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (Error::Configuration("x".into()), StatusCode::BAD_REQUEST),
            (Error::Connectivity("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (Error::Transient("x".into()), StatusCode::BAD_GATEWAY),
            (Error::Decode("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
