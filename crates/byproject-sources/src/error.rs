//! Error types for upstream sources.

/// Errors that can occur when querying a rate source or translation provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The source could not be reached.
    #[error("source unavailable: {reason}")]
    Unavailable { reason: String },

    /// The source answered with an unexpected HTTP status.
    #[error("unexpected status {status}: {body}")]
    Http { status: u16, body: String },

    /// The source throttled the request.
    #[error("rate limited by upstream")]
    RateLimited,

    /// The request did not complete in time.
    #[error("operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The source is missing required configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SourceError {
    /// Creates a new source unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates a new invalid response error.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse(reason.into())
    }

    /// Creates a new invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable { .. } | Self::Timeout { .. } | Self::RateLimited => true,
            Self::Http { status, .. } => *status >= 500,
            Self::InvalidResponse(_) | Self::InvalidConfig(_) => false,
        }
    }

    /// Maps a reqwest transport error, keeping timeouts distinct.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                seconds: timeout_secs,
            }
        } else if err.is_decode() {
            Self::invalid_response(err.to_string())
        } else {
            Self::unavailable(err.to_string())
        }
    }

    /// Maps a non-success HTTP status.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited
        } else {
            Self::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourceError::unavailable("connection refused");
        assert_eq!(err.to_string(), "source unavailable: connection refused");

        let err = SourceError::Timeout { seconds: 30 };
        assert_eq!(err.to_string(), "operation timed out after 30s");

        let err = SourceError::Http {
            status: 404,
            body: "missing".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected status 404: missing");
    }

    #[test]
    fn test_is_transient() {
        assert!(SourceError::unavailable("network error").is_transient());
        assert!(SourceError::Timeout { seconds: 30 }.is_transient());
        assert!(SourceError::RateLimited.is_transient());
        assert!(
            SourceError::Http {
                status: 503,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !SourceError::Http {
                status: 400,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!SourceError::invalid_config("missing key").is_transient());
    }

    #[test]
    fn test_from_status_truncates_body() {
        let body = "x".repeat(500);
        let err = SourceError::from_status(reqwest::StatusCode::BAD_GATEWAY, body);

        match err {
            SourceError::Http { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body.len(), 200);
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_status_rate_limited() {
        let err = SourceError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new());
        assert!(matches!(err, SourceError::RateLimited));
    }
}
