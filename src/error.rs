use reqwest::StatusCode;

/// Failure of a single remote fetch.
///
/// Cloneable so a failed result can live in a cache entry next to the data it
/// failed to replace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request could not be sent or the response could not be read.
    #[error("network error: {message}")]
    Network { message: String },

    /// The server answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Http { status: u16, message: String },

    /// The body was not the JSON shape we expect.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The request was rejected before it was issued.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn http(status: StatusCode, body: &str) -> Self {
        let reason = status.canonical_reason().unwrap_or("unknown status");
        let snippet: String = body.trim().chars().take(120).collect();
        let message = if snippet.is_empty() {
            reason.to_string()
        } else {
            format!("{reason}: {snippet}")
        };
        Self::Http {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Http {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_carries_status() {
        let err = FetchError::http(StatusCode::NOT_FOUND, "");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP error! status: 404");
        match err {
            FetchError::Http { message, .. } => assert_eq!(message, "Not Found"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn network_error_has_no_status() {
        let err = FetchError::network("connection refused");
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("connection refused"));
    }
}
