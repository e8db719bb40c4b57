//! Typed error handling for the folio client
//!
//! Two families of errors exist at this layer:
//!
//! - [`FetchError`]: failures of one request attempt against the backend.
//!   These are `Clone` because the cache stores the latest failure in each
//!   subscription snapshot. The taxonomy is fixed: transport, protocol
//!   (non-2xx), or decode. None of them are retried here; recovery policy
//!   belongs to the caller or the transport collaborator.
//! - [`ClientError`]: misuse and setup failures (bad configuration,
//!   issuing a write descriptor through the read path, a missing
//!   identifier for a parametrized endpoint).

use std::fmt;

/// A failure of a single request attempt
///
/// Terminal for the attempt that produced it. An invalidation-triggered
/// refetch that fails leaves the subscription `rejected` with this error,
/// visible to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced an HTTP response (network unreachable,
    /// timeout, connection reset)
    Transport { message: String },

    /// The backend answered with a non-2xx status; the status code and
    /// backend-supplied body are preserved verbatim
    Status { code: u16, message: String },

    /// The response body could not be decoded as JSON
    Decode { message: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport { message } => {
                write!(f, "transport error: {}", message)
            }
            FetchError::Status { code, message } => {
                write!(f, "backend returned status {}: {}", code, message)
            }
            FetchError::Decode { message } => {
                write!(f, "failed to decode response body: {}", message)
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// A stable code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "TRANSPORT_ERROR",
            FetchError::Status { .. } => "STATUS_ERROR",
            FetchError::Decode { .. } => "DECODE_ERROR",
        }
    }

    /// The HTTP status code, when the backend produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode {
                message: err.to_string(),
            }
        } else {
            FetchError::Transport {
                message: err.to_string(),
            }
        }
    }
}

/// Errors raised by the client API itself, before any request is issued
#[derive(Debug)]
pub enum ClientError {
    /// Configuration was missing or invalid
    Config { message: String },

    /// A descriptor was used through the wrong path, e.g. subscribing to
    /// a write operation or mutating through a read operation
    InvalidOperation { operation: String, message: String },

    /// A parametrized endpoint was called without an identifier, or with
    /// an empty one
    MissingId { operation: String },

    /// A request attempt failed
    Fetch(FetchError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Config { message } => {
                write!(f, "configuration error: {}", message)
            }
            ClientError::InvalidOperation { operation, message } => {
                write!(f, "invalid use of operation '{}': {}", operation, message)
            }
            ClientError::MissingId { operation } => {
                write!(
                    f,
                    "operation '{}' requires a non-empty identifier",
                    operation
                )
            }
            ClientError::Fetch(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Fetch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FetchError> for ClientError {
    fn from(err: FetchError) -> Self {
        ClientError::Fetch(err)
    }
}

/// A specialized Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status {
            code: 404,
            message: "event not found".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("event not found"));
    }

    #[test]
    fn test_fetch_error_codes() {
        let transport = FetchError::Transport {
            message: "connection refused".to_string(),
        };
        assert_eq!(transport.error_code(), "TRANSPORT_ERROR");
        assert_eq!(transport.status(), None);

        let status = FetchError::Status {
            code: 500,
            message: "boom".to_string(),
        };
        assert_eq!(status.error_code(), "STATUS_ERROR");
        assert_eq!(status.status(), Some(500));

        let decode = FetchError::Decode {
            message: "unexpected token".to_string(),
        };
        assert_eq!(decode.error_code(), "DECODE_ERROR");
    }

    #[test]
    fn test_fetch_error_is_clone_and_eq() {
        let err = FetchError::Decode {
            message: "truncated".to_string(),
        };
        assert_eq!(err.clone(), err);
    }

    #[test]
    fn test_client_error_display() {
        let err = ClientError::MissingId {
            operation: "event.get".to_string(),
        };
        assert!(err.to_string().contains("event.get"));

        let err = ClientError::InvalidOperation {
            operation: "event.create".to_string(),
            message: "cannot subscribe to a write operation".to_string(),
        };
        assert!(err.to_string().contains("event.create"));
    }

    #[test]
    fn test_client_error_from_fetch() {
        let err: ClientError = FetchError::Transport {
            message: "timeout".to_string(),
        }
        .into();
        assert!(matches!(err, ClientError::Fetch(_)));
    }
}
