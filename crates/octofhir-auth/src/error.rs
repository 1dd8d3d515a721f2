//! Authentication and authorization error types.
//!
//! This module defines all error types that can occur while producing and
//! delivering an authorization response.

use std::fmt;

/// Errors that can occur during authorization response processing.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The authorization request is invalid or malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// The pushed authorization request reference is invalid, expired, or
    /// was already used.
    #[error("Invalid request_uri: {message}")]
    InvalidRequestUri {
        /// Description of why the reference was rejected.
        message: String,
    },

    /// The client is not registered or not allowed to use this endpoint.
    #[error("Invalid client: {message}")]
    InvalidClient {
        /// Description of why the client is invalid.
        message: String,
    },

    /// The requested scope is invalid, unknown, or malformed.
    #[error("Invalid scope: {message}")]
    InvalidScope {
        /// Description of why the scope is invalid.
        message: String,
    },

    /// The resource owner denied the authorization request.
    #[error("Access denied: {message}")]
    AccessDenied {
        /// Description of why access was denied.
        message: String,
    },

    /// The end-user must authenticate before the request can proceed.
    #[error("Login required: {message}")]
    LoginRequired {
        /// Description of why authentication is required.
        message: String,
    },

    /// The end-user must grant consent before the request can proceed.
    #[error("Consent required: {message}")]
    ConsentRequired {
        /// Description of why consent is required.
        message: String,
    },

    /// The authorization server does not support the requested response type.
    #[error("Unsupported response type: {response_type}")]
    UnsupportedResponseType {
        /// The unsupported response type.
        response_type: String,
    },

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The auth configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequestUri` error.
    #[must_use]
    pub fn invalid_request_uri(message: impl Into<String>) -> Self {
        Self::InvalidRequestUri {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClient` error.
    #[must_use]
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::InvalidClient {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidScope` error.
    #[must_use]
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::InvalidScope {
            message: message.into(),
        }
    }

    /// Creates a new `AccessDenied` error.
    #[must_use]
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    /// Creates a new `LoginRequired` error.
    #[must_use]
    pub fn login_required(message: impl Into<String>) -> Self {
        Self::LoginRequired {
            message: message.into(),
        }
    }

    /// Creates a new `ConsentRequired` error.
    #[must_use]
    pub fn consent_required(message: impl Into<String>) -> Self {
        Self::ConsentRequired {
            message: message.into(),
        }
    }

    /// Creates a new `UnsupportedResponseType` error.
    #[must_use]
    pub fn unsupported_response_type(response_type: impl Into<String>) -> Self {
        Self::UnsupportedResponseType {
            response_type: response_type.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. }
                | Self::InvalidRequestUri { .. }
                | Self::InvalidClient { .. }
                | Self::InvalidScope { .. }
                | Self::AccessDenied { .. }
                | Self::LoginRequired { .. }
                | Self::ConsentRequired { .. }
                | Self::UnsupportedResponseType { .. }
        )
    }

    /// Returns `true` if this is a server error (5xx category).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. }
        )
    }

    /// Returns `true` if this error reports a replayed or unknown pushed
    /// authorization request reference.
    #[must_use]
    pub fn is_replay(&self) -> bool {
        matches!(self, Self::InvalidRequestUri { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
            Self::InvalidRequestUri { .. } => ErrorCategory::Replay,
            Self::InvalidClient { .. } => ErrorCategory::Authentication,
            Self::InvalidScope { .. } => ErrorCategory::Authorization,
            Self::AccessDenied { .. } => ErrorCategory::Authorization,
            Self::LoginRequired { .. } => ErrorCategory::Authentication,
            Self::ConsentRequired { .. } => ErrorCategory::Authorization,
            Self::UnsupportedResponseType { .. } => ErrorCategory::Validation,
            Self::Storage { .. } => ErrorCategory::Infrastructure,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Returns the OAuth 2.0 error code for this error.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::InvalidRequestUri { .. } => "invalid_request_uri",
            Self::InvalidClient { .. } => "invalid_client",
            Self::InvalidScope { .. } => "invalid_scope",
            Self::AccessDenied { .. } => "access_denied",
            Self::LoginRequired { .. } => "login_required",
            Self::ConsentRequired { .. } => "consent_required",
            Self::UnsupportedResponseType { .. } => "unsupported_response_type",
            Self::Storage { .. } => "server_error",
            Self::Configuration { .. } => "server_error",
            Self::Internal { .. } => "server_error",
        }
    }

    /// Returns the human-readable description without the kind prefix.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::InvalidRequest { message }
            | Self::InvalidRequestUri { message }
            | Self::InvalidClient { message }
            | Self::InvalidScope { message }
            | Self::AccessDenied { message }
            | Self::LoginRequired { message }
            | Self::ConsentRequired { message } => message.clone(),
            Self::UnsupportedResponseType { response_type } => {
                format!("response_type '{}' is not supported", response_type)
            }
            // Server-side details stay in the logs.
            Self::Storage { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                "The authorization server encountered an unexpected condition".to_string()
            }
        }
    }
}

/// Categories of authorization errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Authentication-related errors (identity verification).
    Authentication,
    /// Authorization-related errors (permission checks).
    Authorization,
    /// Request validation errors.
    Validation,
    /// Single-use reference reuse.
    Replay,
    /// Infrastructure/storage errors.
    Infrastructure,
    /// Configuration errors.
    Configuration,
    /// Internal server errors.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::Authorization => write!(f, "authorization"),
            Self::Validation => write!(f, "validation"),
            Self::Replay => write!(f, "replay"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Configuration => write!(f, "configuration"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AuthError::invalid_request_uri("request_uri was already used");
        assert_eq!(
            err.to_string(),
            "Invalid request_uri: request_uri was already used"
        );

        let err = AuthError::unsupported_response_type("token");
        assert_eq!(err.to_string(), "Unsupported response type: token");

        let err = AuthError::configuration("no signer");
        assert_eq!(err.to_string(), "Configuration error: no signer");
    }

    #[test]
    fn test_error_predicates() {
        let err = AuthError::invalid_request_uri("reused");
        assert!(err.is_client_error());
        assert!(!err.is_server_error());
        assert!(err.is_replay());

        let err = AuthError::storage("database down");
        assert!(!err.is_client_error());
        assert!(err.is_server_error());
        assert!(!err.is_replay());

        let err = AuthError::configuration("missing signer");
        assert!(err.is_server_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            AuthError::invalid_request_uri("test").category(),
            ErrorCategory::Replay
        );
        assert_eq!(
            AuthError::access_denied("test").category(),
            ErrorCategory::Authorization
        );
        assert_eq!(
            AuthError::storage("test").category(),
            ErrorCategory::Infrastructure
        );
        assert_eq!(
            AuthError::configuration("test").category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            AuthError::invalid_request_uri("test").oauth_error_code(),
            "invalid_request_uri"
        );
        assert_eq!(
            AuthError::invalid_request("test").oauth_error_code(),
            "invalid_request"
        );
        assert_eq!(
            AuthError::login_required("test").oauth_error_code(),
            "login_required"
        );
        assert_eq!(
            AuthError::internal("test").oauth_error_code(),
            "server_error"
        );
    }

    #[test]
    fn test_description_hides_server_details() {
        let err = AuthError::storage("connection refused to 10.0.0.3:5432");
        assert!(!err.description().contains("10.0.0.3"));

        let err = AuthError::access_denied("user cancelled");
        assert_eq!(err.description(), "user cancelled");
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Replay.to_string(), "replay");
        assert_eq!(ErrorCategory::Authorization.to_string(), "authorization");
        assert_eq!(ErrorCategory::Infrastructure.to_string(), "infrastructure");
    }
}
