// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for the copilot
//!
//! Guardrail rejections never surface here: they are ordinary pipeline
//! outcomes. This module covers provider failures and configuration problems.

use thiserror::Error;

/// Main error type for copilot operations
#[derive(Error, Debug)]
pub enum CopilotError {
    /// API-related errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// The provider rejected the request as malformed (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication failed (HTTP 401/403)
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Rate limited by the API (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Timeout waiting for response
    #[error("Request timed out")]
    Timeout,
}

/// Result type alias for copilot operations
pub type Result<T> = std::result::Result<T, CopilotError>;

impl From<reqwest::Error> for CopilotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CopilotError::Api(ApiError::Timeout)
        } else if err.is_decode() {
            CopilotError::Api(ApiError::InvalidResponse(err.to_string()))
        } else {
            CopilotError::Api(ApiError::Network(err.to_string()))
        }
    }
}

impl ApiError {
    /// Map a non-success HTTP status to the matching variant
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            400 => ApiError::InvalidRequest(message),
            401 | 403 => ApiError::AuthenticationFailed,
            408 | 504 => ApiError::Timeout,
            429 => ApiError::RateLimited(message),
            _ => ApiError::ServerError { status, message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copilot_error_config() {
        let err = CopilotError::Config("GROQ_API_KEY not found".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_copilot_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CopilotError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_copilot_error_from_api_error() {
        let err: CopilotError = ApiError::AuthenticationFailed.into();
        assert!(err.to_string().contains("API error"));
        assert!(err.to_string().contains("Authentication failed"));
    }

    #[test]
    fn test_api_error_server_error() {
        let err = ApiError::ServerError {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("unavailable"));
    }

    #[test]
    fn test_from_status_bad_request() {
        assert!(matches!(
            ApiError::from_status(400, "bad"),
            ApiError::InvalidRequest(m) if m == "bad"
        ));
    }

    #[test]
    fn test_from_status_auth() {
        assert!(matches!(
            ApiError::from_status(401, ""),
            ApiError::AuthenticationFailed
        ));
        assert!(matches!(
            ApiError::from_status(403, ""),
            ApiError::AuthenticationFailed
        ));
    }

    #[test]
    fn test_from_status_rate_limit_and_timeouts() {
        assert!(matches!(
            ApiError::from_status(429, "slow down"),
            ApiError::RateLimited(_)
        ));
        assert!(matches!(ApiError::from_status(408, ""), ApiError::Timeout));
        assert!(matches!(ApiError::from_status(504, ""), ApiError::Timeout));
    }

    #[test]
    fn test_from_status_server_errors() {
        for status in [500u16, 502, 503, 404] {
            match ApiError::from_status(status, "x") {
                ApiError::ServerError { status: s, .. } => assert_eq!(s, status),
                other => panic!("unexpected variant {:?}", other),
            }
        }
    }
}
