// ABOUTME: Error taxonomy surfaced by the reconnecting client
// ABOUTME: Maps transport, envelope and decoding failures onto five caller-facing kinds
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use mcp_stream_core::EnvelopeError;

/// Failure of a client operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// `connect` was called while a subscription loop is still running
    #[error("subscription is already active")]
    AlreadyConnected,

    /// The hub could not be reached or the transfer broke off
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The hub answered with a failure envelope
    #[error("remote error {code}: {message}")]
    RemoteError {
        /// Code chosen by the service
        code: String,
        /// Human-readable message
        message: String,
    },

    /// The hub answered successfully with an unexpected shape
    #[error("malformed result: {0}")]
    MalformedResult(String),

    /// Anything else
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<EnvelopeError> for ClientError {
    fn from(error: EnvelopeError) -> Self {
        match error {
            EnvelopeError::Remote(body) => Self::RemoteError {
                code: body.code,
                message: body.message,
            },
            other => Self::MalformedResult(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::MalformedResult(error.to_string())
        } else if error.is_builder() {
            Self::InternalError(error.to_string())
        } else {
            Self::ConnectionFailed(error.to_string())
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_stream_core::ErrorBody;

    #[test]
    fn test_remote_envelope_errors_keep_code_and_message() {
        let error = ClientError::from(EnvelopeError::Remote(ErrorBody::new(
            "not_found",
            "no such tool",
        )));
        assert_eq!(
            error,
            ClientError::RemoteError {
                code: "not_found".into(),
                message: "no such tool".into(),
            }
        );
    }

    #[test]
    fn test_shape_errors_are_malformed() {
        let error = ClientError::from(EnvelopeError::MissingResult);
        assert!(matches!(error, ClientError::MalformedResult(_)));
    }
}
