// ABOUTME: Request/response envelope shared by API calls and broadcast events
// ABOUTME: Encodes {success, result, error} and decodes it back into a typed Result
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Envelope Codec
//!
//! Every request/response exchange and every broadcast event travels as an
//! [`Envelope`]:
//!
//! ```text
//! {"success":true,"result":<any>}
//! {"success":false,"error":{"code":"<string>","message":"<string>"}}
//! ```
//!
//! `success` discriminates which of `result`/`error` is meaningful. Decoding
//! through [`Envelope::into_result`] turns the wire shape into a plain
//! `Result`, so callers never inspect the flag by hand.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known error codes carried in [`ErrorBody::code`]
pub mod error_codes {
    /// The named prompt, tool or resource does not exist
    pub const NOT_FOUND: &str = "not_found";
    /// Arguments were missing or had the wrong shape
    pub const INVALID_PARAMS: &str = "invalid_params";
    /// The request body could not be parsed
    pub const INVALID_REQUEST: &str = "invalid_request";
    /// Unexpected failure inside the service
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Typed error carried by a failed envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl ErrorBody {
    /// Create an error body from a code and message
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Errors produced while encoding or interpreting an envelope
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// The remote side reported a failure
    #[error("remote error {0}")]
    Remote(ErrorBody),

    /// `success` was true but no `result` was present
    #[error("envelope reported success without a result")]
    MissingResult,

    /// `success` was false but no `error` was present
    #[error("envelope reported failure without an error body")]
    MissingError,

    /// JSON encoding or decoding failed
    #[error("envelope JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Wire wrapper for one request/response exchange or one broadcast event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = Value> {
    /// Discriminates `result` from `error`
    pub success: bool,
    /// Payload, meaningful only when `success` is true
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    /// Failure, meaningful only when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl<T> Envelope<T> {
    /// Successful envelope carrying `result`
    pub const fn ok(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// Failed envelope carrying `error`
    pub const fn from_error(error: ErrorBody) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error),
        }
    }

    /// Failed envelope built from a code and message
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::from_error(ErrorBody::new(code, message))
    }

    /// Interpret the envelope, honoring the `success` discriminator
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Remote`] for a failed envelope, or a
    /// `Missing*` variant when the field selected by `success` is absent.
    pub fn into_result(self) -> Result<T, EnvelopeError> {
        if self.success {
            self.result.ok_or(EnvelopeError::MissingResult)
        } else {
            Err(self
                .error
                .map_or(EnvelopeError::MissingError, EnvelopeError::Remote))
        }
    }

    /// Transform the result payload, keeping any error untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            result: self.result.map(f),
            error: self.error,
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Serialize to compact JSON (single line, safe inside an SSE `data:` field)
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized
    pub fn encode(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Parse an envelope from JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid envelope for `T`
    pub fn decode(text: &str) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse an envelope from raw JSON bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid envelope for `T`
    pub fn decode_slice(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(feature = "http-response")]
impl<T: Serialize> axum::response::IntoResponse for Envelope<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_omits_error_field() {
        let encoded = Envelope::ok(json!({"content": "Hello"})).encode().unwrap();
        assert_eq!(encoded, r#"{"success":true,"result":{"content":"Hello"}}"#);
    }

    #[test]
    fn test_failure_envelope_omits_result_field() {
        let encoded = Envelope::<Value>::failure("not_found", "no such tool")
            .encode()
            .unwrap();
        assert_eq!(
            encoded,
            r#"{"success":false,"error":{"code":"not_found","message":"no such tool"}}"#
        );
    }

    #[test]
    fn test_into_result_surfaces_remote_error() {
        let envelope: Envelope = Envelope::decode(
            r#"{"success":false,"error":{"code":"not_found","message":"no such tool"}}"#,
        )
        .unwrap();

        match envelope.into_result() {
            Err(EnvelopeError::Remote(body)) => {
                assert_eq!(body.code, "not_found");
                assert_eq!(body.message, "no such tool");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn test_success_flag_wins_over_stray_error() {
        let envelope: Envelope = Envelope::decode(
            r#"{"success":true,"result":[1,2],"error":{"code":"x","message":"ignored"}}"#,
        )
        .unwrap();
        assert_eq!(envelope.into_result().unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let no_result: Envelope = Envelope::decode(r#"{"success":true}"#).unwrap();
        assert!(matches!(
            no_result.into_result(),
            Err(EnvelopeError::MissingResult)
        ));

        let no_error: Envelope = Envelope::decode(r#"{"success":false}"#).unwrap();
        assert!(matches!(
            no_error.into_result(),
            Err(EnvelopeError::MissingError)
        ));
    }

    #[test]
    fn test_decode_typed_payload_without_default() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Rendered {
            content: String,
        }

        let envelope =
            Envelope::<Rendered>::decode(r#"{"success":true,"result":{"content":"Hello"}}"#)
                .unwrap();
        assert_eq!(
            envelope.into_result().unwrap(),
            Rendered {
                content: "Hello".into()
            }
        );

        let failed = Envelope::<Rendered>::decode_slice(
            br#"{"success":false,"error":{"code":"not_found","message":"no such prompt"}}"#,
        )
        .unwrap();
        assert!(failed.result.is_none());
    }

    #[test]
    fn test_decode_rejects_non_envelope() {
        assert!(matches!(
            Envelope::<Value>::decode("not json"),
            Err(EnvelopeError::Json(_))
        ));
        assert!(Envelope::<Value>::decode_slice(br#"{"result":1}"#).is_err());
    }
}
