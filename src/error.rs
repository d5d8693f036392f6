// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `insteon_cloud` library.
//!
//! Errors are grouped by concern: value validation, authentication, transport,
//! response parsing and the event stream. [`Error`] aggregates them together
//! with the session-level failures (not connected, unknown entities, failed
//! commands, timeouts).

use std::time::Duration;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A value failed validation before any request was made.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Login or token refresh failed.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The HTTP transport failed or the API answered with an error status.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The event stream failed.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// The session is not connected.
    #[error("session is not connected")]
    NotConnected,

    /// `connect` was called on a session that is connected or connecting.
    #[error("session is already connected")]
    AlreadyConnected,

    /// The account does not have exactly one house.
    #[error("expected exactly one house, found {0}")]
    HouseCount(usize),

    /// No cached device has the given insteon id.
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// No cached scene has the given id.
    #[error("unknown scene: {0}")]
    UnknownScene(i64),

    /// The server reported the command as failed.
    #[error("command {id} failed")]
    CommandFailed {
        /// Server-assigned command id.
        id: i64,
    },

    /// The operation did not finish before its deadline.
    #[error("operation timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },
}

/// Errors raised while obtaining or refreshing the OAuth token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token request could not be sent or its body not read.
    #[error("token request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The token endpoint answered with a non-success status.
    #[error("token request rejected with HTTP {status}")]
    Rejected {
        /// HTTP status code returned by the token endpoint.
        status: u16,
    },

    /// The token endpoint answered with a body that is not a token.
    #[error("invalid token response: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// A refresh was requested before any login succeeded.
    #[error("no refresh token available")]
    NotAuthenticated,
}

/// Errors related to HTTP communication with the cloud API.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed at the transport level.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("unexpected HTTP {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Invalid base URL.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to parsing API responses.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Expected field is missing from the response.
    #[error("missing field in response: {0}")]
    MissingField(String),
}

/// Errors raised by the event stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The stream endpoint answered with something other than 200.
    #[error("stream request returned HTTP {0}")]
    UnexpectedStatus(u16),

    /// A `data:` frame did not contain a valid event message.
    #[error("malformed event frame: {0}")]
    MalformedEvent(#[source] serde_json::Error),

    /// A stream line grew past the maximum length without a newline.
    #[error("stream line exceeds {0} bytes")]
    LineTooLong(usize),

    /// Reading the stream body failed.
    #[error("stream read failed: {0}")]
    Read(#[source] reqwest::Error),

    /// The background stream task panicked or was aborted.
    #[error("stream task failed: {0}")]
    TaskFailed(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
